use std::{
    path::Path,
    time::Duration,
};

use serde::{
    Deserialize,
    Serialize,
};

use crate::persistence;

pub const KIOSK_SETTINGS_FILE: &str = "kiosk.json";

fn default_server_url() -> String {
    "http://localhost:3001".to_string()
}

fn default_openf1_base_url() -> String {
    "https://api.openf1.org/v1".to_string()
}

fn default_data_refresh_minutes() -> u64 {
    30
}

fn default_capability_refresh_secs() -> u64 {
    300
}

fn default_sprint_rounds() -> Vec<String> {
    ["Chinese GP", "Miami GP", "Belgian GP", "United States GP", "São Paulo GP", "Qatar GP"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

/// Runtime settings of the display process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KioskSettings {
    #[serde(default = "default_server_url")]
    pub server_url: String,
    #[serde(default = "default_openf1_base_url")]
    pub openf1_base_url: String,
    #[serde(default = "default_data_refresh_minutes")]
    pub data_refresh_minutes: u64,
    #[serde(default = "default_capability_refresh_secs")]
    pub capability_refresh_secs: u64,
    /// Meeting-name fragments that mark sprint weekends for the current season.
    #[serde(default = "default_sprint_rounds")]
    pub sprint_rounds: Vec<String>,
    #[serde(default)]
    pub debug_logging: bool,
}

impl Default for KioskSettings {
    fn default() -> Self {
        Self {
            server_url: default_server_url(),
            openf1_base_url: default_openf1_base_url(),
            data_refresh_minutes: default_data_refresh_minutes(),
            capability_refresh_secs: default_capability_refresh_secs(),
            sprint_rounds: default_sprint_rounds(),
            debug_logging: false,
        }
    }
}

impl KioskSettings {
    /// Settings file from the app data directory, then environment overrides.
    pub fn load() -> Self {
        let path = persistence::get_data_file_path(KIOSK_SETTINGS_FILE);
        Self::load_from(&path).with_env_overrides(|key| std::env::var(key).ok())
    }

    pub fn load_from(path: &Path) -> Self {
        persistence::load_json_or_default(path)
    }

    pub fn with_env_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("DASHBOARD_SERVER_URL").filter(|v| !v.trim().is_empty()) {
            self.server_url = url;
        }
        if let Some(url) = lookup("OPENF1_BASE_URL").filter(|v| !v.trim().is_empty()) {
            self.openf1_base_url = url;
        }
        if let Some(flag) = lookup("DASHBOARD_DEBUG") {
            self.debug_logging = parse_flag(&flag);
        }
        self
    }

    pub fn data_refresh_interval(&self) -> Duration {
        Duration::from_secs(self.data_refresh_minutes.max(1) * 60)
    }

    pub fn capability_refresh_interval(&self) -> Duration {
        Duration::from_secs(self.capability_refresh_secs.max(1))
    }

    /// `ws://` or `wss://` address of the server's real-time channel.
    pub fn channel_url(&self) -> String {
        let base = self.server_url.trim_end_matches('/');
        let ws_base = if let Some(rest) = base.strip_prefix("https://") {
            format!("wss://{rest}")
        } else if let Some(rest) = base.strip_prefix("http://") {
            format!("ws://{rest}")
        } else {
            format!("ws://{base}")
        };
        format!("{ws_base}/ws")
    }
}

pub(crate) fn parse_flag(value: &str) -> bool {
    matches!(value.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
}
