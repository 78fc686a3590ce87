use std::path::PathBuf;

use crate::config::kiosk::parse_flag;

pub const DEFAULT_PORT: u16 = 3001;
pub const DEFAULT_CONFIG_PATH: &str = "config/dashboard.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeploymentMode {
    Development,
    Production,
}

impl DeploymentMode {
    pub fn from_env_value(value: Option<&str>) -> Self {
        match value.map(|v| v.trim().to_ascii_lowercase()) {
            Some(v) if v == "production" => DeploymentMode::Production,
            _ => DeploymentMode::Development,
        }
    }

    /// Operator routes are only mounted outside production.
    pub fn admin_enabled(&self) -> bool {
        *self == DeploymentMode::Development
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub port: u16,
    pub mode: DeploymentMode,
    pub config_path: PathBuf,
    pub debug: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            mode: DeploymentMode::Development,
            config_path: PathBuf::from(DEFAULT_CONFIG_PATH),
            debug: false,
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(port) = lookup("PORT") {
            match port.trim().parse() {
                Ok(port) => config.port = port,
                Err(_) => tracing::warn!(%port, default = DEFAULT_PORT, "invalid PORT, using default"),
            }
        }
        config.mode = DeploymentMode::from_env_value(lookup("DASHBOARD_ENV").as_deref());
        if let Some(path) = lookup("DASHBOARD_CONFIG_PATH").filter(|p| !p.trim().is_empty()) {
            config.config_path = PathBuf::from(path);
        }
        config.debug = lookup("DASHBOARD_DEBUG").is_some_and(|v| parse_flag(&v));

        config
    }
}
