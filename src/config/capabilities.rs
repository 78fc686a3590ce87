use std::path::{
    Path,
    PathBuf,
};

use reqwest::Client;

use super::types::CapabilityDocument;
use crate::{
    core::{
        http,
        DashboardError,
    },
    persistence,
};

/// Server-side home of the capability document.
#[derive(Debug, Clone)]
pub struct CapabilityFile {
    path: PathBuf,
}

impl CapabilityFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<CapabilityDocument, DashboardError> {
        persistence::load_json(&self.path)?.ok_or_else(|| {
            DashboardError::Custom(format!("capability file {} not found", self.path.display()))
        })
    }

    /// Validates and replaces the stored document.
    pub fn store(&self, caps: &CapabilityDocument) -> Result<(), DashboardError> {
        caps.validate()?;
        persistence::save_json(caps, &self.path)
    }

    /// Writes the built-in defaults when no document exists yet.
    pub fn ensure_exists(&self) -> Result<bool, DashboardError> {
        if self.path.exists() {
            return Ok(false);
        }
        persistence::save_json(&CapabilityDocument::default(), &self.path)?;
        tracing::info!(path = %self.path.display(), "seeded capability file with defaults");
        Ok(true)
    }
}

/// Fetches the capability document and repairs whatever `sanitize` can.
pub async fn fetch_capabilities(
    client: &Client,
    server_url: &str,
) -> Result<CapabilityDocument, DashboardError> {
    let url = format!("{}/api/config", server_url.trim_end_matches('/'));
    let mut caps: CapabilityDocument = http::get_json(client, &url).await?;
    for warning in caps.sanitize() {
        tracing::warn!("{warning}");
    }
    Ok(caps)
}

/// Substitutes the built-in defaults when the server cannot be reached or
/// answers with garbage. Only meant for start-up, when nothing better is known.
pub async fn load_capabilities_or_default(client: &Client, server_url: &str) -> CapabilityDocument {
    match fetch_capabilities(client, server_url).await {
        Ok(caps) => caps,
        Err(e) => {
            tracing::warn!(error = %e, "capability fetch failed, using built-in defaults");
            CapabilityDocument::default()
        }
    }
}
