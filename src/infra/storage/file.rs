use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use super::{ACCESS_TOKEN_KEY, TokenProvider, non_empty};

/// Token store persisted as a flat JSON object on disk:
/// ```json
/// { "AccessToken": "abc123" }
/// ```
///
/// The file is read again on every [`TokenProvider::current_token`] call, so
/// another process updating it is picked up by the next request.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Stores `token` under the access-token key, keeping other entries.
    pub fn set(&self, token: &str) -> Result<()> {
        let mut entries = self.load()?;
        entries.insert(ACCESS_TOKEN_KEY.to_string(), token.to_string());
        self.save(&entries)
    }

    /// Removes the access token. Missing file or key is not an error.
    pub fn clear(&self) -> Result<()> {
        if !self.path.exists() {
            return Ok(());
        }
        let mut entries = self.load()?;
        if entries.remove(ACCESS_TOKEN_KEY).is_some() {
            self.save(&entries)?;
        }
        Ok(())
    }

    fn load(&self) -> Result<BTreeMap<String, String>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let content = std::fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read token storage {}", self.path.display()))?;
        if content.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_str(&content)
            .with_context(|| format!("token storage {} is not a JSON object of strings", self.path.display()))
    }

    fn save(&self, entries: &BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, serde_json::to_string_pretty(entries)?)
            .with_context(|| format!("failed to write token storage {}", self.path.display()))?;
        debug!(path = %self.path.display(), "Token storage updated");
        Ok(())
    }
}

impl TokenProvider for FileTokenStore {
    fn current_token(&self) -> Option<String> {
        match self.load() {
            Ok(mut entries) => non_empty(entries.remove(ACCESS_TOKEN_KEY)),
            Err(e) => {
                warn!(error = %e, "Ignoring unreadable token storage");
                None
            }
        }
    }
}
