//! Environment-driven configuration.

use anyhow::{Context, Result};
use reqwest::Url;
use std::path::PathBuf;
use std::time::Duration;

pub const BASE_URL_VAR: &str = "STOREFRONT_BASE_URL";
pub const STORAGE_PATH_VAR: &str = "STOREFRONT_STORAGE_PATH";
pub const TIMEOUT_VAR: &str = "STOREFRONT_TIMEOUT_SECS";

const DEFAULT_STORAGE_PATH: &str = ".storefront/storage.json";

#[derive(Debug, Clone, PartialEq)]
pub struct ServiceConfig {
    /// Root every relative request path is joined onto.
    pub base_url: Url,
    /// JSON key/value file the access token is read from.
    pub storage_path: PathBuf,
    /// Per-request timeout the CLI passes along; the service sets none itself.
    pub timeout: Option<Duration>,
}

impl ServiceConfig {
    /// Reads the configuration from the process environment.
    ///
    /// Call `dotenvy::dotenv()` first if a `.env` file should be honored.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`ServiceConfig::from_env`] over an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let raw_base = lookup(BASE_URL_VAR).with_context(|| format!("{BASE_URL_VAR} must be set"))?;
        let base_url = Url::parse(raw_base.trim())
            .with_context(|| format!("{BASE_URL_VAR} is not a valid URL: '{raw_base}'"))?;

        let storage_path = lookup(STORAGE_PATH_VAR)
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_STORAGE_PATH));

        let timeout = match lookup(TIMEOUT_VAR).filter(|t| !t.trim().is_empty()) {
            Some(secs) => Some(Duration::from_secs(
                secs.trim()
                    .parse()
                    .with_context(|| format!("{TIMEOUT_VAR} must be a whole number of seconds"))?,
            )),
            None => None,
        };

        Ok(Self {
            base_url,
            storage_path,
            timeout,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ServiceConfig::from_lookup(lookup(&[(BASE_URL_VAR, "https://api.shop.test")])).unwrap();

        assert_eq!(config.base_url.as_str(), "https://api.shop.test/");
        assert_eq!(config.storage_path, PathBuf::from(DEFAULT_STORAGE_PATH));
        assert_eq!(config.timeout, None);
    }

    #[test]
    fn test_all_values() {
        let config = ServiceConfig::from_lookup(lookup(&[
            (BASE_URL_VAR, "https://api.shop.test/v1"),
            (STORAGE_PATH_VAR, "/tmp/shop.json"),
            (TIMEOUT_VAR, "15"),
        ]))
        .unwrap();

        assert_eq!(config.base_url.as_str(), "https://api.shop.test/v1");
        assert_eq!(config.storage_path, PathBuf::from("/tmp/shop.json"));
        assert_eq!(config.timeout, Some(Duration::from_secs(15)));
    }

    #[test]
    fn test_missing_base_url_fails() {
        let err = ServiceConfig::from_lookup(lookup(&[])).unwrap_err();
        assert!(err.to_string().contains(BASE_URL_VAR));
    }

    #[test]
    fn test_invalid_base_url_fails() {
        assert!(ServiceConfig::from_lookup(lookup(&[(BASE_URL_VAR, "not a url")])).is_err());
    }

    #[test]
    fn test_invalid_timeout_fails() {
        let result = ServiceConfig::from_lookup(lookup(&[
            (BASE_URL_VAR, "https://api.shop.test"),
            (TIMEOUT_VAR, "soon"),
        ]));
        assert!(result.is_err());
    }
}
