//! Configuration module

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use accessguru_core::constants::{DEFAULT_ARTIFACT_PATH, DEFAULT_TOP_FEATURES};

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Server port
    pub port: u16,

    /// Model artifact blob
    pub artifact_path: PathBuf,

    /// Expected SHA-256 of the artifact (hex); unchecked when unset
    pub artifact_sha256: Option<String>,

    /// Entries in the ranked contribution view
    pub top_features: usize,

    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,

    /// Emit JSON log lines (LOG_FORMAT=json)
    pub log_json: bool,

    /// Environment (development, production)
    pub environment: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8000,
            artifact_path: PathBuf::from(DEFAULT_ARTIFACT_PATH),
            artifact_sha256: None,
            top_features: DEFAULT_TOP_FEATURES,
            request_timeout_secs: 30,
            log_json: false,
            environment: "development".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        Self {
            port: var("PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),

            artifact_path: var("ARTIFACT_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.artifact_path),

            artifact_sha256: var("ARTIFACT_SHA256")
                .filter(|s| !s.trim().is_empty()),

            top_features: var("TOP_FEATURES")
                .and_then(|n| n.parse().ok())
                .filter(|&n: &usize| n > 0)
                .unwrap_or(defaults.top_features),

            request_timeout_secs: var("REQUEST_TIMEOUT_SECS")
                .and_then(|s| s.parse().ok())
                .filter(|&n: &u64| n > 0)
                .unwrap_or(defaults.request_timeout_secs),

            log_json: var("LOG_FORMAT")
                .map(|f| f.eq_ignore_ascii_case("json"))
                .unwrap_or(false),

            environment: var("ENVIRONMENT").unwrap_or(defaults.environment),
        }
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(vars: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = config_from(&[]);
        assert_eq!(config.port, 8000);
        assert_eq!(config.top_features, DEFAULT_TOP_FEATURES);
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
        assert!(!config.log_json);
    }

    #[test]
    fn test_zero_timeout_falls_back_to_default() {
        let config = config_from(&[("REQUEST_TIMEOUT_SECS", "0"), ("TOP_FEATURES", "0")]);
        assert_eq!(config.request_timeout_secs, 30);
        assert_eq!(config.top_features, DEFAULT_TOP_FEATURES);

        let config = config_from(&[("REQUEST_TIMEOUT_SECS", "5"), ("LOG_FORMAT", "JSON")]);
        assert_eq!(config.request_timeout(), Duration::from_secs(5));
        assert!(config.log_json);
    }
}
