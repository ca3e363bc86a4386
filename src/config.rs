use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::client::DEFAULT_ENDPOINT;
use crate::error::{IoResultExt, Result};
use crate::transport::http::DEFAULT_USER_AGENT;

/// environment variable overriding the endpoint
pub const ENDPOINT_ENV: &str = "REVERSENOTE_ENDPOINT";
/// environment variable overriding the token
pub const TOKEN_ENV: &str = "REVERSENOTE_TOKEN";

/// client configuration, usually stored as toml
#[derive(Clone, Serialize, Deserialize)]
pub struct Config {
    /// url of the `api.php` endpoint
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// api token sent with every request
    #[serde(default)]
    pub token: String,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// request timeout; requests wait indefinitely when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

impl Config {
    /// config for the default endpoint with the given token
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            ..Self::default()
        }
    }

    /// load config from file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).with_path(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// save config to file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).with_path(path)?;
        Ok(())
    }

    /// apply `REVERSENOTE_ENDPOINT` and `REVERSENOTE_TOKEN` when set
    pub fn apply_env(self) -> Self {
        self.with_overrides(
            std::env::var(ENDPOINT_ENV).ok(),
            std::env::var(TOKEN_ENV).ok(),
        )
    }

    /// replace endpoint and token where a non-empty value is given
    pub fn with_overrides(mut self, endpoint: Option<String>, token: Option<String>) -> Self {
        if let Some(endpoint) = endpoint.filter(|e| !e.is_empty()) {
            self.endpoint = endpoint;
        }
        if let Some(token) = token.filter(|t| !t.is_empty()) {
            self.token = token;
        }
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            token: String::new(),
            user_agent: default_user_agent(),
            timeout_secs: None,
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("endpoint", &self.endpoint)
            .field("token", &"***")
            .field("user_agent", &self.user_agent)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use tempfile::tempdir;

    #[test]
    fn test_config_toml_roundtrip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("reversenote.toml");

        let config = Config {
            endpoint: "https://samples.internal/api.php".to_string(),
            token: "abc".to_string(),
            user_agent: "triage-bot".to_string(),
            timeout_secs: Some(20),
        };
        config.save(&path).unwrap();

        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded.endpoint, config.endpoint);
        assert_eq!(loaded.token, "abc");
        assert_eq!(loaded.user_agent, "triage-bot");
        assert_eq!(loaded.timeout_secs, Some(20));
    }

    #[test]
    fn test_config_minimal_toml() {
        let config: Config = toml::from_str(r#"token = "abc""#).unwrap();
        assert_eq!(config.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.user_agent, DEFAULT_USER_AGENT);
        assert!(config.timeout_secs.is_none());
    }

    #[test]
    fn test_config_load_errors() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("missing.toml");
        assert!(matches!(Config::load(&missing), Err(Error::Io { .. })));

        let broken = dir.path().join("broken.toml");
        std::fs::write(&broken, "token = ").unwrap();
        assert!(matches!(Config::load(&broken), Err(Error::Config(_))));
    }

    #[test]
    fn test_config_overrides() {
        let config = Config::new("file-token").with_overrides(
            Some("http://mirror.local/api.php".to_string()),
            Some(String::new()),
        );
        assert_eq!(config.endpoint, "http://mirror.local/api.php");
        assert_eq!(config.token, "file-token");
    }

    #[test]
    fn test_config_debug_hides_token() {
        let config = Config::new("very-secret");
        assert!(!format!("{:?}", config).contains("very-secret"));
    }
}
