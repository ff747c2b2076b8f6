use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

use crate::error::ChatError;

/// Backend address used when nothing else is configured.
pub const DEFAULT_API_BASE: &str = "http://localhost:8000";

/// Top-level application configuration, loaded from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub backend: BackendConfig,
    pub ui: UiConfig,
}

impl AppConfig {
    /// Load configuration from default path (~/.config/travel-chat/config.toml),
    /// falling back to defaults if the file doesn't exist.
    pub fn load() -> anyhow::Result<Self> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path.
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;
        config.backend.validate()?;
        Ok(config)
    }

    /// Write current configuration to the default path.
    pub fn save(&self) -> anyhow::Result<()> {
        self.save_to(&Self::default_path())
    }

    /// Write current configuration to a specific path.
    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = toml::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Default config file path.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("travel-chat")
            .join("config.toml")
    }

    /// Data directory for REPL history.
    pub fn data_dir() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("travel-chat")
    }
}

/// Where the assistant backend lives and how to talk to it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Base URL of the assistant API. Every message that names the backend reads it from here.
    pub api_base: String,
    /// Per-request timeout. None waits indefinitely.
    pub request_timeout_secs: Option<u64>,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.into(),
            request_timeout_secs: None,
        }
    }
}

impl BackendConfig {
    /// Check that `api_base` is an absolute http(s) URL.
    pub fn validate(&self) -> Result<(), ChatError> {
        let parsed = Url::parse(&self.api_base)?;
        match parsed.scheme() {
            "http" | "https" => Ok(()),
            other => Err(ChatError::Config(format!(
                "api_base scheme '{}' is not supported (only http/https)",
                other
            ))),
        }
    }

    /// The base URL without trailing slashes.
    pub fn base(&self) -> &str {
        self.api_base.trim_end_matches('/')
    }

    /// Join an absolute path (e.g. `/api/assist`) onto the base URL.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base(), path.trim_start_matches('/'))
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}

/// Presentation settings for the terminal front-end.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// Delay before the "connected" banner appears after a successful health probe.
    pub health_banner_delay_ms: u64,
    /// Emit ANSI styling in the terminal.
    pub color: bool,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            health_banner_delay_ms: 500,
            color: true,
        }
    }
}

impl UiConfig {
    pub fn health_banner_delay(&self) -> Duration {
        Duration::from_millis(self.health_banner_delay_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_serializes() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("localhost:8000"));
        assert!(toml_str.contains("health_banner_delay_ms"));
    }

    #[test]
    fn test_config_roundtrip() {
        let mut config = AppConfig::default();
        config.backend.request_timeout_secs = Some(15);
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.backend.api_base, config.backend.api_base);
        assert_eq!(parsed.backend.request_timeout_secs, Some(15));
        assert_eq!(parsed.ui.health_banner_delay_ms, 500);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let parsed: AppConfig = toml::from_str("[backend]\napi_base = \"http://10.0.0.5:9000\"\n").unwrap();
        assert_eq!(parsed.backend.api_base, "http://10.0.0.5:9000");
        assert!(parsed.ui.color);
        assert_eq!(parsed.backend.request_timeout(), None);
    }

    #[test]
    fn test_endpoint_trims_slashes() {
        let backend = BackendConfig {
            api_base: "http://localhost:8000/".into(),
            request_timeout_secs: None,
        };
        assert_eq!(backend.base(), "http://localhost:8000");
        assert_eq!(backend.endpoint("/api/assist"), "http://localhost:8000/api/assist");
        assert_eq!(backend.endpoint("/"), "http://localhost:8000/");
    }

    #[test]
    fn test_validate_rejects_bad_urls() {
        let mut backend = BackendConfig::default();
        assert!(backend.validate().is_ok());

        backend.api_base = "localhost:8000".into();
        assert!(backend.validate().is_err());

        backend.api_base = "ftp://example.com".into();
        let err = backend.validate().unwrap_err().to_string();
        assert!(err.contains("ftp"));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let mut config = AppConfig::default();
        config.ui.color = false;
        config.save_to(&path).unwrap();

        let loaded = AppConfig::load_from(&path).unwrap();
        assert!(!loaded.ui.color);
        assert_eq!(loaded.backend.api_base, DEFAULT_API_BASE);
    }

    #[test]
    fn test_load_from_rejects_invalid_base() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[backend]\napi_base = \"not a url\"\n").unwrap();
        assert!(AppConfig::load_from(&path).is_err());
    }
}
