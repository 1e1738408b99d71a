//! Application configuration
//!
//! Values come from a TOML file when one is present, otherwise from defaults.
//! The upload endpoint can be overridden with `VOICEFLOW_UPLOAD_URL`.

use crate::error::{Result, VoiceFlowError};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

/// Environment variable naming an explicit config file
pub const CONFIG_PATH_ENV: &str = "VOICEFLOW_CONFIG";

/// Environment variable overriding the upload endpoint
pub const UPLOAD_URL_ENV: &str = "VOICEFLOW_UPLOAD_URL";

/// Default backend endpoint for recorded audio
pub const DEFAULT_UPLOAD_URL: &str = "http://localhost:8000/upload-audio/";

/// Greeting shown as the first assistant message
pub const DEFAULT_GREETING: &str = "Hello! How can I assist you today?";

/// Configuration for the whole client
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// Endpoint receiving the multipart audio upload
    pub upload_url: String,
    /// Recording ceiling before the controller stops on its own
    pub max_recording_secs: u64,
    /// Simulated latency for text and image replies
    pub response_delay_ms: u64,
    /// HTTP client timeout for the upload round-trip
    pub request_timeout_secs: u64,
    /// Initial assistant message (none when unset)
    pub greeting: Option<String>,
    /// Capacity of the command and event channels
    pub channel_buffer_size: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            upload_url: DEFAULT_UPLOAD_URL.to_string(),
            max_recording_secs: 30,
            response_delay_ms: 2000,
            request_timeout_secs: 60,
            greeting: Some(DEFAULT_GREETING.to_string()),
            channel_buffer_size: 100,
        }
    }
}

impl AppConfig {
    /// Load a configuration from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            VoiceFlowError::ConfigError(format!("Failed to read {}: {}", path.display(), e))
        })?;

        let config: AppConfig = toml::from_str(&content).map_err(|e| {
            VoiceFlowError::ConfigError(format!("Failed to parse {}: {}", path.display(), e))
        })?;

        debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Load from `$VOICEFLOW_CONFIG`, then the user config dir, then defaults
    ///
    /// `$VOICEFLOW_UPLOAD_URL` is applied last.
    pub fn load_or_default() -> Result<Self> {
        let explicit = std::env::var_os(CONFIG_PATH_ENV).map(PathBuf::from);

        let mut config = match explicit {
            Some(path) => Self::load(path)?,
            None => match Self::default_path().filter(|p| p.exists()) {
                Some(path) => Self::load(path)?,
                None => {
                    info!("No config file found, using defaults");
                    Self::default()
                }
            },
        };

        if let Ok(url) = std::env::var(UPLOAD_URL_ENV) {
            info!("Upload endpoint overridden from environment: {}", url);
            config.upload_url = url;
        }

        config.validate()?;
        Ok(config)
    }

    /// `<config_dir>/voiceflow/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("voiceflow").join("config.toml"))
    }

    /// Set the upload endpoint
    pub fn with_upload_url(mut self, url: impl Into<String>) -> Self {
        self.upload_url = url.into();
        self
    }

    /// Set the recording ceiling in seconds
    pub fn with_max_recording_secs(mut self, secs: u64) -> Self {
        self.max_recording_secs = secs;
        self
    }

    /// Set the simulated reply latency in milliseconds
    pub fn with_response_delay_ms(mut self, ms: u64) -> Self {
        self.response_delay_ms = ms;
        self
    }

    /// Set or remove the greeting
    pub fn with_greeting(mut self, greeting: Option<String>) -> Self {
        self.greeting = greeting;
        self
    }

    /// Set the channel buffer size
    pub fn with_channel_buffer_size(mut self, size: usize) -> Self {
        self.channel_buffer_size = size;
        self
    }

    pub fn max_recording(&self) -> Duration {
        Duration::from_secs(self.max_recording_secs)
    }

    pub fn response_delay(&self) -> Duration {
        Duration::from_millis(self.response_delay_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        let url = reqwest::Url::parse(&self.upload_url).map_err(|e| {
            VoiceFlowError::ConfigError(format!("Invalid upload URL {:?}: {}", self.upload_url, e))
        })?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(VoiceFlowError::ConfigError(format!(
                "Upload URL must be http or https, got {}",
                url.scheme()
            )));
        }

        if self.max_recording_secs == 0 {
            return Err(VoiceFlowError::ConfigError(
                "max_recording_secs must be greater than zero".to_string(),
            ));
        }

        if self.request_timeout_secs == 0 {
            return Err(VoiceFlowError::ConfigError(
                "request_timeout_secs must be greater than zero".to_string(),
            ));
        }

        if self.channel_buffer_size == 0 {
            return Err(VoiceFlowError::ConfigError(
                "channel_buffer_size must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.upload_url, DEFAULT_UPLOAD_URL);
        assert_eq!(config.max_recording(), Duration::from_secs(30));
        assert_eq!(config.response_delay(), Duration::from_millis(2000));
        assert_eq!(config.greeting.as_deref(), Some(DEFAULT_GREETING));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_builder() {
        let config = AppConfig::default()
            .with_upload_url("https://example.com/upload")
            .with_max_recording_secs(5)
            .with_response_delay_ms(0)
            .with_greeting(None);

        assert_eq!(config.upload_url, "https://example.com/upload");
        assert_eq!(config.max_recording(), Duration::from_secs(5));
        assert_eq!(config.response_delay(), Duration::ZERO);
        assert!(config.greeting.is_none());
    }

    #[test]
    fn test_load_partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "upload_url = \"http://127.0.0.1:9000/upload-audio/\"").unwrap();
        writeln!(file, "response_delay_ms = 250").unwrap();

        let config = AppConfig::load(file.path()).unwrap();
        assert_eq!(config.upload_url, "http://127.0.0.1:9000/upload-audio/");
        assert_eq!(config.response_delay_ms, 250);
        assert_eq!(config.max_recording_secs, 30);
    }

    #[test]
    fn test_load_invalid_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "upload_url = ").unwrap();

        let err = AppConfig::load(file.path()).unwrap_err();
        assert!(matches!(err, VoiceFlowError::ConfigError(_)));
    }

    #[test]
    fn test_load_missing_file() {
        let err = AppConfig::load("/nonexistent/voiceflow.toml").unwrap_err();
        assert!(matches!(err, VoiceFlowError::ConfigError(_)));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        assert!(AppConfig::default().with_upload_url("not a url").validate().is_err());
        assert!(AppConfig::default().with_upload_url("ftp://host/x").validate().is_err());
        assert!(AppConfig::default().with_max_recording_secs(0).validate().is_err());
        assert!(AppConfig::default().with_channel_buffer_size(0).validate().is_err());
    }
}
