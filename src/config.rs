//! Application configuration loaded from a JSON file.
//!
//! Every section has defaults, so a partial file (or `{}`) is valid.
//! Durations are written as fractional seconds.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{Error, Result};
use crate::integration::DetectorConfig;
use crate::tracker::TrackerConfig;
use crate::upload::UploadConfig;

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Filter directive understood by `tracing_subscriber::EnvFilter`.
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub tracker: TrackerConfig,
    pub detector: DetectorConfig,
    pub upload: UploadConfig,
    pub log_level: LogLevel,
}

impl AppConfig {
    /// Read and validate a config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let config: AppConfig = serde_json::from_str(&content)?;
        config.validate()?;
        info!(path = %path.display(), "config loaded");
        Ok(config)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        self.tracker.validate()?;

        if self.detector.input_size == 0 {
            return Err(Error::Config("detector input size must be positive".into()));
        }
        if self.upload.endpoint.trim().is_empty() {
            return Err(Error::Config("upload endpoint must not be empty".into()));
        }
        if self.upload.queue_capacity == 0 {
            return Err(Error::Config("upload queue capacity must be positive".into()));
        }
        if !(1..=100).contains(&self.upload.jpeg_quality) {
            return Err(Error::Config(format!(
                "jpeg quality must be in 1..=100, got {}",
                self.upload.jpeg_quality
            )));
        }
        Ok(())
    }
}

/// Serde adapter storing a `Duration` as fractional seconds.
pub mod secs {
    use std::time::Duration;

    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(value.as_secs_f64())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs)
            .map_err(|_| D::Error::custom(format!("invalid duration in seconds: {secs}")))
    }
}
