//! Tracker configuration and its validation.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::config::secs;

/// When a held lock is given up after the palm stops being detected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LockExpiry {
    /// Misses never release the lock; only large movement re-anchors it.
    #[default]
    Never,
    /// Release after this many consecutive frames without a qualifying detection.
    AfterMissedFrames(u32),
    /// Release once no qualifying detection has been seen for this long.
    AfterMissedTime(#[serde(with = "secs")] Duration),
}

/// Configuration for the SteadinessTracker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Minimum detection score, as a probability in [0, 1].
    pub confidence_threshold: f32,
    /// Maximum corner movement in pixels before the palm counts as a new one.
    pub movement_threshold: f32,
    /// How long the palm must stay within the movement threshold.
    #[serde(with = "secs")]
    pub steady_duration: Duration,
    /// Minimum spacing between two upload-ready events.
    #[serde(with = "secs")]
    pub upload_cooldown: Duration,
    pub lock_expiry: LockExpiry,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: 0.5,
            movement_threshold: 30.0,
            steady_duration: Duration::ZERO,
            upload_cooldown: Duration::from_secs(2),
            lock_expiry: LockExpiry::Never,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("confidence threshold must be a probability in [0, 1], got {0}")]
    ConfidenceThreshold(f32),
    #[error("movement threshold must be a finite, non-negative pixel distance, got {0}")]
    MovementThreshold(f32),
    #[error("lock expiry needs a positive missed-frame count")]
    ZeroMissedFrames,
}

impl TrackerConfig {
    /// Check every threshold for a usable value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let conf = self.confidence_threshold;
        if !conf.is_finite() || !(0.0..=1.0).contains(&conf) {
            return Err(ConfigError::ConfidenceThreshold(conf));
        }
        if conf >= 1.0 {
            warn!(
                threshold = conf,
                "confidence threshold of 1.0 rejects nearly every detection"
            );
        }

        let movement = self.movement_threshold;
        if !movement.is_finite() || movement < 0.0 {
            return Err(ConfigError::MovementThreshold(movement));
        }

        if self.lock_expiry == LockExpiry::AfterMissedFrames(0) {
            return Err(ConfigError::ZeroMissedFrames);
        }

        Ok(())
    }
}
