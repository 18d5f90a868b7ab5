use std::time::Duration;

use crate::tracker::rect::Rect;

/// Position on the stream's monotonic clock. The origin is arbitrary but
/// fixed for the lifetime of one stream.
pub type Timestamp = Duration;

/// Lock state of a single camera stream.
///
/// "Steady" is not a state of its own: it is derived from `since` on every
/// tick, see [`TrackState::is_steady`].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum TrackState {
    /// No palm is being tracked
    #[default]
    Unlocked,
    /// A reference box is held as the anchor for steadiness comparison
    Locked {
        /// Box the current palm was first seen at
        reference: Rect,
        /// When `reference` was established
        since: Timestamp,
        /// Last tick with a qualifying detection
        last_seen: Timestamp,
        /// Consecutive ticks without a qualifying detection
        missed_frames: u32,
    },
}

impl TrackState {
    pub fn locked(reference: Rect, now: Timestamp) -> Self {
        Self::Locked {
            reference,
            since: now,
            last_seen: now,
            missed_frames: 0,
        }
    }

    pub fn is_locked(&self) -> bool {
        matches!(self, Self::Locked { .. })
    }

    pub fn reference(&self) -> Option<Rect> {
        match self {
            Self::Locked { reference, .. } => Some(*reference),
            Self::Unlocked => None,
        }
    }

    pub fn steady_since(&self) -> Option<Timestamp> {
        match self {
            Self::Locked { since, .. } => Some(*since),
            Self::Unlocked => None,
        }
    }

    /// Whether the reference box has been held for at least `steady_duration`.
    pub fn is_steady(&self, now: Timestamp, steady_duration: Duration) -> bool {
        match self {
            Self::Locked { since, .. } => now.saturating_sub(*since) >= steady_duration,
            Self::Unlocked => false,
        }
    }
}
