//! Steadiness tracking and upload gating for a single camera stream.

use tracing::{debug, info, trace};

use crate::tracker::config::{ConfigError, LockExpiry, TrackerConfig};
use crate::tracker::detection::Detection;
use crate::tracker::rect::Rect;
use crate::tracker::track_state::{Timestamp, TrackState};

/// Outcome of one tracker tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action {
    NoAction,
    /// The palm has been steady long enough and the cooldown has elapsed.
    /// `bbox` is the reference box, which is what the caller should crop.
    UploadReady { bbox: Rect },
}

impl Action {
    pub fn is_upload_ready(&self) -> bool {
        matches!(self, Action::UploadReady { .. })
    }
}

/// Decides, frame by frame, whether a detected palm is being held steadily
/// and when an upload may be triggered.
///
/// One instance per camera stream. The tracker performs no I/O: an
/// [`Action::UploadReady`] is only a return value, and upload outcomes are
/// never fed back into it.
#[derive(Debug, Clone)]
pub struct SteadinessTracker {
    config: TrackerConfig,
    state: TrackState,
    last_emitted_at: Option<Timestamp>,
}

impl SteadinessTracker {
    pub fn new(config: TrackerConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            state: TrackState::Unlocked,
            last_emitted_at: None,
        })
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    pub fn state(&self) -> &TrackState {
        &self.state
    }

    pub fn last_emitted_at(&self) -> Option<Timestamp> {
        self.last_emitted_at
    }

    pub fn is_steady(&self, now: Timestamp) -> bool {
        self.state.is_steady(now, self.config.steady_duration)
    }

    /// Forget the current palm and the cooldown, as on stream restart.
    pub fn reset(&mut self) {
        self.state = TrackState::Unlocked;
        self.last_emitted_at = None;
    }

    /// Advance the tracker by one frame.
    ///
    /// `detection` is the best detection of the frame, if any; detections
    /// below the confidence threshold or with a non-finite box count as a
    /// miss. `now` must not go backwards between calls.
    pub fn update(&mut self, detection: Option<Detection>, now: Timestamp) -> Action {
        let threshold = self.config.confidence_threshold;
        let Some(detection) = detection.filter(|d| d.score >= threshold && d.bbox.is_finite())
        else {
            self.on_miss(now);
            return Action::NoAction;
        };
        let bbox = detection.bbox.normalized();

        match self.state {
            TrackState::Unlocked => {
                debug!(?bbox, score = detection.score, "palm locked");
                self.state = TrackState::locked(bbox, now);
                return Action::NoAction;
            }
            TrackState::Locked { reference, .. }
                if reference.movement(&bbox) > self.config.movement_threshold =>
            {
                debug!(
                    movement = reference.movement(&bbox),
                    ?bbox,
                    "palm moved, steadiness reset"
                );
                self.state = TrackState::locked(bbox, now);
                return Action::NoAction;
            }
            TrackState::Locked {
                ref mut last_seen,
                ref mut missed_frames,
                ..
            } => {
                // The reference box stays put; only the miss bookkeeping moves.
                *last_seen = now;
                *missed_frames = 0;
            }
        }

        self.try_emit(now)
    }

    fn on_miss(&mut self, now: Timestamp) {
        let expiry = self.config.lock_expiry;
        if let TrackState::Locked {
            last_seen,
            ref mut missed_frames,
            ..
        } = self.state
        {
            *missed_frames = missed_frames.saturating_add(1);
            let expired = match expiry {
                LockExpiry::Never => false,
                LockExpiry::AfterMissedFrames(limit) => *missed_frames >= limit,
                LockExpiry::AfterMissedTime(limit) => now.saturating_sub(last_seen) > limit,
            };
            if expired {
                debug!(missed = *missed_frames, "palm lost, lock released");
                self.state = TrackState::Unlocked;
            }
        }
    }

    fn try_emit(&mut self, now: Timestamp) -> Action {
        let Some(bbox) = self.state.reference() else {
            return Action::NoAction;
        };
        if !self.is_steady(now) {
            return Action::NoAction;
        }

        let cooled_down = match self.last_emitted_at {
            None => true,
            Some(last) => now.saturating_sub(last) > self.config.upload_cooldown,
        };
        if !cooled_down {
            trace!("palm steady, upload cooling down");
            return Action::NoAction;
        }

        let emitted_at = self.last_emitted_at.map_or(now, |last| last.max(now));
        self.last_emitted_at = Some(emitted_at);
        info!(?bbox, at = ?now, "palm steady, upload ready");
        Action::UploadReady { bbox }
    }
}
