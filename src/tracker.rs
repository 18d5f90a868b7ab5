mod config;
mod detection;
mod rect;
mod steadiness_tracker;
mod track_state;

pub use config::{ConfigError, LockExpiry, TrackerConfig};
pub use detection::{Detection, select_best};
pub use rect::Rect;
pub use steadiness_tracker::{Action, SteadinessTracker};
pub use track_state::{Timestamp, TrackState};
