//! Palm steadiness tracking and upload gating.
//!
//! A camera loop feeds one detection (or none) per frame into a
//! [`SteadinessTracker`]. The tracker decides whether the palm is being held
//! steadily and when an upload may fire, subject to a cooldown. The
//! [`integration`] module wires detector backends and frames to the tracker,
//! and [`upload`] gets cropped palms to the processing server off the frame
//! loop.

pub mod config;
pub mod error;
pub mod integration;
pub mod logging;
pub mod replay;
pub mod tracker;
pub mod upload;

pub use config::AppConfig;
pub use error::{Error, Result};
pub use integration::{CapturePipeline, DetectionSource, Frame, FrameOutcome};
pub use tracker::{Action, Detection, LockExpiry, Rect, SteadinessTracker, TrackerConfig};
pub use upload::{HttpUploader, UploadDispatcher, UploadPurpose};
