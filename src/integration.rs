//! Integration module for connecting palm detection backends with the
//! steadiness tracker.
//!
//! This module provides the frame type, detector traits, output decoding and
//! the per-stream capture pipeline.

mod builder;
mod decode;
mod detector;
mod frame;
mod pipeline;

pub use builder::DetectionBuilder;
pub use decode::{
    DecodeError, DetectorConfig, PalmOutputLayout, ScoreActivation, decode_palm_output,
};
pub use detector::{DetectionSource, IntoDetections};
pub use frame::Frame;
pub use pipeline::{CapturePipeline, FrameOutcome};

#[cfg(feature = "burn-backend")]
mod burn_backend;

#[cfg(feature = "burn-backend")]
pub use burn_backend::{BurnDetectorError, BurnPalmDetector, BurnPalmModel};
