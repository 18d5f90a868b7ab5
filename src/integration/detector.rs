//! Trait for palm detection inference backends.

use crate::integration::Frame;
use crate::tracker::Detection;

/// Trait for palm detection inference backends.
///
/// Implement this trait to connect any detection model to the capture
/// pipeline. Returned boxes must be in pixel coordinates of `frame` and
/// scores must be probabilities in [0, 1].
///
/// # Example
///
/// ```ignore
/// use palm_gate::{Detection, DetectionSource, Frame};
///
/// struct MyDetector {
///     // Your model here
/// }
///
/// impl DetectionSource for MyDetector {
///     type Error = std::io::Error;
///
///     fn detect(&mut self, frame: &Frame) -> Result<Vec<Detection>, Self::Error> {
///         // Run inference and return detections
///         Ok(vec![])
///     }
/// }
/// ```
pub trait DetectionSource {
    /// Error type for detection failures.
    type Error: std::error::Error;

    /// Run inference on one frame and return every candidate palm.
    fn detect(&mut self, frame: &Frame) -> Result<Vec<Detection>, Self::Error>;
}

/// Helper trait for converting model-specific outputs to `Detection`.
///
/// Implement this for your model's output format to enable easy conversion.
pub trait IntoDetections {
    /// Convert the output into a vector of detections.
    fn into_detections(self) -> Vec<Detection>;
}

impl IntoDetections for Vec<Detection> {
    fn into_detections(self) -> Vec<Detection> {
        self
    }
}

impl IntoDetections for Option<Detection> {
    fn into_detections(self) -> Vec<Detection> {
        self.into_iter().collect()
    }
}
