//! Burn inference backend for palm detection.
//!
//! This module provides a `BurnPalmDetector` that implements `DetectionSource`
//! for palm detection models built with the Burn framework.
//!
//! # Example
//!
//! ```ignore
//! use palm_gate::integration::{BurnPalmDetector, BurnPalmModel, DetectorConfig};
//! use burn::backend::NdArray;
//!
//! // Implement BurnPalmModel for your palm detection model
//! struct MediaPipePalm { /* ... */ }
//!
//! impl BurnPalmModel<NdArray> for MediaPipePalm {
//!     fn forward(&self, input: burn::tensor::Tensor<NdArray, 4>) -> ndarray::Array2<f32> {
//!         // Run inference, one row per anchor
//!     }
//! }
//!
//! let model = MediaPipePalm::load("palm_detection.bin");
//! let detector = BurnPalmDetector::new(model, Default::default(), app_config.detector);
//! ```

use burn::prelude::*;
use burn::tensor::Tensor;
use ndarray::Array2;
use thiserror::Error;

use super::{DecodeError, DetectionSource, DetectorConfig, Frame};
use crate::tracker::Detection;

/// Error type for Burn detection failures.
#[derive(Debug, Clone, Error)]
pub enum BurnDetectorError {
    /// The model takes RGB input only.
    #[error("expected a 3-channel frame, got {0} channels")]
    UnsupportedChannels(usize),
    /// Model output could not be decoded.
    #[error(transparent)]
    Decode(#[from] DecodeError),
}

/// Trait for Burn-based palm detection models.
///
/// Implement this trait for your specific model architecture.
pub trait BurnPalmModel<B: Backend>: Send + Sync {
    /// Run forward pass on the input tensor.
    ///
    /// # Arguments
    /// * `input` - Input tensor of shape [batch, height, width, channels]
    ///
    /// # Returns
    /// One row per anchor, laid out as described by the detector's
    /// [`PalmOutputLayout`](super::PalmOutputLayout).
    fn forward(&self, input: Tensor<B, 4>) -> Array2<f32>;
}

/// Burn-based palm detector implementing `DetectionSource`.
///
/// Frames of any size are scaled to the model input for inference only;
/// boxes come back in pixels of the original frame.
pub struct BurnPalmDetector<B: Backend, M: BurnPalmModel<B>> {
    model: M,
    device: B::Device,
    config: DetectorConfig,
}

impl<B: Backend, M: BurnPalmModel<B>> BurnPalmDetector<B, M> {
    /// Create a new Burn detector with the given model, device and settings.
    pub fn new(model: M, device: B::Device, config: DetectorConfig) -> Self {
        Self {
            model,
            device,
            config,
        }
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    /// Convert a frame to a `[1, S, S, 3]` tensor normalized to roughly [-1, 1],
    /// where `S` is the configured input size.
    pub fn preprocess(&self, frame: &Frame) -> Result<Tensor<B, 4>, BurnDetectorError> {
        if frame.channels() != 3 {
            return Err(BurnDetectorError::UnsupportedChannels(frame.channels()));
        }

        let size = self.config.input_size;
        let resized;
        let input = if frame.width() == size && frame.height() == size {
            frame
        } else {
            resized = frame
                .resized(size, size)
                .ok_or(BurnDetectorError::UnsupportedChannels(frame.channels()))?;
            &resized
        };

        let data: Vec<f32> = input
            .to_raw()
            .into_iter()
            .map(|x| (x as f32 - 128.0) / 128.0)
            .collect();

        let tensor = Tensor::<B, 1>::from_floats(data.as_slice(), &self.device).reshape([
            1,
            size as usize,
            size as usize,
            3,
        ]);

        Ok(tensor)
    }
}

impl<B: Backend, M: BurnPalmModel<B>> DetectionSource for BurnPalmDetector<B, M> {
    type Error = BurnDetectorError;

    fn detect(&mut self, frame: &Frame) -> Result<Vec<Detection>, Self::Error> {
        let tensor = self.preprocess(frame)?;
        let output = self.model.forward(tensor);
        Ok(self.config.decode(output.view(), frame)?)
    }
}
