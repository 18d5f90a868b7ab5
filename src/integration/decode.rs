//! Decoding of palm detector output tensors into detections.

use ndarray::ArrayView2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::integration::{DetectionBuilder, Frame};
use crate::tracker::Detection;

/// How the model's score column maps to a probability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreActivation {
    /// Raw logits; squashed with a sigmoid.
    #[default]
    Sigmoid,
    /// Already a probability.
    Identity,
}

impl ScoreActivation {
    #[inline]
    pub fn apply(self, raw: f32) -> f32 {
        match self {
            ScoreActivation::Sigmoid => 1.0 / (1.0 + (-raw).exp()),
            ScoreActivation::Identity => raw,
        }
    }
}

/// Column positions inside one row of the detector output.
///
/// Box columns are a center box in fractions of the model input, which is
/// the same as fractions of the source frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PalmOutputLayout {
    pub center_x: usize,
    pub center_y: usize,
    pub score: usize,
    pub width: usize,
    pub height: usize,
    pub activation: ScoreActivation,
}

impl Default for PalmOutputLayout {
    /// Layout of the MediaPipe palm detection export: `[cx, cy, score, w, h, ...]`.
    fn default() -> Self {
        Self {
            center_x: 0,
            center_y: 1,
            score: 2,
            width: 3,
            height: 4,
            activation: ScoreActivation::Sigmoid,
        }
    }
}

impl PalmOutputLayout {
    fn max_column(&self) -> usize {
        self.center_x
            .max(self.center_y)
            .max(self.score)
            .max(self.width)
            .max(self.height)
    }
}

/// Detector settings carried in the application config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// Square model input size in pixels.
    pub input_size: u32,
    pub layout: PalmOutputLayout,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            input_size: 192,
            layout: PalmOutputLayout::default(),
        }
    }
}

impl DetectorConfig {
    /// Decode model output for `frame`, whatever size the model saw.
    pub fn decode(
        &self,
        output: ArrayView2<'_, f32>,
        frame: &Frame,
    ) -> Result<Vec<Detection>, DecodeError> {
        decode_palm_output(output, &self.layout, frame.width(), frame.height())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("layout needs column {needed} but output rows have {width} columns")]
    ColumnOutOfRange { needed: usize, width: usize },
}

/// Decode every row of `output` into a detection on a
/// `frame_width` x `frame_height` frame.
///
/// Boxes are clamped to the frame; rows with non-finite values are skipped.
pub fn decode_palm_output(
    output: ArrayView2<'_, f32>,
    layout: &PalmOutputLayout,
    frame_width: u32,
    frame_height: u32,
) -> Result<Vec<Detection>, DecodeError> {
    let (rows, cols) = output.dim();
    if rows == 0 {
        return Ok(Vec::new());
    }
    let needed = layout.max_column();
    if needed >= cols {
        return Err(DecodeError::ColumnOutOfRange {
            needed,
            width: cols,
        });
    }

    let detections = output
        .rows()
        .into_iter()
        .filter_map(|row| {
            let cx = row[layout.center_x];
            let cy = row[layout.center_y];
            let w = row[layout.width];
            let h = row[layout.height];
            let raw_score = row[layout.score];
            if ![cx, cy, w, h, raw_score].iter().all(|v| v.is_finite()) {
                return None;
            }
            Some(
                DetectionBuilder::new()
                    .normalized_center(cx, cy, w, h, frame_width, frame_height)
                    .score(layout.activation.apply(raw_score))
                    .build(),
            )
        })
        .collect();

    Ok(detections)
}
