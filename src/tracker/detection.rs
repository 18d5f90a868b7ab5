//! Per-frame detector output consumed by the tracker.

use crate::tracker::rect::Rect;

/// Detection input for the tracker.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Detection {
    /// Bounding box in pixel coordinates
    pub bbox: Rect,
    /// Detection confidence in [0, 1]
    pub score: f32,
}

impl Detection {
    pub fn new(x0: f32, y0: f32, x1: f32, y1: f32, score: f32) -> Self {
        Self {
            bbox: Rect::from_tlbr(x0, y0, x1, y1),
            score,
        }
    }

    pub fn from_rect(bbox: Rect, score: f32) -> Self {
        Self { bbox, score }
    }
}

/// Pick the detection the tracker should see this tick.
///
/// Returns the highest-scoring detection whose score is at least `threshold`,
/// or `None` when nothing qualifies. NaN scores never qualify.
pub fn select_best<I>(detections: I, threshold: f32) -> Option<Detection>
where
    I: IntoIterator<Item = Detection>,
{
    detections
        .into_iter()
        .filter(|d| d.score >= threshold)
        .max_by(|a, b| a.score.total_cmp(&b.score))
}
