//! Builder for creating Detection objects from various input formats.

use crate::tracker::{Detection, Rect};

/// Builder for creating `Detection` objects from various input formats.
#[derive(Debug, Clone, Default)]
pub struct DetectionBuilder {
    bbox: Rect,
    score: f32,
    frame: Option<(u32, u32)>,
}

impl DetectionBuilder {
    /// Create a new detection builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set bounding box in TLBR format (x0, y0, x1, y1).
    pub fn tlbr(mut self, x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        self.bbox = Rect::from_tlbr(x0, y0, x1, y1);
        self
    }

    /// Set bounding box in XYWH format (center_x, center_y, width, height).
    pub fn xywh(mut self, cx: f32, cy: f32, w: f32, h: f32) -> Self {
        self.bbox = Rect::from_tlbr(cx - w / 2.0, cy - h / 2.0, cx + w / 2.0, cy + h / 2.0);
        self
    }

    /// Set bounding box in TLWH format (left, top, width, height).
    pub fn tlwh(mut self, x: f32, y: f32, w: f32, h: f32) -> Self {
        self.bbox = Rect::from_tlwh(x, y, w, h);
        self
    }

    /// Set bounding box from a center box given in fractions of a
    /// `frame_width` x `frame_height` frame. The box is also clamped to
    /// that frame on build.
    pub fn normalized_center(
        mut self,
        cx: f32,
        cy: f32,
        w: f32,
        h: f32,
        frame_width: u32,
        frame_height: u32,
    ) -> Self {
        self.bbox = Rect::from_normalized_center(cx, cy, w, h, frame_width, frame_height);
        self.frame = Some((frame_width, frame_height));
        self
    }

    /// Clamp the built box to a frame of the given size.
    pub fn clamp_to(mut self, frame_width: u32, frame_height: u32) -> Self {
        self.frame = Some((frame_width, frame_height));
        self
    }

    /// Set the confidence score.
    pub fn score(mut self, score: f32) -> Self {
        self.score = score;
        self
    }

    /// Build the final `Detection`.
    pub fn build(self) -> Detection {
        let bbox = match self.frame {
            Some((w, h)) => self.bbox.normalized().clamp(w, h),
            None => self.bbox,
        };
        Detection::from_rect(bbox, self.score)
    }
}
