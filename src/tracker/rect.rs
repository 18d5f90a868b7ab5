/// Axis-aligned bounding box in pixel coordinates of the source frame.
///
/// Stored as TLBR corners because both the movement metric and frame
/// cropping work on corners. Conversions to and from the other common
/// formats are provided:
/// - TLWH: Top-Left X, Top-Left Y, Width, Height
/// - Normalized center: center X, center Y, width, height as fractions of the frame
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rect {
    /// Left edge
    pub x0: f32,
    /// Top edge
    pub y0: f32,
    /// Right edge
    pub x1: f32,
    /// Bottom edge
    pub y1: f32,
}

impl Rect {
    /// Create a Rect from TLBR format (left, top, right, bottom).
    #[inline]
    pub fn from_tlbr(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    /// Create a Rect from top-left coordinates and dimensions (TLWH format).
    #[inline]
    pub fn from_tlwh(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x0: x,
            y0: y,
            x1: x + width,
            y1: y + height,
        }
    }

    /// Create a Rect from a center box expressed in fractions of the frame,
    /// scaled to pixels of a `frame_width` x `frame_height` frame.
    ///
    /// This is the box format palm detectors emit. The result is not clamped.
    pub fn from_normalized_center(
        cx: f32,
        cy: f32,
        width: f32,
        height: f32,
        frame_width: u32,
        frame_height: u32,
    ) -> Self {
        let fw = frame_width as f32;
        let fh = frame_height as f32;
        Self {
            x0: (cx - width / 2.0) * fw,
            y0: (cy - height / 2.0) * fh,
            x1: (cx + width / 2.0) * fw,
            y1: (cy + height / 2.0) * fh,
        }
    }

    /// Convert to TLBR format: (x0, y0, x1, y1).
    #[inline]
    pub fn to_tlbr(&self) -> [f32; 4] {
        [self.x0, self.y0, self.x1, self.y1]
    }

    /// Convert to TLWH format: (x, y, width, height).
    #[inline]
    pub fn to_tlwh(&self) -> [f32; 4] {
        [self.x0, self.y0, self.width(), self.height()]
    }

    #[inline]
    pub fn width(&self) -> f32 {
        self.x1 - self.x0
    }

    #[inline]
    pub fn height(&self) -> f32 {
        self.y1 - self.y0
    }

    /// Get the center point of the bounding box.
    #[inline]
    pub fn center(&self) -> (f32, f32) {
        ((self.x0 + self.x1) / 2.0, (self.y0 + self.y1) / 2.0)
    }

    /// Area of the box; zero for degenerate or inverted boxes.
    #[inline]
    pub fn area(&self) -> f32 {
        self.width().max(0.0) * self.height().max(0.0)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.area() <= 0.0
    }

    /// True when no coordinate is NaN or infinite.
    pub fn is_finite(&self) -> bool {
        self.to_tlbr().iter().all(|v| v.is_finite())
    }

    /// Swap inverted corners so that `x0 <= x1` and `y0 <= y1`.
    pub fn normalized(&self) -> Self {
        Self {
            x0: self.x0.min(self.x1),
            y0: self.y0.min(self.y1),
            x1: self.x0.max(self.x1),
            y1: self.y0.max(self.y1),
        }
    }

    /// Clamp every coordinate into `[0, frame_width] x [0, frame_height]`.
    pub fn clamp(&self, frame_width: u32, frame_height: u32) -> Self {
        let fw = frame_width as f32;
        let fh = frame_height as f32;
        Self {
            x0: self.x0.clamp(0.0, fw),
            y0: self.y0.clamp(0.0, fh),
            x1: self.x1.clamp(0.0, fw),
            y1: self.y1.clamp(0.0, fh),
        }
    }

    /// Sum of absolute corner deltas: `|dx0| + |dx1| + |dy0| + |dy1|`.
    ///
    /// This is the distance the tracker compares against its movement threshold.
    pub fn movement(&self, other: &Rect) -> f32 {
        (self.x0 - other.x0).abs()
            + (self.x1 - other.x1).abs()
            + (self.y0 - other.y0).abs()
            + (self.y1 - other.y1).abs()
    }
}
