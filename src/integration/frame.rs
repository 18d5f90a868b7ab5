//! Owned camera frame backed by an ndarray buffer.

use image::imageops::{self, FilterType};
use image::{GrayImage, RgbImage};
use ndarray::{Array3, ArrayView3, ShapeError, s};

use crate::tracker::Rect;

/// A single camera frame in row-major HWC layout (height x width x channels).
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pixels: Array3<u8>,
}

impl Frame {
    /// Wrap a raw interleaved pixel buffer.
    ///
    /// Fails when `bytes.len() != width * height * channels`.
    pub fn from_raw(
        width: u32,
        height: u32,
        channels: usize,
        bytes: Vec<u8>,
    ) -> Result<Self, ShapeError> {
        let pixels = Array3::from_shape_vec((height as usize, width as usize, channels), bytes)?;
        Ok(Self { pixels })
    }

    pub fn from_array(pixels: Array3<u8>) -> Self {
        Self { pixels }
    }

    /// A frame with every byte set to `value`.
    pub fn filled(width: u32, height: u32, channels: usize, value: u8) -> Self {
        Self {
            pixels: Array3::from_elem((height as usize, width as usize, channels), value),
        }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.pixels.dim().1 as u32
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.pixels.dim().0 as u32
    }

    #[inline]
    pub fn channels(&self) -> usize {
        self.pixels.dim().2
    }

    pub fn pixels(&self) -> ArrayView3<'_, u8> {
        self.pixels.view()
    }

    /// Interleaved bytes in row-major order.
    pub fn to_raw(&self) -> Vec<u8> {
        self.pixels.iter().copied().collect()
    }

    /// Scale to `width` x `height` with a triangle filter.
    ///
    /// Only grayscale and RGB frames can be resized.
    pub fn resized(&self, width: u32, height: u32) -> Option<Frame> {
        let (w, h) = (self.width(), self.height());
        let bytes = match self.channels() {
            1 => {
                let image = GrayImage::from_raw(w, h, self.to_raw())?;
                imageops::resize(&image, width, height, FilterType::Triangle).into_raw()
            }
            3 => {
                let image = RgbImage::from_raw(w, h, self.to_raw())?;
                imageops::resize(&image, width, height, FilterType::Triangle).into_raw()
            }
            _ => return None,
        };
        Frame::from_raw(width, height, self.channels(), bytes).ok()
    }

    /// Copy out the region covered by `bbox`.
    ///
    /// The box is normalized and clamped to the frame first, and fractional
    /// coordinates are truncated to whole pixels. Returns `None` when
    /// nothing is left to crop.
    pub fn crop(&self, bbox: &Rect) -> Option<Frame> {
        let area = bbox.normalized().clamp(self.width(), self.height());
        let (x0, y0) = (area.x0 as usize, area.y0 as usize);
        let (x1, y1) = (area.x1 as usize, area.y1 as usize);
        if x1 <= x0 || y1 <= y0 {
            return None;
        }

        let region = self.pixels.slice(s![y0..y1, x0..x1, ..]).to_owned();
        Some(Frame { pixels: region })
    }
}
