//! JPEG encoding of cropped frames.

use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::{ExtendedColorType, ImageEncoder};
use thiserror::Error;

use crate::integration::Frame;
use crate::upload::EncodedImage;

#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("cannot encode a frame with {0} channels")]
    UnsupportedChannels(usize),

    #[error(transparent)]
    Image(#[from] image::ImageError),
}

/// Encode `frame` as a JPEG named `palm.jpg`.
///
/// Frames must be RGB (3 channels) or grayscale (1 channel).
pub fn encode_jpeg(frame: &Frame, quality: u8) -> Result<EncodedImage, EncodeError> {
    let color = match frame.channels() {
        3 => ExtendedColorType::Rgb8,
        1 => ExtendedColorType::L8,
        other => return Err(EncodeError::UnsupportedChannels(other)),
    };

    let mut bytes = Vec::new();
    JpegEncoder::new_with_quality(Cursor::new(&mut bytes), quality.clamp(1, 100)).write_image(
        &frame.to_raw(),
        frame.width(),
        frame.height(),
        color,
    )?;

    Ok(EncodedImage {
        bytes,
        filename: "palm.jpg".to_string(),
        content_type: "image/jpeg".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_rgb() {
        let frame = Frame::filled(16, 8, 3, 128);
        let image = encode_jpeg(&frame, 90).unwrap();
        // SOI marker
        assert_eq!(&image.bytes[..2], &[0xFF, 0xD8]);
        assert_eq!(image.content_type, "image/jpeg");
    }

    #[test]
    fn test_encode_grayscale() {
        let frame = Frame::filled(8, 8, 1, 30);
        assert!(encode_jpeg(&frame, 50).is_ok());
    }

    #[test]
    fn test_rejects_rgba() {
        let frame = Frame::filled(8, 8, 4, 0);
        assert!(matches!(
            encode_jpeg(&frame, 90),
            Err(EncodeError::UnsupportedChannels(4))
        ));
    }
}
