//! Image processing and encoding utilities.
//!
//! This module holds the stateless codec helpers used by a
//! [`PhotoSession`](crate::session::PhotoSession): JPEG encoding at a given
//! quality, base64 encoding, decoding raw bytes, and cropping.
//!
//! # Coordinate Mapping
//!
//! Crops are described as percentages of the image size. Each percentage is
//! scaled along its own axis and truncated to a pixel coordinate, so `right`
//! and `bottom` are positions measured from the origin, not margins measured
//! from the far edge. `right = 55` puts the right edge at 55% of the width.

use crate::error::{AppError, Result};
use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ExtendedColorType};
use std::fmt;

/// JPEG quality used when no explicit quality is requested.
pub const DEFAULT_JPEG_QUALITY: u8 = 75;

/// A crop rectangle expressed as percentages (0-100) of the image size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RelativeRect {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl RelativeRect {
    pub fn new(top: f64, right: f64, bottom: f64, left: f64) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }

    /// The whole frame: `(0, 100, 100, 0)`.
    pub fn full() -> Self {
        Self::new(0.0, 100.0, 100.0, 0.0)
    }

    /// Converts the percentages into a pixel rectangle for an image of the
    /// given size.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::InvalidCrop`] if a percentage is not a finite value
    /// in `0..=100`, or if the resulting rectangle has zero area.
    pub fn to_pixels(&self, width: u32, height: u32) -> Result<CropRect> {
        for (edge, value) in [
            ("top", self.top),
            ("right", self.right),
            ("bottom", self.bottom),
            ("left", self.left),
        ] {
            if !value.is_finite() || !(0.0..=100.0).contains(&value) {
                return Err(AppError::crop(format!(
                    "{} percentage {} is outside 0-100",
                    edge, value
                )));
            }
        }

        let left_px = scale(self.left, width);
        let right_px = scale(self.right, width);
        let top_px = scale(self.top, height);
        let bottom_px = scale(self.bottom, height);

        if right_px <= left_px || bottom_px <= top_px {
            return Err(AppError::crop(format!(
                "rectangle ({}, {}, {}, {}) is empty on a {}x{} image",
                left_px, top_px, right_px, bottom_px, width, height
            )));
        }

        Ok(CropRect {
            x: left_px,
            y: top_px,
            width: right_px - left_px,
            height: bottom_px - top_px,
        })
    }
}

impl fmt::Display for RelativeRect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "top={}% right={}% bottom={}% left={}%",
            self.top, self.right, self.bottom, self.left
        )
    }
}

// Multiply before dividing, then truncate toward zero.
fn scale(percent: f64, extent: u32) -> u32 {
    (percent * f64::from(extent) / 100.0) as u32
}

/// A crop rectangle in image pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Image processing utilities for a photo session.
///
/// This struct provides static methods; it carries no state.
pub struct ImageProcessor;

impl ImageProcessor {
    /// Encodes an image as JPEG at the given quality.
    ///
    /// The image is converted to RGB first since JPEG has no alpha channel.
    /// A quality of 0 is raised to 1, the encoder's minimum.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::InvalidQuality`] for qualities above 100 and
    /// [`AppError::Encode`] if the encoder fails.
    pub fn encode_jpeg(image: &DynamicImage, quality: u8) -> Result<Vec<u8>> {
        if quality > 100 {
            return Err(AppError::InvalidQuality(quality));
        }

        let rgb = image.to_rgb8();
        let mut buffer: Vec<u8> = Vec::new();
        let mut encoder = JpegEncoder::new_with_quality(&mut buffer, quality.max(1));

        encoder
            .encode(rgb.as_raw(), rgb.width(), rgb.height(), ExtendedColorType::Rgb8)
            .map_err(|e| AppError::encode(format!("Failed to encode JPEG: {}", e)))?;

        Ok(buffer)
    }

    /// Decodes encoded image bytes (JPEG, PNG) into a bitmap.
    pub fn decode_bytes(bytes: &[u8]) -> Result<DynamicImage> {
        image::load_from_memory(bytes)
            .map_err(|e| AppError::decode(format!("Failed to decode image bytes: {}", e)))
    }

    pub fn encode_base64(bytes: &[u8]) -> String {
        BASE64.encode(bytes)
    }

    /// Decodes standard-alphabet base64 text. ASCII whitespace anywhere in the
    /// input is skipped, so line-wrapped output of `base64` or MIME tools works.
    pub fn decode_base64(text: &[u8]) -> Result<Vec<u8>> {
        let compact: Vec<u8> = text
            .iter()
            .copied()
            .filter(|b| !b.is_ascii_whitespace())
            .collect();

        BASE64
            .decode(compact)
            .map_err(|e| AppError::decode(format!("Invalid base64 data: {}", e)))
    }

    /// Crops an image (immutable operation, returns new image).
    pub fn crop(image: &DynamicImage, rect: CropRect) -> DynamicImage {
        image.crop_imm(rect.x, rect.y, rect.width, rect.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn maps_percentages_to_absolute_positions() {
        let rect = RelativeRect::new(5.0, 55.0, 17.0, 50.0)
            .to_pixels(1000, 1000)
            .unwrap();
        assert_eq!(
            rect,
            CropRect {
                x: 500,
                y: 50,
                width: 50,
                height: 120
            }
        );
    }

    #[test]
    fn full_frame_covers_whole_image() {
        let rect = RelativeRect::full().to_pixels(640, 427).unwrap();
        assert_eq!((rect.x, rect.y, rect.width, rect.height), (0, 0, 640, 427));
    }

    #[test]
    fn truncates_fractional_pixels() {
        // 33% of 10 = 3.3 -> 3, 67% of 10 = 6.7 -> 6
        let rect = RelativeRect::new(33.0, 67.0, 67.0, 33.0)
            .to_pixels(10, 10)
            .unwrap();
        assert_eq!((rect.x, rect.y, rect.width, rect.height), (3, 3, 3, 3));
    }

    #[test]
    fn rejects_inverted_rectangle() {
        let err = RelativeRect::new(0.0, 10.0, 50.0, 20.0)
            .to_pixels(100, 100)
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidCrop(_)));
    }

    #[test]
    fn rejects_out_of_range_percentages() {
        assert!(RelativeRect::new(-1.0, 50.0, 50.0, 0.0).to_pixels(10, 10).is_err());
        assert!(RelativeRect::new(0.0, 101.0, 50.0, 0.0).to_pixels(10, 10).is_err());
        assert!(RelativeRect::new(0.0, f64::NAN, 50.0, 0.0).to_pixels(10, 10).is_err());
    }

    #[test]
    fn jpeg_encoding_drops_alpha() {
        let image = DynamicImage::new_rgba8(8, 6);
        let jpeg = ImageProcessor::encode_jpeg(&image, DEFAULT_JPEG_QUALITY).unwrap();
        assert_eq!(&jpeg[..2], &[0xFF, 0xD8]);

        let decoded = ImageProcessor::decode_bytes(&jpeg).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (8, 6));
    }

    #[test]
    fn jpeg_quality_above_100_is_rejected() {
        let image = DynamicImage::new_rgb8(4, 4);
        let err = ImageProcessor::encode_jpeg(&image, 101).unwrap_err();
        assert!(matches!(err, AppError::InvalidQuality(101)));
    }

    #[test]
    fn jpeg_quality_zero_is_accepted() {
        let image = DynamicImage::new_rgb8(4, 4);
        assert!(ImageProcessor::encode_jpeg(&image, 0).is_ok());
    }

    #[test]
    fn base64_tolerates_trailing_newline() {
        let text = format!("{}\n", ImageProcessor::encode_base64(b"photokit"));
        let bytes = ImageProcessor::decode_base64(text.as_bytes()).unwrap();
        assert_eq!(bytes, b"photokit");
    }

    #[test]
    fn base64_skips_line_breaks_inside_text() {
        let text = ImageProcessor::encode_base64(&[7u8; 120]);
        let wrapped = text
            .as_bytes()
            .chunks(76)
            .map(|line| std::str::from_utf8(line).unwrap())
            .collect::<Vec<_>>()
            .join("\r\n");
        assert!(wrapped.contains('\n'));

        let bytes = ImageProcessor::decode_base64(wrapped.as_bytes()).unwrap();
        assert_eq!(bytes, vec![7u8; 120]);
    }

    #[test]
    fn base64_rejects_garbage() {
        assert!(ImageProcessor::decode_base64(b"not*base64!").is_err());
    }

    #[test]
    fn decode_bytes_rejects_non_images() {
        let err = ImageProcessor::decode_bytes(b"<html>404</html>").unwrap_err();
        assert!(matches!(err, AppError::Decode(_)));
    }

    proptest! {
        #[test]
        fn pixel_rect_stays_inside_image(
            width in 1u32..4000,
            height in 1u32..4000,
            a in 0.0f64..=100.0,
            b in 0.0f64..=100.0,
            c in 0.0f64..=100.0,
            d in 0.0f64..=100.0,
        ) {
            let (left, right) = if a <= b { (a, b) } else { (b, a) };
            let (top, bottom) = if c <= d { (c, d) } else { (d, c) };

            if let Ok(rect) = RelativeRect::new(top, right, bottom, left).to_pixels(width, height) {
                prop_assert!(rect.width > 0 && rect.height > 0);
                prop_assert!(rect.x + rect.width <= width);
                prop_assert!(rect.y + rect.height <= height);
                prop_assert_eq!(rect.x, (left * f64::from(width) / 100.0) as u32);
                prop_assert_eq!(rect.y, (top * f64::from(height) / 100.0) as u32);
            }
        }
    }
}
