//! The image slot held by a photo session.
//!
//! A slot holds exactly one representation at a time. Operations match on
//! [`ImageData`] to decide how to get at the pixels.

use crate::error::Result;
use crate::image_processing::ImageProcessor;
use image::DynamicImage;
use std::fmt;

/// One image in one of its three representations.
#[derive(Debug, Clone)]
pub enum ImageData {
    /// Encoded file content (e.g. a JPEG stream) as fetched or written.
    RawBytes(Vec<u8>),
    /// Standard-alphabet base64 text of encoded file content.
    Base64Text(String),
    /// Decoded pixels.
    Bitmap(DynamicImage),
}

/// Tag of an [`ImageData`] value, used in logs and errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    RawBytes,
    Base64Text,
    Bitmap,
}

impl fmt::Display for ImageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ImageKind::RawBytes => "raw bytes",
            ImageKind::Base64Text => "base64 text",
            ImageKind::Bitmap => "bitmap",
        };
        f.write_str(name)
    }
}

impl ImageData {
    pub fn kind(&self) -> ImageKind {
        match self {
            ImageData::RawBytes(_) => ImageKind::RawBytes,
            ImageData::Base64Text(_) => ImageKind::Base64Text,
            ImageData::Bitmap(_) => ImageKind::Bitmap,
        }
    }

    /// Zero-length bytes and empty text count as empty; a bitmap never does.
    pub fn is_empty(&self) -> bool {
        match self {
            ImageData::RawBytes(bytes) => bytes.is_empty(),
            ImageData::Base64Text(text) => text.is_empty(),
            ImageData::Bitmap(_) => false,
        }
    }

    /// Produces a bitmap from whatever representation is held.
    ///
    /// Raw bytes are decoded directly, base64 text is unwrapped and then
    /// decoded, and a bitmap is cloned.
    pub fn decode(&self) -> Result<DynamicImage> {
        match self {
            ImageData::RawBytes(bytes) => ImageProcessor::decode_bytes(bytes),
            ImageData::Base64Text(text) => {
                let bytes = ImageProcessor::decode_base64(text.as_bytes())?;
                ImageProcessor::decode_bytes(&bytes)
            }
            ImageData::Bitmap(image) => Ok(image.clone()),
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            ImageData::RawBytes(bytes) => Some(bytes),
            _ => None,
        }
    }

    pub fn as_base64(&self) -> Option<&str> {
        match self {
            ImageData::Base64Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_bitmap(&self) -> Option<&DynamicImage> {
        match self {
            ImageData::Bitmap(image) => Some(image),
            _ => None,
        }
    }
}

impl From<Vec<u8>> for ImageData {
    fn from(bytes: Vec<u8>) -> Self {
        ImageData::RawBytes(bytes)
    }
}

impl From<String> for ImageData {
    fn from(text: String) -> Self {
        ImageData::Base64Text(text)
    }
}

impl From<DynamicImage> for ImageData {
    fn from(image: DynamicImage) -> Self {
        ImageData::Bitmap(image)
    }
}
