//! Error types for the photokit-core library.
//!
//! This module provides granular error variants for the failure modes of a
//! photo session: network, disk and codec failures, plus configuration.

use thiserror::Error;

/// Errors that can occur within the photokit-core library.
///
/// Variants follow the steps a session goes through: downloading, decoding
/// and encoding, cropping and writing to disk. Session methods return them
/// from their `try_*` forms; the plain forms only log them.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors (invalid environment values).
    #[error("Configuration error: {0}")]
    Config(String),

    /// The URL could not be parsed.
    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    /// Transport failure while talking to the remote host.
    #[error("Network error: {0}")]
    Network(String),

    /// The server answered with a non-success status code.
    #[error("HTTP request to {url} failed with status {status}")]
    HttpStatus { url: String, status: u16 },

    /// The image slot holds nothing to work on.
    #[error("No image loaded")]
    EmptyImage,

    /// The operation does not accept the slot's current representation.
    #[error("Unsupported image type for {operation}: {kind}")]
    UnsupportedRepresentation {
        operation: &'static str,
        kind: String,
    },

    /// Bytes or base64 text could not be decoded into an image.
    #[error("Image decoding failed: {0}")]
    Decode(String),

    /// The bitmap could not be encoded.
    #[error("Image encoding failed: {0}")]
    Encode(String),

    /// JPEG quality outside 0-100.
    #[error("Invalid JPEG quality {0}, expected 0-100")]
    InvalidQuality(u8),

    /// Crop percentages are out of range or describe an empty rectangle.
    #[error("Invalid crop: {0}")]
    InvalidCrop(String),

    /// Standard I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AppError {
    /// Creates a configuration error with the given message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Creates a network error with the given message.
    pub fn network(msg: impl Into<String>) -> Self {
        Self::Network(msg.into())
    }

    /// Creates a decoding error with the given message.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Creates an encoding error with the given message.
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    /// Creates a crop error with the given message.
    pub fn crop(msg: impl Into<String>) -> Self {
        Self::InvalidCrop(msg.into())
    }

    /// Creates an error for an operation that cannot handle the given
    /// representation.
    pub fn unsupported(operation: &'static str, kind: impl ToString) -> Self {
        Self::UnsupportedRepresentation {
            operation,
            kind: kind.to_string(),
        }
    }
}

/// A convenient alias for Result with [`AppError`].
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_status_message_names_url_and_code() {
        let err = AppError::HttpStatus {
            url: "http://example.com/a.jpg".to_string(),
            status: 404,
        };
        assert_eq!(
            err.to_string(),
            "HTTP request to http://example.com/a.jpg failed with status 404"
        );
    }

    #[test]
    fn io_errors_convert() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: AppError = io.into();
        assert!(matches!(err, AppError::Io(_)));
    }
}
