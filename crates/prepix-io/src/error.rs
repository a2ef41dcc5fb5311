//! Error types for decode and encode.
//!
//! [`IoError`] converts into [`prepix_core::Error`], so callers that only
//! deal with the core error type can use `?` across the boundary.

use std::io;
use thiserror::Error;

/// Decode or encode failure.
#[derive(Debug, Error)]
pub enum IoError {
    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Container not recognized, or not one this crate reads or writes.
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Decoding error.
    #[error("decode error: {0}")]
    DecodeError(String),

    /// Encoding error.
    #[error("encode error: {0}")]
    EncodeError(String),

    /// Operation error from the core crates (color conversion on write).
    #[error(transparent)]
    Core(#[from] prepix_core::Error),
}

impl IoError {
    /// Returns `true` for [`IoError::DecodeError`].
    pub fn is_decode_error(&self) -> bool {
        matches!(self, Self::DecodeError(_))
    }
}

/// Result type for I/O operations.
pub type IoResult<T> = Result<T, IoError>;

impl From<IoError> for prepix_core::Error {
    fn from(err: IoError) -> Self {
        match err {
            IoError::Io(e) => prepix_core::Error::decode(e.to_string()),
            IoError::DecodeError(msg) => prepix_core::Error::decode(msg),
            IoError::UnsupportedFormat(format) => prepix_core::Error::unsupported(format, "io"),
            IoError::EncodeError(msg) => prepix_core::Error::unsupported(msg, "encode"),
            IoError::Core(e) => e,
        }
    }
}
