//! Error types for prepix operations.
//!
//! Every operation in the workspace reports failure through [`Error`]. The
//! variants map one-to-one onto the failure kinds a caller has to tell apart:
//!
//! - [`DecodeFailure`](Error::DecodeFailure) - input is not a usable image
//! - [`UnsupportedFormat`](Error::UnsupportedFormat) - channel layout or color
//!   tag not handled by the requested operation
//! - [`InvalidDimensions`](Error::InvalidDimensions) - zero or mismatched sizes
//! - [`InvalidParameter`](Error::InvalidParameter) - clip limit, tile grid,
//!   threshold or normalization out of range
//!
//! All errors are terminal for the call that raised them. Nothing retries.
//!
//! # Usage
//!
//! ```rust
//! use prepix_core::{Error, Result};
//!
//! fn check_target(width: u32, height: u32) -> Result<()> {
//!     if width == 0 || height == 0 {
//!         return Err(Error::invalid_dimensions(width, height, "target must be positive"));
//!     }
//!     Ok(())
//! }
//!
//! assert!(check_target(0, 416).is_err());
//! ```

use thiserror::Error;

/// Result type alias using [`Error`] as the error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during preprocessing.
#[derive(Debug, Error)]
pub enum Error {
    /// Input could not be interpreted as a valid image.
    ///
    /// Raised by decoders (empty input, unknown container, corrupt data).
    #[error("decode failure: {0}")]
    DecodeFailure(String),

    /// Channel count or color tag is not handled by the operation.
    #[error("unsupported format {format} for {op}")]
    UnsupportedFormat {
        /// Color tag or layout description
        format: String,
        /// Operation that rejected it
        op: String,
    },

    /// Width or height is zero, or the buffer length does not match.
    #[error("invalid dimensions: {width}x{height} ({reason})")]
    InvalidDimensions {
        /// Requested width
        width: u32,
        /// Requested height
        height: u32,
        /// Why the dimensions were rejected
        reason: String,
    },

    /// A numeric parameter is out of range.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Preset or configuration document could not be parsed.
    #[error("config error: {0}")]
    Config(String),
}

impl Error {
    /// Creates an [`Error::DecodeFailure`] error.
    #[inline]
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::DecodeFailure(msg.into())
    }

    /// Creates an [`Error::UnsupportedFormat`] error.
    #[inline]
    pub fn unsupported(format: impl Into<String>, op: impl Into<String>) -> Self {
        Self::UnsupportedFormat {
            format: format.into(),
            op: op.into(),
        }
    }

    /// Creates an [`Error::InvalidDimensions`] error.
    #[inline]
    pub fn invalid_dimensions(width: u32, height: u32, reason: impl Into<String>) -> Self {
        Self::InvalidDimensions {
            width,
            height,
            reason: reason.into(),
        }
    }

    /// Creates an [`Error::InvalidParameter`] error.
    #[inline]
    pub fn invalid_parameter(msg: impl Into<String>) -> Self {
        Self::InvalidParameter(msg.into())
    }

    /// Returns `true` for [`Error::DecodeFailure`].
    #[inline]
    pub fn is_decode_failure(&self) -> bool {
        matches!(self, Self::DecodeFailure(_))
    }

    /// Returns `true` for [`Error::UnsupportedFormat`].
    #[inline]
    pub fn is_unsupported_format(&self) -> bool {
        matches!(self, Self::UnsupportedFormat { .. })
    }

    /// Returns `true` for [`Error::InvalidDimensions`].
    #[inline]
    pub fn is_invalid_dimensions(&self) -> bool {
        matches!(self, Self::InvalidDimensions { .. })
    }

    /// Returns `true` for [`Error::InvalidParameter`].
    #[inline]
    pub fn is_invalid_parameter(&self) -> bool {
        matches!(self, Self::InvalidParameter(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_dimensions_message() {
        let err = Error::invalid_dimensions(0, 480, "width must be > 0");
        let msg = err.to_string();
        assert!(msg.contains("0x480"));
        assert!(msg.contains("width must be > 0"));
        assert!(err.is_invalid_dimensions());
    }

    #[test]
    fn test_unsupported_message() {
        let err = Error::unsupported("LAB", "letterbox");
        assert_eq!(err.to_string(), "unsupported format LAB for letterbox");
        assert!(err.is_unsupported_format());
        assert!(!err.is_decode_failure());
    }

    #[test]
    fn test_kinds_are_distinct() {
        assert!(Error::decode("empty").is_decode_failure());
        assert!(Error::invalid_parameter("clip limit").is_invalid_parameter());
        assert!(!Error::invalid_parameter("x").is_invalid_dimensions());
    }
}
