//! # prepix-core
//!
//! Core types for photo preprocessing.
//!
//! This crate provides the types every other prepix crate builds on:
//!
//! - [`Image`] - 8-bit interleaved pixel buffer with copy-on-write storage
//! - [`ColorSpace`] - channel model and order tag (RGB, BGRA, GRAY, LAB, ...)
//! - [`Plane`] - single-channel working copy used by equalization and scoring
//! - [`Error`] / [`Result`] - the failure kinds shared by all operations
//!
//! ## Crate Structure
//!
//! ```text
//! prepix-core (this crate)
//!    ^
//!    |
//!    +-- prepix-color (gray, Lab, channel order)
//!    +-- prepix-ops (resize, CLAHE, letterbox, quality, extract)
//!    +-- prepix-io (PNG/JPEG decode and encode)
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod colorspace;
pub mod error;
pub mod image;
pub mod plane;

pub use colorspace::ColorSpace;
pub use error::{Error, Result};
pub use image::Image;
pub use plane::{reflect101, Plane};

/// Prelude module for convenient imports.
///
/// ```
/// use prepix_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::colorspace::ColorSpace;
    pub use crate::error::{Error, Result};
    pub use crate::image::Image;
    pub use crate::plane::Plane;
}
