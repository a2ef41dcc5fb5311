//! # prepix-ops
//!
//! Preprocessing operations for photos headed to a detection model.
//!
//! All operations are synchronous pure functions: they borrow an
//! [`Image`](prepix_core::Image), allocate their own working buffers and
//! return a new image or a record. Nothing is written to disk here.
//!
//! # Modules
//!
//! - [`clahe`] - Contrast-limited adaptive histogram equalization on Lab lightness
//! - [`letterbox`] - Aspect-preserving fit onto a fixed canvas
//! - [`quality`] - Blur (Laplacian variance) and blockiness scoring
//! - [`extract`] - Canonical RGBA byte export
//! - [`tensor`] - Planar float tensors for model input
//! - [`resize`] - Separable resampling
//! - [`filter`] - Plane convolution (Gaussian, Laplacian)
//! - [`config`] - Presets and YAML configuration
//!
//! # Example
//!
//! ```rust
//! use prepix_core::{ColorSpace, Image};
//! use prepix_ops::{equalize_contrast, letterbox, score_quality, ClaheParams, QualityPolicy};
//!
//! let photo = Image::filled(640, 480, ColorSpace::Rgb, &[90, 120, 150]).unwrap();
//!
//! let report = score_quality(&photo, &QualityPolicy::native()).unwrap();
//! assert!(report.flagged); // flat image has no edges
//!
//! let enhanced = equalize_contrast(&photo, &ClaheParams::standard()).unwrap();
//! let input = letterbox(&enhanced, 416, 416).unwrap();
//! assert_eq!(input.dimensions(), (416, 416));
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod clahe;
pub mod config;
pub mod extract;
pub mod filter;
pub mod letterbox;
pub mod quality;
pub mod resize;
pub mod tensor;

pub use clahe::{equalize_contrast, ClaheParams};
pub use config::{PreprocessConfig, Preset};
pub use extract::{extract_raw_buffer, RgbaBuffer};
pub use letterbox::{letterbox, letterbox_geometry, letterbox_with_fill, LetterboxGeometry};
pub use quality::{score_quality, QualityPolicy, QualityReport};
pub use resize::Filter;
pub use tensor::{to_tensor, Normalization, Tensor, TensorLayout};
