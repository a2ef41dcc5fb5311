//! # prepix-color
//!
//! Color space conversions for 8-bit photo buffers.
//!
//! - [`gray`] - BT.601 luma
//! - [`lab`] - CIE L*a*b* (sRGB primaries, D65) in the 8-bit encoding
//! - [`channels`] - channel order, alpha, split and merge
//! - [`srgb`] - sRGB transfer function
//!
//! [`convert`] dispatches between any two supported tags.
//!
//! # Quick Start
//!
//! ```rust
//! use prepix_core::{ColorSpace, Image};
//! use prepix_color::{convert, split, merge};
//!
//! let img = Image::filled(4, 4, ColorSpace::Bgra, &[30, 60, 90, 255]).unwrap();
//! let lab = convert(&img, ColorSpace::Lab).unwrap();
//!
//! let planes = split(&lab).unwrap();
//! let rebuilt = merge(&planes, ColorSpace::Lab).unwrap();
//! assert_eq!(rebuilt, lab);
//! ```

#![warn(missing_docs)]

pub mod channels;
pub mod convert;
pub mod gray;
pub mod lab;
pub mod srgb;

pub use channels::{drop_alpha, extract_channel, merge, reorder, split};
pub use convert::convert;
pub use gray::{gray_to_rgb, luma, to_gray, to_gray_plane};
pub use lab::{from_lab, to_lab};
