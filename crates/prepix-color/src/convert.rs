//! Conversion between any two supported color tags.

use crate::{channels, gray, lab};
use prepix_core::{ColorSpace, Error, Image, Result};

/// Converts `image` to the `target` tag.
///
/// | From | To | Path |
/// |------|----|------|
/// | any | same | cheap clone |
/// | RGB family | RGB family | [`channels::reorder`] |
/// | RGB family | GRAY | [`gray::to_gray`] |
/// | RGB family | LAB | [`lab::to_lab`] |
/// | GRAY | RGB family | [`gray::gray_to_rgb`] |
/// | LAB | RGB family | [`lab::from_lab`] |
///
/// # Errors
///
/// [`Error::UnsupportedFormat`] for GRAY <-> LAB.
///
/// # Example
///
/// ```rust
/// use prepix_core::{ColorSpace, Image};
/// use prepix_color::convert;
///
/// let rgb = Image::filled(1, 1, ColorSpace::Rgb, &[10, 20, 30]).unwrap();
/// let bgra = convert(&rgb, ColorSpace::Bgra).unwrap();
/// assert_eq!(bgra.pixel(0, 0), &[30, 20, 10, 255]);
/// ```
pub fn convert(image: &Image, target: ColorSpace) -> Result<Image> {
    let from = image.color_space();
    if from == target {
        return Ok(image.clone());
    }
    match (from, target) {
        (f, t) if f.is_rgb_family() && t.is_rgb_family() => channels::reorder(image, target),
        (f, ColorSpace::Gray) if f.is_rgb_family() => gray::to_gray(image),
        (f, ColorSpace::Lab) if f.is_rgb_family() => lab::to_lab(image),
        (ColorSpace::Gray, t) if t.is_rgb_family() => gray::gray_to_rgb(image, target),
        (ColorSpace::Lab, t) if t.is_rgb_family() => lab::from_lab(image, target),
        _ => Err(Error::unsupported(
            format!("{} -> {}", from, target),
            "convert",
        )),
    }
}
