//! Grayscale conversion.
//!
//! Luma is the ITU-R BT.601 weighted sum of the encoded (non-linear)
//! channels, rounded to the nearest code:
//!
//! ```text
//! Y = 0.299 R + 0.587 G + 0.114 B
//! ```

use prepix_core::{ColorSpace, Error, Image, Plane, Result};

/// BT.601 red weight.
pub const LUMA_R: f32 = 0.299;
/// BT.601 green weight.
pub const LUMA_G: f32 = 0.587;
/// BT.601 blue weight.
pub const LUMA_B: f32 = 0.114;

/// Luma of one encoded RGB triplet.
#[inline]
pub fn luma(r: u8, g: u8, b: u8) -> u8 {
    let y = LUMA_R * r as f32 + LUMA_G * g as f32 + LUMA_B * b as f32;
    y.round().clamp(0.0, 255.0) as u8
}

/// Converts an image to a single-channel GRAY image.
///
/// Alpha is ignored. GRAY input is returned as a cheap clone.
///
/// # Errors
///
/// [`Error::UnsupportedFormat`] for LAB input.
///
/// # Example
///
/// ```rust
/// use prepix_core::{ColorSpace, Image};
/// use prepix_color::to_gray;
///
/// let img = Image::filled(2, 2, ColorSpace::Rgb, &[255, 0, 0]).unwrap();
/// let gray = to_gray(&img).unwrap();
/// assert_eq!(gray.pixel(0, 0), &[76]);
/// ```
pub fn to_gray(image: &Image) -> Result<Image> {
    let space = image.color_space();
    if space == ColorSpace::Gray {
        return Ok(image.clone());
    }
    let (ri, bi) = space
        .red_blue_index()
        .ok_or_else(|| Error::unsupported(space.name(), "to_gray"))?;

    let data: Vec<u8> = image
        .pixels()
        .map(|px| luma(px[ri], px[1], px[bi]))
        .collect();
    Image::from_data(image.width(), image.height(), ColorSpace::Gray, data)
}

/// Converts an image to a gray [`Plane`].
pub fn to_gray_plane(image: &Image) -> Result<Plane> {
    let gray = to_gray(image)?;
    Plane::from_data(gray.width(), gray.height(), gray.into_data())
}

/// Expands a GRAY image to an RGB-family image (alpha 255 if present).
///
/// # Errors
///
/// [`Error::UnsupportedFormat`] if the input is not GRAY or the target is not
/// RGB-family.
pub fn gray_to_rgb(image: &Image, target: ColorSpace) -> Result<Image> {
    if image.color_space() != ColorSpace::Gray || !target.is_rgb_family() {
        return Err(Error::unsupported(
            format!("{} -> {}", image.color_space(), target),
            "gray_to_rgb",
        ));
    }
    let n = target.channels();
    let mut data = Vec::with_capacity(image.pixel_count() * n);
    for &g in image.data() {
        data.extend_from_slice(&[g, g, g]);
        if target.has_alpha() {
            data.push(255);
        }
    }
    Image::from_data(image.width(), image.height(), target, data)
}
