//! Canonical RGBA byte export.

use prepix_color::from_lab;
use prepix_core::{ColorSpace, Error, Image, Result};
use tracing::trace;

/// Row-major RGBA bytes, 4 per pixel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RgbaBuffer {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// `width * height * 4` bytes in R, G, B, A order.
    pub data: Vec<u8>,
}

impl RgbaBuffer {
    /// Wraps RGBA bytes, checking the length.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidDimensions`] on zero dimensions or a length mismatch.
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> Result<Self> {
        let expected = width as usize * height as usize * 4;
        if width == 0 || height == 0 || data.len() != expected {
            return Err(Error::invalid_dimensions(
                width,
                height,
                format!("expected {} RGBA bytes, got {}", expected, data.len()),
            ));
        }
        Ok(Self { width, height, data })
    }

    /// Converts back into an RGBA [`Image`].
    pub fn into_image(self) -> Result<Image> {
        Image::from_data(self.width, self.height, ColorSpace::Rgba, self.data)
    }
}

/// Exports pixels as R, G, B, A bytes regardless of storage order.
///
/// Alpha is 255 when the source has none. GRAY is replicated into R, G and
/// B; LAB is converted to RGB first.
///
/// # Example
///
/// ```rust
/// use prepix_core::{ColorSpace, Image};
/// use prepix_ops::extract_raw_buffer;
///
/// let bgr = Image::filled(2, 1, ColorSpace::Bgr, &[3, 2, 1]).unwrap();
/// let buf = extract_raw_buffer(&bgr).unwrap();
/// assert_eq!(buf.data, vec![1, 2, 3, 255, 1, 2, 3, 255]);
/// ```
pub fn extract_raw_buffer(image: &Image) -> Result<RgbaBuffer> {
    trace!(
        width = image.width(),
        height = image.height(),
        space = %image.color_space(),
        "extract_raw_buffer"
    );
    let lab_rgb;
    let image = if image.color_space() == ColorSpace::Lab {
        lab_rgb = from_lab(image, ColorSpace::Rgb)?;
        &lab_rgb
    } else {
        image
    };

    let space = image.color_space();
    let mut data = Vec::with_capacity(image.pixel_count() * 4);
    match space.red_blue_index() {
        Some((ri, bi)) => {
            for px in image.pixels() {
                let alpha = if space.has_alpha() { px[3] } else { 255 };
                data.extend_from_slice(&[px[ri], px[1], px[bi], alpha]);
            }
        }
        None => {
            for px in image.pixels() {
                data.extend_from_slice(&[px[0], px[0], px[0], 255]);
            }
        }
    }
    RgbaBuffer::new(image.width(), image.height(), data)
}
