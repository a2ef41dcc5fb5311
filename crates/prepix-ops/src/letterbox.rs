//! Aspect-preserving fit onto a fixed canvas.
//!
//! ```text
//! 640x480 -> 416x416
//!
//! +----------------+   top = 52
//! |################|
//! +----------------+
//! |                |   416x312 Lanczos3 resize
//! |     image      |
//! |                |
//! +----------------+
//! |################|   bottom = 52
//! +----------------+
//! ```

use crate::resize::{fit_scale, resize, Filter};
use prepix_core::{ColorSpace, Error, Image, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

/// Placement of the resized image on the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LetterboxGeometry {
    /// `min(target_w / src_w, target_h / src_h)`.
    pub scale: f64,
    /// Resized width, `<= target_w`.
    pub new_width: u32,
    /// Resized height, `<= target_h`.
    pub new_height: u32,
    /// Left padding.
    pub left: u32,
    /// Top padding.
    pub top: u32,
}

/// Computes scale, resized size and centring offsets.
///
/// Resized dimensions round half away from zero and are clamped to
/// `[1, target]`. Offsets truncate, so odd padding puts the extra pixel on
/// the right or bottom.
///
/// # Errors
///
/// [`Error::InvalidDimensions`] if any dimension is zero.
///
/// # Example
///
/// ```rust
/// use prepix_ops::letterbox::letterbox_geometry;
///
/// let g = letterbox_geometry(640, 480, 416, 416).unwrap();
/// assert_eq!((g.new_width, g.new_height), (416, 312));
/// assert_eq!((g.left, g.top), (0, 52));
/// ```
pub fn letterbox_geometry(
    src_w: u32,
    src_h: u32,
    target_w: u32,
    target_h: u32,
) -> Result<LetterboxGeometry> {
    if src_w == 0 || src_h == 0 {
        return Err(Error::invalid_dimensions(src_w, src_h, "source must be non-empty"));
    }
    if target_w == 0 || target_h == 0 {
        return Err(Error::invalid_dimensions(
            target_w,
            target_h,
            "target must be positive",
        ));
    }

    let scale = fit_scale(src_w, src_h, target_w, target_h);
    let new_width = ((src_w as f64 * scale).round() as u32).clamp(1, target_w);
    let new_height = ((src_h as f64 * scale).round() as u32).clamp(1, target_h);

    Ok(LetterboxGeometry {
        scale,
        new_width,
        new_height,
        left: (target_w - new_width) / 2,
        top: (target_h - new_height) / 2,
    })
}

/// Letterboxes onto a black canvas (alpha 255 where present).
///
/// The output keeps the input's color tag and is exactly
/// `target_w x target_h`.
///
/// # Errors
///
/// - [`Error::InvalidDimensions`] for a zero target
/// - [`Error::UnsupportedFormat`] for LAB input
pub fn letterbox(image: &Image, target_w: u32, target_h: u32) -> Result<Image> {
    let fill = [0, 0, 0, 255];
    letterbox_with_fill(image, target_w, target_h, &fill[..image.channels().min(3)])
}

/// Letterboxes onto a canvas of `fill`.
///
/// `fill` gives the color channels in the image's channel order; alpha, if
/// present, is always 255. A single value is used for every color channel.
///
/// # Errors
///
/// - [`Error::InvalidDimensions`] for a zero target
/// - [`Error::UnsupportedFormat`] for LAB input
/// - [`Error::InvalidParameter`] if `fill` has the wrong length
pub fn letterbox_with_fill(
    image: &Image,
    target_w: u32,
    target_h: u32,
    fill: &[u8],
) -> Result<Image> {
    trace!(
        width = image.width(),
        height = image.height(),
        target_w,
        target_h,
        space = %image.color_space(),
        "letterbox"
    );
    let space = image.color_space();
    if space == ColorSpace::Lab {
        return Err(Error::unsupported(space.name(), "letterbox"));
    }

    let geometry = letterbox_geometry(image.width(), image.height(), target_w, target_h)?;
    debug!(
        scale = geometry.scale,
        new_width = geometry.new_width,
        new_height = geometry.new_height,
        left = geometry.left,
        top = geometry.top,
        "letterbox geometry"
    );

    let pixel = canvas_pixel(space, fill)?;
    let resized = resize(image, geometry.new_width, geometry.new_height, Filter::Lanczos3)?;
    let mut canvas = Image::filled(target_w, target_h, space, &pixel)?;
    canvas.paste(&resized, geometry.left, geometry.top)?;
    Ok(canvas)
}

fn canvas_pixel(space: ColorSpace, fill: &[u8]) -> Result<Vec<u8>> {
    let color = if space.has_alpha() {
        space.channels() - 1
    } else {
        space.channels()
    };
    let mut pixel = match fill.len() {
        1 => vec![fill[0]; color],
        n if n == color => fill.to_vec(),
        n => {
            return Err(Error::invalid_parameter(format!(
                "fill has {} values, {} expects 1 or {}",
                n, space, color
            )));
        }
    };
    if space.has_alpha() {
        pixel.push(255);
    }
    Ok(pixel)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noise(width: u32, height: u32, space: ColorSpace) -> Image {
        let len = width as usize * height as usize * space.channels();
        let data = (0..len).map(|i| ((i * 37 + 11) % 253) as u8).collect();
        Image::from_data(width, height, space, data).unwrap()
    }

    #[test]
    fn test_geometry_640x480_to_416() {
        let g = letterbox_geometry(640, 480, 416, 416).unwrap();
        assert_eq!(g.scale, 0.65);
        assert_eq!((g.new_width, g.new_height), (416, 312));
        assert_eq!((g.left, g.top), (0, 52));
    }

    #[test]
    fn test_geometry_invariants() {
        for &(sw, sh, tw, th) in &[
            (1, 1, 640, 640),
            (1920, 1080, 416, 416),
            (333, 777, 100, 50),
            (10000, 3, 64, 64),
            (3, 10000, 64, 64),
        ] {
            let g = letterbox_geometry(sw, sh, tw, th).unwrap();
            assert!(g.new_width <= tw && g.new_height <= th);
            assert!(g.new_width == tw || g.new_height == th, "{:?}", g);
            assert!(g.new_width >= 1 && g.new_height >= 1);
            assert_eq!(g.left, (tw - g.new_width) / 2);
            assert_eq!(g.top, (th - g.new_height) / 2);
        }
    }

    #[test]
    fn test_geometry_rounds_half_away_from_zero() {
        // 5 * 0.5 = 2.5 -> 3
        let g = letterbox_geometry(4, 5, 2, 10).unwrap();
        assert_eq!(g.scale, 0.5);
        assert_eq!((g.new_width, g.new_height), (2, 3));
        assert_eq!(g.top, 3);
    }

    #[test]
    fn test_geometry_zero_dims() {
        assert!(letterbox_geometry(640, 480, 0, 416).unwrap_err().is_invalid_dimensions());
        assert!(letterbox_geometry(0, 480, 416, 416).unwrap_err().is_invalid_dimensions());
    }

    #[test]
    fn test_letterbox_bars_black() {
        let img = noise(640, 480, ColorSpace::Rgb);
        let out = letterbox(&img, 416, 416).unwrap();
        assert_eq!(out.dimensions(), (416, 416));
        assert_eq!(out.color_space(), ColorSpace::Rgb);
        for y in (0..52).chain(364..416) {
            assert!(out.row(y).iter().all(|&v| v == 0), "row {}", y);
        }
    }

    #[test]
    fn test_letterbox_alpha_opaque_border() {
        let img = noise(30, 10, ColorSpace::Bgra);
        let out = letterbox(&img, 20, 20).unwrap();
        assert_eq!(out.color_space(), ColorSpace::Bgra);
        assert_eq!(out.pixel(0, 0), &[0, 0, 0, 255]);
        assert_eq!(out.pixel(19, 19), &[0, 0, 0, 255]);
    }

    #[test]
    fn test_letterbox_gray() {
        let img = Image::filled(10, 20, ColorSpace::Gray, &[200]).unwrap();
        let out = letterbox(&img, 20, 20).unwrap();
        assert_eq!(out.pixel(0, 10), &[0]);
        assert_eq!(out.pixel(10, 10), &[200]);
    }

    #[test]
    fn test_letterbox_same_size_is_identity() {
        let img = noise(32, 24, ColorSpace::Rgba);
        let out = letterbox(&img, 32, 24).unwrap();
        assert_eq!(out, img);
    }

    #[test]
    fn test_letterbox_with_fill() {
        let img = Image::filled(10, 5, ColorSpace::Rgb, &[1, 2, 3]).unwrap();
        let out = letterbox_with_fill(&img, 10, 10, &[114]).unwrap();
        assert_eq!(out.pixel(0, 0), &[114, 114, 114]);

        let out = letterbox_with_fill(&img, 10, 10, &[9, 8, 7]).unwrap();
        assert_eq!(out.pixel(0, 9), &[9, 8, 7]);

        assert!(letterbox_with_fill(&img, 10, 10, &[1, 2])
            .unwrap_err()
            .is_invalid_parameter());
    }

    #[test]
    fn test_letterbox_rejects_lab_and_zero_target() {
        let lab = Image::filled(4, 4, ColorSpace::Lab, &[128, 128, 128]).unwrap();
        assert!(letterbox(&lab, 8, 8).unwrap_err().is_unsupported_format());

        let rgb = Image::filled(4, 4, ColorSpace::Rgb, &[1, 1, 1]).unwrap();
        assert!(letterbox(&rgb, 0, 8).unwrap_err().is_invalid_dimensions());
    }
}
