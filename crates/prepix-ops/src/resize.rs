//! Image resize and resampling operations.
//!
//! Separable two-pass resampling: every output row is built from a weighted
//! sum of source columns, then every output column from source rows.
//!
//! # Filters
//!
//! - [`Filter::Nearest`] - No interpolation (blocky)
//! - [`Filter::Bilinear`] - Triangle filter (smooth, used for analysis-size normalization)
//! - [`Filter::Lanczos3`] - Windowed sinc (used for letterboxing)
//!
//! When downscaling, the kernel is stretched by the scale factor so every
//! source pixel contributes (antialiasing). Taps that fall outside the
//! source are clamped to the nearest edge sample.
//!
//! # Example
//!
//! ```rust
//! use prepix_ops::resize::{resize_f32, Filter};
//!
//! let src: Vec<f32> = vec![0.0; 64 * 64 * 3];
//! let dst = resize_f32(&src, 64, 64, 3, 128, 128, Filter::Lanczos3).unwrap();
//! assert_eq!(dst.len(), 128 * 128 * 3);
//! ```

use prepix_core::{Error, Image, Plane, Result};
use serde::{Deserialize, Serialize};
use tracing::trace;

/// Resampling filter for resize operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Filter {
    /// Nearest-neighbor.
    Nearest,
    /// Bilinear interpolation.
    Bilinear,
    /// Lanczos-3.
    #[default]
    Lanczos3,
}

impl Filter {
    /// Returns the support radius for this filter.
    #[inline]
    pub fn support(&self) -> f32 {
        match self {
            Filter::Nearest => 0.5,
            Filter::Bilinear => 1.0,
            Filter::Lanczos3 => 3.0,
        }
    }

    /// Evaluates the filter kernel at position x.
    #[inline]
    pub fn weight(&self, x: f32) -> f32 {
        match self {
            Filter::Nearest => {
                if x.abs() < 0.5 {
                    1.0
                } else {
                    0.0
                }
            }
            Filter::Bilinear => {
                let ax = x.abs();
                if ax < 1.0 { 1.0 - ax } else { 0.0 }
            }
            Filter::Lanczos3 => lanczos_weight(x, 3.0),
        }
    }
}

/// Lanczos weight function.
#[inline]
fn lanczos_weight(x: f32, a: f32) -> f32 {
    let ax = x.abs();
    if ax < 1e-8 {
        1.0
    } else if ax < a {
        let pi_x = std::f32::consts::PI * ax;
        let pi_x_a = pi_x / a;
        (pi_x.sin() / pi_x) * (pi_x_a.sin() / pi_x_a)
    } else {
        0.0
    }
}

/// Normalized (source index, weight) taps for one output coordinate.
type Taps = Vec<(usize, f32)>;

/// Precomputes the taps of every output coordinate along one axis.
fn contributions(src_n: usize, dst_n: usize, filter: Filter) -> Vec<Taps> {
    let scale = src_n as f32 / dst_n as f32;
    let filter_scale = scale.max(1.0);
    let support = filter.support() * filter_scale;
    let last = src_n as i64 - 1;

    (0..dst_n)
        .map(|i| {
            if filter == Filter::Nearest {
                let s = (((i as f32 + 0.5) * scale).floor() as i64).clamp(0, last);
                return vec![(s as usize, 1.0)];
            }

            let center = (i as f32 + 0.5) * scale - 0.5;
            let lo = (center - support).floor() as i64;
            let hi = (center + support).ceil() as i64;

            let mut taps: Taps = Vec::with_capacity((hi - lo + 1) as usize);
            let mut sum = 0.0f32;
            for s in lo..=hi {
                let w = filter.weight((s as f32 - center) / filter_scale);
                if w == 0.0 {
                    continue;
                }
                taps.push((s.clamp(0, last) as usize, w));
                sum += w;
            }

            if sum.abs() > f32::EPSILON {
                for tap in &mut taps {
                    tap.1 /= sum;
                }
                taps
            } else {
                vec![((center.round() as i64).clamp(0, last) as usize, 1.0)]
            }
        })
        .collect()
}

/// Resizes interleaved f32 image data.
///
/// # Arguments
///
/// * `src` - Source samples, row-major interleaved
/// * `src_w`, `src_h` - Source size
/// * `channels` - Samples per pixel
/// * `dst_w`, `dst_h` - Destination size
/// * `filter` - Resampling filter
///
/// # Errors
///
/// [`Error::InvalidDimensions`] if `src` has the wrong length or any size is
/// zero.
pub fn resize_f32(
    src: &[f32],
    src_w: usize,
    src_h: usize,
    channels: usize,
    dst_w: usize,
    dst_h: usize,
    filter: Filter,
) -> Result<Vec<f32>> {
    if src_w == 0 || src_h == 0 || channels == 0 {
        return Err(Error::invalid_dimensions(
            src_w as u32,
            src_h as u32,
            "source size must be > 0",
        ));
    }
    let expected = src_w * src_h * channels;
    if src.len() != expected {
        return Err(Error::invalid_dimensions(
            src_w as u32,
            src_h as u32,
            format!("expected {} samples, got {}", expected, src.len()),
        ));
    }
    if dst_w == 0 || dst_h == 0 {
        return Err(Error::invalid_dimensions(
            dst_w as u32,
            dst_h as u32,
            "destination size must be > 0",
        ));
    }

    // Two-pass separable resize: horizontal then vertical
    let temp = resize_horizontal(src, src_w, src_h, channels, dst_w, filter);
    Ok(resize_vertical(&temp, dst_w, src_h, channels, dst_h, filter))
}

/// Horizontal resize pass.
fn resize_horizontal(
    src: &[f32],
    src_w: usize,
    src_h: usize,
    channels: usize,
    dst_w: usize,
    filter: Filter,
) -> Vec<f32> {
    let mut dst = vec![0.0f32; dst_w * src_h * channels];
    let columns = contributions(src_w, dst_w, filter);

    for y in 0..src_h {
        let src_row = &src[y * src_w * channels..(y + 1) * src_w * channels];
        let dst_row = &mut dst[y * dst_w * channels..(y + 1) * dst_w * channels];
        for (taps, out) in columns.iter().zip(dst_row.chunks_exact_mut(channels)) {
            for &(sx, w) in taps {
                let px = &src_row[sx * channels..(sx + 1) * channels];
                for (o, &v) in out.iter_mut().zip(px) {
                    *o += v * w;
                }
            }
        }
    }

    dst
}

/// Vertical resize pass.
fn resize_vertical(
    src: &[f32],
    src_w: usize,
    src_h: usize,
    channels: usize,
    dst_h: usize,
    filter: Filter,
) -> Vec<f32> {
    let stride = src_w * channels;
    let mut dst = vec![0.0f32; stride * dst_h];
    let rows = contributions(src_h, dst_h, filter);

    for (taps, dst_row) in rows.iter().zip(dst.chunks_exact_mut(stride)) {
        for &(sy, w) in taps {
            let src_row = &src[sy * stride..(sy + 1) * stride];
            for (o, &v) in dst_row.iter_mut().zip(src_row) {
                *o += v * w;
            }
        }
    }

    dst
}

/// Resamples 8-bit interleaved samples, rounding and clamping the result.
fn resize_u8(
    src: &[u8],
    src_w: u32,
    src_h: u32,
    channels: usize,
    dst_w: u32,
    dst_h: u32,
    filter: Filter,
) -> Result<Vec<u8>> {
    let src_f: Vec<f32> = src.iter().map(|&v| v as f32).collect();
    let dst = resize_f32(
        &src_f,
        src_w as usize,
        src_h as usize,
        channels,
        dst_w as usize,
        dst_h as usize,
        filter,
    )?;
    Ok(dst
        .into_iter()
        .map(|v| v.round().clamp(0.0, 255.0) as u8)
        .collect())
}

/// Resizes an image, keeping its color tag.
///
/// Identical dimensions return a cheap clone.
///
/// # Errors
///
/// [`Error::InvalidDimensions`] if either target dimension is zero.
///
/// # Example
///
/// ```rust
/// use prepix_core::{ColorSpace, Image};
/// use prepix_ops::resize::{resize, Filter};
///
/// let img = Image::filled(64, 48, ColorSpace::Bgr, &[10, 20, 30]).unwrap();
/// let small = resize(&img, 32, 24, Filter::Bilinear).unwrap();
/// assert_eq!(small.dimensions(), (32, 24));
/// assert_eq!(small.pixel(5, 5), &[10, 20, 30]);
/// ```
pub fn resize(image: &Image, width: u32, height: u32, filter: Filter) -> Result<Image> {
    trace!(
        src_w = image.width(),
        src_h = image.height(),
        width,
        height,
        ?filter,
        "resize"
    );
    if width == 0 || height == 0 {
        return Err(Error::invalid_dimensions(
            width,
            height,
            "target size must be > 0",
        ));
    }
    if image.dimensions() == (width, height) {
        return Ok(image.clone());
    }
    let data = resize_u8(
        image.data(),
        image.width(),
        image.height(),
        image.channels(),
        width,
        height,
        filter,
    )?;
    Image::from_data(width, height, image.color_space(), data)
}

/// Resizes a single-channel plane.
///
/// # Errors
///
/// [`Error::InvalidDimensions`] if either target dimension is zero.
pub fn resize_plane(plane: &Plane, width: u32, height: u32, filter: Filter) -> Result<Plane> {
    trace!(
        src_w = plane.width(),
        src_h = plane.height(),
        width,
        height,
        ?filter,
        "resize_plane"
    );
    if width == 0 || height == 0 {
        return Err(Error::invalid_dimensions(
            width,
            height,
            "target size must be > 0",
        ));
    }
    if plane.dimensions() == (width, height) {
        return Ok(plane.clone());
    }
    let data = resize_u8(
        plane.data(),
        plane.width(),
        plane.height(),
        1,
        width,
        height,
        filter,
    )?;
    Plane::from_data(width, height, data)
}

/// Aspect-preserving dimensions that fit inside `max_w` x `max_h`.
///
/// The scale is computed in f64 and the scaled size rounded half away from
/// zero, then clamped to `[1, max]` so the box is never overflowed.
///
/// # Example
///
/// ```rust
/// use prepix_ops::resize::fit_dimensions;
///
/// // Fit 1920x1080 into 640x480 box
/// let (w, h) = fit_dimensions(1920, 1080, 640, 480);
/// assert_eq!((w, h), (640, 360));
/// ```
pub fn fit_dimensions(src_w: u32, src_h: u32, max_w: u32, max_h: u32) -> (u32, u32) {
    let scale = fit_scale(src_w, src_h, max_w, max_h);
    (
        scaled_len(src_w, scale, max_w),
        scaled_len(src_h, scale, max_h),
    )
}

/// `min(max_w / src_w, max_h / src_h)` in f64.
pub(crate) fn fit_scale(src_w: u32, src_h: u32, max_w: u32, max_h: u32) -> f64 {
    let scale_w = max_w as f64 / src_w as f64;
    let scale_h = max_h as f64 / src_h as f64;
    scale_w.min(scale_h)
}

#[inline]
fn scaled_len(len: u32, scale: f64, max: u32) -> u32 {
    ((len as f64 * scale).round() as u32).clamp(1, max.max(1))
}
