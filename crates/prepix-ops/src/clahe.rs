//! Contrast-limited adaptive histogram equalization (CLAHE).
//!
//! Equalization runs on the lightness plane of the 8-bit Lab encoding only,
//! so hue and saturation are carried through untouched.
//!
//! # Tiling
//!
//! ```text
//! +------+------+------+      tile = ceil(w / tiles_x) x ceil(h / tiles_y)
//! |  t00 |  t10 |  t20 |      plane is extended with reflect-101 borders
//! +------+------+------+      when tile * tiles > size
//! |  t01 |  t11 |  t21 |
//! +------+------+------+      each output sample blends the LUTs of the
//! |  t02 |  t12 |  t22 |      four tiles whose centres surround it
//! +------+------+------+
//! ```
//!
//! # Presets
//!
//! | Preset | Clip | Grid | Smoothing |
//! |--------|------|------|-----------|
//! | [`ClaheParams::standard`] | 2.0 | 8x8 | no |
//! | [`ClaheParams::smoothed`] | 1.5 | 16x16 | 3x3 Gaussian |

use crate::filter::gaussian_blur_plane;
use prepix_color::{convert, drop_alpha, from_lab, gray_to_rgb, merge, split, to_lab};
use prepix_core::{ColorSpace, Error, Image, Plane, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

const BINS: usize = 256;

/// Size of the smoothing kernel applied after equalization.
pub const SMOOTHING_KERNEL: usize = 3;

/// Parameters for [`equalize_contrast`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClaheParams {
    /// Clip limit, relative to a uniform histogram.
    pub clip_limit: f64,
    /// Tile grid as (columns, rows).
    pub tile_grid: (u32, u32),
    /// Apply a 3x3 Gaussian to the equalized L plane.
    pub smoothing: bool,
    /// Output tag, `Rgb` or `Bgr`. `None` keeps the input's channel order.
    pub output: Option<ColorSpace>,
}

impl ClaheParams {
    /// Clip 2.0, 8x8 tiles, no smoothing.
    pub fn standard() -> Self {
        Self {
            clip_limit: 2.0,
            tile_grid: (8, 8),
            smoothing: false,
            output: None,
        }
    }

    /// Clip 1.5, 16x16 tiles, Gaussian smoothing.
    pub fn smoothed() -> Self {
        Self {
            clip_limit: 1.5,
            tile_grid: (16, 16),
            smoothing: true,
            output: None,
        }
    }

    /// Sets the clip limit.
    pub fn with_clip_limit(mut self, clip_limit: f64) -> Self {
        self.clip_limit = clip_limit;
        self
    }

    /// Sets the tile grid.
    pub fn with_tile_grid(mut self, columns: u32, rows: u32) -> Self {
        self.tile_grid = (columns, rows);
        self
    }

    /// Enables or disables the smoothing pass.
    pub fn with_smoothing(mut self, smoothing: bool) -> Self {
        self.smoothing = smoothing;
        self
    }

    /// Sets the output tag.
    pub fn with_output(mut self, output: ColorSpace) -> Self {
        self.output = Some(output);
        self
    }

    /// Checks clip limit, tile grid and output tag.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidParameter`] for a non-finite or non-positive clip
    ///   limit, or a zero tile grid component
    /// - [`Error::UnsupportedFormat`] for an output tag other than RGB/BGR
    pub fn validate(&self) -> Result<()> {
        validate_clip_grid(self.clip_limit, self.tile_grid)?;
        match self.output {
            None | Some(ColorSpace::Rgb) | Some(ColorSpace::Bgr) => Ok(()),
            Some(other) => Err(Error::unsupported(other.name(), "equalize_contrast output")),
        }
    }
}

impl Default for ClaheParams {
    fn default() -> Self {
        Self::standard()
    }
}

fn validate_clip_grid(clip_limit: f64, (tx, ty): (u32, u32)) -> Result<()> {
    if !clip_limit.is_finite() || clip_limit <= 0.0 {
        return Err(Error::invalid_parameter(format!(
            "clip limit must be finite and > 0, got {}",
            clip_limit
        )));
    }
    if tx == 0 || ty == 0 {
        return Err(Error::invalid_parameter(format!(
            "tile grid must be > 0, got {}x{}",
            tx, ty
        )));
    }
    Ok(())
}

/// Equalizes local contrast on the lightness channel.
///
/// Alpha is dropped and not restored; GRAY input is expanded to RGB first.
/// The result is always opaque 3-channel with the same dimensions. When
/// equalization leaves the L plane untouched (flat images), the input colors
/// are returned as-is rather than round-tripped through 8-bit Lab.
///
/// # Errors
///
/// - [`Error::InvalidParameter`] for invalid clip limit or tile grid
/// - [`Error::UnsupportedFormat`] for LAB input or an output tag other than
///   RGB/BGR
///
/// # Example
///
/// ```rust
/// use prepix_core::{ColorSpace, Image};
/// use prepix_ops::{equalize_contrast, ClaheParams};
///
/// let flat = Image::filled(100, 100, ColorSpace::Rgb, &[128, 128, 128]).unwrap();
/// let out = equalize_contrast(&flat, &ClaheParams::standard()).unwrap();
/// assert_eq!(out, flat);
/// ```
pub fn equalize_contrast(image: &Image, params: &ClaheParams) -> Result<Image> {
    trace!(
        width = image.width(),
        height = image.height(),
        space = %image.color_space(),
        clip_limit = params.clip_limit,
        tiles_x = params.tile_grid.0,
        tiles_y = params.tile_grid.1,
        smoothing = params.smoothing,
        "equalize_contrast"
    );
    params.validate()?;

    let space = image.color_space();
    let rgb = match space {
        ColorSpace::Lab => return Err(Error::unsupported(space.name(), "equalize_contrast")),
        ColorSpace::Gray => gray_to_rgb(image, ColorSpace::Rgb)?,
        _ => drop_alpha(image)?,
    };
    let output = params.output.unwrap_or(rgb.color_space());

    let mut planes = split(&to_lab(&rgb)?)?;
    let mut lightness = clahe_plane(&planes[0], params.clip_limit, params.tile_grid)?;
    if params.smoothing {
        lightness = gaussian_blur_plane(&lightness, SMOOTHING_KERNEL, 0.0)?;
    }
    if lightness == planes[0] {
        debug!("lightness unchanged, skipping Lab round trip");
        return convert(&rgb, output);
    }
    planes[0] = lightness;

    from_lab(&merge(&planes, ColorSpace::Lab)?, output)
}

/// Runs CLAHE on a single plane.
///
/// # Errors
///
/// [`Error::InvalidParameter`] for a non-finite or non-positive clip limit or
/// a zero tile grid component.
pub fn clahe_plane(plane: &Plane, clip_limit: f64, tile_grid: (u32, u32)) -> Result<Plane> {
    validate_clip_grid(clip_limit, tile_grid)?;

    let (width, height) = plane.dimensions();
    let (tiles_x, tiles_y) = (tile_grid.0 as usize, tile_grid.1 as usize);
    let tile_w = (width as usize).div_ceil(tiles_x);
    let tile_h = (height as usize).div_ceil(tiles_y);
    let area = tile_w * tile_h;
    let clip = ((clip_limit * area as f64 / BINS as f64) as usize).max(1);
    debug!(tile_w, tile_h, clip, "clahe tiling");

    let mut luts = Vec::with_capacity(tiles_x * tiles_y);
    for ty in 0..tiles_y {
        for tx in 0..tiles_x {
            let hist = tile_histogram(plane, tx * tile_w, ty * tile_h, tile_w, tile_h);
            luts.push(tile_lut(hist, clip, area));
        }
    }

    let lut = |tx: usize, ty: usize, v: usize| luts[ty * tiles_x + tx][v] as f32;
    let x_coords = interpolation_coords(width as usize, tile_w, tiles_x);
    let mut data = Vec::with_capacity(width as usize * height as usize);

    for y in 0..height as usize {
        let (ty1, ty2, ya) = tile_coord(y, tile_h, tiles_y);
        let row = plane.row(y as u32);
        for (&v, &(tx1, tx2, xa)) in row.iter().zip(&x_coords) {
            let v = v as usize;
            let top = lut(tx1, ty1, v) * (1.0 - xa) + lut(tx2, ty1, v) * xa;
            let bottom = lut(tx1, ty2, v) * (1.0 - xa) + lut(tx2, ty2, v) * xa;
            let out = top * (1.0 - ya) + bottom * ya;
            data.push(out.round().clamp(0.0, 255.0) as u8);
        }
    }

    Plane::from_data(width, height, data)
}

/// Histogram of one tile, reading past the plane through reflect-101.
fn tile_histogram(
    plane: &Plane,
    x0: usize,
    y0: usize,
    tile_w: usize,
    tile_h: usize,
) -> [usize; BINS] {
    let mut hist = [0usize; BINS];
    let (width, height) = plane.dimensions();
    for y in y0..y0 + tile_h {
        if y < height as usize && x0 + tile_w <= width as usize {
            for &v in &plane.row(y as u32)[x0..x0 + tile_w] {
                hist[v as usize] += 1;
            }
        } else {
            for x in x0..x0 + tile_w {
                hist[plane.get_reflect101(x as i64, y as i64) as usize] += 1;
            }
        }
    }
    hist
}

/// Clips `hist`, redistributes the excess and integrates it into a LUT.
///
/// A tile with a single occupied bin has no dynamic range and maps every
/// value to itself.
fn tile_lut(mut hist: [usize; BINS], clip: usize, area: usize) -> [u8; BINS] {
    let mut lut = [0u8; BINS];
    if hist.iter().filter(|&&c| c > 0).count() <= 1 {
        for (i, slot) in lut.iter_mut().enumerate() {
            *slot = i as u8;
        }
        return lut;
    }

    let mut excess = 0usize;
    for count in hist.iter_mut() {
        if *count > clip {
            excess += *count - clip;
            *count = clip;
        }
    }

    let increment = excess / BINS;
    let residual = excess % BINS;
    for count in hist.iter_mut() {
        *count += increment;
    }
    if residual > 0 {
        let step = (BINS / residual).max(1);
        for i in (0..BINS).step_by(step).take(residual) {
            hist[i] += 1;
        }
    }

    let scale = 255.0 / area as f32;
    let mut sum = 0usize;
    for (slot, &count) in lut.iter_mut().zip(&hist) {
        sum += count;
        *slot = (sum as f32 * scale).round().clamp(0.0, 255.0) as u8;
    }
    lut
}

/// Neighbouring tiles and blend weight for a coordinate.
///
/// Tile centres sit at `(t + 0.5) * tile`; coordinates outside the outer
/// centres clamp to the edge tile.
#[inline]
fn tile_coord(pos: usize, tile: usize, tiles: usize) -> (usize, usize, f32) {
    let t = pos as f32 / tile as f32 - 0.5;
    let t1 = t.floor();
    let weight = t - t1;
    let t1 = t1 as i64;
    let lo = t1.clamp(0, tiles as i64 - 1) as usize;
    let hi = (t1 + 1).clamp(0, tiles as i64 - 1) as usize;
    (lo, hi, weight)
}

fn interpolation_coords(len: usize, tile: usize, tiles: usize) -> Vec<(usize, usize, f32)> {
    (0..len).map(|p| tile_coord(p, tile, tiles)).collect()
}
