//! Single-channel planes.
//!
//! A [`Plane`] is an owned copy of one channel of an [`Image`](crate::Image).
//! Equalization splits the L channel out of a Lab image, works on it as a
//! plane and merges it back; quality scoring works on the gray plane.

use crate::{Error, Result};

/// Owned single-channel 8-bit plane, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plane {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl Plane {
    /// Creates a plane from row-major data.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidDimensions`] on zero dimensions or a length mismatch.
    pub fn from_data(width: u32, height: u32, data: Vec<u8>) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::invalid_dimensions(
                width,
                height,
                "plane dimensions must be > 0",
            ));
        }
        let expected = width as usize * height as usize;
        if data.len() != expected {
            return Err(Error::invalid_dimensions(
                width,
                height,
                format!("expected {} bytes, got {}", expected, data.len()),
            ));
        }
        Ok(Self { width, height, data })
    }

    /// Creates a plane with every sample set to `value`.
    pub fn filled(width: u32, height: u32, value: u8) -> Result<Self> {
        Self::from_data(width, height, vec![value; width as usize * height as usize])
    }

    /// Returns the plane width.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Returns the plane height.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Returns (width, height).
    #[inline]
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Row-major samples.
    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Mutable row-major samples.
    #[inline]
    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Consumes the plane and returns its samples.
    #[inline]
    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    /// Sample at (x, y).
    ///
    /// # Panics
    ///
    /// Panics if (x, y) is out of bounds.
    #[inline]
    pub fn get(&self, x: u32, y: u32) -> u8 {
        assert!(x < self.width && y < self.height, "sample out of bounds");
        self.data[y as usize * self.width as usize + x as usize]
    }

    /// Sample at signed coordinates with reflect-101 border handling.
    ///
    /// `-1` maps to `1`, `width` maps to `width - 2`, and so on. This is
    /// the border convention used by the filters and the CLAHE tiling.
    #[inline]
    pub fn get_reflect101(&self, x: i64, y: i64) -> u8 {
        let sx = reflect101(x, self.width as i64);
        let sy = reflect101(y, self.height as i64);
        self.data[sy * self.width as usize + sx]
    }

    /// Row `y` as a slice.
    #[inline]
    pub fn row(&self, y: u32) -> &[u8] {
        let start = y as usize * self.width as usize;
        &self.data[start..start + self.width as usize]
    }
}

/// Maps `i` into `0..n` by mirroring without repeating the edge sample.
///
/// Works for any offset, not just one period past the edge.
#[inline]
pub fn reflect101(i: i64, n: i64) -> usize {
    if n == 1 {
        return 0;
    }
    let period = 2 * (n - 1);
    let m = i.rem_euclid(period);
    (if m < n { m } else { period - m }) as usize
}
