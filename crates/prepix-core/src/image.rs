//! Image buffer type.
//!
//! [`Image`] is the pixel buffer every operation consumes and produces:
//! 8 bits per channel, row-major, channels interleaved, tagged with a
//! [`ColorSpace`] that fixes the channel count.
//!
//! # Memory Layout
//!
//! ```text
//! Memory: [R G B R G B R G B ...]  <- Row 0
//!         [R G B R G B R G B ...]  <- Row 1
//!         ...
//! ```
//!
//! # Ownership
//!
//! Pixel data lives in an `Arc<Vec<u8>>`. Cloning is cheap and mutation goes
//! through copy-on-write, so a transform that starts from a clone never
//! disturbs the buffer a caller is still holding.
//!
//! ```rust
//! use prepix_core::{ColorSpace, Image};
//!
//! let src = Image::filled(4, 4, ColorSpace::Rgb, &[10, 20, 30]).unwrap();
//! let mut dst = src.clone();
//! dst.set_pixel(0, 0, &[0, 0, 0]);
//!
//! assert_eq!(src.pixel(0, 0), &[10, 20, 30]);
//! assert_eq!(dst.pixel(0, 0), &[0, 0, 0]);
//! ```

use crate::{ColorSpace, Error, Result};
use std::sync::Arc;

/// Owned 8-bit image buffer with a color space tag.
///
/// Invariants: `width > 0`, `height > 0`,
/// `data.len() == width * height * space.channels()`.
#[derive(Clone, PartialEq, Eq)]
pub struct Image {
    /// Pixel data buffer (Arc for cheap cloning)
    data: Arc<Vec<u8>>,
    width: u32,
    height: u32,
    space: ColorSpace,
}

impl Image {
    /// Creates a zero-filled image.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidDimensions`] if either dimension is zero or the buffer
    /// size overflows.
    ///
    /// # Example
    ///
    /// ```rust
    /// use prepix_core::{ColorSpace, Image};
    ///
    /// let img = Image::new(416, 416, ColorSpace::Rgb).unwrap();
    /// assert_eq!(img.data().len(), 416 * 416 * 3);
    /// assert!(Image::new(0, 416, ColorSpace::Rgb).is_err());
    /// ```
    pub fn new(width: u32, height: u32, space: ColorSpace) -> Result<Self> {
        let len = buffer_len(width, height, space)?;
        Ok(Self {
            data: Arc::new(vec![0; len]),
            width,
            height,
            space,
        })
    }

    /// Creates an image from existing interleaved pixel data.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidDimensions`] if a dimension is zero or `data` does not
    /// hold exactly `width * height * channels` bytes.
    pub fn from_data(width: u32, height: u32, space: ColorSpace, data: Vec<u8>) -> Result<Self> {
        let expected = buffer_len(width, height, space)?;
        if data.len() != expected {
            return Err(Error::invalid_dimensions(
                width,
                height,
                format!("expected {} bytes, got {}", expected, data.len()),
            ));
        }
        Ok(Self {
            data: Arc::new(data),
            width,
            height,
            space,
        })
    }

    /// Creates an image with every pixel set to `pixel`.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidDimensions`] for zero dimensions,
    /// [`Error::InvalidParameter`] if `pixel.len()` is not the channel count.
    pub fn filled(width: u32, height: u32, space: ColorSpace, pixel: &[u8]) -> Result<Self> {
        if pixel.len() != space.channels() {
            return Err(Error::invalid_parameter(format!(
                "fill pixel has {} channels, {} expects {}",
                pixel.len(),
                space,
                space.channels()
            )));
        }
        let len = buffer_len(width, height, space)?;
        let mut data = Vec::with_capacity(len);
        for _ in 0..(width as usize * height as usize) {
            data.extend_from_slice(pixel);
        }
        Ok(Self {
            data: Arc::new(data),
            width,
            height,
            space,
        })
    }

    /// Returns the image width in pixels.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Returns the image height in pixels.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Returns the image dimensions as (width, height).
    #[inline]
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Returns the color space tag.
    #[inline]
    pub fn color_space(&self) -> ColorSpace {
        self.space
    }

    /// Returns the number of channels per pixel.
    #[inline]
    pub fn channels(&self) -> usize {
        self.space.channels()
    }

    /// Returns the total number of pixels.
    #[inline]
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Returns the raw interleaved pixel data.
    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Returns mutable pixel data, cloning first if the buffer is shared.
    #[inline]
    pub fn data_mut(&mut self) -> &mut [u8] {
        Arc::make_mut(&mut self.data).as_mut_slice()
    }

    /// Consumes the image and returns its pixel data.
    ///
    /// Copies only if the buffer is still shared with a clone.
    pub fn into_data(self) -> Vec<u8> {
        Arc::try_unwrap(self.data).unwrap_or_else(|shared| (*shared).clone())
    }

    #[inline]
    fn pixel_offset(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * self.channels()
    }

    /// Returns the channels of pixel (x, y).
    ///
    /// # Panics
    ///
    /// Panics if (x, y) is out of bounds.
    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> &[u8] {
        assert!(x < self.width && y < self.height, "pixel out of bounds");
        let offset = self.pixel_offset(x, y);
        &self.data[offset..offset + self.channels()]
    }

    /// Returns pixel (x, y), or `None` if out of bounds.
    #[inline]
    pub fn get_pixel(&self, x: u32, y: u32) -> Option<&[u8]> {
        if x < self.width && y < self.height {
            Some(self.pixel(x, y))
        } else {
            None
        }
    }

    /// Sets pixel (x, y).
    ///
    /// # Panics
    ///
    /// Panics if (x, y) is out of bounds or `pixel` has the wrong length.
    #[inline]
    pub fn set_pixel(&mut self, x: u32, y: u32, pixel: &[u8]) {
        assert!(x < self.width && y < self.height, "pixel out of bounds");
        let n = self.channels();
        let offset = self.pixel_offset(x, y);
        self.data_mut()[offset..offset + n].copy_from_slice(pixel);
    }

    /// Returns row `y` as an interleaved slice.
    ///
    /// # Panics
    ///
    /// Panics if `y >= height`.
    #[inline]
    pub fn row(&self, y: u32) -> &[u8] {
        assert!(y < self.height, "row out of bounds");
        let stride = self.width as usize * self.channels();
        let start = y as usize * stride;
        &self.data[start..start + stride]
    }

    /// Returns row `y` mutably.
    ///
    /// # Panics
    ///
    /// Panics if `y >= height`.
    #[inline]
    pub fn row_mut(&mut self, y: u32) -> &mut [u8] {
        assert!(y < self.height, "row out of bounds");
        let stride = self.width as usize * self.channels();
        let start = y as usize * stride;
        &mut self.data_mut()[start..start + stride]
    }

    /// Iterates over pixels as channel slices in row-major order.
    pub fn pixels(&self) -> impl Iterator<Item = &[u8]> + '_ {
        self.data.chunks_exact(self.channels())
    }

    /// Re-tags the buffer without touching the data.
    ///
    /// Use this only when the bytes are already in `space`, for example to
    /// read a decoder's BGR output as such.
    ///
    /// # Errors
    ///
    /// [`Error::UnsupportedFormat`] if the channel counts differ.
    pub fn reinterpret(self, space: ColorSpace) -> Result<Self> {
        if space.channels() != self.space.channels() {
            return Err(Error::unsupported(
                format!("{} -> {}", self.space, space),
                "reinterpret",
            ));
        }
        Ok(Self { space, ..self })
    }

    /// Copies `src` into this image with its top-left corner at (left, top).
    ///
    /// Pixels of `src` that fall outside this image are skipped.
    ///
    /// # Errors
    ///
    /// [`Error::UnsupportedFormat`] if the color tags differ.
    pub fn paste(&mut self, src: &Image, left: u32, top: u32) -> Result<()> {
        if src.space != self.space {
            return Err(Error::unsupported(
                format!("{} onto {}", src.space, self.space),
                "paste",
            ));
        }
        if left >= self.width || top >= self.height {
            return Ok(());
        }
        let n = self.channels();
        let copy_w = src.width.min(self.width - left) as usize;
        let copy_h = src.height.min(self.height - top);
        for sy in 0..copy_h {
            let src_row = &src.row(sy)[..copy_w * n];
            let dst_row = self.row_mut(top + sy);
            let start = left as usize * n;
            dst_row[start..start + copy_w * n].copy_from_slice(src_row);
        }
        Ok(())
    }
}

impl std::fmt::Debug for Image {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Image")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("colorspace", &self.space)
            .finish()
    }
}

/// Validates dimensions and returns the interleaved buffer length.
fn buffer_len(width: u32, height: u32, space: ColorSpace) -> Result<usize> {
    if width == 0 || height == 0 {
        return Err(Error::invalid_dimensions(
            width,
            height,
            "width and height must be > 0",
        ));
    }
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|v| v.checked_mul(space.channels()))
        .ok_or_else(|| Error::invalid_dimensions(width, height, "buffer size overflows"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_new() {
        let img = Image::new(100, 50, ColorSpace::Rgba).unwrap();
        assert_eq!(img.dimensions(), (100, 50));
        assert_eq!(img.channels(), 4);
        assert_eq!(img.pixel_count(), 5000);
        assert!(img.data().iter().all(|&v| v == 0));
    }

    #[test]
    fn test_image_zero_dimensions() {
        let err = Image::new(0, 10, ColorSpace::Rgb).unwrap_err();
        assert!(err.is_invalid_dimensions());
        let err = Image::from_data(10, 0, ColorSpace::Gray, vec![]).unwrap_err();
        assert!(err.is_invalid_dimensions());
    }

    #[test]
    fn test_image_from_data_wrong_size() {
        let result = Image::from_data(10, 10, ColorSpace::Rgb, vec![0; 299]);
        assert!(result.unwrap_err().is_invalid_dimensions());
    }

    #[test]
    fn test_image_filled() {
        let img = Image::filled(3, 2, ColorSpace::Bgr, &[1, 2, 3]).unwrap();
        assert_eq!(img.pixel(2, 1), &[1, 2, 3]);
        assert!(Image::filled(3, 2, ColorSpace::Bgr, &[1, 2]).is_err());
    }

    #[test]
    fn test_image_row() {
        let img = Image::filled(10, 10, ColorSpace::Rgb, &[9, 8, 7]).unwrap();
        let row = img.row(5);
        assert_eq!(row.len(), 30);
        assert_eq!(&row[0..3], &[9, 8, 7]);
    }

    #[test]
    fn test_image_clone_cow() {
        let img1 = Image::filled(10, 10, ColorSpace::Gray, &[200]).unwrap();
        let mut img2 = img1.clone();
        img2.set_pixel(0, 0, &[0]);
        assert_eq!(img1.pixel(0, 0), &[200]);
        assert_eq!(img2.pixel(0, 0), &[0]);
    }

    #[test]
    fn test_reinterpret() {
        let img = Image::filled(2, 2, ColorSpace::Rgb, &[1, 2, 3]).unwrap();
        let bgr = img.clone().reinterpret(ColorSpace::Bgr).unwrap();
        assert_eq!(bgr.color_space(), ColorSpace::Bgr);
        assert_eq!(bgr.data(), img.data());
        assert!(img.reinterpret(ColorSpace::Rgba).is_err());
    }

    #[test]
    fn test_paste_centered() {
        let mut canvas = Image::new(6, 4, ColorSpace::Gray).unwrap();
        let patch = Image::filled(2, 2, ColorSpace::Gray, &[255]).unwrap();
        canvas.paste(&patch, 2, 1).unwrap();
        for y in 0..4 {
            for x in 0..6 {
                let inside = (2..4).contains(&x) && (1..3).contains(&y);
                let expected = if inside { 255 } else { 0 };
                assert_eq!(canvas.pixel(x, y), &[expected], "at ({x}, {y})");
            }
        }
    }

    #[test]
    fn test_paste_clips_and_checks_tag() {
        let mut canvas = Image::new(4, 4, ColorSpace::Rgb).unwrap();
        let patch = Image::filled(3, 3, ColorSpace::Rgb, &[5, 5, 5]).unwrap();
        canvas.paste(&patch, 2, 2).unwrap();
        assert_eq!(canvas.pixel(3, 3), &[5, 5, 5]);
        assert_eq!(canvas.pixel(1, 1), &[0, 0, 0]);

        let gray = Image::new(1, 1, ColorSpace::Gray).unwrap();
        assert!(canvas.paste(&gray, 0, 0).unwrap_err().is_unsupported_format());
    }

    #[test]
    fn test_into_data_shared() {
        let img = Image::filled(2, 1, ColorSpace::Gray, &[7]).unwrap();
        let keep = img.clone();
        assert_eq!(img.into_data(), vec![7, 7]);
        assert_eq!(keep.data(), &[7, 7]);
    }
}
