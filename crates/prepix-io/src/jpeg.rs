//! JPEG format support.
//!
//! Decoding maps the decoder's pixel formats onto color tags:
//!
//! | JPEG pixel format | [`ColorSpace`] |
//! |-------------------|----------------|
//! | RGB24 | `Rgb` |
//! | L8, L16 (high byte) | `Gray` |
//! | CMYK32 | `Rgb` (naive `(1-c)(1-k)`) |
//!
//! Encoding writes grayscale as luma and everything else as RGB. Alpha is
//! dropped. Quality defaults to 100.
//!
//! # Example
//!
//! ```rust
//! use prepix_core::{ColorSpace, Image};
//! use prepix_io::jpeg::{JpegWriter, JpegWriterOptions};
//! use prepix_io::ImageWriter;
//!
//! let image = Image::filled(16, 16, ColorSpace::Rgb, &[90, 120, 150]).unwrap();
//! let writer = JpegWriter::with_options(JpegWriterOptions { quality: 85 });
//! let bytes = writer.write_to_memory(&image).unwrap();
//! assert_eq!(&bytes[..3], &[0xFF, 0xD8, 0xFF]);
//! ```

use crate::{encodable, IoError, IoResult, ImageReader, ImageWriter};
use prepix_core::{ColorSpace, Image};
use std::io::Cursor;
use tracing::trace;

/// JPEG SOI marker followed by the first marker prefix.
pub const MAGIC: [u8; 3] = [0xFF, 0xD8, 0xFF];

/// Returns `true` if `data` starts with a JPEG SOI marker.
pub fn can_read(data: &[u8]) -> bool {
    data.starts_with(&MAGIC)
}

/// JPEG encoder options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JpegWriterOptions {
    /// Quality 1-100. Default: 100.
    pub quality: u8,
}

impl Default for JpegWriterOptions {
    fn default() -> Self {
        Self { quality: 100 }
    }
}

/// JPEG decoder.
#[derive(Debug, Clone, Copy, Default)]
pub struct JpegReader;

impl JpegReader {
    /// Creates a reader.
    pub fn new() -> Self {
        Self
    }
}

impl ImageReader for JpegReader {
    fn read_from_memory(&self, data: &[u8]) -> IoResult<Image> {
        let mut decoder = jpeg_decoder::Decoder::new(Cursor::new(data));
        let pixels = decoder
            .decode()
            .map_err(|e| IoError::DecodeError(e.to_string()))?;
        let info = decoder
            .info()
            .ok_or_else(|| IoError::DecodeError("missing JPEG info".into()))?;

        let width = info.width as u32;
        let height = info.height as u32;
        trace!(width, height, format = ?info.pixel_format, "jpeg decoded");

        let (space, data) = match info.pixel_format {
            jpeg_decoder::PixelFormat::RGB24 => (ColorSpace::Rgb, pixels),
            jpeg_decoder::PixelFormat::L8 => (ColorSpace::Gray, pixels),
            jpeg_decoder::PixelFormat::L16 => {
                (ColorSpace::Gray, pixels.chunks_exact(2).map(|l16| l16[0]).collect())
            }
            jpeg_decoder::PixelFormat::CMYK32 => {
                let rgb: Vec<u8> = pixels
                    .chunks_exact(4)
                    .flat_map(|cmyk| {
                        let k = 1.0 - cmyk[3] as f32 / 255.0;
                        let ink = |v: u8| ((1.0 - v as f32 / 255.0) * k * 255.0).round() as u8;
                        [ink(cmyk[0]), ink(cmyk[1]), ink(cmyk[2])]
                    })
                    .collect();
                (ColorSpace::Rgb, rgb)
            }
        };

        Ok(Image::from_data(width, height, space, data)?)
    }
}

/// JPEG encoder.
#[derive(Debug, Clone, Default)]
pub struct JpegWriter {
    options: JpegWriterOptions,
}

impl JpegWriter {
    /// Creates a writer with default options (quality 100).
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a writer with custom options.
    pub fn with_options(options: JpegWriterOptions) -> Self {
        Self { options }
    }
}

impl ImageWriter for JpegWriter {
    fn write_to_memory(&self, image: &Image) -> IoResult<Vec<u8>> {
        use jpeg_encoder::{ColorType, Encoder};

        let quality = self.options.quality;
        if !(1..=100).contains(&quality) {
            return Err(IoError::EncodeError(format!(
                "quality must be 1-100, got {}",
                quality
            )));
        }
        let (width, height) = image.dimensions();
        let (w16, h16) = match (u16::try_from(width), u16::try_from(height)) {
            (Ok(w), Ok(h)) => (w, h),
            _ => {
                return Err(IoError::EncodeError(format!(
                    "{}x{} exceeds the JPEG size limit",
                    width, height
                )));
            }
        };

        let image = encodable(image, true)?;
        let color_type = match image.color_space() {
            ColorSpace::Gray => ColorType::Luma,
            _ => ColorType::Rgb,
        };
        trace!(width, height, quality, "jpeg encode");

        let mut buffer = Vec::new();
        Encoder::new(&mut buffer, quality)
            .encode(image.data(), w16, h16, color_type)
            .map_err(|e: jpeg_encoder::EncodingError| IoError::EncodeError(e.to_string()))?;
        Ok(buffer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn max_diff(a: &[u8], b: &[u8]) -> u8 {
        a.iter().zip(b).map(|(&x, &y)| x.abs_diff(y)).max().unwrap_or(0)
    }

    #[test]
    fn test_roundtrip_flat_rgb() {
        let image = Image::filled(24, 16, ColorSpace::Rgb, &[90, 120, 150]).unwrap();
        let bytes = JpegWriter::new().write_to_memory(&image).unwrap();
        assert!(can_read(&bytes));
        let loaded = JpegReader::new().read_from_memory(&bytes).unwrap();
        assert_eq!(loaded.dimensions(), (24, 16));
        assert_eq!(loaded.color_space(), ColorSpace::Rgb);
        assert!(max_diff(loaded.data(), image.data()) <= 3);
    }

    #[test]
    fn test_gray_stays_gray() {
        let image = Image::filled(8, 8, ColorSpace::Gray, &[77]).unwrap();
        let bytes = JpegWriter::new().write_to_memory(&image).unwrap();
        let loaded = JpegReader::new().read_from_memory(&bytes).unwrap();
        assert_eq!(loaded.color_space(), ColorSpace::Gray);
        assert!(max_diff(loaded.data(), image.data()) <= 2);
    }

    #[test]
    fn test_bgra_alpha_dropped() {
        let image = Image::filled(8, 8, ColorSpace::Bgra, &[150, 120, 90, 7]).unwrap();
        let bytes = JpegWriter::new().write_to_memory(&image).unwrap();
        let loaded = JpegReader::new().read_from_memory(&bytes).unwrap();
        assert_eq!(loaded.color_space(), ColorSpace::Rgb);
        assert!(max_diff(loaded.pixel(4, 4), &[90, 120, 150]) <= 3);
    }

    #[test]
    fn test_quality_affects_size() {
        let data: Vec<u8> = (0..64 * 64 * 3).map(|i| ((i * 31) % 251) as u8).collect();
        let image = Image::from_data(64, 64, ColorSpace::Rgb, data).unwrap();
        let low = JpegWriter::with_options(JpegWriterOptions { quality: 20 })
            .write_to_memory(&image)
            .unwrap();
        let high = JpegWriter::new().write_to_memory(&image).unwrap();
        assert!(high.len() > low.len());
    }

    #[test]
    fn test_invalid_quality() {
        let image = Image::filled(4, 4, ColorSpace::Rgb, &[0, 0, 0]).unwrap();
        let err = JpegWriter::with_options(JpegWriterOptions { quality: 0 })
            .write_to_memory(&image)
            .unwrap_err();
        assert!(matches!(err, IoError::EncodeError(_)));
    }

    #[test]
    fn test_garbage_after_marker() {
        let err = JpegReader::new()
            .read_from_memory(&[0xFF, 0xD8, 0xFF, 0x00, 0x12, 0x34])
            .unwrap_err();
        assert!(err.is_decode_error());
    }
}
