//! PNG format support.
//!
//! Decoding always yields 8-bit samples: palette and sub-byte images are
//! expanded and 16-bit images are stripped to their high byte.
//!
//! | PNG color type | [`ColorSpace`] |
//! |----------------|----------------|
//! | Grayscale | `Gray` |
//! | GrayscaleAlpha | `Rgba` |
//! | Rgb, Indexed | `Rgb` |
//! | Rgba, Indexed + tRNS | `Rgba` |
//!
//! Encoding writes Gray, Rgb and Rgba as-is; other tags are converted to
//! RGB(A) first.

use crate::{encodable, IoError, IoResult, ImageReader, ImageWriter};
use prepix_core::{ColorSpace, Image};
use std::io::Cursor;
use tracing::trace;

/// PNG signature.
pub const MAGIC: [u8; 4] = [0x89, 0x50, 0x4E, 0x47];

/// Returns `true` if `data` starts with the PNG signature.
pub fn can_read(data: &[u8]) -> bool {
    data.starts_with(&MAGIC)
}

/// PNG decoder.
#[derive(Debug, Clone, Copy, Default)]
pub struct PngReader;

impl PngReader {
    /// Creates a reader.
    pub fn new() -> Self {
        Self
    }
}

impl ImageReader for PngReader {
    fn read_from_memory(&self, data: &[u8]) -> IoResult<Image> {
        let mut decoder = png::Decoder::new(Cursor::new(data));
        decoder.set_transformations(png::Transformations::EXPAND | png::Transformations::STRIP_16);
        let mut reader = decoder
            .read_info()
            .map_err(|e: png::DecodingError| IoError::DecodeError(e.to_string()))?;

        let buf_size = reader
            .output_buffer_size()
            .ok_or_else(|| IoError::DecodeError("cannot determine output buffer size".into()))?;
        let mut buf = vec![0u8; buf_size];
        let info = reader
            .next_frame(&mut buf)
            .map_err(|e: png::DecodingError| IoError::DecodeError(e.to_string()))?;
        buf.truncate(info.buffer_size());

        trace!(
            width = info.width,
            height = info.height,
            color = ?info.color_type,
            "png decoded"
        );

        let (space, data) = match (info.color_type, info.bit_depth) {
            (png::ColorType::Grayscale, png::BitDepth::Eight) => (ColorSpace::Gray, buf),
            (png::ColorType::GrayscaleAlpha, png::BitDepth::Eight) => {
                let rgba: Vec<u8> = buf
                    .chunks_exact(2)
                    .flat_map(|ga| [ga[0], ga[0], ga[0], ga[1]])
                    .collect();
                (ColorSpace::Rgba, rgba)
            }
            (png::ColorType::Rgb, png::BitDepth::Eight) => (ColorSpace::Rgb, buf),
            (png::ColorType::Rgba, png::BitDepth::Eight) => (ColorSpace::Rgba, buf),
            (color_type, bit_depth) => {
                return Err(IoError::DecodeError(format!(
                    "unexpected PNG output layout {:?} {:?}",
                    color_type, bit_depth
                )));
            }
        };

        Ok(Image::from_data(info.width, info.height, space, data)?)
    }
}

/// PNG encoder.
#[derive(Debug, Clone, Copy, Default)]
pub struct PngWriter {
    compression: png::Compression,
}

impl PngWriter {
    /// Creates a writer with default compression.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the compression level.
    pub fn with_compression(mut self, compression: png::Compression) -> Self {
        self.compression = compression;
        self
    }
}

impl ImageWriter for PngWriter {
    fn write_to_memory(&self, image: &Image) -> IoResult<Vec<u8>> {
        let image = encodable(image, false)?;
        let color_type = match image.color_space() {
            ColorSpace::Gray => png::ColorType::Grayscale,
            ColorSpace::Rgb => png::ColorType::Rgb,
            ColorSpace::Rgba => png::ColorType::Rgba,
            other => {
                return Err(IoError::UnsupportedFormat(format!("{} in PNG", other)));
            }
        };
        trace!(
            width = image.width(),
            height = image.height(),
            color = ?color_type,
            "png encode"
        );

        let mut out = Vec::new();
        {
            let mut encoder = png::Encoder::new(&mut out, image.width(), image.height());
            encoder.set_color(color_type);
            encoder.set_depth(png::BitDepth::Eight);
            encoder.set_compression(self.compression);
            encoder.set_source_srgb(png::SrgbRenderingIntent::Perceptual);

            let mut writer = encoder
                .write_header()
                .map_err(|e| IoError::EncodeError(e.to_string()))?;
            writer
                .write_image_data(image.data())
                .map_err(|e| IoError::EncodeError(e.to_string()))?;
            writer
                .finish()
                .map_err(|e| IoError::EncodeError(e.to_string()))?;
        }
        Ok(out)
    }
}
