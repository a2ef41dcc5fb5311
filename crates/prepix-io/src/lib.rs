//! # prepix-io
//!
//! PNG and JPEG decode/encode around [`prepix_core::Image`].
//!
//! The operations in `prepix-ops` never touch files. This crate is the
//! boundary where bytes become images and back:
//!
//! - [`read`] / [`read_from_memory`] sniff the container from its magic bytes
//! - [`write`] / [`write_to_memory`] encode, converting BGR-family and LAB
//!   images to RGB first
//! - [`decode_rgba`] / [`read_rgba`] decode straight to an
//!   [`RgbaBuffer`](prepix_ops::RgbaBuffer)
//! - [`derived_path`] names outputs next to their input
//!
//! # Example
//!
//! ```rust
//! use prepix_core::{ColorSpace, Image};
//! use prepix_io::{read_from_memory, write_to_memory, ImageFormat};
//!
//! let image = Image::filled(8, 8, ColorSpace::Rgb, &[10, 20, 30]).unwrap();
//! let png = write_to_memory(&image, ImageFormat::Png).unwrap();
//! assert_eq!(ImageFormat::detect(&png), Some(ImageFormat::Png));
//! assert_eq!(read_from_memory(&png).unwrap(), image);
//! ```

#![warn(missing_docs)]

mod error;
mod traits;

#[cfg(feature = "jpeg")]
pub mod jpeg;
#[cfg(feature = "png")]
pub mod png;

pub use error::{IoError, IoResult};
pub use traits::{ImageReader, ImageWriter};

use prepix_core::{ColorSpace, Image};
use prepix_ops::{extract_raw_buffer, RgbaBuffer};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Container formats this crate reads and writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageFormat {
    /// Portable Network Graphics.
    Png,
    /// JPEG/JFIF.
    Jpeg,
}

impl ImageFormat {
    /// Detects the format from leading bytes.
    pub fn detect(data: &[u8]) -> Option<Self> {
        if data.starts_with(&[0x89, 0x50, 0x4E, 0x47]) {
            Some(Self::Png)
        } else if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            Some(Self::Jpeg)
        } else {
            None
        }
    }

    /// Format for a file extension, case-insensitive.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "png" => Some(Self::Png),
            "jpg" | "jpeg" => Some(Self::Jpeg),
            _ => None,
        }
    }

    /// Format for a path's extension.
    pub fn from_path(path: impl AsRef<Path>) -> Option<Self> {
        path.as_ref()
            .extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }

    /// Preferred file extension.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
        }
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Png => f.write_str("PNG"),
            Self::Jpeg => f.write_str("JPEG"),
        }
    }
}

/// Reads an image file.
///
/// The format comes from the file's content, not its extension.
pub fn read<P: AsRef<Path>>(path: P) -> IoResult<Image> {
    let path = path.as_ref();
    let bytes = std::fs::read(path)?;
    let image = read_from_memory(&bytes)?;
    debug!(path = %path.display(), width = image.width(), height = image.height(), "read");
    Ok(image)
}

/// Decodes an image from memory.
///
/// # Errors
///
/// [`IoError::DecodeError`] for empty input, an unrecognized signature or a
/// corrupt stream.
pub fn read_from_memory(data: &[u8]) -> IoResult<Image> {
    if data.is_empty() {
        return Err(IoError::DecodeError("empty input".into()));
    }
    match ImageFormat::detect(data) {
        #[cfg(feature = "png")]
        Some(ImageFormat::Png) => png::PngReader::new().read_from_memory(data),
        #[cfg(feature = "jpeg")]
        Some(ImageFormat::Jpeg) => jpeg::JpegReader::new().read_from_memory(data),
        #[allow(unreachable_patterns)]
        Some(format) => Err(IoError::UnsupportedFormat(format!(
            "{} support not compiled in",
            format
        ))),
        None => Err(IoError::DecodeError("unrecognized image signature".into())),
    }
}

/// Writes an image file with default encoder settings.
pub fn write<P: AsRef<Path>>(path: P, image: &Image, format: ImageFormat) -> IoResult<()> {
    let path = path.as_ref();
    let bytes = write_to_memory(image, format)?;
    std::fs::write(path, bytes)?;
    debug!(path = %path.display(), %format, "wrote");
    Ok(())
}

/// Encodes an image with default encoder settings.
///
/// JPEG uses quality 100; use [`jpeg::JpegWriter`] for other settings.
pub fn write_to_memory(image: &Image, format: ImageFormat) -> IoResult<Vec<u8>> {
    match format {
        #[cfg(feature = "png")]
        ImageFormat::Png => png::PngWriter::new().write_to_memory(image),
        #[cfg(feature = "jpeg")]
        ImageFormat::Jpeg => jpeg::JpegWriter::new().write_to_memory(image),
        #[allow(unreachable_patterns)]
        other => Err(IoError::UnsupportedFormat(format!(
            "{} support not compiled in",
            other
        ))),
    }
}

/// Decodes to canonical RGBA bytes.
///
/// Failures surface as [`prepix_core::Error::DecodeFailure`].
///
/// # Example
///
/// ```rust
/// assert!(prepix_io::decode_rgba(&[]).unwrap_err().is_decode_failure());
/// ```
pub fn decode_rgba(data: &[u8]) -> prepix_core::Result<RgbaBuffer> {
    let image = read_from_memory(data)?;
    extract_raw_buffer(&image)
}

/// Reads a file to canonical RGBA bytes.
pub fn read_rgba<P: AsRef<Path>>(path: P) -> prepix_core::Result<RgbaBuffer> {
    let image = read(path)?;
    extract_raw_buffer(&image)
}

/// Output path next to `input`: `<stem>_<suffix>.<ext>`.
///
/// ```rust
/// use prepix_io::{derived_path, ImageFormat};
/// use std::path::Path;
///
/// let out = derived_path("shots/photo.jpg", "clahe", ImageFormat::Jpeg);
/// assert_eq!(out, Path::new("shots/photo_clahe.jpg"));
/// ```
pub fn derived_path<P: AsRef<Path>>(input: P, suffix: &str, format: ImageFormat) -> PathBuf {
    let input = input.as_ref();
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = if suffix.is_empty() {
        format!("{}.{}", stem, format.extension())
    } else {
        format!("{}_{}.{}", stem, suffix, format.extension())
    };
    input.with_file_name(name)
}

/// Converts to a tag the encoders accept.
///
/// GRAY is kept. With `opaque`, everything else becomes RGB; otherwise
/// BGR-family images become RGB/RGBA and LAB becomes RGB.
pub(crate) fn encodable(image: &Image, opaque: bool) -> IoResult<Image> {
    let space = image.color_space();
    let target = match space {
        ColorSpace::Gray => ColorSpace::Gray,
        s if s.has_alpha() && !opaque => ColorSpace::Rgba,
        _ => ColorSpace::Rgb,
    };
    Ok(prepix_color::convert(image, target)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect() {
        assert_eq!(ImageFormat::detect(&[0x89, b'P', b'N', b'G', 13, 10]), Some(ImageFormat::Png));
        assert_eq!(ImageFormat::detect(&[0xFF, 0xD8, 0xFF, 0xE0]), Some(ImageFormat::Jpeg));
        assert_eq!(ImageFormat::detect(b"GIF89a"), None);
        assert_eq!(ImageFormat::detect(&[]), None);
    }

    #[test]
    fn test_from_extension() {
        assert_eq!(ImageFormat::from_extension("JPEG"), Some(ImageFormat::Jpeg));
        assert_eq!(ImageFormat::from_path("a/b.Png"), Some(ImageFormat::Png));
        assert_eq!(ImageFormat::from_path("a/b.tif"), None);
        assert_eq!(ImageFormat::from_path("noext"), None);
    }

    #[test]
    fn test_empty_and_unknown_are_decode_failures() {
        assert!(read_from_memory(&[]).unwrap_err().is_decode_error());
        assert!(read_from_memory(b"not an image").unwrap_err().is_decode_error());

        let err = decode_rgba(b"GIF89a....").unwrap_err();
        assert!(err.is_decode_failure());
    }

    #[test]
    fn test_derived_path() {
        assert_eq!(
            derived_path("photo.jpg", "clahe", ImageFormat::Jpeg),
            PathBuf::from("photo_clahe.jpg")
        );
        assert_eq!(
            derived_path("/tmp/in/photo.jpeg", "lb", ImageFormat::Png),
            PathBuf::from("/tmp/in/photo_lb.png")
        );
        assert_eq!(
            derived_path("photo.png", "", ImageFormat::Jpeg),
            PathBuf::from("photo.jpg")
        );
    }

    #[test]
    fn test_encodable_tags() {
        let lab = Image::filled(1, 1, ColorSpace::Lab, &[255, 128, 128]).unwrap();
        let out = encodable(&lab, false).unwrap();
        assert_eq!(out.color_space(), ColorSpace::Rgb);
        assert_eq!(out.pixel(0, 0), &[255, 255, 255]);

        let bgra = Image::filled(1, 1, ColorSpace::Bgra, &[1, 2, 3, 4]).unwrap();
        assert_eq!(encodable(&bgra, false).unwrap().pixel(0, 0), &[3, 2, 1, 4]);
        assert_eq!(encodable(&bgra, true).unwrap().pixel(0, 0), &[3, 2, 1]);

        let gray = Image::filled(1, 1, ColorSpace::Gray, &[9]).unwrap();
        assert_eq!(encodable(&gray, true).unwrap().color_space(), ColorSpace::Gray);
    }

    #[test]
    fn test_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let image = Image::filled(12, 7, ColorSpace::Rgba, &[10, 20, 30, 40]).unwrap();

        let path = derived_path(dir.path().join("photo.jpg"), "out", ImageFormat::Png);
        write(&path, &image, ImageFormat::Png).unwrap();
        assert_eq!(read(&path).unwrap(), image);

        let rgba = read_rgba(&path).unwrap();
        assert_eq!((rgba.width, rgba.height), (12, 7));
        assert_eq!(&rgba.data[..4], &[10, 20, 30, 40]);

        let missing = read_rgba(dir.path().join("missing.png")).unwrap_err();
        assert!(missing.is_decode_failure());
    }
}
