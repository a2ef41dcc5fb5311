//! Reader and writer traits implemented by each container format.

use crate::IoResult;
use prepix_core::Image;
use std::path::Path;

/// Decodes one container format into an [`Image`].
pub trait ImageReader {
    /// Reads an image from a file path.
    fn read<P: AsRef<Path>>(&self, path: P) -> IoResult<Image> {
        let bytes = std::fs::read(path.as_ref())?;
        self.read_from_memory(&bytes)
    }

    /// Reads an image from memory.
    fn read_from_memory(&self, data: &[u8]) -> IoResult<Image>;
}

/// Encodes an [`Image`] into one container format.
pub trait ImageWriter {
    /// Writes an image to a file path.
    fn write<P: AsRef<Path>>(&self, path: P, image: &Image) -> IoResult<()> {
        let bytes = self.write_to_memory(image)?;
        std::fs::write(path.as_ref(), bytes)?;
        Ok(())
    }

    /// Writes an image to memory.
    fn write_to_memory(&self, image: &Image) -> IoResult<Vec<u8>>;
}
