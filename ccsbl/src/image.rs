//! Firmware image loading.
//!
//! The boot ROM treats the image as an opaque byte stream, so this module
//! does no format parsing: it reads the file into a dynamically sized buffer
//! and enforces a configurable size cap so a stray path cannot balloon host
//! memory or overrun the target's flash by orders of magnitude.

use log::debug;
use std::fs;
use std::path::Path;

use crate::error::{Error, Result};

/// Default maximum image size: 1 MiB, comfortably above the largest
/// CC13x0/CC26x0 flash bank.
pub const DEFAULT_MAX_IMAGE_SIZE: u64 = 0x0010_0000;

/// An opaque firmware image held in memory for the duration of a load.
#[derive(Debug, Clone)]
pub struct FirmwareImage {
    data: Vec<u8>,
}

impl FirmwareImage {
    /// Load an image from disk, capped at [`DEFAULT_MAX_IMAGE_SIZE`].
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_file_with_limit(path, DEFAULT_MAX_IMAGE_SIZE)
    }

    /// Load an image from disk with an explicit size cap.
    pub fn from_file_with_limit(path: impl AsRef<Path>, max: u64) -> Result<Self> {
        let path = path.as_ref();
        let size = fs::metadata(path)?.len();
        if size > max {
            return Err(Error::ImageTooLarge { size, max });
        }

        let data = fs::read(path)?;
        debug!("Loaded image {} ({} bytes)", path.display(), data.len());
        Ok(Self { data })
    }

    /// Wrap an in-memory buffer.
    pub fn from_bytes(data: Vec<u8>) -> Self {
        Self { data }
    }

    /// Image bytes.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Image size in bytes.
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.data.len()
    }
}
