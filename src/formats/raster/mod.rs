//! .raster texture container
//!
//! The magic-less texture format Spore uses on disk. Unlike DDS it stores
//! every mip level as an independent length-prefixed blob. Conversion to
//! and from [`DdsTexture`] is lossless: joining concatenates the blobs,
//! splitting re-derives the boundaries from the DDS size arithmetic.

mod reader;
mod writer;

pub use reader::{parse_raster_bytes, read_raster};
pub use writer::{serialize_raster, write_raster};

use super::dds::{DdsTexture, TextureFormat};
use crate::error::Result;

/// Leading marker of every Raster file
pub const RASTER_MARKER: u32 = 1;

/// Bits per pixel as recorded by the game, 8 in every known file
pub const PIXEL_WIDTH: u32 = 8;

/// A Raster texture: mip levels stored as independent blobs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterTexture {
    pub width: u32,
    pub height: u32,
    /// Bits per pixel of the stored payloads
    pub pixel_width: u32,
    /// Format code, matching the DDS fourCC (0x15 for uncompressed)
    pub texture_format: u32,
    /// One blob per mip level, largest first
    pub mipmaps: Vec<Vec<u8>>,
}

impl RasterTexture {
    /// Number of mip levels. Derived from the blob list, never stored.
    pub fn mipmap_count(&self) -> u32 {
        self.mipmaps.len() as u32
    }

    /// Join the mip blobs into a single DDS texture.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedFourCc`] if the stored format code is
    /// not one the DDS side can size.
    ///
    /// [`Error::UnsupportedFourCc`]: crate::Error::UnsupportedFourCc
    pub fn to_dds(&self) -> Result<DdsTexture> {
        let format = TextureFormat::from_code(self.texture_format)?;
        let mut data = Vec::with_capacity(self.mipmaps.iter().map(Vec::len).sum());
        for mip in &self.mipmaps {
            data.extend_from_slice(mip);
        }
        Ok(DdsTexture::new(
            self.width,
            self.height,
            self.mipmap_count(),
            format,
            data,
        ))
    }

    /// Split a DDS texture's buffer back into per-mip blobs.
    ///
    /// The split uses the same size arithmetic the DDS side uses, so
    /// `RasterTexture::from_dds(&raster.to_dds()?)` reproduces the original
    /// blob boundaries byte for byte.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedFourCc`] for unknown pixel formats and
    /// [`Error::TextureDataMismatch`] if the DDS buffer is shorter than its
    /// header promises.
    ///
    /// [`Error::UnsupportedFourCc`]: crate::Error::UnsupportedFourCc
    /// [`Error::TextureDataMismatch`]: crate::Error::TextureDataMismatch
    pub fn from_dds(texture: &DdsTexture) -> Result<Self> {
        let format = texture.format()?;
        let count = texture.mipmap_count();
        let mut mipmaps = Vec::with_capacity(count as usize);
        for level in 0..count {
            mipmaps.push(texture.mipmap_data(level)?.to_vec());
        }
        Ok(Self {
            width: texture.width(),
            height: texture.height(),
            pixel_width: PIXEL_WIDTH,
            texture_format: format.code(),
            mipmaps,
        })
    }
}
