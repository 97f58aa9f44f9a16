//! Raster texture reading and parsing

use super::{RASTER_MARKER, RasterTexture};
use crate::error::{Error, Result};
use byteorder::{LittleEndian, ReadBytesExt};
use std::fs::File;
use std::io::{Cursor, Read};
use std::path::Path;

/// Read a .raster file from disk
///
/// # Errors
///
/// Returns [`Error::Io`] if the file cannot be opened or read.
/// Returns [`Error::InvalidRasterMarker`] if the leading marker is not 1.
///
/// [`Error::Io`]: crate::Error::Io
/// [`Error::InvalidRasterMarker`]: crate::Error::InvalidRasterMarker
pub fn read_raster<P: AsRef<Path>>(path: P) -> Result<RasterTexture> {
    let mut file = File::open(path)?;
    let mut buffer = Vec::new();
    file.read_to_end(&mut buffer)?;
    parse_raster_bytes(&buffer)
}

/// Parse Raster data from bytes
///
/// # Errors
///
/// Returns [`Error::InvalidRasterMarker`] if the leading marker is not 1.
/// Returns [`Error::Io`] if the data is truncated.
///
/// [`Error::InvalidRasterMarker`]: crate::Error::InvalidRasterMarker
/// [`Error::Io`]: crate::Error::Io
pub fn parse_raster_bytes(data: &[u8]) -> Result<RasterTexture> {
    let mut cursor = Cursor::new(data);

    let marker = cursor.read_u32::<LittleEndian>()?;
    if marker != RASTER_MARKER {
        return Err(Error::InvalidRasterMarker { marker });
    }

    let width = cursor.read_u32::<LittleEndian>()?;
    let height = cursor.read_u32::<LittleEndian>()?;
    let mipmap_count = cursor.read_u32::<LittleEndian>()?;
    let pixel_width = cursor.read_u32::<LittleEndian>()?;
    let texture_format = cursor.read_u32::<LittleEndian>()?;

    let mut mipmaps = Vec::with_capacity(mipmap_count as usize);
    for _ in 0..mipmap_count {
        let length = cursor.read_u32::<LittleEndian>()? as usize;
        let mut blob = vec![0u8; length];
        cursor.read_exact(&mut blob)?;
        mipmaps.push(blob);
    }

    Ok(RasterTexture {
        width,
        height,
        pixel_width,
        texture_format,
        mipmaps,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_bad_marker() {
        let err = parse_raster_bytes(&[2, 0, 0, 0]).unwrap_err();
        assert!(matches!(err, Error::InvalidRasterMarker { marker: 2 }));
    }

    #[test]
    fn test_truncated_blob_is_io_error() {
        let mut bytes = Vec::new();
        for value in [1u32, 4, 4, 1, 8, 0x15] {
            bytes.extend_from_slice(&value.to_le_bytes());
        }
        // declares a 16-byte blob but provides 3 bytes
        bytes.extend_from_slice(&16u32.to_le_bytes());
        bytes.extend_from_slice(&[1, 2, 3]);

        let err = parse_raster_bytes(&bytes).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
