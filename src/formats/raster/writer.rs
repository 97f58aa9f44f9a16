//! Raster texture writing and serialization

use super::{RASTER_MARKER, RasterTexture};
use crate::error::Result;
use byteorder::{LittleEndian, WriteBytesExt};
use std::path::Path;

/// Write a .raster file to disk
///
/// # Errors
///
/// Returns an error if file writing fails.
pub fn write_raster<P: AsRef<Path>>(texture: &RasterTexture, path: P) -> Result<()> {
    let bytes = serialize_raster(texture)?;
    std::fs::write(path, bytes)?;
    Ok(())
}

/// Serialize a Raster texture to bytes
///
/// The mip count is taken from the blob list, so it can never disagree
/// with the number of blobs that follow it.
///
/// # Errors
///
/// Returns an error only if writing to the in-memory buffer fails.
pub fn serialize_raster(texture: &RasterTexture) -> Result<Vec<u8>> {
    let mut output = Vec::new();

    output.write_u32::<LittleEndian>(RASTER_MARKER)?;
    output.write_u32::<LittleEndian>(texture.width)?;
    output.write_u32::<LittleEndian>(texture.height)?;
    output.write_u32::<LittleEndian>(texture.mipmap_count())?;
    output.write_u32::<LittleEndian>(texture.pixel_width)?;
    output.write_u32::<LittleEndian>(texture.texture_format)?;

    for mip in &texture.mipmaps {
        output.write_u32::<LittleEndian>(mip.len() as u32)?;
        output.extend_from_slice(mip);
    }

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::super::{PIXEL_WIDTH, parse_raster_bytes, read_raster};
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample() -> RasterTexture {
        RasterTexture {
            width: 4,
            height: 4,
            pixel_width: PIXEL_WIDTH,
            texture_format: u32::from_le_bytes(*b"DXT1"),
            mipmaps: vec![vec![0xAA; 8], vec![0xBB; 8], vec![0xCC; 8]],
        }
    }

    #[test]
    fn test_round_trip_preserves_bytes_and_structure() {
        let texture = sample();
        let bytes = serialize_raster(&texture).unwrap();

        // marker, width, height, count, pixel width, format
        assert_eq!(u32::from_le_bytes(bytes[0..4].try_into().unwrap()), 1);
        assert_eq!(u32::from_le_bytes(bytes[12..16].try_into().unwrap()), 3);
        assert_eq!(&bytes[20..24], b"DXT1");

        let reread = parse_raster_bytes(&bytes).unwrap();
        assert_eq!(reread, texture);
        assert_eq!(serialize_raster(&reread).unwrap(), bytes);
    }

    #[test]
    fn test_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sample.raster");

        let texture = sample();
        write_raster(&texture, &path).unwrap();
        assert_eq!(read_raster(&path).unwrap(), texture);
    }
}
