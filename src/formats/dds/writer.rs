//! DDS texture writing and serialization

use super::{DDS_SIGNATURE, DdsTexture, HEADER_SIZE};
use crate::error::Result;
use byteorder::{LittleEndian, WriteBytesExt};
use std::path::Path;

/// Write a .dds file to disk
///
/// # Errors
///
/// Returns an error if file writing fails.
pub fn write_dds<P: AsRef<Path>>(texture: &DdsTexture, path: P) -> Result<()> {
    let bytes = serialize_dds(texture)?;
    std::fs::write(path, bytes)?;
    Ok(())
}

/// Serialize a DDS texture to bytes
///
/// Header fields are written exactly as stored; both reserved regions are
/// zero-filled.
///
/// # Errors
///
/// Returns an error only if writing to the in-memory buffer fails.
pub fn serialize_dds(texture: &DdsTexture) -> Result<Vec<u8>> {
    let mut output = Vec::with_capacity(HEADER_SIZE + texture.data.len());
    let header = &texture.header;

    output.write_u32::<LittleEndian>(DDS_SIGNATURE)?;
    output.write_u32::<LittleEndian>(header.size)?;
    output.write_u32::<LittleEndian>(header.flags)?;
    output.write_u32::<LittleEndian>(header.height)?;
    output.write_u32::<LittleEndian>(header.width)?;
    output.write_u32::<LittleEndian>(header.pitch_or_linear_size)?;
    output.write_u32::<LittleEndian>(header.depth)?;
    output.write_u32::<LittleEndian>(header.mip_map_count)?;
    output.extend_from_slice(&[0u8; 44]);

    let pf = &header.pixel_format;
    output.write_u32::<LittleEndian>(pf.size)?;
    output.write_u32::<LittleEndian>(pf.flags)?;
    output.write_u32::<LittleEndian>(pf.four_cc)?;
    output.write_u32::<LittleEndian>(pf.rgb_bit_count)?;
    output.write_u32::<LittleEndian>(pf.r_bit_mask)?;
    output.write_u32::<LittleEndian>(pf.g_bit_mask)?;
    output.write_u32::<LittleEndian>(pf.b_bit_mask)?;
    output.write_u32::<LittleEndian>(pf.a_bit_mask)?;

    output.write_u32::<LittleEndian>(header.caps)?;
    output.write_u32::<LittleEndian>(header.caps2)?;
    output.write_u32::<LittleEndian>(header.caps3)?;
    output.write_u32::<LittleEndian>(header.caps4)?;
    output.write_u32::<LittleEndian>(0)?; // reserved

    output.extend_from_slice(&texture.data);
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::super::{TextureFormat, parse_dds_bytes};
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_serialized_header_layout() {
        let texture = DdsTexture::new(4, 4, 1, TextureFormat::Uncompressed, vec![0xAB; 16]);
        let bytes = serialize_dds(&texture).unwrap();

        assert_eq!(bytes.len(), HEADER_SIZE + 16);
        assert_eq!(&bytes[0..4], b"DDS ");
        // size, then flags CAPS|HEIGHT|WIDTH|PIXELFORMAT|MIPMAPCOUNT|LINEARSIZE
        assert_eq!(u32::from_le_bytes(bytes[4..8].try_into().unwrap()), 0x7C);
        assert_eq!(
            u32::from_le_bytes(bytes[8..12].try_into().unwrap()),
            0x000A_1007
        );
        // height, width, linear size (4 * 4 * 4 bytes)
        assert_eq!(u32::from_le_bytes(bytes[12..16].try_into().unwrap()), 4);
        assert_eq!(u32::from_le_bytes(bytes[16..20].try_into().unwrap()), 4);
        assert_eq!(u32::from_le_bytes(bytes[20..24].try_into().unwrap()), 64);
        // the uncompressed sentinel stores pfFlags 0x41 with fourCC 0
        assert_eq!(
            u32::from_le_bytes(bytes[80..84].try_into().unwrap()),
            0x41
        );
        assert_eq!(u32::from_le_bytes(bytes[84..88].try_into().unwrap()), 0);
    }

    #[test]
    fn test_round_trip_preserves_bytes_and_structure() {
        let data: Vec<u8> = (0..200u32).map(|i| (i % 256) as u8).collect();
        let texture = DdsTexture::new(17, 17, 1, TextureFormat::Dxt1, data);

        let bytes = serialize_dds(&texture).unwrap();
        let reread = parse_dds_bytes(&bytes).unwrap();
        assert_eq!(reread, texture);
        assert_eq!(serialize_dds(&reread).unwrap(), bytes);
    }

    #[test]
    fn test_compressed_four_cc_written_verbatim() {
        let texture = DdsTexture::new(8, 8, 1, TextureFormat::Dxt5, vec![0; 64]);
        let bytes = serialize_dds(&texture).unwrap();
        assert_eq!(&bytes[84..88], b"DXT5");

        let reread = parse_dds_bytes(&bytes).unwrap();
        assert_eq!(reread.format().unwrap(), TextureFormat::Dxt5);
    }
}
