//! DDS texture reading and parsing

use super::{DDS_SIGNATURE, DdsHeader, DdsPixelFormat, DdsTexture, HEADER_SIZE};
use crate::error::{Error, Result};
use byteorder::{LittleEndian, ReadBytesExt};
use std::fs::File;
use std::io::{Cursor, Read};
use std::path::Path;

/// Read a .dds file from disk
///
/// # Errors
///
/// Returns [`Error::Io`] if the file cannot be opened or read.
/// Returns [`Error::InvalidDdsMagic`] if the file does not start with "DDS ".
///
/// [`Error::Io`]: crate::Error::Io
/// [`Error::InvalidDdsMagic`]: crate::Error::InvalidDdsMagic
pub fn read_dds<P: AsRef<Path>>(path: P) -> Result<DdsTexture> {
    let mut file = File::open(path)?;
    let mut buffer = Vec::new();
    file.read_to_end(&mut buffer)?;
    parse_dds_bytes(&buffer)
}

/// Parse DDS data from bytes
///
/// The pixel format is kept exactly as stored; unknown fourCC codes only
/// fail later, when something asks for per-mip offsets.
///
/// # Errors
///
/// Returns [`Error::InvalidDdsMagic`] if the data does not start with "DDS ".
/// Returns [`Error::Io`] if the header is truncated.
///
/// [`Error::InvalidDdsMagic`]: crate::Error::InvalidDdsMagic
/// [`Error::Io`]: crate::Error::Io
pub fn parse_dds_bytes(data: &[u8]) -> Result<DdsTexture> {
    let mut cursor = Cursor::new(data);

    let mut magic = [0u8; 4];
    cursor.read_exact(&mut magic)?;
    if u32::from_le_bytes(magic) != DDS_SIGNATURE {
        return Err(Error::InvalidDdsMagic(magic));
    }

    let size = cursor.read_u32::<LittleEndian>()?;
    let flags = cursor.read_u32::<LittleEndian>()?;
    let height = cursor.read_u32::<LittleEndian>()?;
    let width = cursor.read_u32::<LittleEndian>()?;
    let pitch_or_linear_size = cursor.read_u32::<LittleEndian>()?;
    let depth = cursor.read_u32::<LittleEndian>()?;
    let mip_map_count = cursor.read_u32::<LittleEndian>()?;

    // 11 reserved dwords
    let mut reserved = [0u8; 44];
    cursor.read_exact(&mut reserved)?;

    let pixel_format = DdsPixelFormat {
        size: cursor.read_u32::<LittleEndian>()?,
        flags: cursor.read_u32::<LittleEndian>()?,
        four_cc: cursor.read_u32::<LittleEndian>()?,
        rgb_bit_count: cursor.read_u32::<LittleEndian>()?,
        r_bit_mask: cursor.read_u32::<LittleEndian>()?,
        g_bit_mask: cursor.read_u32::<LittleEndian>()?,
        b_bit_mask: cursor.read_u32::<LittleEndian>()?,
        a_bit_mask: cursor.read_u32::<LittleEndian>()?,
    };

    let caps = cursor.read_u32::<LittleEndian>()?;
    let caps2 = cursor.read_u32::<LittleEndian>()?;
    let caps3 = cursor.read_u32::<LittleEndian>()?;
    let caps4 = cursor.read_u32::<LittleEndian>()?;
    cursor.read_u32::<LittleEndian>()?; // reserved

    let header = DdsHeader {
        size,
        flags,
        height,
        width,
        pitch_or_linear_size,
        depth,
        mip_map_count,
        pixel_format,
        caps,
        caps2,
        caps3,
        caps4,
    };

    Ok(DdsTexture {
        header,
        data: data[HEADER_SIZE..].to_vec(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_bad_magic() {
        let err = parse_dds_bytes(b"NOPE").unwrap_err();
        assert!(matches!(err, Error::InvalidDdsMagic(m) if &m == b"NOPE"));
    }

    #[test]
    fn test_truncated_header_is_io_error() {
        let err = parse_dds_bytes(b"DDS \x7C\x00\x00\x00").unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
