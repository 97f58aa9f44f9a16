//! Capability reading and parsing

use super::{
    CapabilityMapping, CapabilityName, CapabilityUnit, DeformSpec, PCTP_MAGIC, unpack_identifier,
};
use crate::error::{Error, Result};
use byteorder::{BigEndian, LittleEndian, ReadBytesExt};
use indexmap::IndexMap;
use std::fs::File;
use std::io::{Cursor, Read};
use std::path::Path;

/// Read a .pctp file from disk
///
/// # Errors
///
/// Returns [`Error::Io`] if the file cannot be opened or read; otherwise
/// as [`parse_pctp_bytes`].
///
/// [`Error::Io`]: crate::Error::Io
pub fn read_pctp<P: AsRef<Path>>(path: P) -> Result<CapabilityUnit> {
    let mut file = File::open(path)?;
    let mut buffer = Vec::new();
    file.read_to_end(&mut buffer)?;
    parse_pctp_bytes(&buffer)
}

/// Parse PCTP data from bytes
///
/// # Errors
///
/// Returns [`Error::InvalidPctpMagic`] if the file does not start with
/// "pctp", [`Error::UnsupportedPctpVersion`] for versions other than 3 or
/// 4, and [`Error::Io`] on truncation.
///
/// [`Error::InvalidPctpMagic`]: crate::Error::InvalidPctpMagic
/// [`Error::UnsupportedPctpVersion`]: crate::Error::UnsupportedPctpVersion
/// [`Error::Io`]: crate::Error::Io
pub fn parse_pctp_bytes(data: &[u8]) -> Result<CapabilityUnit> {
    let mut cursor = Cursor::new(data);

    let mut magic = [0u8; 4];
    cursor.read_exact(&mut magic)?;
    if magic != PCTP_MAGIC {
        return Err(Error::InvalidPctpMagic(magic));
    }

    let version = cursor.read_u32::<BigEndian>()?;
    if !(3..=4).contains(&version) {
        return Err(Error::UnsupportedPctpVersion { version });
    }
    let priority = if version > 3 {
        cursor.read_f32::<BigEndian>()?
    } else {
        0.0
    };

    let name_count = cursor.read_u32::<BigEndian>()?;
    let mut capability_names = Vec::with_capacity(name_count as usize);
    for _ in 0..name_count {
        let length = cursor.read_u32::<BigEndian>()? as usize;
        let mut raw = vec![0u8; length];
        cursor.read_exact(&mut raw)?;
        capability_names.push(CapabilityName {
            name: String::from_utf8(raw)?,
            identifier: unpack_identifier(cursor.read_u32::<LittleEndian>()?),
        });
    }

    let mapping_count = cursor.read_u32::<BigEndian>()?;
    let mut capabilities_map = IndexMap::with_capacity(mapping_count as usize);
    for _ in 0..mapping_count {
        let key = cursor.read_u32::<BigEndian>()?;
        let identifier = unpack_identifier(cursor.read_u32::<LittleEndian>()?);
        let index = cursor.read_i32::<BigEndian>()?;
        capabilities_map.insert(key, CapabilityMapping { identifier, index });
    }

    let aggregate_count = cursor.read_u32::<BigEndian>()?;
    let mut aggregates = IndexMap::with_capacity(aggregate_count as usize);
    for _ in 0..aggregate_count {
        let key = unpack_identifier(cursor.read_u32::<LittleEndian>()?);
        let value_count = cursor.read_u32::<BigEndian>()?;
        let mut values = Vec::with_capacity(value_count as usize);
        for _ in 0..value_count {
            values.push(unpack_identifier(cursor.read_u32::<LittleEndian>()?));
        }
        aggregates.insert(key, values);
    }

    let spec_count = cursor.read_u32::<BigEndian>()?;
    let mut deform_specs = IndexMap::with_capacity(spec_count as usize);
    for _ in 0..spec_count {
        let key = unpack_identifier(cursor.read_u32::<LittleEndian>()?);
        let entry_count = cursor.read_u32::<BigEndian>()?;
        let mut entries = Vec::with_capacity(entry_count as usize);
        for _ in 0..entry_count {
            entries.push(read_deform_spec(&mut cursor, version)?);
        }
        deform_specs.insert(key, entries);
    }

    Ok(CapabilityUnit {
        version,
        priority,
        capability_names,
        capabilities_map,
        aggregates,
        deform_specs,
    })
}

fn read_deform_spec<R: Read>(reader: &mut R, version: u32) -> Result<DeformSpec> {
    let deform_id = reader.read_u32::<BigEndian>()?;
    let mut range = [0.0f32, 1.0];
    range[0] = reader.read_f32::<BigEndian>()?;
    // Version 3 stores only the first range value.
    if version > 3 {
        range[1] = reader.read_f32::<BigEndian>()?;
    }
    let flags = reader.read_i32::<BigEndian>()?;
    Ok(DeformSpec {
        deform_id,
        range,
        flags,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use byteorder::WriteBytesExt;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_rejects_bad_magic() {
        let result = parse_pctp_bytes(b"PCTP\x00\x00\x00\x04");
        assert!(matches!(
            result,
            Err(Error::InvalidPctpMagic(magic)) if &magic == b"PCTP"
        ));
    }

    #[test]
    fn test_rejects_unsupported_version() {
        let mut data = Vec::new();
        data.extend_from_slice(&PCTP_MAGIC);
        data.write_u32::<BigEndian>(5).unwrap();
        assert!(matches!(
            parse_pctp_bytes(&data),
            Err(Error::UnsupportedPctpVersion { version: 5 })
        ));
    }

    #[test]
    fn test_version_3_has_no_priority_and_one_range_float() {
        let mut data = Vec::new();
        data.extend_from_slice(&PCTP_MAGIC);
        data.write_u32::<BigEndian>(3).unwrap();
        data.write_u32::<BigEndian>(0).unwrap(); // names
        data.write_u32::<BigEndian>(0).unwrap(); // mappings
        data.write_u32::<BigEndian>(0).unwrap(); // aggregates
        data.write_u32::<BigEndian>(1).unwrap(); // deform specs
        data.extend_from_slice(&super::super::pack_identifier("grab").unwrap());
        data.write_u32::<BigEndian>(1).unwrap();
        data.write_u32::<BigEndian>(0x1122_3344).unwrap();
        data.write_f32::<BigEndian>(0.5).unwrap();
        data.write_i32::<BigEndian>(2).unwrap();

        let unit = parse_pctp_bytes(&data).unwrap();
        assert_eq!(unit.version, 3);
        assert_eq!(unit.priority, 0.0);
        let specs = &unit.deform_specs["grab"];
        assert_eq!(specs.len(), 1);
        assert_eq!(specs[0].deform_id, 0x1122_3344);
        assert_eq!(specs[0].range, [0.5, 1.0]);
        assert_eq!(specs[0].flags, 2);
    }

    #[test]
    fn test_truncated_table_is_an_io_error() {
        let mut data = Vec::new();
        data.extend_from_slice(&PCTP_MAGIC);
        data.write_u32::<BigEndian>(4).unwrap();
        data.write_f32::<BigEndian>(0.0).unwrap();
        data.write_u32::<BigEndian>(2).unwrap(); // promises two names
        assert!(matches!(parse_pctp_bytes(&data), Err(Error::Io(_))));
    }
}
