//! Capability serialization and writing

use super::{CapabilityUnit, DeformSpec, PCTP_MAGIC, pack_identifier};
use crate::error::Result;
use byteorder::{BigEndian, WriteBytesExt};
use std::fs;
use std::path::Path;

/// Write capabilities to a .pctp file
///
/// # Errors
///
/// Returns [`Error::Io`] if the file cannot be written; otherwise as
/// [`serialize_pctp`].
///
/// [`Error::Io`]: crate::Error::Io
pub fn write_pctp<P: AsRef<Path>>(unit: &CapabilityUnit, path: P) -> Result<()> {
    let bytes = serialize_pctp(unit)?;
    fs::write(path, bytes)?;
    Ok(())
}

/// Serialize capabilities to PCTP bytes
///
/// Capability names go out in alphabetical order whatever their order in
/// the unit; mapping indices are written as stored, so they keep carrying
/// the source compile order.
///
/// # Errors
///
/// Returns [`Error::IdentifierTooLong`] for a tag over four characters.
///
/// [`Error::IdentifierTooLong`]: crate::Error::IdentifierTooLong
pub fn serialize_pctp(unit: &CapabilityUnit) -> Result<Vec<u8>> {
    let mut out = Vec::new();

    out.extend_from_slice(&PCTP_MAGIC);
    out.write_u32::<BigEndian>(unit.version)?;
    if unit.version > 3 {
        out.write_f32::<BigEndian>(unit.priority)?;
    }

    let names = unit.sorted_names();
    out.write_u32::<BigEndian>(names.len() as u32)?;
    for name in names {
        out.write_u32::<BigEndian>(name.name.len() as u32)?;
        out.extend_from_slice(name.name.as_bytes());
        out.extend_from_slice(&pack_identifier(&name.identifier)?);
    }

    out.write_u32::<BigEndian>(unit.capabilities_map.len() as u32)?;
    for (key, mapping) in &unit.capabilities_map {
        out.write_u32::<BigEndian>(*key)?;
        out.extend_from_slice(&pack_identifier(&mapping.identifier)?);
        out.write_i32::<BigEndian>(mapping.index)?;
    }

    out.write_u32::<BigEndian>(unit.aggregates.len() as u32)?;
    for (key, values) in &unit.aggregates {
        out.extend_from_slice(&pack_identifier(key)?);
        out.write_u32::<BigEndian>(values.len() as u32)?;
        for value in values {
            out.extend_from_slice(&pack_identifier(value)?);
        }
    }

    out.write_u32::<BigEndian>(unit.deform_specs.len() as u32)?;
    for (key, specs) in &unit.deform_specs {
        out.extend_from_slice(&pack_identifier(key)?);
        out.write_u32::<BigEndian>(specs.len() as u32)?;
        for spec in specs {
            write_deform_spec(&mut out, spec, unit.version)?;
        }
    }

    Ok(out)
}

fn write_deform_spec(out: &mut Vec<u8>, spec: &DeformSpec, version: u32) -> Result<()> {
    out.write_u32::<BigEndian>(spec.deform_id)?;
    out.write_f32::<BigEndian>(spec.range[0])?;
    if version > 3 {
        out.write_f32::<BigEndian>(spec.range[1])?;
    }
    out.write_i32::<BigEndian>(spec.flags)?;
    Ok(())
}
