//! Level serialization and writing

use super::{GameplayMarker, LVL_VERSION, LevelDocument, MARKER_DATA_SIZE, MarkerData};
use crate::error::{Error, Result};
use crate::formats::common::types::{write_vec3_be, write_vec4_be};
use byteorder::{BigEndian, LittleEndian, WriteBytesExt};
use std::fs;
use std::io::Write;
use std::path::Path;

/// Write a level to a .lvl file
///
/// # Errors
///
/// Returns [`Error::Io`] if the file cannot be written; otherwise as
/// [`serialize_lvl`].
///
/// [`Error::Io`]: crate::Error::Io
pub fn write_lvl<P: AsRef<Path>>(document: &LevelDocument, path: P) -> Result<()> {
    let bytes = serialize_lvl(document)?;
    fs::write(path, bytes)?;
    Ok(())
}

/// Serialize a level to LVL bytes
///
/// Always emits version 3 regardless of the version the level was read
/// from.
///
/// # Errors
///
/// Returns [`Error::MarkerDataTooLarge`] if a payload does not fit in the
/// fixed record slot.
///
/// [`Error::MarkerDataTooLarge`]: crate::Error::MarkerDataTooLarge
pub fn serialize_lvl(document: &LevelDocument) -> Result<Vec<u8>> {
    let mut out = Vec::new();

    out.write_u32::<BigEndian>(LVL_VERSION)?;
    out.write_u32::<BigEndian>(document.markers.len() as u32)?;
    out.write_u16::<BigEndian>(MARKER_DATA_SIZE as u16)?;

    for marker in &document.markers {
        write_marker(&mut out, marker)?;
    }

    Ok(out)
}

fn write_marker(out: &mut Vec<u8>, marker: &GameplayMarker) -> Result<()> {
    write_vec3_be(out, marker.offset)?;
    write_vec4_be(out, marker.orientation)?;
    out.write_u32::<BigEndian>(marker.marker_type)?;
    out.write_u32::<BigEndian>(marker.id)?;
    out.write_u32::<BigEndian>(marker.definition_id)?;

    let slot = serialize_marker_data(&marker.data)?;
    if slot.len() > MARKER_DATA_SIZE {
        return Err(Error::MarkerDataTooLarge {
            size: slot.len(),
            slot: MARKER_DATA_SIZE,
        });
    }
    out.extend_from_slice(&slot);
    out.extend(std::iter::repeat_n(0u8, MARKER_DATA_SIZE - slot.len()));
    Ok(())
}

fn serialize_marker_data(data: &MarkerData) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    match data {
        MarkerData::CreatureArchetype(data) => {
            out.write_i32::<LittleEndian>(data.group)?;
            out.write_i32::<LittleEndian>(data.property_count)?;
            out.write_i32::<LittleEndian>(data.nest_type)?;
            out.write_i32::<LittleEndian>(data.override_herd_size)?;
            out.write_i32::<LittleEndian>(data.personality)?;
            out.write_u8(u8::from(data.without_nest))?;
            out.write_all(&[0u8; 3])?;
            out.write_f32::<LittleEndian>(data.scale_multiplier)?;
            out.write_f32::<LittleEndian>(data.hitpoint_override)?;
            out.write_f32::<LittleEndian>(data.damage_multiplier)?;
            out.write_f32::<LittleEndian>(data.territory_radius)?;
            out.write_i32::<LittleEndian>(data.activate_at_brain_level)?;
            out.write_i32::<LittleEndian>(data.deactivate_above_brain_level)?;
        }
        MarkerData::MigrationPoint(data) => {
            out.write_i32::<LittleEndian>(data.group)?;
            out.write_i32::<LittleEndian>(data.property_count)?;
            out.write_i32::<LittleEndian>(data.number)?;
            out.write_f32::<LittleEndian>(data.radius_multiplier)?;
            out.write_i32::<LittleEndian>(data.point_type)?;
            out.write_i32::<LittleEndian>(data.field_128)?;
            out.write_i32::<LittleEndian>(data.field_12c)?;
            out.write_i32::<LittleEndian>(data.field_130)?;
        }
        MarkerData::Unknown(raw) => out.extend_from_slice(raw),
    }
    Ok(out)
}
