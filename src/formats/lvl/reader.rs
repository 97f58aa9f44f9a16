//! Level reading and parsing

use super::{
    CreatureArchetype, GameplayMarker, LevelDocument, MarkerData, MigrationPoint, marker_types,
};
use crate::error::{Error, Result};
use crate::formats::common::types::{read_vec3_be, read_vec4_be};
use byteorder::{BigEndian, LittleEndian, ReadBytesExt};
use std::fs::File;
use std::io::{Cursor, Read};
use std::path::Path;

/// Read a .lvl file from disk
///
/// # Errors
///
/// Returns [`Error::Io`] if the file cannot be opened or read; otherwise
/// as [`parse_lvl_bytes`].
///
/// [`Error::Io`]: crate::Error::Io
pub fn read_lvl<P: AsRef<Path>>(path: P) -> Result<LevelDocument> {
    let mut file = File::open(path)?;
    let mut buffer = Vec::new();
    file.read_to_end(&mut buffer)?;
    parse_lvl_bytes(&buffer)
}

/// Parse LVL data from bytes
///
/// # Errors
///
/// Returns [`Error::UnsupportedLevelVersion`] for versions outside 2..=3
/// and [`Error::Io`] on truncation.
///
/// [`Error::UnsupportedLevelVersion`]: crate::Error::UnsupportedLevelVersion
/// [`Error::Io`]: crate::Error::Io
pub fn parse_lvl_bytes(data: &[u8]) -> Result<LevelDocument> {
    let mut cursor = Cursor::new(data);

    let version = cursor.read_u32::<BigEndian>()?;
    if !(2..=3).contains(&version) {
        return Err(Error::UnsupportedLevelVersion { version });
    }
    let count = cursor.read_u32::<BigEndian>()?;
    let data_size = cursor.read_u16::<BigEndian>()? as usize;

    let mut markers = Vec::with_capacity(count as usize);
    for _ in 0..count {
        markers.push(read_marker(&mut cursor, version, data_size)?);
    }

    Ok(LevelDocument { markers })
}

fn read_marker<R: Read>(reader: &mut R, version: u32, data_size: usize) -> Result<GameplayMarker> {
    let offset = read_vec3_be(reader)?;
    let orientation = read_vec4_be(reader)?;
    let marker_type = reader.read_u32::<BigEndian>()?;
    let id = reader.read_u32::<BigEndian>()?;
    let definition_id = reader.read_u32::<BigEndian>()?;

    // Version 2 carried an extra flag and id list here; nothing uses them.
    if version == 2 {
        reader.read_u8()?;
        let count = reader.read_u32::<BigEndian>()?;
        let mut skipped = vec![0u8; count as usize * 4];
        reader.read_exact(&mut skipped)?;
    }

    let mut slot = vec![0u8; data_size];
    reader.read_exact(&mut slot)?;

    Ok(GameplayMarker {
        offset,
        orientation,
        marker_type,
        id,
        definition_id,
        data: parse_marker_data(marker_type, slot)?,
    })
}

fn parse_marker_data(marker_type: u32, slot: Vec<u8>) -> Result<MarkerData> {
    let mut cursor = Cursor::new(slot.as_slice());
    match marker_type {
        marker_types::CREATURE_ARCHETYPE => {
            let group = cursor.read_i32::<LittleEndian>()?;
            let property_count = cursor.read_i32::<LittleEndian>()?;
            let nest_type = cursor.read_i32::<LittleEndian>()?;
            let override_herd_size = cursor.read_i32::<LittleEndian>()?;
            let personality = cursor.read_i32::<LittleEndian>()?;
            let without_nest = cursor.read_u8()? != 0;
            let mut padding = [0u8; 3];
            cursor.read_exact(&mut padding)?;
            Ok(MarkerData::CreatureArchetype(CreatureArchetype {
                group,
                property_count,
                nest_type,
                override_herd_size,
                personality,
                without_nest,
                scale_multiplier: cursor.read_f32::<LittleEndian>()?,
                hitpoint_override: cursor.read_f32::<LittleEndian>()?,
                damage_multiplier: cursor.read_f32::<LittleEndian>()?,
                territory_radius: cursor.read_f32::<LittleEndian>()?,
                activate_at_brain_level: cursor.read_i32::<LittleEndian>()?,
                deactivate_above_brain_level: cursor.read_i32::<LittleEndian>()?,
            }))
        }
        marker_types::MIGRATION_POINT => Ok(MarkerData::MigrationPoint(MigrationPoint {
            group: cursor.read_i32::<LittleEndian>()?,
            property_count: cursor.read_i32::<LittleEndian>()?,
            number: cursor.read_i32::<LittleEndian>()?,
            radius_multiplier: cursor.read_f32::<LittleEndian>()?,
            point_type: cursor.read_i32::<LittleEndian>()?,
            field_128: cursor.read_i32::<LittleEndian>()?,
            field_12c: cursor.read_i32::<LittleEndian>()?,
            field_130: cursor.read_i32::<LittleEndian>()?,
        })),
        _ => Ok(MarkerData::Unknown(slot)),
    }
}
