//! LVL gameplay-marker format
//!
//! A .lvl file places gameplay markers on a planet: city and tribe
//! positions, migration points, creature nests and so on. Every marker is
//! one fixed-size record, a position and orientation plus three id fields,
//! followed by a 0x88-byte payload slot whose interpretation depends on the
//! marker's type tag. Types without a dedicated codec carry their slot
//! verbatim.
//!
//! The record framing is big-endian; the payload slot contents are
//! little-endian.

mod reader;
mod text;
mod writer;

pub use reader::{parse_lvl_bytes, read_lvl};
pub use text::{level_to_text, parse_lvl_text};
pub use writer::{serialize_lvl, write_lvl};

use glam::{Vec3, Vec4};

/// Version written to every file. Version 2 is still readable.
pub const LVL_VERSION: u32 = 3;

/// Fixed payload slot size; shorter payloads are zero-padded.
pub const MARKER_DATA_SIZE: usize = 0x88;

/// Marker type tags with a dedicated payload codec.
pub mod marker_types {
    /// CreatureArchetype markers (nests and roaming creatures).
    pub const CREATURE_ARCHETYPE: u32 = 0x91FE_517B;
    /// MigrationPoint markers (migration and patrol paths).
    pub const MIGRATION_POINT: u32 = 0xC012_AE1F;
}

/// Nest terrain names for the CreatureArchetype `nestType` field.
pub const NEST_TYPE_NAMES: &[(i32, &str)] = &[(0, "Sandy"), (1, "Grassy"), (2, "Rocky")];

/// Personality names for the CreatureArchetype `personality` field.
pub const PERSONALITY_NAMES: &[(i32, &str)] = &[
    (0, "None"),
    (1, "EpicPredator"),
    (2, "Migrator"),
    (3, "Decorator"),
    (4, "Monkey"),
    (5, "Stalker"),
    (6, "Guard"),
    (7, "Pet"),
    (8, "WaterPredator"),
    (9, "Carcass"),
];

/// Path kind names for the MigrationPoint `type` field.
pub const MIGRATION_TYPE_NAMES: &[(i32, &str)] = &[
    (0, "Normal"),
    (1, "AvatarJourney"),
    (2, "PatrolPath"),
    (3, "AvatarSpeciesJourney"),
    (4, "CreaturePath"),
];

/// Contents of a .lvl file: the ordered marker list.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LevelDocument {
    pub markers: Vec<GameplayMarker>,
}

/// One gameplay marker record.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GameplayMarker {
    pub offset: Vec3,
    /// Orientation quaternion.
    pub orientation: Vec4,
    /// Type tag selecting the payload codec, such as
    /// [`marker_types::CREATURE_ARCHETYPE`].
    pub marker_type: u32,
    pub id: u32,
    pub definition_id: u32,
    pub data: MarkerData,
}

/// The typed payload carried in a marker's fixed slot.
#[derive(Debug, Clone, PartialEq)]
pub enum MarkerData {
    CreatureArchetype(CreatureArchetype),
    MigrationPoint(MigrationPoint),
    /// Raw slot bytes of a type without a codec, written back verbatim.
    Unknown(Vec<u8>),
}

impl Default for MarkerData {
    fn default() -> Self {
        MarkerData::Unknown(Vec::new())
    }
}

impl MarkerData {
    /// The default payload for a marker type tag.
    #[must_use]
    pub fn for_type(marker_type: u32) -> Self {
        match marker_type {
            marker_types::CREATURE_ARCHETYPE => {
                MarkerData::CreatureArchetype(CreatureArchetype::default())
            }
            marker_types::MIGRATION_POINT => {
                MarkerData::MigrationPoint(MigrationPoint::default())
            }
            _ => MarkerData::Unknown(Vec::new()),
        }
    }
}

/// Payload of a CreatureArchetype marker.
///
/// `group` and `property_count` are the header every decoded payload
/// starts with.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CreatureArchetype {
    pub group: i32,
    pub property_count: i32,
    /// Terrain the nest spawns on, see [`NEST_TYPE_NAMES`].
    pub nest_type: i32,
    pub override_herd_size: i32,
    /// See [`PERSONALITY_NAMES`].
    pub personality: i32,
    pub without_nest: bool,
    pub scale_multiplier: f32,
    pub hitpoint_override: f32,
    pub damage_multiplier: f32,
    pub territory_radius: f32,
    pub activate_at_brain_level: i32,
    pub deactivate_above_brain_level: i32,
}

impl Default for CreatureArchetype {
    fn default() -> Self {
        Self {
            group: 0,
            property_count: 0,
            nest_type: 1,
            override_herd_size: 0,
            personality: 0,
            without_nest: false,
            scale_multiplier: 0.0,
            hitpoint_override: 0.0,
            damage_multiplier: 0.0,
            territory_radius: 0.0,
            activate_at_brain_level: 0,
            deactivate_above_brain_level: 5,
        }
    }
}

/// Payload of a MigrationPoint marker.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MigrationPoint {
    pub group: i32,
    pub property_count: i32,
    /// Position of this point within its path.
    pub number: i32,
    pub radius_multiplier: f32,
    /// See [`MIGRATION_TYPE_NAMES`].
    pub point_type: i32,
    pub field_128: i32,
    pub field_12c: i32,
    pub field_130: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_selected_by_type_tag() {
        assert!(matches!(
            MarkerData::for_type(marker_types::CREATURE_ARCHETYPE),
            MarkerData::CreatureArchetype(_)
        ));
        assert!(matches!(
            MarkerData::for_type(marker_types::MIGRATION_POINT),
            MarkerData::MigrationPoint(_)
        ));
        assert!(matches!(
            MarkerData::for_type(0xDEAD_BEEF),
            MarkerData::Unknown(ref raw) if raw.is_empty()
        ));
    }

    #[test]
    fn test_creature_archetype_defaults() {
        let data = CreatureArchetype::default();
        assert_eq!(data.nest_type, 1);
        assert_eq!(data.deactivate_above_brain_level, 5);
        assert_eq!(data.override_herd_size, 0);
        assert!(!data.without_nest);
    }
}
