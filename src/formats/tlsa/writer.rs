//! Animation-set serialization and writing

use super::{AnimationSetUnit, TLSA_MAGIC, TlsaAnimationGroup};
use crate::error::Result;
use byteorder::{BigEndian, LittleEndian, WriteBytesExt};
use std::fs;
use std::path::Path;

/// Write an animation set to a .tlsa file
///
/// # Errors
///
/// Returns [`Error::Io`] if the file cannot be written.
///
/// [`Error::Io`]: crate::Error::Io
pub fn write_tlsa<P: AsRef<Path>>(unit: &AnimationSetUnit, path: P) -> Result<()> {
    let bytes = serialize_tlsa(unit)?;
    fs::write(path, bytes)?;
    Ok(())
}

/// Serialize an animation set to TLSA bytes
///
/// The unit's version selects the schema, mirroring the reader: 8 and
/// below write the old single-choice layout (ignoring every choice past
/// the first), newer versions the weighted-choice layout.
pub fn serialize_tlsa(unit: &AnimationSetUnit) -> Result<Vec<u8>> {
    let mut out = Vec::new();

    out.extend_from_slice(&TLSA_MAGIC);
    out.write_u32::<BigEndian>(unit.version)?;
    out.write_u32::<BigEndian>(unit.groups.len() as u32)?;
    for group in &unit.groups {
        if unit.version <= 8 {
            write_group_old(&mut out, group, unit.version)?;
        } else {
            write_group_new(&mut out, group, unit.version)?;
        }
    }

    Ok(out)
}

fn write_group_old(out: &mut Vec<u8>, group: &TlsaAnimationGroup, version: u32) -> Result<()> {
    out.write_u32::<BigEndian>(group.id)?;
    if version == 8 {
        out.write_f32::<BigEndian>(group.priority_override)?;
    }

    // The shared pair comes from the first animation; empty groups fall
    // back to the schema defaults.
    let mut duration_scale = 1.0f32;
    let mut duration = -1.0f32;
    match group.choices.first() {
        None => out.write_u32::<BigEndian>(0)?,
        Some(choice) => {
            out.write_u32::<BigEndian>(choice.animations.len() as u32)?;
            for animation in &choice.animations {
                write_utf16_string(out, &animation.description)?;
            }
            for animation in &choice.animations {
                out.write_u32::<BigEndian>(animation.id)?;
            }
            if let Some(first) = choice.animations.first() {
                duration_scale = first.duration_scale;
                duration = first.duration;
            }
        }
    }
    out.write_f32::<BigEndian>(duration_scale)?;
    out.write_f32::<BigEndian>(duration)?;

    out.write_u8(u8::from(group.idle))?;
    out.write_f32::<BigEndian>(group.blend_in_time)?;
    out.write_u8(u8::from(group.allow_locomotion))?;
    out.write_u32::<BigEndian>(group.disable_tool_overlay_mask)?;
    out.write_u32::<BigEndian>(group.match_variant_for_tool_mask)?;
    out.write_i32::<BigEndian>(group.end_mode)?;
    Ok(())
}

fn write_group_new(out: &mut Vec<u8>, group: &TlsaAnimationGroup, version: u32) -> Result<()> {
    out.write_u32::<BigEndian>(group.id)?;
    write_utf16_string(out, &group.name)?;
    out.write_f32::<BigEndian>(group.priority_override)?;
    out.write_f32::<BigEndian>(group.blend_in_time)?;
    out.write_u8(u8::from(group.idle))?;
    out.write_u8(u8::from(group.allow_locomotion))?;
    if version == 10 {
        out.write_u8(u8::from(group.randomize_choice_per_loop))?;
    }
    out.write_u32::<BigEndian>(group.match_variant_for_tool_mask)?;
    out.write_u32::<BigEndian>(group.disable_tool_overlay_mask)?;
    out.write_i32::<BigEndian>(group.end_mode)?;

    out.write_u32::<BigEndian>(group.choices.len() as u32)?;
    for choice in &group.choices {
        out.write_f32::<BigEndian>(choice.probability_threshold)?;
        out.write_u32::<BigEndian>(choice.animations.len() as u32)?;
        for animation in &choice.animations {
            out.write_f32::<BigEndian>(animation.duration_scale)?;
            out.write_f32::<BigEndian>(animation.duration)?;
            out.write_u32::<BigEndian>(animation.id)?;
            write_utf16_string(out, &animation.description)?;
        }
    }
    Ok(())
}

fn write_utf16_string(out: &mut Vec<u8>, text: &str) -> Result<()> {
    let units: Vec<u16> = text.encode_utf16().collect();
    out.write_u32::<BigEndian>(units.len() as u32)?;
    for unit in units {
        out.write_u16::<LittleEndian>(unit)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::super::{TlsaAnimation, TlsaAnimationChoice, parse_tlsa_bytes};
    use super::*;
    use pretty_assertions::assert_eq;

    fn new_schema_unit(version: u32) -> AnimationSetUnit {
        AnimationSetUnit {
            version,
            groups: vec![TlsaAnimationGroup {
                id: 0xCAFE_0001,
                name: "Graze".to_string(),
                priority_override: 1.5,
                blend_in_time: 0.25,
                idle: true,
                allow_locomotion: false,
                randomize_choice_per_loop: version == 10,
                match_variant_for_tool_mask: 0x3,
                disable_tool_overlay_mask: 0x20,
                end_mode: 2,
                choices: vec![
                    TlsaAnimationChoice {
                        probability_threshold: 0.75,
                        animations: vec![TlsaAnimation {
                            id: 0xBEEF_0001,
                            description: "graze/eat".to_string(),
                            duration_scale: 2.0,
                            duration: 4.0,
                        }],
                    },
                    TlsaAnimationChoice {
                        probability_threshold: 1.0,
                        animations: vec![TlsaAnimation {
                            id: 0xBEEF_0002,
                            description: "graze/sniff".to_string(),
                            ..TlsaAnimation::default()
                        }],
                    },
                ],
            }],
        }
    }

    fn old_schema_unit(version: u32) -> AnimationSetUnit {
        AnimationSetUnit {
            version,
            groups: vec![TlsaAnimationGroup {
                id: 0x1234_5678,
                priority_override: if version == 8 { 2.0 } else { 0.0 },
                idle: true,
                blend_in_time: 0.5,
                disable_tool_overlay_mask: 1,
                end_mode: 0,
                choices: vec![TlsaAnimationChoice {
                    probability_threshold: 1.0,
                    animations: vec![
                        TlsaAnimation {
                            id: 0xAAAA_0001,
                            description: "walk/walk_01".to_string(),
                            duration_scale: 1.5,
                            duration: 3.0,
                        },
                        TlsaAnimation {
                            id: 0xAAAA_0002,
                            description: "walk/walk_02".to_string(),
                            // The old schema shares one pair, so every
                            // animation must carry the same values.
                            duration_scale: 1.5,
                            duration: 3.0,
                        },
                    ],
                }],
                ..TlsaAnimationGroup::default()
            }],
        }
    }

    #[test]
    fn test_new_schema_round_trip() {
        for version in [9, 10] {
            let unit = new_schema_unit(version);
            let bytes = serialize_tlsa(&unit).unwrap();
            assert_eq!(parse_tlsa_bytes(&bytes).unwrap(), unit, "version {version}");
        }
    }

    #[test]
    fn test_old_schema_round_trip() {
        for version in [7, 8] {
            let unit = old_schema_unit(version);
            let bytes = serialize_tlsa(&unit).unwrap();
            assert_eq!(parse_tlsa_bytes(&bytes).unwrap(), unit, "version {version}");
        }
    }

    #[test]
    fn test_round_trip_is_byte_stable() {
        for unit in [old_schema_unit(8), new_schema_unit(10)] {
            let bytes = serialize_tlsa(&unit).unwrap();
            let reread = parse_tlsa_bytes(&bytes).unwrap();
            assert_eq!(serialize_tlsa(&reread).unwrap(), bytes);
        }
    }

    #[test]
    fn test_version_10_adds_one_byte_over_9() {
        let v10 = serialize_tlsa(&new_schema_unit(10)).unwrap();
        let mut unit = new_schema_unit(9);
        unit.groups[0].randomize_choice_per_loop = false;
        let v9 = serialize_tlsa(&unit).unwrap();
        assert_eq!(v10.len() - v9.len(), 1);
    }

    #[test]
    fn test_empty_old_group_writes_default_pair() {
        let unit = AnimationSetUnit {
            version: 7,
            groups: vec![TlsaAnimationGroup {
                choices: Vec::new(),
                end_mode: 0,
                ..TlsaAnimationGroup::default()
            }],
        };
        let bytes = serialize_tlsa(&unit).unwrap();
        let reread = parse_tlsa_bytes(&bytes).unwrap();
        // The reader materializes the implicit empty choice.
        assert_eq!(reread.groups[0].choices.len(), 1);
        assert!(reread.groups[0].choices[0].animations.is_empty());
    }

    #[test]
    fn test_non_ascii_description_survives() {
        let mut unit = new_schema_unit(10);
        unit.groups[0].choices[0].animations[0].description = "tanz/für_zwei".to_string();
        let bytes = serialize_tlsa(&unit).unwrap();
        assert_eq!(parse_tlsa_bytes(&bytes).unwrap(), unit);
    }
}
