//! Animation-set reading and parsing

use super::{
    AnimationSetUnit, TLSA_MAGIC, TlsaAnimation, TlsaAnimationChoice, TlsaAnimationGroup,
};
use crate::error::{Error, Result};
use byteorder::{BigEndian, LittleEndian, ReadBytesExt};
use std::fs::File;
use std::io::{Cursor, Read};
use std::path::Path;

/// Read a .tlsa file from disk
///
/// # Errors
///
/// Returns [`Error::Io`] if the file cannot be opened or read; otherwise
/// as [`parse_tlsa_bytes`].
///
/// [`Error::Io`]: crate::Error::Io
pub fn read_tlsa<P: AsRef<Path>>(path: P) -> Result<AnimationSetUnit> {
    let mut file = File::open(path)?;
    let mut buffer = Vec::new();
    file.read_to_end(&mut buffer)?;
    parse_tlsa_bytes(&buffer)
}

/// Parse TLSA data from bytes
///
/// The version field selects the schema: 8 and below read the old
/// single-choice layout, anything newer the weighted-choice layout.
///
/// # Errors
///
/// Returns [`Error::InvalidTlsaMagic`] if the file does not start with
/// "tsla", [`Error::Io`] on truncation, and [`Error::Utf16Error`] for a
/// malformed string.
///
/// [`Error::InvalidTlsaMagic`]: crate::Error::InvalidTlsaMagic
/// [`Error::Io`]: crate::Error::Io
/// [`Error::Utf16Error`]: crate::Error::Utf16Error
pub fn parse_tlsa_bytes(data: &[u8]) -> Result<AnimationSetUnit> {
    let mut cursor = Cursor::new(data);

    let mut magic = [0u8; 4];
    cursor.read_exact(&mut magic)?;
    if magic != TLSA_MAGIC {
        return Err(Error::InvalidTlsaMagic(magic));
    }

    let version = cursor.read_u32::<BigEndian>()?;
    let group_count = cursor.read_u32::<BigEndian>()?;
    let mut groups = Vec::with_capacity(group_count as usize);
    for _ in 0..group_count {
        groups.push(if version <= 8 {
            read_group_old(&mut cursor, version)?
        } else {
            read_group_new(&mut cursor, version)?
        });
    }

    Ok(AnimationSetUnit { version, groups })
}

/// Old schema: one implicit choice, descriptions and ids in two separate
/// runs, one duration pair shared by every animation.
fn read_group_old<R: Read>(reader: &mut R, version: u32) -> Result<TlsaAnimationGroup> {
    let mut group = TlsaAnimationGroup {
        id: reader.read_u32::<BigEndian>()?,
        ..TlsaAnimationGroup::default()
    };
    if version == 8 {
        group.priority_override = reader.read_f32::<BigEndian>()?;
    }

    let anim_count = reader.read_u32::<BigEndian>()?;
    let mut choice = TlsaAnimationChoice::default();
    for _ in 0..anim_count {
        choice.animations.push(TlsaAnimation {
            description: read_utf16_string(reader)?,
            ..TlsaAnimation::default()
        });
    }
    for animation in &mut choice.animations {
        animation.id = reader.read_u32::<BigEndian>()?;
    }

    let duration_scale = reader.read_f32::<BigEndian>()?;
    let duration = reader.read_f32::<BigEndian>()?;
    for animation in &mut choice.animations {
        animation.duration_scale = duration_scale;
        animation.duration = duration;
    }
    group.choices.push(choice);

    group.idle = read_bool(reader)?;
    group.blend_in_time = reader.read_f32::<BigEndian>()?;
    group.allow_locomotion = read_bool(reader)?;
    group.disable_tool_overlay_mask = reader.read_u32::<BigEndian>()?;
    group.match_variant_for_tool_mask = reader.read_u32::<BigEndian>()?;
    group.end_mode = reader.read_i32::<BigEndian>()?;
    Ok(group)
}

/// New schema: named group, explicit weighted choices, per-animation
/// durations. The two bit masks sit in the opposite order to the old
/// schema.
fn read_group_new<R: Read>(reader: &mut R, version: u32) -> Result<TlsaAnimationGroup> {
    let mut group = TlsaAnimationGroup {
        id: reader.read_u32::<BigEndian>()?,
        ..TlsaAnimationGroup::default()
    };
    group.name = read_utf16_string(reader)?;
    group.priority_override = reader.read_f32::<BigEndian>()?;
    group.blend_in_time = reader.read_f32::<BigEndian>()?;
    group.idle = read_bool(reader)?;
    group.allow_locomotion = read_bool(reader)?;
    if version == 10 {
        group.randomize_choice_per_loop = read_bool(reader)?;
    }
    group.match_variant_for_tool_mask = reader.read_u32::<BigEndian>()?;
    group.disable_tool_overlay_mask = reader.read_u32::<BigEndian>()?;
    group.end_mode = reader.read_i32::<BigEndian>()?;

    let choice_count = reader.read_u32::<BigEndian>()?;
    for _ in 0..choice_count {
        let probability_threshold = reader.read_f32::<BigEndian>()?;
        let anim_count = reader.read_u32::<BigEndian>()?;
        let mut animations = Vec::with_capacity(anim_count as usize);
        for _ in 0..anim_count {
            let duration_scale = reader.read_f32::<BigEndian>()?;
            let duration = reader.read_f32::<BigEndian>()?;
            let id = reader.read_u32::<BigEndian>()?;
            let description = read_utf16_string(reader)?;
            animations.push(TlsaAnimation {
                id,
                description,
                duration_scale,
                duration,
            });
        }
        group.choices.push(TlsaAnimationChoice {
            probability_threshold,
            animations,
        });
    }
    Ok(group)
}

/// A big-endian code-unit count followed by UTF-16LE text.
pub(super) fn read_utf16_string<R: Read>(reader: &mut R) -> Result<String> {
    let length = reader.read_u32::<BigEndian>()? as usize;
    let mut units = vec![0u16; length];
    reader.read_u16_into::<LittleEndian>(&mut units)?;
    Ok(String::from_utf16(&units)?)
}

fn read_bool<R: Read>(reader: &mut R) -> Result<bool> {
    Ok(reader.read_u8()? != 0)
}
