//! Shared binary primitives: resource keys, transforms, bounding volumes

use crate::error::Result;
use byteorder::{BigEndian, LittleEndian, ReadBytesExt, WriteBytesExt};
use glam::{Mat3, Vec3, Vec4};
use std::fmt;
use std::io::{Read, Write};

/// Identifies a game asset by its (group, instance, type) triple.
///
/// Keys are plain values; formats reference each other through keys, never
/// through in-memory pointers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ResourceKey {
    pub group_id: u32,
    pub instance_id: u32,
    pub type_id: u32,
}

impl ResourceKey {
    #[must_use]
    pub const fn new(group_id: u32, instance_id: u32, type_id: u32) -> Self {
        Self {
            group_id,
            instance_id,
            type_id,
        }
    }

    /// Read a key in the common wire order: instance, type, group (little-endian).
    pub fn read_le<R: Read>(reader: &mut R) -> Result<Self> {
        let instance_id = reader.read_u32::<LittleEndian>()?;
        let type_id = reader.read_u32::<LittleEndian>()?;
        let group_id = reader.read_u32::<LittleEndian>()?;
        Ok(Self {
            group_id,
            instance_id,
            type_id,
        })
    }

    /// Write a key in the common wire order: instance, type, group (little-endian).
    pub fn write_le<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_u32::<LittleEndian>(self.instance_id)?;
        writer.write_u32::<LittleEndian>(self.type_id)?;
        writer.write_u32::<LittleEndian>(self.group_id)?;
        Ok(())
    }

}

impl fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "0x{:08X}!0x{:08X}.0x{:08X}",
            self.group_id, self.instance_id, self.type_id
        )
    }
}

/// A bone transform: flags, offset, uniform scale and a 3x3 rotation matrix.
///
/// The matrix round-trips in file order; no basis conversion is applied.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub flags: u16,
    pub transform_count: i16,
    pub offset: Vec3,
    pub scale: f32,
    pub rotation: Mat3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            flags: 0,
            transform_count: 0,
            offset: Vec3::ZERO,
            scale: 1.0,
            rotation: Mat3::IDENTITY,
        }
    }
}

impl Transform {
    /// Read the full serialized form: flags, count, offset, scale, 3x3 matrix
    /// (all little-endian).
    pub fn read_complete<R: Read>(reader: &mut R) -> Result<Self> {
        let flags = reader.read_u16::<LittleEndian>()?;
        let transform_count = reader.read_i16::<LittleEndian>()?;
        let offset = read_vec3_le(reader)?;
        let scale = reader.read_f32::<LittleEndian>()?;
        let mut matrix = [0.0f32; 9];
        for value in &mut matrix {
            *value = reader.read_f32::<LittleEndian>()?;
        }
        Ok(Self {
            flags,
            transform_count,
            offset,
            scale,
            rotation: Mat3::from_cols_array(&matrix),
        })
    }

    /// Write the full serialized form read by [`Transform::read_complete`].
    pub fn write_complete<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_u16::<LittleEndian>(self.flags)?;
        writer.write_i16::<LittleEndian>(self.transform_count)?;
        write_vec3_le(writer, self.offset)?;
        writer.write_f32::<LittleEndian>(self.scale)?;
        for value in self.rotation.to_cols_array() {
            writer.write_f32::<LittleEndian>(value)?;
        }
        Ok(())
    }
}

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BoundingBox {
    pub min: Vec3,
    pub max: Vec3,
}

impl BoundingBox {
    pub fn read_le<R: Read>(reader: &mut R) -> Result<Self> {
        Ok(Self {
            min: read_vec3_le(reader)?,
            max: read_vec3_le(reader)?,
        })
    }

    pub fn write_le<W: Write>(&self, writer: &mut W) -> Result<()> {
        write_vec3_le(writer, self.min)?;
        write_vec3_le(writer, self.max)?;
        Ok(())
    }
}

pub(crate) fn read_vec3_le<R: Read>(reader: &mut R) -> Result<Vec3> {
    let x = reader.read_f32::<LittleEndian>()?;
    let y = reader.read_f32::<LittleEndian>()?;
    let z = reader.read_f32::<LittleEndian>()?;
    Ok(Vec3::new(x, y, z))
}

pub(crate) fn write_vec3_le<W: Write>(writer: &mut W, v: Vec3) -> Result<()> {
    writer.write_f32::<LittleEndian>(v.x)?;
    writer.write_f32::<LittleEndian>(v.y)?;
    writer.write_f32::<LittleEndian>(v.z)?;
    Ok(())
}

pub(crate) fn read_vec3_be<R: Read>(reader: &mut R) -> Result<Vec3> {
    let x = reader.read_f32::<BigEndian>()?;
    let y = reader.read_f32::<BigEndian>()?;
    let z = reader.read_f32::<BigEndian>()?;
    Ok(Vec3::new(x, y, z))
}

pub(crate) fn write_vec3_be<W: Write>(writer: &mut W, v: Vec3) -> Result<()> {
    writer.write_f32::<BigEndian>(v.x)?;
    writer.write_f32::<BigEndian>(v.y)?;
    writer.write_f32::<BigEndian>(v.z)?;
    Ok(())
}

pub(crate) fn read_vec4_be<R: Read>(reader: &mut R) -> Result<Vec4> {
    let x = reader.read_f32::<BigEndian>()?;
    let y = reader.read_f32::<BigEndian>()?;
    let z = reader.read_f32::<BigEndian>()?;
    let w = reader.read_f32::<BigEndian>()?;
    Ok(Vec4::new(x, y, z, w))
}

pub(crate) fn write_vec4_be<W: Write>(writer: &mut W, v: Vec4) -> Result<()> {
    writer.write_f32::<BigEndian>(v.x)?;
    writer.write_f32::<BigEndian>(v.y)?;
    writer.write_f32::<BigEndian>(v.z)?;
    writer.write_f32::<BigEndian>(v.w)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Cursor;

    #[test]
    fn resource_key_le_round_trip() {
        let key = ResourceKey::new(0x40626200, 0x12345678, 0x2F4E681C);
        let mut bytes = Vec::new();
        key.write_le(&mut bytes).unwrap();
        assert_eq!(bytes.len(), 12);

        let read = ResourceKey::read_le(&mut Cursor::new(&bytes)).unwrap();
        assert_eq!(read, key);
    }

    #[test]
    fn resource_key_wire_order_is_instance_type_group() {
        let key = ResourceKey::new(3, 1, 2);
        let mut bytes = Vec::new();
        key.write_le(&mut bytes).unwrap();
        assert_eq!(
            bytes,
            [1, 0, 0, 0, 2, 0, 0, 0, 3, 0, 0, 0],
            "expected instance, type, group order"
        );
    }

    #[test]
    fn transform_round_trip() {
        let transform = Transform {
            flags: 0x0101,
            transform_count: 2,
            offset: Vec3::new(1.0, -2.5, 3.0),
            scale: 0.5,
            rotation: Mat3::from_cols_array(&[1.0, 0.0, 0.0, 0.0, 0.0, -1.0, 0.0, 1.0, 0.0]),
        };
        let mut bytes = Vec::new();
        transform.write_complete(&mut bytes).unwrap();
        // flags + count + offset + scale + 9 matrix floats
        assert_eq!(bytes.len(), 2 + 2 + 12 + 4 + 36);

        let read = Transform::read_complete(&mut Cursor::new(&bytes)).unwrap();
        assert_eq!(read, transform);
    }

    #[test]
    fn display_formats_as_group_instance_type() {
        let key = ResourceKey::new(0xA, 0xB, 0xC);
        assert_eq!(key.to_string(), "0x0000000A!0x0000000B.0x0000000C");
    }
}
