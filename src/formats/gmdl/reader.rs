//! GMDL model reading and parsing
//!
//! The read order is strict and positional; every list is count-prefixed
//! and cross-references are validated as they are read so the resulting
//! model never holds a dangling index.

use super::{
    BAKED_DEFORM_SIZE, BakedDeforms, BoneRange, DATA_TEXTURE_SET, GMDL_VERSION, GmdlAnimData,
    GmdlModel, IndexBuffer, MaterialInfo, Mesh, ShaderDataSizeTable, TextureEntry, VertexBuffer,
    VertexDescriptor, VertexElement,
};
use crate::error::{Error, Result};
use crate::formats::common::{BoundingBox, ResourceKey, Transform};
use byteorder::{BigEndian, LittleEndian, ReadBytesExt};
use indexmap::IndexMap;
use std::fs::File;
use std::io::{Cursor, Read};
use std::path::Path;

/// Read a .gmdl file from disk
///
/// # Errors
///
/// Returns [`Error::Io`] if the file cannot be opened or read; otherwise
/// as [`parse_gmdl_bytes`].
///
/// [`Error::Io`]: crate::Error::Io
pub fn read_gmdl<P: AsRef<Path>>(path: P, sizes: &dyn ShaderDataSizeTable) -> Result<GmdlModel> {
    let mut file = File::open(path)?;
    let mut buffer = Vec::new();
    file.read_to_end(&mut buffer)?;
    parse_gmdl_bytes(&buffer, sizes)
}

/// Parse GMDL data from bytes
///
/// `sizes` resolves the payload length of shader-data blocks the format
/// stores without one.
///
/// # Errors
///
/// Returns [`Error::UnsupportedGmdlVersion`] for versions above 9,
/// [`Error::UnsupportedIndexBits`] for index widths other than 16/32,
/// [`Error::NonZeroReservedField`] if the reserved count is set,
/// [`Error::UnknownShaderData`] when `sizes` cannot resolve a block,
/// [`Error::InvalidDescriptorIndex`] / [`Error::InvalidBufferIndex`] for
/// dangling references, and [`Error::Io`] on truncation.
///
/// [`Error::UnsupportedGmdlVersion`]: crate::Error::UnsupportedGmdlVersion
/// [`Error::UnsupportedIndexBits`]: crate::Error::UnsupportedIndexBits
/// [`Error::NonZeroReservedField`]: crate::Error::NonZeroReservedField
/// [`Error::UnknownShaderData`]: crate::Error::UnknownShaderData
/// [`Error::InvalidDescriptorIndex`]: crate::Error::InvalidDescriptorIndex
/// [`Error::InvalidBufferIndex`]: crate::Error::InvalidBufferIndex
/// [`Error::Io`]: crate::Error::Io
pub fn parse_gmdl_bytes(data: &[u8], sizes: &dyn ShaderDataSizeTable) -> Result<GmdlModel> {
    let mut cursor = Cursor::new(data);

    let version = cursor.read_u32::<LittleEndian>()?;
    if version > GMDL_VERSION {
        return Err(Error::UnsupportedGmdlVersion { version });
    }

    // The referenced-file table is the one big-endian section.
    let count = cursor.read_u32::<BigEndian>()?;
    let mut referenced_files = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let instance_id = cursor.read_u32::<BigEndian>()?;
        let group_id = cursor.read_u32::<BigEndian>()?;
        let type_id = cursor.read_u32::<BigEndian>()?;
        referenced_files.push(ResourceKey {
            group_id,
            instance_id,
            type_id,
        });
    }

    let mesh_count = cursor.read_u32::<LittleEndian>()?;
    let bounding_box = BoundingBox::read_le(&mut cursor)?;
    let bounding_radius = cursor.read_f32::<LittleEndian>()?;

    let count = cursor.read_u32::<LittleEndian>()?;
    let mut index_buffers = Vec::with_capacity(count as usize);
    for _ in 0..count {
        index_buffers.push(read_index_buffer(&mut cursor)?);
    }

    let count = cursor.read_u32::<LittleEndian>()?;
    let mut vertex_descriptors = Vec::with_capacity(count as usize);
    for _ in 0..count {
        vertex_descriptors.push(read_vertex_descriptor(&mut cursor)?);
    }

    let count = cursor.read_u32::<LittleEndian>()?;
    let mut vertex_buffers = Vec::with_capacity(count as usize);
    for _ in 0..count {
        vertex_buffers.push(read_vertex_buffer(&mut cursor, vertex_descriptors.len())?);
    }

    // Meshes arrive in two passes: buffer references first, then one more
    // full pass for the material IDs.
    let mut meshes = Vec::with_capacity(mesh_count as usize);
    for _ in 0..mesh_count {
        let vertex_buffer_index =
            read_list_index(&mut cursor, vertex_buffers.len(), "vertex")?;
        let index_buffer_index = read_list_index(&mut cursor, index_buffers.len(), "index")?;
        meshes.push(Mesh {
            vertex_buffer_index,
            index_buffer_index,
            material_id: 0,
        });
    }
    for mesh in &mut meshes {
        mesh.material_id = cursor.read_u32::<LittleEndian>()?;
    }

    if cursor.read_u32::<LittleEndian>()? != 0 {
        return Err(Error::NonZeroReservedField {
            position: cursor.position(),
        });
    }

    let count = cursor.read_u32::<LittleEndian>()?;
    let mut material_infos = Vec::with_capacity(count as usize);
    for _ in 0..count {
        material_infos.push(read_material_info(&mut cursor, version, sizes)?);
    }

    let count = cursor.read_u32::<LittleEndian>()?;
    let mut bone_ranges = Vec::with_capacity(count as usize);
    for _ in 0..count {
        bone_ranges.push(BoneRange {
            start: cursor.read_u32::<LittleEndian>()?,
            end: cursor.read_u32::<LittleEndian>()?,
        });
    }

    let count = cursor.read_u32::<LittleEndian>()?;
    let mut anim_data = Vec::with_capacity(count as usize);
    for _ in 0..count {
        anim_data.push(read_anim_data(&mut cursor)?);
    }

    let trailing_key = ResourceKey::read_le(&mut cursor)?;

    Ok(GmdlModel {
        referenced_files,
        bounding_box,
        bounding_radius,
        index_buffers,
        vertex_descriptors,
        vertex_buffers,
        meshes,
        material_infos,
        bone_ranges,
        anim_data,
        trailing_key,
    })
}

fn read_index_buffer<R: Read>(reader: &mut R) -> Result<IndexBuffer> {
    let primitive_type = reader.read_u32::<LittleEndian>()?;
    let count = reader.read_u32::<LittleEndian>()?;
    let num_bits = reader.read_u32::<LittleEndian>()?;
    reader.read_u32::<LittleEndian>()?; // buffer byte size, re-derived on write

    let mut indices = Vec::with_capacity(count as usize);
    match num_bits {
        16 => {
            for _ in 0..count {
                indices.push(u32::from(reader.read_u16::<LittleEndian>()?));
            }
        }
        32 => {
            for _ in 0..count {
                indices.push(reader.read_u32::<LittleEndian>()?);
            }
        }
        bits => return Err(Error::UnsupportedIndexBits { bits }),
    }

    Ok(IndexBuffer {
        primitive_type,
        num_bits,
        indices,
    })
}

fn read_vertex_descriptor<R: Read>(reader: &mut R) -> Result<VertexDescriptor> {
    let count = reader.read_u32::<LittleEndian>()?;
    let mut elements = Vec::with_capacity(count as usize);
    for _ in 0..count {
        elements.push(VertexElement {
            stream: reader.read_i16::<LittleEndian>()?,
            offset: reader.read_i16::<LittleEndian>()?,
            decl_type: reader.read_u8()?,
            method: reader.read_u8()?,
            usage: reader.read_u8()?,
            usage_index: reader.read_u8()?,
            type_code: reader.read_i32::<LittleEndian>()?,
        });
    }
    Ok(VertexDescriptor { elements })
}

fn read_vertex_buffer<R: Read>(reader: &mut R, descriptor_count: usize) -> Result<VertexBuffer> {
    let raw_index = reader.read_i32::<LittleEndian>()?;
    let descriptor_index = usize::try_from(raw_index)
        .ok()
        .filter(|&i| i < descriptor_count)
        .ok_or(Error::InvalidDescriptorIndex(raw_index))?;

    let vertex_count = reader.read_u32::<LittleEndian>()?;
    let buffer_size = reader.read_u32::<LittleEndian>()?;
    let mut data = vec![0u8; buffer_size as usize];
    reader.read_exact(&mut data)?;

    Ok(VertexBuffer {
        descriptor_index,
        vertex_count,
        data,
    })
}

fn read_list_index<R: Read>(reader: &mut R, len: usize, kind: &'static str) -> Result<usize> {
    let raw = reader.read_i32::<LittleEndian>()?;
    usize::try_from(raw)
        .ok()
        .filter(|&i| i < len)
        .ok_or(Error::InvalidBufferIndex { kind, index: raw })
}

fn read_material_info<R: Read>(
    reader: &mut R,
    version: u32,
    sizes: &dyn ShaderDataSizeTable,
) -> Result<MaterialInfo> {
    // Version 9 prefixes each info with a big-endian marker; zero means the
    // info body is absent entirely.
    if version == GMDL_VERSION && reader.read_u32::<BigEndian>()? == 0 {
        return Ok(MaterialInfo::default());
    }

    let mut textures = Vec::new();
    let mut shader_data = IndexMap::new();

    let count = reader.read_u32::<LittleEndian>()?;
    for _ in 0..count {
        let data_index = reader.read_u32::<LittleEndian>()?;
        if data_index == DATA_TEXTURE_SET {
            let texture_count = reader.read_u32::<LittleEndian>()?;
            for _ in 0..texture_count {
                textures.push(read_texture_entry(reader)?);
            }
        } else {
            let size = sizes
                .size_of(data_index)
                .ok_or(Error::UnknownShaderData { data_index })?;
            let mut payload = vec![0u8; size];
            reader.read_exact(&mut payload)?;
            shader_data.insert(data_index, payload);
        }
    }

    Ok(MaterialInfo {
        textures,
        shader_data,
    })
}

fn read_texture_entry<R: Read>(reader: &mut R) -> Result<TextureEntry> {
    let sampler_index = reader.read_u32::<LittleEndian>()?;
    let mut extra_data = [0u8; 12];
    reader.read_exact(&mut extra_data)?;
    Ok(TextureEntry {
        sampler_index,
        extra_data,
        instance_id: reader.read_u32::<LittleEndian>()?,
        group_id: reader.read_u32::<LittleEndian>()?,
    })
}

fn read_anim_data<R: Read>(reader: &mut R) -> Result<GmdlAnimData> {
    let transform = Transform::read_complete(reader)?;
    let secondary_transform = Transform::read_complete(reader)?;
    let unknown = reader.read_i32::<LittleEndian>()?;
    let key = ResourceKey::read_le(reader)?;

    let count = reader.read_u32::<LittleEndian>()?;
    let mut baked_deforms = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let bone_count = reader.read_u32::<LittleEndian>()?;
        let mut bone_records = Vec::with_capacity(bone_count as usize);
        for _ in 0..bone_count {
            let mut record = [0u8; BAKED_DEFORM_SIZE];
            reader.read_exact(&mut record)?;
            bone_records.push(record);
        }
        baked_deforms.push(BakedDeforms { bone_records });
    }

    Ok(GmdlAnimData {
        transform,
        secondary_transform,
        unknown,
        key,
        baked_deforms,
    })
}
