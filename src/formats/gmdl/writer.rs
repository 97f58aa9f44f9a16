//! GMDL model serialization and writing

use super::{
    DATA_TEXTURE_SET, GMDL_VERSION, GmdlModel, IndexBuffer, MaterialInfo, VertexBuffer,
    VertexDescriptor,
};
use crate::error::{Error, Result};
use byteorder::{BigEndian, LittleEndian, WriteBytesExt};
use std::fs;
use std::io::Write;
use std::path::Path;

/// Write a model to a .gmdl file
///
/// # Errors
///
/// Returns [`Error::Io`] if the file cannot be written; otherwise as
/// [`serialize_gmdl`].
///
/// [`Error::Io`]: crate::Error::Io
pub fn write_gmdl<P: AsRef<Path>>(model: &GmdlModel, path: P) -> Result<()> {
    let bytes = serialize_gmdl(model)?;
    fs::write(path, bytes)?;
    Ok(())
}

/// Serialize a model to GMDL bytes
///
/// Always emits version 9 regardless of the version the model was read
/// from.
///
/// # Errors
///
/// Returns [`Error::UnsupportedIndexBits`] if an index buffer declares a
/// width other than 16/32, and [`Error::InvalidDescriptorIndex`] or
/// [`Error::InvalidBufferIndex`] if a buffer or mesh references a list
/// entry that does not exist.
///
/// [`Error::UnsupportedIndexBits`]: crate::Error::UnsupportedIndexBits
/// [`Error::InvalidDescriptorIndex`]: crate::Error::InvalidDescriptorIndex
/// [`Error::InvalidBufferIndex`]: crate::Error::InvalidBufferIndex
pub fn serialize_gmdl(model: &GmdlModel) -> Result<Vec<u8>> {
    let mut out = Vec::new();

    out.write_u32::<LittleEndian>(GMDL_VERSION)?;

    out.write_u32::<BigEndian>(model.referenced_files.len() as u32)?;
    for key in &model.referenced_files {
        out.write_u32::<BigEndian>(key.instance_id)?;
        out.write_u32::<BigEndian>(key.group_id)?;
        out.write_u32::<BigEndian>(key.type_id)?;
    }

    out.write_u32::<LittleEndian>(model.meshes.len() as u32)?;
    model.bounding_box.write_le(&mut out)?;
    out.write_f32::<LittleEndian>(model.bounding_radius)?;

    out.write_u32::<LittleEndian>(model.index_buffers.len() as u32)?;
    for buffer in &model.index_buffers {
        write_index_buffer(&mut out, buffer)?;
    }

    out.write_u32::<LittleEndian>(model.vertex_descriptors.len() as u32)?;
    for descriptor in &model.vertex_descriptors {
        write_vertex_descriptor(&mut out, descriptor)?;
    }

    out.write_u32::<LittleEndian>(model.vertex_buffers.len() as u32)?;
    for buffer in &model.vertex_buffers {
        write_vertex_buffer(&mut out, buffer, model.vertex_descriptors.len())?;
    }

    for mesh in &model.meshes {
        write_list_index(&mut out, mesh.vertex_buffer_index, model.vertex_buffers.len(), "vertex")?;
        write_list_index(&mut out, mesh.index_buffer_index, model.index_buffers.len(), "index")?;
    }
    for mesh in &model.meshes {
        out.write_u32::<LittleEndian>(mesh.material_id)?;
    }

    out.write_u32::<LittleEndian>(0)?;

    out.write_u32::<LittleEndian>(model.material_infos.len() as u32)?;
    for info in &model.material_infos {
        write_material_info(&mut out, info)?;
    }

    out.write_u32::<LittleEndian>(model.bone_ranges.len() as u32)?;
    for range in &model.bone_ranges {
        out.write_u32::<LittleEndian>(range.start)?;
        out.write_u32::<LittleEndian>(range.end)?;
    }

    out.write_u32::<LittleEndian>(model.anim_data.len() as u32)?;
    for anim in &model.anim_data {
        anim.transform.write_complete(&mut out)?;
        anim.secondary_transform.write_complete(&mut out)?;
        out.write_i32::<LittleEndian>(anim.unknown)?;
        anim.key.write_le(&mut out)?;
        out.write_u32::<LittleEndian>(anim.baked_deforms.len() as u32)?;
        for deforms in &anim.baked_deforms {
            out.write_u32::<LittleEndian>(deforms.bone_records.len() as u32)?;
            for record in &deforms.bone_records {
                out.write_all(record)?;
            }
        }
    }

    model.trailing_key.write_le(&mut out)?;

    Ok(out)
}

fn write_index_buffer(out: &mut Vec<u8>, buffer: &IndexBuffer) -> Result<()> {
    out.write_u32::<LittleEndian>(buffer.primitive_type)?;
    out.write_u32::<LittleEndian>(buffer.indices.len() as u32)?;
    out.write_u32::<LittleEndian>(buffer.num_bits)?;
    match buffer.num_bits {
        16 => {
            out.write_u32::<LittleEndian>(buffer.indices.len() as u32 * 2)?;
            for &index in &buffer.indices {
                out.write_u16::<LittleEndian>(index as u16)?;
            }
        }
        32 => {
            out.write_u32::<LittleEndian>(buffer.indices.len() as u32 * 4)?;
            for &index in &buffer.indices {
                out.write_u32::<LittleEndian>(index)?;
            }
        }
        bits => return Err(Error::UnsupportedIndexBits { bits }),
    }
    Ok(())
}

fn write_vertex_descriptor(out: &mut Vec<u8>, descriptor: &VertexDescriptor) -> Result<()> {
    out.write_u32::<LittleEndian>(descriptor.elements.len() as u32)?;
    for element in &descriptor.elements {
        out.write_i16::<LittleEndian>(element.stream)?;
        out.write_i16::<LittleEndian>(element.offset)?;
        out.write_u8(element.decl_type)?;
        out.write_u8(element.method)?;
        out.write_u8(element.usage)?;
        out.write_u8(element.usage_index)?;
        out.write_i32::<LittleEndian>(element.type_code)?;
    }
    Ok(())
}

fn write_vertex_buffer(
    out: &mut Vec<u8>,
    buffer: &VertexBuffer,
    descriptor_count: usize,
) -> Result<()> {
    if buffer.descriptor_index >= descriptor_count {
        return Err(Error::InvalidDescriptorIndex(buffer.descriptor_index as i32));
    }
    out.write_i32::<LittleEndian>(buffer.descriptor_index as i32)?;
    out.write_u32::<LittleEndian>(buffer.vertex_count)?;
    out.write_u32::<LittleEndian>(buffer.data.len() as u32)?;
    out.write_all(&buffer.data)?;
    Ok(())
}

fn write_list_index(
    out: &mut Vec<u8>,
    index: usize,
    len: usize,
    kind: &'static str,
) -> Result<()> {
    if index >= len {
        return Err(Error::InvalidBufferIndex {
            kind,
            index: index as i32,
        });
    }
    out.write_i32::<LittleEndian>(index as i32)?;
    Ok(())
}

fn write_material_info(out: &mut Vec<u8>, info: &MaterialInfo) -> Result<()> {
    out.write_u32::<LittleEndian>(1)?;
    let block_count = info.shader_data.len() + usize::from(!info.textures.is_empty());
    out.write_u32::<LittleEndian>(block_count as u32)?;

    if !info.textures.is_empty() {
        out.write_u32::<LittleEndian>(DATA_TEXTURE_SET)?;
        out.write_u32::<LittleEndian>(info.textures.len() as u32)?;
        for entry in &info.textures {
            out.write_u32::<LittleEndian>(entry.sampler_index)?;
            out.write_all(&entry.extra_data)?;
            out.write_u32::<LittleEndian>(entry.instance_id)?;
            out.write_u32::<LittleEndian>(entry.group_id)?;
        }
    }

    for (&data_index, payload) in &info.shader_data {
        out.write_u32::<LittleEndian>(data_index)?;
        out.write_all(payload)?;
    }

    Ok(())
}
