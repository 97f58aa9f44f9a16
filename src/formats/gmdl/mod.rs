//! .gmdl model container
//!
//! Game model files: referenced resources, index/vertex buffers with
//! D3D-style vertex declarations, a mesh table, material blocks and baked
//! per-bone animation state. The format has no magic number; a leading
//! little-endian version (at most 9) gates the layout.
//!
//! Cross-references between containers are positional. A vertex buffer
//! names its descriptor by list index and a mesh names its buffers the
//! same way, so the removal operations here renumber references instead of
//! leaving them to drift.

mod reader;
mod writer;

pub use reader::{parse_gmdl_bytes, read_gmdl};
pub use writer::{serialize_gmdl, write_gmdl};

use crate::error::{Error, Result};
use crate::formats::common::{BoundingBox, ResourceKey, Transform};
use indexmap::IndexMap;

/// Highest understood format version; also the version every write emits
pub const GMDL_VERSION: u32 = 9;

/// Shader-data index marking an embedded texture-entry array
pub const DATA_TEXTURE_SET: u32 = 0x20D;

/// Byte size of one baked-deform bone record
pub const BAKED_DEFORM_SIZE: usize = 0xA0;

/// Resolves the payload size of a shader-data block by its index.
///
/// Block payloads carry no length on disk; the reader cannot step over a
/// block without knowing its size, so an unknown index aborts the read.
pub trait ShaderDataSizeTable {
    /// Byte size of the block's payload, or `None` if the index is unknown.
    fn size_of(&self, data_index: u32) -> Option<usize>;
}

/// A [`ShaderDataSizeTable`] backed by a plain map.
#[derive(Debug, Clone, Default)]
pub struct ShaderDataSizes {
    sizes: IndexMap<u32, usize>,
}

impl ShaderDataSizes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, data_index: u32, size: usize) {
        self.sizes.insert(data_index, size);
    }
}

impl ShaderDataSizeTable for ShaderDataSizes {
    fn size_of(&self, data_index: u32) -> Option<usize> {
        self.sizes.get(&data_index).copied()
    }
}

/// An index buffer: primitive type code plus the raw indices
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexBuffer {
    /// D3D primitive type code
    pub primitive_type: u32,
    /// Bit width on disk, 16 or 32
    pub num_bits: u32,
    pub indices: Vec<u32>,
}

/// One vertex-attribute element of a descriptor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexElement {
    pub stream: i16,
    /// Byte offset of the element inside one vertex
    pub offset: i16,
    /// D3D declaration type code
    pub decl_type: u8,
    pub method: u8,
    pub usage: u8,
    pub usage_index: u8,
    /// RW usage code, resolvable through [`vertex_usage_name`]
    pub type_code: i32,
}

/// An ordered list of vertex-attribute elements
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VertexDescriptor {
    pub elements: Vec<VertexElement>,
}

/// A vertex buffer: raw data plus its descriptor by position
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VertexBuffer {
    /// Position of this buffer's descriptor in the descriptor list
    pub descriptor_index: usize,
    pub vertex_count: u32,
    pub data: Vec<u8>,
}

/// A drawable mesh referencing one vertex and one index buffer by position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mesh {
    pub vertex_buffer_index: usize,
    pub index_buffer_index: usize,
    pub material_id: u32,
}

/// One texture reference inside a material
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureEntry {
    pub sampler_index: u32,
    /// Sampler state bytes, preserved verbatim
    pub extra_data: [u8; 12],
    pub instance_id: u32,
    pub group_id: u32,
}

/// A material: texture entries plus opaque shader-data blocks
///
/// The shader-data map keeps insertion order so writes are deterministic.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MaterialInfo {
    pub textures: Vec<TextureEntry>,
    pub shader_data: IndexMap<u32, Vec<u8>>,
}

/// A pair of bone indices delimiting a skinning range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BoneRange {
    pub start: u32,
    pub end: u32,
}

/// Baked deform state: one fixed-size record per bone
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BakedDeforms {
    pub bone_records: Vec<[u8; BAKED_DEFORM_SIZE]>,
}

/// Per-bone animation data
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GmdlAnimData {
    pub transform: Transform,
    /// Second transform block; purpose unknown
    pub secondary_transform: Transform,
    /// Purpose unknown; preserved verbatim
    pub unknown: i32,
    pub key: ResourceKey,
    pub baked_deforms: Vec<BakedDeforms>,
}

/// A parsed GMDL model
#[derive(Debug, Clone, PartialEq)]
pub struct GmdlModel {
    pub referenced_files: Vec<ResourceKey>,
    pub bounding_box: BoundingBox,
    pub bounding_radius: f32,
    pub index_buffers: Vec<IndexBuffer>,
    pub vertex_descriptors: Vec<VertexDescriptor>,
    pub vertex_buffers: Vec<VertexBuffer>,
    pub meshes: Vec<Mesh>,
    pub material_infos: Vec<MaterialInfo>,
    pub bone_ranges: Vec<BoneRange>,
    pub anim_data: Vec<GmdlAnimData>,
    /// Trailing key; (group 0, instance 0, type 0xFFFFFFFF) when unused
    pub trailing_key: ResourceKey,
}

impl Default for GmdlModel {
    fn default() -> Self {
        Self {
            referenced_files: Vec::new(),
            bounding_box: BoundingBox::default(),
            bounding_radius: 0.0,
            index_buffers: Vec::new(),
            vertex_descriptors: Vec::new(),
            vertex_buffers: Vec::new(),
            meshes: Vec::new(),
            material_infos: Vec::new(),
            bone_ranges: Vec::new(),
            anim_data: Vec::new(),
            trailing_key: ResourceKey::new(0, 0, 0xFFFF_FFFF),
        }
    }
}

impl GmdlModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove the vertex buffer at `index`, renumbering every mesh
    /// reference above it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StillReferenced`] while any mesh still uses the
    /// buffer, and [`Error::InvalidBufferIndex`] if `index` is out of
    /// range.
    pub fn remove_vertex_buffer(&mut self, index: usize) -> Result<()> {
        if index >= self.vertex_buffers.len() {
            return Err(Error::InvalidBufferIndex {
                kind: "vertex",
                index: index as i32,
            });
        }
        if self.meshes.iter().any(|m| m.vertex_buffer_index == index) {
            return Err(Error::StillReferenced {
                kind: "vertex buffer",
                index,
            });
        }
        self.vertex_buffers.remove(index);
        for mesh in &mut self.meshes {
            if mesh.vertex_buffer_index > index {
                mesh.vertex_buffer_index -= 1;
            }
        }
        Ok(())
    }

    /// Remove the index buffer at `index`, renumbering every mesh
    /// reference above it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StillReferenced`] while any mesh still uses the
    /// buffer, and [`Error::InvalidBufferIndex`] if `index` is out of
    /// range.
    pub fn remove_index_buffer(&mut self, index: usize) -> Result<()> {
        if index >= self.index_buffers.len() {
            return Err(Error::InvalidBufferIndex {
                kind: "index",
                index: index as i32,
            });
        }
        if self.meshes.iter().any(|m| m.index_buffer_index == index) {
            return Err(Error::StillReferenced {
                kind: "index buffer",
                index,
            });
        }
        self.index_buffers.remove(index);
        for mesh in &mut self.meshes {
            if mesh.index_buffer_index > index {
                mesh.index_buffer_index -= 1;
            }
        }
        Ok(())
    }

    /// Remove the vertex descriptor at `index`, renumbering every vertex
    /// buffer reference above it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StillReferenced`] while any vertex buffer still
    /// uses the descriptor, and [`Error::InvalidDescriptorIndex`] if
    /// `index` is out of range.
    pub fn remove_vertex_descriptor(&mut self, index: usize) -> Result<()> {
        if index >= self.vertex_descriptors.len() {
            return Err(Error::InvalidDescriptorIndex(index as i32));
        }
        if self
            .vertex_buffers
            .iter()
            .any(|b| b.descriptor_index == index)
        {
            return Err(Error::StillReferenced {
                kind: "vertex descriptor",
                index,
            });
        }
        self.vertex_descriptors.remove(index);
        for buffer in &mut self.vertex_buffers {
            if buffer.descriptor_index > index {
                buffer.descriptor_index -= 1;
            }
        }
        Ok(())
    }
}

/// Name of an RW vertex-usage code, as the game's tools spell them.
pub fn vertex_usage_name(type_code: i32) -> Option<&'static str> {
    Some(match type_code {
        0 => "position",
        2 => "normal",
        3 => "color",
        5 => "color1",
        6 => "texcoord0",
        7 => "texcoord1",
        8 => "texcoord2",
        9 => "texcoord3",
        10 => "texcoord4",
        11 => "texcoord5",
        12 => "texcoord6",
        13 => "texcoord7",
        14 => "blendIndices",
        15 => "blendWeights",
        16 => "pointSize",
        17 => "position2",
        18 => "normal2",
        19 => "tangent",
        20 => "binormal",
        21 => "fog",
        22 => "blendIndices2",
        23 => "blendWeights2",
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn model_with_two_of_everything() -> GmdlModel {
        let mut model = GmdlModel::new();
        model.vertex_descriptors = vec![VertexDescriptor::default(); 2];
        model.vertex_buffers = vec![
            VertexBuffer {
                descriptor_index: 0,
                vertex_count: 3,
                data: vec![1; 36],
            },
            VertexBuffer {
                descriptor_index: 1,
                vertex_count: 3,
                data: vec![2; 36],
            },
        ];
        model.index_buffers = vec![
            IndexBuffer {
                primitive_type: 4,
                num_bits: 16,
                indices: vec![0, 1, 2],
            },
            IndexBuffer {
                primitive_type: 4,
                num_bits: 16,
                indices: vec![2, 1, 0],
            },
        ];
        model.meshes = vec![Mesh {
            vertex_buffer_index: 1,
            index_buffer_index: 1,
            material_id: 7,
        }];
        model
    }

    #[test]
    fn test_remove_refuses_while_referenced() {
        let mut model = model_with_two_of_everything();
        let err = model.remove_vertex_buffer(1).unwrap_err();
        assert!(matches!(
            err,
            crate::Error::StillReferenced {
                kind: "vertex buffer",
                index: 1
            }
        ));
        // nothing was removed
        assert_eq!(model.vertex_buffers.len(), 2);
    }

    #[test]
    fn test_remove_renumbers_references_above() {
        let mut model = model_with_two_of_everything();
        model.remove_vertex_buffer(0).unwrap();
        model.remove_index_buffer(0).unwrap();

        assert_eq!(model.vertex_buffers.len(), 1);
        assert_eq!(model.meshes[0].vertex_buffer_index, 0);
        assert_eq!(model.meshes[0].index_buffer_index, 0);
        // the surviving buffer is the one the mesh pointed at
        assert_eq!(model.vertex_buffers[0].data, vec![2; 36]);
    }

    #[test]
    fn test_remove_descriptor_tracks_buffer_references() {
        let mut model = model_with_two_of_everything();
        assert!(model.remove_vertex_descriptor(0).is_err());

        model.vertex_buffers.remove(0);
        model.meshes[0].vertex_buffer_index = 0;
        model.remove_vertex_descriptor(0).unwrap();
        assert_eq!(model.vertex_buffers[0].descriptor_index, 0);
    }

    #[test]
    fn test_remove_out_of_range() {
        let mut model = GmdlModel::new();
        assert!(model.remove_vertex_buffer(0).is_err());
        assert!(model.remove_index_buffer(3).is_err());
        assert!(model.remove_vertex_descriptor(1).is_err());
    }

    #[test]
    fn test_vertex_usage_names() {
        assert_eq!(vertex_usage_name(0), Some("position"));
        assert_eq!(vertex_usage_name(13), Some("texcoord7"));
        assert_eq!(vertex_usage_name(23), Some("blendWeights2"));
        assert_eq!(vertex_usage_name(1), None);
        assert_eq!(vertex_usage_name(24), None);
    }
}
