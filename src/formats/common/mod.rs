//! Common types and utilities shared across all Spore formats

pub mod hash;
pub mod types;

pub use hash::{
    HashRegistry, NameResolver, fnv_hash, format_int32, format_name, format_resource_key,
    parse_file_id,
};
pub use types::{BoundingBox, ResourceKey, Transform};
