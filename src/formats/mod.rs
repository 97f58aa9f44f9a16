//! File format handlers for Spore game assets
//!
//! Each submodule owns one binary format: parsing into an editable document
//! struct and serializing back. `lvl`, `pctp` and `tlsa` additionally speak
//! the ArgScript text form of their format.

pub mod common;
pub mod dds;
pub mod gmdl;
pub mod lvl;
pub mod pctp;
pub mod raster;
pub mod tlsa;

// Re-export common types for convenience
pub use common::{HashRegistry, NameResolver, ResourceKey, fnv_hash};

// Re-export main document types
pub use dds::{DdsTexture, parse_dds_bytes, read_dds, write_dds};
pub use gmdl::{GmdlModel, parse_gmdl_bytes, read_gmdl, write_gmdl};
pub use lvl::{LevelDocument, parse_lvl_bytes, read_lvl, write_lvl};
pub use pctp::{CapabilityUnit, parse_pctp_bytes, read_pctp, write_pctp};
pub use raster::{RasterTexture, parse_raster_bytes, read_raster, write_raster};
pub use tlsa::{AnimationSetUnit, parse_tlsa_bytes, read_tlsa, write_tlsa};
