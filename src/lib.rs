//! # sporeformats
//!
//! A pure-Rust library for working with Spore game asset formats.
//!
//! ## Supported Formats
//!
//! - **DDS** - DirectDraw Surface textures with the game's mip arithmetic
//! - **Raster** - The game's magic-less texture container
//! - **GMDL** - Compiled creation models (meshes, vertex layouts, shader data)
//! - **LVL** - Adventure gameplay marker layers
//! - **PCTP** - Part capability tables
//! - **TLSA** - Animation set definitions
//!
//! LVL, PCTP and TLSA additionally round-trip through ArgScript, the
//! line/block text notation Spore's moddable formats share.
//!
//! ## Quick Start
//!
//! ### Reading a texture
//!
//! ```no_run
//! use sporeformats::formats::{read_raster, write_dds};
//!
//! let raster = read_raster("creature_skin.raster")?;
//! write_dds(&raster.to_dds()?, "creature_skin.dds")?;
//! # Ok::<(), sporeformats::Error>(())
//! ```
//!
//! ### Converting an animation set to text
//!
//! ```no_run
//! use sporeformats::converter::convert_tlsa_to_text;
//! use sporeformats::formats::HashRegistry;
//!
//! let registry = HashRegistry::new();
//! convert_tlsa_to_text("creature.tlsa", "creature.tlsa_t", &registry)?;
//! # Ok::<(), sporeformats::Error>(())
//! ```
//!
//! ### Using the Prelude
//!
//! The prelude provides convenient access to commonly used types:
//!
//! ```
//! use sporeformats::prelude::*;
//!
//! // Now you have access to:
//! // - DdsTexture, RasterTexture, GmdlModel
//! // - LevelDocument, CapabilityUnit, AnimationSetUnit
//! // - HashRegistry, NameResolver, fnv_hash
//! // - Error, Result, and more
//! ```
//!
//! ## Feature Flags
//!
//! - `cli` - Enables the `sporeformats` command-line binary

pub mod argscript;
pub mod converter;
pub mod error;
pub mod formats;

// Re-exports for convenience
pub use error::{Error, Result};

/// Prelude module for common imports
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::formats::common::{
        HashRegistry, NameResolver, ResourceKey, Transform, fnv_hash, format_name,
    };
    pub use crate::formats::dds::{DdsTexture, TextureFormat, read_dds, write_dds};
    pub use crate::formats::gmdl::{GmdlModel, read_gmdl, write_gmdl};
    pub use crate::formats::lvl::{GameplayMarker, LevelDocument, read_lvl, write_lvl};
    pub use crate::formats::pctp::{CapabilityUnit, read_pctp, write_pctp};
    pub use crate::formats::raster::{RasterTexture, read_raster, write_raster};
    pub use crate::formats::tlsa::{AnimationSetUnit, read_tlsa, write_tlsa};

    pub use crate::converter;
    pub use crate::converter::{
        BatchResult, ConvertDirection, batch_convert, find_convertible_files,
    };

    pub use crate::argscript::{Diagnostics, Stream, Writer};
}

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// CLI module (feature-gated)
#[cfg(feature = "cli")]
pub mod cli;
