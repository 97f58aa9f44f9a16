//! PCTP part-capability tables
//!
//! A capability names one thing a creature part can do (grasping, biting,
//! gliding) as a readable name plus a 4-character tag the animation system
//! keys on. The table also carries hash-keyed aliases onto those
//! capabilities, aggregate tags grouping several capabilities, and per-tag
//! deformation curve specs. Everything is big-endian except the packed
//! tags, which store their bytes reversed.

use crate::error::{Error, Result};
use indexmap::IndexMap;

mod reader;
mod text;
mod writer;

pub use reader::{parse_pctp_bytes, read_pctp};
pub use text::{capability_to_text, parse_pctp_text};
pub use writer::{serialize_pctp, write_pctp};

/// The four bytes every PCTP file starts with.
pub const PCTP_MAGIC: [u8; 4] = *b"pctp";

/// Current PCTP version. Version 3 differs only in dropping the priority
/// field and the second deform range float.
pub const PCTP_VERSION: u32 = 4;

/// Decode a packed tag into its 4-character display form.
///
/// The tag's bytes sit reversed on disk, so the little-endian read order
/// here yields them most-significant first. Zero padding displays as
/// spaces.
#[must_use]
pub fn unpack_identifier(packed: u32) -> String {
    packed
        .to_be_bytes()
        .iter()
        .map(|&byte| if byte == 0 { ' ' } else { char::from(byte) })
        .collect()
}

/// Pack a tag into the four bytes written to disk.
///
/// Tags shorter than four characters pad with zero bytes. A space decoded
/// from zero padding is written back as a literal space, so zero-padded
/// tags do not survive a byte round-trip; full 4-character tags do.
///
/// # Errors
///
/// Returns [`Error::IdentifierTooLong`] for a tag over four bytes.
///
/// [`Error::IdentifierTooLong`]: crate::Error::IdentifierTooLong
pub fn pack_identifier(identifier: &str) -> Result<[u8; 4]> {
    let bytes = identifier.as_bytes();
    if bytes.len() > 4 {
        return Err(Error::IdentifierTooLong {
            identifier: identifier.to_string(),
        });
    }
    let mut packed = [0u8; 4];
    for (i, &byte) in bytes.iter().enumerate() {
        packed[3 - i] = byte;
    }
    Ok(packed)
}

/// One capability: a display name plus its packed tag.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CapabilityName {
    pub name: String,
    pub identifier: String,
}

/// One entry of the hash-keyed capability table.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CapabilityMapping {
    pub identifier: String,
    /// Position of the owning capability in compile order.
    pub index: i32,
}

/// One deformation curve entry under a capability tag.
#[derive(Debug, Clone, PartialEq)]
pub struct DeformSpec {
    pub deform_id: u32,
    /// Default value and weight. Version 3 files store only the first.
    pub range: [f32; 2],
    /// Bit 0 set marks a helper deform, bit 1 set a curve that wraps mod 1.
    pub flags: i32,
}

impl DeformSpec {
    /// True when the deform feeds an animation channel rather than serving
    /// as a helper curve. Bit 0 stores the inverse of this.
    #[must_use]
    pub fn is_rendered(&self) -> bool {
        self.flags & 1 == 0
    }

    /// True when the curve wraps mod 1.
    #[must_use]
    pub fn wraps(&self) -> bool {
        self.flags & 2 != 0
    }
}

impl Default for DeformSpec {
    fn default() -> Self {
        Self {
            deform_id: 0,
            range: [0.0, 1.0],
            flags: 0,
        }
    }
}

/// A whole part-capability document.
#[derive(Debug, Clone, PartialEq)]
pub struct CapabilityUnit {
    pub version: u32,
    /// Only present in version 4 files.
    pub priority: f32,
    pub capability_names: Vec<CapabilityName>,
    /// Name hash -> mapping. Entries whose key is the FNV hash of a listed
    /// capability name define that capability; any other key is a remap
    /// alias sharing the target's identifier and index.
    pub capabilities_map: IndexMap<u32, CapabilityMapping>,
    /// Aggregate tag -> member capability tags.
    pub aggregates: IndexMap<String, Vec<String>>,
    /// Capability tag -> deformation curve entries.
    pub deform_specs: IndexMap<String, Vec<DeformSpec>>,
}

impl CapabilityUnit {
    /// Capability names in the alphabetical order both the binary and the
    /// text form are written in.
    #[must_use]
    pub fn sorted_names(&self) -> Vec<&CapabilityName> {
        let mut names: Vec<&CapabilityName> = self.capability_names.iter().collect();
        names.sort_by(|a, b| a.name.cmp(&b.name));
        names
    }
}

impl Default for CapabilityUnit {
    fn default() -> Self {
        Self {
            version: PCTP_VERSION,
            priority: 0.0,
            capability_names: Vec::new(),
            capabilities_map: IndexMap::new(),
            aggregates: IndexMap::new(),
            deform_specs: IndexMap::new(),
        }
    }
}
