//! FNV name hashing and hash-to-name rendering
//!
//! Spore identifies almost everything by a 32-bit FNV-1 hash of a lowercased
//! name. The binary formats store only the hash; the text formats render a
//! readable name whenever a registry knows one and fall back to hexadecimal
//! otherwise.

use crate::error::{Error, Result};
use crate::formats::common::types::ResourceKey;
use indexmap::IndexMap;
use std::fs;
use std::path::Path;

/// FNV-1 hash of a name, lowercased first.
///
/// This is the hash the game applies to every identifier, so
/// `fnv_hash("Creature") == fnv_hash("creature")`.
#[must_use]
pub fn fnv_hash(name: &str) -> u32 {
    let mut hash = 0x811C_9DC5u32;
    for byte in name.bytes() {
        hash = hash.wrapping_mul(0x0100_0193) ^ u32::from(byte.to_ascii_lowercase());
    }
    hash
}

/// Bidirectional hash/name lookup injected into every text codec.
///
/// `hash_of` never fails: unknown names hash through [`fnv_hash`], which is
/// what the game itself does. The `type_*` pair covers the separate type-ID
/// namespace used by [`ResourceKey`] rendering.
pub trait NameResolver: Sync {
    /// Hash for a name, falling back to FNV-1 when the name is unregistered.
    fn hash_of(&self, name: &str) -> u32 {
        fnv_hash(name)
    }

    /// Known name for a hash, if any.
    fn name_of(&self, hash: u32) -> Option<String> {
        let _ = hash;
        None
    }

    /// Hash for a type name, falling back to FNV-1.
    fn type_hash_of(&self, name: &str) -> u32 {
        fnv_hash(name)
    }

    /// Known name for a type hash, if any.
    fn type_name_of(&self, hash: u32) -> Option<String> {
        let _ = hash;
        None
    }
}

/// In-memory name registry backing the default [`NameResolver`].
///
/// An empty registry is valid: it resolves every name through FNV and renders
/// every hash as hexadecimal.
#[derive(Debug, Clone, Default)]
pub struct HashRegistry {
    /// hash -> canonical name, for rendering IDs as readable tokens.
    names: IndexMap<u32, String>,
    /// lowercased name -> hash, only for names whose hash is not their FNV.
    aliases: IndexMap<String, u32>,
    /// hash -> name for the type-ID namespace.
    types: IndexMap<u32, String>,
}

impl HashRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a name under its FNV hash. Returns the hash.
    pub fn add(&mut self, name: &str) -> u32 {
        let hash = fnv_hash(name);
        self.names.insert(hash, name.to_string());
        hash
    }

    /// Register a name under an explicit hash that may differ from its FNV.
    pub fn add_alias(&mut self, name: &str, hash: u32) {
        self.names.insert(hash, name.to_string());
        if fnv_hash(name) != hash {
            self.aliases.insert(name.to_lowercase(), hash);
        }
    }

    /// Register a type name under an explicit hash.
    pub fn add_type(&mut self, name: &str, hash: u32) {
        self.types.insert(hash, name.to_string());
    }

    /// Load a registry file into the name table.
    ///
    /// One entry per line: a bare name (hashed with FNV) or a name followed
    /// by an explicit `0x`-prefixed hash. `#` starts a comment.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the file cannot be read, or
    /// [`Error::InvalidRegistryEntry`] for a line whose hash does not parse.
    pub fn load<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let contents = fs::read_to_string(path)?;
        for (index, raw_line) in contents.lines().enumerate() {
            let line = match raw_line.find('#') {
                Some(pos) => &raw_line[..pos],
                None => raw_line,
            };
            let mut words = line.split_whitespace();
            let Some(name) = words.next() else {
                continue;
            };
            match words.next() {
                None => {
                    self.add(name);
                }
                Some(token) => {
                    let digits = token
                        .strip_prefix("0x")
                        .or_else(|| token.strip_prefix("0X"))
                        .unwrap_or(token);
                    let hash = u32::from_str_radix(digits, 16).map_err(|_| {
                        Error::InvalidRegistryEntry {
                            line: index + 1,
                            entry: raw_line.trim().to_string(),
                        }
                    })?;
                    self.add_alias(name, hash);
                }
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl NameResolver for HashRegistry {
    fn hash_of(&self, name: &str) -> u32 {
        match self.aliases.get(&name.to_lowercase()) {
            Some(hash) => *hash,
            None => fnv_hash(name),
        }
    }

    fn name_of(&self, hash: u32) -> Option<String> {
        self.names.get(&hash).cloned()
    }

    fn type_hash_of(&self, name: &str) -> u32 {
        self.types
            .iter()
            .find(|(_, known)| known.eq_ignore_ascii_case(name))
            .map_or_else(|| fnv_hash(name), |(hash, _)| *hash)
    }

    fn type_name_of(&self, hash: u32) -> Option<String> {
        self.types.get(&hash).cloned()
    }
}

/// Render a hash as its registered name, or as `0x`-prefixed uppercase hex.
#[must_use]
pub fn format_name(resolver: &dyn NameResolver, hash: u32) -> String {
    resolver
        .name_of(hash)
        .unwrap_or_else(|| format!("0x{hash:08X}"))
}

/// Render a resource key as `group!instance.type`.
///
/// The type part resolves through the type-ID namespace; group and instance
/// resolve through the file-name namespace.
#[must_use]
pub fn format_resource_key(resolver: &dyn NameResolver, key: ResourceKey) -> String {
    let type_part = resolver
        .type_name_of(key.type_id)
        .unwrap_or_else(|| format!("0x{:08X}", key.type_id));
    format!(
        "{}!{}.{}",
        format_name(resolver, key.group_id),
        format_name(resolver, key.instance_id),
        type_part
    )
}

/// Render an `i32` that might really be a hash.
///
/// Small magnitudes print as decimal. Anything with absolute value of ten
/// million or more is assumed to be a hash: it prints as `hash(name)` when
/// the resolver knows the name, or as lowercase hex.
#[must_use]
pub fn format_int32(resolver: &dyn NameResolver, value: i32) -> String {
    if value.unsigned_abs() >= 10_000_000 {
        let hash = value as u32;
        match resolver.name_of(hash) {
            Some(name) => format!("hash({name})"),
            None => format!("0x{hash:08x}"),
        }
    } else {
        value.to_string()
    }
}

/// Parse a file-ID token: `0x`/`#`-prefixed hex, or a name hashed through
/// the resolver.
///
/// # Errors
///
/// Returns the diagnostic message for a hex token with malformed digits.
pub fn parse_file_id(resolver: &dyn NameResolver, text: &str) -> std::result::Result<u32, String> {
    let digits = if let Some(rest) = text.strip_prefix("0x") {
        rest
    } else if let Some(rest) = text.strip_prefix('#') {
        rest
    } else {
        return Ok(resolver.hash_of(text));
    };
    u32::from_str_radix(digits, 16)
        .map_err(|_| "Bad number format: expecting a hexadecimal number after '0x'.".to_string())
}
