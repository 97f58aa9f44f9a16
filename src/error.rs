//! Error types for `sporeformats`

use thiserror::Error;

/// The error type for `sporeformats` operations.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum Error {
    // ==================== IO Errors ====================
    /// IO error from file operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // ==================== DDS Texture Errors ====================
    /// The file is not a valid DDS file (missing "DDS " magic).
    #[error("invalid DDS magic: expected 'DDS ', found {0:?}")]
    InvalidDdsMagic([u8; 4]),

    /// The DDS pixel format is not one this library can size.
    #[error("unsupported DDS format: 0x{four_cc:08X}")]
    UnsupportedFourCc {
        /// The fourCC code found in the pixel format block.
        four_cc: u32,
    },

    /// A DDS texture was declared with zero width or height.
    #[error("invalid texture dimensions: {width}x{height}")]
    InvalidTextureDimensions {
        /// Declared width in texels.
        width: u32,
        /// Declared height in texels.
        height: u32,
    },

    /// The mip data buffer does not cover the requested mip level.
    #[error("mip level {level} out of range (texture has {count})")]
    MipLevelOutOfRange {
        /// The requested mip level.
        level: u32,
        /// The number of mip levels in the texture.
        count: u32,
    },

    /// Mip sizes computed from the header do not match the data length.
    #[error("texture data length mismatch: expected {expected} bytes, found {found}")]
    TextureDataMismatch {
        /// Byte count derived from width/height/mips/format.
        expected: usize,
        /// Byte count actually present.
        found: usize,
    },

    // ==================== Raster Texture Errors ====================
    /// The leading marker of a Raster file was not 1.
    #[error("invalid Raster marker: expected 1, found {marker}")]
    InvalidRasterMarker {
        /// The marker value found.
        marker: u32,
    },

    // ==================== GMDL Model Errors ====================
    /// The GMDL version is newer than this library understands.
    #[error("unsupported GMDL version: {version} (supported: 0-9)")]
    UnsupportedGmdlVersion {
        /// The version number found in the file.
        version: u32,
    },

    /// An index buffer declared a bit width other than 16 or 32.
    #[error("unsupported GMDL index buffer width: {bits} bits")]
    UnsupportedIndexBits {
        /// The bit width found in the file.
        bits: u32,
    },

    /// A reserved count that must be zero held another value.
    #[error("unsupported GMDL field in position {position}")]
    NonZeroReservedField {
        /// Stream offset of the offending field.
        position: u64,
    },

    /// A shader data block's size could not be resolved.
    #[error("unknown shader data index: 0x{data_index:X}")]
    UnknownShaderData {
        /// The shader data identifier with no registered size.
        data_index: u32,
    },

    /// A vertex buffer referenced a vertex descriptor outside the table.
    #[error("invalid vertex descriptor index: {0}")]
    InvalidDescriptorIndex(i32),

    /// A mesh referenced a vertex or index buffer outside the tables.
    #[error("invalid {kind} buffer index: {index}")]
    InvalidBufferIndex {
        /// Which table the reference points into ("vertex" or "index").
        kind: &'static str,
        /// The out-of-range index.
        index: i32,
    },

    /// An element could not be removed because a mesh still references it.
    #[error("{kind} {index} is still referenced and cannot be removed")]
    StillReferenced {
        /// Which table the element lives in.
        kind: &'static str,
        /// Position of the element in its table.
        index: usize,
    },

    // ==================== LVL Marker Errors ====================
    /// The level file version is outside the supported range.
    #[error("unsupported level version: {version} (supported: 2-3)")]
    UnsupportedLevelVersion {
        /// The version number found in the file.
        version: u32,
    },

    /// A marker payload does not fit in the fixed record slot.
    #[error("marker data too large: {size} bytes (slot is {slot})")]
    MarkerDataTooLarge {
        /// Payload size in bytes.
        size: usize,
        /// Fixed slot size in bytes.
        slot: usize,
    },

    // ==================== PCTP Capability Errors ====================
    /// The file is not a valid PCTP file (missing "pctp" magic).
    #[error("invalid PCTP magic: expected pctp, found {0:?}")]
    InvalidPctpMagic([u8; 4]),

    /// The PCTP version is not supported.
    #[error("unsupported PCTP version: {version} (supported: 3-4)")]
    UnsupportedPctpVersion {
        /// The version number found in the file.
        version: u32,
    },

    /// A capability identifier longer than four characters cannot be packed.
    #[error("capability identifier too long: '{identifier}' (maximum 4 characters)")]
    IdentifierTooLong {
        /// The offending identifier string.
        identifier: String,
    },

    /// A capability remap entry's index matches no defining capability.
    #[error("capability remap index {index} has no defining capability")]
    RemapTargetMissing {
        /// The mapping index no capability name carries.
        index: i32,
    },

    // ==================== TLSA Animation Errors ====================
    /// The file is not a valid TLSA file (missing "tsla" magic).
    #[error("invalid TLSA magic: expected tsla, found {0:?}")]
    InvalidTlsaMagic([u8; 4]),

    // ==================== Script Text Errors ====================
    /// A text document failed to parse cleanly.
    #[error("script has {count} error(s); first at line {line}: {first}")]
    ScriptParseFailed {
        /// Total number of errors accumulated.
        count: usize,
        /// Line number of the first error (1-based).
        line: usize,
        /// Message of the first error.
        first: String,
    },

    // ==================== Parsing Errors ====================
    /// UTF-8 conversion error.
    #[error("UTF-8 conversion error: {0}")]
    Utf8Error(#[from] std::string::FromUtf8Error),

    /// UTF-16 conversion error.
    #[error("UTF-16 conversion error: {0}")]
    Utf16Error(#[from] std::string::FromUtf16Error),

    /// Malformed line in a name registry file.
    #[error("invalid registry entry at line {line}: {entry:?}")]
    InvalidRegistryEntry {
        /// 1-based line number in the registry file.
        line: usize,
        /// The offending line content.
        entry: String,
    },

    // ==================== File System Errors ====================
    /// Directory traversal error.
    #[error("directory walk error: {0}")]
    WalkDirError(String),
}

impl From<walkdir::Error> for Error {
    fn from(err: walkdir::Error) -> Self {
        Error::WalkDirError(err.to_string())
    }
}

/// A specialized Result type for `sporeformats` operations.
pub type Result<T> = std::result::Result<T, Error>;
