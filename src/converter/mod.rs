//! Format conversion utilities
//!
//! This module handles conversions between the paired Spore asset forms:
//! - Raster ↔ DDS - texture container conversion
//! - LVL ↔ text - adventure marker layers
//! - PCTP ↔ text - creature capability tables
//! - TLSA ↔ text - animation sets
//!
//! Each function is a whole-file pipeline: read the source, transform the
//! document, write the destination. The text-producing side renders
//! canonical ArgScript; the text-consuming side fails with
//! [`Error::ScriptParseFailed`] when the script has errors, and demotes
//! parser warnings to `tracing` output.
//!
//! [`Error::ScriptParseFailed`]: crate::Error::ScriptParseFailed

pub mod batch;

pub use batch::{BatchProgress, BatchResult, ConvertDirection, batch_convert, find_convertible_files};

use crate::argscript::Diagnostics;
use crate::error::{Error, Result};
use crate::formats::common::NameResolver;
use crate::formats::{dds, lvl, pctp, raster, tlsa};
use std::fs;
use std::path::Path;

/// Convert a Raster texture file to a standalone DDS file.
///
/// # Errors
///
/// Returns [`Error::Io`] on file access problems, or any Raster/DDS
/// parsing error.
///
/// [`Error::Io`]: crate::Error::Io
pub fn convert_raster_to_dds<P: AsRef<Path>, Q: AsRef<Path>>(source: P, dest: Q) -> Result<()> {
    let texture = raster::read_raster(source)?;
    tracing::debug!(
        width = texture.width,
        height = texture.height,
        mipmaps = texture.mipmap_count(),
        "read raster texture"
    );
    let dds = texture.to_dds()?;
    dds::write_dds(&dds, dest)
}

/// Convert a DDS file to the game's Raster container.
///
/// # Errors
///
/// Returns [`Error::Io`] on file access problems, or any DDS/Raster
/// parsing error.
///
/// [`Error::Io`]: crate::Error::Io
pub fn convert_dds_to_raster<P: AsRef<Path>, Q: AsRef<Path>>(source: P, dest: Q) -> Result<()> {
    let dds = dds::read_dds(source)?;
    tracing::debug!(
        width = dds.width(),
        height = dds.height(),
        mipmaps = dds.mipmap_count(),
        "read DDS texture"
    );
    let texture = raster::RasterTexture::from_dds(&dds)?;
    raster::write_raster(&texture, dest)
}

/// Convert a binary level file to its ArgScript text form.
///
/// # Errors
///
/// Returns [`Error::Io`] on file access problems, or any level parsing
/// error.
///
/// [`Error::Io`]: crate::Error::Io
pub fn convert_lvl_to_text<P: AsRef<Path>, Q: AsRef<Path>>(
    source: P,
    dest: Q,
    resolver: &dyn NameResolver,
) -> Result<()> {
    let document = lvl::read_lvl(source)?;
    tracing::debug!(markers = document.markers.len(), "read level document");
    fs::write(dest, lvl::level_to_text(&document, resolver))?;
    Ok(())
}

/// Parse an ArgScript level file and write it back as binary.
///
/// # Errors
///
/// Returns [`Error::ScriptParseFailed`] when the script has errors, or
/// [`Error::Io`] on file access problems.
///
/// [`Error::ScriptParseFailed`]: crate::Error::ScriptParseFailed
/// [`Error::Io`]: crate::Error::Io
pub fn convert_text_to_lvl<P: AsRef<Path>, Q: AsRef<Path>>(
    source: P,
    dest: Q,
    resolver: &dyn NameResolver,
) -> Result<()> {
    let text = fs::read_to_string(source)?;
    let (document, diagnostics) = lvl::parse_lvl_text(&text, resolver);
    check_script(&diagnostics)?;
    lvl::write_lvl(&document, dest)
}

/// Convert a binary capability file to its ArgScript text form.
///
/// # Errors
///
/// Returns [`Error::Io`] on file access problems, or any capability
/// parsing or rendering error.
///
/// [`Error::Io`]: crate::Error::Io
pub fn convert_pctp_to_text<P: AsRef<Path>, Q: AsRef<Path>>(
    source: P,
    dest: Q,
    resolver: &dyn NameResolver,
) -> Result<()> {
    let unit = pctp::read_pctp(source)?;
    tracing::debug!(capabilities = unit.capability_names.len(), "read capability unit");
    fs::write(dest, pctp::capability_to_text(&unit, resolver)?)?;
    Ok(())
}

/// Parse an ArgScript capability file and write it back as binary.
///
/// # Errors
///
/// Returns [`Error::ScriptParseFailed`] when the script has errors, or
/// [`Error::Io`] on file access problems.
///
/// [`Error::ScriptParseFailed`]: crate::Error::ScriptParseFailed
/// [`Error::Io`]: crate::Error::Io
pub fn convert_text_to_pctp<P: AsRef<Path>, Q: AsRef<Path>>(
    source: P,
    dest: Q,
    resolver: &dyn NameResolver,
) -> Result<()> {
    let text = fs::read_to_string(source)?;
    let (unit, diagnostics) = pctp::parse_pctp_text(&text, resolver);
    check_script(&diagnostics)?;
    pctp::write_pctp(&unit, dest)
}

/// Convert a binary animation set to its ArgScript text form.
///
/// # Errors
///
/// Returns [`Error::Io`] on file access problems, or any animation-set
/// parsing error.
///
/// [`Error::Io`]: crate::Error::Io
pub fn convert_tlsa_to_text<P: AsRef<Path>, Q: AsRef<Path>>(
    source: P,
    dest: Q,
    resolver: &dyn NameResolver,
) -> Result<()> {
    let unit = tlsa::read_tlsa(source)?;
    tracing::debug!(
        version = unit.version,
        groups = unit.groups.len(),
        "read animation set"
    );
    fs::write(dest, tlsa::animation_set_to_text(&unit, resolver))?;
    Ok(())
}

/// Parse an ArgScript animation set and write it back as binary.
///
/// # Errors
///
/// Returns [`Error::ScriptParseFailed`] when the script has errors, or
/// [`Error::Io`] on file access problems.
///
/// [`Error::ScriptParseFailed`]: crate::Error::ScriptParseFailed
/// [`Error::Io`]: crate::Error::Io
pub fn convert_text_to_tlsa<P: AsRef<Path>, Q: AsRef<Path>>(
    source: P,
    dest: Q,
    resolver: &dyn NameResolver,
) -> Result<()> {
    let text = fs::read_to_string(source)?;
    let (unit, diagnostics) = tlsa::parse_tlsa_text(&text, resolver);
    check_script(&diagnostics)?;
    tlsa::write_tlsa(&unit, dest)
}

/// Turn accumulated script diagnostics into a conversion outcome:
/// warnings are logged, any error fails the conversion.
fn check_script(diagnostics: &Diagnostics) -> Result<()> {
    for warning in &diagnostics.warnings {
        tracing::warn!(line = warning.line, "{}", warning.message);
    }
    if let Some(first) = diagnostics.errors.first() {
        return Err(Error::ScriptParseFailed {
            count: diagnostics.errors.len(),
            line: first.line,
            first: first.message.clone(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formats::common::HashRegistry;
    use crate::formats::tlsa::{
        AnimationSetUnit, TlsaAnimation, TlsaAnimationChoice, TlsaAnimationGroup,
    };
    use crate::formats::{fnv_hash, read_tlsa, write_tlsa};
    use pretty_assertions::assert_eq;

    fn animation_set() -> AnimationSetUnit {
        AnimationSetUnit {
            version: 10,
            groups: vec![TlsaAnimationGroup {
                id: fnv_hash("wave"),
                name: "Wave".to_string(),
                end_mode: 1,
                allow_locomotion: true,
                choices: vec![TlsaAnimationChoice {
                    probability_threshold: 1.0,
                    animations: vec![TlsaAnimation {
                        id: fnv_hash("wave_01"),
                        description: "greet/wave_01".to_string(),
                        ..TlsaAnimation::default()
                    }],
                }],
                ..TlsaAnimationGroup::default()
            }],
        }
    }

    #[test]
    fn test_tlsa_text_conversion_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let binary = dir.path().join("wave.tlsa");
        let text = dir.path().join("wave.tlsa_t");
        let rebuilt = dir.path().join("wave_rebuilt.tlsa");
        let registry = HashRegistry::new();

        let unit = animation_set();
        write_tlsa(&unit, &binary).unwrap();
        convert_tlsa_to_text(&binary, &text, &registry).unwrap();
        convert_text_to_tlsa(&text, &rebuilt, &registry).unwrap();

        assert_eq!(read_tlsa(&rebuilt).unwrap(), unit);
    }

    #[test]
    fn test_text_output_ends_with_newline() {
        let dir = tempfile::tempdir().unwrap();
        let binary = dir.path().join("wave.tlsa");
        let text = dir.path().join("wave.tlsa_t");
        let registry = HashRegistry::new();

        write_tlsa(&animation_set(), &binary).unwrap();
        convert_tlsa_to_text(&binary, &text, &registry).unwrap();
        assert!(fs::read_to_string(&text).unwrap().ends_with('\n'));
    }

    #[test]
    fn test_bad_script_fails_with_first_error() {
        let dir = tempfile::tempdir().unwrap();
        let text = dir.path().join("broken.tlsa_t");
        let dest = dir.path().join("broken.tlsa");
        let registry = HashRegistry::new();

        fs::write(&text, "version 10\nnonsense here\n").unwrap();
        let err = convert_text_to_tlsa(&text, &dest, &registry).unwrap_err();
        assert!(matches!(
            err,
            Error::ScriptParseFailed { count: 1, line: 2, .. }
        ));
        assert!(!dest.exists());
    }

    #[test]
    fn test_missing_source_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = convert_raster_to_dds(
            dir.path().join("absent.raster"),
            dir.path().join("out.dds"),
        )
        .unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
