//! Batch conversion over directory trees
//!
//! Discovery walks a directory for files whose extension matches one
//! conversion direction, then converts them in parallel, preserving the
//! source directory structure under the destination root. Text forms use
//! the `_t` extension convention: `walk.tlsa` converts to `walk.tlsa_t`
//! and back.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use rayon::prelude::*;
use walkdir::WalkDir;

use crate::error::Result;
use crate::formats::common::NameResolver;

/// One supported whole-file conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConvertDirection {
    RasterToDds,
    DdsToRaster,
    LvlToText,
    TextToLvl,
    PctpToText,
    TextToPctp,
    TlsaToText,
    TextToTlsa,
}

impl ConvertDirection {
    /// Extension of the files this direction consumes.
    #[must_use]
    pub fn source_extension(self) -> &'static str {
        match self {
            Self::RasterToDds => "raster",
            Self::DdsToRaster => "dds",
            Self::LvlToText => "lvl",
            Self::TextToLvl => "lvl_t",
            Self::PctpToText => "pctp",
            Self::TextToPctp => "pctp_t",
            Self::TlsaToText => "tlsa",
            Self::TextToTlsa => "tlsa_t",
        }
    }

    /// Extension of the files this direction produces.
    #[must_use]
    pub fn target_extension(self) -> &'static str {
        match self {
            Self::RasterToDds => "dds",
            Self::DdsToRaster => "raster",
            Self::LvlToText => "lvl_t",
            Self::TextToLvl => "lvl",
            Self::PctpToText => "pctp_t",
            Self::TextToPctp => "pctp",
            Self::TlsaToText => "tlsa_t",
            Self::TextToTlsa => "tlsa",
        }
    }

    fn convert(self, source: &Path, dest: &Path, resolver: &dyn NameResolver) -> Result<()> {
        match self {
            Self::RasterToDds => super::convert_raster_to_dds(source, dest),
            Self::DdsToRaster => super::convert_dds_to_raster(source, dest),
            Self::LvlToText => super::convert_lvl_to_text(source, dest, resolver),
            Self::TextToLvl => super::convert_text_to_lvl(source, dest, resolver),
            Self::PctpToText => super::convert_pctp_to_text(source, dest, resolver),
            Self::TextToPctp => super::convert_text_to_pctp(source, dest, resolver),
            Self::TlsaToText => super::convert_tlsa_to_text(source, dest, resolver),
            Self::TextToTlsa => super::convert_text_to_tlsa(source, dest, resolver),
        }
    }
}

/// Progress snapshot passed to the batch callback, once per file.
#[derive(Debug, Clone)]
pub struct BatchProgress {
    /// 1-based position of the file being converted.
    pub current: usize,
    /// Total number of files in the batch.
    pub total: usize,
    /// Source path relative to the batch root.
    pub file: String,
}

/// Result of a batch conversion.
#[derive(Debug, Clone)]
pub struct BatchResult {
    /// Number of successful conversions.
    pub success_count: usize,
    /// Number of failed conversions.
    pub fail_count: usize,
    /// Messages for each file processed.
    pub results: Vec<String>,
}

/// Find all files a direction can convert, recursively.
///
/// Returns a sorted list so batch runs are deterministic.
#[must_use]
pub fn find_convertible_files<P: AsRef<Path>>(dir: P, direction: ConvertDirection) -> Vec<PathBuf> {
    let extension = direction.source_extension();
    let mut files: Vec<_> = WalkDir::new(dir)
        .follow_links(true)
        .into_iter()
        .filter_map(std::result::Result::ok)
        .filter(|entry| {
            entry.path().is_file()
                && entry
                    .path()
                    .extension()
                    .is_some_and(|ext| ext.eq_ignore_ascii_case(extension))
        })
        .map(|entry| entry.path().to_path_buf())
        .collect();

    files.sort();
    files
}

/// Convert a list of files in parallel, preserving the source directory
/// structure under `dest_base`.
///
/// Each output lands at the source's path relative to `source_base`, with
/// the direction's target extension. Failures do not stop the batch; they
/// count in the result and read in its per-file messages.
pub fn batch_convert<F>(
    files: &[PathBuf],
    source_base: &Path,
    dest_base: &Path,
    direction: ConvertDirection,
    resolver: &dyn NameResolver,
    progress: F,
) -> BatchResult
where
    F: Fn(&BatchProgress) + Send + Sync,
{
    let success_counter = AtomicUsize::new(0);
    let fail_counter = AtomicUsize::new(0);
    let processed = AtomicUsize::new(0);
    let total = files.len();

    let results: Vec<String> = files
        .par_iter()
        .map(|source| {
            let relative_path = source.strip_prefix(source_base).unwrap_or(source.as_path());
            let display_path = relative_path.to_string_lossy();

            let current = processed.fetch_add(1, Ordering::SeqCst) + 1;
            progress(&BatchProgress {
                current,
                total,
                file: display_path.to_string(),
            });

            let dest = dest_base
                .join(relative_path)
                .with_extension(direction.target_extension());
            if let Some(parent) = dest.parent() {
                if let Err(e) = std::fs::create_dir_all(parent) {
                    fail_counter.fetch_add(1, Ordering::SeqCst);
                    return format!("Failed to create folder for {display_path}: {e}");
                }
            }

            match direction.convert(source, &dest, resolver) {
                Ok(()) => {
                    success_counter.fetch_add(1, Ordering::SeqCst);
                    format!("Converted: {display_path}")
                }
                Err(e) => {
                    fail_counter.fetch_add(1, Ordering::SeqCst);
                    format!("Failed {display_path}: {e}")
                }
            }
        })
        .collect();

    BatchResult {
        success_count: success_counter.load(Ordering::SeqCst),
        fail_count: fail_counter.load(Ordering::SeqCst),
        results,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formats::common::HashRegistry;
    use crate::formats::tlsa::{
        AnimationSetUnit, TlsaAnimation, TlsaAnimationChoice, TlsaAnimationGroup,
    };
    use crate::formats::{fnv_hash, write_tlsa};
    use pretty_assertions::assert_eq;
    use std::sync::Mutex;

    fn animation_set(tag: &str) -> AnimationSetUnit {
        AnimationSetUnit {
            version: 10,
            groups: vec![TlsaAnimationGroup {
                id: fnv_hash(tag),
                name: tag.to_string(),
                end_mode: 0,
                choices: vec![TlsaAnimationChoice {
                    probability_threshold: 1.0,
                    animations: vec![TlsaAnimation {
                        id: fnv_hash("step_01"),
                        description: format!("{tag}/step_01"),
                        ..TlsaAnimation::default()
                    }],
                }],
                ..TlsaAnimationGroup::default()
            }],
        }
    }

    #[test]
    fn test_extension_pairs_are_inverses() {
        for direction in [
            ConvertDirection::RasterToDds,
            ConvertDirection::LvlToText,
            ConvertDirection::PctpToText,
            ConvertDirection::TlsaToText,
        ] {
            assert_ne!(direction.source_extension(), direction.target_extension());
        }
        assert_eq!(ConvertDirection::TlsaToText.target_extension(), "tlsa_t");
        assert_eq!(ConvertDirection::TextToTlsa.source_extension(), "tlsa_t");
    }

    #[test]
    fn test_discovery_is_recursive_and_sorted() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("creatures");
        std::fs::create_dir(&nested).unwrap();
        write_tlsa(&animation_set("walk"), dir.path().join("walk.tlsa")).unwrap();
        write_tlsa(&animation_set("graze"), nested.join("graze.tlsa")).unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let files = find_convertible_files(dir.path(), ConvertDirection::TlsaToText);
        assert_eq!(files.len(), 2);
        assert!(files[0].ends_with("creatures/graze.tlsa"));
        assert!(files[1].ends_with("walk.tlsa"));

        // The text direction sees nothing yet.
        assert!(find_convertible_files(dir.path(), ConvertDirection::TextToTlsa).is_empty());
    }

    #[test]
    fn test_batch_preserves_structure_and_reports_progress() {
        let source = tempfile::tempdir().unwrap();
        let dest = tempfile::tempdir().unwrap();
        let nested = source.path().join("creatures");
        std::fs::create_dir(&nested).unwrap();
        write_tlsa(&animation_set("walk"), source.path().join("walk.tlsa")).unwrap();
        write_tlsa(&animation_set("graze"), nested.join("graze.tlsa")).unwrap();

        let registry = HashRegistry::new();
        let files = find_convertible_files(source.path(), ConvertDirection::TlsaToText);
        let seen = Mutex::new(Vec::new());
        let result = batch_convert(
            &files,
            source.path(),
            dest.path(),
            ConvertDirection::TlsaToText,
            &registry,
            |progress| seen.lock().unwrap().push((progress.current, progress.total)),
        );

        assert_eq!(result.success_count, 2);
        assert_eq!(result.fail_count, 0);
        assert!(dest.path().join("walk.tlsa_t").is_file());
        assert!(dest.path().join("creatures/graze.tlsa_t").is_file());

        let mut seen = seen.into_inner().unwrap();
        seen.sort_unstable();
        assert_eq!(seen, [(1, 2), (2, 2)]);
    }

    #[test]
    fn test_corrupt_file_counts_as_failure_without_stopping() {
        let source = tempfile::tempdir().unwrap();
        let dest = tempfile::tempdir().unwrap();
        write_tlsa(&animation_set("walk"), source.path().join("walk.tlsa")).unwrap();
        std::fs::write(source.path().join("bad.tlsa"), b"not a tlsa").unwrap();

        let registry = HashRegistry::new();
        let files = find_convertible_files(source.path(), ConvertDirection::TlsaToText);
        let result = batch_convert(
            &files,
            source.path(),
            dest.path(),
            ConvertDirection::TlsaToText,
            &registry,
            |_| {},
        );

        assert_eq!(result.success_count, 1);
        assert_eq!(result.fail_count, 1);
        assert!(dest.path().join("walk.tlsa_t").is_file());
        assert!(!dest.path().join("bad.tlsa_t").exists());
        assert!(result.results.iter().any(|msg| msg.starts_with("Failed bad.tlsa")));
    }
}
