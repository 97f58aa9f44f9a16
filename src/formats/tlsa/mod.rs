//! TLSA animation sets
//!
//! An animation set groups the animations a creature can play for one
//! trigger, with per-choice weighting. Two on-disk schemas exist: versions
//! up to 8 store a single implicit choice with one duration pair shared by
//! every animation, versions 9 and 10 store named groups with a weighted
//! choice list. Weights are stored as cumulative thresholds partitioning
//! [0, 1), not as standalone probabilities.

mod reader;
mod text;
mod writer;

pub use reader::{parse_tlsa_bytes, read_tlsa};
pub use text::{animation_set_to_text, parse_tlsa_text};
pub use writer::{serialize_tlsa, write_tlsa};

/// The four bytes every TLSA file starts with.
pub const TLSA_MAGIC: [u8; 4] = *b"tsla";

/// Current TLSA version. Version 9 differs only in dropping the
/// randomizeChoicePerLoop flag; versions 8 and below use the old
/// single-choice schema.
pub const TLSA_VERSION: u32 = 10;

/// Group end mode meaning "not specified"; the text parser rejects a group
/// that never sets one.
pub const END_MODE_UNSET: i32 = 4;

/// The instance name an animation description implies: its last
/// `/`-separated segment.
#[must_use]
pub fn instance_from_description(description: &str) -> &str {
    match description.rfind('/') {
        Some(index) => &description[index + 1..],
        None => description,
    }
}

/// One playable animation inside a choice.
#[derive(Debug, Clone, PartialEq)]
pub struct TlsaAnimation {
    pub id: u32,
    /// Descriptive path; its last segment usually hashes to `id`.
    pub description: String,
    pub duration_scale: f32,
    pub duration: f32,
}

impl Default for TlsaAnimation {
    fn default() -> Self {
        Self {
            id: 0,
            description: String::new(),
            duration_scale: 1.0,
            duration: -1.0,
        }
    }
}

/// One weighted alternative of a group.
#[derive(Debug, Clone, PartialEq)]
pub struct TlsaAnimationChoice {
    /// Cumulative upper bound of this choice's slice of [0, 1). The last
    /// choice's threshold is conceptually 1.0.
    pub probability_threshold: f32,
    pub animations: Vec<TlsaAnimation>,
}

impl Default for TlsaAnimationChoice {
    fn default() -> Self {
        Self {
            probability_threshold: 1.0,
            animations: Vec::new(),
        }
    }
}

/// A named animation group: metadata plus its weighted choices.
#[derive(Debug, Clone, PartialEq)]
pub struct TlsaAnimationGroup {
    pub id: u32,
    /// Only present in the new schema; old-schema groups keep it empty.
    pub name: String,
    pub priority_override: f32,
    pub blend_in_time: f32,
    pub idle: bool,
    pub allow_locomotion: bool,
    /// Version 10 only.
    pub randomize_choice_per_loop: bool,
    pub match_variant_for_tool_mask: u32,
    pub disable_tool_overlay_mask: u32,
    pub end_mode: i32,
    pub choices: Vec<TlsaAnimationChoice>,
}

impl Default for TlsaAnimationGroup {
    fn default() -> Self {
        Self {
            id: 0,
            name: String::new(),
            priority_override: 0.0,
            blend_in_time: -1.0,
            idle: false,
            allow_locomotion: false,
            randomize_choice_per_loop: false,
            match_variant_for_tool_mask: 0,
            disable_tool_overlay_mask: 0,
            end_mode: END_MODE_UNSET,
            choices: Vec::new(),
        }
    }
}

/// A whole animation-set document.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationSetUnit {
    pub version: u32,
    pub groups: Vec<TlsaAnimationGroup>,
}

impl Default for AnimationSetUnit {
    fn default() -> Self {
        Self {
            version: TLSA_VERSION,
            groups: Vec::new(),
        }
    }
}
