//! ArgScript form of animation sets
//!
//! Each group renders as an `anim` block holding its metadata plus one
//! `choice` block per alternative. The stored cumulative thresholds never
//! appear in text: each choice writes its own incremental probability
//! (`threshold[i] - threshold[i-1]`), and the parser converts back to
//! cumulative form once the group block closes, distributing any
//! unspecified remainder evenly.

use super::{
    AnimationSetUnit, END_MODE_UNSET, TLSA_VERSION, TlsaAnimation, TlsaAnimationChoice,
    TlsaAnimationGroup, instance_from_description,
};
use crate::argscript::{
    Diagnostics, Handled, Line, LineContext, LineProcessor, Stream, Writer, lexer,
};
use crate::formats::common::{NameResolver, fnv_hash, format_name, parse_file_id};

/// Render an animation set as ArgScript text.
#[must_use]
pub fn animation_set_to_text(unit: &AnimationSetUnit, resolver: &dyn NameResolver) -> String {
    let mut writer = Writer::new();
    writer.command("version").int(unit.version as i32);
    for group in &unit.groups {
        writer.blank_line();
        write_group(&mut writer, group, unit.version, resolver);
    }
    writer.finish()
}

/// Parse ArgScript text into an animation set.
///
/// Problems accumulate in the returned [`Diagnostics`] instead of
/// aborting; groups that fail probability or end-mode validation are
/// dropped, the rest of the document still parses.
pub fn parse_tlsa_text(text: &str, resolver: &dyn NameResolver) -> (AnimationSetUnit, Diagnostics) {
    let mut processor = AnimationSetProcessor::default();
    let mut stream = Stream::new(7, 10, resolver);
    let diagnostics = stream.process(text, &mut processor);
    let mut unit = processor.unit;
    if let Some(version) = stream.version() {
        unit.version = version as u32;
    }
    (unit, diagnostics)
}

fn write_group(
    writer: &mut Writer,
    group: &TlsaAnimationGroup,
    version: u32,
    resolver: &dyn NameResolver,
) {
    writer.command("anim").arg(format_name(resolver, group.id));
    if !group.name.is_empty() {
        writer.literal(&group.name);
    }
    writer.start_block();

    if version == 10 && group.randomize_choice_per_loop {
        writer.command("randomizeChoicePerLoop").bool_arg(true);
    }
    writer.command("endMode").int(group.end_mode);
    if group.idle {
        writer.command("idle").bool_arg(true);
    }
    if group.blend_in_time != -1.0 {
        writer.command("blendInTime").float(group.blend_in_time);
    }
    writer
        .command("allowLocomotion")
        .bool_arg(group.allow_locomotion);

    if group.disable_tool_overlay_mask != 0 {
        writer.command("disableToolOverlay");
        write_mask_bits(writer, group.disable_tool_overlay_mask);
    }
    if group.match_variant_for_tool_mask != 0 {
        writer.command("matchVariantForTool");
        write_mask_bits(writer, group.match_variant_for_tool_mask);
    }
    if version >= 8 {
        writer.command("priorityOverride").float(group.priority_override);
    }

    let mut accumulated = 0.0f32;
    for choice in &group.choices {
        writer.blank_line();
        writer.command("choice");
        if version > 8 {
            writer
                .option("probability")
                .float(choice.probability_threshold - accumulated);
        }
        writer.start_block();
        for animation in &choice.animations {
            write_animation(writer, animation, resolver);
        }
        writer.end_block().command_end();
        accumulated = choice.probability_threshold;
    }

    writer.end_block().command_end();
}

fn write_mask_bits(writer: &mut Writer, mask: u32) {
    for bit in 0..32 {
        if mask & (1 << bit) != 0 {
            writer.int(bit);
        }
    }
}

fn write_animation(writer: &mut Writer, animation: &TlsaAnimation, resolver: &dyn NameResolver) {
    writer.command("animation").literal(&animation.description);
    if fnv_hash(instance_from_description(&animation.description)) != animation.id {
        writer
            .option("instanceID")
            .arg(format_name(resolver, animation.id));
    }
    if animation.duration_scale != 1.0 {
        writer.option("durationScale").float(animation.duration_scale);
    }
    if animation.duration != -1.0 {
        writer.option("duration").float(animation.duration);
    }
}

/// A group mid-parse: the fields so far plus each choice's explicit
/// probability, kept apart until reconciliation at block close.
struct GroupBuilder {
    group: TlsaAnimationGroup,
    probabilities: Vec<Option<f32>>,
    /// Line of the opening `anim` command, for block-close diagnostics.
    line: usize,
}

#[derive(Default)]
struct AnimationSetProcessor {
    unit: AnimationSetUnit,
    current: Option<GroupBuilder>,
}

impl LineProcessor for AnimationSetProcessor {
    fn command(
        &mut self,
        ctx: &LineContext<'_>,
        line: &Line,
        diagnostics: &mut Diagnostics,
    ) -> Handled {
        let keyword = line.keyword().to_lowercase();
        match ctx.depth {
            0 => {
                if keyword == "anim" {
                    self.start_group(ctx, line, diagnostics);
                    return Handled::Block;
                }
                Handled::Unknown
            }
            1 => self.group_command(ctx, &keyword, line, diagnostics),
            _ => {
                if keyword == "animation" {
                    self.parse_animation(ctx, line, diagnostics);
                    return Handled::Ok;
                }
                Handled::Unknown
            }
        }
    }

    fn block_end(&mut self, ctx: &LineContext<'_>, diagnostics: &mut Diagnostics) {
        // Depth is already back to the enclosing level here; 0 means the
        // `anim` block itself closed.
        if ctx.depth == 0 {
            self.finish_group(diagnostics);
        }
    }
}

impl AnimationSetProcessor {
    fn start_group(&mut self, ctx: &LineContext<'_>, line: &Line, diagnostics: &mut Diagnostics) {
        let mut builder = GroupBuilder {
            group: TlsaAnimationGroup::default(),
            probabilities: Vec::new(),
            line: line.line_number(),
        };
        if let Some(args) = line.args_range(diagnostics, 1, 2) {
            if let Some(id) =
                diagnostics.capture(line.line_number(), parse_file_id(ctx.resolver, &args[0]))
            {
                builder.group.id = id;
            }
            if args.len() > 1 {
                builder.group.name = args[1].clone();
            }
        }
        self.current = Some(builder);
    }

    fn group_command(
        &mut self,
        ctx: &LineContext<'_>,
        keyword: &str,
        line: &Line,
        diagnostics: &mut Diagnostics,
    ) -> Handled {
        let Some(builder) = self.current.as_mut() else {
            return Handled::Unknown;
        };
        let group = &mut builder.group;
        match keyword {
            "randomizechoiceperloop" => {
                set_bool(ctx, &mut group.randomize_choice_per_loop, line, diagnostics);
            }
            "endmode" => set_int(ctx, &mut group.end_mode, line, diagnostics),
            "idle" => set_bool(ctx, &mut group.idle, line, diagnostics),
            "blendintime" => set_float(&mut group.blend_in_time, line, diagnostics),
            "allowlocomotion" => set_bool(ctx, &mut group.allow_locomotion, line, diagnostics),
            "disabletooloverlay" => {
                set_mask(ctx, &mut group.disable_tool_overlay_mask, line, diagnostics);
            }
            "matchvariantfortool" => {
                set_mask(ctx, &mut group.match_variant_for_tool_mask, line, diagnostics);
            }
            "priorityoverride" => set_float(&mut group.priority_override, line, diagnostics),
            "choice" => {
                let mut probability = None;
                if let Some(args) = line.option_args(diagnostics, "probability", 1) {
                    probability =
                        diagnostics.capture(line.line_number(), lexer::parse_float(&args[0]));
                }
                group.choices.push(TlsaAnimationChoice {
                    probability_threshold: 0.0,
                    animations: Vec::new(),
                });
                builder.probabilities.push(probability);

                let version = ctx.version.unwrap_or(TLSA_VERSION as i32);
                if version <= 8 && builder.group.choices.len() > 1 {
                    diagnostics.error(
                        line.line_number(),
                        "Only versions > 8 can use more than one animation choice.",
                    );
                }
                return Handled::Block;
            }
            _ => return Handled::Unknown,
        }
        Handled::Ok
    }

    fn parse_animation(&mut self, ctx: &LineContext<'_>, line: &Line, diagnostics: &mut Diagnostics) {
        let mut animation = TlsaAnimation::default();
        if let Some(args) = line.args(diagnostics, 1) {
            animation.description = args[0].clone();
        }
        match line.option_args(diagnostics, "instanceID", 1) {
            Some(args) => {
                if let Some(id) =
                    diagnostics.capture(line.line_number(), parse_file_id(ctx.resolver, &args[0]))
                {
                    animation.id = id;
                }
            }
            None => {
                animation.id = ctx
                    .resolver
                    .hash_of(instance_from_description(&animation.description));
            }
        }
        if let Some(args) = line.option_args(diagnostics, "durationScale", 1) {
            if let Some(value) =
                diagnostics.capture(line.line_number(), lexer::parse_float(&args[0]))
            {
                animation.duration_scale = value;
            }
        }
        if let Some(args) = line.option_args(diagnostics, "duration", 1) {
            if let Some(value) =
                diagnostics.capture(line.line_number(), lexer::parse_float(&args[0]))
            {
                animation.duration = value;
            }
        }

        if let Some(choice) = self
            .current
            .as_mut()
            .and_then(|builder| builder.group.choices.last_mut())
        {
            choice.animations.push(animation);
        }
    }

    /// Probability reconciliation at `anim` block close: incremental
    /// per-choice amounts become cumulative thresholds, with the
    /// unspecified remainder split evenly.
    fn finish_group(&mut self, diagnostics: &mut Diagnostics) {
        let Some(builder) = self.current.take() else {
            return;
        };
        let mut group = builder.group;

        let specified: f32 = builder.probabilities.iter().flatten().sum();
        // Should be 1.0, but hand-written scripts are rarely exact.
        if specified > 1.1 {
            diagnostics.error(builder.line, "Total probability > 1.0");
            return;
        }
        let unspecified = builder
            .probabilities
            .iter()
            .filter(|probability| probability.is_none())
            .count();
        let remainder = if unspecified > 0 {
            (1.0 - specified) / unspecified as f32
        } else {
            0.0
        };

        let mut last = 0.0f32;
        for (choice, probability) in group.choices.iter_mut().zip(&builder.probabilities) {
            choice.probability_threshold = last + probability.unwrap_or(remainder);
            last = choice.probability_threshold;
        }

        if group.end_mode == END_MODE_UNSET {
            diagnostics.error(builder.line, "No endMode specified");
            return;
        }
        self.unit.groups.push(group);
    }
}

fn set_int(ctx: &LineContext<'_>, target: &mut i32, line: &Line, diagnostics: &mut Diagnostics) {
    if let Some(args) = line.args(diagnostics, 1) {
        if let Some(value) =
            diagnostics.capture(line.line_number(), lexer::parse_int(ctx.resolver, &args[0]))
        {
            *target = value;
        }
    }
}

fn set_float(target: &mut f32, line: &Line, diagnostics: &mut Diagnostics) {
    if let Some(args) = line.args(diagnostics, 1) {
        if let Some(value) = diagnostics.capture(line.line_number(), lexer::parse_float(&args[0])) {
            *target = value;
        }
    }
}

fn set_bool(ctx: &LineContext<'_>, target: &mut bool, line: &Line, diagnostics: &mut Diagnostics) {
    if let Some(args) = line.args(diagnostics, 1) {
        if let Some(value) =
            diagnostics.capture(line.line_number(), lexer::parse_bool(ctx.resolver, &args[0]))
        {
            *target = value;
        }
    }
}

/// One `disableToolOverlay`/`matchVariantForTool` line: a list of bit
/// indices. Out-of-range indices warn and are skipped; the rest of the
/// line still applies.
fn set_mask(ctx: &LineContext<'_>, target: &mut u32, line: &Line, diagnostics: &mut Diagnostics) {
    let Some(args) = line.args_range(diagnostics, 1, usize::MAX) else {
        return;
    };
    for arg in args {
        match lexer::parse_int(ctx.resolver, arg) {
            Ok(value) if value < 0 => {
                diagnostics.warning(line.line_number(), "Cannot have a negative index.");
            }
            Ok(value) if value > 31 => {
                diagnostics.warning(line.line_number(), "Cannot have an index greater than 31.");
            }
            Ok(value) => *target |= 1 << value,
            Err(message) => diagnostics.error(line.line_number(), message),
        }
    }
}
