//! ArgScript form of a level
//!
//! Each marker renders as a `marker <type>` block holding `position` and
//! `orientation` plus the payload's own commands. Payload fields follow the
//! default-suppression rule: a command is only emitted when the field
//! differs from its schema default, so a freshly placed marker produces a
//! minimal script. `number` is the one exception and is always written.

use super::{
    CreatureArchetype, GameplayMarker, LevelDocument, MIGRATION_TYPE_NAMES, MarkerData,
    MigrationPoint, NEST_TYPE_NAMES, PERSONALITY_NAMES,
};
use crate::argscript::{Diagnostics, Handled, Line, LineContext, LineProcessor, Stream, Writer, lexer};
use crate::formats::common::{NameResolver, format_int32, format_name, parse_file_id};

/// Render a level as ArgScript text.
#[must_use]
pub fn level_to_text(document: &LevelDocument, resolver: &dyn NameResolver) -> String {
    let mut writer = Writer::new();
    for marker in &document.markers {
        write_marker(&mut writer, marker, resolver);
        writer.blank_line();
    }
    writer.finish()
}

/// Parse ArgScript text into a level.
///
/// Problems accumulate in the returned [`Diagnostics`] instead of aborting,
/// so one pass reports everything; the document holds whatever parsed.
pub fn parse_lvl_text(text: &str, resolver: &dyn NameResolver) -> (LevelDocument, Diagnostics) {
    let mut processor = LevelProcessor::default();
    let mut stream = Stream::new(2, 3, resolver);
    let diagnostics = stream.process(text, &mut processor);
    (processor.document, diagnostics)
}

fn write_marker(writer: &mut Writer, marker: &GameplayMarker, resolver: &dyn NameResolver) {
    writer
        .command("marker")
        .arg(format_name(resolver, marker.marker_type));
    if marker.id != 0 || marker.definition_id != 0 {
        writer
            .option("id")
            .arg(format_name(resolver, marker.id))
            .arg(format_name(resolver, marker.definition_id));
    }
    writer.start_block();

    writer.command("position").vector3(marker.offset);
    writer.command("orientation").vector4(marker.orientation);

    match &marker.data {
        MarkerData::CreatureArchetype(data) => {
            write_payload_header(writer, resolver, data.group, data.property_count);
            write_creature(writer, data);
        }
        MarkerData::MigrationPoint(data) => {
            write_payload_header(writer, resolver, data.group, data.property_count);
            write_migration(writer, data);
        }
        MarkerData::Unknown(_) => {}
    }

    writer.end_block().command_end();
}

fn write_payload_header(
    writer: &mut Writer,
    resolver: &dyn NameResolver,
    group: i32,
    property_count: i32,
) {
    writer.blank_line();
    if group != 0 {
        writer.command("group").arg(format_int32(resolver, group));
    }
    if property_count != 0 {
        writer.command("propertyCount").int(property_count);
    }
}

fn write_creature(writer: &mut Writer, data: &CreatureArchetype) {
    if data.nest_type != 1 {
        writer
            .command("nestType")
            .arg(enum_label(NEST_TYPE_NAMES, data.nest_type));
    }
    if data.override_herd_size != 0 {
        writer.command("overrideHerdSize").int(data.override_herd_size);
    }
    if data.personality != 0 {
        writer
            .command("personality")
            .arg(enum_label(PERSONALITY_NAMES, data.personality));
    }
    if data.without_nest {
        writer.command("withoutNest").bool_arg(true);
    }
    if data.scale_multiplier != 0.0 {
        writer.command("scaleMultiplier").float(data.scale_multiplier);
    }
    if data.hitpoint_override != 0.0 {
        writer.command("hitpointOverride").float(data.hitpoint_override);
    }
    if data.damage_multiplier != 0.0 {
        writer.command("damageMultiplier").float(data.damage_multiplier);
    }
    if data.territory_radius != 0.0 {
        writer.command("territoryRadius").float(data.territory_radius);
    }
    if data.activate_at_brain_level != 0 {
        writer
            .command("activateAtBrainLevel")
            .int(data.activate_at_brain_level);
    }
    if data.deactivate_above_brain_level != 5 {
        writer
            .command("deactivateAboveBrainLevel")
            .int(data.deactivate_above_brain_level);
    }
}

fn write_migration(writer: &mut Writer, data: &MigrationPoint) {
    writer.command("number").int(data.number);
    if data.radius_multiplier != 0.0 {
        writer.command("radiusMultiplier").float(data.radius_multiplier);
    }
    if data.point_type != 0 {
        writer
            .command("type")
            .arg(enum_label(MIGRATION_TYPE_NAMES, data.point_type));
    }
    if data.field_128 != 0 {
        writer.command("field_128").int(data.field_128);
    }
    if data.field_12c != 0 {
        writer.command("field_12C").int(data.field_12c);
    }
    if data.field_130 != 0 {
        writer.command("field_130").int(data.field_130);
    }
}

/// A table value's display label, or the bare number for values outside
/// the table.
fn enum_label(table: &[(i32, &str)], value: i32) -> String {
    table
        .iter()
        .find(|(known, _)| *known == value)
        .map_or_else(|| value.to_string(), |(_, name)| (*name).to_string())
}

/// A label's table value. Accepts a plain integer too, so out-of-table
/// values survive a text round-trip.
fn enum_value(
    resolver: &dyn NameResolver,
    table: &[(i32, &str)],
    line_number: usize,
    token: &str,
    diagnostics: &mut Diagnostics,
) -> Option<i32> {
    if let Some((value, _)) = table
        .iter()
        .find(|(_, name)| name.eq_ignore_ascii_case(token))
    {
        return Some(*value);
    }
    match lexer::parse_int(resolver, token) {
        Ok(value) => Some(value),
        Err(_) => {
            diagnostics.error(
                line_number,
                format!("'{token}' is not a valid value for this enum."),
            );
            None
        }
    }
}

#[derive(Default)]
struct LevelProcessor {
    document: LevelDocument,
}

impl LineProcessor for LevelProcessor {
    fn command(
        &mut self,
        ctx: &LineContext<'_>,
        line: &Line,
        diagnostics: &mut Diagnostics,
    ) -> Handled {
        let keyword = line.keyword().to_lowercase();
        if ctx.depth == 0 {
            if keyword == "marker" {
                self.start_marker(ctx, line, diagnostics);
                return Handled::Block;
            }
            return Handled::Unknown;
        }
        self.marker_command(ctx, &keyword, line, diagnostics)
    }
}

impl LevelProcessor {
    fn start_marker(
        &mut self,
        ctx: &LineContext<'_>,
        line: &Line,
        diagnostics: &mut Diagnostics,
    ) {
        let mut marker = GameplayMarker::default();

        if let Some(args) = line.args(diagnostics, 1) {
            if let Some(marker_type) =
                diagnostics.capture(line.line_number(), parse_file_id(ctx.resolver, &args[0]))
            {
                marker.marker_type = marker_type;
                marker.data = MarkerData::for_type(marker_type);
            }
        }

        if let Some(args) = line.option_args(diagnostics, "id", 2) {
            if let Some(id) =
                diagnostics.capture(line.line_number(), parse_file_id(ctx.resolver, &args[0]))
            {
                marker.id = id;
                if let Some(definition_id) =
                    diagnostics.capture(line.line_number(), parse_file_id(ctx.resolver, &args[1]))
                {
                    marker.definition_id = definition_id;
                }
            }
        }

        self.document.markers.push(marker);
    }

    fn marker_command(
        &mut self,
        ctx: &LineContext<'_>,
        keyword: &str,
        line: &Line,
        diagnostics: &mut Diagnostics,
    ) -> Handled {
        let Some(marker) = self.document.markers.last_mut() else {
            return Handled::Unknown;
        };
        match keyword {
            "position" => {
                if let Some(args) = line.args(diagnostics, 1) {
                    if let Some(value) =
                        diagnostics.capture(line.line_number(), lexer::parse_vector3(&args[0]))
                    {
                        marker.offset = value;
                    }
                }
                Handled::Ok
            }
            "orientation" => {
                if let Some(args) = line.args(diagnostics, 1) {
                    if let Some(value) =
                        diagnostics.capture(line.line_number(), lexer::parse_vector4(&args[0]))
                    {
                        marker.orientation = value;
                    }
                }
                Handled::Ok
            }
            // Markers without a payload codec accept these but store nothing.
            "group" => {
                if let Some((group, _)) = payload_header_mut(&mut marker.data) {
                    set_int(ctx, group, line, diagnostics);
                }
                Handled::Ok
            }
            "propertycount" => {
                if let Some((_, property_count)) = payload_header_mut(&mut marker.data) {
                    set_int(ctx, property_count, line, diagnostics);
                }
                Handled::Ok
            }
            _ => match &mut marker.data {
                MarkerData::CreatureArchetype(data) => {
                    creature_command(ctx, data, keyword, line, diagnostics)
                }
                MarkerData::MigrationPoint(data) => {
                    migration_command(ctx, data, keyword, line, diagnostics)
                }
                MarkerData::Unknown(_) => Handled::Unknown,
            },
        }
    }
}

fn payload_header_mut(data: &mut MarkerData) -> Option<(&mut i32, &mut i32)> {
    match data {
        MarkerData::CreatureArchetype(data) => Some((&mut data.group, &mut data.property_count)),
        MarkerData::MigrationPoint(data) => Some((&mut data.group, &mut data.property_count)),
        MarkerData::Unknown(_) => None,
    }
}

fn creature_command(
    ctx: &LineContext<'_>,
    data: &mut CreatureArchetype,
    keyword: &str,
    line: &Line,
    diagnostics: &mut Diagnostics,
) -> Handled {
    match keyword {
        "nesttype" => set_enum(ctx, NEST_TYPE_NAMES, &mut data.nest_type, line, diagnostics),
        "overrideherdsize" => set_int(ctx, &mut data.override_herd_size, line, diagnostics),
        "personality" => set_enum(ctx, PERSONALITY_NAMES, &mut data.personality, line, diagnostics),
        "withoutnest" => set_bool(ctx, &mut data.without_nest, line, diagnostics),
        "scalemultiplier" => set_float(&mut data.scale_multiplier, line, diagnostics),
        "hitpointoverride" => set_float(&mut data.hitpoint_override, line, diagnostics),
        "damagemultiplier" => set_float(&mut data.damage_multiplier, line, diagnostics),
        "territoryradius" => set_float(&mut data.territory_radius, line, diagnostics),
        "activateatbrainlevel" => set_int(ctx, &mut data.activate_at_brain_level, line, diagnostics),
        "deactivateabovebrainlevel" => {
            set_int(ctx, &mut data.deactivate_above_brain_level, line, diagnostics);
        }
        _ => return Handled::Unknown,
    }
    Handled::Ok
}

fn migration_command(
    ctx: &LineContext<'_>,
    data: &mut MigrationPoint,
    keyword: &str,
    line: &Line,
    diagnostics: &mut Diagnostics,
) -> Handled {
    match keyword {
        "number" => set_int(ctx, &mut data.number, line, diagnostics),
        "radiusmultiplier" => set_float(&mut data.radius_multiplier, line, diagnostics),
        "type" => set_enum(ctx, MIGRATION_TYPE_NAMES, &mut data.point_type, line, diagnostics),
        "field_128" => set_int(ctx, &mut data.field_128, line, diagnostics),
        "field_12c" => set_int(ctx, &mut data.field_12c, line, diagnostics),
        "field_130" => set_int(ctx, &mut data.field_130, line, diagnostics),
        _ => return Handled::Unknown,
    }
    Handled::Ok
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

fn set_enum(
    ctx: &LineContext<'_>,
    table: &[(i32, &str)],
    target: &mut i32,
    line: &Line,
    diagnostics: &mut Diagnostics,
) {
    if let Some(args) = line.args(diagnostics, 1) {
        if let Some(value) =
            enum_value(ctx.resolver, table, line.line_number(), &args[0], diagnostics)
        {
            *target = value;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::marker_types;
    use super::*;
    use crate::formats::common::HashRegistry;
    use glam::{Vec3, Vec4};
    use pretty_assertions::assert_eq;

    fn registry() -> HashRegistry {
        let mut registry = HashRegistry::new();
        registry.add_alias("CreatureArchetype", marker_types::CREATURE_ARCHETYPE);
        registry.add_alias("MigrationPoint", marker_types::MIGRATION_POINT);
        registry
    }

    fn creature_marker(data: CreatureArchetype) -> GameplayMarker {
        GameplayMarker {
            offset: Vec3::new(1.0, 2.0, 3.0),
            orientation: Vec4::new(0.0, 0.0, 0.0, 1.0),
            marker_type: marker_types::CREATURE_ARCHETYPE,
            id: 0,
            definition_id: 0,
            data: MarkerData::CreatureArchetype(data),
        }
    }

    #[test]
    fn test_all_default_payload_has_empty_body() {
        let document = LevelDocument {
            markers: vec![creature_marker(CreatureArchetype::default())],
        };
        let text = level_to_text(&document, &registry());
        assert_eq!(
            text,
            "marker CreatureArchetype\n\
             \tposition (1, 2, 3)\n\
             \torientation (0, 0, 0, 1)\n\
             \n\
             end\n"
        );
    }

    #[test]
    fn test_one_changed_field_emits_one_line() {
        let document = LevelDocument {
            markers: vec![creature_marker(CreatureArchetype {
                territory_radius: 40.0,
                ..CreatureArchetype::default()
            })],
        };
        let text = level_to_text(&document, &registry());
        let payload_lines: Vec<&str> = text
            .lines()
            .filter(|line| {
                let trimmed = line.trim();
                !trimmed.is_empty()
                    && !trimmed.starts_with("marker")
                    && !trimmed.starts_with("position")
                    && !trimmed.starts_with("orientation")
                    && trimmed != "end"
            })
            .collect();
        assert_eq!(payload_lines, ["\tterritoryRadius 40"]);
    }

    #[test]
    fn test_text_round_trip() {
        let registry = registry();
        let document = LevelDocument {
            markers: vec![
                GameplayMarker {
                    offset: Vec3::new(-4.0, 0.5, 12.0),
                    orientation: Vec4::new(0.0, 0.7071, 0.0, 0.7071),
                    marker_type: marker_types::CREATURE_ARCHETYPE,
                    id: 0xAAAA_0001,
                    definition_id: 0xBBBB_0002,
                    data: MarkerData::CreatureArchetype(CreatureArchetype {
                        group: 0x1234_5678,
                        property_count: 2,
                        nest_type: 0,
                        personality: 8,
                        without_nest: true,
                        scale_multiplier: 1.25,
                        deactivate_above_brain_level: 3,
                        ..CreatureArchetype::default()
                    }),
                },
                GameplayMarker {
                    offset: Vec3::ZERO,
                    orientation: Vec4::ZERO,
                    marker_type: marker_types::MIGRATION_POINT,
                    id: 0,
                    definition_id: 0,
                    data: MarkerData::MigrationPoint(MigrationPoint {
                        number: 7,
                        radius_multiplier: 2.0,
                        point_type: 4,
                        field_12c: 9,
                        ..MigrationPoint::default()
                    }),
                },
            ],
        };

        let text = level_to_text(&document, &registry);
        let (reread, diagnostics) = parse_lvl_text(&text, &registry);
        assert!(!diagnostics.has_errors(), "{:?}", diagnostics.errors);
        assert_eq!(reread, document);
    }

    #[test]
    fn test_enum_tokens_parse_by_name_or_number() {
        let registry = registry();
        let text = "marker CreatureArchetype\n\
                    \tnestType Rocky\n\
                    \tpersonality 9\n\
                    end\n";
        let (document, diagnostics) = parse_lvl_text(text, &registry);
        assert!(!diagnostics.has_errors());
        let MarkerData::CreatureArchetype(data) = &document.markers[0].data else {
            panic!("expected a creature payload");
        };
        assert_eq!(data.nest_type, 2);
        assert_eq!(data.personality, 9);
    }

    #[test]
    fn test_bad_enum_token_is_reported() {
        let registry = registry();
        let (_, diagnostics) = parse_lvl_text(
            "marker CreatureArchetype\n\tnestType Swampy\nend\n",
            &registry,
        );
        assert_eq!(diagnostics.errors.len(), 1);
        assert_eq!(
            diagnostics.errors[0].message,
            "'Swampy' is not a valid value for this enum."
        );
        assert_eq!(diagnostics.errors[0].line, 2);
    }

    #[test]
    fn test_unknown_marker_type_ignores_payload_header() {
        let registry = registry();
        let text = "marker 0x0BADF00D\n\
                    \tposition (1, 1, 1)\n\
                    \tgroup 4\n\
                    end\n";
        let (document, diagnostics) = parse_lvl_text(text, &registry);
        assert!(!diagnostics.has_errors());
        assert_eq!(document.markers[0].data, MarkerData::Unknown(Vec::new()));
    }

    #[test]
    fn test_id_option_round_trips() {
        let registry = registry();
        let text = "marker MigrationPoint -id 0x00000005 0x00000006\nend\n";
        let (document, diagnostics) = parse_lvl_text(text, &registry);
        assert!(!diagnostics.has_errors());
        assert_eq!(document.markers[0].id, 5);
        assert_eq!(document.markers[0].definition_id, 6);
    }
}
