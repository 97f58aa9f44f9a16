//! ArgScript form of part capabilities
//!
//! `cap` lines list the capabilities; the hash-keyed mapping table is
//! derived state. Every `cap` implies a defining mapping under the file
//! hash of its name, and only the leftover aliases appear as explicit
//! `remap` lines, so the text form never spells out the table itself.

use super::{
    CapabilityMapping, CapabilityName, CapabilityUnit, DeformSpec, PCTP_VERSION,
};
use crate::argscript::{
    Diagnostics, Handled, Line, LineContext, LineProcessor, Stream, Writer, lexer,
};
use crate::error::{Error, Result};
use crate::formats::common::{NameResolver, fnv_hash, format_name, parse_file_id};
use indexmap::IndexMap;

/// Render capabilities as ArgScript text.
///
/// Capability names list alphabetically, exactly as the binary writer
/// orders them. Mapping entries whose key hashes a listed name are implied
/// by their `cap` lines; every other entry becomes a `remap` line whose
/// target is the capability sharing the mapping's index.
///
/// # Errors
///
/// Returns [`Error::RemapTargetMissing`] when a leftover mapping's index
/// matches no defining capability.
///
/// [`Error::RemapTargetMissing`]: crate::Error::RemapTargetMissing
pub fn capability_to_text(unit: &CapabilityUnit, resolver: &dyn NameResolver) -> Result<String> {
    let mut writer = Writer::new();

    writer.command("version").int(unit.version as i32);
    if unit.version > 3 {
        writer.command("priority").float(unit.priority);
    }
    writer.blank_line();

    let names = unit.sorted_names();
    let mut index_names: IndexMap<i32, &str> = IndexMap::new();
    let mut defining_keys: Vec<u32> = Vec::new();
    for name in &names {
        let hash = fnv_hash(&name.name);
        if let Some(mapping) = unit.capabilities_map.get(&hash) {
            index_names.insert(mapping.index, name.name.as_str());
            defining_keys.push(hash);
        }
    }

    for name in &names {
        writer.command("cap").arg(&name.name).arg(&name.identifier);
    }
    writer.blank_line();

    for (key, values) in &unit.aggregates {
        writer.command("aggregate").arg(key);
        for value in values {
            writer.arg(value);
        }
    }
    writer.blank_line();

    for (key, mapping) in &unit.capabilities_map {
        if defining_keys.contains(key) {
            continue;
        }
        let Some(target) = index_names.get(&mapping.index) else {
            return Err(Error::RemapTargetMissing {
                index: mapping.index,
            });
        };
        writer
            .command("remap")
            .arg(format_name(resolver, *key))
            .arg(*target);
    }
    writer.blank_line();

    for (key, specs) in &unit.deform_specs {
        writer.command("deformSpec").arg(key).start_block();
        for spec in specs {
            write_deform(&mut writer, spec, unit.version, resolver);
        }
        writer.end_block().command_end();
        writer.blank_line();
    }

    Ok(writer.finish())
}

fn write_deform(writer: &mut Writer, spec: &DeformSpec, version: u32, resolver: &dyn NameResolver) {
    writer
        .command("deform")
        .arg(format_name(resolver, spec.deform_id))
        .float(spec.range[0]);
    if version > 3 {
        writer.float(spec.range[1]);
    }
    writer.int(i32::from(spec.is_rendered()));
    writer.int(i32::from(spec.wraps()));
}

/// Parse ArgScript text into capabilities.
///
/// Problems accumulate in the returned [`Diagnostics`] instead of
/// aborting; the unit holds whatever parsed.
pub fn parse_pctp_text(text: &str, resolver: &dyn NameResolver) -> (CapabilityUnit, Diagnostics) {
    let mut processor = CapabilityProcessor::default();
    let mut stream = Stream::new(3, 4, resolver);
    let diagnostics = stream.process(text, &mut processor);
    let mut unit = processor.unit;
    if let Some(version) = stream.version() {
        unit.version = version as u32;
    }
    (unit, diagnostics)
}

#[derive(Default)]
struct CapabilityProcessor {
    unit: CapabilityUnit,
    /// Key of the deformSpec block being filled, when inside one.
    current_spec: Option<String>,
}

impl LineProcessor for CapabilityProcessor {
    fn command(
        &mut self,
        ctx: &LineContext<'_>,
        line: &Line,
        diagnostics: &mut Diagnostics,
    ) -> Handled {
        let keyword = line.keyword().to_lowercase();
        if ctx.depth > 0 {
            if keyword == "deform" {
                self.parse_deform(ctx, line, diagnostics);
                return Handled::Ok;
            }
            return Handled::Unknown;
        }
        match keyword.as_str() {
            "priority" => {
                if let Some(args) = line.args(diagnostics, 1) {
                    if let Some(value) =
                        diagnostics.capture(line.line_number(), lexer::parse_float(&args[0]))
                    {
                        self.unit.priority = value;
                    }
                }
                Handled::Ok
            }
            "cap" => {
                if let Some(args) = line.args(diagnostics, 2) {
                    self.unit.capability_names.push(CapabilityName {
                        name: args[0].clone(),
                        identifier: args[1].clone(),
                    });
                    let mapping = CapabilityMapping {
                        identifier: args[1].clone(),
                        index: self.unit.capability_names.len() as i32 - 1,
                    };
                    self.unit
                        .capabilities_map
                        .insert(ctx.resolver.hash_of(&args[0]), mapping);
                }
                Handled::Ok
            }
            "aggregate" => {
                if let Some(args) = line.args_range(diagnostics, 1, usize::MAX) {
                    self.unit
                        .aggregates
                        .insert(args[0].clone(), args[1..].to_vec());
                }
                Handled::Ok
            }
            "remap" => {
                if let Some(args) = line.args(diagnostics, 2) {
                    let key = diagnostics
                        .capture(line.line_number(), parse_file_id(ctx.resolver, &args[0]));
                    match self.unit.capabilities_map.get(&fnv_hash(&args[1])).cloned() {
                        Some(mapping) => {
                            if let Some(key) = key {
                                self.unit.capabilities_map.insert(key, mapping);
                            }
                        }
                        None => diagnostics.error(
                            line.line_number(),
                            format!("{} is not a defined capability", args[1]),
                        ),
                    }
                }
                Handled::Ok
            }
            "deformspec" => {
                self.current_spec = None;
                if let Some(args) = line.args(diagnostics, 1) {
                    self.unit.deform_specs.insert(args[0].clone(), Vec::new());
                    self.current_spec = Some(args[0].clone());
                }
                Handled::Block
            }
            _ => Handled::Unknown,
        }
    }

    fn block_end(&mut self, _ctx: &LineContext<'_>, _diagnostics: &mut Diagnostics) {
        self.current_spec = None;
    }
}

impl CapabilityProcessor {
    fn parse_deform(
        &mut self,
        ctx: &LineContext<'_>,
        line: &Line,
        diagnostics: &mut Diagnostics,
    ) {
        let version = ctx.version.unwrap_or(PCTP_VERSION as i32);
        let expected = if version > 3 { 5 } else { 4 };
        let mut entry = DeformSpec::default();

        if let Some(args) = line.args(diagnostics, expected) {
            if let Some(id) =
                diagnostics.capture(line.line_number(), parse_file_id(ctx.resolver, &args[0]))
            {
                entry.deform_id = id;
            }
            if let Some(value) =
                diagnostics.capture(line.line_number(), lexer::parse_float(&args[1]))
            {
                entry.range[0] = value;
            }
            let mut index = 2;
            if version > 3 {
                if let Some(value) =
                    diagnostics.capture(line.line_number(), lexer::parse_float(&args[2]))
                {
                    entry.range[1] = value;
                }
                index = 3;
            }
            if let Some(rendered) = diagnostics.capture(
                line.line_number(),
                lexer::parse_int(ctx.resolver, &args[index]),
            ) {
                if rendered == 0 {
                    entry.flags |= 1;
                }
            }
            if let Some(wrap) = diagnostics.capture(
                line.line_number(),
                lexer::parse_int(ctx.resolver, &args[index + 1]),
            ) {
                if wrap != 0 {
                    entry.flags |= 2;
                }
            }
        }

        if let Some(key) = &self.current_spec {
            if let Some(specs) = self.unit.deform_specs.get_mut(key) {
                specs.push(entry);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formats::common::HashRegistry;
    use pretty_assertions::assert_eq;

    fn sample_unit() -> CapabilityUnit {
        let mut capabilities_map = IndexMap::new();
        capabilities_map.insert(
            fnv_hash("Bite"),
            CapabilityMapping {
                identifier: "bite".to_string(),
                index: 0,
            },
        );
        capabilities_map.insert(
            fnv_hash("Grab"),
            CapabilityMapping {
                identifier: "grab".to_string(),
                index: 1,
            },
        );
        capabilities_map.insert(
            0x600D_F00D,
            CapabilityMapping {
                identifier: "bite".to_string(),
                index: 0,
            },
        );

        let mut aggregates = IndexMap::new();
        aggregates.insert("mout".to_string(), vec!["bite".to_string(), "grab".to_string()]);

        let mut deform_specs = IndexMap::new();
        deform_specs.insert(
            "bite".to_string(),
            vec![DeformSpec {
                deform_id: 0xAABB_CCDD,
                range: [0.25, 0.75],
                flags: 3,
            }],
        );

        CapabilityUnit {
            version: 4,
            priority: 2.5,
            capability_names: vec![
                CapabilityName {
                    name: "Bite".to_string(),
                    identifier: "bite".to_string(),
                },
                CapabilityName {
                    name: "Grab".to_string(),
                    identifier: "grab".to_string(),
                },
            ],
            capabilities_map,
            aggregates,
            deform_specs,
        }
    }

    #[test]
    fn test_text_round_trip() {
        let registry = HashRegistry::new();
        let unit = sample_unit();
        let text = capability_to_text(&unit, &registry).unwrap();
        let (reread, diagnostics) = parse_pctp_text(&text, &registry);
        assert!(!diagnostics.has_errors(), "{:?}", diagnostics.errors);
        assert_eq!(reread, unit);
    }

    #[test]
    fn test_cap_lines_sort_alphabetically() {
        let registry = HashRegistry::new();
        let mut capabilities_map = IndexMap::new();
        for (index, name) in ["Zeta", "Alpha", "Mu"].iter().enumerate() {
            capabilities_map.insert(
                fnv_hash(name),
                CapabilityMapping {
                    identifier: name.to_lowercase(),
                    index: index as i32,
                },
            );
        }
        let unit = CapabilityUnit {
            capability_names: vec![
                CapabilityName {
                    name: "Zeta".to_string(),
                    identifier: "zeta".to_string(),
                },
                CapabilityName {
                    name: "Alpha".to_string(),
                    identifier: "alph".to_string(),
                },
                CapabilityName {
                    name: "Mu".to_string(),
                    identifier: "muuu".to_string(),
                },
            ],
            capabilities_map,
            ..CapabilityUnit::default()
        };

        let text = capability_to_text(&unit, &registry).unwrap();
        let caps: Vec<&str> = text
            .lines()
            .filter(|line| line.starts_with("cap "))
            .collect();
        assert_eq!(caps, ["cap Alpha alph", "cap Mu muuu", "cap Zeta zeta"]);
    }

    #[test]
    fn test_remap_partition() {
        let registry = HashRegistry::new();
        let mut capabilities_map = IndexMap::new();
        capabilities_map.insert(
            fnv_hash("Alpha"),
            CapabilityMapping {
                identifier: "alph".to_string(),
                index: 0,
            },
        );
        capabilities_map.insert(
            0x600D_F00D,
            CapabilityMapping {
                identifier: "alph".to_string(),
                index: 0,
            },
        );
        let unit = CapabilityUnit {
            capability_names: vec![CapabilityName {
                name: "Alpha".to_string(),
                identifier: "alph".to_string(),
            }],
            capabilities_map,
            ..CapabilityUnit::default()
        };

        let text = capability_to_text(&unit, &registry).unwrap();
        let caps: Vec<&str> = text
            .lines()
            .filter(|line| line.starts_with("cap "))
            .collect();
        let remaps: Vec<&str> = text
            .lines()
            .filter(|line| line.starts_with("remap "))
            .collect();
        assert_eq!(caps, ["cap Alpha alph"]);
        assert_eq!(remaps, ["remap 0x600DF00D Alpha"]);
    }

    #[test]
    fn test_deform_flags_invert_rendered() {
        let registry = HashRegistry::new();
        let mut deform_specs = IndexMap::new();
        deform_specs.insert(
            "grab".to_string(),
            (0..4)
                .map(|flags| DeformSpec {
                    deform_id: 1,
                    range: [0.0, 1.0],
                    flags,
                })
                .collect(),
        );
        let unit = CapabilityUnit {
            deform_specs,
            ..CapabilityUnit::default()
        };

        let text = capability_to_text(&unit, &registry).unwrap();
        let tails: Vec<&str> = text
            .lines()
            .filter_map(|line| line.trim().strip_prefix("deform 0x00000001 0 1 "))
            .collect();
        assert_eq!(tails, ["1 0", "0 0", "1 1", "0 1"]);

        let (reread, diagnostics) = parse_pctp_text(&text, &registry);
        assert!(!diagnostics.has_errors());
        let flags: Vec<i32> = reread.deform_specs["grab"]
            .iter()
            .map(|spec| spec.flags)
            .collect();
        assert_eq!(flags, [0, 1, 2, 3]);
    }

    #[test]
    fn test_version_3_deform_takes_four_args() {
        let registry = HashRegistry::new();
        let text = "version 3\n\
                    deformSpec grab\n\
                    \tdeform 0x11223344 0.5 1 0\n\
                    end\n";
        let (unit, diagnostics) = parse_pctp_text(text, &registry);
        assert!(!diagnostics.has_errors(), "{:?}", diagnostics.errors);
        assert_eq!(unit.version, 3);
        let spec = &unit.deform_specs["grab"][0];
        assert_eq!(spec.deform_id, 0x1122_3344);
        assert_eq!(spec.range, [0.5, 1.0]);
        assert_eq!(spec.flags, 0);
    }

    #[test]
    fn test_undefined_remap_target_is_reported() {
        let registry = HashRegistry::new();
        let (_, diagnostics) = parse_pctp_text("version 4\nremap 0x12345678 Phantom\n", &registry);
        assert_eq!(diagnostics.errors.len(), 1);
        assert_eq!(
            diagnostics.errors[0].message,
            "Phantom is not a defined capability"
        );
        assert_eq!(diagnostics.errors[0].line, 2);
    }

    #[test]
    fn test_orphan_remap_index_fails_to_write() {
        let registry = HashRegistry::new();
        let mut capabilities_map = IndexMap::new();
        capabilities_map.insert(
            0xDEAD_BEEF,
            CapabilityMapping {
                identifier: "xxxx".to_string(),
                index: 7,
            },
        );
        let unit = CapabilityUnit {
            capabilities_map,
            ..CapabilityUnit::default()
        };
        assert!(matches!(
            capability_to_text(&unit, &registry),
            Err(Error::RemapTargetMissing { index: 7 })
        ));
    }
}
