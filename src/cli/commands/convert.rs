//! CLI interface for format conversion
use std::path::Path;

use crate::cli::expand_path;
use crate::converter;
use crate::formats::common::NameResolver;

pub fn execute(
    source: &Path,
    destination: &Path,
    input_format: Option<&str>,
    output_format: Option<&str>,
    resolver: &dyn NameResolver,
) -> anyhow::Result<()> {
    let source = expand_path(source);
    let destination = expand_path(destination);
    println!("Converting {source:?} to {destination:?}");

    // Auto-detect or use provided formats
    let input = if let Some(fmt) = input_format {
        fmt.to_lowercase()
    } else {
        source
            .extension()
            .and_then(|s| s.to_str())
            .map(str::to_lowercase)
            .ok_or_else(|| anyhow::anyhow!("Cannot detect input format from source file extension"))?
    };

    let output = if let Some(fmt) = output_format {
        fmt.to_lowercase()
    } else {
        destination
            .extension()
            .and_then(|s| s.to_str())
            .map(str::to_lowercase)
            .ok_or_else(|| {
                anyhow::anyhow!("Cannot detect output format from destination file extension")
            })?
    };

    // Execute conversion based on input/output format
    match (input.as_str(), output.as_str()) {
        // Texture conversions
        ("raster", "dds") => {
            println!("Converting Raster -> DDS");
            converter::convert_raster_to_dds(&source, &destination)?;
        }
        ("dds", "raster") => {
            println!("Converting DDS -> Raster");
            converter::convert_dds_to_raster(&source, &destination)?;
        }

        // Level marker conversions
        ("lvl", "lvl_t") => {
            println!("Converting LVL -> text");
            converter::convert_lvl_to_text(&source, &destination, resolver)?;
        }
        ("lvl_t", "lvl") => {
            println!("Converting text -> LVL");
            converter::convert_text_to_lvl(&source, &destination, resolver)?;
        }

        // Capability conversions
        ("pctp", "pctp_t") => {
            println!("Converting PCTP -> text");
            converter::convert_pctp_to_text(&source, &destination, resolver)?;
        }
        ("pctp_t", "pctp") => {
            println!("Converting text -> PCTP");
            converter::convert_text_to_pctp(&source, &destination, resolver)?;
        }

        // Animation set conversions
        ("tlsa", "tlsa_t") => {
            println!("Converting TLSA -> text");
            converter::convert_tlsa_to_text(&source, &destination, resolver)?;
        }
        ("tlsa_t", "tlsa") => {
            println!("Converting text -> TLSA");
            converter::convert_text_to_tlsa(&source, &destination, resolver)?;
        }

        // Same format (copy)
        (fmt1, fmt2) if fmt1 == fmt2 => {
            println!("Source and destination formats are the same, copying file...");
            std::fs::copy(&source, &destination)?;
        }

        // Unsupported
        _ => {
            anyhow::bail!(
                "Unsupported conversion: {} -> {}\n\
                 Supported conversions:\n\
                 - Raster <-> DDS\n\
                 - LVL <-> LVL_T (ArgScript text)\n\
                 - PCTP <-> PCTP_T (ArgScript text)\n\
                 - TLSA <-> TLSA_T (ArgScript text)",
                input,
                output
            );
        }
    }

    println!("Conversion complete");
    Ok(())
}
