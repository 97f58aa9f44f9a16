use clap::Subcommand;
use std::path::PathBuf;
use std::str::FromStr;

use crate::converter::ConvertDirection;
use crate::formats::common::NameResolver;

pub mod batch;
pub mod convert;
pub mod texture;

/// Conversion direction argument for batch operations
#[derive(Debug, Clone, Copy)]
pub struct DirectionArg(pub ConvertDirection);

impl FromStr for DirectionArg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_lowercase();
        match lower.as_str() {
            "raster-to-dds" => Ok(DirectionArg(ConvertDirection::RasterToDds)),
            "dds-to-raster" => Ok(DirectionArg(ConvertDirection::DdsToRaster)),
            "lvl-to-text" => Ok(DirectionArg(ConvertDirection::LvlToText)),
            "text-to-lvl" => Ok(DirectionArg(ConvertDirection::TextToLvl)),
            "pctp-to-text" => Ok(DirectionArg(ConvertDirection::PctpToText)),
            "text-to-pctp" => Ok(DirectionArg(ConvertDirection::TextToPctp)),
            "tlsa-to-text" => Ok(DirectionArg(ConvertDirection::TlsaToText)),
            "text-to-tlsa" => Ok(DirectionArg(ConvertDirection::TextToTlsa)),
            _ => Err(format!(
                "Invalid direction '{s}'. Valid values: raster-to-dds, dds-to-raster, \
                 lvl-to-text, text-to-lvl, pctp-to-text, text-to-pctp, \
                 tlsa-to-text, text-to-tlsa"
            )),
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Convert file formats
    Convert {
        /// Source file
        #[arg(short, long)]
        source: PathBuf,

        /// Destination file
        #[arg(short, long)]
        destination: PathBuf,

        /// Input format (auto-detected from extension if not specified)
        #[arg(short = 'i', long)]
        input_format: Option<String>,

        /// Output format (auto-detected from extension if not specified)
        #[arg(short = 'o', long)]
        output_format: Option<String>,
    },

    /// Texture operations (DDS/Raster)
    Texture {
        #[command(subcommand)]
        command: TextureCommands,
    },

    /// Batch convert all matching files in a directory
    Batch {
        /// Source directory
        #[arg(short, long)]
        source: PathBuf,

        /// Destination directory
        #[arg(short, long)]
        dest: PathBuf,

        /// Conversion direction (e.g. tlsa-to-text, raster-to-dds)
        #[arg(short = 'D', long)]
        direction: DirectionArg,
    },
}

/// Texture operation commands
#[derive(Subcommand)]
pub enum TextureCommands {
    /// Show info about a DDS texture file
    Info {
        /// DDS file to analyze
        path: PathBuf,
    },
}

impl Commands {
    pub fn execute(&self, resolver: &dyn NameResolver) -> anyhow::Result<()> {
        match self {
            Commands::Convert {
                source,
                destination,
                input_format,
                output_format,
            } => convert::execute(
                source,
                destination,
                input_format.as_deref(),
                output_format.as_deref(),
                resolver,
            ),
            Commands::Texture { command } => command.execute(),
            Commands::Batch {
                source,
                dest,
                direction,
            } => batch::execute(source, dest, direction.0, resolver),
        }
    }
}

impl TextureCommands {
    pub fn execute(&self) -> anyhow::Result<()> {
        match self {
            TextureCommands::Info { path } => texture::info(path),
        }
    }
}
