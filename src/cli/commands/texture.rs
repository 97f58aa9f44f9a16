//! CLI commands for texture operations

use std::path::Path;

use crate::cli::expand_path;
use crate::formats::dds::read_dds;

/// Show info about a DDS texture file
pub fn info(path: &Path) -> anyhow::Result<()> {
    let path = expand_path(path);
    let texture = read_dds(&path)?;

    println!("DDS Information: {}", path.display());
    println!();
    println!("Dimensions: {}x{}", texture.width(), texture.height());
    println!("Mip levels: {}", texture.mipmap_count());

    match texture.format() {
        Ok(format) => println!("Format: {format:?}"),
        Err(_) => println!("Format: unknown fourCC 0x{:08X}", texture.header.pixel_format.format_code()),
    }

    println!("Data size: {} bytes", texture.data.len());
    if let Ok(mip0) = texture.mipmap_data(0) {
        println!("Data size (mip 0): {} bytes", mip0.len());
    }

    Ok(())
}
