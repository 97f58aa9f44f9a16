//! CLI interface for batch directory conversion

use std::path::Path;
use std::time::Instant;

use crate::cli::expand_path;
use crate::cli::progress::{self, GEAR, LOOKING_GLASS};
use crate::converter::{ConvertDirection, batch_convert, find_convertible_files};
use crate::formats::common::NameResolver;

pub fn execute(
    source: &Path,
    dest: &Path,
    direction: ConvertDirection,
    resolver: &dyn NameResolver,
) -> anyhow::Result<()> {
    let source = expand_path(source);
    let dest = expand_path(dest);
    let started = Instant::now();

    progress::print_step(
        1,
        2,
        LOOKING_GLASS,
        &format!("Scanning for .{} files...", direction.source_extension()),
    );
    let files = find_convertible_files(&source, direction);

    if files.is_empty() {
        println!(
            "No .{} files found in: {}",
            direction.source_extension(),
            source.display()
        );
        return Ok(());
    }

    progress::print_step(2, 2, GEAR, &format!("Converting {} files...", files.len()));

    let pb = progress::simple_bar(files.len() as u64, "Converting");
    let result = batch_convert(&files, &source, &dest, direction, resolver, |progress| {
        pb.set_position(progress.current as u64);
        pb.set_message(progress.file.clone());
    });
    pb.finish_and_clear();

    println!();
    println!("Conversion complete:");
    println!("  Success: {}", result.success_count);
    println!("  Failed: {}", result.fail_count);

    if result.fail_count > 0 {
        println!();
        println!("Failures:");
        for msg in result.results.iter().filter(|m| m.starts_with("Failed")) {
            println!("  {msg}");
        }
    }

    progress::print_done(started.elapsed());
    Ok(())
}
