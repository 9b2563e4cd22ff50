//! Example demonstrating a base file plus snippets merged into a target.
//!
//! This example shows how to:
//! - Lay out a base file and a `<target>.d` snippet directory
//! - Preview the change with a dry run
//! - Apply it, then see that a second run is a no-op
//! - Restore the previous target from its backup
//!
//! Run with: cargo run --example snippet_merge

use std::fs;
use update_conf::prelude::*;

fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    println!("=== Snippet Merge Example ===\n");

    let dir = tempfile::tempdir()?;
    let base = dir.path().join("app.conf.dist");
    let target = dir.path().join("app.conf");
    let snippets = dir.path().join("app.conf.d");
    fs::create_dir(&snippets)?;

    fs::write(
        &base,
        "[server]\nhost = localhost\nport = 80\n\n[log]\nlevel = info\n",
    )?;
    fs::write(snippets.join("10-port.conf"), "[server]\nport = 8080\n")?;
    fs::write(
        snippets.join("20-debug.conf"),
        "[log]\nlevel = debug\nfile = /var/log/app.log\n",
    )?;
    fs::write(&target, "[server]\nhost = localhost\nport = 80\n")?;

    // 1. Dry run
    println!("1. Dry run:");
    let preview = Updater::builder()
        .with_base(&base)
        .with_target(&target)
        .with_mode(WriteMode::DryRun)
        .build()?
        .run()?;
    if let Some(diff) = preview.diff() {
        print!("{}", diff);
    }

    // 2. Apply
    let updater = Updater::builder()
        .with_base(&base)
        .with_target(&target)
        .build()?;
    let report = updater.run()?;
    println!("\n2. Applied: {:?}", report.outcome);
    for entry in &report.provenance {
        println!("   {}.{} <- {}", entry.section, entry.key, entry.source);
    }

    // 3. Nothing changed since
    let again = updater.run()?;
    println!("\n3. Second run: {:?}", again.outcome);

    // 4. Restore
    updater.restore()?;
    println!("\n4. Restored:\n{}", fs::read_to_string(&target)?);

    println!("=== Example Complete ===");
    Ok(())
}
