//! Status command implementation

use anyhow::{Context, Result};
use std::path::PathBuf;

pub fn execute(db_path: PathBuf) -> Result<()> {
    tracing::info!("Checking store status: {}", db_path.display());

    let store = super::open_store(&db_path)?;

    println!("\nStore Status");
    println!("{}", "=".repeat(60));
    println!("Path: {}", store.config().path.display());

    let schema_version = store
        .schema_version()
        .context("Failed to get schema version")?;
    println!("Schema Version: {}", schema_version);

    let windows = store.count_windows().context("Failed to count windows")?;
    let points = store.count_points().context("Failed to count points")?;
    println!("\nProjections:");
    println!("  Windows: {}", windows);
    println!("  Price Points: {}", points);

    if windows == 0 {
        println!("\nNo windows yet - run 'brokerage feed' to add prices");
    } else {
        println!("\n✓ Store is readable");
    }

    Ok(())
}
