//! Windows command implementation

use anyhow::{Context, Result};
use brokerage::prelude::*;
use std::path::PathBuf;

pub fn execute(db_path: PathBuf, share: String) -> Result<()> {
    let store = super::open_store(&db_path)?;
    let now = SystemClock.now();

    let windows = store
        .windows_for_share(&ShareId::new(share.as_str()))
        .context("Failed to load windows")?;

    println!("\nWindows for {}", share);
    println!("{}", "=".repeat(60));

    if windows.is_empty() {
        println!("No windows yet");
        return Ok(());
    }

    for window in &windows {
        let state = if window.is_open_at(&now) {
            "open"
        } else {
            "expired"
        };
        println!("{} [{}]", window.id, state);
        println!("  Points: {}", window.movement_point_count());

        match window.summary() {
            Ok(Some(summary)) => {
                println!("  Open:   {}", summary.open);
                println!("  Close:  {}", summary.close);
                println!("  High:   {}", summary.high);
                println!("  Low:    {}", summary.low);
                println!("  Change: {}", summary.change);
            }
            Ok(None) => {}
            Err(e) => println!("  Summary unavailable: {}", e),
        }

        if !window.is_within_window() {
            println!("  ⚠️  Contains samples outside the window span");
        }
    }

    Ok(())
}
