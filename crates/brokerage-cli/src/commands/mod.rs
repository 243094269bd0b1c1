pub mod feed;
pub mod status;
pub mod windows;

use anyhow::{Context, Result};
use brokerage::prelude::*;
use std::path::Path;

/// Store file inside the data directory
pub const STORE_FILE: &str = "movements.db";

pub fn open_store(db_path: &Path) -> Result<SqliteMovementStore> {
    SqliteMovementStore::open(StoreConfig::new(db_path.join(STORE_FILE)))
        .context("Failed to open movement store")
}
