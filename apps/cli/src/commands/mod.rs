//! Command implementations behind the CLI subcommands.

pub mod assign;
pub mod cards;
pub mod config;
pub mod remove;

use crate::db::SqliteRepository;
use anyhow::Context;
use std::fs;
use std::path::Path;

/// Open the collection database, creating its directory if needed.
pub fn open_repository(path: &Path) -> anyhow::Result<SqliteRepository> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    SqliteRepository::open(path)
        .with_context(|| format!("failed to open collection {}", path.display()))
}
