//! Default locations for the collection database and the threshold config.

use std::path::PathBuf;

const APP_DIR: &str = "difficulty-tagger";

/// Resolved file locations for a run.
#[derive(Debug, Clone)]
pub struct AppPaths {
    pub db: PathBuf,
    pub config: PathBuf,
}

impl AppPaths {
    /// Use the given overrides, falling back to the platform directories.
    pub fn resolve(db: Option<PathBuf>, config: Option<PathBuf>) -> Self {
        Self {
            db: db.unwrap_or_else(default_db_path),
            config: config.unwrap_or_else(default_config_path),
        }
    }
}

fn default_db_path() -> PathBuf {
    // Use app data directory for production, fallback to current dir
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
        .join("collection.db")
}

fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
        .join("config.json")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overrides_win() {
        let paths = AppPaths::resolve(Some("a.db".into()), Some("c.json".into()));
        assert_eq!(paths.db, PathBuf::from("a.db"));
        assert_eq!(paths.config, PathBuf::from("c.json"));
    }

    #[test]
    fn defaults_live_under_app_dir() {
        let paths = AppPaths::resolve(None, None);
        assert!(paths.db.ends_with("difficulty-tagger/collection.db"));
        assert!(paths.config.ends_with("difficulty-tagger/config.json"));
    }
}
