//! Shared test context: a temporary collection and config.

pub mod fixtures;

use difficulty_tagger::commands;
use difficulty_tagger::paths::AppPaths;
use std::path::PathBuf;
use tempfile::TempDir;

pub struct TestContext {
    dir: TempDir,
    pub paths: AppPaths,
}

impl TestContext {
    /// Empty collection and a default config on disk.
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("temp dir");
        let paths = AppPaths::resolve(
            Some(dir.path().join("collection.db")),
            Some(dir.path().join("config.json")),
        );
        commands::config::init(&paths.config, false).expect("write config");
        Self { dir, paths }
    }

    /// Write `content` to a file inside the context directory.
    pub fn write_file(&self, name: &str, content: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        std::fs::write(&path, content).expect("write file");
        path
    }

    /// Import the standard fixture deck.
    pub fn with_sample_cards(self) -> Self {
        let file = self.write_file("cards.json", &fixtures::sample_cards().to_string());
        commands::cards::import(&self.paths, &file).expect("import cards");
        self
    }
}
