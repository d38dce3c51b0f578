//! Test fixtures: a throwaway project directory with a media root.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tempfile::TempDir;

use crate::config::Settings;

pub struct Fixture {
    dir: TempDir,
    media: PathBuf,
}

impl Fixture {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let media = dir.path().join("media");
        fs::create_dir_all(&media).unwrap();
        Self { dir, media }
    }

    /// Project directory (holds `bundles.yaml` and `fardel.toml`).
    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn media(&self) -> &Path {
        &self.media
    }

    /// Write a source file under the media root, returning its path.
    pub fn source(&self, rel: &str, contents: &str) -> PathBuf {
        self.source_bytes(rel, contents.as_bytes())
    }

    pub fn source_bytes(&self, rel: &str, contents: &[u8]) -> PathBuf {
        let path = self.media.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, contents).unwrap();
        path
    }

    /// Write `bundles.yaml`, returning its path.
    pub fn declare(&self, yaml: &str) -> PathBuf {
        let path = self.root().join("bundles.yaml");
        fs::write(&path, yaml).unwrap();
        path
    }

    /// Write `fardel.toml`.
    pub fn configure(&self, toml: &str) {
        fs::write(self.root().join("fardel.toml"), toml).unwrap();
    }

    /// Settings for this project, loaded like the CLI does.
    pub fn settings(&self) -> Settings {
        Settings::load(self.root(), None).unwrap()
    }

    /// Settings with compression disabled, for tests that inspect artifacts.
    pub fn plain_settings(&self) -> Arc<Settings> {
        let mut settings = self.settings();
        settings.compress.enable = false;
        Arc::new(settings)
    }

    /// Files currently under `media/bundles`, relative to it, sorted.
    pub fn artifacts(&self) -> Vec<String> {
        let root = self.media.join("bundles");
        let mut found = Vec::new();
        collect(&root, &root, &mut found);
        found.sort();
        found
    }
}

fn collect(root: &Path, dir: &Path, found: &mut Vec<String>) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect(root, &path, found);
        } else if let Ok(rel) = path.strip_prefix(root) {
            found.push(rel.to_string_lossy().replace('\\', "/"));
        }
    }
}
