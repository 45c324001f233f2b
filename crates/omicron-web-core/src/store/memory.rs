//! In-memory [`ArtifactStore`] implementation for testing.
//!
//! Files are kept as slash-joined keys in a `BTreeSet` behind
//! `std::sync::RwLock`; directories are implied by file paths, plus any
//! explicitly added empty directories.

use std::collections::BTreeSet;
use std::sync::RwLock;

use anyhow::{anyhow, Result};
use async_trait::async_trait;

use super::{ArtifactStore, Entry};

/// In-memory store for tests.
pub struct InMemoryStore {
    files: RwLock<BTreeSet<String>>,
    dirs: RwLock<BTreeSet<String>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            files: RwLock::new(BTreeSet::new()),
            dirs: RwLock::new(BTreeSet::new()),
        }
    }

    /// Build a store holding the given slash-separated file paths.
    pub fn with_files<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let store = Self::new();
        for p in paths {
            store.add_file(p);
        }
        store
    }

    pub fn add_file(&self, path: impl Into<String>) {
        let path = path.into();
        if let Ok(mut files) = self.files.write() {
            files.insert(path.trim_matches('/').to_string());
        }
    }

    /// Register a directory that holds no files.
    pub fn add_dir(&self, path: impl Into<String>) {
        let path = path.into();
        if let Ok(mut dirs) = self.dirs.write() {
            dirs.insert(path.trim_matches('/').to_string());
        }
    }

    pub fn remove_file(&self, path: &str) {
        if let Ok(mut files) = self.files.write() {
            files.remove(path.trim_matches('/'));
        }
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn join(segments: &[String]) -> String {
    segments.join("/")
}

#[async_trait]
impl ArtifactStore for InMemoryStore {
    async fn exists(&self, key: &[String]) -> Result<bool> {
        let files = self.files.read().map_err(|_| anyhow!("store lock poisoned"))?;
        Ok(files.contains(&join(key)))
    }

    async fn list(&self, prefix: &[String]) -> Result<Vec<Entry>> {
        let files = self.files.read().map_err(|_| anyhow!("store lock poisoned"))?;
        let dirs = self.dirs.read().map_err(|_| anyhow!("store lock poisoned"))?;

        let base = join(prefix);
        let lead = if base.is_empty() {
            String::new()
        } else {
            format!("{}/", base)
        };

        let mut file_names = BTreeSet::new();
        let mut dir_names = BTreeSet::new();

        for path in files.iter() {
            let Some(rest) = path.strip_prefix(&lead) else {
                continue;
            };
            match rest.split_once('/') {
                Some((dir, _)) => {
                    dir_names.insert(dir.to_string());
                }
                None => {
                    file_names.insert(rest.to_string());
                }
            }
        }
        for path in dirs.iter() {
            if let Some(rest) = path.strip_prefix(&lead) {
                let first = rest.split('/').next().unwrap_or(rest);
                if !first.is_empty() {
                    dir_names.insert(first.to_string());
                }
            }
        }

        let mut entries: Vec<Entry> = dir_names.into_iter().map(Entry::directory).collect();
        entries.extend(file_names.into_iter().map(Entry::file));
        Ok(entries)
    }
}
