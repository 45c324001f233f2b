//! Storage abstraction for the report hierarchy.
//!
//! The [`ArtifactStore`] trait treats a directory tree as a read-only
//! key-value store: keys are path segments relative to a root, and the only
//! operations are existence checks and one-level listings. The resolver never
//! writes through it; reports are deposited by an external generator.
//!
//! Implementations must be `Send + Sync` to work with async runtimes.

pub mod memory;

use anyhow::Result;
use async_trait::async_trait;

/// Kind of a listed entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
}

/// One entry directly below a listed prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub name: String,
    pub kind: EntryKind,
}

impl Entry {
    pub fn file(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: EntryKind::File,
        }
    }

    pub fn directory(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: EntryKind::Directory,
        }
    }
}

/// Read-only view of an externally owned directory tree.
///
/// | Method | Purpose |
/// |--------|---------|
/// | [`exists`](ArtifactStore::exists) | Does a file exist at `key`? |
/// | [`list`](ArtifactStore::list) | Entries directly below `prefix` |
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Returns `true` if a file exists at `key`.
    async fn exists(&self, key: &[String]) -> Result<bool>;

    /// Lists entries directly below `prefix`, in no particular order.
    ///
    /// A missing prefix is an empty listing, not an error.
    async fn list(&self, prefix: &[String]) -> Result<Vec<Entry>>;
}
