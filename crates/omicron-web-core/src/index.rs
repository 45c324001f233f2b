//! Artifact index over the report hierarchy.
//!
//! ```text
//! <report root>/
//!   latestday/{channel}.html
//!   latesthour/{channel}.html
//!   {YYYY}/{MM}/{DD}/{channel}.html        full-day bucket
//!   {YYYY}/{MM}/{DD}/{HH}/{channel}.html   hour bucket
//!
//! <channel root>/
//!   {channel dir}/                          used only for the global listing
//! ```
//!
//! The store is written concurrently by the report generator. Any store
//! error is logged and read as "not found" (or an empty listing), so a
//! half-written directory never fails a request.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::models::{ArtifactKey, ArtifactRef, ChannelName, LatestWindow, ResolvedTime};
use crate::store::{ArtifactStore, Entry, EntryKind};

/// File extension of a stored report.
pub const REPORT_EXTENSION: &str = ".html";

/// Default marker that distinguishes channel directories from scaffolding.
pub const DEFAULT_CHANNEL_MARKER: char = '_';

/// Read-only queries against the report and channel stores.
pub struct ArtifactIndex {
    reports: Arc<dyn ArtifactStore>,
    channel_dirs: Arc<dyn ArtifactStore>,
    marker: char,
}

impl ArtifactIndex {
    pub fn new(
        reports: Arc<dyn ArtifactStore>,
        channel_dirs: Arc<dyn ArtifactStore>,
        marker: char,
    ) -> Self {
        Self {
            reports,
            channel_dirs,
            marker,
        }
    }

    /// Channels with a report in exactly this bucket, sorted.
    ///
    /// A full-day bucket only sees files directly inside `YYYY/MM/DD`; hour
    /// subdirectories are never descended into.
    pub async fn list_channels(&self, time: &ResolvedTime) -> Vec<ChannelName> {
        let prefix = time.segments();
        let entries = self.list_or_empty(&*self.reports, &prefix).await;
        report_channels(entries)
    }

    /// Locator of the report for `key`, if present.
    pub async fn resolve_artifact(&self, key: &ArtifactKey) -> Option<ArtifactRef> {
        let mut path = key.time.segments();
        path.push(report_file_name(&key.channel));
        self.existing(path).await
    }

    /// Locator of the latest report for `channel` in `window`, if present.
    pub async fn resolve_latest(
        &self,
        window: LatestWindow,
        channel: &ChannelName,
    ) -> Option<ArtifactRef> {
        let path = vec![window.dir_name().to_string(), report_file_name(channel)];
        self.existing(path).await
    }

    /// Every channel in the latest index for `window`, sorted.
    pub async fn list_latest(&self, window: LatestWindow) -> Vec<ChannelName> {
        let prefix = vec![window.dir_name().to_string()];
        let entries = self.list_or_empty(&*self.reports, &prefix).await;
        report_channels(entries)
    }

    /// Top-level channel directories, sorted and deduplicated.
    ///
    /// A directory qualifies when the marker occurs in its name at a position
    /// other than the first character.
    pub async fn list_all_channel_directories(&self) -> Vec<String> {
        let entries = self.list_or_empty(&*self.channel_dirs, &[]).await;
        let mut names: Vec<String> = entries
            .into_iter()
            .filter(|e| e.kind == EntryKind::Directory)
            .map(|e| e.name)
            .filter(|name| matches!(name.find(self.marker), Some(pos) if pos > 0))
            .collect();
        names.sort();
        names.dedup();
        names
    }

    async fn existing(&self, path: Vec<String>) -> Option<ArtifactRef> {
        match self.reports.exists(&path).await {
            Ok(true) => Some(ArtifactRef::from_segments(&path)),
            Ok(false) => {
                debug!(path = %path.join("/"), "report not found");
                None
            }
            Err(e) => {
                warn!(path = %path.join("/"), error = %e, "store lookup failed; treating as not found");
                None
            }
        }
    }

    async fn list_or_empty(&self, store: &dyn ArtifactStore, prefix: &[String]) -> Vec<Entry> {
        match store.list(prefix).await {
            Ok(entries) => entries,
            Err(e) => {
                warn!(prefix = %prefix.join("/"), error = %e, "store listing failed; treating as empty");
                Vec::new()
            }
        }
    }
}

fn report_file_name(channel: &ChannelName) -> String {
    format!("{}{}", channel.as_str(), REPORT_EXTENSION)
}

fn report_channels(entries: Vec<Entry>) -> Vec<ChannelName> {
    let mut channels: Vec<ChannelName> = entries
        .into_iter()
        .filter(|e| e.kind == EntryKind::File)
        .filter_map(|e| {
            e.name
                .strip_suffix(REPORT_EXTENSION)
                .and_then(|stem| ChannelName::new(stem).ok())
        })
        .collect();
    channels.sort();
    channels.dedup();
    channels
}
