//! Version history for generated changelogs
//!
//! Entries are kept most-recent-first in generation order. Revisions replace
//! an entry's changelog in place; entries are never reordered or removed.

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::log_warn;
use crate::types::Changelog;

/// Version label used for the first entry of a repository
pub const INITIAL_VERSION: &str = "v1.0.0";

/// Fallback when the head version contains no `vX.Y.Z`
const FALLBACK_VERSION: &str = "v1.0.1";

static SEMVER_PATTERN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"v(\d+)\.(\d+)\.(\d+)").ok());

/// One generated changelog and the PRs it covers
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct HistoricalChangelogEntry {
    pub id: String,
    pub version: String,
    /// When the changelog was generated; also the next fetch boundary
    pub date: DateTime<Utc>,
    pub pull_request_ids: Vec<u64>,
    pub changelog: Changelog,
    pub repo_id: String,
}

impl HistoricalChangelogEntry {
    pub fn new(
        repo_id: impl Into<String>,
        version: impl Into<String>,
        pull_request_ids: Vec<u64>,
        changelog: Changelog,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            version: version.into(),
            date: Utc::now(),
            pull_request_ids,
            changelog,
            repo_id: repo_id.into(),
        }
    }

    pub fn to_markdown(&self) -> String {
        self.changelog.to_markdown(&self.version)
    }
}

/// Ordered per-repository collection of entries, head is most recent
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct VersionHistory {
    entries: Vec<HistoricalChangelogEntry>,
}

impl VersionHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_at_head(&mut self, entry: HistoricalChangelogEntry) {
        self.entries.insert(0, entry);
    }

    /// Replace the changelog of the entry with `id`.
    ///
    /// Returns `false` and leaves the history untouched when no entry matches.
    pub fn update_by_id(&mut self, id: &str, changelog: Changelog) -> bool {
        if let Some(entry) = self.entries.iter_mut().find(|e| e.id == id) {
            entry.changelog = changelog;
            true
        } else {
            log_warn!("No changelog entry with id {} to update", id);
            false
        }
    }

    pub fn most_recent(&self) -> Option<&HistoricalChangelogEntry> {
        self.entries.first()
    }

    /// True when every pull request of `entry` is already part of the head entry
    pub fn covered_by_head(&self, entry: &HistoricalChangelogEntry) -> bool {
        self.most_recent().is_some_and(|head| {
            !entry.pull_request_ids.is_empty()
                && entry
                    .pull_request_ids
                    .iter()
                    .all(|id| head.pull_request_ids.contains(id))
        })
    }

    pub fn get(&self, id: &str) -> Option<&HistoricalChangelogEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    /// Find an entry by id, falling back to a version label match
    pub fn find(&self, id_or_version: &str) -> Option<&HistoricalChangelogEntry> {
        self.get(id_or_version)
            .or_else(|| self.entries.iter().find(|e| e.version == id_or_version))
    }

    pub fn iter(&self) -> impl Iterator<Item = &HistoricalChangelogEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Lower bound for the next PR fetch
    pub fn since(&self) -> Option<DateTime<Utc>> {
        self.most_recent().map(|e| e.date)
    }

    /// Suggest the label for the next generation
    pub fn next_version(&self) -> String {
        match self.most_recent() {
            None => INITIAL_VERSION.to_string(),
            Some(head) => bump_patch(&head.version).unwrap_or_else(|| FALLBACK_VERSION.to_string()),
        }
    }
}

/// `v1.2.3` -> `v1.2.4`
fn bump_patch(version: &str) -> Option<String> {
    let pattern = SEMVER_PATTERN.as_ref()?;
    let caps = pattern.captures(version.trim())?;
    let major: u64 = caps[1].parse().ok()?;
    let minor: u64 = caps[2].parse().ok()?;
    let patch: u64 = caps[3].parse().ok()?;
    Some(format!("v{major}.{minor}.{}", patch.checked_add(1)?))
}
