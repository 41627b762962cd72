//! Changelog generation service
//!
//! Glues the PR source to the synthesizer: fetch everything merged since the
//! most recent entry, refuse to produce an empty release, synthesize, and
//! wrap the result in a history entry.

use std::sync::Arc;

use crate::changelog::ChangelogSynthesizer;
use crate::error::ChangelogError;
use crate::github::{PullRequestSource, RepositoryRef};
use crate::history::{HistoricalChangelogEntry, VersionHistory};
use crate::log_debug;
use crate::workspace::ConnectedRepo;

#[derive(Clone)]
pub struct GenerationService {
    source: Arc<dyn PullRequestSource>,
    synthesizer: ChangelogSynthesizer,
}

impl GenerationService {
    pub fn new(source: Arc<dyn PullRequestSource>, synthesizer: ChangelogSynthesizer) -> Self {
        Self {
            source,
            synthesizer,
        }
    }

    /// Produce the next history entry without modifying `history`.
    ///
    /// Fails with `NoNewChanges` when nothing was merged since the head entry.
    pub async fn generate(
        &self,
        repository: &RepositoryRef,
        token: &str,
        history: &VersionHistory,
        version: &str,
    ) -> Result<HistoricalChangelogEntry, ChangelogError> {
        let since = history.since();
        let pull_requests = self
            .source
            .fetch_merged_prs(repository, token, since)
            .await?;

        if pull_requests.is_empty() {
            log_debug!("No merged pull requests for {} since {:?}", repository, since);
            return Err(ChangelogError::NoNewChanges);
        }

        let changelog = self.synthesizer.synthesize(&pull_requests, version).await?;
        let ids = pull_requests.iter().map(|pr| pr.id).collect();

        Ok(HistoricalChangelogEntry::new(
            repository.full_name(),
            version,
            ids,
            changelog,
        ))
    }

    /// Generate for a connected repository and insert the entry at the head.
    ///
    /// Without an explicit `version` the history's suggestion is used.
    pub async fn generate_into(
        &self,
        repo: &mut ConnectedRepo,
        version: Option<&str>,
    ) -> Result<HistoricalChangelogEntry, ChangelogError> {
        let version = version
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map_or_else(|| repo.history.next_version(), str::to_string);

        let entry = self
            .generate(&repo.repository, &repo.token, &repo.history, &version)
            .await?;

        repo.history.insert_at_head(entry.clone());
        repo.last_sync = entry.date;
        Ok(entry)
    }
}
