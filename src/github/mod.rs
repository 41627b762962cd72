//! GitHub collaborator
//!
//! Repository URL resolution plus the merged-PR search used to feed synthesis.

mod client;
mod models;
mod repository;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::ChangelogError;
use crate::types::PullRequest;

pub use client::{DEFAULT_API_URL, GitHubClient, merged_pr_query};
pub use models::{ErrorResponse, SearchItem, SearchResponse};
pub use repository::{GITHUB_HOST, RepositoryRef};

/// Source of merged pull requests for a repository
#[async_trait]
pub trait PullRequestSource: Send + Sync {
    /// Fetch merged PRs, newest merge first, optionally merged on or after `since`'s day.
    ///
    /// Zero results is `Ok(vec![])`, never an error.
    async fn fetch_merged_prs(
        &self,
        repo: &RepositoryRef,
        token: &str,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<PullRequest>, ChangelogError>;
}
