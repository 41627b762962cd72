use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, Response};

use super::PullRequestSource;
use super::models::{ErrorResponse, SearchResponse};
use super::repository::RepositoryRef;
use crate::error::ChangelogError;
use crate::types::PullRequest;
use crate::{log_debug, log_error};

/// Public GitHub REST endpoint
pub const DEFAULT_API_URL: &str = "https://api.github.com";

const ACCEPT: &str = "application/vnd.github.v3+json";
const API_VERSION: &str = "2022-11-28";
const SEARCH_OPERATION: &str = "GitHub pull request search";

/// Build the search query for merged PRs, optionally bounded by merge date.
///
/// `since` is truncated to its UTC calendar day, so PRs merged earlier on the
/// same day as the previous generation are included again.
pub fn merged_pr_query(owner: &str, name: &str, since: Option<DateTime<Utc>>) -> String {
    let mut query = format!("is:pr is:merged repo:{owner}/{name}");
    if let Some(since) = since {
        query.push_str(&format!(" merged:>={}", since.format("%Y-%m-%d")));
    }
    query
}

/// Authenticated GitHub search client
#[derive(Clone)]
pub struct GitHubClient {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl GitHubClient {
    /// Client targeting api.github.com
    pub fn new(timeout: Duration) -> anyhow::Result<Self> {
        Self::with_base_url(DEFAULT_API_URL, timeout)
    }

    /// Client with a custom base URL (GitHub Enterprise or tests)
    pub fn with_base_url(base_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("aria-changelog/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
        })
    }

    fn transport_error(&self, err: &reqwest::Error) -> ChangelogError {
        if err.is_timeout() {
            ChangelogError::Timeout {
                operation: SEARCH_OPERATION,
                seconds: self.timeout.as_secs(),
            }
        } else {
            ChangelogError::UpstreamFetch {
                status: err.status().map(|s| s.as_u16()),
                message: err.to_string(),
            }
        }
    }

    /// Turn a non-success response into an `UpstreamFetch` error
    async fn error_from_response(response: Response) -> ChangelogError {
        let status = response.status();
        let fallback = status
            .canonical_reason()
            .map_or_else(|| format!("HTTP {}", status.as_u16()), str::to_string);

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorResponse>(&body)
            .map_or_else(|_| fallback.clone(), |parsed| parsed.describe(&fallback));

        log_error!(
            "GitHub API error: status={} message={}",
            status.as_u16(),
            message
        );

        ChangelogError::UpstreamFetch {
            status: Some(status.as_u16()),
            message,
        }
    }
}

#[async_trait]
impl PullRequestSource for GitHubClient {
    async fn fetch_merged_prs(
        &self,
        repo: &RepositoryRef,
        token: &str,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<PullRequest>, ChangelogError> {
        let (owner, name) = repo.normalized()?;
        let query = merged_pr_query(&owner, &name, since);
        log_debug!("GitHub search query: {}", query);

        let response = self
            .client
            .get(format!("{}/search/issues", self.base_url))
            .query(&[("q", query.as_str()), ("sort", "merged"), ("order", "desc")])
            .header("Accept", ACCEPT)
            .header("Authorization", format!("Bearer {token}"))
            .header("X-GitHub-Api-Version", API_VERSION)
            .send()
            .await
            .map_err(|e| self.transport_error(&e))?;

        if !response.status().is_success() {
            return Err(Self::error_from_response(response).await);
        }

        let search: SearchResponse = response
            .json()
            .await
            .map_err(|e| self.transport_error(&e))?;

        let Some(items) = search.items else {
            log_debug!("No items in GitHub search response for {}/{}", owner, name);
            return Ok(Vec::new());
        };

        log_debug!(
            "GitHub search returned {} of {} merged PRs for {}/{}",
            items.len(),
            search.total_count,
            owner,
            name
        );

        Ok(items.into_iter().map(PullRequest::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_query_without_since() {
        assert_eq!(
            merged_pr_query("acme", "widgets", None),
            "is:pr is:merged repo:acme/widgets"
        );
    }

    #[test]
    fn test_query_discards_time_of_day() {
        let since = Utc
            .with_ymd_and_hms(2024, 3, 9, 23, 59, 58)
            .single()
            .expect("valid timestamp");
        assert_eq!(
            merged_pr_query("acme", "widgets", Some(since)),
            "is:pr is:merged repo:acme/widgets merged:>=2024-03-09"
        );
    }
}
