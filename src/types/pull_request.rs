//! Merged pull request value object

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Author recorded when GitHub does not report one
pub const UNKNOWN_AUTHOR: &str = "Unknown";

/// A merged pull request, immutable once fetched.
///
/// Identity is `id` (the PR number) scoped to its repository.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PullRequest {
    pub id: u64,
    pub title: String,
    pub body: Option<String>,
    pub url: String,
    pub author: String,
    pub merged_at: Option<DateTime<Utc>>,
}

impl PullRequest {
    /// Render the PR the way the synthesis prompt expects it
    pub fn prompt_block(&self) -> String {
        let body = self
            .body
            .as_deref()
            .filter(|b| !b.is_empty())
            .unwrap_or("No description.");
        format!("PR #{}: {}\nDescription: {}", self.id, self.title, body)
    }
}
