//! Raw GitHub REST payloads used by the search client

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::types::{PullRequest, UNKNOWN_AUTHOR};

/// Response of `GET /search/issues`
#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub total_count: u64,
    /// Absent on some partial responses; treated as zero results
    #[serde(default)]
    pub items: Option<Vec<SearchItem>>,
}

#[derive(Debug, Deserialize)]
pub struct SearchItem {
    pub number: u64,
    pub title: String,
    #[serde(default)]
    pub body: Option<String>,
    pub html_url: String,
    #[serde(default)]
    pub user: Option<GitHubUser>,
    #[serde(default)]
    pub pull_request: Option<PullRequestLinks>,
}

#[derive(Debug, Deserialize)]
pub struct GitHubUser {
    pub login: String,
}

#[derive(Debug, Deserialize)]
pub struct PullRequestLinks {
    #[serde(default)]
    pub merged_at: Option<DateTime<Utc>>,
}

/// Structured error body `{message, errors: [{message, code}]}`
#[derive(Debug, Default, Deserialize)]
pub struct ErrorResponse {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub errors: Vec<ErrorDetail>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ErrorDetail {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
}

impl ErrorResponse {
    /// Compose the user-facing message: top-level message, else the first
    /// detail message, else `fallback`; the first detail code is appended.
    pub fn describe(&self, fallback: &str) -> String {
        let first = self.errors.first();
        let message = self
            .message
            .as_deref()
            .filter(|m| !m.is_empty())
            .or_else(|| first.and_then(|e| e.message.as_deref()))
            .unwrap_or(fallback);

        match first.and_then(|e| e.code.as_deref()).filter(|c| !c.is_empty()) {
            Some(code) => format!("{message} ({code})"),
            None => message.to_string(),
        }
    }
}

impl From<SearchItem> for PullRequest {
    fn from(item: SearchItem) -> Self {
        Self {
            id: item.number,
            title: item.title,
            body: item.body,
            url: item.html_url,
            author: item
                .user
                .map_or_else(|| UNKNOWN_AUTHOR.to_string(), |u| u.login),
            merged_at: item.pull_request.and_then(|links| links.merged_at),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_prefers_top_level_message() {
        let body: ErrorResponse = serde_json::from_str(
            r#"{"message":"Validation Failed","errors":[{"message":"bad query","code":"invalid"}]}"#,
        )
        .expect("valid json");
        assert_eq!(body.describe("Unprocessable Entity"), "Validation Failed (invalid)");
    }

    #[test]
    fn test_describe_falls_back_to_detail_then_status() {
        let detail: ErrorResponse =
            serde_json::from_str(r#"{"errors":[{"message":"bad query"}]}"#).expect("valid json");
        assert_eq!(detail.describe("Unprocessable Entity"), "bad query");

        assert_eq!(ErrorResponse::default().describe("Forbidden"), "Forbidden");
    }

    #[test]
    fn test_item_without_user_maps_to_unknown_author() {
        let item: SearchItem = serde_json::from_str(
            r#"{"number":3,"title":"t","html_url":"https://github.com/a/b/pull/3","user":null}"#,
        )
        .expect("valid json");
        let pr = PullRequest::from(item);
        assert_eq!(pr.author, UNKNOWN_AUTHOR);
        assert_eq!(pr.merged_at, None);
    }
}
