//! Error taxonomy for the changelog pipeline.
//!
//! Every variant is recovered at the action boundary (the reducer or a CLI
//! command). Nothing here is retried automatically.

use thiserror::Error;

/// Errors produced by the generation and revision pipeline
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChangelogError {
    /// The repository URL or owner/name pair could not be used
    #[error(
        "Invalid GitHub repository URL: {0}. Please use the format https://github.com/owner/repo."
    )]
    InvalidRepositoryReference(String),

    /// GitHub answered with a non-success status or could not be reached
    #[error("GitHub API Error: {message}")]
    UpstreamFetch {
        status: Option<u16>,
        message: String,
    },

    /// The LLM call failed or returned data that does not match the changelog schema
    #[error("Failed to generate changelog: {0}")]
    Synthesis(String),

    /// A chat edit failed or returned data that does not match the changelog schema
    #[error("Failed to revise changelog: {0}")]
    Revision(String),

    /// No merged pull requests since the last changelog
    #[error("No new merged pull requests found since the last changelog.")]
    NoNewChanges,

    /// An upstream call exceeded its configured timeout
    #[error("{operation} timed out after {seconds}s")]
    Timeout {
        operation: &'static str,
        seconds: u64,
    },

    #[error("Repository already connected: {0}")]
    AlreadyConnected(String),

    #[error("Repository not connected: {0}")]
    RepositoryNotFound(String),

    #[error("Changelog entry not found: {0}")]
    EntryNotFound(String),

    /// Another generation or revision holds the repository
    #[error("A changelog operation is already running for {0}")]
    Busy(String),
}

impl ChangelogError {
    /// Informational outcomes that should not be presented as failures
    pub const fn is_informational(&self) -> bool {
        matches!(self, Self::NoNewChanges)
    }

    /// HTTP status carried by an upstream failure, if any
    pub const fn upstream_status(&self) -> Option<u16> {
        match self {
            Self::UpstreamFetch { status, .. } => *status,
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_new_changes_is_informational() {
        assert!(ChangelogError::NoNewChanges.is_informational());
        assert!(!ChangelogError::Synthesis("boom".to_string()).is_informational());
    }

    #[test]
    fn test_upstream_message_is_verbatim() {
        let err = ChangelogError::UpstreamFetch {
            status: Some(422),
            message: "Validation Failed (invalid)".to_string(),
        };
        assert_eq!(err.to_string(), "GitHub API Error: Validation Failed (invalid)");
        assert_eq!(err.upstream_status(), Some(422));
    }

    #[test]
    fn test_timeout_display() {
        let err = ChangelogError::Timeout {
            operation: "Changelog synthesis",
            seconds: 60,
        };
        assert_eq!(err.to_string(), "Changelog synthesis timed out after 60s");
    }
}
