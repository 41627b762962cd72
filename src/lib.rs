//! Aria - AI-powered changelogs from merged GitHub pull requests
//!
//! This library connects GitHub repositories, synthesizes categorized changelogs from
//! merged pull requests, keeps a versioned history per repository, and refines entries
//! through a conversational revision loop.

// Allow certain clippy warnings that are either stylistic or from external dependencies
#![allow(clippy::uninlined_format_args)] // Style preference
#![allow(clippy::format_push_string)] // Performance improvement but stylistic
#![allow(clippy::return_self_not_must_use)] // Builder pattern is clear enough
#![allow(clippy::items_after_statements)] // Locally-scoped use statements are fine
#![allow(clippy::too_many_arguments)] // Some functions legitimately need many params
#![allow(clippy::option_as_ref_cloned)] // .as_ref().cloned() is sometimes clearer
#![allow(clippy::redundant_clone)] // Sometimes more explicit is clearer

pub mod autogen;
pub mod changelog;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod github;
pub mod history;
pub mod llm;
pub mod llm_providers;
pub mod logger;
pub mod notifications;
pub mod services;
pub mod storage;
pub mod studio;
pub mod types;
pub mod ui;
pub mod workspace;

// Re-export important structs and functions for easier testing
pub use changelog::{ChangelogReviser, ChangelogSynthesizer, RevisionSession};
pub use config::Config;
pub use error::ChangelogError;
pub use github::{GitHubClient, PullRequestSource, RepositoryRef};
pub use history::{HistoricalChangelogEntry, VersionHistory};
pub use llm_providers::{ChatTurn, LLMProvider};
pub use types::{Changelog, ChangelogCategory, PullRequest};
pub use workspace::{ConnectedRepo, Workspace};
