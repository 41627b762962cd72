//! Value types shared across the pipeline
//!
//! - Changelogs (the LLM output contract)
//! - Merged pull requests

mod changelog;
mod pull_request;

pub use changelog::{Changelog, ChangelogCategory};
pub use pull_request::{PullRequest, UNKNOWN_AUTHOR};
