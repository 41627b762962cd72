//! Changelog generation and refinement
//!
//! - `ChangelogSynthesizer`: one-shot generation from merged PRs
//! - `ChangelogReviser` + `RevisionSession`: conversational edits that must
//!   round-trip through the same strict schema

pub mod prompt;
mod revision;
mod synthesizer;

pub use revision::{ChangelogReviser, REVISION_CONFIRMATION, RevisionOutcome, RevisionSession};
pub use synthesizer::{ChangelogSynthesizer, DEFAULT_SYNTHESIS_TEMPERATURE};
