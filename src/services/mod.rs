//! Service layer
//!
//! - `GenerationService` - fetch merged PRs and synthesize the next entry
//! - `EditLocks` - per-repository mutual exclusion shared by every writer

pub mod generation;
pub mod locks;

pub use generation::GenerationService;
pub use locks::{EditLease, EditLocks};
