//! Changelog studio
//!
//! One editing context over the workspace: pick a repository, generate the
//! next changelog, then refine the selected entry through conversation.
//! State changes go through the pure `reduce` function; `StudioApp` runs the
//! async side effects it returns.

mod app;
pub mod events;
pub mod reducer;
pub mod state;


pub use app::StudioApp;
pub use events::{PersistScope, SideEffect, StudioEvent};
pub use reducer::reduce;
pub use state::{ChatMessage, ChatRole, MAX_CHAT_MESSAGES, OperationKind, StudioState};
