//! State for the changelog studio
//!
//! One editing context: the workspace, which repository and entry are
//! selected, the chat transcript for that entry, and any in-flight request.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};

use crate::changelog::RevisionSession;
use crate::error::ChangelogError;
use crate::history::{HistoricalChangelogEntry, INITIAL_VERSION};
use crate::workspace::{ConnectedRepo, Workspace};

/// Maximum chat messages retained (older messages are dropped)
pub const MAX_CHAT_MESSAGES: usize = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatRole {
    User,
    Model,
}

/// A single transcript line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            text: text.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Model,
            text: text.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Bounded, append-only transcript for the selected entry
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    messages: VecDeque<ChatMessage>,
}

impl Transcript {
    pub fn push(&mut self, message: ChatMessage) {
        self.messages.push_back(message);
        while self.messages.len() > MAX_CHAT_MESSAGES {
            self.messages.pop_front();
        }
    }

    pub fn messages(&self) -> impl Iterator<Item = &ChatMessage> {
        self.messages.iter()
    }

    pub fn last(&self) -> Option<&ChatMessage> {
        self.messages.back()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    Generation,
    Revision,
}

/// The one request allowed in flight per context
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingOperation {
    pub kind: OperationKind,
    pub request_id: u64,
    pub repo_id: String,
    /// Target entry for a revision
    pub entry_id: Option<String>,
}

pub struct StudioState {
    pub workspace: Workspace,
    pub selected_repo: Option<String>,
    pub selected_entry: Option<String>,
    /// Version label for the next generation
    pub version_input: String,
    pub transcript: Transcript,
    pub session: RevisionSession,
    pub pending: Option<PendingOperation>,
    /// Outcome of the last failed (or informational) action
    pub last_error: Option<ChangelogError>,
    next_request_id: u64,
}

impl StudioState {
    pub fn new(workspace: Workspace) -> Self {
        Self {
            workspace,
            selected_repo: None,
            selected_entry: None,
            version_input: INITIAL_VERSION.to_string(),
            transcript: Transcript::default(),
            session: RevisionSession::new(),
            pending: None,
            last_error: None,
            next_request_id: 1,
        }
    }

    pub fn next_request_id(&mut self) -> u64 {
        let id = self.next_request_id;
        self.next_request_id += 1;
        id
    }

    pub fn is_busy(&self) -> bool {
        self.pending.is_some()
    }

    /// Whether `request_id` is the result the context is waiting for
    pub fn is_current(&self, kind: OperationKind, request_id: u64) -> bool {
        self.pending
            .as_ref()
            .is_some_and(|p| p.kind == kind && p.request_id == request_id)
    }

    pub fn selected_repo(&self) -> Option<&ConnectedRepo> {
        let id = self.selected_repo.as_deref()?;
        self.workspace.repo(id).ok()
    }

    pub fn selected_entry(&self) -> Option<&HistoricalChangelogEntry> {
        let entry_id = self.selected_entry.as_deref()?;
        self.selected_repo()?.history.get(entry_id)
    }

    /// Drop the transcript and conversation, and abandon in-flight work
    pub fn reset_conversation(&mut self) {
        self.transcript.clear();
        self.session = RevisionSession::new();
        self.pending = None;
    }
}

impl std::fmt::Debug for StudioState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StudioState")
            .field("selected_repo", &self.selected_repo)
            .field("selected_entry", &self.selected_entry)
            .field("version_input", &self.version_input)
            .field("transcript", &self.transcript.len())
            .field("pending", &self.pending)
            .field("last_error", &self.last_error)
            .finish_non_exhaustive()
    }
}
