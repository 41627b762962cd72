//! Events and side effects for the changelog studio
//!
//! Events describe what happened (user actions, completed async work).
//! Side effects describe work the app must perform after the reducer ran.

use crate::autogen::AutoGenerated;
use crate::changelog::{RevisionOutcome, RevisionSession};
use crate::error::ChangelogError;
use crate::github::RepositoryRef;
use crate::history::{HistoricalChangelogEntry, VersionHistory};
use crate::notifications::AppNotification;
use crate::types::Changelog;
use crate::workspace::{AppSettings, redact};

use std::fmt;

/// Debug output redacts access tokens
#[derive(Clone)]
pub enum StudioEvent {
    Connect {
        url: String,
        token: String,
    },
    Disconnect(String),
    /// Switch repository; clears the transcript and abandons in-flight work
    SelectRepository(String),
    /// Switch entry within the selected repository
    SelectEntry(String),
    SetVersion(String),
    GenerateRequested,
    GenerationCompleted {
        request_id: u64,
        result: Result<HistoricalChangelogEntry, ChangelogError>,
    },
    ReviseRequested(String),
    RevisionCompleted {
        request_id: u64,
        result: Result<RevisionOutcome, ChangelogError>,
    },
    AutoGenerated(AutoGenerated),
    SetRepositoryAutoGeneration {
        repo_id: String,
        enabled: bool,
    },
    UpdateSettings(AppSettings),
    MarkNotificationRead(u64),
    MarkAllNotificationsRead,
}

/// Which persisted section changed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersistScope {
    Repositories,
    Settings,
    Notifications,
}

#[derive(Clone)]
pub enum SideEffect {
    Generate {
        request_id: u64,
        repo_id: String,
        repository: RepositoryRef,
        token: String,
        history: VersionHistory,
        version: String,
    },
    Revise {
        request_id: u64,
        repo_id: String,
        session: RevisionSession,
        instruction: String,
        current: Changelog,
    },
    Persist(PersistScope),
    Notify(AppNotification),
    /// Connected repositories or settings changed; refresh the poller
    SyncAutoGeneration,
}

impl fmt::Debug for StudioEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connect { url, token } => f
                .debug_struct("Connect")
                .field("url", url)
                .field("token", &redact(token))
                .finish(),
            Self::Disconnect(id) => f.debug_tuple("Disconnect").field(id).finish(),
            Self::SelectRepository(id) => f.debug_tuple("SelectRepository").field(id).finish(),
            Self::SelectEntry(id) => f.debug_tuple("SelectEntry").field(id).finish(),
            Self::SetVersion(version) => f.debug_tuple("SetVersion").field(version).finish(),
            Self::GenerateRequested => f.write_str("GenerateRequested"),
            Self::GenerationCompleted { request_id, result } => f
                .debug_struct("GenerationCompleted")
                .field("request_id", request_id)
                .field("result", result)
                .finish(),
            Self::ReviseRequested(instruction) => {
                f.debug_tuple("ReviseRequested").field(instruction).finish()
            }
            Self::RevisionCompleted { request_id, result } => f
                .debug_struct("RevisionCompleted")
                .field("request_id", request_id)
                .field("result", result)
                .finish(),
            Self::AutoGenerated(update) => f.debug_tuple("AutoGenerated").field(update).finish(),
            Self::SetRepositoryAutoGeneration { repo_id, enabled } => f
                .debug_struct("SetRepositoryAutoGeneration")
                .field("repo_id", repo_id)
                .field("enabled", enabled)
                .finish(),
            Self::UpdateSettings(settings) => {
                f.debug_tuple("UpdateSettings").field(settings).finish()
            }
            Self::MarkNotificationRead(id) => {
                f.debug_tuple("MarkNotificationRead").field(id).finish()
            }
            Self::MarkAllNotificationsRead => f.write_str("MarkAllNotificationsRead"),
        }
    }
}

impl fmt::Debug for SideEffect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Generate {
                request_id,
                repo_id,
                repository,
                token,
                history,
                version,
            } => f
                .debug_struct("Generate")
                .field("request_id", request_id)
                .field("repo_id", repo_id)
                .field("repository", repository)
                .field("token", &redact(token))
                .field("history", &history.len())
                .field("version", version)
                .finish(),
            Self::Revise {
                request_id,
                repo_id,
                session,
                instruction,
                current,
            } => f
                .debug_struct("Revise")
                .field("request_id", request_id)
                .field("repo_id", repo_id)
                .field("session", &session.len())
                .field("instruction", instruction)
                .field("current", current)
                .finish(),
            Self::Persist(scope) => f.debug_tuple("Persist").field(scope).finish(),
            Self::Notify(notification) => f.debug_tuple("Notify").field(notification).finish(),
            Self::SyncAutoGeneration => f.write_str("SyncAutoGeneration"),
        }
    }
}
