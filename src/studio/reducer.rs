//! Pure reducer for the changelog studio
//!
//! All state transitions happen here. The reducer:
//! - takes the current state and one event
//! - mutates the state and returns side effects
//! - does no I/O and never awaits
//!
//! Async work (fetching, synthesis, revision, persistence) is described by
//! the returned `SideEffect`s and performed by `StudioApp`.

use super::events::{PersistScope, SideEffect, StudioEvent};
use super::state::{ChatMessage, OperationKind, PendingOperation, StudioState};
use crate::autogen::AutoGenerated;
use crate::changelog::{REVISION_CONFIRMATION, RevisionOutcome};
use crate::error::ChangelogError;
use crate::history::HistoricalChangelogEntry;
use crate::log_debug;
use crate::notifications::NotificationLevel;

/// Reducer: (state, event) -> effects
pub fn reduce(state: &mut StudioState, event: StudioEvent) -> Vec<SideEffect> {
    let mut effects = Vec::new();

    match event {
        StudioEvent::Connect { url, token } => connect(state, &url, &token, &mut effects),

        StudioEvent::Disconnect(id) => match state.workspace.disconnect(&id) {
            Ok(repo) => {
                if state.selected_repo.as_deref() == Some(repo.id.as_str()) {
                    state.selected_repo = None;
                    state.selected_entry = None;
                    state.reset_conversation();
                }
                state.last_error = None;
                effects.push(SideEffect::Persist(PersistScope::Repositories));
                effects.push(SideEffect::SyncAutoGeneration);
            }
            Err(e) => state.last_error = Some(e),
        },

        StudioEvent::SelectRepository(id) => match state.workspace.repo(&id) {
            Ok(repo) => {
                let repo_id = repo.id.clone();
                let head = repo.history.most_recent().map(|e| e.id.clone());
                let next_version = repo.history.next_version();

                state.selected_repo = Some(repo_id);
                state.selected_entry = head;
                state.version_input = next_version;
                state.last_error = None;
                state.reset_conversation();
            }
            Err(e) => state.last_error = Some(e),
        },

        StudioEvent::SelectEntry(id) => {
            let found = state
                .selected_repo()
                .and_then(|repo| repo.history.find(&id))
                .map(|entry| entry.id.clone());
            match found {
                Some(entry_id) => {
                    if state.selected_entry.as_deref() != Some(entry_id.as_str()) {
                        state.reset_conversation();
                    }
                    state.selected_entry = Some(entry_id);
                    state.last_error = None;
                }
                None => state.last_error = Some(ChangelogError::EntryNotFound(id)),
            }
        }

        StudioEvent::SetVersion(version) => {
            state.version_input = version.trim().to_string();
        }

        StudioEvent::GenerateRequested => request_generation(state, &mut effects),

        StudioEvent::GenerationCompleted { request_id, result } => {
            if !state.is_current(OperationKind::Generation, request_id) {
                log_debug!("Discarding stale generation result {}", request_id);
                return effects;
            }
            let Some(pending) = state.pending.take() else {
                return effects;
            };
            generation_completed(state, &pending.repo_id, result, &mut effects);
        }

        StudioEvent::ReviseRequested(instruction) => {
            request_revision(state, instruction, &mut effects);
        }

        StudioEvent::RevisionCompleted { request_id, result } => {
            if !state.is_current(OperationKind::Revision, request_id) {
                log_debug!("Discarding stale revision result {}", request_id);
                return effects;
            }
            let Some(pending) = state.pending.take() else {
                return effects;
            };
            revision_completed(state, &pending, result, &mut effects);
        }

        StudioEvent::AutoGenerated(update) => auto_generated(state, update, &mut effects),

        StudioEvent::SetRepositoryAutoGeneration { repo_id, enabled } => {
            match state.workspace.repo_mut(&repo_id) {
                Ok(repo) => {
                    repo.auto_generation = enabled;
                    effects.push(SideEffect::Persist(PersistScope::Repositories));
                    effects.push(SideEffect::SyncAutoGeneration);
                }
                Err(e) => state.last_error = Some(e),
            }
        }

        StudioEvent::UpdateSettings(settings) => {
            state.workspace.settings = settings;
            effects.push(SideEffect::Persist(PersistScope::Settings));
            effects.push(SideEffect::SyncAutoGeneration);
        }

        StudioEvent::MarkNotificationRead(id) => {
            if state.workspace.notifications.mark_read(id) {
                effects.push(SideEffect::Persist(PersistScope::Notifications));
            }
        }

        StudioEvent::MarkAllNotificationsRead => {
            state.workspace.notifications.mark_all_read();
            effects.push(SideEffect::Persist(PersistScope::Notifications));
        }
    }

    effects
}

/// Record a notification and emit delivery when enabled
fn notify(
    state: &mut StudioState,
    effects: &mut Vec<SideEffect>,
    title: &str,
    message: String,
    level: NotificationLevel,
    repo_id: Option<String>,
) {
    let notification = state
        .workspace
        .notifications
        .push(title, message, level, repo_id)
        .clone();
    if state.workspace.settings.notifications {
        effects.push(SideEffect::Notify(notification));
    }
    effects.push(SideEffect::Persist(PersistScope::Notifications));
}

fn connect(state: &mut StudioState, url: &str, token: &str, effects: &mut Vec<SideEffect>) {
    match state.workspace.connect(url, token) {
        Ok(repo) => {
            let id = repo.id.clone();
            state.last_error = None;
            effects.push(SideEffect::Persist(PersistScope::Repositories));
            effects.push(SideEffect::Persist(PersistScope::Settings));
            effects.push(SideEffect::SyncAutoGeneration);
            notify(
                state,
                effects,
                "Repository Connected",
                format!("Successfully connected {id}"),
                NotificationLevel::Success,
                Some(id),
            );
        }
        Err(e) => {
            let message = e.to_string();
            state.last_error = Some(e);
            notify(
                state,
                effects,
                "Connection Failed",
                message,
                NotificationLevel::Error,
                None,
            );
        }
    }
}

fn busy_error(state: &StudioState, repo_id: Option<&str>) -> ChangelogError {
    ChangelogError::Busy(
        repo_id
            .or_else(|| state.pending.as_ref().map(|p| p.repo_id.as_str()))
            .unwrap_or_default()
            .to_string(),
    )
}

fn request_generation(state: &mut StudioState, effects: &mut Vec<SideEffect>) {
    let Some(repo) = state.selected_repo().cloned() else {
        state.last_error = Some(ChangelogError::RepositoryNotFound(
            state.selected_repo.clone().unwrap_or_default(),
        ));
        return;
    };
    if state.is_busy() {
        state.last_error = Some(busy_error(state, Some(&repo.id)));
        return;
    }

    let version = if state.version_input.is_empty() {
        repo.history.next_version()
    } else {
        state.version_input.clone()
    };

    let request_id = state.next_request_id();
    state.pending = Some(PendingOperation {
        kind: OperationKind::Generation,
        request_id,
        repo_id: repo.id.clone(),
        entry_id: None,
    });
    state.last_error = None;

    effects.push(SideEffect::Generate {
        request_id,
        repo_id: repo.id,
        repository: repo.repository,
        token: repo.token,
        history: repo.history,
        version,
    });
}

fn generation_completed(
    state: &mut StudioState,
    repo_id: &str,
    result: Result<HistoricalChangelogEntry, ChangelogError>,
    effects: &mut Vec<SideEffect>,
) {
    match result {
        Ok(entry) => {
            let Ok(repo) = state.workspace.repo_mut(repo_id) else {
                log_debug!("Repository {} disconnected before generation finished", repo_id);
                return;
            };
            if repo.history.covered_by_head(&entry) {
                log_debug!(
                    "Dropping generated {} for {}, head already holds its changes",
                    entry.version,
                    repo_id
                );
                state.last_error = Some(ChangelogError::NoNewChanges);
                return;
            }
            let version = entry.version.clone();
            let entry_id = entry.id.clone();
            repo.last_sync = entry.date;
            repo.history.insert_at_head(entry);
            let next_version = repo.history.next_version();

            if state.selected_repo.as_deref() == Some(repo_id) {
                state.reset_conversation();
                state.selected_entry = Some(entry_id);
                state.version_input = next_version;
            }
            state.last_error = None;

            effects.push(SideEffect::Persist(PersistScope::Repositories));
            effects.push(SideEffect::SyncAutoGeneration);
            notify(
                state,
                effects,
                "Changelog Generated",
                format!("Generated changelog for {repo_id} {version}"),
                NotificationLevel::Success,
                Some(repo_id.to_string()),
            );
        }
        Err(ChangelogError::NoNewChanges) => {
            state.last_error = Some(ChangelogError::NoNewChanges);
        }
        Err(e) => {
            let message = e.to_string();
            state.last_error = Some(e);
            notify(
                state,
                effects,
                "Generation Failed",
                message,
                NotificationLevel::Error,
                Some(repo_id.to_string()),
            );
        }
    }
}

fn request_revision(state: &mut StudioState, instruction: String, effects: &mut Vec<SideEffect>) {
    let instruction = instruction.trim().to_string();
    if instruction.is_empty() {
        return;
    }
    if state.is_busy() {
        state.last_error = Some(busy_error(state, state.selected_repo.as_deref()));
        return;
    }
    let Some(entry) = state.selected_entry().cloned() else {
        state.last_error = Some(ChangelogError::EntryNotFound(
            state.selected_entry.clone().unwrap_or_default(),
        ));
        return;
    };

    let request_id = state.next_request_id();
    state.pending = Some(PendingOperation {
        kind: OperationKind::Revision,
        request_id,
        repo_id: entry.repo_id.clone(),
        entry_id: Some(entry.id.clone()),
    });
    state.last_error = None;
    state.transcript.push(ChatMessage::user(instruction.clone()));

    effects.push(SideEffect::Revise {
        request_id,
        repo_id: entry.repo_id,
        session: state.session.clone(),
        instruction,
        current: entry.changelog,
    });
}

fn revision_completed(
    state: &mut StudioState,
    pending: &PendingOperation,
    result: Result<RevisionOutcome, ChangelogError>,
    effects: &mut Vec<SideEffect>,
) {
    match result {
        Ok(outcome) => {
            let entry_id = pending.entry_id.as_deref().unwrap_or_default();
            let updated = state
                .workspace
                .repo_mut(&pending.repo_id)
                .is_ok_and(|repo| repo.history.update_by_id(entry_id, outcome.changelog.clone()));
            if !updated {
                state.last_error = Some(ChangelogError::EntryNotFound(entry_id.to_string()));
                return;
            }

            state.session.record(&outcome);
            state.transcript.push(ChatMessage::model(REVISION_CONFIRMATION));
            state.last_error = None;
            effects.push(SideEffect::Persist(PersistScope::Repositories));
        }
        Err(e) => {
            state
                .transcript
                .push(ChatMessage::model(format!("Sorry, I ran into an error: {e}")));
            state.last_error = Some(e);
        }
    }
}

fn auto_generated(state: &mut StudioState, update: AutoGenerated, effects: &mut Vec<SideEffect>) {
    let AutoGenerated { repo_id, entry } = update;
    let Ok(repo) = state.workspace.repo_mut(&repo_id) else {
        log_debug!("Ignoring auto-generated changelog for unknown {}", repo_id);
        return;
    };
    if repo.history.get(&entry.id).is_some() || repo.history.covered_by_head(&entry) {
        return;
    }

    let version = entry.version.clone();
    let count = entry.pull_request_ids.len();
    repo.last_sync = entry.date;
    repo.history.insert_at_head(entry);
    let next_version = repo.history.next_version();

    if state.selected_repo.as_deref() == Some(repo_id.as_str()) && !state.is_busy() {
        state.version_input = next_version;
    }

    effects.push(SideEffect::Persist(PersistScope::Repositories));
    notify(
        state,
        effects,
        "New Changelog Generated",
        format!("Generated {version} for {repo_id} with {count} new changes"),
        NotificationLevel::Info,
        Some(repo_id.clone()),
    );
}
