//! Connected repositories, settings and notifications
//!
//! The workspace is the persisted state of the application. It is loaded from
//! and saved to a `KeyValueStore` under fixed keys.

use std::fmt;

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ChangelogError;
use crate::github::RepositoryRef;
use crate::history::VersionHistory;
use crate::log_debug;
use crate::notifications::{AppNotification, NotificationCenter, NotificationLevel, Notifier};
use crate::storage::{
    CONNECTED_REPOSITORIES_KEY, KeyValueStore, NOTIFICATIONS_KEY, SETTINGS_KEY, load_json,
    save_json,
};

const REDACTED: &str = "<redacted>";

pub(crate) fn redact(token: &str) -> &'static str {
    if token.is_empty() { "<empty>" } else { REDACTED }
}

/// A repository the user connected, with its changelog history
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ConnectedRepo {
    /// `owner/name`
    pub id: String,
    #[serde(flatten)]
    pub repository: RepositoryRef,
    pub token: String,
    /// Most recent first
    #[serde(rename = "changelogs", default)]
    pub history: VersionHistory,
    pub last_sync: DateTime<Utc>,
    #[serde(default = "default_true")]
    pub auto_generation: bool,
}

impl ConnectedRepo {
    pub fn new(repository: RepositoryRef, token: impl Into<String>) -> Self {
        Self {
            id: repository.full_name(),
            repository,
            token: token.into(),
            history: VersionHistory::new(),
            last_sync: Utc::now(),
            auto_generation: true,
        }
    }
}

impl fmt::Debug for ConnectedRepo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectedRepo")
            .field("id", &self.id)
            .field("repository", &self.repository)
            .field("token", &redact(&self.token))
            .field("history", &self.history.len())
            .field("last_sync", &self.last_sync)
            .field("auto_generation", &self.auto_generation)
            .finish()
    }
}

const fn default_true() -> bool {
    true
}

/// User-level preferences
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AppSettings {
    /// Deliver notifications through the notifier
    #[serde(default = "default_true")]
    pub notifications: bool,
    /// Default auto-generation flag for new connections, and the poller master switch
    #[serde(default = "default_true")]
    pub auto_generation: bool,
    /// Token reused when a connection does not supply one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub global_token: Option<String>,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            notifications: true,
            auto_generation: true,
            global_token: None,
        }
    }
}

impl fmt::Debug for AppSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppSettings")
            .field("notifications", &self.notifications)
            .field("auto_generation", &self.auto_generation)
            .field("global_token", &self.global_token.as_deref().map(redact))
            .finish()
    }
}

/// All persisted application state
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Workspace {
    repos: Vec<ConnectedRepo>,
    pub settings: AppSettings,
    pub notifications: NotificationCenter,
}

impl Workspace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every persisted section; missing keys fall back to defaults
    pub fn load(store: &dyn KeyValueStore) -> Result<Self> {
        let repos: Vec<ConnectedRepo> =
            load_json(store, CONNECTED_REPOSITORIES_KEY)?.unwrap_or_default();
        let settings = load_json(store, SETTINGS_KEY)?.unwrap_or_default();
        let notifications = load_json(store, NOTIFICATIONS_KEY)?.unwrap_or_default();
        log_debug!("Loaded workspace with {} repositories", repos.len());
        Ok(Self {
            repos,
            settings,
            notifications,
        })
    }

    pub fn save(&self, store: &dyn KeyValueStore) -> Result<()> {
        self.save_repositories(store)?;
        self.save_settings(store)?;
        self.save_notifications(store)
    }

    pub fn save_repositories(&self, store: &dyn KeyValueStore) -> Result<()> {
        save_json(store, CONNECTED_REPOSITORIES_KEY, &self.repos)
    }

    pub fn save_settings(&self, store: &dyn KeyValueStore) -> Result<()> {
        save_json(store, SETTINGS_KEY, &self.settings)
    }

    pub fn save_notifications(&self, store: &dyn KeyValueStore) -> Result<()> {
        save_json(store, NOTIFICATIONS_KEY, &self.notifications)
    }

    /// Connect a repository by URL.
    ///
    /// An empty token falls back to the global token. The first token ever
    /// connected becomes the global token.
    pub fn connect(&mut self, url: &str, token: &str) -> Result<&ConnectedRepo, ChangelogError> {
        let repository = RepositoryRef::parse(url)?;
        let id = repository.full_name();
        if self.repos.iter().any(|r| r.id == id) {
            return Err(ChangelogError::AlreadyConnected(id));
        }

        let token = match token.trim() {
            "" => self.settings.global_token.clone().unwrap_or_default(),
            t => t.to_string(),
        };
        let mut repo = ConnectedRepo::new(repository, token.as_str());
        repo.auto_generation = self.settings.auto_generation;

        if self.settings.global_token.is_none() && !token.is_empty() {
            self.settings.global_token = Some(token);
        }

        log_debug!("Connected repository {}", id);
        self.repos.push(repo);
        let index = self.repos.len() - 1;
        Ok(&self.repos[index])
    }

    /// Remove a repository along with its token and history
    pub fn disconnect(&mut self, id: &str) -> Result<ConnectedRepo, ChangelogError> {
        let id = self.resolve_id(id);
        let index = self
            .repos
            .iter()
            .position(|r| r.id == id)
            .ok_or_else(|| ChangelogError::RepositoryNotFound(id.clone()))?;
        log_debug!("Disconnected repository {}", id);
        Ok(self.repos.remove(index))
    }

    /// Accept either an `owner/name` id or a repository URL
    pub fn resolve_id(&self, id_or_url: &str) -> String {
        let trimmed = id_or_url.trim();
        RepositoryRef::parse(trimmed).map_or_else(|_| trimmed.to_string(), |r| r.full_name())
    }

    pub fn repo(&self, id: &str) -> Result<&ConnectedRepo, ChangelogError> {
        let id = self.resolve_id(id);
        self.repos
            .iter()
            .find(|r| r.id == id)
            .ok_or(ChangelogError::RepositoryNotFound(id))
    }

    pub fn repo_mut(&mut self, id: &str) -> Result<&mut ConnectedRepo, ChangelogError> {
        let id = self.resolve_id(id);
        self.repos
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or(ChangelogError::RepositoryNotFound(id))
    }

    pub fn repos(&self) -> &[ConnectedRepo] {
        &self.repos
    }

    /// Repositories the poller should check
    pub fn auto_generation_repos(&self) -> Vec<ConnectedRepo> {
        if !self.settings.auto_generation {
            return Vec::new();
        }
        self.repos
            .iter()
            .filter(|r| r.auto_generation)
            .cloned()
            .collect()
    }

    /// Record a notification and deliver it when notifications are enabled
    pub fn notify(
        &mut self,
        notifier: &dyn Notifier,
        title: &str,
        message: &str,
        level: NotificationLevel,
        repo_id: Option<String>,
    ) -> AppNotification {
        let notification = self
            .notifications
            .push(title, message, level, repo_id)
            .clone();
        if self.settings.notifications {
            notifier.deliver(&notification);
        }
        notification
    }
}
