//! In-app notification list and delivery
//!
//! Every notification is recorded in the `NotificationCenter`. Outbound
//! delivery goes through a `Notifier` and only happens when enabled in
//! settings.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::Display;

use crate::{log_error, log_info, log_warn};

/// Maximum notifications retained (oldest dropped first)
pub const MAX_NOTIFICATIONS: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum NotificationLevel {
    Success,
    Error,
    Info,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppNotification {
    pub id: u64,
    pub title: String,
    pub message: String,
    pub level: NotificationLevel,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub read: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repo_id: Option<String>,
}

/// Outbound delivery of a notification
pub trait Notifier: Send + Sync {
    fn deliver(&self, notification: &AppNotification);
}

/// Delivers notifications to the log
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn deliver(&self, notification: &AppNotification) {
        match notification.level {
            NotificationLevel::Error => {
                log_error!("{}: {}", notification.title, notification.message);
            }
            NotificationLevel::Warning => {
                log_warn!("{}: {}", notification.title, notification.message);
            }
            NotificationLevel::Success | NotificationLevel::Info => {
                log_info!("{}: {}", notification.title, notification.message);
            }
        }
    }
}

/// Most-recent-first notification list
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct NotificationCenter {
    items: Vec<AppNotification>,
}

impl NotificationCenter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a new unread notification and return it
    pub fn push(
        &mut self,
        title: impl Into<String>,
        message: impl Into<String>,
        level: NotificationLevel,
        repo_id: Option<String>,
    ) -> &AppNotification {
        let id = self.items.iter().map(|n| n.id).max().map_or(1, |max| max + 1);
        self.items.insert(
            0,
            AppNotification {
                id,
                title: title.into(),
                message: message.into(),
                level,
                timestamp: Utc::now(),
                read: false,
                repo_id,
            },
        );
        self.items.truncate(MAX_NOTIFICATIONS);
        &self.items[0]
    }

    /// Returns `false` if no notification has `id`
    pub fn mark_read(&mut self, id: u64) -> bool {
        match self.items.iter_mut().find(|n| n.id == id) {
            Some(notification) => {
                notification.read = true;
                true
            }
            None => false,
        }
    }

    pub fn mark_all_read(&mut self) {
        for notification in &mut self.items {
            notification.read = true;
        }
    }

    pub fn unread_count(&self) -> usize {
        self.items.iter().filter(|n| !n.read).count()
    }

    pub fn iter(&self) -> impl Iterator<Item = &AppNotification> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
