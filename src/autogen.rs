//! Interval-based auto-generation
//!
//! Polls every enabled repository for newly merged PRs and synthesizes the
//! next changelog when there are any. This is a best-effort poller, not a
//! durable scheduler: nothing is persisted here and missed ticks are not
//! replayed. Results are handed to a sink; the owner of the workspace applies
//! them.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::error::ChangelogError;
use crate::history::HistoricalChangelogEntry;
use crate::services::{EditLocks, GenerationService};
use crate::workspace::ConnectedRepo;
use crate::{log_debug, log_error, log_info};

const MIN_INTERVAL: Duration = Duration::from_secs(1);

/// What to poll and how often
#[derive(Debug, Clone)]
pub struct AutoGenerationConfig {
    pub interval: Duration,
    pub repositories: Vec<ConnectedRepo>,
}

/// A changelog produced by the poller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AutoGenerated {
    pub repo_id: String,
    pub entry: HistoricalChangelogEntry,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AutoGenerationStatus {
    pub running: bool,
    pub repositories: usize,
    pub last_check: Option<DateTime<Utc>>,
}

/// Shared between the handle and the spawned loop
#[derive(Clone)]
struct Poller {
    service: GenerationService,
    locks: EditLocks,
    repositories: Arc<Mutex<Vec<ConnectedRepo>>>,
    last_check: Arc<Mutex<Option<DateTime<Utc>>>>,
}

impl Poller {
    async fn check_all(&self, sink: &UnboundedSender<AutoGenerated>) -> usize {
        let snapshot = self.repositories.lock().clone();
        log_debug!("Checking {} repositories for new changes", snapshot.len());

        let mut generated = 0;
        for repo in snapshot {
            match self.check_repository(repo).await {
                Ok(Some(update)) => {
                    generated += 1;
                    if sink.send(update).is_err() {
                        log_debug!("Auto-generation sink closed; dropping result");
                    }
                }
                Ok(None) => {}
                Err((repo_id, e)) => {
                    log_error!("Error checking repository {}: {}", repo_id, e);
                }
            }
        }

        *self.last_check.lock() = Some(Utc::now());
        generated
    }

    async fn check_repository(
        &self,
        mut repo: ConnectedRepo,
    ) -> Result<Option<AutoGenerated>, (String, ChangelogError)> {
        let Some(_lease) = self.locks.try_acquire(&repo.id) else {
            log_debug!("Skipping {}: an edit is in progress", repo.id);
            return Ok(None);
        };

        match self.service.generate_into(&mut repo, None).await {
            Ok(entry) => {
                log_info!(
                    "Generated changelog {} for {} with {} new changes",
                    entry.version,
                    repo.id,
                    entry.pull_request_ids.len()
                );
                let repo_id = repo.id.clone();
                self.replace_repository(repo);
                Ok(Some(AutoGenerated { repo_id, entry }))
            }
            Err(ChangelogError::NoNewChanges) => {
                log_debug!("No new changes for {}", repo.id);
                Ok(None)
            }
            Err(e) => Err((repo.id, e)),
        }
    }

    fn replace_repository(&self, repo: ConnectedRepo) {
        let mut repositories = self.repositories.lock();
        if let Some(slot) = repositories.iter_mut().find(|r| r.id == repo.id) {
            *slot = repo;
        }
    }
}

/// Handle to the background poller
pub struct AutoGenerator {
    poller: Poller,
    cancel: Option<CancellationToken>,
    task: Option<JoinHandle<()>>,
}

impl AutoGenerator {
    pub fn new(service: GenerationService, locks: EditLocks) -> Self {
        Self {
            poller: Poller {
                service,
                locks,
                repositories: Arc::new(Mutex::new(Vec::new())),
                last_check: Arc::new(Mutex::new(None)),
            },
            cancel: None,
            task: None,
        }
    }

    /// Start polling; the first check runs immediately.
    ///
    /// Restarts the loop if it is already running.
    pub fn start(&mut self, config: AutoGenerationConfig, sink: UnboundedSender<AutoGenerated>) {
        self.stop();
        self.update_repositories(config.repositories);

        let interval = config.interval.max(MIN_INTERVAL);
        let cancel = CancellationToken::new();
        let poller = self.poller.clone();
        let token = cancel.clone();

        log_info!("Starting auto-generation every {:?}", interval);
        self.task = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    () = token.cancelled() => break,
                    _ = ticker.tick() => {}
                }
                tokio::select! {
                    () = token.cancelled() => break,
                    _ = poller.check_all(&sink) => {}
                }
            }
            log_debug!("Auto-generation loop exited");
        }));
        self.cancel = Some(cancel);
    }

    pub fn stop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel.cancel();
            log_info!("Auto-generation stopped");
        }
        self.task = None;
    }

    /// Replace the set of repositories checked on the next tick
    pub fn update_repositories(&self, repositories: Vec<ConnectedRepo>) {
        *self.poller.repositories.lock() = repositories;
    }

    /// Run one pass over every repository now; returns how many were generated
    pub async fn check_now(&self, sink: &UnboundedSender<AutoGenerated>) -> usize {
        self.poller.check_all(sink).await
    }

    pub fn status(&self) -> AutoGenerationStatus {
        AutoGenerationStatus {
            running: self.is_running(),
            repositories: self.poller.repositories.lock().len(),
            last_check: *self.poller.last_check.lock(),
        }
    }

    pub fn is_running(&self) -> bool {
        self.cancel.as_ref().is_some_and(|c| !c.is_cancelled())
            && self.task.as_ref().is_some_and(|t| !t.is_finished())
    }
}

impl Drop for AutoGenerator {
    fn drop(&mut self) {
        self.stop();
    }
}
