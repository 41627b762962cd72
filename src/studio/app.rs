//! Main application for the changelog studio
//!
//! Owns the state, runs the reducer, and executes side effects. Async work is
//! spawned onto the runtime and reports back through a channel as result
//! events carrying the request id it was started with.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::sync::mpsc;
use tracing::Instrument;

use super::events::{PersistScope, SideEffect, StudioEvent};
use super::reducer::reduce;
use super::state::StudioState;
use crate::autogen::{AutoGenerationConfig, AutoGenerationStatus, AutoGenerator};
use crate::changelog::{ChangelogReviser, ChangelogSynthesizer};
use crate::config::Config;
use crate::error::ChangelogError;
use crate::github::GitHubClient;
use crate::llm::create_provider;
use crate::notifications::{LogNotifier, Notifier};
use crate::services::{EditLocks, GenerationService};
use crate::storage::{FileStore, KeyValueStore};
use crate::workspace::Workspace;
use crate::{log_debug, log_error};

/// The changelog studio application
pub struct StudioApp {
    /// Application state
    pub state: StudioState,
    store: Arc<dyn KeyValueStore>,
    generation: GenerationService,
    reviser: ChangelogReviser,
    notifier: Arc<dyn Notifier>,
    locks: EditLocks,
    auto_generator: AutoGenerator,
    /// Channel receiver for async results
    result_rx: mpsc::UnboundedReceiver<StudioEvent>,
    /// Channel sender for async results (kept for spawning tasks)
    result_tx: mpsc::UnboundedSender<StudioEvent>,
}

impl StudioApp {
    pub fn new(
        workspace: Workspace,
        store: Arc<dyn KeyValueStore>,
        generation: GenerationService,
        reviser: ChangelogReviser,
        notifier: Arc<dyn Notifier>,
        locks: EditLocks,
    ) -> Self {
        let (result_tx, result_rx) = mpsc::unbounded_channel();
        let auto_generator = AutoGenerator::new(generation.clone(), locks.clone());

        Self {
            state: StudioState::new(workspace),
            store,
            generation,
            reviser,
            notifier,
            locks,
            auto_generator,
            result_rx,
            result_tx,
        }
    }

    /// Wire up the real GitHub client, LLM provider and file store
    pub fn from_config(config: &Config) -> Result<Self> {
        let store: Arc<dyn KeyValueStore> = Arc::new(FileStore::new(config.storage_dir()?)?);
        let workspace = Workspace::load(store.as_ref()).context("Failed to load workspace")?;

        let provider = create_provider(config)?;
        let github = GitHubClient::with_base_url(&config.github.api_url, config.github.timeout())?;
        let synthesizer = ChangelogSynthesizer::new(
            Arc::clone(&provider),
            config.llm.temperature,
            config.llm.timeout(),
        );
        let generation = GenerationService::new(Arc::new(github), synthesizer);
        let reviser = ChangelogReviser::new(provider, config.llm.timeout());

        Ok(Self::new(
            workspace,
            store,
            generation,
            reviser,
            Arc::new(LogNotifier),
            EditLocks::new(),
        ))
    }

    /// Replace how notifications are delivered
    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn locks(&self) -> &EditLocks {
        &self.locks
    }

    /// Run the reducer on `event` and execute the resulting effects.
    ///
    /// Every effect is attempted; the first persistence failure is returned.
    pub fn dispatch(&mut self, event: StudioEvent) -> Result<()> {
        let effects = reduce(&mut self.state, event);
        let mut first_error = None;
        for effect in effects {
            if let Err(e) = self.execute(effect) {
                log_error!("Side effect failed: {:#}", e);
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    fn execute(&mut self, effect: SideEffect) -> Result<()> {
        match effect {
            SideEffect::Generate {
                request_id,
                repo_id,
                repository,
                token,
                history,
                version,
            } => {
                let tx = self.result_tx.clone();
                let Some(lease) = self.locks.try_acquire(&repo_id) else {
                    let _ = tx.send(StudioEvent::GenerationCompleted {
                        request_id,
                        result: Err(ChangelogError::Busy(repo_id)),
                    });
                    return Ok(());
                };
                let service = self.generation.clone();
                let span = tracing::info_span!("generate", repo = %repo_id, request_id);
                tokio::spawn(
                    async move {
                        let result = service
                            .generate(&repository, &token, &history, &version)
                            .await;
                        drop(lease);
                        tracing::info!(ok = result.is_ok(), "Generation finished");
                        let _ = tx.send(StudioEvent::GenerationCompleted { request_id, result });
                    }
                    .instrument(span),
                );
            }
            SideEffect::Revise {
                request_id,
                repo_id,
                session,
                instruction,
                current,
            } => {
                let tx = self.result_tx.clone();
                let Some(lease) = self.locks.try_acquire(&repo_id) else {
                    let _ = tx.send(StudioEvent::RevisionCompleted {
                        request_id,
                        result: Err(ChangelogError::Busy(repo_id)),
                    });
                    return Ok(());
                };
                let reviser = self.reviser.clone();
                let span = tracing::info_span!("revise", repo = %repo_id, request_id);
                tokio::spawn(
                    async move {
                        let result = reviser.revise(&session, &instruction, &current).await;
                        drop(lease);
                        tracing::info!(ok = result.is_ok(), "Revision finished");
                        let _ = tx.send(StudioEvent::RevisionCompleted { request_id, result });
                    }
                    .instrument(span),
                );
            }
            SideEffect::Persist(scope) => {
                let workspace = &self.state.workspace;
                let store = self.store.as_ref();
                match scope {
                    PersistScope::Repositories => workspace.save_repositories(store)?,
                    PersistScope::Settings => workspace.save_settings(store)?,
                    PersistScope::Notifications => workspace.save_notifications(store)?,
                }
            }
            SideEffect::Notify(notification) => self.notifier.deliver(&notification),
            SideEffect::SyncAutoGeneration => {
                self.auto_generator
                    .update_repositories(self.state.workspace.auto_generation_repos());
            }
        }
        Ok(())
    }

    /// Wait for the next async result and apply it
    pub async fn process_next(&mut self) -> Result<bool> {
        match self.result_rx.recv().await {
            Some(event) => {
                self.dispatch(event)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Apply results until no generation or revision is in flight
    pub async fn settle(&mut self) -> Result<()> {
        while self.state.is_busy() {
            if !self.process_next().await? {
                break;
            }
        }
        Ok(())
    }

    /// Start polling every enabled repository; results arrive as `AutoGenerated` events
    pub fn start_auto_generation(&mut self, interval: Duration) {
        let (auto_tx, mut auto_rx) = mpsc::unbounded_channel();
        let tx = self.result_tx.clone();
        tokio::spawn(async move {
            while let Some(update) = auto_rx.recv().await {
                if tx.send(StudioEvent::AutoGenerated(update)).is_err() {
                    break;
                }
            }
            log_debug!("Auto-generation forwarder exited");
        });

        self.auto_generator.start(
            AutoGenerationConfig {
                interval,
                repositories: self.state.workspace.auto_generation_repos(),
            },
            auto_tx,
        );
    }

    pub fn stop_auto_generation(&mut self) {
        self.auto_generator.stop();
    }

    pub fn auto_generation_status(&self) -> AutoGenerationStatus {
        self.auto_generator.status()
    }
}
