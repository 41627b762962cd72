use std::sync::Arc;
use std::time::Duration;

use super::prompt::{create_revision_system_instruction, create_revision_turn};
use crate::error::ChangelogError;
use crate::llm_providers::{ChatTurn, LLMProvider};
use crate::types::Changelog;
use crate::{log_debug, log_error};

const REVISION_OPERATION: &str = "Changelog revision";

/// Transcript line appended after a successful revision
pub const REVISION_CONFIRMATION: &str = "Here's the updated changelog.";

/// Conversation state for one editing context.
///
/// Owns the fixed system instruction and the append-only turn history that
/// is replayed on every revision call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevisionSession {
    system_instruction: String,
    turns: Vec<ChatTurn>,
}

impl Default for RevisionSession {
    fn default() -> Self {
        Self::new()
    }
}

impl RevisionSession {
    pub fn new() -> Self {
        Self::with_instruction(create_revision_system_instruction())
    }

    pub fn with_instruction(system_instruction: impl Into<String>) -> Self {
        Self {
            system_instruction: system_instruction.into(),
            turns: Vec::new(),
        }
    }

    pub fn system_instruction(&self) -> &str {
        &self.system_instruction
    }

    pub fn turns(&self) -> &[ChatTurn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Append the exchange of a successful revision
    pub fn record(&mut self, outcome: &RevisionOutcome) {
        self.turns.push(outcome.user_turn.clone());
        self.turns.push(outcome.model_turn.clone());
    }
}

/// Result of a successful revision call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevisionOutcome {
    /// The full revised changelog
    pub changelog: Changelog,
    /// The turn that was sent
    pub user_turn: ChatTurn,
    /// The raw model reply
    pub model_turn: ChatTurn,
}

/// Applies user instructions to a changelog through the chat call
#[derive(Clone)]
pub struct ChangelogReviser {
    provider: Arc<dyn LLMProvider>,
    timeout: Duration,
}

impl ChangelogReviser {
    pub fn new(provider: Arc<dyn LLMProvider>, timeout: Duration) -> Self {
        Self { provider, timeout }
    }

    /// Send one edit instruction over `session` without mutating it.
    ///
    /// The caller records the outcome on success; on failure nothing changes.
    pub async fn revise(
        &self,
        session: &RevisionSession,
        instruction: &str,
        current: &Changelog,
    ) -> Result<RevisionOutcome, ChangelogError> {
        let instruction = instruction.trim();
        if instruction.is_empty() {
            return Err(ChangelogError::Revision(
                "the edit instruction is empty".to_string(),
            ));
        }

        let user_turn = ChatTurn::user(create_revision_turn(instruction, current));
        let mut turns = session.turns().to_vec();
        turns.push(user_turn.clone());

        log_debug!(
            "Sending revision with {} prior turns: {}",
            session.len(),
            instruction
        );

        let reply = match tokio::time::timeout(
            self.timeout,
            self.provider.chat(session.system_instruction(), &turns),
        )
        .await
        {
            Ok(Ok(text)) => text,
            Ok(Err(e)) => {
                log_error!("Revision chat error: {}", e);
                return Err(ChangelogError::Revision(e.to_string()));
            }
            Err(_) => {
                log_error!("Revision chat timed out after {:?}", self.timeout);
                return Err(ChangelogError::Timeout {
                    operation: REVISION_OPERATION,
                    seconds: self.timeout.as_secs(),
                });
            }
        };

        let changelog = Changelog::from_llm_response(&reply).map_err(|e| {
            log_debug!("Rejected revision response: {} text: {}", e, reply);
            ChangelogError::Revision(e)
        })?;

        Ok(RevisionOutcome {
            changelog,
            user_turn,
            model_turn: ChatTurn::model(reply.trim()),
        })
    }

    /// Revise and record the exchange in `session` on success
    pub async fn revise_in_session(
        &self,
        session: &mut RevisionSession,
        instruction: &str,
        current: &Changelog,
    ) -> Result<Changelog, ChangelogError> {
        let outcome = self.revise(session, instruction, current).await?;
        session.record(&outcome);
        Ok(outcome.changelog)
    }
}
