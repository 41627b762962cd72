use std::sync::Arc;
use std::time::Duration;

use super::prompt::create_synthesis_prompt;
use crate::error::ChangelogError;
use crate::llm_providers::{GenerationRequest, LLMProvider};
use crate::types::{Changelog, PullRequest};
use crate::{log_debug, log_error};

const SYNTHESIS_OPERATION: &str = "Changelog synthesis";

/// Default sampling temperature; low to keep categorization consistent
pub const DEFAULT_SYNTHESIS_TEMPERATURE: f64 = 0.2;

/// One-shot changelog generation from a batch of merged PRs
#[derive(Clone)]
pub struct ChangelogSynthesizer {
    provider: Arc<dyn LLMProvider>,
    temperature: f64,
    timeout: Duration,
}

impl ChangelogSynthesizer {
    pub fn new(provider: Arc<dyn LLMProvider>, temperature: f64, timeout: Duration) -> Self {
        Self {
            provider,
            temperature,
            timeout,
        }
    }

    /// Generate a changelog for `version`.
    ///
    /// An empty batch returns an empty changelog without contacting the LLM.
    pub async fn synthesize(
        &self,
        pull_requests: &[PullRequest],
        version: &str,
    ) -> Result<Changelog, ChangelogError> {
        if pull_requests.is_empty() {
            log_debug!("No pull requests for {}; skipping LLM call", version);
            return Ok(Changelog::default());
        }

        let request = GenerationRequest {
            prompt: create_synthesis_prompt(pull_requests, version),
            temperature: Some(self.temperature),
            response_schema: Some(Changelog::response_schema()),
        };

        log_debug!(
            "Synthesizing {} from {} pull requests",
            version,
            pull_requests.len()
        );

        let response =
            match tokio::time::timeout(self.timeout, self.provider.generate_content(&request)).await
            {
                Ok(Ok(text)) => text,
                Ok(Err(e)) => {
                    log_error!("Error calling LLM for generation: {}", e);
                    return Err(ChangelogError::Synthesis(e.to_string()));
                }
                Err(_) => {
                    log_error!("LLM generation timed out after {:?}", self.timeout);
                    return Err(ChangelogError::Timeout {
                        operation: SYNTHESIS_OPERATION,
                        seconds: self.timeout.as_secs(),
                    });
                }
            };

        Changelog::from_llm_response(&response).map_err(|e| {
            log_debug!("Rejected synthesis response: {} text: {}", e, response);
            ChangelogError::Synthesis(e)
        })
    }
}
