//! LLM provider abstraction
//!
//! Providers expose two calls: a one-shot structured generation and a chat
//! call that replays an explicit turn history. No conversation state is kept
//! inside a provider.

mod gemini;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub use gemini::{DEFAULT_GEMINI_BASE_URL, GeminiProvider};

/// Who authored a chat turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    User,
    Model,
}

/// One turn of a chat conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: TurnRole,
    pub text: String,
}

impl ChatTurn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: TurnRole::User,
            text: text.into(),
        }
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: TurnRole::Model,
            text: text.into(),
        }
    }
}

/// A one-shot content generation request
#[derive(Debug, Clone, Default)]
pub struct GenerationRequest {
    pub prompt: String,
    /// Sampling temperature; lower is more deterministic
    pub temperature: Option<f64>,
    /// Structured output schema the response must follow
    pub response_schema: Option<Value>,
}

/// Configuration shared by provider implementations
#[derive(Debug, Clone, Default)]
pub struct LLMProviderConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub max_output_tokens: Option<u32>,
}

/// Static facts about a provider
#[derive(Debug, Clone, Copy)]
pub struct ProviderMetadata {
    pub name: &'static str,
    pub default_model: &'static str,
    pub requires_api_key: bool,
}

/// A hosted LLM the pipeline can call
#[async_trait]
pub trait LLMProvider: Send + Sync {
    /// Generate content for a single prompt
    async fn generate_content(&self, request: &GenerationRequest) -> Result<String>;

    /// Continue a conversation; `turns` is the full history ending with the new user turn
    async fn chat(&self, system_instruction: &str, turns: &[ChatTurn]) -> Result<String>;
}

/// Metadata for the built-in provider
pub fn get_metadata() -> ProviderMetadata {
    gemini::get_metadata()
}
