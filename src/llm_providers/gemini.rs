use super::{
    ChatTurn, GenerationRequest, LLMProvider, LLMProviderConfig, ProviderMetadata, TurnRole,
};
use crate::log_debug;
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Value, json};

/// Public Gemini REST endpoint
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Represents the Gemini LLM provider
pub struct GeminiProvider {
    config: LLMProviderConfig,
    client: Client,
}

impl GeminiProvider {
    /// Creates a new instance of `GeminiProvider` with the given configuration
    pub fn new(config: LLMProviderConfig) -> Self {
        Self {
            config,
            client: Client::new(),
        }
    }

    fn model(&self) -> &str {
        if self.config.model.is_empty() {
            DEFAULT_MODEL
        } else {
            &self.config.model
        }
    }

    fn endpoint(&self) -> String {
        let base = if self.config.base_url.is_empty() {
            DEFAULT_GEMINI_BASE_URL
        } else {
            self.config.base_url.trim_end_matches('/')
        };
        format!("{}/models/{}:generateContent", base, self.model())
    }

    fn generation_config(&self) -> Value {
        let mut config = json!({});
        if let Some(max_tokens) = self.config.max_output_tokens {
            config["maxOutputTokens"] = json!(max_tokens);
        }
        config
    }

    async fn post(&self, body: &Value) -> Result<String> {
        log_debug!("Gemini request to model {}", self.model());

        let response = self
            .client
            .post(self.endpoint())
            .header("Content-Type", "application/json")
            .header("x-goog-api-key", &self.config.api_key)
            .json(body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await?;
            return Err(anyhow!(
                "Gemini API request failed with status {}: {}",
                status,
                text
            ));
        }

        let response_body: Value = response.json().await?;
        extract_text(&response_body)
    }
}

/// Concatenate the text parts of the first candidate
fn extract_text(response_body: &Value) -> Result<String> {
    let Some(parts) = response_body["candidates"][0]["content"]["parts"].as_array() else {
        let reason = response_body["promptFeedback"]["blockReason"]
            .as_str()
            .unwrap_or("no candidates returned");
        return Err(anyhow!("Failed to extract content from Gemini API response: {reason}"));
    };

    let text: String = parts.iter().filter_map(|p| p["text"].as_str()).collect();
    if text.is_empty() {
        return Err(anyhow!("Gemini API response contained no text"));
    }
    Ok(text)
}

const fn role_name(role: TurnRole) -> &'static str {
    match role {
        TurnRole::User => "user",
        TurnRole::Model => "model",
    }
}

#[async_trait]
impl LLMProvider for GeminiProvider {
    async fn generate_content(&self, request: &GenerationRequest) -> Result<String> {
        let mut generation_config = self.generation_config();
        if let Some(temperature) = request.temperature {
            generation_config["temperature"] = json!(temperature);
        }
        if let Some(schema) = &request.response_schema {
            generation_config["responseMimeType"] = json!("application/json");
            generation_config["responseSchema"] = schema.clone();
        }

        let body = json!({
            "contents": [
                { "role": "user", "parts": [{ "text": request.prompt }] }
            ],
            "generationConfig": generation_config
        });

        self.post(&body).await
    }

    async fn chat(&self, system_instruction: &str, turns: &[ChatTurn]) -> Result<String> {
        let contents: Vec<Value> = turns
            .iter()
            .map(|turn| json!({ "role": role_name(turn.role), "parts": [{ "text": turn.text }] }))
            .collect();

        let body = json!({
            "systemInstruction": { "parts": [{ "text": system_instruction }] },
            "contents": contents,
            "generationConfig": self.generation_config()
        });

        self.post(&body).await
    }
}

pub(super) fn get_metadata() -> ProviderMetadata {
    ProviderMetadata {
        name: "Gemini",
        default_model: DEFAULT_MODEL,
        requires_api_key: true,
    }
}
