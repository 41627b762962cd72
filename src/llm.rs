use crate::config::{Config, LlmConfig};
use crate::llm_providers::{GeminiProvider, LLMProvider, LLMProviderConfig, get_metadata};
use crate::log_debug;
use anyhow::{Result, anyhow};
use std::sync::Arc;

/// Build the configured provider
pub fn create_provider(config: &Config) -> Result<Arc<dyn LLMProvider>> {
    validate_provider_config(config)?;
    log_debug!(
        "Creating {} provider with model {}",
        get_metadata().name,
        config.llm.model
    );
    Ok(Arc::new(GeminiProvider::new(provider_config(&config.llm))))
}

/// Translate user configuration into provider configuration
pub fn provider_config(llm: &LlmConfig) -> LLMProviderConfig {
    LLMProviderConfig {
        api_key: llm.api_key.clone(),
        model: llm.model.clone(),
        base_url: llm.base_url.clone(),
        max_output_tokens: Some(llm.max_output_tokens),
    }
}

/// Validates the provider configuration
pub fn validate_provider_config(config: &Config) -> Result<()> {
    if get_metadata().requires_api_key && config.llm.api_key.is_empty() {
        return Err(anyhow!(
            "API key required for provider: {}",
            get_metadata().name
        ));
    }
    config.validate_settings()
}

/// Returns the default model for the built-in provider
pub fn get_default_model() -> &'static str {
    get_metadata().default_model
}
