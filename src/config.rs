use crate::changelog::DEFAULT_SYNTHESIS_TEMPERATURE;
use crate::github::DEFAULT_API_URL;
use crate::llm::get_default_model;
use crate::llm_providers::DEFAULT_GEMINI_BASE_URL;
use crate::log_debug;

use anyhow::{Context, Result, anyhow};
use dirs::{config_dir, data_dir};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variables checked (in order) for the LLM API key
pub const API_KEY_ENV_VARS: &[&str] = &["GEMINI_API_KEY", "API_KEY"];

const APP_DIR: &str = "aria-changelog";

/// Configuration structure for the changelog assistant
#[derive(Deserialize, Serialize, Clone, Debug, Default)]
pub struct Config {
    /// LLM provider settings
    #[serde(default)]
    pub llm: LlmConfig,
    /// GitHub API settings
    #[serde(default)]
    pub github: GitHubConfig,
    /// Polling auto-generation settings
    #[serde(default)]
    pub auto_generation: AutoGenerationSettings,
    /// Override for where connected repositories and history are stored
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
    /// Flag indicating the api key came from the environment and must not be saved
    #[serde(skip)]
    pub api_key_from_env: bool,
    /// Key as read from the config file, written back when the active key came from the environment
    #[serde(skip)]
    pub stored_api_key: String,
}

/// LLM provider configuration
#[derive(Deserialize, Serialize, Clone, Debug)]
pub struct LlmConfig {
    /// API key for the provider
    #[serde(default)]
    pub api_key: String,
    /// Model used for synthesis and revision
    #[serde(default = "default_model")]
    pub model: String,
    /// Sampling temperature for synthesis
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,
    /// Timeout for a single LLM call, in seconds
    #[serde(default = "default_llm_timeout")]
    pub timeout_seconds: u64,
    #[serde(default = "default_llm_base_url")]
    pub base_url: String,
}

/// GitHub API configuration
#[derive(Deserialize, Serialize, Clone, Debug)]
pub struct GitHubConfig {
    #[serde(default = "default_github_api_url")]
    pub api_url: String,
    /// Timeout for a single GitHub request, in seconds
    #[serde(default = "default_github_timeout")]
    pub timeout_seconds: u64,
}

/// Auto-generation poller configuration
#[derive(Deserialize, Serialize, Clone, Debug)]
pub struct AutoGenerationSettings {
    /// Seconds between repository checks
    #[serde(default = "default_interval")]
    pub interval_seconds: u64,
}

fn default_model() -> String {
    get_default_model().to_string()
}

fn default_temperature() -> f64 {
    DEFAULT_SYNTHESIS_TEMPERATURE
}

fn default_max_output_tokens() -> u32 {
    8192
}

fn default_llm_timeout() -> u64 {
    60
}

fn default_llm_base_url() -> String {
    DEFAULT_GEMINI_BASE_URL.to_string()
}

fn default_github_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_github_timeout() -> u64 {
    30
}

fn default_interval() -> u64 {
    300
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: default_model(),
            temperature: default_temperature(),
            max_output_tokens: default_max_output_tokens(),
            timeout_seconds: default_llm_timeout(),
            base_url: default_llm_base_url(),
        }
    }
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            api_url: default_github_api_url(),
            timeout_seconds: default_github_timeout(),
        }
    }
}

impl Default for AutoGenerationSettings {
    fn default() -> Self {
        Self {
            interval_seconds: default_interval(),
        }
    }
}

impl LlmConfig {
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

impl GitHubConfig {
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

impl AutoGenerationSettings {
    pub const fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_seconds)
    }
}

impl Config {
    /// Load the configuration from the user config file, then apply environment overrides
    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path()?;
        let mut config = Self::load_from(&config_path)?;
        config.apply_env_overrides(|name| std::env::var(name).ok());
        log_debug!(
            "Configuration loaded from {} (model: {})",
            config_path.display(),
            config.llm.model
        );
        Ok(config)
    }

    /// Load configuration from a specific file, falling back to defaults if it does not exist
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let config_content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let mut config: Self = toml::from_str(&config_content).map_err(|e| {
            anyhow!(
                "Invalid configuration file format: {}. Please check {} for syntax errors.",
                e,
                path.display()
            )
        })?;
        config.stored_api_key = config.llm.api_key.clone();
        Ok(config)
    }

    /// Apply the first non-empty API key found in the environment
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = API_KEY_ENV_VARS
            .iter()
            .find_map(|name| lookup(name).filter(|v| !v.is_empty()))
        {
            self.llm.api_key = key;
            self.api_key_from_env = true;
        }
    }

    /// Save the configuration to the user config file
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::get_config_path()?)
    }

    /// Save the configuration to a specific file.
    ///
    /// An API key that came from the environment is never written to disk;
    /// the key previously stored in the file is kept instead.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        let mut to_save = self.clone();
        if self.api_key_from_env {
            to_save.llm.api_key.clone_from(&self.stored_api_key);
        }

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let config_content = toml::to_string_pretty(&to_save)?;
        fs::write(path, config_content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;
        log_debug!("Configuration saved to {}", path.display());
        Ok(())
    }

    /// Get the path to the configuration file
    pub fn get_config_path() -> Result<PathBuf> {
        let mut path =
            config_dir().ok_or_else(|| anyhow!("Unable to determine config directory"))?;
        path.push(APP_DIR);
        path.push("config.toml");
        Ok(path)
    }

    /// Directory holding the persisted workspace
    pub fn storage_dir(&self) -> Result<PathBuf> {
        if let Some(dir) = &self.data_dir {
            return Ok(dir.clone());
        }
        let mut path = data_dir().ok_or_else(|| anyhow!("Unable to determine data directory"))?;
        path.push(APP_DIR);
        Ok(path)
    }

    /// Check that the LLM can be called
    pub fn validate(&self) -> Result<()> {
        if self.llm.api_key.is_empty() {
            return Err(anyhow!(
                "LLM API key is not configured. Set {} or run `aria-changelog config --api-key <KEY>`.",
                API_KEY_ENV_VARS[0]
            ));
        }
        self.validate_settings()
    }

    /// Range checks that hold whether or not a key is configured
    pub fn validate_settings(&self) -> Result<()> {
        if !(0.0..=2.0).contains(&self.llm.temperature) {
            return Err(anyhow!(
                "Temperature must be between 0.0 and 2.0, got {}",
                self.llm.temperature
            ));
        }
        Ok(())
    }

    /// Update the configuration with new values
    pub fn update(
        &mut self,
        api_key: Option<String>,
        model: Option<String>,
        temperature: Option<f64>,
        llm_timeout_seconds: Option<u64>,
        github_api_url: Option<String>,
        interval_seconds: Option<u64>,
    ) {
        if let Some(key) = api_key {
            self.stored_api_key.clone_from(&key);
            self.llm.api_key = key;
            self.api_key_from_env = false;
        }
        if let Some(model) = model {
            self.llm.model = model;
        }
        if let Some(temperature) = temperature {
            self.llm.temperature = temperature;
        }
        if let Some(timeout) = llm_timeout_seconds {
            self.llm.timeout_seconds = timeout;
        }
        if let Some(url) = github_api_url {
            self.github.api_url = url;
        }
        if let Some(interval) = interval_seconds {
            self.auto_generation.interval_seconds = interval;
        }
        log_debug!("Configuration updated (model: {})", self.llm.model);
    }
}
