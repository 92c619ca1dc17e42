//! Configuration for the chat memory service.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::memory::core::errors::{MemoryError, MemoryResult};

/// Environment variable selecting the backend kind (`redis` or `memory`).
pub const BACKEND_ENV: &str = "CHAT_MEMORY_BACKEND";
/// Environment variable for the Redis connection URL.
pub const REDIS_URL_ENV: &str = "CHAT_MEMORY_REDIS_URL";
/// Environment variable for the list key prefix.
pub const KEY_PREFIX_ENV: &str = "CHAT_MEMORY_KEY_PREFIX";
/// Environment variable for the advisor history end index.
pub const HISTORY_END_ENV: &str = "CHAT_MEMORY_HISTORY_END";
/// Environment variable for the default system prompt.
pub const SYSTEM_PROMPT_ENV: &str = "CHAT_MEMORY_SYSTEM_PROMPT";
/// Environment variable for the Ollama base URL.
pub const OLLAMA_URL_ENV: &str = "CHAT_MEMORY_OLLAMA_URL";
/// Environment variable for the completion model name.
pub const MODEL_ENV: &str = "CHAT_MEMORY_MODEL";
/// Environment variable for the HTTP port.
pub const PORT_ENV: &str = "CHAT_MEMORY_PORT";

/// Top-level configuration.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct MemoryConfig {
    /// List backend settings.
    pub backend: BackendConfig,
    /// Advisor settings.
    pub advisor: AdvisorConfig,
    /// Completion model settings.
    pub llm: LlmConfig,
    /// HTTP server settings.
    pub server: ServerConfig,
}

impl MemoryConfig {
    /// Build the default configuration overlaid with `CHAT_MEMORY_*` variables.
    ///
    /// # Errors
    /// Returns an error if a variable is present but cannot be parsed.
    pub fn from_env() -> MemoryResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable lookup.
    ///
    /// # Errors
    /// Returns an error if a variable is present but cannot be parsed.
    pub fn from_lookup<F>(lookup: F) -> MemoryResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(kind) = lookup(BACKEND_ENV) {
            config.backend.kind = match kind.trim() {
                "redis" => BackendKind::Redis,
                "memory" => BackendKind::Memory,
                other => {
                    return Err(MemoryError::InvalidConfig(format!(
                        "{BACKEND_ENV} must be `redis` or `memory`, got `{other}`"
                    )));
                }
            };
        }
        if let Some(url) = lookup(REDIS_URL_ENV) {
            config.backend.redis_url = url;
        }
        if let Some(prefix) = lookup(KEY_PREFIX_ENV) {
            config.backend.key_prefix = prefix;
        }
        if let Some(end) = lookup(HISTORY_END_ENV) {
            config.advisor.history_end_index = end.trim().parse().map_err(|_| {
                MemoryError::InvalidConfig(format!("{HISTORY_END_ENV} must be an integer"))
            })?;
        }
        if let Some(prompt) = lookup(SYSTEM_PROMPT_ENV) {
            config.advisor.system_prompt = Some(prompt);
        }
        if let Some(url) = lookup(OLLAMA_URL_ENV) {
            config.llm.base_url = Some(url);
        }
        if let Some(model) = lookup(MODEL_ENV) {
            config.llm.model = model;
        }
        if let Some(port) = lookup(PORT_ENV) {
            config.server.port = port.trim().parse().map_err(|_| {
                MemoryError::InvalidConfig(format!("{PORT_ENV} must be a port number"))
            })?;
        }

        Ok(config)
    }

    /// Validate configuration invariants.
    ///
    /// # Errors
    /// Returns an error if any values are out of range or invalid.
    pub fn validate(&self) -> MemoryResult<()> {
        if self.advisor.history_end_index < -1 {
            return Err(MemoryError::InvalidConfig(
                "advisor.history_end_index must be >= -1".to_string(),
            ));
        }

        if self.server.port == 0 {
            return Err(MemoryError::InvalidConfig(
                "server.port must be > 0".to_string(),
            ));
        }

        if self.backend.kind == BackendKind::Redis {
            Url::parse(&self.backend.redis_url)?;
        }

        if let Some(base_url) = &self.llm.base_url {
            Url::parse(base_url)?;
        }

        Ok(())
    }
}

/// Which list backend to run against.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    /// Redis lists.
    #[default]
    Redis,
    /// Process-local lists, lost on restart.
    Memory,
}

/// List backend settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Backend selector.
    pub kind: BackendKind,
    /// Redis connection URL.
    pub redis_url: String,
    /// Prefix prepended to conversation ids to form list keys.
    pub key_prefix: String,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            kind: BackendKind::Redis,
            redis_url: "redis://127.0.0.1:6379".to_string(),
            key_prefix: String::new(),
        }
    }
}

/// Advisor settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AdvisorConfig {
    /// Inclusive end index of history loaded before each model call.
    pub history_end_index: isize,
    /// Optional system prompt placed ahead of stored system messages.
    pub system_prompt: Option<String>,
}

impl Default for AdvisorConfig {
    fn default() -> Self {
        Self {
            history_end_index: 99,
            system_prompt: None,
        }
    }
}

/// Completion model settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Ollama completion model name.
    pub model: String,
    /// Temperature for generation.
    pub temperature: f64,
    /// Optional max tokens.
    pub max_tokens: Option<u64>,
    /// Optional custom base URL.
    pub base_url: Option<String>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: "qwen2.5:7b-instruct".to_string(),
            temperature: 0.7,
            max_tokens: None,
            base_url: None,
        }
    }
}

/// HTTP server settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Listening port.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { port: 8080 }
    }
}
