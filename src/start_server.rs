//! Startup helpers for the chat memory server.

use std::process::ExitCode;
use std::sync::Arc;

use crate::memory::core::config::{BackendKind, MemoryConfig};
use crate::memory::core::errors::MemoryResult;
use crate::server::{self, AppState};

/// Run the server (used by the `chat-memory-server` binary).
///
/// # Returns
/// `ExitCode::SUCCESS` on graceful shutdown, `1` on failure.
#[must_use]
pub fn run() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    tracing::info!("Starting chat memory server v{}", env!("CARGO_PKG_VERSION"));

    let config = match load_config() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Invalid configuration: {e}");
            return ExitCode::from(1);
        }
    };

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            tracing::error!("Failed to create runtime: {e}");
            return ExitCode::from(1);
        }
    };

    let outcome = rt.block_on(async {
        let state = initialize(&config).await?;
        server::serve(state, config.server.port, server::shutdown_signal()).await?;
        Ok::<(), Box<dyn std::error::Error + Send + Sync>>(())
    });

    if let Err(e) = outcome {
        tracing::error!("Server error: {e}");
        return ExitCode::from(1);
    }

    ExitCode::SUCCESS
}

/// Load and validate configuration from the environment.
///
/// # Errors
/// Returns an error if a variable cannot be parsed or a value is out of range.
pub fn load_config() -> MemoryResult<MemoryConfig> {
    let config = MemoryConfig::from_env()?;
    config.validate()?;
    Ok(config)
}

/// Initialize application state without starting the server.
///
/// # Errors
/// Returns an error if the backend cannot connect or the chat client cannot be built.
pub async fn initialize(
    config: &MemoryConfig,
) -> Result<Arc<AppState>, Box<dyn std::error::Error + Send + Sync>> {
    match config.backend.kind {
        BackendKind::Redis => tracing::info!("Redis endpoint: {}", config.backend.redis_url),
        BackendKind::Memory => {
            tracing::warn!("Using in-process memory backend, history is not persisted");
        }
    }
    if let Some(url) = &config.llm.base_url {
        tracing::info!("Ollama endpoint: {url}");
    }

    AppState::new(config)
        .await
        .map_err(|e| format!("Failed to create state: {e}").into())
}
