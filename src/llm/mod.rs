/// Language model backends.
///
/// The pipeline only needs one blocking call, `generate(prompt) -> text`.
/// [`llama_server::LlamaServerClient`] talks to a local llama.cpp-compatible
/// HTTP server; [`mock::MockLlm`] returns canned, fully sectioned output.
pub mod llama_server;
pub mod mock;

use std::time::Duration;

use thiserror::Error;
use tracing::info;

use crate::config::{Config, LlmMode};

pub use llama_server::LlamaServerClient;
pub use mock::MockLlm;

pub const DEFAULT_TEMPERATURE: f32 = 0.6;

/// Errors from a model backend.
#[derive(Error, Debug)]
pub enum LlmError {
    #[error("request failed: {0}")]
    Request(String),

    #[error("server returned status {0}")]
    Status(u16),

    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

/// Blocking text completion.
pub trait LanguageModel: Send + Sync {
    fn generate(&self, prompt: &str, max_tokens: u32, temperature: f32) -> Result<String, LlmError>;

    /// Backend name for logs.
    fn name(&self) -> &str;
}

/// Build the backend selected by `LLM_MODE`.
pub fn build_model(config: &Config) -> Result<Box<dyn LanguageModel>, LlmError> {
    match config.llm_mode {
        LlmMode::Mock => {
            info!("Using mock language model");
            Ok(Box::new(MockLlm::new()))
        }
        LlmMode::Local => {
            info!(
                "Using local model server {} (model={}, ctx={}, threads={}, gpu_layers={})",
                config.llama_server_url,
                config.llama_model_path,
                config.llama_ctx,
                config.llama_n_threads,
                config.llama_n_gpu_layers
            );
            let client = LlamaServerClient::new(
                &config.llama_server_url,
                Duration::from_secs(config.llm_timeout_secs),
            )?;
            Ok(Box::new(client))
        }
    }
}
