/// Client for the llama.cpp server `/completion` endpoint.
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{LanguageModel, LlmError};

const STOP_SEQUENCES: &[&str] = &["</s>", "[INST]"];

#[derive(Serialize)]
struct CompletionRequest<'a> {
    prompt: String,
    n_predict: u32,
    temperature: f32,
    stop: &'a [&'a str],
    stream: bool,
}

#[derive(Deserialize)]
struct CompletionResponse {
    content: String,
}

pub struct LlamaServerClient {
    endpoint: String,
    client: reqwest::blocking::Client,
}

impl LlamaServerClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, LlmError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("jobtailor/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| LlmError::Request(format!("HTTP client build failed: {e}")))?;
        Ok(Self {
            endpoint: format!("{}/completion", base_url.trim_end_matches('/')),
            client,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

/// Wrap a prompt in the instruct format, dropping a leading `<s>` so the
/// server's own BOS token is not doubled.
pub fn format_prompt(prompt: &str) -> String {
    let prompt = prompt.trim_start();
    let prompt = prompt.strip_prefix("<s>").unwrap_or(prompt).trim_start();
    format!("[INST] {prompt} [/INST]")
}

impl LanguageModel for LlamaServerClient {
    fn generate(&self, prompt: &str, max_tokens: u32, temperature: f32) -> Result<String, LlmError> {
        let request = CompletionRequest {
            prompt: format_prompt(prompt),
            n_predict: max_tokens,
            temperature,
            stop: STOP_SEQUENCES,
            stream: false,
        };
        debug!("POST {} ({} prompt chars)", self.endpoint, request.prompt.len());

        let resp = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .map_err(|e| LlmError::Request(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(LlmError::Status(resp.status().as_u16()));
        }

        let body: CompletionResponse = resp
            .json()
            .map_err(|e| LlmError::InvalidResponse(e.to_string()))?;
        Ok(body.content.trim().to_string())
    }

    fn name(&self) -> &str {
        "llama-server"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_prompt() {
        assert_eq!(format_prompt("Hello"), "[INST] Hello [/INST]");
        assert_eq!(format_prompt("  <s> Hello"), "[INST] Hello [/INST]");
    }

    #[test]
    fn test_endpoint_joins_cleanly() {
        let client = LlamaServerClient::new("http://127.0.0.1:8080/", Duration::from_secs(1)).unwrap();
        assert_eq!(client.endpoint(), "http://127.0.0.1:8080/completion");
    }

    #[test]
    fn test_request_shape() {
        let req = CompletionRequest {
            prompt: format_prompt("x"),
            n_predict: 8,
            temperature: 0.5,
            stop: STOP_SEQUENCES,
            stream: false,
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["n_predict"], 8);
        assert_eq!(json["stop"][0], "</s>");
        assert_eq!(json["stream"], false);
    }

    #[test]
    fn test_unreachable_server_is_request_error() {
        let client = LlamaServerClient::new("http://127.0.0.1:1", Duration::from_secs(2)).unwrap();
        let err = client.generate("hi", 8, 0.1).unwrap_err();
        assert!(matches!(err, LlmError::Request(_)), "{err}");
    }
}
