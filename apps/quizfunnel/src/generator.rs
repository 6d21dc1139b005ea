//! # Result Generator
//!
//! Client for the completion service that writes personalized results, and
//! the degraded-mode logic that swaps in the fallback renderer whenever the
//! service cannot deliver.
//!
//! The service speaks the OpenAI chat completions protocol:
//! `POST {base_url}/chat/completions` with a bearer key.

use crate::api::{GenerateRequest, GenerateResponse, ResultSource};
use crate::config::GeneratorConfig;
use async_trait::async_trait;
use quizfunnel_core::{CompletionPrompt, FallbackRenderer, build_prompt, determine_stage};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Errors from the completion service. Every one of them means "use the fallback".
#[derive(Debug, Error)]
pub enum GeneratorError {
    /// No API key configured.
    #[error("generation service is not configured")]
    NotConfigured,
    /// The HTTP client could not be built.
    #[error("cannot build HTTP client: {0}")]
    Client(String),
    /// The service could not be reached or timed out.
    #[error("cannot reach generation service: {0}")]
    Connection(String),
    /// The service answered with a non-success status.
    #[error("generation service returned {0}: {1}")]
    Status(u16, String),
    /// The response body was not the expected JSON.
    #[error("cannot parse generation response: {0}")]
    Parse(String),
    /// The response carried no text.
    #[error("generation service returned an empty result")]
    Empty,
}

/// Anything that can turn a prompt into result text.
#[async_trait]
pub trait ResultGenerator: Send + Sync {
    /// Produce the result text. Blank output must be reported as `Empty`.
    async fn generate(&self, prompt: &CompletionPrompt) -> Result<String, GeneratorError>;
}

// =============================================================================
// OPENAI-COMPATIBLE CLIENT
// =============================================================================

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: Option<ChatMessage>,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

/// Chat completions client.
#[derive(Clone)]
pub struct OpenAiGenerator {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl std::fmt::Debug for OpenAiGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiGenerator")
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

impl OpenAiGenerator {
    /// Build a client from configuration. Requires an API key.
    pub fn new(config: &GeneratorConfig) -> Result<Self, GeneratorError> {
        let api_key = config
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or(GeneratorError::NotConfigured)?;

        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| GeneratorError::Client(e.to_string()))?;

        Ok(Self {
            http,
            endpoint: format!("{}/chat/completions", config.base_url.trim_end_matches('/')),
            api_key,
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        })
    }
}

#[async_trait]
impl ResultGenerator for OpenAiGenerator {
    async fn generate(&self, prompt: &CompletionPrompt) -> Result<String, GeneratorError> {
        let body = json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": prompt.system},
                {"role": "user", "content": prompt.user}
            ],
            "temperature": self.temperature,
            "max_tokens": self.max_tokens,
        });

        let resp = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| GeneratorError::Connection(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(GeneratorError::Status(status.as_u16(), text));
        }

        let parsed: ChatResponse = resp
            .json()
            .await
            .map_err(|e| GeneratorError::Parse(e.to_string()))?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message)
            .and_then(|m| m.content)
            .map(|s| s.trim().to_string())
            .unwrap_or_default();

        if content.is_empty() {
            return Err(GeneratorError::Empty);
        }
        Ok(content)
    }
}

/// Build the configured generator, or `None` when no API key is set.
pub fn from_config(
    config: &GeneratorConfig,
) -> Result<Option<Arc<dyn ResultGenerator>>, GeneratorError> {
    match OpenAiGenerator::new(config) {
        Ok(generator) => {
            tracing::info!(model = %config.model, "Generation service enabled");
            Ok(Some(Arc::new(generator)))
        }
        Err(GeneratorError::NotConfigured) => {
            tracing::warn!("No generation API key set, results will use fallback content");
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

// =============================================================================
// GENERATE WITH FALLBACK
// =============================================================================

/// Produce a personalized result, degrading to static content on any failure.
pub async fn generate_with_fallback(
    generator: Option<&dyn ResultGenerator>,
    renderer: &FallbackRenderer,
    request: &GenerateRequest,
) -> GenerateResponse {
    let stage = determine_stage(&request.answers);

    let outcome = match generator {
        Some(generator) => {
            let prompt = build_prompt(&request.name, &request.answers, &request.labels);
            generator.generate(&prompt).await.and_then(|text| {
                let text = text.trim();
                if text.is_empty() {
                    Err(GeneratorError::Empty)
                } else {
                    Ok(text.to_string())
                }
            })
        }
        None => Err(GeneratorError::NotConfigured),
    };

    match outcome {
        Ok(result) => GenerateResponse {
            result,
            stage,
            source: ResultSource::Model,
            warning: None,
        },
        Err(e) => {
            tracing::warn!(stage = %stage, reason = %e, "Serving fallback result");
            GenerateResponse {
                result: renderer.render(&request.name, &request.answers, &request.labels),
                stage,
                source: ResultSource::Fallback,
                warning: Some(format!("Fallback content used: {}", e)),
            }
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
