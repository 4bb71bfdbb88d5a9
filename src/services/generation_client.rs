//! Generation Client
//!
//! Talks to a locally hosted text-generation runtime (Ollama-compatible API).
//! One prompt, one outbound call, no retries. Every failure comes back as a
//! typed [`GenerationError`] so the caller can decide what to do with it.
//!
//! Dropping the future returned by [`GenerationBackend::generate`] aborts the
//! in-flight HTTP request, so an abandoned caller stops consuming backend capacity.

use std::time::Duration;

use async_trait::async_trait;
use log::{debug, trace};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::prompt_builder::PromptText;

pub const DEFAULT_BASE_URL: &str = "http://localhost:11434";
pub const DEFAULT_MODEL: &str = "llama2";
pub const DEFAULT_TIMEOUT_SECS: u64 = 45;
const HEALTH_CHECK_TIMEOUT_SECS: u64 = 5;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum GenerationError {
    #[error("Generation backend unreachable: {0}")]
    BackendUnreachable(String),
    #[error("Generation backend did not answer within {0:?}")]
    BackendTimeout(Duration),
    #[error("Generation backend returned HTTP {0}")]
    BackendHttpError(u16),
    #[error("Generation backend returned an empty response")]
    EmptyResponse,
    #[error("Generation backend returned an unexpected body: {0}")]
    InvalidEnvelope(String),
}

#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// Submit a prompt and return the backend's raw text output
    async fn generate(&self, prompt: &PromptText) -> Result<String, GenerationError>;

    /// Cheap reachability probe used by the health endpoint
    async fn health_check(&self) -> Result<(), GenerationError>;
}

#[derive(Debug, Clone)]
pub struct GenerationClientConfig {
    pub base_url: String,
    pub model: String,
    pub timeout: Duration,
}

impl Default for GenerationClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

#[derive(Debug, Serialize)]
struct OllamaGenerateRequest<'a> {
    model: &'a str,
    prompt: String,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct OllamaGenerateResponse {
    response: String,
}

#[derive(Clone)]
pub struct OllamaClient {
    http_client: Client,
    config: GenerationClientConfig,
}

impl OllamaClient {
    pub fn new(config: GenerationClientConfig) -> Result<Self, reqwest::Error> {
        let http_client = Client::builder().timeout(config.timeout).build()?;

        Ok(Self {
            http_client,
            config,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), path)
    }

    fn classify(&self, err: reqwest::Error) -> GenerationError {
        if err.is_timeout() {
            GenerationError::BackendTimeout(self.config.timeout)
        } else if err.is_decode() {
            GenerationError::InvalidEnvelope(err.to_string())
        } else {
            // Connection refused, DNS failure, broken connection
            GenerationError::BackendUnreachable(err.to_string())
        }
    }
}

#[async_trait]
impl GenerationBackend for OllamaClient {
    async fn generate(&self, prompt: &PromptText) -> Result<String, GenerationError> {
        let url = self.endpoint("api/generate");
        let body = OllamaGenerateRequest {
            model: &self.config.model,
            prompt: prompt.render(),
            stream: false,
        };

        debug!("Calling generation backend at {} with model {}", url, self.config.model);

        let response = self
            .http_client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(GenerationError::BackendHttpError(status.as_u16()));
        }

        let text = response.text().await.map_err(|e| self.classify(e))?;
        if text.trim().is_empty() {
            return Err(GenerationError::EmptyResponse);
        }

        let envelope: OllamaGenerateResponse = serde_json::from_str(&text)
            .map_err(|e| GenerationError::InvalidEnvelope(e.to_string()))?;
        trace!("Raw generation output: {}", envelope.response);

        if envelope.response.trim().is_empty() {
            return Err(GenerationError::EmptyResponse);
        }

        Ok(envelope.response)
    }

    async fn health_check(&self) -> Result<(), GenerationError> {
        let response = self
            .http_client
            .get(self.endpoint("api/tags"))
            .timeout(Duration::from_secs(HEALTH_CHECK_TIMEOUT_SECS))
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(GenerationError::BackendHttpError(response.status().as_u16()))
        }
    }
}
