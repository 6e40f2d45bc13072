//! Ollama-backed embedding and generation clients.
//!
//! Both clients talk to a local [Ollama](https://ollama.com/) server with
//! `reqwest`. [`OllamaEmbedding`] implements the infallible
//! [`EmbeddingProvider`] contract (pseudo-random fallback on any failure);
//! [`OllamaGenerator`] implements [`GenerationBackend`] as a single
//! non-streaming completion call with a bounded timeout.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};

use crate::embedding::{Embedding, EmbeddingProvider};
use crate::error::{RagError, Result};
use crate::generation::GenerationBackend;

/// The default Ollama server address.
pub const DEFAULT_BASE_URL: &str = "http://localhost:11434";

/// The default model for both embedding and generation.
pub const DEFAULT_MODEL: &str = "llama3.2";

/// The default embedding dimensionality.
pub const DEFAULT_DIMENSIONS: usize = 1536;

/// The generation request timeout.
pub const DEFAULT_GENERATE_TIMEOUT: Duration = Duration::from_secs(60);

// ── Embedding ──────────────────────────────────────────────────────

/// Configuration for [`OllamaEmbedding`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OllamaEmbeddingConfig {
    /// Base URL of the Ollama server.
    pub base_url: String,
    /// Model used for the `/api/embeddings` call.
    pub model: String,
    /// Dimensionality of produced embeddings; also the fallback vector length.
    pub dimensions: usize,
}

impl Default for OllamaEmbeddingConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            dimensions: DEFAULT_DIMENSIONS,
        }
    }
}

/// An [`EmbeddingProvider`] backed by the Ollama embeddings API.
///
/// Calls `POST {base_url}/api/embeddings` with `{model, prompt}`. Any
/// transport failure, non-success status, response body without an
/// `embedding` field, or vector of the wrong length falls back to a
/// pseudo-random vector of the configured dimensionality (logged at `warn`),
/// so [`embed`](EmbeddingProvider::embed) never fails its caller and always
/// returns exactly `dimensions` entries.
pub struct OllamaEmbedding {
    client: reqwest::Client,
    config: OllamaEmbeddingConfig,
}

#[derive(Serialize)]
struct EmbeddingsRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

#[derive(Deserialize)]
struct EmbeddingsResponse {
    embedding: Option<Vec<f32>>,
}

impl OllamaEmbedding {
    /// Create a provider with the given configuration.
    pub fn new(config: OllamaEmbeddingConfig) -> Self {
        Self { client: reqwest::Client::new(), config }
    }

    async fn request_embedding(&self, text: &str) -> std::result::Result<Option<Vec<f32>>, String> {
        let url = format!("{}/api/embeddings", self.config.base_url);
        let body = EmbeddingsRequest { model: &self.config.model, prompt: text };

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| format!("request failed: {e}"))?;

        if !response.status().is_success() {
            return Err(format!("API returned {}", response.status()));
        }

        let parsed: EmbeddingsResponse =
            response.json().await.map_err(|e| format!("failed to parse response: {e}"))?;

        Ok(parsed.embedding)
    }
}

#[async_trait]
impl EmbeddingProvider for OllamaEmbedding {
    async fn embed(&self, text: &str) -> Embedding {
        debug!(model = %self.config.model, text_len = text.len(), "embedding text");

        match self.request_embedding(text).await {
            Ok(Some(vector)) if vector.len() == self.config.dimensions => {
                Embedding::from_backend(vector)
            }
            Ok(Some(vector)) => {
                warn!(
                    expected = self.config.dimensions,
                    got = vector.len(),
                    "embedding dimensionality mismatch, falling back to random vector"
                );
                Embedding::fallback(self.config.dimensions)
            }
            Ok(None) => {
                warn!(model = %self.config.model, "embedding response had no embedding field, falling back to random vector");
                Embedding::fallback(self.config.dimensions)
            }
            Err(message) => {
                warn!(model = %self.config.model, error = %message, "embedding request failed, falling back to random vector");
                Embedding::fallback(self.config.dimensions)
            }
        }
    }

    fn dimensions(&self) -> usize {
        self.config.dimensions
    }
}

// ── Generation ─────────────────────────────────────────────────────

/// Configuration for [`OllamaGenerator`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OllamaGeneratorConfig {
    /// Base URL of the Ollama server.
    pub base_url: String,
    /// Model used for the `/api/generate` call.
    pub model: String,
    /// Request timeout; a timeout surfaces as a normal failure, not a hang.
    pub timeout: Duration,
}

impl Default for OllamaGeneratorConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout: DEFAULT_GENERATE_TIMEOUT,
        }
    }
}

/// A [`GenerationBackend`] backed by the Ollama completion API.
///
/// Calls `POST {base_url}/api/generate` with `{model, prompt, stream: false}`
/// and returns the `response` field of the body. A success body without a
/// `response` field yields an empty string, not an error.
pub struct OllamaGenerator {
    client: reqwest::Client,
    config: OllamaGeneratorConfig,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: Option<String>,
}

impl OllamaGenerator {
    /// Create a generator with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Config`] if the HTTP client cannot be built.
    pub fn new(config: OllamaGeneratorConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| RagError::Config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client, config })
    }

    fn map_err(message: String) -> RagError {
        RagError::Generation { backend: "ollama".to_string(), message }
    }
}

#[async_trait]
impl GenerationBackend for OllamaGenerator {
    async fn generate(&self, prompt: &str) -> Result<String> {
        debug!(model = %self.config.model, prompt_len = prompt.len(), "requesting completion");

        let url = format!("{}/api/generate", self.config.base_url);
        let body = GenerateRequest { model: &self.config.model, prompt, stream: false };

        let response = self.client.post(&url).json(&body).send().await.map_err(|e| {
            error!(model = %self.config.model, error = %e, "generation request failed");
            Self::map_err(format!("request failed: {e}"))
        })?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = response.text().await.unwrap_or_default();
            error!(model = %self.config.model, %status, "generation API error");
            return Err(Self::map_err(format!("API returned {status}: {detail}")));
        }

        let parsed: GenerateResponse = response.json().await.map_err(|e| {
            error!(model = %self.config.model, error = %e, "failed to parse generation response");
            Self::map_err(format!("failed to parse response: {e}"))
        })?;

        Ok(parsed.response.unwrap_or_default())
    }
}
