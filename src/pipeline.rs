//! RAG pipeline orchestrator.
//!
//! The [`RagPipeline`] coordinates the retrieve → augment → generate query
//! workflow and the embed → upsert ingestion workflow by composing an
//! [`EmbeddingProvider`], a [`VectorStore`], and a [`GenerationBackend`].
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use ragpipe::{RagPipeline, RagConfig};
//!
//! let pipeline = RagPipeline::builder()
//!     .config(RagConfig::default())
//!     .embedding_provider(Arc::new(embedder))
//!     .vector_store(Arc::new(store))
//!     .generation_backend(Arc::new(generator))
//!     .build()?;
//!
//! let id = pipeline.insert_data("Paris is the capital of France.", Some("Geography")).await?;
//! let answer = pipeline.generate_response("What is the capital of France?", Some("Geography")).await?;
//! ```

use std::sync::Arc;

use tracing::{error, info, warn};
use uuid::Uuid;

use crate::config::RagConfig;
use crate::document::{Document, Match, Query};
use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};
use crate::generation::GenerationBackend;
use crate::vectorstore::VectorStore;

/// The prompt rendered for the generation backend.
///
/// `{context}` receives the concatenated match contents and `{query}` the
/// caller's question. The wording is part of the pipeline's contract with
/// the model and is reproduced verbatim by [`render_prompt`].
const ANSWER_PROMPT: &str = "\
Answer the following question based on the provided context.

Context:
{context}

Question: {query}

Format your answer as a bulleted list wherever appropriate. If the answer
contains multiple points or items, present each in a separate bullet point
starting with \"- \".

Answer:";

/// Concatenate match contents into a context block.
///
/// Contents are joined in retrieval order, separated by a blank line;
/// entries with empty content are skipped. No matches yields an empty block.
fn build_context(matches: &[Match]) -> String {
    matches
        .iter()
        .map(|m| m.content.as_str())
        .filter(|content| !content.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Render the prompt template with the given context block and query text.
fn render_prompt(context: &str, query: &str) -> String {
    ANSWER_PROMPT.replace("{context}", context).replace("{query}", query)
}

/// The RAG pipeline orchestrator.
///
/// Owns no persistent state; every operation is stateless given the injected
/// collaborators, so concurrent calls are independent. Construct one via
/// [`RagPipeline::builder()`].
pub struct RagPipeline {
    config: RagConfig,
    embedding_provider: Arc<dyn EmbeddingProvider>,
    vector_store: Arc<dyn VectorStore>,
    generation_backend: Arc<dyn GenerationBackend>,
}

impl std::fmt::Debug for RagPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RagPipeline")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl RagPipeline {
    /// Create a new [`RagPipelineBuilder`].
    pub fn builder() -> RagPipelineBuilder {
        RagPipelineBuilder::default()
    }

    /// Return a reference to the pipeline configuration.
    pub fn config(&self) -> &RagConfig {
        &self.config
    }

    /// Answer a query using retrieved context.
    ///
    /// Retrieves the top `top_k` matches for `query` (topic-filtered when
    /// `topic` is supplied), concatenates their contents into a context
    /// block, renders the prompt, and returns the generation backend's text
    /// verbatim. When nothing matches, the prompt still names the (empty)
    /// context section and the backend is still invoked.
    ///
    /// Retrieval must complete before generation begins: a retrieval failure
    /// propagates immediately and the generation backend is never called.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::InvalidInput`] for an empty query; vector store
    /// and generation failures propagate unchanged.
    pub async fn generate_response(&self, query: &str, topic: Option<&str>) -> Result<String> {
        if query.is_empty() {
            return Err(RagError::InvalidInput("query must not be empty".to_string()));
        }

        let mut retrieval = Query::new(query);
        if let Some(topic) = topic {
            retrieval = retrieval.with_topic(topic);
        }

        let matches =
            self.vector_store.query(&retrieval, Some(self.config.top_k)).await.map_err(|e| {
                error!(error = %e, "retrieval failed");
                e
            })?;
        info!(match_count = matches.len(), top_k = self.config.top_k, "retrieved context");

        let context = build_context(&matches);
        let prompt = render_prompt(&context, query);

        let answer = self.generation_backend.generate(&prompt).await.map_err(|e| {
            error!(error = %e, "generation failed");
            e
        })?;
        info!(answer_len = answer.len(), "generated response");

        Ok(answer)
    }

    /// Ingest a piece of content: embed → upsert.
    ///
    /// Generates a fresh v4 UUID, obtains an embedding for `content` (the
    /// provider never fails; an outage produces a fallback vector, logged at
    /// `warn`), and upserts the document. The identifier is returned only
    /// after the upsert reports success.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::InvalidInput`] for empty content, or
    /// [`RagError::Pipeline`] wrapping an upsert failure.
    pub async fn insert_data(&self, content: &str, topic: Option<&str>) -> Result<String> {
        if content.is_empty() {
            return Err(RagError::InvalidInput("content must not be empty".to_string()));
        }

        let id = Uuid::new_v4().to_string();
        let embedding = self.embedding_provider.embed(content).await;
        if embedding.is_fallback() {
            warn!(%id, "storing fallback embedding; document will not be semantically retrievable");
        }

        let document = Document {
            id: id.clone(),
            content: content.to_string(),
            embedding: embedding.vector,
            topic: topic.map(str::to_string),
        };

        self.vector_store.upsert(&document).await.map_err(|e| {
            error!(%id, error = %e, "upsert failed during ingestion");
            RagError::Pipeline(format!("failed to upsert vector: {e}"))
        })?;

        info!(%id, content_len = content.len(), "inserted document");
        Ok(id)
    }

    /// Delete every document from the vector store.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::UnsupportedOperation`] unchanged when the active
    /// backend has no bulk delete, or [`RagError::Pipeline`] wrapping any
    /// other store failure.
    pub async fn clear_data(&self) -> Result<()> {
        self.vector_store.clear_all().await.map_err(|e| {
            error!(error = %e, "clear-all failed");
            match e {
                RagError::UnsupportedOperation { .. } => e,
                other => RagError::Pipeline(format!("failed to clear vector database: {other}")),
            }
        })?;

        info!("cleared vector database");
        Ok(())
    }
}

/// Builder for constructing a [`RagPipeline`].
///
/// All fields except `config` are required; `config` defaults to
/// [`RagConfig::default()`]. Call [`build()`](RagPipelineBuilder::build) to
/// validate and produce the pipeline.
#[derive(Default)]
pub struct RagPipelineBuilder {
    config: Option<RagConfig>,
    embedding_provider: Option<Arc<dyn EmbeddingProvider>>,
    vector_store: Option<Arc<dyn VectorStore>>,
    generation_backend: Option<Arc<dyn GenerationBackend>>,
}

impl RagPipelineBuilder {
    /// Set the pipeline configuration.
    pub fn config(mut self, config: RagConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the embedding provider.
    pub fn embedding_provider(mut self, provider: Arc<dyn EmbeddingProvider>) -> Self {
        self.embedding_provider = Some(provider);
        self
    }

    /// Set the vector store backend.
    pub fn vector_store(mut self, store: Arc<dyn VectorStore>) -> Self {
        self.vector_store = Some(store);
        self
    }

    /// Set the generation backend.
    pub fn generation_backend(mut self, backend: Arc<dyn GenerationBackend>) -> Self {
        self.generation_backend = Some(backend);
        self
    }

    /// Build the [`RagPipeline`], validating that all required fields are set.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Config`] if any required collaborator is missing.
    pub fn build(self) -> Result<RagPipeline> {
        let embedding_provider = self
            .embedding_provider
            .ok_or_else(|| RagError::Config("embedding_provider is required".to_string()))?;
        let vector_store = self
            .vector_store
            .ok_or_else(|| RagError::Config("vector_store is required".to_string()))?;
        let generation_backend = self
            .generation_backend
            .ok_or_else(|| RagError::Config("generation_backend is required".to_string()))?;

        Ok(RagPipeline {
            config: self.config.unwrap_or_default(),
            embedding_provider,
            vector_store,
            generation_backend,
        })
    }
}
