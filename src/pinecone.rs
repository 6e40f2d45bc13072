//! Pinecone vector store backend (simple variant).
//!
//! Provides [`PineconeVectorStore`], a legacy key/value-style backend that
//! supports upsert and query only. It has no bulk delete:
//! [`clear_all`](VectorStore::clear_all) fails with an explicit
//! unsupported-operation error and issues no request.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::document::{Document, Match, Query};
use crate::error::{RagError, Result};
use crate::vectorstore::{DEFAULT_QUERY_LIMIT, VectorStore};

/// Configuration for [`PineconeVectorStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PineconeConfig {
    /// API key sent in the `Api-Key` header.
    pub api_key: String,
    /// Base URL of the Pinecone index endpoint.
    pub base_url: String,
    /// Limit applied when a query passes no explicit limit.
    pub default_limit: usize,
}

impl PineconeConfig {
    /// Create a configuration from an API key and environment name.
    pub fn new(api_key: impl Into<String>, environment: &str) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: format!("https://{environment}-1.pinecone.io"),
            default_limit: DEFAULT_QUERY_LIMIT,
        }
    }

    /// Override the base URL (for self-hosted gateways or tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

/// A [`VectorStore`] backed by a Pinecone index.
///
/// Secondary/legacy variant of the store: upsert and query only. Attempting
/// to clear the index returns
/// [`RagError::UnsupportedOperation`] rather than silently doing nothing.
pub struct PineconeVectorStore {
    client: reqwest::Client,
    config: PineconeConfig,
}

#[derive(Serialize)]
struct UpsertRequest<'a> {
    id: &'a str,
    content: &'a str,
    vector: &'a [f32],
    #[serde(skip_serializing_if = "Option::is_none")]
    metadata: Option<&'a str>,
}

#[derive(Serialize)]
struct QueryRequest<'a> {
    query: &'a str,
    #[serde(rename = "topK")]
    top_k: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    filter: Option<QueryFilter<'a>>,
}

#[derive(Serialize)]
struct QueryFilter<'a> {
    topic: &'a str,
}

#[derive(Deserialize)]
struct QueryResponse {
    #[serde(default)]
    matches: Vec<QueryMatch>,
}

#[derive(Deserialize)]
struct QueryMatch {
    id: Option<String>,
    score: Option<f32>,
    content: Option<String>,
}

impl PineconeVectorStore {
    /// Create a store with the given configuration.
    pub fn new(config: PineconeConfig) -> Self {
        Self { client: reqwest::Client::new(), config }
    }

    fn map_err(message: String) -> RagError {
        RagError::VectorStore { backend: "pinecone".to_string(), message }
    }
}

#[async_trait]
impl VectorStore for PineconeVectorStore {
    async fn upsert(&self, document: &Document) -> Result<()> {
        let body = UpsertRequest {
            id: &document.id,
            content: &document.content,
            vector: &document.embedding,
            metadata: document.topic.as_deref(),
        };

        let response = self
            .client
            .post(format!("{}/vectors/upsert", self.config.base_url))
            .header("Api-Key", &self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| Self::map_err(format!("upsert request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            error!(id = %document.id, %status, "pinecone upsert failed");
            return Err(Self::map_err(format!("upsert returned {status}")));
        }

        debug!(id = %document.id, "upserted document to pinecone");
        Ok(())
    }

    async fn query(&self, query: &Query, limit: Option<usize>) -> Result<Vec<Match>> {
        let body = QueryRequest {
            query: &query.text,
            top_k: limit.unwrap_or(self.config.default_limit),
            filter: query.topic.as_deref().map(|topic| QueryFilter { topic }),
        };

        let response = self
            .client
            .post(format!("{}/query", self.config.base_url))
            .header("Api-Key", &self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| Self::map_err(format!("query request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(Self::map_err(format!("query returned {status}")));
        }

        let parsed: QueryResponse = response
            .json()
            .await
            .map_err(|e| Self::map_err(format!("failed to parse response: {e}")))?;

        Ok(parsed
            .matches
            .into_iter()
            .map(|m| Match {
                content: m.content.unwrap_or_default(),
                certainty: m.score,
                id: m.id,
            })
            .collect())
    }

    async fn clear_all(&self) -> Result<()> {
        Err(RagError::UnsupportedOperation {
            backend: "pinecone".to_string(),
            operation: "clear_all".to_string(),
        })
    }
}
