//! Weaviate vector store backend (semantic variant).
//!
//! Provides [`WeaviateVectorStore`], which implements [`VectorStore`] over
//! the Weaviate REST and GraphQL APIs. Retrieval uses a `nearText` search
//! with a minimum certainty threshold and an optional equality filter on the
//! stored topic; clear-all is a two-phase list-then-delete loop.
//!
//! # Example
//!
//! ```rust,ignore
//! use ragpipe::weaviate::{WeaviateConfig, WeaviateVectorStore};
//!
//! let store = WeaviateVectorStore::new(WeaviateConfig::default());
//! store.upsert(&document).await?;
//! let matches = store.query(&Query::new("capital of France"), Some(3)).await?;
//! ```

use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::{Value, json};
use tokio::sync::OnceCell;
use tracing::{debug, error};

use crate::document::{Document, Match, Query};
use crate::error::{RagError, Result};
use crate::vectorstore::{DEFAULT_QUERY_LIMIT, VectorStore};

/// The default Weaviate server address.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8081";

/// The default class name documents are stored under.
pub const DEFAULT_CLASS: &str = "Document";

/// The default minimum certainty for a match to be returned.
pub const DEFAULT_CERTAINTY_THRESHOLD: f32 = 0.7;

/// Configuration for [`WeaviateVectorStore`].
#[derive(Debug, Clone, PartialEq)]
pub struct WeaviateConfig {
    /// Base URL of the Weaviate server.
    pub base_url: String,
    /// Class (collection) name documents are stored under.
    pub class: String,
    /// Minimum certainty in [0, 1] for a match to be returned.
    pub certainty_threshold: f32,
    /// Limit applied when a query passes no explicit limit.
    pub default_limit: usize,
}

impl Default for WeaviateConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            class: DEFAULT_CLASS.to_string(),
            certainty_threshold: DEFAULT_CERTAINTY_THRESHOLD,
            default_limit: DEFAULT_QUERY_LIMIT,
        }
    }
}

impl WeaviateConfig {
    /// Create a new builder for constructing a [`WeaviateConfig`].
    pub fn builder() -> WeaviateConfigBuilder {
        WeaviateConfigBuilder::default()
    }
}

/// Builder for constructing a validated [`WeaviateConfig`].
#[derive(Debug, Clone, Default)]
pub struct WeaviateConfigBuilder {
    config: WeaviateConfig,
}

impl WeaviateConfigBuilder {
    /// Set the base URL of the Weaviate server.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = url.into();
        self
    }

    /// Set the class name documents are stored under.
    pub fn class(mut self, class: impl Into<String>) -> Self {
        self.config.class = class.into();
        self
    }

    /// Set the minimum certainty for a match to be returned.
    pub fn certainty_threshold(mut self, threshold: f32) -> Self {
        self.config.certainty_threshold = threshold;
        self
    }

    /// Set the limit used when a query passes no explicit limit.
    pub fn default_limit(mut self, limit: usize) -> Self {
        self.config.default_limit = limit;
        self
    }

    /// Build the [`WeaviateConfig`], validating that parameters are consistent.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Config`] if:
    /// - `class` is empty or not alphanumeric
    /// - `certainty_threshold` is outside [0, 1]
    /// - `default_limit == 0`
    pub fn build(self) -> Result<WeaviateConfig> {
        if self.config.class.is_empty()
            || !self.config.class.chars().all(|c| c.is_ascii_alphanumeric())
        {
            return Err(RagError::Config(format!(
                "class name '{}' must be non-empty and alphanumeric",
                self.config.class
            )));
        }
        if !(0.0..=1.0).contains(&self.config.certainty_threshold) {
            return Err(RagError::Config(format!(
                "certainty_threshold ({}) must be within [0, 1]",
                self.config.certainty_threshold
            )));
        }
        if self.config.default_limit == 0 {
            return Err(RagError::Config("default_limit must be greater than zero".to_string()));
        }
        Ok(self.config)
    }
}

/// A [`VectorStore`] backed by [Weaviate](https://weaviate.io/).
///
/// The class schema (text `content` property, text `metadata` property,
/// cosine vector index) is bootstrapped lazily on first use: describe the
/// class, create it if absent. The check-then-create is not atomic; an
/// "already exists" response from a concurrent cold start is swallowed.
pub struct WeaviateVectorStore {
    client: reqwest::Client,
    config: WeaviateConfig,
    schema_ready: OnceCell<()>,
}

/// Escape a string for embedding in a GraphQL string literal.
fn escape_graphql(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            '\t' => escaped.push_str("\\t"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Build the GraphQL `Get` query for a semantic search.
///
/// Expresses: up to `limit` objects whose content matches `text` with
/// certainty at or above `certainty`, optionally restricted to objects whose
/// `metadata` equals `topic`, ordered by similarity descending.
fn build_search_query(
    class: &str,
    text: &str,
    topic: Option<&str>,
    limit: usize,
    certainty: f32,
) -> String {
    let near_text =
        format!("nearText: {{concepts: [\"{}\"], certainty: {certainty}}}", escape_graphql(text));
    let filter = topic
        .map(|t| {
            format!(
                ", where: {{path: [\"metadata\"], operator: Equal, valueText: \"{}\"}}",
                escape_graphql(t)
            )
        })
        .unwrap_or_default();

    format!(
        "{{ Get {{ {class}(limit: {limit}, {near_text}{filter}) \
         {{ content metadata _additional {{ certainty id }} }} }} }}"
    )
}

/// Build the GraphQL `Get` query that lists all object ids (no filter).
fn build_list_ids_query(class: &str) -> String {
    format!("{{ Get {{ {class} {{ _additional {{ id }} }} }} }}")
}

/// Extract the per-class object array from a GraphQL response body,
/// surfacing GraphQL-level errors.
fn graphql_objects(class: &str, body: &Value) -> std::result::Result<Vec<Value>, String> {
    if let Some(errors) = body.get("errors").and_then(Value::as_array) {
        let messages: Vec<&str> =
            errors.iter().filter_map(|e| e.get("message").and_then(Value::as_str)).collect();
        return Err(format!("GraphQL errors: {}", messages.join("; ")));
    }

    Ok(body
        .pointer(&format!("/data/Get/{class}"))
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default())
}

/// Parse a search response into matches, preserving the backend's order.
fn parse_search_response(class: &str, body: &Value) -> std::result::Result<Vec<Match>, String> {
    let objects = graphql_objects(class, body)?;
    Ok(objects
        .iter()
        .map(|obj| Match {
            content: obj
                .get("content")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            certainty: obj
                .pointer("/_additional/certainty")
                .and_then(Value::as_f64)
                .map(|c| c as f32),
            id: obj.pointer("/_additional/id").and_then(Value::as_str).map(str::to_string),
        })
        .collect())
}

/// Parse a listing response into object ids.
fn parse_id_listing(class: &str, body: &Value) -> std::result::Result<Vec<String>, String> {
    let objects = graphql_objects(class, body)?;
    Ok(objects
        .iter()
        .filter_map(|obj| obj.pointer("/_additional/id").and_then(Value::as_str))
        .map(str::to_string)
        .collect())
}

impl WeaviateVectorStore {
    /// Create a store with the given configuration.
    pub fn new(config: WeaviateConfig) -> Self {
        Self { client: reqwest::Client::new(), config, schema_ready: OnceCell::new() }
    }

    fn map_err(message: String) -> RagError {
        RagError::VectorStore { backend: "weaviate".to_string(), message }
    }

    /// Ensure the class schema exists, creating it on first use.
    async fn ensure_schema(&self) -> Result<()> {
        self.schema_ready
            .get_or_try_init(|| async {
                let describe_url =
                    format!("{}/v1/schema/{}", self.config.base_url, self.config.class);
                let exists = match self.client.get(&describe_url).send().await {
                    Ok(response) => response.status().is_success(),
                    Err(_) => false,
                };
                if exists {
                    debug!(class = %self.config.class, "weaviate class already exists");
                    return Ok(());
                }
                self.create_class().await
            })
            .await
            .copied()
    }

    async fn create_class(&self) -> Result<()> {
        let body = json!({
            "class": self.config.class,
            "properties": [
                { "name": "content", "dataType": ["text"] },
                { "name": "metadata", "dataType": ["text"] },
            ],
            "vectorIndexConfig": { "distance": "cosine" },
        });

        let response = self
            .client
            .post(format!("{}/v1/schema", self.config.base_url))
            .json(&body)
            .send()
            .await
            .map_err(|e| Self::map_err(format!("schema create request failed: {e}")))?;

        let status = response.status();
        if status.is_success() {
            debug!(class = %self.config.class, "created weaviate class");
            return Ok(());
        }

        // A concurrent cold start may have created the class between the
        // describe and create calls.
        if status == StatusCode::UNPROCESSABLE_ENTITY {
            debug!(class = %self.config.class, "weaviate class created concurrently, skipping");
            return Ok(());
        }

        let detail = response.text().await.unwrap_or_default();
        error!(class = %self.config.class, %status, "failed to create weaviate class");
        Err(Self::map_err(format!("schema create returned {status}: {detail}")))
    }

    async fn graphql(&self, query: String) -> Result<Value> {
        let response = self
            .client
            .post(format!("{}/v1/graphql", self.config.base_url))
            .json(&json!({ "query": query }))
            .send()
            .await
            .map_err(|e| Self::map_err(format!("search request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = response.text().await.unwrap_or_default();
            return Err(Self::map_err(format!("search returned {status}: {detail}")));
        }

        response.json().await.map_err(|e| Self::map_err(format!("failed to parse response: {e}")))
    }

    async fn delete_object(&self, id: &str) -> Result<()> {
        let url = format!("{}/v1/objects/{}/{id}", self.config.base_url, self.config.class);
        let response = self
            .client
            .delete(&url)
            .send()
            .await
            .map_err(|e| Self::map_err(format!("delete request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(Self::map_err(format!("delete of '{id}' returned {}", response.status())));
        }
        Ok(())
    }
}

#[async_trait]
impl VectorStore for WeaviateVectorStore {
    async fn upsert(&self, document: &Document) -> Result<()> {
        self.ensure_schema().await?;

        let body = json!({
            "id": document.id,
            "class": self.config.class,
            "properties": {
                "content": document.content,
                "metadata": document.topic,
            },
            "vector": document.embedding,
        });

        let response = self
            .client
            .post(format!("{}/v1/objects", self.config.base_url))
            .json(&body)
            .send()
            .await
            .map_err(|e| Self::map_err(format!("upsert request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = response.text().await.unwrap_or_default();
            error!(id = %document.id, %status, "weaviate upsert failed");
            return Err(Self::map_err(format!("upsert returned {status}: {detail}")));
        }

        debug!(id = %document.id, class = %self.config.class, "upserted document to weaviate");
        Ok(())
    }

    async fn query(&self, query: &Query, limit: Option<usize>) -> Result<Vec<Match>> {
        self.ensure_schema().await?;

        let limit = limit.unwrap_or(self.config.default_limit);
        let graphql_query = build_search_query(
            &self.config.class,
            &query.text,
            query.topic.as_deref(),
            limit,
            self.config.certainty_threshold,
        );

        let body = self.graphql(graphql_query).await?;
        let matches = parse_search_response(&self.config.class, &body).map_err(Self::map_err)?;

        debug!(count = matches.len(), limit, "weaviate search completed");
        Ok(matches)
    }

    async fn clear_all(&self) -> Result<()> {
        self.ensure_schema().await?;

        let body = self.graphql(build_list_ids_query(&self.config.class)).await?;
        let ids = parse_id_listing(&self.config.class, &body).map_err(Self::map_err)?;
        let total = ids.len();

        // Not transactional: a failure partway through leaves the store
        // partially cleared, and the error names how far the loop got.
        for (attempted, id) in ids.iter().enumerate() {
            self.delete_object(id).await.map_err(|e| {
                error!(attempted = attempted + 1, total, "weaviate clear-all aborted");
                Self::map_err(format!(
                    "clear-all aborted after {} of {total} deletions: {e}",
                    attempted + 1
                ))
            })?;
        }

        debug!(deleted = total, class = %self.config.class, "cleared weaviate class");
        Ok(())
    }
}
