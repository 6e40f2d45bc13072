//! Data types for queries, stored documents, and retrieval results.

use serde::{Deserialize, Serialize};

/// A normalized retrieval query.
///
/// Created per incoming request and discarded once a response is produced.
/// The optional topic is an exact-match metadata filter narrowing retrieval
/// to a category.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Query {
    /// The raw query text.
    pub text: String,
    /// Optional topic filter; when set, only documents tagged with this
    /// exact topic are eligible matches.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
}

impl Query {
    /// Create a query with no topic filter.
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into(), topic: None }
    }

    /// Set the topic filter.
    pub fn with_topic(mut self, topic: impl Into<String>) -> Self {
        self.topic = Some(topic.into());
        self
    }
}

/// A unit of stored knowledge in a vector store.
///
/// The embedding length always equals the configured dimensionality of the
/// [`EmbeddingProvider`](crate::EmbeddingProvider) that produced it; the
/// provider enforces this, not the store. Documents are never mutated in
/// place: re-inserting an existing identifier is a distinct upsert.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Document {
    /// Opaque unique identifier, generated at insert time.
    pub id: String,
    /// The text content of the document.
    pub content: String,
    /// The vector embedding for the content.
    pub embedding: Vec<f32>,
    /// Optional topic label used for filtered retrieval.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
}

/// A single retrieval result.
///
/// Ephemeral: produced by a [`VectorStore`](crate::VectorStore) query and
/// consumed within one retrieval-augmentation cycle.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Match {
    /// The content of the matched document.
    pub content: String,
    /// Normalized similarity in [0, 1]; `None` when the backend does not
    /// report one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub certainty: Option<f32>,
    /// Identifier of the originating document, where the backend reports it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}
