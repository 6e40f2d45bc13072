//! In-memory vector store using cosine similarity.
//!
//! This module provides [`InMemoryVectorStore`], a vector store backed by a
//! `HashMap` protected by a `tokio::sync::RwLock`. It embeds query text with
//! an injected [`EmbeddingProvider`] and is suitable for development and
//! tests.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::document::{Document, Match, Query};
use crate::embedding::EmbeddingProvider;
use crate::error::Result;
use crate::vectorstore::{DEFAULT_QUERY_LIMIT, VectorStore};

/// An in-memory [`VectorStore`] using cosine similarity for retrieval.
///
/// Certainty is reported as `(1 + cosine) / 2`, mapping cosine similarity
/// into [0, 1] the way the semantic backend does. Matches below the
/// certainty threshold (default 0.7) are filtered out, so fallback
/// embeddings stored during an embedding outage are effectively
/// unreachable by semantic queries.
pub struct InMemoryVectorStore {
    documents: RwLock<HashMap<String, Document>>,
    embedder: Arc<dyn EmbeddingProvider>,
    certainty_threshold: f32,
}

impl InMemoryVectorStore {
    /// Create an empty store that embeds query text with `embedder`.
    pub fn new(embedder: Arc<dyn EmbeddingProvider>) -> Self {
        Self { documents: RwLock::new(HashMap::new()), embedder, certainty_threshold: 0.7 }
    }

    /// Override the minimum certainty for a match to be returned.
    pub fn with_certainty_threshold(mut self, threshold: f32) -> Self {
        self.certainty_threshold = threshold;
        self
    }

    /// Number of stored documents.
    pub async fn len(&self) -> usize {
        self.documents.read().await.len()
    }

    /// Whether the store holds no documents.
    pub async fn is_empty(&self) -> bool {
        self.documents.read().await.is_empty()
    }
}

/// Compute cosine similarity between two vectors.
///
/// Returns 0.0 if either vector has zero magnitude or the lengths differ.
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    async fn upsert(&self, document: &Document) -> Result<()> {
        let mut documents = self.documents.write().await;
        documents.insert(document.id.clone(), document.clone());
        Ok(())
    }

    async fn query(&self, query: &Query, limit: Option<usize>) -> Result<Vec<Match>> {
        let limit = limit.unwrap_or(DEFAULT_QUERY_LIMIT);
        let query_embedding = self.embedder.embed(&query.text).await;

        let documents = self.documents.read().await;
        let mut scored: Vec<Match> = documents
            .values()
            .filter(|doc| match (&query.topic, &doc.topic) {
                (Some(wanted), Some(tagged)) => wanted == tagged,
                (Some(_), None) => false,
                (None, _) => true,
            })
            .map(|doc| {
                let certainty =
                    (1.0 + cosine_similarity(&doc.embedding, &query_embedding.vector)) / 2.0;
                Match {
                    content: doc.content.clone(),
                    certainty: Some(certainty),
                    id: Some(doc.id.clone()),
                }
            })
            .filter(|m| m.certainty.unwrap_or(0.0) >= self.certainty_threshold)
            .collect();

        scored.sort_by(|a, b| {
            b.certainty.partial_cmp(&a.certainty).unwrap_or(std::cmp::Ordering::Equal)
        });
        scored.truncate(limit);
        Ok(scored)
    }

    async fn clear_all(&self) -> Result<()> {
        let mut documents = self.documents.write().await;
        documents.clear();
        Ok(())
    }
}
