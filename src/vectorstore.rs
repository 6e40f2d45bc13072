//! Vector store trait for storing and retrieving embedded documents.

use async_trait::async_trait;

use crate::document::{Document, Match, Query};
use crate::error::Result;

/// A storage backend for embedded documents with semantic retrieval.
///
/// The pipeline depends only on this capability set; which concrete backend
/// is active is a construction-time decision and invisible past that point,
/// except that [`clear_all`](VectorStore::clear_all) legitimately fails with
/// [`RagError::UnsupportedOperation`](crate::RagError::UnsupportedOperation)
/// on backends without bulk delete.
///
/// # Example
///
/// ```rust,ignore
/// use ragpipe::{VectorStore, Query};
///
/// store.upsert(&document).await?;
/// let matches = store.query(&Query::new("capital of France"), Some(3)).await?;
/// ```
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Insert or replace a document by its identifier.
    ///
    /// The document's embedding is precomputed by the caller; stores never
    /// embed content themselves on the write path.
    async fn upsert(&self, document: &Document) -> Result<()>;

    /// Retrieve up to `limit` matches for the query, most similar first.
    ///
    /// `None` means the backend's default limit (10). When the query carries
    /// a topic, only documents tagged with that exact topic are returned.
    /// The returned order is the backend's relevance order and must be
    /// preserved by callers.
    async fn query(&self, query: &Query, limit: Option<usize>) -> Result<Vec<Match>>;

    /// Delete every document in the store.
    async fn clear_all(&self) -> Result<()>;
}

/// Default number of matches a store returns when the caller passes no limit.
pub const DEFAULT_QUERY_LIMIT: usize = 10;
