//! Embedding provider trait for generating vector embeddings from text.

use async_trait::async_trait;
use rand::Rng;

/// Where an [`Embedding`]'s vector came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbeddingSource {
    /// The embedding backend produced the vector.
    Backend,
    /// The backend was unavailable or returned no embedding; the vector is
    /// pseudo-random filler with no semantic relationship to the text.
    Fallback,
}

/// A fixed-length embedding vector tagged with its provenance.
///
/// The `source` flag lets callers and tests distinguish a real embedding
/// from a fallback one; the pipeline stores both alike.
#[derive(Debug, Clone, PartialEq)]
pub struct Embedding {
    /// The vector values.
    pub vector: Vec<f32>,
    /// Whether the backend or the fallback path produced the vector.
    pub source: EmbeddingSource,
}

impl Embedding {
    /// Wrap a backend-produced vector.
    pub fn from_backend(vector: Vec<f32>) -> Self {
        Self { vector, source: EmbeddingSource::Backend }
    }

    /// Build a fallback embedding of `dimensions` independently drawn
    /// pseudo-random values in `[0, 1)`.
    ///
    /// Fallback vectors keep ingestion available during embedding-service
    /// outages; they are stored like any other vector but will not be found
    /// by later semantic queries.
    pub fn fallback(dimensions: usize) -> Self {
        let mut rng = rand::thread_rng();
        let vector = (0..dimensions).map(|_| rng.r#gen::<f32>()).collect();
        Self { vector, source: EmbeddingSource::Fallback }
    }

    /// Whether this embedding came from the fallback path.
    pub fn is_fallback(&self) -> bool {
        self.source == EmbeddingSource::Fallback
    }
}

/// A provider that generates vector embeddings from text input.
///
/// Implementations wrap a specific embedding backend behind a unified async
/// interface. Embedding never fails: on any backend failure implementations
/// return a [`Fallback`](EmbeddingSource::Fallback) embedding of the
/// configured dimensionality instead of an error, so ingestion never blocks
/// on an embedding outage.
///
/// # Example
///
/// ```rust,ignore
/// use ragpipe::EmbeddingProvider;
///
/// let provider = OllamaEmbedding::new(OllamaEmbeddingConfig::default());
/// let embedding = provider.embed("hello world").await;
/// assert_eq!(embedding.vector.len(), provider.dimensions());
/// ```
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Generate an embedding for a single text input.
    ///
    /// Infallible by contract: implementations absorb backend failures into
    /// a fallback embedding of [`dimensions()`](EmbeddingProvider::dimensions)
    /// entries.
    async fn embed(&self, text: &str) -> Embedding;

    /// Return the dimensionality of embeddings produced by this provider.
    fn dimensions(&self) -> usize;
}
