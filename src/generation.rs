//! Generation backend trait for turning prompts into text.

use async_trait::async_trait;

use crate::error::Result;

/// A backend that turns a fully assembled prompt into free-text output.
///
/// Non-streaming: one call returns the complete response text or fails.
/// Implementations perform no retries; retry policy, if wanted, belongs to
/// the caller.
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// Generate a response for the given prompt.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Generation`](crate::RagError::Generation) on any
    /// transport or timeout failure, carrying the underlying cause.
    async fn generate(&self, prompt: &str) -> Result<String>;
}
