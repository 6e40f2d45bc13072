//! # ragpipe
//!
//! A retrieval-augmented generation (RAG) pipeline: given a query, retrieve
//! semantically relevant documents from a vector store, assemble them into a
//! grounding context, and forward an augmented prompt to a text-generation
//! backend.
//!
//! ## Overview
//!
//! The crate is built around three seams:
//!
//! - [`EmbeddingProvider`] - text → fixed-dimension vector; never fails
//!   (falls back to a pseudo-random vector on embedding outages)
//! - [`VectorStore`] - upsert / semantic query with topic filter / clear-all
//! - [`GenerationBackend`] - prompt → text, one bounded non-streaming call
//!
//! [`RagPipeline`] composes them into three stateless operations:
//! `generate_response`, `insert_data`, and `clear_data`.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use ragpipe::ollama::{OllamaEmbedding, OllamaEmbeddingConfig, OllamaGenerator, OllamaGeneratorConfig};
//! use ragpipe::weaviate::{WeaviateConfig, WeaviateVectorStore};
//! use ragpipe::{RagConfig, RagPipeline};
//!
//! # async fn run() -> ragpipe::Result<()> {
//! let pipeline = RagPipeline::builder()
//!     .config(RagConfig::default())
//!     .embedding_provider(Arc::new(OllamaEmbedding::new(OllamaEmbeddingConfig::default())))
//!     .vector_store(Arc::new(WeaviateVectorStore::new(WeaviateConfig::default())))
//!     .generation_backend(Arc::new(OllamaGenerator::new(OllamaGeneratorConfig::default())?))
//!     .build()?;
//!
//! let id = pipeline
//!     .insert_data("Paris is the capital of France.", Some("Geography"))
//!     .await?;
//! let answer = pipeline
//!     .generate_response("What is the capital of France?", Some("Geography"))
//!     .await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Vector store variants
//!
//! | Backend | Semantic search | Topic filter | Clear-all |
//! |---------|-----------------|--------------|-----------|
//! | [`weaviate::WeaviateVectorStore`] | certainty ≥ threshold | yes | list-then-delete |
//! | [`pinecone::PineconeVectorStore`] | backend-side | yes | unsupported |
//! | [`inmemory::InMemoryVectorStore`] | cosine, in-process | yes | yes |
//!
//! Variant selection is a construction-time decision; past the builder, all
//! code depends only on the [`VectorStore`] trait.

pub mod config;
pub mod document;
pub mod embedding;
pub mod error;
pub mod generation;
pub mod inmemory;
pub mod ollama;
pub mod pinecone;
pub mod pipeline;
pub mod vectorstore;
pub mod weaviate;

pub use config::RagConfig;
pub use document::{Document, Match, Query};
pub use embedding::{Embedding, EmbeddingProvider, EmbeddingSource};
pub use error::{RagError, Result};
pub use generation::GenerationBackend;
pub use inmemory::InMemoryVectorStore;
pub use pipeline::{RagPipeline, RagPipelineBuilder};
pub use vectorstore::{DEFAULT_QUERY_LIMIT, VectorStore};
