//! Embedding generation for semantic search and retrieval.

mod batcher;
mod openai;

pub use batcher::EmbeddingBatcher;
pub use openai::OpenAIEmbedder;

use crate::error::Result;
use async_trait::async_trait;

/// Trait for embedding generation.
///
/// `embed_batch` issues exactly one provider call for the given texts and
/// returns vectors in input order; callers that need larger inputs go
/// through [`EmbeddingBatcher`].
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Generate an embedding for a single text.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Generate embeddings for one batch of texts, in input order.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Get the embedding dimensions.
    fn dimensions(&self) -> usize;
}
