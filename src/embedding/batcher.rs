//! Order-preserving batching over an embedding provider.

use super::Embedder;
use crate::error::{Result, SkaldError};
use std::sync::Arc;
use tracing::debug;

/// Splits a text sequence into fixed-size batches and embeds them one
/// provider call at a time.
///
/// The concatenated output keeps input order: the i-th vector belongs to the
/// i-th text. The co-indexed store pair depends on this, so a failed batch
/// aborts the whole call rather than returning a partial prefix.
pub struct EmbeddingBatcher {
    embedder: Arc<dyn Embedder>,
    batch_size: usize,
}

impl EmbeddingBatcher {
    /// Create a batcher over an embedder.
    pub fn new(embedder: Arc<dyn Embedder>, batch_size: usize) -> Result<Self> {
        if batch_size == 0 {
            return Err(SkaldError::Config(
                "embedding.batch_size must be at least 1".to_string(),
            ));
        }
        Ok(Self {
            embedder,
            batch_size,
        })
    }

    /// Embed all texts, batch by batch, preserving order.
    pub async fn embed_all(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut vectors = Vec::with_capacity(texts.len());

        for batch in texts.chunks(self.batch_size) {
            let batch_vectors = self.embedder.embed_batch(batch).await?;

            if batch_vectors.len() != batch.len() {
                return Err(SkaldError::Embedding(format!(
                    "Provider returned {} vectors for a batch of {}",
                    batch_vectors.len(),
                    batch.len()
                )));
            }

            vectors.extend(batch_vectors);
        }

        debug!("Embedded {} texts", vectors.len());
        Ok(vectors)
    }

    /// Embed a single query text.
    pub async fn embed_one(&self, text: &str) -> Result<Vec<f32>> {
        self.embedder.embed(text).await
    }

    /// Dimensions of the underlying embedder.
    pub fn dimensions(&self) -> usize {
        self.embedder.dimensions()
    }
}
