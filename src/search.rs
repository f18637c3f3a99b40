//! Search pipeline for Skald.
//!
//! Embeds a free-text query, asks the store for the nearest vectors, and
//! joins each hit back to its document with provenance and a similarity
//! score. The store snapshot is read-only; every query is independent.

use crate::embedding::Embedder;
use crate::error::Result;
use crate::store::SnippetStore;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, instrument};

/// One ranked search hit.
#[derive(Debug, Clone, Serialize)]
pub struct SearchHit {
    /// Utterance text.
    pub text: String,
    /// Start clock time, `hh:mm:ss`.
    pub start: String,
    /// End clock time, `hh:mm:ss`.
    pub end: String,
    /// Series title, display-normalized.
    pub series: String,
    /// Episode title.
    pub episode: String,
    /// Similarity in (0, 1], decreasing with distance. Not a calibrated
    /// probability; comparable only within one query.
    pub similarity: f32,
}

/// Query pipeline over a loaded store snapshot.
pub struct Searcher {
    store: SnippetStore,
    embedder: Arc<dyn Embedder>,
    series_strip: String,
}

impl Searcher {
    /// Create a searcher over a store snapshot.
    ///
    /// `series_strip` is a literal removed from series titles for display;
    /// empty disables the normalization.
    pub fn new(store: SnippetStore, embedder: Arc<dyn Embedder>, series_strip: &str) -> Self {
        Self {
            store,
            embedder,
            series_strip: series_strip.to_string(),
        }
    }

    /// Number of snippets available to search.
    pub fn len(&self) -> usize {
        self.store.len()
    }

    /// Whether the store snapshot is empty.
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Return the k most similar snippets, nearest-first.
    ///
    /// An empty or whitespace query short-circuits to no hits without
    /// calling the embedding provider. When k exceeds the store size, all
    /// stored snippets are returned.
    #[instrument(skip(self), fields(k = k))]
    pub async fn search(&self, query: &str, k: usize) -> Result<Vec<SearchHit>> {
        if query.trim().is_empty() {
            return Ok(Vec::new());
        }

        let query_vector = self.embedder.embed(query).await?;
        debug!("Query embedding obtained");

        let neighbors = self.store.nearest(&query_vector, k)?;

        let mut hits = Vec::with_capacity(neighbors.len());
        for (distance, index) in neighbors {
            let document = self.store.document(index)?;

            let series = if self.series_strip.is_empty() {
                document.series.clone()
            } else {
                document.series.replace(&self.series_strip, "")
            };

            hits.push(SearchHit {
                text: document.text.clone(),
                start: document.start.clone(),
                end: document.end.clone(),
                series,
                episode: document.episode.clone(),
                similarity: 1.0 / (1.0 + distance),
            });
        }

        debug!("Search returned {} hits", hits.len());
        Ok(hits)
    }
}
