//! Search command implementation.

use crate::cli::Output;
use crate::config::Settings;
use crate::embedding::{Embedder, OpenAIEmbedder};
use crate::search::Searcher;
use crate::store::SnippetStore;
use anyhow::Result;
use std::sync::Arc;

/// Run the search command.
pub async fn run_search(query: &str, k: usize, settings: Settings) -> Result<()> {
    let checkpoint = settings.checkpoint_path();
    if !SnippetStore::checkpoint_exists(&checkpoint) {
        Output::warning("No archive found. Run `skald ingest` first.");
        return Ok(());
    }

    let store = SnippetStore::load(&checkpoint)?;
    let embedder: Arc<dyn Embedder> = Arc::new(OpenAIEmbedder::new(&settings.embedding)?);
    let searcher = Searcher::new(store, embedder, &settings.search.series_strip);

    let spinner = Output::spinner("Searching...");
    let hits = searcher.search(query, k).await;
    spinner.finish_and_clear();

    match hits {
        Ok(hits) => {
            if hits.is_empty() {
                Output::warning("No results found matching your query.");
            } else {
                Output::success(&format!("Found {} results", hits.len()));

                for hit in &hits {
                    Output::search_hit(
                        &hit.series,
                        &hit.episode,
                        &hit.start,
                        hit.similarity,
                        &hit.text,
                    );
                }
            }
        }
        Err(e) => {
            Output::error(&format!("Search failed: {}", e));
            return Err(anyhow::anyhow!("{}", e));
        }
    }

    Ok(())
}
