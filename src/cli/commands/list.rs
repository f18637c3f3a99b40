//! List command implementation.

use crate::cli::Output;
use crate::config::Settings;
use crate::store::SnippetStore;
use anyhow::Result;
use std::collections::BTreeMap;

/// Run the list command.
pub fn run_list(settings: Settings) -> Result<()> {
    let checkpoint = settings.checkpoint_path();
    if !SnippetStore::checkpoint_exists(&checkpoint) {
        Output::warning("No archive found. Run `skald ingest` first.");
        return Ok(());
    }

    let store = SnippetStore::load(&checkpoint)?;

    // series -> episode -> snippet count
    let mut series_map: BTreeMap<String, BTreeMap<String, usize>> = BTreeMap::new();
    for doc in store.documents() {
        *series_map
            .entry(doc.series.clone())
            .or_default()
            .entry(doc.episode.clone())
            .or_default() += 1;
    }

    Output::header("Indexed archive");
    Output::kv("Snippets", &store.len().to_string());
    Output::kv("Series", &series_map.len().to_string());

    for (series, episodes) in &series_map {
        println!("\n{}", series);
        for (episode, count) in episodes {
            Output::list_item(&format!("{} ({} snippets)", episode, count));
        }
    }

    Ok(())
}
