//! Ingest command implementation.

use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::Orchestrator;
use anyhow::Result;
use std::path::Path;

/// Run the ingest command.
pub async fn run_ingest(path: &str, settings: Settings) -> Result<()> {
    let root = Path::new(path);
    if !root.is_dir() {
        Output::error(&format!("Corpus root is not a directory: {}", path));
        anyhow::bail!("invalid corpus root");
    }

    let checkpoint = settings.checkpoint_path();
    let mut orchestrator = Orchestrator::new(settings)?;

    Output::header("Ingesting corpus");
    Output::kv("Root", path);
    Output::kv("Checkpoint", &checkpoint.display().to_string());
    println!();

    let report = orchestrator.ingest_podcast(root).await?;

    println!();
    Output::success(&format!(
        "Indexed {} episodes ({} snippets)",
        report.episodes_indexed, report.documents_added
    ));
    if report.episodes_skipped > 0 {
        Output::info(&format!(
            "{} episodes already present, skipped",
            report.episodes_skipped
        ));
    }
    if report.episodes_failed > 0 {
        Output::warning(&format!(
            "{} episodes failed; re-run to retry them",
            report.episodes_failed
        ));
    }

    Ok(())
}
