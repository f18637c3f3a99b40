//! Ingestion orchestrator for Skald.
//!
//! Walks a podcast corpus (root -> series -> episode), drives transcription,
//! normalization, embedding, and store appends, and checkpoints the store
//! pair after every completed episode so an interrupted run can resume.

use crate::config::Settings;
use crate::corpus::{
    classify_source, is_supported_audio, parse_manifest_line, title_from_path, AudioSource,
    SeriesSource,
};
use crate::embedding::{Embedder, EmbeddingBatcher, OpenAIEmbedder};
use crate::error::{Result, SkaldError};
use crate::store::{Document, SnippetStore};
use crate::transcript::{Episode, SpeakerMap};
use crate::transcription::{AssemblyAiTranscriber, Transcriber};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// The main orchestrator for the Skald ingestion pipeline.
///
/// Ingestion is strictly sequential: one episode, then one embedding batch
/// at a time. That keeps the store pair invariant trivial to maintain and
/// matches the provider rate limits this tool is used with.
pub struct Orchestrator {
    settings: Settings,
    speakers: SpeakerMap,
    transcriber: Arc<dyn Transcriber>,
    batcher: EmbeddingBatcher,
    store: SnippetStore,
    checkpoint: PathBuf,
}

impl Orchestrator {
    /// Create a new orchestrator with default providers.
    pub fn new(settings: Settings) -> Result<Self> {
        let transcriber: Arc<dyn Transcriber> =
            Arc::new(AssemblyAiTranscriber::new(&settings.transcription)?);
        let embedder: Arc<dyn Embedder> = Arc::new(OpenAIEmbedder::new(&settings.embedding)?);
        Self::with_components(settings, transcriber, embedder)
    }

    /// Create an orchestrator with custom providers.
    pub fn with_components(
        settings: Settings,
        transcriber: Arc<dyn Transcriber>,
        embedder: Arc<dyn Embedder>,
    ) -> Result<Self> {
        let checkpoint = settings.checkpoint_path();
        let dimension = settings.embedding.dimensions as usize;

        let store = if SnippetStore::checkpoint_exists(&checkpoint) {
            let store = SnippetStore::load(&checkpoint)?;
            if store.dimension() != dimension {
                return Err(SkaldError::Consistency(format!(
                    "checkpoint at {} holds {}-dimensional vectors but embedding.dimensions is {}",
                    checkpoint.display(),
                    store.dimension(),
                    dimension
                )));
            }
            info!(
                "Resuming from checkpoint with {} snippets across {} episodes",
                store.len(),
                store.episode_titles().len()
            );
            store
        } else {
            SnippetStore::new(dimension)
        };

        let batcher = EmbeddingBatcher::new(embedder, settings.embedding.batch_size)?;
        let speakers = SpeakerMap::new(settings.speaker_names());

        Ok(Self {
            settings,
            speakers,
            transcriber,
            batcher,
            store,
            checkpoint,
        })
    }

    /// The current store snapshot.
    pub fn store(&self) -> &SnippetStore {
        &self.store
    }

    /// Ingest every series under a podcast root directory.
    #[instrument(skip(self), fields(root = %root.display()))]
    pub async fn ingest_podcast(&mut self, root: &Path) -> Result<IngestReport> {
        let mut entries: Vec<PathBuf> = std::fs::read_dir(root)?
            .collect::<std::io::Result<Vec<_>>>()?
            .into_iter()
            .map(|e| e.path())
            .collect();
        entries.sort();

        let mut report = IngestReport::default();

        for entry in entries {
            let source = classify_source(&entry)?;
            self.ingest_series(&source, &mut report).await?;
        }

        Ok(report)
    }

    /// Ingest one series.
    ///
    /// Per-episode provider failures are logged and skipped; the rest of the
    /// series continues and a later run retries the failures via resume.
    /// Structural errors abort: they mean the corpus is misdescribed.
    #[instrument(skip(self, report))]
    pub async fn ingest_series(
        &mut self,
        source: &SeriesSource,
        report: &mut IngestReport,
    ) -> Result<()> {
        let series_title = source.series_title();
        let completed = self.store.episode_titles();
        info!("Ingesting series: {}", series_title);

        match source {
            SeriesSource::AudioDirectory(dir) => {
                let mut files: Vec<PathBuf> = std::fs::read_dir(dir)?
                    .collect::<std::io::Result<Vec<_>>>()?
                    .into_iter()
                    .map(|e| e.path())
                    .collect();
                files.sort();

                if let Some(subdir) = files.iter().find(|p| p.is_dir()) {
                    return Err(SkaldError::NestedDirectory(subdir.display().to_string()));
                }
                if let Some(stray) = files.iter().find(|p| !is_supported_audio(p)) {
                    return Err(SkaldError::UnsupportedFile(stray.display().to_string()));
                }

                for file in files {
                    let episode_title = title_from_path(&file);
                    if completed.contains(&episode_title) {
                        info!("Episode already indexed, skipping: {}", episode_title);
                        report.episodes_skipped += 1;
                        continue;
                    }

                    let audio = AudioSource::Local(file);
                    self.ingest_episode(&episode_title, &series_title, &audio, report)
                        .await?;
                }
            }

            SeriesSource::UrlManifest(manifest) => {
                let content = std::fs::read_to_string(manifest)?;

                for (line_no, line) in content.lines().enumerate() {
                    if line.trim().is_empty() {
                        continue;
                    }

                    let entry = match parse_manifest_line(manifest, line_no + 1, line) {
                        Ok(entry) => entry,
                        Err(e) => {
                            warn!("{}", e);
                            eprintln!("  Skipping manifest line {}: {}", line_no + 1, e);
                            report.episodes_failed += 1;
                            continue;
                        }
                    };

                    if completed.contains(&entry.episode_title) {
                        info!("Episode already indexed, skipping: {}", entry.episode_title);
                        report.episodes_skipped += 1;
                        continue;
                    }

                    let audio = AudioSource::Remote(entry.url);
                    self.ingest_episode(&entry.episode_title, &series_title, &audio, report)
                        .await?;
                }
            }
        }

        Ok(())
    }

    /// Transcribe, normalize, embed, and index one episode.
    async fn ingest_episode(
        &mut self,
        episode_title: &str,
        series_title: &str,
        audio: &AudioSource,
        report: &mut IngestReport,
    ) -> Result<()> {
        info!("Processing episode: {} ({})", episode_title, audio);
        eprintln!("  {}: {}", series_title, episode_title);

        let result = self.process_episode(episode_title, series_title, audio).await;

        match result {
            Ok(count) => {
                eprintln!("    Indexed {} snippets", count);
                report.episodes_indexed += 1;
                report.documents_added += count;
                Ok(())
            }
            Err(e) if e.is_episode_scoped() => {
                warn!("Episode '{}' failed, continuing: {}", episode_title, e);
                eprintln!("    Failed, will retry on next run: {}", e);
                report.episodes_failed += 1;
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    async fn process_episode(
        &mut self,
        episode_title: &str,
        series_title: &str,
        audio: &AudioSource,
    ) -> Result<usize> {
        let raw = self
            .transcriber
            .transcribe(audio, self.settings.transcription.speakers_expected)
            .await?;

        let episode = Episode::from_raw(episode_title, series_title, raw, &self.speakers)?;

        self.index_episode(&episode).await
    }

    /// Append an episode's documents and vectors, then checkpoint.
    async fn index_episode(&mut self, episode: &Episode) -> Result<usize> {
        let documents: Vec<Document> = episode
            .utterances
            .iter()
            .map(|u| Document {
                text: u.text.clone(),
                start: u.start.clone(),
                end: u.end.clone(),
                series: episode.series_title.clone(),
                episode: episode.episode_title.clone(),
            })
            .collect();

        let texts: Vec<String> = documents.iter().map(|d| d.text.clone()).collect();
        let vectors = self.batcher.embed_all(&texts).await?;

        self.store.append(documents, vectors)?;
        self.store.save(&self.checkpoint)?;

        Ok(episode.utterances.len())
    }
}

/// Result of an ingestion run.
#[derive(Debug, Default)]
pub struct IngestReport {
    /// Episodes transcribed and indexed this run.
    pub episodes_indexed: usize,
    /// Episodes skipped because the checkpoint already had them.
    pub episodes_skipped: usize,
    /// Episodes (or manifest lines) that failed and were passed over.
    pub episodes_failed: usize,
    /// Documents appended to the store this run.
    pub documents_added: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transcription::RawUtterance;
    use async_trait::async_trait;

    /// Transcriber double returning two canned utterances per episode, or
    /// failing when the source path/url contains a marker.
    struct CannedTranscriber;

    #[async_trait]
    impl Transcriber for CannedTranscriber {
        async fn transcribe(
            &self,
            source: &AudioSource,
            _speakers_expected: usize,
        ) -> Result<Vec<RawUtterance>> {
            if source.to_string().contains("broken") {
                return Err(SkaldError::Transcription("provider rejected audio".into()));
            }
            Ok(vec![
                RawUtterance::new("A", "First thought.", 0, 3_000),
                RawUtterance::new("B", "Second thought.", 3_000, 6_000),
            ])
        }
    }

    /// Embedder double producing constant-dimension vectors.
    struct CannedEmbedder;

    #[async_trait]
    impl Embedder for CannedEmbedder {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            Ok(vec![1.0, 0.0])
        }

        async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            Ok(texts.iter().map(|t| vec![t.len() as f32, 1.0]).collect())
        }

        fn dimensions(&self) -> usize {
            2
        }
    }

    fn test_settings(dir: &Path) -> Settings {
        let mut settings = Settings::default();
        settings.store.checkpoint = dir.join("archive").display().to_string();
        settings.embedding.dimensions = 2;
        settings
    }

    fn test_orchestrator(dir: &Path) -> Orchestrator {
        Orchestrator::with_components(
            test_settings(dir),
            Arc::new(CannedTranscriber),
            Arc::new(CannedEmbedder),
        )
        .unwrap()
    }

    fn write_corpus(root: &Path) {
        let series = root.join("roman_history");
        std::fs::create_dir_all(&series).unwrap();
        std::fs::write(series.join("the-republic.mp3"), b"audio").unwrap();
        std::fs::write(series.join("the-empire.mp3"), b"audio").unwrap();
    }

    #[tokio::test]
    async fn test_ingest_directory_series() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("corpus");
        write_corpus(&root);

        let mut orchestrator = test_orchestrator(dir.path());
        let report = orchestrator.ingest_podcast(&root).await.unwrap();

        assert_eq!(report.episodes_indexed, 2);
        assert_eq!(report.documents_added, 4);
        assert_eq!(orchestrator.store().len(), 4);

        let doc = orchestrator.store().document(0).unwrap();
        assert_eq!(doc.series, "roman history");
        assert_eq!(doc.episode, "the empire");
        assert_eq!(doc.start, "00:00:00");
    }

    #[tokio::test]
    async fn test_resume_skips_completed_episodes() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("corpus");
        write_corpus(&root);

        let mut first = test_orchestrator(dir.path());
        first.ingest_podcast(&root).await.unwrap();
        let count_after_first = first.store().len();

        // A fresh orchestrator picks up the checkpoint
        let mut second = test_orchestrator(dir.path());
        let report = second.ingest_podcast(&root).await.unwrap();

        assert_eq!(report.episodes_indexed, 0);
        assert_eq!(report.episodes_skipped, 2);
        assert_eq!(report.documents_added, 0);
        assert_eq!(second.store().len(), count_after_first);
    }

    #[tokio::test]
    async fn test_nested_directory_aborts_series() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("corpus");
        let series = root.join("interviews");
        std::fs::create_dir_all(series.join("bonus")).unwrap();
        std::fs::write(series.join("one.mp3"), b"audio").unwrap();

        let mut orchestrator = test_orchestrator(dir.path());
        let err = orchestrator.ingest_podcast(&root).await.unwrap_err();

        assert!(matches!(err, SkaldError::NestedDirectory(_)));
        assert_eq!(orchestrator.store().len(), 0);
    }

    #[tokio::test]
    async fn test_unsupported_file_aborts_series() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("corpus");
        let series = root.join("interviews");
        std::fs::create_dir_all(&series).unwrap();
        std::fs::write(series.join("one.wav"), b"audio").unwrap();

        let mut orchestrator = test_orchestrator(dir.path());
        assert!(matches!(
            orchestrator.ingest_podcast(&root).await,
            Err(SkaldError::UnsupportedFile(_))
        ));
    }

    #[tokio::test]
    async fn test_stray_root_file_is_structural_error() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("corpus");
        std::fs::create_dir_all(&root).unwrap();
        std::fs::write(root.join("notes.md"), b"notes").unwrap();

        let mut orchestrator = test_orchestrator(dir.path());
        assert!(matches!(
            orchestrator.ingest_podcast(&root).await,
            Err(SkaldError::UnsupportedSource(_))
        ));
    }

    #[tokio::test]
    async fn test_manifest_series_with_malformed_line() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("corpus");
        std::fs::create_dir_all(&root).unwrap();
        std::fs::write(
            root.join("remote_talks.txt"),
            "Opening Night,https://example.com/1.mp3\n\
             too,many,fields\n\
             Closing Night,https://example.com/2.mp3\n",
        )
        .unwrap();

        let mut orchestrator = test_orchestrator(dir.path());
        let report = orchestrator.ingest_podcast(&root).await.unwrap();

        // The malformed line is passed over, the rest of the manifest lands
        assert_eq!(report.episodes_indexed, 2);
        assert_eq!(report.episodes_failed, 1);
        assert_eq!(orchestrator.store().len(), 4);
        assert_eq!(
            orchestrator.store().document(0).unwrap().series,
            "remote talks"
        );
    }

    #[tokio::test]
    async fn test_provider_failure_skips_episode_and_continues() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("corpus");
        std::fs::create_dir_all(&root).unwrap();
        std::fs::write(
            root.join("talks.txt"),
            "Good Episode,https://example.com/good.mp3\n\
             Bad Episode,https://example.com/broken.mp3\n\
             Another Good One,https://example.com/fine.mp3\n",
        )
        .unwrap();

        let mut orchestrator = test_orchestrator(dir.path());
        let report = orchestrator.ingest_podcast(&root).await.unwrap();

        assert_eq!(report.episodes_indexed, 2);
        assert_eq!(report.episodes_failed, 1);
        let titles = orchestrator.store().episode_titles();
        assert!(titles.contains("Good Episode"));
        assert!(!titles.contains("Bad Episode"));
    }
}
