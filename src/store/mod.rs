//! Co-indexed document/vector store pair for Skald.
//!
//! The store holds an ordered document list and a vector index whose i-th
//! entries describe the same utterance. Both grow only by lockstep append;
//! checkpointing serializes the current snapshot to two co-located artifacts,
//! `<base>.json` (documents) and `<base>.vec` (vectors).
//!
//! The two artifacts are written sequentially, not atomically as a pair, and
//! loading verifies only their counts. Ingestion and serving must therefore
//! not run concurrently against the same base path; a reader starting
//! mid-write can observe a torn pair.

use crate::error::{Result, SkaldError};
use crate::index::FlatIndex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// One retrievable snippet: an utterance's text and clock times plus its
/// series/episode provenance. Created at ingestion time, immutable after.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Utterance text.
    pub text: String,
    /// Start clock time, `hh:mm:ss`.
    pub start: String,
    /// End clock time, `hh:mm:ss`.
    pub end: String,
    /// Series title.
    pub series: String,
    /// Episode title.
    pub episode: String,
}

/// The co-indexed (documents, vectors) pair.
pub struct SnippetStore {
    documents: Vec<Document>,
    index: FlatIndex,
}

impl SnippetStore {
    /// Create an empty store for vectors of the given dimension.
    pub fn new(dimension: usize) -> Self {
        Self {
            documents: Vec::new(),
            index: FlatIndex::new(dimension),
        }
    }

    /// Number of document/vector pairs.
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Configured vector dimension.
    pub fn dimension(&self) -> usize {
        self.index.dimension()
    }

    /// Append documents and their vectors in lockstep.
    ///
    /// The i-th vector must embed the i-th document's text; the counts must
    /// match or nothing is appended.
    pub fn append(&mut self, documents: Vec<Document>, vectors: Vec<Vec<f32>>) -> Result<()> {
        if documents.len() != vectors.len() {
            return Err(SkaldError::Consistency(format!(
                "append of {} documents with {} vectors",
                documents.len(),
                vectors.len()
            )));
        }

        self.index.add(&vectors)?;
        self.documents.extend(documents);

        debug_assert_eq!(self.documents.len(), self.index.len());
        Ok(())
    }

    /// Fetch a document by position.
    pub fn document(&self, index: usize) -> Result<&Document> {
        self.documents.get(index).ok_or(SkaldError::IndexOutOfRange {
            index,
            len: self.documents.len(),
        })
    }

    /// All documents, in append order.
    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    /// K nearest vectors to the query, nearest-first.
    pub fn nearest(&self, query: &[f32], k: usize) -> Result<Vec<(f32, usize)>> {
        self.index.search(query, k)
    }

    /// Distinct episode titles present in the store.
    ///
    /// This is the resume key: an episode whose title is already here is
    /// skipped on re-ingestion.
    pub fn episode_titles(&self) -> HashSet<String> {
        self.documents
            .iter()
            .map(|d| d.episode.clone())
            .collect()
    }

    /// Paths of the two checkpoint artifacts for a base path.
    pub fn artifact_paths(base: &Path) -> (PathBuf, PathBuf) {
        let mut json = base.as_os_str().to_owned();
        json.push(".json");
        let mut vec = base.as_os_str().to_owned();
        vec.push(".vec");
        (PathBuf::from(json), PathBuf::from(vec))
    }

    /// Whether a checkpoint exists at the base path.
    pub fn checkpoint_exists(base: &Path) -> bool {
        let (json_path, vec_path) = Self::artifact_paths(base);
        json_path.exists() && vec_path.exists()
    }

    /// Persist the current snapshot to `<base>.json` and `<base>.vec`.
    pub fn save(&self, base: &Path) -> Result<()> {
        if let Some(parent) = base.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let (json_path, vec_path) = Self::artifact_paths(base);

        self.index.write_to(&vec_path)?;
        let json = serde_json::to_string_pretty(&self.documents)?;
        std::fs::write(&json_path, json)?;

        debug!(
            "Saved {} snippets to {} and {}",
            self.len(),
            json_path.display(),
            vec_path.display()
        );
        Ok(())
    }

    /// Load a snapshot from `<base>.json` and `<base>.vec`.
    ///
    /// The artifacts must agree in count; a mismatch means a torn or partial
    /// write and the pair is rejected rather than served.
    pub fn load(base: &Path) -> Result<Self> {
        let (json_path, vec_path) = Self::artifact_paths(base);

        let index = FlatIndex::read_from(&vec_path)?;
        let json = std::fs::read_to_string(&json_path)?;
        let documents: Vec<Document> = serde_json::from_str(&json)?;

        if documents.len() != index.len() {
            return Err(SkaldError::Consistency(format!(
                "{} documents but {} vectors loaded from {}",
                documents.len(),
                index.len(),
                base.display()
            )));
        }

        info!("Loaded {} snippets from {}", documents.len(), base.display());
        Ok(Self { documents, index })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(text: &str, episode: &str) -> Document {
        Document {
            text: text.to_string(),
            start: "00:00:00".to_string(),
            end: "00:00:05".to_string(),
            series: "history pod".to_string(),
            episode: episode.to_string(),
        }
    }

    fn sample_store() -> SnippetStore {
        let mut store = SnippetStore::new(2);
        store
            .append(
                vec![doc("rome fell", "ep one"), doc("rome rose", "ep two")],
                vec![vec![1.0, 0.0], vec![0.0, 1.0]],
            )
            .unwrap();
        store
    }

    #[test]
    fn test_append_lockstep() {
        let store = sample_store();
        assert_eq!(store.len(), 2);
        assert_eq!(store.document(1).unwrap().episode, "ep two");
    }

    #[test]
    fn test_append_count_mismatch_rejected() {
        let mut store = SnippetStore::new(2);
        let err = store
            .append(vec![doc("a", "ep")], vec![vec![1.0, 0.0], vec![0.0, 1.0]])
            .unwrap_err();
        assert!(matches!(err, SkaldError::Consistency(_)));
        assert_eq!(store.len(), 0);
    }

    #[test]
    fn test_document_out_of_range() {
        let store = sample_store();
        assert!(matches!(
            store.document(5),
            Err(SkaldError::IndexOutOfRange { index: 5, len: 2 })
        ));
    }

    #[test]
    fn test_episode_titles() {
        let titles = sample_store().episode_titles();
        assert_eq!(titles.len(), 2);
        assert!(titles.contains("ep one"));
        assert!(titles.contains("ep two"));
    }

    #[test]
    fn test_save_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("archive");

        let store = sample_store();
        let query = vec![0.9, 0.1];
        let before = store.nearest(&query, 2).unwrap();

        store.save(&base).unwrap();
        assert!(SnippetStore::checkpoint_exists(&base));

        let reloaded = SnippetStore::load(&base).unwrap();
        assert_eq!(reloaded.documents(), store.documents());

        // Same query, same hits, same distances
        let after = reloaded.nearest(&query, 2).unwrap();
        assert_eq!(before, after);
    }

    #[test]
    fn test_torn_pair_rejected_on_load() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("archive");

        sample_store().save(&base).unwrap();

        // Rewrite the document artifact with an extra record, as a crash
        // between the two writes could leave it
        let (json_path, _) = SnippetStore::artifact_paths(&base);
        let mut documents: Vec<Document> =
            serde_json::from_str(&std::fs::read_to_string(&json_path).unwrap()).unwrap();
        documents.push(doc("orphan", "ep three"));
        std::fs::write(&json_path, serde_json::to_string(&documents).unwrap()).unwrap();

        assert!(matches!(
            SnippetStore::load(&base),
            Err(SkaldError::Consistency(_))
        ));
    }
}
