//! Error types for Skald.

use thiserror::Error;

/// Library-level error type for Skald operations.
#[derive(Error, Debug)]
pub enum SkaldError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unknown speaker code '{code}' in {episode}: add it to the [speakers] map")]
    UnknownSpeaker { code: String, episode: String },

    #[error("Transcription returned no utterances for {0}")]
    EmptyTranscript(String),

    #[error("Malformed manifest line {line} in {manifest}: {reason}")]
    MalformedManifest {
        manifest: String,
        line: usize,
        reason: String,
    },

    #[error("Unsupported corpus source: {0} (expected a series directory or a .txt manifest)")]
    UnsupportedSource(String),

    #[error("Unsupported file in series directory: {0} (expected .mp3)")]
    UnsupportedFile(String),

    #[error("Series directory must be flat, found subdirectory: {0}")]
    NestedDirectory(String),

    #[error("Transcription failed: {0}")]
    Transcription(String),

    #[error("Embedding generation failed: {0}")]
    Embedding(String),

    #[error("OpenAI API error: {0}")]
    OpenAI(String),

    #[error("Store pair inconsistent: {0}")]
    Consistency(String),

    #[error("Search hit index {index} out of range for store of {len} documents")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl SkaldError {
    /// Whether this error is confined to a single episode.
    ///
    /// Episode-scoped provider failures are skipped during ingestion;
    /// everything else aborts the enclosing series walk.
    pub fn is_episode_scoped(&self) -> bool {
        matches!(
            self,
            SkaldError::Transcription(_)
                | SkaldError::Embedding(_)
                | SkaldError::OpenAI(_)
                | SkaldError::EmptyTranscript(_)
        )
    }
}

/// Result type alias for Skald operations.
pub type Result<T> = std::result::Result<T, SkaldError>;
