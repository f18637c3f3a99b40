//! Data models for transcription.

use serde::{Deserialize, Serialize};

/// One speaker turn as the provider reports it.
///
/// `speaker` is the provider's raw diarization code (e.g. "A"), not a
/// display name; offsets are milliseconds from the start of the audio.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawUtterance {
    /// Raw speaker code.
    pub speaker: String,
    /// Spoken text.
    pub text: String,
    /// Start offset in milliseconds.
    pub start_ms: u64,
    /// End offset in milliseconds.
    pub end_ms: u64,
}

impl RawUtterance {
    /// Create a new raw utterance.
    pub fn new(speaker: &str, text: &str, start_ms: u64, end_ms: u64) -> Self {
        Self {
            speaker: speaker.to_string(),
            text: text.to_string(),
            start_ms,
            end_ms,
        }
    }
}
