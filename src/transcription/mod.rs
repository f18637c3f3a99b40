//! Transcription module for Skald.
//!
//! Consumes a speech-to-text provider as a black box: given an audio source
//! (local file or remote URL) and a speaker-count hint, the provider returns
//! an ordered sequence of speaker-labeled utterances with millisecond offsets,
//! or fails. AssemblyAI is the only backend; the trait exists so tests can
//! substitute a canned provider.

mod assemblyai;
mod models;

pub use assemblyai::AssemblyAiTranscriber;
pub use models::RawUtterance;

use crate::corpus::AudioSource;
use crate::error::Result;
use async_trait::async_trait;

/// Trait for transcription services.
#[async_trait]
pub trait Transcriber: Send + Sync {
    /// Transcribe an audio source into speaker-labeled utterances.
    ///
    /// `speakers_expected` is a diarization hint; 0 means no hint. Utterances
    /// come back in spoken order. A provider-side failure (including timeout)
    /// is an error; an empty utterance list is not — callers decide.
    async fn transcribe(
        &self,
        source: &AudioSource,
        speakers_expected: usize,
    ) -> Result<Vec<RawUtterance>>;
}
