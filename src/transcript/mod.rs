//! Canonical transcripts for Skald.
//!
//! Turns the provider's raw utterances into the in-memory form the rest of
//! the pipeline consumes: display-named speakers and `hh:mm:ss` clock times,
//! in spoken order.

use crate::error::{Result, SkaldError};
use crate::transcription::RawUtterance;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

/// Resolves raw diarization codes to display names.
///
/// The map is total over the configured code set: looking up a code it does
/// not contain is a typed failure, never a silent pass-through.
#[derive(Debug, Clone)]
pub struct SpeakerMap {
    names: HashMap<String, String>,
}

impl SpeakerMap {
    /// Create a speaker map from code -> display name pairs.
    pub fn new(names: HashMap<String, String>) -> Self {
        Self { names }
    }

    /// Resolve a raw speaker code to its display name.
    pub fn resolve(&self, code: &str, episode_title: &str) -> Result<&str> {
        self.names
            .get(code)
            .map(String::as_str)
            .ok_or_else(|| SkaldError::UnknownSpeaker {
                code: code.to_string(),
                episode: episode_title.to_string(),
            })
    }
}

/// One speaker turn in canonical form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Utterance {
    /// Speaker display name.
    pub speaker: String,
    /// Spoken text.
    pub text: String,
    /// Start clock time, `hh:mm:ss`.
    pub start: String,
    /// End clock time, `hh:mm:ss`.
    pub end: String,
}

/// One audio recording with its normalized transcript.
#[derive(Debug, Clone)]
pub struct Episode {
    pub episode_title: String,
    pub series_title: String,
    pub utterances: Vec<Utterance>,
}

impl Episode {
    /// Normalize a provider transcript into an episode.
    ///
    /// Resolves every speaker code through the map, converts millisecond
    /// offsets to clock times, and preserves the provider's utterance order.
    /// Zero utterances from the provider is an error: a successfully
    /// transcribed episode is never empty.
    pub fn from_raw(
        episode_title: &str,
        series_title: &str,
        raw: Vec<RawUtterance>,
        speakers: &SpeakerMap,
    ) -> Result<Self> {
        if raw.is_empty() {
            return Err(SkaldError::EmptyTranscript(episode_title.to_string()));
        }

        let mut utterances = Vec::with_capacity(raw.len());
        for utterance in raw {
            let speaker = speakers.resolve(&utterance.speaker, episode_title)?;
            debug!("{}: {}", speaker, utterance.text);

            utterances.push(Utterance {
                speaker: speaker.to_string(),
                text: utterance.text,
                start: ms_to_clock(utterance.start_ms),
                end: ms_to_clock(utterance.end_ms),
            });
        }

        Ok(Self {
            episode_title: episode_title.to_string(),
            series_title: series_title.to_string(),
            utterances,
        })
    }
}

/// Convert a millisecond offset to an `hh:mm:ss` clock string.
///
/// Hours are total hours, not hours-of-day: an offset past 24h renders as
/// `25:00:00` rather than rolling over into days.
pub fn ms_to_clock(ms: u64) -> String {
    let seconds = ms / 1000;
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;
    format!("{:02}:{:02}:{:02}", hours, minutes, secs)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn speaker_map() -> SpeakerMap {
        SpeakerMap::new(
            [("A", "Alice"), ("B", "Bob")]
                .iter()
                .map(|(c, n)| (c.to_string(), n.to_string()))
                .collect(),
        )
    }

    #[test]
    fn test_ms_to_clock() {
        assert_eq!(ms_to_clock(0), "00:00:00");
        assert_eq!(ms_to_clock(3_661_000), "01:01:01");
        assert_eq!(ms_to_clock(90_000), "00:01:30");
        // Sub-second remainders truncate
        assert_eq!(ms_to_clock(1_999), "00:00:01");
        // No day rollover
        assert_eq!(ms_to_clock(25 * 3600 * 1000), "25:00:00");
    }

    #[test]
    fn test_from_raw_preserves_order_and_resolves_speakers() {
        let raw = vec![
            RawUtterance::new("A", "Welcome back.", 0, 2_000),
            RawUtterance::new("B", "Glad to be here.", 2_000, 4_500),
            RawUtterance::new("A", "Let's begin.", 4_500, 6_000),
        ];

        let episode = Episode::from_raw("pilot", "history pod", raw, &speaker_map()).unwrap();

        assert_eq!(episode.utterances.len(), 3);
        assert_eq!(episode.utterances[0].speaker, "Alice");
        assert_eq!(episode.utterances[1].speaker, "Bob");
        assert_eq!(episode.utterances[1].text, "Glad to be here.");
        assert_eq!(episode.utterances[2].start, "00:00:04");
        assert_eq!(episode.utterances[2].end, "00:00:06");
    }

    #[test]
    fn test_unknown_speaker_fails() {
        let raw = vec![RawUtterance::new("Z", "Who am I?", 0, 1_000)];

        let err = Episode::from_raw("pilot", "history pod", raw, &speaker_map()).unwrap_err();
        assert!(matches!(err, SkaldError::UnknownSpeaker { ref code, .. } if code == "Z"));
    }

    #[test]
    fn test_empty_transcript_fails() {
        let err = Episode::from_raw("pilot", "history pod", vec![], &speaker_map()).unwrap_err();
        assert!(matches!(err, SkaldError::EmptyTranscript(_)));
    }
}
