//! AssemblyAI transcription implementation.
//!
//! Talks to the v2 REST API directly: local files are uploaded first, remote
//! URLs are handed to the transcript endpoint as-is, then the job is polled
//! until it completes or the deadline passes.

use super::{RawUtterance, Transcriber};
use crate::config::{SpeechModel, TranscriptionSettings};
use crate::corpus::AudioSource;
use crate::error::{Result, SkaldError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, instrument};

/// AssemblyAI-based transcriber.
pub struct AssemblyAiTranscriber {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: SpeechModel,
    poll_interval: Duration,
    poll_timeout: Duration,
}

impl AssemblyAiTranscriber {
    /// Create a transcriber from settings.
    ///
    /// The API key comes from the settings or the ASSEMBLYAI_API_KEY
    /// environment variable; neither being set is a configuration error.
    pub fn new(settings: &TranscriptionSettings) -> Result<Self> {
        let api_key = settings
            .api_key
            .clone()
            .or_else(|| std::env::var("ASSEMBLYAI_API_KEY").ok())
            .ok_or_else(|| {
                SkaldError::Config(
                    "AssemblyAI API key not set (transcription.api_key or ASSEMBLYAI_API_KEY)"
                        .to_string(),
                )
            })?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.http_timeout_seconds))
            .build()
            .map_err(|e| SkaldError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            api_key,
            model: settings.model,
            poll_interval: Duration::from_secs(settings.poll_interval_seconds),
            poll_timeout: Duration::from_secs(settings.poll_timeout_seconds),
        })
    }

    /// Upload a local audio file, returning the URL the API assigned to it.
    async fn upload(&self, path: &std::path::Path) -> Result<String> {
        debug!("Uploading {} for transcription", path.display());

        let bytes = tokio::fs::read(path).await?;

        let response: UploadResponse = self
            .client
            .post(format!("{}/v2/upload", self.base_url))
            .header("authorization", &self.api_key)
            .header("content-type", "application/octet-stream")
            .body(bytes)
            .send()
            .await?
            .error_for_status()
            .map_err(|e| SkaldError::Transcription(format!("Upload failed: {}", e)))?
            .json()
            .await?;

        Ok(response.upload_url)
    }

    /// Submit a transcript job and return its ID.
    async fn submit(&self, audio_url: &str, speakers_expected: usize) -> Result<String> {
        let request = TranscriptRequest {
            audio_url: audio_url.to_string(),
            speech_model: self.model.to_string(),
            speaker_labels: true,
            speakers_expected: (speakers_expected > 0).then_some(speakers_expected),
        };

        let response: TranscriptResponse = self
            .client
            .post(format!("{}/v2/transcript", self.base_url))
            .header("authorization", &self.api_key)
            .json(&request)
            .send()
            .await?
            .error_for_status()
            .map_err(|e| SkaldError::Transcription(format!("Transcript request failed: {}", e)))?
            .json()
            .await?;

        Ok(response.id)
    }

    /// Poll a transcript job until it completes, errors, or the deadline passes.
    async fn wait_for(&self, id: &str) -> Result<TranscriptResponse> {
        let deadline = tokio::time::Instant::now() + self.poll_timeout;

        loop {
            let response: TranscriptResponse = self
                .client
                .get(format!("{}/v2/transcript/{}", self.base_url, id))
                .header("authorization", &self.api_key)
                .send()
                .await?
                .error_for_status()
                .map_err(|e| SkaldError::Transcription(format!("Status poll failed: {}", e)))?
                .json()
                .await?;

            match response.status.as_str() {
                "completed" => return Ok(response),
                "error" => {
                    return Err(SkaldError::Transcription(
                        response
                            .error
                            .unwrap_or_else(|| "unspecified provider error".to_string()),
                    ))
                }
                status => debug!("Transcript {} still {}", id, status),
            }

            if tokio::time::Instant::now() >= deadline {
                return Err(SkaldError::Transcription(format!(
                    "Transcript {} did not complete within {}s",
                    id,
                    self.poll_timeout.as_secs()
                )));
            }

            tokio::time::sleep(self.poll_interval).await;
        }
    }
}

#[async_trait]
impl Transcriber for AssemblyAiTranscriber {
    #[instrument(skip(self), fields(source = %source))]
    async fn transcribe(
        &self,
        source: &AudioSource,
        speakers_expected: usize,
    ) -> Result<Vec<RawUtterance>> {
        let audio_url = match source {
            AudioSource::Local(path) => self.upload(path).await?,
            AudioSource::Remote(url) => url.clone(),
        };

        let id = self.submit(&audio_url, speakers_expected).await?;
        info!("Submitted transcript job {} ({})", id, self.model);

        let response = self.wait_for(&id).await?;

        let utterances = response
            .utterances
            .unwrap_or_default()
            .into_iter()
            .map(|u| RawUtterance {
                speaker: u.speaker,
                text: u.text,
                start_ms: u.start,
                end_ms: u.end,
            })
            .collect::<Vec<_>>();

        debug!("Transcript {} returned {} utterances", id, utterances.len());
        Ok(utterances)
    }
}

// === Wire types ===

#[derive(Deserialize)]
struct UploadResponse {
    upload_url: String,
}

#[derive(Serialize)]
struct TranscriptRequest {
    audio_url: String,
    speech_model: String,
    speaker_labels: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    speakers_expected: Option<usize>,
}

#[derive(Deserialize)]
struct TranscriptResponse {
    id: String,
    status: String,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    utterances: Option<Vec<ApiUtterance>>,
}

#[derive(Deserialize)]
struct ApiUtterance {
    speaker: String,
    text: String,
    start: u64,
    end: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TranscriptionSettings;

    #[test]
    fn test_missing_api_key_is_config_error() {
        let had_env = std::env::var("ASSEMBLYAI_API_KEY").is_ok();
        if had_env {
            // Can't meaningfully test the failure path with the key present
            return;
        }

        let settings = TranscriptionSettings::default();
        assert!(matches!(
            AssemblyAiTranscriber::new(&settings),
            Err(SkaldError::Config(_))
        ));
    }

    #[test]
    fn test_transcript_request_omits_zero_speaker_hint() {
        let request = TranscriptRequest {
            audio_url: "https://example.com/a.mp3".to_string(),
            speech_model: "nano".to_string(),
            speaker_labels: true,
            speakers_expected: None,
        };

        let json = serde_json::to_value(&request).unwrap();
        assert!(json.get("speakers_expected").is_none());
        assert_eq!(json["speaker_labels"], true);
    }
}
