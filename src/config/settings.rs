//! Configuration settings for Skald.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub transcription: TranscriptionSettings,
    pub embedding: EmbeddingSettings,
    pub store: StoreSettings,
    pub search: SearchSettings,
    /// Speaker map: raw diarization code -> display name.
    ///
    /// Must cover every code the transcription provider can emit for the
    /// configured corpus; an unmapped code fails ingestion.
    pub speakers: HashMap<String, String>,
}


/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Directory for storing application data.
    pub data_dir: String,
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            data_dir: "~/.skald".to_string(),
            log_level: "info".to_string(),
        }
    }
}

/// AssemblyAI speech model tier.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SpeechModel {
    /// Fast, cheaper model (default).
    #[default]
    Nano,
    /// Highest accuracy model.
    Best,
}

impl std::str::FromStr for SpeechModel {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "nano" => Ok(SpeechModel::Nano),
            "best" => Ok(SpeechModel::Best),
            _ => Err(format!("Unknown speech model: {} (expected nano or best)", s)),
        }
    }
}

impl std::fmt::Display for SpeechModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SpeechModel::Nano => write!(f, "nano"),
            SpeechModel::Best => write!(f, "best"),
        }
    }
}

/// Transcription service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranscriptionSettings {
    /// AssemblyAI API base URL.
    pub base_url: String,
    /// AssemblyAI API key. Falls back to ASSEMBLYAI_API_KEY when unset.
    pub api_key: Option<String>,
    /// Speech model tier (nano, best).
    pub model: SpeechModel,
    /// Expected speaker count hint for diarization. 0 = no hint.
    pub speakers_expected: usize,
    /// Per-request HTTP timeout in seconds.
    pub http_timeout_seconds: u64,
    /// Seconds between transcript status polls.
    pub poll_interval_seconds: u64,
    /// Maximum seconds to wait for one transcript job before failing.
    pub poll_timeout_seconds: u64,
}

impl Default for TranscriptionSettings {
    fn default() -> Self {
        Self {
            base_url: "https://api.assemblyai.com".to_string(),
            api_key: None,
            model: SpeechModel::Nano,
            speakers_expected: 0,
            http_timeout_seconds: 240,
            poll_interval_seconds: 3,
            poll_timeout_seconds: 1800, // 30 minutes per episode
        }
    }
}

/// Embedding generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingSettings {
    /// Embedding model to use.
    pub model: String,
    /// Embedding dimensions.
    pub dimensions: u32,
    /// Texts per embedding request.
    pub batch_size: usize,
    /// OpenAI API key. Falls back to OPENAI_API_KEY when unset.
    pub api_key: Option<String>,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            model: "text-embedding-3-small".to_string(),
            dimensions: 1536,
            batch_size: 100,
            api_key: None,
        }
    }
}

/// Store pair persistence settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreSettings {
    /// Base path for the checkpoint artifacts (<base>.json and <base>.vec).
    pub checkpoint: String,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            checkpoint: "~/.skald/archive".to_string(),
        }
    }
}

/// Search settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    /// Default number of results.
    pub default_k: usize,
    /// Literal substring removed from series titles for display.
    pub series_strip: String,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            default_k: 5,
            series_strip: String::new(),
        }
    }
}

impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> crate::error::Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    pub fn load_from(path: Option<&PathBuf>) -> crate::error::Result<Self> {
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let settings: Settings = toml::from_str(&content)?;
            Ok(settings)
        } else {
            Ok(Settings::default())
        }
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &PathBuf) -> crate::error::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::error::SkaldError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("skald")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    /// Get the expanded data directory path.
    pub fn data_dir(&self) -> PathBuf {
        Self::expand_path(&self.general.data_dir)
    }

    /// Get the expanded checkpoint base path.
    pub fn checkpoint_path(&self) -> PathBuf {
        Self::expand_path(&self.store.checkpoint)
    }

    /// Speaker map with defaults for the codes AssemblyAI emits (A-G),
    /// mapped to themselves unless the configuration overrides them.
    pub fn speaker_names(&self) -> HashMap<String, String> {
        let mut names: HashMap<String, String> = ["A", "B", "C", "D", "E", "F", "G"]
            .iter()
            .map(|c| (c.to_string(), c.to_string()))
            .collect();
        for (code, name) in &self.speakers {
            names.insert(code.clone(), name.clone());
        }
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.embedding.dimensions, 1536);
        assert_eq!(settings.embedding.batch_size, 100);
        assert_eq!(settings.transcription.model, SpeechModel::Nano);
        assert_eq!(settings.search.default_k, 5);
    }

    #[test]
    fn test_speech_model_parse() {
        assert_eq!("best".parse::<SpeechModel>().unwrap(), SpeechModel::Best);
        assert_eq!("NANO".parse::<SpeechModel>().unwrap(), SpeechModel::Nano);
        assert!("turbo".parse::<SpeechModel>().is_err());
    }

    #[test]
    fn test_speaker_names_merge() {
        let mut settings = Settings::default();
        settings
            .speakers
            .insert("A".to_string(), "Host".to_string());

        let names = settings.speaker_names();
        assert_eq!(names.get("A").unwrap(), "Host");
        assert_eq!(names.get("B").unwrap(), "B");
    }
}
