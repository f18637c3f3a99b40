//! Configuration module for Skald.
//!
//! Handles loading and managing application settings.

mod settings;

pub use settings::{
    EmbeddingSettings, GeneralSettings, SearchSettings, Settings, SpeechModel, StoreSettings,
    TranscriptionSettings,
};
