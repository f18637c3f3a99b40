//! Skald - Podcast Transcription Archive and Search
//!
//! A CLI tool for turning podcast audio into a searchable, speaker-attributed
//! transcript archive.
//!
//! The name "Skald" comes from the Old Norse word for a court poet — one who
//! turns speech into retrievable verse.
//!
//! # Overview
//!
//! Skald allows you to:
//! - Transcribe whole podcast corpora (directories of audio, or URL manifests)
//! - Build a co-indexed vector + document store from every utterance
//! - Resume interrupted ingestion runs without redoing completed episodes
//! - Search your archive semantically, with series/episode/timestamp provenance
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - `config` - Configuration management
//! - `corpus` - Corpus layout: series sources, manifests, audio sources
//! - `transcription` - Speech-to-text provider abstraction (AssemblyAI)
//! - `transcript` - Speaker resolution and utterance normalization
//! - `embedding` - Embedding generation and order-preserving batching
//! - `index` - Flat vector similarity index with binary persistence
//! - `store` - Co-indexed document/vector store pair with checkpointing
//! - `orchestrator` - Ingestion pipeline coordination
//! - `search` - Query pipeline over a loaded store snapshot
//!
//! # Example
//!
//! ```rust,no_run
//! use skald::config::Settings;
//! use skald::orchestrator::Orchestrator;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let mut orchestrator = Orchestrator::new(settings)?;
//!
//!     // Ingest every series under a podcast root
//!     let report = orchestrator.ingest_podcast("shows/history_pod".as_ref()).await?;
//!     println!("Indexed {} episodes", report.episodes_indexed);
//!
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod config;
pub mod corpus;
pub mod embedding;
pub mod error;
pub mod index;
pub mod orchestrator;
pub mod search;
pub mod store;
pub mod transcript;
pub mod transcription;

pub use error::{Result, SkaldError};
