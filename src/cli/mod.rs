//! CLI module for Skald.

pub mod commands;
mod output;

pub use output::Output;

use clap::{Parser, Subcommand};

/// Skald - Podcast Transcription Archive and Search
///
/// A CLI tool for turning podcast audio into a searchable, speaker-attributed
/// transcript archive. The name "Skald" comes from the Old Norse word for a
/// court poet.
#[derive(Parser, Debug)]
#[command(name = "skald")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Transcribe and index a podcast corpus
    Ingest {
        /// Corpus root: a directory of series directories and .txt manifests
        path: String,
    },

    /// Search the transcript archive
    Search {
        /// Search query
        query: String,

        /// Number of results
        #[arg(short, default_value = "5")]
        k: usize,
    },

    /// List indexed series and episodes
    List,

    /// Start the HTTP search API server
    Serve {
        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port to bind to
        #[arg(short, long, default_value = "5001")]
        port: u16,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,
}
