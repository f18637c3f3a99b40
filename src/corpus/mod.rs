//! Corpus layout for Skald.
//!
//! A podcast corpus is a root directory whose immediate children are series
//! sources: either a flat directory of audio files, or a `.txt` manifest of
//! `episode_title,source_url` lines. Classification happens once per locator;
//! everything downstream matches on the resulting variant.

use crate::error::{Result, SkaldError};
use std::path::{Path, PathBuf};

/// Audio file extension accepted in series directories.
pub const AUDIO_EXTENSION: &str = "mp3";

/// A classified series locator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeriesSource {
    /// Flat directory of audio files, one episode per file.
    AudioDirectory(PathBuf),
    /// Plain-text manifest, one `title,url` episode per line.
    UrlManifest(PathBuf),
}

impl SeriesSource {
    /// The series title derived from the locator path.
    pub fn series_title(&self) -> String {
        match self {
            SeriesSource::AudioDirectory(path) | SeriesSource::UrlManifest(path) => {
                title_from_path(path)
            }
        }
    }
}

/// What a transcription provider consumes: a local file or a remote URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AudioSource {
    Local(PathBuf),
    Remote(String),
}

impl std::fmt::Display for AudioSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AudioSource::Local(path) => write!(f, "{}", path.display()),
            AudioSource::Remote(url) => write!(f, "{}", url),
        }
    }
}

/// One parsed manifest line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestEntry {
    pub episode_title: String,
    pub url: String,
}

/// Classify a corpus entry as a series source.
///
/// Directories are audio series, `.txt` files are URL manifests; any other
/// shape is a structural error in the corpus description.
pub fn classify_source(path: &Path) -> Result<SeriesSource> {
    if path.is_dir() {
        return Ok(SeriesSource::AudioDirectory(path.to_path_buf()));
    }

    if path.is_file()
        && path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("txt"))
    {
        return Ok(SeriesSource::UrlManifest(path.to_path_buf()));
    }

    Err(SkaldError::UnsupportedSource(path.display().to_string()))
}

/// Whether a file name carries the supported audio extension.
pub fn is_supported_audio(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(AUDIO_EXTENSION))
}

/// Derive a human-readable title from a path.
///
/// Takes the file or directory name up to the first `.`, with `-` and `_`
/// turned into spaces: `the_fall-of_rome.mp3` -> `the fall of rome`.
pub fn title_from_path(path: &Path) -> String {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default();
    let stem = name.split('.').next().unwrap_or(name);
    stem.replace(['-', '_'], " ")
}

/// Parse one manifest line into an episode entry.
///
/// Lines must contain exactly two comma-separated fields: a title and a URL
/// that actually parses as one.
pub fn parse_manifest_line(manifest: &Path, line_no: usize, line: &str) -> Result<ManifestEntry> {
    let malformed = |reason: &str| SkaldError::MalformedManifest {
        manifest: manifest.display().to_string(),
        line: line_no,
        reason: reason.to_string(),
    };

    let fields: Vec<&str> = line.split(',').collect();
    if fields.len() != 2 {
        return Err(malformed(&format!(
            "expected 2 comma-separated fields, found {}",
            fields.len()
        )));
    }

    let episode_title = fields[0].trim().to_string();
    let url = fields[1].trim().to_string();

    if episode_title.is_empty() {
        return Err(malformed("empty episode title"));
    }
    url::Url::parse(&url).map_err(|e| malformed(&format!("invalid URL: {}", e)))?;

    Ok(ManifestEntry { episode_title, url })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_from_path() {
        assert_eq!(
            title_from_path(Path::new("shows/the_fall-of_rome.mp3")),
            "the fall of rome"
        );
        assert_eq!(title_from_path(Path::new("history_pod")), "history pod");
        // Only the part before the first dot survives
        assert_eq!(title_from_path(Path::new("ep.01.mp3")), "ep");
    }

    #[test]
    fn test_is_supported_audio() {
        assert!(is_supported_audio(Path::new("a.mp3")));
        assert!(is_supported_audio(Path::new("a.MP3")));
        assert!(!is_supported_audio(Path::new("a.wav")));
        assert!(!is_supported_audio(Path::new("a")));
    }

    #[test]
    fn test_classify_source() {
        let dir = tempfile::tempdir().unwrap();

        let series_dir = dir.path().join("interviews");
        std::fs::create_dir(&series_dir).unwrap();
        assert_eq!(
            classify_source(&series_dir).unwrap(),
            SeriesSource::AudioDirectory(series_dir)
        );

        let manifest = dir.path().join("remote_series.txt");
        std::fs::write(&manifest, "ep one,https://example.com/1.mp3\n").unwrap();
        assert_eq!(
            classify_source(&manifest).unwrap(),
            SeriesSource::UrlManifest(manifest)
        );

        let stray = dir.path().join("notes.md");
        std::fs::write(&stray, "notes").unwrap();
        assert!(matches!(
            classify_source(&stray),
            Err(SkaldError::UnsupportedSource(_))
        ));
    }

    #[test]
    fn test_parse_manifest_line() {
        let manifest = Path::new("series.txt");

        let entry =
            parse_manifest_line(manifest, 1, "Episode One,https://example.com/1.mp3").unwrap();
        assert_eq!(entry.episode_title, "Episode One");
        assert_eq!(entry.url, "https://example.com/1.mp3");

        // Three fields
        assert!(matches!(
            parse_manifest_line(manifest, 2, "a,b,c"),
            Err(SkaldError::MalformedManifest { line: 2, .. })
        ));

        // One field
        assert!(matches!(
            parse_manifest_line(manifest, 3, "just a title"),
            Err(SkaldError::MalformedManifest { line: 3, .. })
        ));

        // Second field must be a URL
        assert!(matches!(
            parse_manifest_line(manifest, 4, "title,not a url"),
            Err(SkaldError::MalformedManifest { line: 4, .. })
        ));
    }
}
