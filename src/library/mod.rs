// Library - the media items a user can send to a playlist
// Streams are identified by url, everything else is display data

pub mod scanner;

pub use scanner::MusicScanner;

use serde::{Deserialize, Serialize};
use std::path::Path;

/// A media item as the playlist store sees it. The url is the identity used for
/// duplicate detection, so two entities with the same url are the same stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamEntity {
    pub url: String,
    pub title: String,
    pub uploader: Option<String>,
    pub duration_secs: Option<u64>,
    pub thumbnail_url: Option<String>,
}

impl StreamEntity {
    pub fn new(url: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: title.into(),
            uploader: None,
            duration_secs: None,
            thumbnail_url: None,
        }
    }

    /// Build a stream for a local audio file, `file://` url and file stem as title
    pub fn from_path(path: &Path) -> Self {
        let title = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("Unknown")
            .to_string();
        let uploader = path
            .parent()
            .and_then(|p| p.file_name())
            .and_then(|n| n.to_str())
            .map(str::to_string);

        Self {
            url: format!("file://{}", path.display()),
            title,
            uploader,
            duration_secs: None,
            thumbnail_url: None,
        }
    }

    pub fn with_uploader(mut self, uploader: impl Into<String>) -> Self {
        self.uploader = Some(uploader.into());
        self
    }

    pub fn display_title(&self) -> String {
        match &self.uploader {
            Some(uploader) => format!("{} - {}", uploader, self.title),
            None => self.title.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AudioFormat {
    Mp3,
    Flac,
    Ogg,
    Mp4,
    Wav,
    Unknown,
}

impl AudioFormat {
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_lowercase().as_str() {
            "mp3" => AudioFormat::Mp3,
            "flac" => AudioFormat::Flac,
            "ogg" | "oga" => AudioFormat::Ogg,
            "mp4" | "m4a" | "aac" => AudioFormat::Mp4,
            "wav" => AudioFormat::Wav,
            _ => AudioFormat::Unknown,
        }
    }

    pub fn is_supported(&self) -> bool {
        !matches!(self, AudioFormat::Unknown)
    }
}
