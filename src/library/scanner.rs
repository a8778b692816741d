use super::{AudioFormat, StreamEntity};
use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

#[derive(Clone, Default)]
pub struct MusicScanner;

impl MusicScanner {
    pub fn new() -> Self {
        Self
    }

    pub fn scan_directory<P: AsRef<Path>>(&self, path: P) -> Result<Vec<StreamEntity>> {
        let mut streams = Vec::new();

        for entry in WalkDir::new(path).follow_links(true).into_iter().filter_map(|e| e.ok()) {
            let path = entry.path();

            if !entry.file_type().is_file() {
                continue;
            }

            // Skip hidden files (dotfiles)
            if path
                .file_name()
                .and_then(|n| n.to_str())
                .map_or(false, |n| n.starts_with('.'))
            {
                continue;
            }

            // Skip empty files
            if let Ok(metadata) = fs::metadata(path) {
                if metadata.len() == 0 {
                    continue;
                }
            }

            if self.is_supported_file(path) {
                streams.push(StreamEntity::from_path(path));
            }
        }

        streams.sort_by(|a, b| a.url.cmp(&b.url));
        Ok(streams)
    }

    pub fn scan_directories(&self, paths: &[PathBuf]) -> Result<Vec<StreamEntity>> {
        let mut all_streams = Vec::new();

        for path in paths {
            if path.exists() {
                let mut streams = self.scan_directory(path)?;
                debug!("Scanned {}: {} tracks", path.display(), streams.len());
                all_streams.append(&mut streams);
            } else {
                warn!("Music directory does not exist: {}", path.display());
            }
        }

        Ok(all_streams)
    }

    fn is_supported_file(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| AudioFormat::from_extension(ext).is_supported())
            .unwrap_or(false)
    }
}
