// Playlists - storage, the async store seam the dialogs talk to,
// and the summary rows the append dialog lists

pub mod database; // SQLite storage for playlists and their streams
pub mod manager;  // async PlaylistStore over the database

#[cfg(test)]
pub(crate) mod testing;

pub use database::PlaylistDatabase;
pub use manager::LocalPlaylistManager;

use crate::error::Result;
use crate::library::StreamEntity;
use futures::future::BoxFuture;
use futures::stream::BoxStream;
use serde::{Deserialize, Serialize};

/// Stored thumbnail id meaning "no image chosen yet"
pub const DEFAULT_THUMBNAIL_ID: i64 = -1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlaylistThumbnail {
    /// Placeholder, replaced by the first stream appended to the playlist
    Default,
    Stream(i64),
}

impl PlaylistThumbnail {
    pub fn from_stream_id(stream_id: i64) -> Self {
        if stream_id == DEFAULT_THUMBNAIL_ID {
            PlaylistThumbnail::Default
        } else {
            PlaylistThumbnail::Stream(stream_id)
        }
    }

    pub fn stream_id(&self) -> i64 {
        match self {
            PlaylistThumbnail::Default => DEFAULT_THUMBNAIL_ID,
            PlaylistThumbnail::Stream(id) => *id,
        }
    }
}

/// A local playlist annotated with how many times a given stream is already in it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaylistDuplicatesEntry {
    pub uid: i64,
    pub name: Option<String>,
    pub thumbnail: Option<PlaylistThumbnail>,
    pub thumbnail_url: Option<String>,
    pub is_thumbnail_permanent: bool,
    pub stream_count: u32,
    pub times_stream_is_contained: u32,
}

impl PlaylistDuplicatesEntry {
    pub fn new(uid: i64, name: impl Into<String>) -> Self {
        Self {
            uid,
            name: Some(name.into()),
            thumbnail: Some(PlaylistThumbnail::Default),
            thumbnail_url: None,
            is_thumbnail_permanent: false,
            stream_count: 0,
            times_stream_is_contained: 0,
        }
    }

    /// Name used for sorting and filtering
    pub fn ordering_name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn contains_duplicates(&self) -> bool {
        self.times_stream_is_contained > 0
    }

    pub fn has_default_thumbnail(&self) -> bool {
        self.thumbnail == Some(PlaylistThumbnail::Default)
    }

    pub fn with_duplicates(mut self, times: u32) -> Self {
        self.times_stream_is_contained = times;
        self
    }

    pub fn with_thumbnail(mut self, thumbnail: Option<PlaylistThumbnail>) -> Self {
        self.thumbnail = thumbnail;
        self
    }
}

pub fn any_playlist_contains_duplicates(playlists: &[PlaylistDuplicatesEntry]) -> bool {
    playlists.iter().any(PlaylistDuplicatesEntry::contains_duplicates)
}

/// Playlist persistence as the dialogs see it.
///
/// Futures and streams are boxed and `'static` so callers can move them into
/// spawned tasks. `playlist_duplicates` behaves like a live query: it yields the
/// current rows right away and again after every write to the store.
pub trait PlaylistStore: Send + Sync {
    fn playlist_duplicates(
        &self,
        stream_url: &str,
    ) -> BoxStream<'static, Result<Vec<PlaylistDuplicatesEntry>>>;

    /// Appends `streams` at the end of the playlist, returns the stored stream ids
    /// in the same order
    fn append_to_playlist(
        &self,
        playlist_id: i64,
        streams: Vec<StreamEntity>,
    ) -> BoxFuture<'static, Result<Vec<i64>>>;

    fn change_playlist_thumbnail(
        &self,
        playlist_id: i64,
        stream_id: i64,
        is_permanent: bool,
    ) -> BoxFuture<'static, Result<()>>;

    fn create_playlist(
        &self,
        name: &str,
        streams: Vec<StreamEntity>,
    ) -> BoxFuture<'static, Result<i64>>;

    fn playlist_count(&self) -> BoxFuture<'static, Result<usize>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thumbnail_ids() {
        assert_eq!(PlaylistThumbnail::from_stream_id(-1), PlaylistThumbnail::Default);
        assert_eq!(PlaylistThumbnail::from_stream_id(7), PlaylistThumbnail::Stream(7));
        assert_eq!(PlaylistThumbnail::Default.stream_id(), DEFAULT_THUMBNAIL_ID);
    }

    #[test]
    fn test_duplicate_detection() {
        let clean = PlaylistDuplicatesEntry::new(1, "Chill");
        let dup = PlaylistDuplicatesEntry::new(2, "Gym").with_duplicates(2);

        assert!(!any_playlist_contains_duplicates(&[]));
        assert!(!any_playlist_contains_duplicates(&[clean.clone()]));
        assert!(any_playlist_contains_duplicates(&[clean, dup]));
    }

    #[test]
    fn test_missing_thumbnail_is_not_default() {
        let entry = PlaylistDuplicatesEntry::new(1, "Chill").with_thumbnail(None);
        assert!(!entry.has_default_thumbnail());
    }
}
