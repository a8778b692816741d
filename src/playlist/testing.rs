// Recording PlaylistStore for dialog tests

use super::{PlaylistDuplicatesEntry, PlaylistStore};
use crate::error::{PlaylistError, Result};
use crate::library::StreamEntity;
use futures::future::BoxFuture;
use futures::stream::BoxStream;
use futures::{FutureExt, StreamExt};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

#[derive(Default)]
pub struct Calls {
    pub queried_urls: Vec<String>,
    pub appends: Vec<(i64, usize)>,
    pub thumbnails: Vec<(i64, i64, bool)>,
    pub created: Vec<(String, usize)>,
}

/// Snapshots are pushed by the test through `push_snapshot`, so a query stays
/// pending until the test decides to answer it.
pub struct RecordingStore {
    pub calls: Arc<Mutex<Calls>>,
    snapshots: Mutex<Option<mpsc::UnboundedReceiver<Vec<PlaylistDuplicatesEntry>>>>,
    snapshot_tx: mpsc::UnboundedSender<Vec<PlaylistDuplicatesEntry>>,
    playlist_count: usize,
    fail_appends: bool,
}

impl RecordingStore {
    pub fn new() -> Self {
        let (snapshot_tx, snapshots) = mpsc::unbounded_channel();
        Self {
            calls: Arc::new(Mutex::new(Calls::default())),
            snapshots: Mutex::new(Some(snapshots)),
            snapshot_tx,
            playlist_count: 1,
            fail_appends: false,
        }
    }

    pub fn with_playlist_count(mut self, count: usize) -> Self {
        self.playlist_count = count;
        self
    }

    pub fn failing_appends(mut self) -> Self {
        self.fail_appends = true;
        self
    }

    pub fn push_snapshot(&self, playlists: Vec<PlaylistDuplicatesEntry>) {
        let _ = self.snapshot_tx.send(playlists);
    }

    pub fn thumbnail_calls(&self) -> Vec<(i64, i64, bool)> {
        self.calls.lock().unwrap().thumbnails.clone()
    }
}

impl PlaylistStore for RecordingStore {
    fn playlist_duplicates(
        &self,
        stream_url: &str,
    ) -> BoxStream<'static, Result<Vec<PlaylistDuplicatesEntry>>> {
        self.calls.lock().unwrap().queried_urls.push(stream_url.to_string());
        match self.snapshots.lock().unwrap().take() {
            Some(rx) => futures::stream::unfold(rx, |mut rx| async move {
                rx.recv().await.map(|snapshot| (Ok(snapshot), rx))
            })
            .boxed(),
            None => futures::stream::empty().boxed(),
        }
    }

    fn append_to_playlist(
        &self,
        playlist_id: i64,
        streams: Vec<StreamEntity>,
    ) -> BoxFuture<'static, Result<Vec<i64>>> {
        self.calls.lock().unwrap().appends.push((playlist_id, streams.len()));
        let fail = self.fail_appends;
        async move {
            if fail {
                return Err(PlaylistError::PlaylistNotFound(playlist_id));
            }
            // Stream ids are positional: 100, 101, ...
            Ok((0..streams.len() as i64).map(|i| 100 + i).collect())
        }
        .boxed()
    }

    fn change_playlist_thumbnail(
        &self,
        playlist_id: i64,
        stream_id: i64,
        is_permanent: bool,
    ) -> BoxFuture<'static, Result<()>> {
        self.calls
            .lock()
            .unwrap()
            .thumbnails
            .push((playlist_id, stream_id, is_permanent));
        async { Ok(()) }.boxed()
    }

    fn create_playlist(
        &self,
        name: &str,
        streams: Vec<StreamEntity>,
    ) -> BoxFuture<'static, Result<i64>> {
        self.calls
            .lock()
            .unwrap()
            .created
            .push((name.to_string(), streams.len()));
        async { Ok(1) }.boxed()
    }

    fn playlist_count(&self) -> BoxFuture<'static, Result<usize>> {
        let count = self.playlist_count;
        async move { Ok(count) }.boxed()
    }
}

pub fn streams(n: usize) -> Vec<StreamEntity> {
    (0..n)
        .map(|i| StreamEntity::new(format!("file:///music/{}.mp3", i), format!("Song {}", i)))
        .collect()
}
