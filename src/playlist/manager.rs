use super::{PlaylistDatabase, PlaylistDuplicatesEntry, PlaylistStore};
use crate::error::{PlaylistError, Result};
use crate::library::StreamEntity;
use futures::future::BoxFuture;
use futures::stream::{self, BoxStream};
use futures::{FutureExt, StreamExt};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tokio::sync::watch;
use tracing::{debug, info};

/// Async playlist store backed by SQLite.
///
/// Queries run on the blocking pool. Every successful write bumps a revision
/// counter, and live queries re-run when they see a new revision.
pub struct LocalPlaylistManager {
    db: Arc<Mutex<PlaylistDatabase>>,
    revision: Arc<watch::Sender<u64>>,
}

impl LocalPlaylistManager {
    pub fn new(database: PlaylistDatabase) -> Self {
        let (revision, _) = watch::channel(0);
        Self {
            db: Arc::new(Mutex::new(database)),
            revision: Arc::new(revision),
        }
    }

    pub fn open<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let path = db_path.as_ref();
        let database = PlaylistDatabase::new(path)?;
        info!("Opened playlist database at {}", path.display());
        Ok(Self::new(database))
    }

    fn write<T, F>(&self, op: F) -> BoxFuture<'static, Result<T>>
    where
        T: Send + 'static,
        F: FnOnce(&mut PlaylistDatabase) -> Result<T> + Send + 'static,
    {
        let db = Arc::clone(&self.db);
        let revision = Arc::clone(&self.revision);
        async move {
            let value = run_blocking(db, op).await?;
            revision.send_modify(|rev| *rev += 1);
            Ok(value)
        }
        .boxed()
    }
}

async fn run_blocking<T, F>(db: Arc<Mutex<PlaylistDatabase>>, op: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce(&mut PlaylistDatabase) -> Result<T> + Send + 'static,
{
    tokio::task::spawn_blocking(move || {
        let mut guard = db.lock().map_err(|_| PlaylistError::LockPoisoned)?;
        op(&mut *guard)
    })
    .await?
}

impl PlaylistStore for LocalPlaylistManager {
    fn playlist_duplicates(
        &self,
        stream_url: &str,
    ) -> BoxStream<'static, Result<Vec<PlaylistDuplicatesEntry>>> {
        let db = Arc::clone(&self.db);
        let url = stream_url.to_string();
        let mut updates = self.revision.subscribe();
        updates.mark_changed();

        stream::unfold((db, url, updates), |(db, url, mut updates)| async move {
            // Ends once the manager (and its sender) is gone
            updates.changed().await.ok()?;

            let query_url = url.clone();
            let result = run_blocking(Arc::clone(&db), move |d| d.playlist_duplicates(&query_url)).await;
            if let Ok(entries) = &result {
                debug!("Playlist duplicates for {}: {} playlists", url, entries.len());
            }
            Some((result, (db, url, updates)))
        })
        .boxed()
    }

    fn append_to_playlist(
        &self,
        playlist_id: i64,
        streams: Vec<StreamEntity>,
    ) -> BoxFuture<'static, Result<Vec<i64>>> {
        self.write(move |db| db.append_to_playlist(playlist_id, &streams))
    }

    fn change_playlist_thumbnail(
        &self,
        playlist_id: i64,
        stream_id: i64,
        is_permanent: bool,
    ) -> BoxFuture<'static, Result<()>> {
        self.write(move |db| db.change_playlist_thumbnail(playlist_id, stream_id, is_permanent))
    }

    fn create_playlist(
        &self,
        name: &str,
        streams: Vec<StreamEntity>,
    ) -> BoxFuture<'static, Result<i64>> {
        let name = name.to_string();
        self.write(move |db| db.create_playlist(&name, &streams))
    }

    fn playlist_count(&self) -> BoxFuture<'static, Result<usize>> {
        run_blocking(Arc::clone(&self.db), |db| db.playlist_count()).boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::playlist::PlaylistThumbnail;

    fn manager() -> LocalPlaylistManager {
        LocalPlaylistManager::new(PlaylistDatabase::in_memory().unwrap())
    }

    fn song(name: &str) -> StreamEntity {
        StreamEntity::new(format!("file:///music/{}.flac", name), name)
    }

    #[tokio::test]
    async fn test_live_query_re_emits_after_writes() {
        let store = manager();
        let id = store.create_playlist("Focus", vec![song("a")]).await.unwrap();

        let mut updates = store.playlist_duplicates(&song("b").url);
        let first = updates.next().await.unwrap().unwrap();
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].times_stream_is_contained, 0);

        store.append_to_playlist(id, vec![song("b")]).await.unwrap();
        let second = updates.next().await.unwrap().unwrap();
        assert_eq!(second[0].times_stream_is_contained, 1);
        assert_eq!(second[0].stream_count, 2);
    }

    #[tokio::test]
    async fn test_live_query_ends_with_manager() {
        let store = manager();
        let mut updates = store.playlist_duplicates("file:///x.mp3");
        assert!(updates.next().await.unwrap().unwrap().is_empty());

        drop(store);
        assert!(updates.next().await.is_none());
    }

    #[tokio::test]
    async fn test_thumbnail_and_count() {
        let store = manager();
        assert_eq!(store.playlist_count().await.unwrap(), 0);

        let id = store.create_playlist("Empty", Vec::new()).await.unwrap();
        let ids = store.append_to_playlist(id, vec![song("c")]).await.unwrap();
        store.change_playlist_thumbnail(id, ids[0], false).await.unwrap();

        let entries = store.playlist_duplicates(&song("c").url).next().await.unwrap().unwrap();
        assert_eq!(entries[0].thumbnail, Some(PlaylistThumbnail::Stream(ids[0])));
        assert_eq!(store.playlist_count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_failed_write_reports_not_found() {
        let store = manager();
        let err = store.append_to_playlist(3, vec![song("d")]).await.unwrap_err();
        assert!(matches!(err, PlaylistError::PlaylistNotFound(3)));
    }
}
