use super::{PlaylistDuplicatesEntry, PlaylistThumbnail, DEFAULT_THUMBNAIL_ID};
use crate::error::{PlaylistError, Result};
use crate::library::StreamEntity;
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction};
use std::path::Path;
use tracing::debug;

pub struct PlaylistDatabase {
    conn: Connection,
}

impl PlaylistDatabase {
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let conn = Connection::open(db_path)?;
        Self::from_connection(conn)
    }

    pub fn in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        let db = Self { conn };
        db.initialize_tables()?;
        Ok(db)
    }

    fn initialize_tables(&self) -> Result<()> {
        self.conn.execute_batch("PRAGMA foreign_keys = ON;")?;

        // Streams table, url is the identity
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS streams (
                uid INTEGER PRIMARY KEY AUTOINCREMENT,
                url TEXT NOT NULL UNIQUE,
                title TEXT NOT NULL,
                uploader TEXT,
                duration INTEGER, -- seconds
                thumbnail_url TEXT
            )",
            [],
        )?;

        // Playlists table
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS playlists (
                uid INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT,
                is_thumbnail_permanent INTEGER NOT NULL DEFAULT 0,
                thumbnail_stream_id INTEGER DEFAULT -1, -- -1 = default placeholder
                display_index INTEGER NOT NULL DEFAULT -1,
                created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
            )",
            [],
        )?;

        // Ordered playlist contents
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS playlist_stream_join (
                playlist_id INTEGER NOT NULL REFERENCES playlists(uid) ON DELETE CASCADE,
                stream_id INTEGER NOT NULL REFERENCES streams(uid) ON DELETE CASCADE,
                join_index INTEGER NOT NULL,
                PRIMARY KEY (playlist_id, join_index)
            )",
            [],
        )?;

        self.conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_join_stream_id ON playlist_stream_join(stream_id)",
            [],
        )?;

        Ok(())
    }

    /// Insert the stream or refresh its metadata, returns its uid
    pub fn upsert_stream(&self, stream: &StreamEntity) -> Result<i64> {
        Self::upsert_stream_in(&self.conn, stream)
    }

    fn upsert_stream_in(conn: &Connection, stream: &StreamEntity) -> Result<i64> {
        let uid = conn.query_row(
            "INSERT INTO streams (url, title, uploader, duration, thumbnail_url)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(url) DO UPDATE SET
                title = excluded.title,
                uploader = excluded.uploader,
                duration = COALESCE(excluded.duration, streams.duration),
                thumbnail_url = COALESCE(excluded.thumbnail_url, streams.thumbnail_url)
             RETURNING uid",
            params![
                stream.url,
                stream.title,
                stream.uploader,
                stream.duration_secs.map(|d| d as i64),
                stream.thumbnail_url,
            ],
            |row| row.get(0),
        )?;
        Ok(uid)
    }

    pub fn create_playlist(&mut self, name: &str, streams: &[StreamEntity]) -> Result<i64> {
        let tx = self.conn.transaction()?;

        let stream_ids = streams
            .iter()
            .map(|s| Self::upsert_stream_in(&tx, s))
            .collect::<Result<Vec<_>>>()?;
        let thumbnail = stream_ids.first().copied().unwrap_or(DEFAULT_THUMBNAIL_ID);

        tx.execute(
            "INSERT INTO playlists (name, is_thumbnail_permanent, thumbnail_stream_id)
             VALUES (?1, 0, ?2)",
            params![name, thumbnail],
        )?;
        let playlist_id = tx.last_insert_rowid();

        Self::insert_joins(&tx, playlist_id, &stream_ids)?;
        tx.commit()?;

        debug!("Created playlist '{}' ({}) with {} streams", name, playlist_id, stream_ids.len());
        Ok(playlist_id)
    }

    pub fn append_to_playlist(&mut self, playlist_id: i64, streams: &[StreamEntity]) -> Result<Vec<i64>> {
        let tx = self.conn.transaction()?;

        if !Self::playlist_exists(&tx, playlist_id)? {
            return Err(PlaylistError::PlaylistNotFound(playlist_id));
        }

        let stream_ids = streams
            .iter()
            .map(|s| Self::upsert_stream_in(&tx, s))
            .collect::<Result<Vec<_>>>()?;

        Self::insert_joins(&tx, playlist_id, &stream_ids)?;
        tx.commit()?;

        debug!("Appended {} streams to playlist {}", stream_ids.len(), playlist_id);
        Ok(stream_ids)
    }

    pub fn change_playlist_thumbnail(&self, playlist_id: i64, stream_id: i64, is_permanent: bool) -> Result<()> {
        let updated = self.conn.execute(
            "UPDATE playlists SET thumbnail_stream_id = ?2, is_thumbnail_permanent = ?3
             WHERE uid = ?1",
            params![playlist_id, stream_id, is_permanent],
        )?;

        if updated == 0 {
            return Err(PlaylistError::PlaylistNotFound(playlist_id));
        }
        Ok(())
    }

    /// Every playlist with the number of times the stream at `stream_url` occurs in it
    pub fn playlist_duplicates(&self, stream_url: &str) -> Result<Vec<PlaylistDuplicatesEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT p.uid, p.name, p.thumbnail_stream_id, p.is_thumbnail_permanent, s.thumbnail_url,
                    (SELECT COUNT(*) FROM playlist_stream_join j WHERE j.playlist_id = p.uid),
                    (SELECT COUNT(*) FROM playlist_stream_join j
                        JOIN streams st ON st.uid = j.stream_id
                        WHERE j.playlist_id = p.uid AND st.url = ?1)
             FROM playlists p
             LEFT JOIN streams s ON s.uid = p.thumbnail_stream_id
             ORDER BY p.display_index, p.name COLLATE NOCASE, p.uid",
        )?;

        let entries = stmt
            .query_map(params![stream_url], Self::row_to_duplicates_entry)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(entries)
    }

    pub fn playlist_count(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM playlists", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Streams of a playlist in join order
    #[cfg(test)]
    pub(crate) fn playlist_streams(&self, playlist_id: i64) -> Result<Vec<StreamEntity>> {
        let mut stmt = self.conn.prepare(
            "SELECT s.url, s.title, s.uploader, s.duration, s.thumbnail_url
             FROM playlist_stream_join j
             JOIN streams s ON s.uid = j.stream_id
             WHERE j.playlist_id = ?1
             ORDER BY j.join_index",
        )?;

        let streams = stmt
            .query_map(params![playlist_id], |row| {
                Ok(StreamEntity {
                    url: row.get(0)?,
                    title: row.get(1)?,
                    uploader: row.get(2)?,
                    duration_secs: row.get::<_, Option<i64>>(3)?.map(|d| d as u64),
                    thumbnail_url: row.get(4)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(streams)
    }

    /// Raw thumbnail column, `None` when it is NULL
    #[cfg(test)]
    pub(crate) fn playlist_thumbnail(&self, playlist_id: i64) -> Result<Option<PlaylistThumbnail>> {
        let thumbnail = self
            .conn
            .query_row(
                "SELECT thumbnail_stream_id FROM playlists WHERE uid = ?1",
                params![playlist_id],
                |row| row.get::<_, Option<i64>>(0),
            )
            .optional()?
            .ok_or(PlaylistError::PlaylistNotFound(playlist_id))?;

        Ok(thumbnail.map(PlaylistThumbnail::from_stream_id))
    }

    fn playlist_exists(tx: &Transaction, playlist_id: i64) -> Result<bool> {
        let found = tx
            .query_row(
                "SELECT 1 FROM playlists WHERE uid = ?1",
                params![playlist_id],
                |_| Ok(()),
            )
            .optional()?;
        Ok(found.is_some())
    }

    fn insert_joins(tx: &Transaction, playlist_id: i64, stream_ids: &[i64]) -> Result<()> {
        let next_index: i64 = tx.query_row(
            "SELECT COALESCE(MAX(join_index) + 1, 0) FROM playlist_stream_join WHERE playlist_id = ?1",
            params![playlist_id],
            |row| row.get(0),
        )?;

        let mut stmt = tx.prepare(
            "INSERT INTO playlist_stream_join (playlist_id, stream_id, join_index) VALUES (?1, ?2, ?3)",
        )?;
        for (offset, stream_id) in stream_ids.iter().enumerate() {
            stmt.execute(params![playlist_id, stream_id, next_index + offset as i64])?;
        }

        Ok(())
    }

    fn row_to_duplicates_entry(row: &Row) -> rusqlite::Result<PlaylistDuplicatesEntry> {
        let thumbnail_id: Option<i64> = row.get(2)?;

        Ok(PlaylistDuplicatesEntry {
            uid: row.get(0)?,
            name: row.get(1)?,
            thumbnail: thumbnail_id.map(PlaylistThumbnail::from_stream_id),
            thumbnail_url: row.get(4)?,
            is_thumbnail_permanent: row.get(3)?,
            stream_count: row.get(5)?,
            times_stream_is_contained: row.get(6)?,
        })
    }

    #[cfg(test)]
    pub(crate) fn connection(&self) -> &Connection {
        &self.conn
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stream(n: u32) -> StreamEntity {
        StreamEntity::new(format!("file:///music/{}.mp3", n), format!("Track {}", n))
    }

    #[test]
    fn test_create_playlist_uses_first_stream_as_thumbnail() {
        let mut db = PlaylistDatabase::in_memory().unwrap();
        let id = db.create_playlist("Road Trip", &[stream(1), stream(2)]).unwrap();

        let first_uid = db.upsert_stream(&stream(1)).unwrap();
        assert_eq!(db.playlist_thumbnail(id).unwrap(), Some(PlaylistThumbnail::Stream(first_uid)));
        assert_eq!(db.playlist_streams(id).unwrap(), vec![stream(1), stream(2)]);
    }

    #[test]
    fn test_empty_playlist_gets_default_thumbnail() {
        let mut db = PlaylistDatabase::in_memory().unwrap();
        let id = db.create_playlist("Empty", &[]).unwrap();
        assert_eq!(db.playlist_thumbnail(id).unwrap(), Some(PlaylistThumbnail::Default));
    }

    #[test]
    fn test_append_continues_join_index() {
        let mut db = PlaylistDatabase::in_memory().unwrap();
        let id = db.create_playlist("Mix", &[stream(1)]).unwrap();

        let ids = db.append_to_playlist(id, &[stream(2), stream(1)]).unwrap();
        assert_eq!(ids.len(), 2);
        assert_eq!(ids[1], db.upsert_stream(&stream(1)).unwrap());

        let urls: Vec<String> = db.playlist_streams(id).unwrap().into_iter().map(|s| s.url).collect();
        assert_eq!(
            urls,
            vec![stream(1).url, stream(2).url, stream(1).url],
        );
    }

    #[test]
    fn test_append_to_missing_playlist_fails() {
        let mut db = PlaylistDatabase::in_memory().unwrap();
        let err = db.append_to_playlist(42, &[stream(1)]).unwrap_err();
        assert!(matches!(err, PlaylistError::PlaylistNotFound(42)));

        // Nothing was written
        let streams: i64 = db
            .connection()
            .query_row("SELECT COUNT(*) FROM streams", [], |row| row.get(0))
            .unwrap();
        assert_eq!(streams, 0);
    }

    #[test]
    fn test_duplicates_counts_per_playlist() {
        let mut db = PlaylistDatabase::in_memory().unwrap();
        let gym = db.create_playlist("gym", &[stream(1), stream(2), stream(1)]).unwrap();
        let chill = db.create_playlist("Chill", &[stream(3)]).unwrap();

        let entries = db.playlist_duplicates(&stream(1).url).unwrap();
        assert_eq!(entries.len(), 2);

        // Case-insensitive name order
        assert_eq!(entries[0].uid, chill);
        assert_eq!(entries[0].times_stream_is_contained, 0);
        assert_eq!(entries[0].stream_count, 1);

        assert_eq!(entries[1].uid, gym);
        assert_eq!(entries[1].times_stream_is_contained, 2);
        assert_eq!(entries[1].stream_count, 3);
        assert!(entries[1].thumbnail_url.is_none());
    }

    #[test]
    fn test_change_thumbnail() {
        let mut db = PlaylistDatabase::in_memory().unwrap();
        let id = db.create_playlist("Empty", &[]).unwrap();
        let ids = db.append_to_playlist(id, &[stream(5)]).unwrap();

        db.change_playlist_thumbnail(id, ids[0], false).unwrap();
        let entry = &db.playlist_duplicates(&stream(5).url).unwrap()[0];
        assert_eq!(entry.thumbnail, Some(PlaylistThumbnail::Stream(ids[0])));
        assert!(!entry.is_thumbnail_permanent);

        assert!(matches!(
            db.change_playlist_thumbnail(99, ids[0], true),
            Err(PlaylistError::PlaylistNotFound(99))
        ));
    }

    #[test]
    fn test_null_name_and_null_thumbnail_survive() {
        let db = PlaylistDatabase::in_memory().unwrap();
        db.connection()
            .execute(
                "INSERT INTO playlists (name, thumbnail_stream_id) VALUES (NULL, NULL)",
                [],
            )
            .unwrap();

        let entries = db.playlist_duplicates("file:///nothing.mp3").unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].name, None);
        assert_eq!(entries[0].thumbnail, None);
        assert_eq!(db.playlist_count().unwrap(), 1);
    }
}
