//! Station queue access
//!
//! The queue is owned by the scheduling layer. The annotation pipeline reads
//! the next entry to hand to the engine and records the hand-off.
//!
//! Fetching the next entry and marking it sent must form one critical
//! section per station; the repository does not lock on its own.

use crate::error::{Error, Result};
use airlane_common::models::{
    MediaCueMetadata, QueueEntry, Station, StationMedia, StationPlaylist, StationRequest,
};
use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Pool, Row, Sqlite};
use tokio::sync::Mutex;

#[async_trait]
pub trait QueueRepository: Send + Sync {
    /// Oldest entry of the station not yet sent to the engine
    async fn next_to_send_to_autodj(&self, station: &Station) -> Result<Option<QueueEntry>>;

    /// Persist the "sent" flag and cue timestamp of `entry`
    async fn mark_sent_to_autodj(&self, entry: &QueueEntry, at: DateTime<Utc>) -> Result<()>;
}

/// Queue held in memory, for embedding and tests
#[derive(Default)]
pub struct MemoryQueueRepository {
    entries: Mutex<Vec<QueueEntry>>,
}

impl MemoryQueueRepository {
    pub fn new(entries: Vec<QueueEntry>) -> Self {
        Self {
            entries: Mutex::new(entries),
        }
    }

    pub async fn push(&self, entry: QueueEntry) {
        self.entries.lock().await.push(entry);
    }

    pub async fn get(&self, id: i64) -> Option<QueueEntry> {
        self.entries.lock().await.iter().find(|e| e.id == id).cloned()
    }
}

#[async_trait]
impl QueueRepository for MemoryQueueRepository {
    async fn next_to_send_to_autodj(&self, station: &Station) -> Result<Option<QueueEntry>> {
        Ok(self
            .entries
            .lock()
            .await
            .iter()
            .find(|e| e.station_id == station.id && !e.sent_to_autodj)
            .cloned())
    }

    async fn mark_sent_to_autodj(&self, entry: &QueueEntry, at: DateTime<Utc>) -> Result<()> {
        let mut entries = self.entries.lock().await;
        let stored = entries
            .iter_mut()
            .find(|e| e.id == entry.id)
            .ok_or_else(|| Error::Queue(format!("Queue entry {} not found", entry.id)))?;
        stored.mark_sent_to_autodj(at);
        Ok(())
    }
}

/// SQLite-backed queue
///
/// Reads `station_queue` joined with `station_media`, `station_playlists` and
/// `station_requests`; the schema itself is managed elsewhere.
pub struct SqliteQueueRepository {
    db: Pool<Sqlite>,
}

impl SqliteQueueRepository {
    pub fn new(db: Pool<Sqlite>) -> Self {
        Self { db }
    }
}

fn timestamp_from_db(secs: Option<i64>) -> Option<DateTime<Utc>> {
    secs.and_then(|s| Utc.timestamp_opt(s, 0).single())
}

fn queue_entry_from_row(row: &SqliteRow) -> Result<QueueEntry> {
    let media = match row.get::<Option<i64>, _>("media_id") {
        Some(id) => Some(StationMedia {
            id,
            song_id: row.get::<Option<String>, _>("song_id").unwrap_or_default(),
            path: row
                .get::<Option<String>, _>("path")
                .ok_or_else(|| Error::Queue(format!("Media {} has no path", id)))?,
            title: row.get("title"),
            artist: row.get("artist"),
            length: row.get::<Option<f64>, _>("length").unwrap_or(0.0),
            extra_metadata: MediaCueMetadata {
                amplify: row.get("amplify"),
                cue_in: row.get("cue_in"),
                cue_out: row.get("cue_out"),
                fade_in: row.get("fade_in"),
                fade_out: row.get("fade_out"),
                cross_start_next: row.get("cross_start_next"),
                extra: Default::default(),
            },
        }),
        None => None,
    };

    let playlist = row
        .get::<Option<i64>, _>("playlist_id")
        .map(|id| StationPlaylist {
            id,
            name: row.get::<Option<String>, _>("playlist_name").unwrap_or_default(),
            is_jingle: row.get::<Option<bool>, _>("is_jingle").unwrap_or(false),
        });

    let request = row
        .get::<Option<i64>, _>("request_id")
        .map(|id| StationRequest {
            id,
            track_id: row.get("request_track_id"),
        });

    Ok(QueueEntry {
        id: row.get("id"),
        station_id: row.get("station_id"),
        media,
        playlist,
        request,
        autodj_custom_uri: row.get("autodj_custom_uri"),
        sent_to_autodj: row.get("sent_to_autodj"),
        timestamp_cued: timestamp_from_db(row.get("timestamp_cued")),
    })
}

#[async_trait]
impl QueueRepository for SqliteQueueRepository {
    async fn next_to_send_to_autodj(&self, station: &Station) -> Result<Option<QueueEntry>> {
        let row = sqlx::query(
            r#"
            SELECT q.id, q.station_id, q.autodj_custom_uri, q.sent_to_autodj, q.timestamp_cued,
                   m.id AS media_id, m.song_id, m.path, m.title, m.artist, m.length,
                   m.amplify, m.cue_in, m.cue_out, m.fade_in, m.fade_out, m.cross_start_next,
                   p.id AS playlist_id, p.name AS playlist_name, p.is_jingle,
                   r.id AS request_id, r.track_id AS request_track_id
            FROM station_queue q
            LEFT JOIN station_media m ON q.media_id = m.id
            LEFT JOIN station_playlists p ON q.playlist_id = p.id
            LEFT JOIN station_requests r ON q.request_id = r.id
            WHERE q.station_id = ? AND q.sent_to_autodj = 0
            ORDER BY q.id ASC
            LIMIT 1
            "#,
        )
        .bind(station.id)
        .fetch_optional(&self.db)
        .await?;

        row.as_ref().map(queue_entry_from_row).transpose()
    }

    async fn mark_sent_to_autodj(&self, entry: &QueueEntry, at: DateTime<Utc>) -> Result<()> {
        let result = sqlx::query(
            "UPDATE station_queue SET sent_to_autodj = 1, timestamp_cued = ? WHERE id = ?",
        )
        .bind(at.timestamp())
        .bind(entry.id)
        .execute(&self.db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(Error::Queue(format!("Queue entry {} not found", entry.id)));
        }
        Ok(())
    }
}
