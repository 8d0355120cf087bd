//! Station queue schema used by the SQLite tests

use sqlx::{Pool, Sqlite};

/// Create the tables the queue repository reads
pub async fn create_queue_schema(pool: &Pool<Sqlite>) {
    for ddl in [
        r#"
        CREATE TABLE station_media (
            id INTEGER PRIMARY KEY,
            song_id TEXT,
            path TEXT,
            title TEXT,
            artist TEXT,
            length REAL,
            amplify REAL,
            cue_in REAL,
            cue_out REAL,
            fade_in REAL,
            fade_out REAL,
            cross_start_next REAL
        )
        "#,
        r#"
        CREATE TABLE station_playlists (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            is_jingle INTEGER NOT NULL DEFAULT 0
        )
        "#,
        r#"
        CREATE TABLE station_requests (
            id INTEGER PRIMARY KEY,
            track_id INTEGER
        )
        "#,
        r#"
        CREATE TABLE station_queue (
            id INTEGER PRIMARY KEY,
            station_id INTEGER NOT NULL,
            media_id INTEGER,
            playlist_id INTEGER,
            request_id INTEGER,
            autodj_custom_uri TEXT,
            sent_to_autodj INTEGER NOT NULL DEFAULT 0,
            timestamp_cued INTEGER
        )
        "#,
    ] {
        sqlx::query(ddl).execute(pool).await.unwrap();
    }
}
