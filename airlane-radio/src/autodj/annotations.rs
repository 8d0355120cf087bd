//! Next-song annotation pipeline
//!
//! Builds the request the engine plays next. Stages run once each, in fixed
//! priority order, over one [`AnnotateNextSong`] event:
//!
//! | Priority | Stage          | Adds                                         |
//! |----------|----------------|----------------------------------------------|
//! | 20       | SongPath       | `media:` path or the entry's custom URI      |
//! | 15       | EngineMetadata | title, artist, ids, cue/fade annotations     |
//! | 10       | Playlist       | `playlist_id`, `jingle_mode`                 |
//! | 5        | Request        | `request_id`                                 |
//! | -10      | PostAnnotation | marks the queue entry sent (AutoDJ only)     |
//!
//! A stage with nothing to contribute leaves the event untouched.

use super::autocue::process_autocue_annotations;
use super::event::AnnotateNextSong;
use crate::db::QueueRepository;
use crate::error::Result;
use airlane_common::models::Station;
use airlane_common::{time, AnnotationValue};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Prefix of paths resolved from station media storage
pub const MEDIA_PATH_PREFIX: &str = "media:";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnnotationStage {
    SongPath,
    EngineMetadata,
    Playlist,
    Request,
    PostAnnotation,
}

impl AnnotationStage {
    /// Every stage, highest priority first
    pub const ORDERED: [AnnotationStage; 5] = [
        AnnotationStage::SongPath,
        AnnotationStage::EngineMetadata,
        AnnotationStage::Playlist,
        AnnotationStage::Request,
        AnnotationStage::PostAnnotation,
    ];

    pub fn priority(&self) -> i32 {
        match self {
            AnnotationStage::SongPath => 20,
            AnnotationStage::EngineMetadata => 15,
            AnnotationStage::Playlist => 10,
            AnnotationStage::Request => 5,
            AnnotationStage::PostAnnotation => -10,
        }
    }
}

pub struct Annotations {
    queue_repo: Arc<dyn QueueRepository>,
}

impl Annotations {
    pub fn new(queue_repo: Arc<dyn QueueRepository>) -> Self {
        Self { queue_repo }
    }

    /// Pull the next queue entry for the station and render its annotations
    ///
    /// `Ok(None)` when nothing is waiting or the entry has nothing playable.
    pub async fn annotate_next_song(
        &self,
        station: &Station,
        as_autodj: bool,
    ) -> Result<Option<String>> {
        let Some(queue_row) = self.queue_repo.next_to_send_to_autodj(station).await? else {
            debug!(station_id = station.id, "No queue entry waiting for AutoDJ");
            return Ok(None);
        };

        let queue_id = queue_row.id;
        let mut event = AnnotateNextSong::from_queue(station, queue_row, as_autodj);
        self.dispatch(&mut event).await?;

        let rendered = event.build_annotations();
        match &rendered {
            Some(annotations) => info!(
                station_id = station.id,
                queue_id,
                "Annotated next song: {}",
                annotations
            ),
            None => warn!(
                station_id = station.id,
                queue_id,
                "Queue entry has no playable path"
            ),
        }

        Ok(rendered)
    }

    /// Run every stage over the event, in priority order
    pub async fn dispatch(&self, event: &mut AnnotateNextSong<'_>) -> Result<()> {
        for stage in AnnotationStage::ORDERED {
            self.run_stage(stage, event).await?;
        }
        Ok(())
    }

    pub async fn run_stage(
        &self,
        stage: AnnotationStage,
        event: &mut AnnotateNextSong<'_>,
    ) -> Result<()> {
        match stage {
            AnnotationStage::SongPath => annotate_song_path(event),
            AnnotationStage::EngineMetadata => annotate_for_engine(event),
            AnnotationStage::Playlist => annotate_playlist(event),
            AnnotationStage::Request => annotate_request(event),
            AnnotationStage::PostAnnotation => self.post_annotation(event).await?,
        }
        Ok(())
    }

    /// Record the hand-off of an AutoDJ entry
    ///
    /// Running it again for the same entry only moves the cue timestamp.
    pub async fn post_annotation(&self, event: &mut AnnotateNextSong<'_>) -> Result<()> {
        if !event.is_as_autodj() {
            return Ok(());
        }

        if let Some(queue_row) = event.queue_mut() {
            let now = time::now();
            queue_row.mark_sent_to_autodj(now);
            self.queue_repo.mark_sent_to_autodj(queue_row, now).await?;
        }
        Ok(())
    }
}

pub fn annotate_song_path(event: &mut AnnotateNextSong<'_>) {
    if let Some(media) = event.media() {
        let path = format!("{}{}", MEDIA_PATH_PREFIX, media.path.trim_start_matches('/'));
        event.set_song_path(path);
        return;
    }

    let custom_uri = event
        .queue()
        .and_then(|q| q.autodj_custom_uri.clone())
        .filter(|uri| !uri.is_empty());
    if let Some(uri) = custom_uri {
        event.set_song_path(uri);
    }
}

pub fn annotate_for_engine(event: &mut AnnotateNextSong<'_>) {
    let station = event.station();
    if !station.backend_type.is_enabled() {
        return;
    }

    let Some(media) = event.media() else {
        return;
    };

    let duration = media.length;
    let mut annotations: BTreeMap<String, AnnotationValue> = BTreeMap::new();

    if let Some(title) = &media.title {
        annotations.insert("title".into(), title.clone().into());
    }
    if let Some(artist) = &media.artist {
        annotations.insert("artist".into(), artist.clone().into());
    }
    annotations.insert("duration".into(), duration.into());
    annotations.insert("song_id".into(), media.song_id.clone().into());
    annotations.insert("media_id".into(), media.id.into());

    annotations.extend(process_autocue_annotations(
        &station.backend_config,
        media.extra_metadata.to_annotations(duration),
        duration,
    ));

    event.add_annotations(annotations);
}

pub fn annotate_playlist(event: &mut AnnotateNextSong<'_>) {
    let Some(playlist) = event.playlist() else {
        return;
    };
    let (id, is_jingle) = (playlist.id, playlist.is_jingle);

    event.add_annotation("playlist_id", id);
    if is_jingle {
        event.add_annotation("jingle_mode", true);
    }
}

pub fn annotate_request(event: &mut AnnotateNextSong<'_>) {
    if let Some(request_id) = event.request().map(|r| r.id) {
        event.add_annotation("request_id", request_id);
    }
}
