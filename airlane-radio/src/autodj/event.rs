//! The "annotate next song" event
//!
//! One event is built per request for the next track. Every annotation stage
//! receives it by `&mut` in turn; a stage never runs concurrently with another
//! on the same event. Rendering consumes the event.

use airlane_common::models::{QueueEntry, Station, StationMedia, StationPlaylist, StationRequest};
use airlane_common::{value_to_string, AnnotationValue};
use std::collections::BTreeMap;

pub struct AnnotateNextSong<'a> {
    station: &'a Station,
    queue: Option<QueueEntry>,
    media: Option<StationMedia>,
    playlist: Option<StationPlaylist>,
    request: Option<StationRequest>,
    as_autodj: bool,
    song_path: Option<String>,
    annotations: BTreeMap<String, AnnotationValue>,
}

impl<'a> AnnotateNextSong<'a> {
    /// Event for a queue entry handed to the engine
    pub fn from_queue(station: &'a Station, queue: QueueEntry, as_autodj: bool) -> Self {
        Self {
            station,
            media: queue.media.clone(),
            playlist: queue.playlist.clone(),
            request: queue.request.clone(),
            queue: Some(queue),
            as_autodj,
            song_path: None,
            annotations: BTreeMap::new(),
        }
    }

    /// Event for a media item played outside the queue
    pub fn from_media(station: &'a Station, media: StationMedia) -> Self {
        Self {
            station,
            queue: None,
            media: Some(media),
            playlist: None,
            request: None,
            as_autodj: false,
            song_path: None,
            annotations: BTreeMap::new(),
        }
    }

    pub fn station(&self) -> &'a Station {
        self.station
    }

    pub fn queue(&self) -> Option<&QueueEntry> {
        self.queue.as_ref()
    }

    pub fn queue_mut(&mut self) -> Option<&mut QueueEntry> {
        self.queue.as_mut()
    }

    pub fn media(&self) -> Option<&StationMedia> {
        self.media.as_ref()
    }

    pub fn playlist(&self) -> Option<&StationPlaylist> {
        self.playlist.as_ref()
    }

    pub fn request(&self) -> Option<&StationRequest> {
        self.request.as_ref()
    }

    /// Whether the request comes from the automated continuity loop
    pub fn is_as_autodj(&self) -> bool {
        self.as_autodj
    }

    pub fn song_path(&self) -> Option<&str> {
        self.song_path.as_deref()
    }

    pub fn set_song_path(&mut self, path: impl Into<String>) {
        self.song_path = Some(path.into());
    }

    pub fn annotations(&self) -> &BTreeMap<String, AnnotationValue> {
        &self.annotations
    }

    /// Merge annotations, replacing existing keys. Empty strings are dropped.
    pub fn add_annotations<K, V, I>(&mut self, annotations: I)
    where
        K: Into<String>,
        V: Into<AnnotationValue>,
        I: IntoIterator<Item = (K, V)>,
    {
        for (key, value) in annotations {
            let value = value.into();
            if !value.is_empty() {
                self.annotations.insert(key.into(), value);
            }
        }
    }

    pub fn add_annotation(&mut self, key: impl Into<String>, value: impl Into<AnnotationValue>) {
        self.add_annotations([(key.into(), value.into())]);
    }

    /// Render the engine request: `annotate:k="v",...:<path>`
    ///
    /// Returns the bare path when there are no annotations and `None` when no
    /// path was resolved.
    pub fn build_annotations(self) -> Option<String> {
        let path = self.song_path?;

        if self.annotations.is_empty() {
            return Some(path);
        }

        let pairs: Vec<String> = self
            .annotations
            .iter()
            .map(|(key, value)| format!("{}=\"{}\"", key, escape_value(&value_to_string(value))))
            .collect();

        Some(format!("annotate:{}:{}", pairs.join(","), path))
    }
}

fn escape_value(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn station() -> Station {
        Station {
            id: 1,
            name: "Event".into(),
            short_name: "event".into(),
            is_enabled: true,
            backend_type: Default::default(),
            frontend_type: Default::default(),
            radio_base_dir: PathBuf::from("/tmp/event"),
            backend_config: Default::default(),
        }
    }

    #[test]
    fn test_no_path_renders_nothing() {
        let station = station();
        let mut event = AnnotateNextSong::from_queue(&station, QueueEntry::new(1, 1), true);
        event.add_annotation("title", "Orphan");
        assert!(event.build_annotations().is_none());
    }

    #[test]
    fn test_bare_path_without_annotations() {
        let station = station();
        let mut event = AnnotateNextSong::from_queue(&station, QueueEntry::new(1, 1), true);
        event.set_song_path("http://example.com/live.mp3");
        assert_eq!(
            event.build_annotations().as_deref(),
            Some("http://example.com/live.mp3")
        );
    }

    #[test]
    fn test_render_sorted_and_escaped() {
        let station = station();
        let mut event = AnnotateNextSong::from_queue(&station, QueueEntry::new(1, 1), true);
        event.set_song_path("media:a/b.mp3");
        event.add_annotation("title", "Say \"Hi\"");
        event.add_annotation("duration", 30.0);
        event.add_annotation("jingle_mode", true);

        assert_eq!(
            event.build_annotations().as_deref(),
            Some(r#"annotate:duration="30.0",jingle_mode="true",title="Say \"Hi\"":media:a/b.mp3"#)
        );
    }

    #[test]
    fn test_later_annotations_overwrite_and_empty_dropped() {
        let station = station();
        let mut event = AnnotateNextSong::from_queue(&station, QueueEntry::new(1, 1), false);
        event.add_annotation("artist", "First");
        event.add_annotation("artist", "Second");
        event.add_annotation("title", "");

        assert_eq!(event.annotations().len(), 1);
        assert_eq!(event.annotations()["artist"], AnnotationValue::from("Second"));
    }
}
