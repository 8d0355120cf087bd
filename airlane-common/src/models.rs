//! Station, media and queue models
//!
//! These records are owned by an external management layer. The control
//! plane only reads them, except for the single "sent to AutoDJ" mutation on
//! [`QueueEntry`].

use crate::values::AnnotationValue;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Raw cue/fade annotation keys as stored on media
pub mod cue_keys {
    pub const AMPLIFY: &str = "amplify";
    pub const CUE_IN: &str = "cue_in";
    pub const CUE_OUT: &str = "cue_out";
    pub const FADE_IN: &str = "fade_in";
    pub const FADE_OUT: &str = "fade_out";
    pub const CROSS_START_NEXT: &str = "cross_start_next";
}

/// Broadcast engine selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BackendType {
    #[default]
    Liquidsoap,
    None,
}

impl BackendType {
    pub fn is_enabled(&self) -> bool {
        !matches!(self, BackendType::None)
    }
}

/// Listener-facing streaming server selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FrontendType {
    #[default]
    Icecast,
    Remote,
}

impl FrontendType {
    pub fn is_enabled(&self) -> bool {
        !matches!(self, FrontendType::Remote)
    }
}

/// Crossfade behaviour between consecutive tracks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CrossfadeMode {
    /// Fixed-length overlap
    #[default]
    Normal,
    /// Overlap adjusted by the engine based on track loudness
    Smart,
    Disabled,
}

/// Per-station broadcast engine settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackendConfig {
    #[serde(default)]
    pub crossfade_type: CrossfadeMode,

    /// Crossfade length in seconds
    #[serde(default = "default_crossfade")]
    pub crossfade: f64,

    /// Hand raw cue values to the engine as `liq_*` keys instead of computing
    /// structured defaults
    #[serde(default)]
    pub legacy_cue_mode: bool,
}

fn default_crossfade() -> f64 {
    2.0
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            crossfade_type: CrossfadeMode::default(),
            crossfade: default_crossfade(),
            legacy_cue_mode: false,
        }
    }
}

impl BackendConfig {
    pub fn is_crossfade_enabled(&self) -> bool {
        self.crossfade_type != CrossfadeMode::Disabled && self.crossfade > 0.0
    }

    /// Length of the overlap window with the next track (0.0 when disabled)
    pub fn crossfade_duration(&self) -> f64 {
        if self.is_crossfade_enabled() {
            self.crossfade
        } else {
            0.0
        }
    }
}

/// One managed broadcast configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Station {
    pub id: i64,
    pub name: String,
    pub short_name: String,

    #[serde(default = "default_true")]
    pub is_enabled: bool,

    #[serde(default)]
    pub backend_type: BackendType,

    #[serde(default)]
    pub frontend_type: FrontendType,

    /// Root of the per-station working tree
    pub radio_base_dir: PathBuf,

    #[serde(default)]
    pub backend_config: BackendConfig,
}

fn default_true() -> bool {
    true
}

impl Station {
    /// Directory holding generated configuration and log files
    pub fn radio_config_dir(&self) -> PathBuf {
        self.radio_base_dir.join("config")
    }
}

/// Stored cue/fade overrides for a media item (seconds)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MediaCueMetadata {
    pub amplify: Option<f64>,
    pub cue_in: Option<f64>,
    pub cue_out: Option<f64>,
    pub fade_in: Option<f64>,
    pub fade_out: Option<f64>,
    pub cross_start_next: Option<f64>,

    /// Additional engine hints stored alongside the cue values
    #[serde(default)]
    pub extra: BTreeMap<String, f64>,
}

impl MediaCueMetadata {
    /// Raw annotation mapping of the values that are actually set
    ///
    /// `duration` caps `cue_out`, which may not point past the end of the file.
    pub fn to_annotations(&self, duration: f64) -> BTreeMap<String, AnnotationValue> {
        let mut annotations: BTreeMap<String, AnnotationValue> = self
            .extra
            .iter()
            .map(|(k, v)| (k.clone(), AnnotationValue::Float(*v)))
            .collect();

        let known = [
            (cue_keys::AMPLIFY, self.amplify),
            (cue_keys::CUE_IN, self.cue_in),
            (cue_keys::CUE_OUT, self.cue_out.map(|v| v.min(duration))),
            (cue_keys::FADE_IN, self.fade_in),
            (cue_keys::FADE_OUT, self.fade_out),
            (cue_keys::CROSS_START_NEXT, self.cross_start_next),
        ];
        for (key, value) in known {
            if let Some(v) = value {
                annotations.insert(key.to_string(), AnnotationValue::Float(v));
            }
        }

        annotations
    }
}

/// A media item (track) in the station library
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationMedia {
    pub id: i64,
    pub song_id: String,
    /// Path relative to the station media storage
    pub path: String,
    pub title: Option<String>,
    pub artist: Option<String>,
    /// Length in seconds
    pub length: f64,
    #[serde(default)]
    pub extra_metadata: MediaCueMetadata,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationPlaylist {
    pub id: i64,
    pub name: String,
    /// Short interstitial content (station IDs, jingles)
    #[serde(default)]
    pub is_jingle: bool,
}

/// A listener song request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationRequest {
    pub id: i64,
    pub track_id: Option<i64>,
}

/// One scheduled playback instance awaiting hand-off to the engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueueEntry {
    pub id: i64,
    pub station_id: i64,
    pub media: Option<StationMedia>,
    pub playlist: Option<StationPlaylist>,
    pub request: Option<StationRequest>,
    /// Playback URI used when the entry has no media item
    pub autodj_custom_uri: Option<String>,
    pub sent_to_autodj: bool,
    pub timestamp_cued: Option<DateTime<Utc>>,
}

impl QueueEntry {
    pub fn new(id: i64, station_id: i64) -> Self {
        Self {
            id,
            station_id,
            media: None,
            playlist: None,
            request: None,
            autodj_custom_uri: None,
            sent_to_autodj: false,
            timestamp_cued: None,
        }
    }

    /// Record a hand-off to the engine. Repeating it only moves the timestamp.
    pub fn mark_sent_to_autodj(&mut self, at: DateTime<Utc>) {
        self.sent_to_autodj = true;
        self.timestamp_cued = Some(at);
    }
}
