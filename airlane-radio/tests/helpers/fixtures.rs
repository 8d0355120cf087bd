//! Station and media fixtures

use airlane_common::models::{BackendConfig, CrossfadeMode, Station, StationMedia};
use airlane_radio::adapters::{AdapterType, StagedConfigRenderer};
use std::path::Path;

pub fn station(id: i64, base_dir: &Path) -> Station {
    Station {
        id,
        name: format!("Test Radio {}", id),
        short_name: format!("test_radio_{}", id),
        is_enabled: true,
        backend_type: Default::default(),
        frontend_type: Default::default(),
        radio_base_dir: base_dir.to_path_buf(),
        backend_config: BackendConfig {
            crossfade_type: CrossfadeMode::Disabled,
            crossfade: 0.0,
            legacy_cue_mode: false,
        },
    }
}

pub fn station_with_crossfade(id: i64, base_dir: &Path, crossfade: f64) -> Station {
    let mut station = station(id, base_dir);
    station.backend_config = BackendConfig {
        crossfade_type: CrossfadeMode::Normal,
        crossfade,
        legacy_cue_mode: false,
    };
    station
}

pub fn media(id: i64, path: &str, length: f64) -> StationMedia {
    StationMedia {
        id,
        song_id: format!("song{}", id),
        path: path.to_string(),
        title: Some(format!("Title {}", id)),
        artist: Some(format!("Artist {}", id)),
        length,
        extra_metadata: Default::default(),
    }
}

/// Stage configuration text where [`StagedConfigRenderer`] picks it up
pub fn write_staged(station: &Station, adapter: AdapterType, content: &str) {
    let path = StagedConfigRenderer::staged_path(station, adapter);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, content).unwrap();
}
