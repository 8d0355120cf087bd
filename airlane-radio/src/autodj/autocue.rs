//! Cue, fade and crossfade defaults
//!
//! Turns the cue values stored on a media item into the complete set of
//! timing annotations the engine expects, filling gaps from the station's
//! crossfade policy.

use airlane_common::models::{cue_keys, BackendConfig};
use airlane_common::AnnotationValue;
use std::collections::BTreeMap;

/// Prefix applied to every raw key in legacy cue mode
pub const LEGACY_PREFIX: &str = "liq_";

/// Engine-side annotation names
pub mod engine_keys {
    pub const AUTOCUE: &str = "azuracast_autocue";
    pub const AMPLIFY: &str = "azuracast_amplify";
    pub const CUE_IN: &str = "azuracast_cue_in";
    pub const CUE_OUT: &str = "azuracast_cue_out";
    pub const FADE_IN: &str = "azuracast_fade_in";
    pub const FADE_OUT: &str = "azuracast_fade_out";
    pub const START_NEXT: &str = "azuracast_start_next";
}

const KEY_MAPPING: [(&str, &str); 6] = [
    (cue_keys::AMPLIFY, engine_keys::AMPLIFY),
    (cue_keys::CUE_IN, engine_keys::CUE_IN),
    (cue_keys::CUE_OUT, engine_keys::CUE_OUT),
    (cue_keys::FADE_IN, engine_keys::FADE_IN),
    (cue_keys::FADE_OUT, engine_keys::FADE_OUT),
    (cue_keys::CROSS_START_NEXT, engine_keys::START_NEXT),
];

/// Resolve the final cue/fade annotations for one track
///
/// `raw` holds only values stored on the media item; `duration` is the track
/// length in seconds.
pub fn process_autocue_annotations(
    config: &BackendConfig,
    raw: BTreeMap<String, AnnotationValue>,
    duration: f64,
) -> BTreeMap<String, AnnotationValue> {
    if config.legacy_cue_mode {
        return legacy_annotations(raw);
    }

    structured_annotations(config, raw, duration)
}

/// Raw values handed through as `liq_*` keys, without defaults
fn legacy_annotations(raw: BTreeMap<String, AnnotationValue>) -> BTreeMap<String, AnnotationValue> {
    raw.into_iter()
        .map(|(key, value)| (format!("{}{}", LEGACY_PREFIX, key), value))
        .collect()
}

fn structured_annotations(
    config: &BackendConfig,
    mut annotations: BTreeMap<String, AnnotationValue>,
    duration: f64,
) -> BTreeMap<String, AnnotationValue> {
    // Order matters: cue points, then fades, then the start-next offset.
    annotations
        .entry(cue_keys::CUE_IN.to_string())
        .or_insert(AnnotationValue::Float(0.0));
    annotations
        .entry(cue_keys::CUE_OUT.to_string())
        .or_insert(AnnotationValue::Float(duration));

    let default_fade = if config.is_crossfade_enabled() {
        config.crossfade
    } else {
        0.0
    };
    annotations
        .entry(cue_keys::FADE_IN.to_string())
        .or_insert(AnnotationValue::Float(default_fade));
    annotations
        .entry(cue_keys::FADE_OUT.to_string())
        .or_insert(AnnotationValue::Float(default_fade));

    annotations
        .entry(cue_keys::CROSS_START_NEXT.to_string())
        .or_insert_with(|| AnnotationValue::Float(default_start_next(config, duration)));

    let mut resolved = BTreeMap::new();
    resolved.insert(engine_keys::AUTOCUE.to_string(), AnnotationValue::Bool(true));

    for (logical, external) in KEY_MAPPING {
        if let Some(value) = annotations.remove(logical) {
            resolved.insert(external.to_string(), value);
        }
    }

    resolved
}

/// Where the next track starts: `duration - crossfade`, never negative
fn default_start_next(config: &BackendConfig, duration: f64) -> f64 {
    let start_next = if config.is_crossfade_enabled() {
        duration - config.crossfade_duration()
    } else {
        duration
    };

    if start_next < 0.0 {
        duration
    } else {
        start_next
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use airlane_common::models::CrossfadeMode;

    fn crossfade(seconds: f64) -> BackendConfig {
        BackendConfig {
            crossfade_type: CrossfadeMode::Normal,
            crossfade: seconds,
            legacy_cue_mode: false,
        }
    }

    fn no_crossfade() -> BackendConfig {
        BackendConfig {
            crossfade_type: CrossfadeMode::Disabled,
            crossfade: 3.0,
            legacy_cue_mode: false,
        }
    }

    fn float(map: &BTreeMap<String, AnnotationValue>, key: &str) -> f64 {
        map.get(key).and_then(AnnotationValue::as_f64).unwrap()
    }

    #[test]
    fn test_structured_defaults_with_crossfade() {
        let out = process_autocue_annotations(&crossfade(3.0), BTreeMap::new(), 30.0);

        assert_eq!(out.len(), 6);
        assert_eq!(out[engine_keys::AUTOCUE], AnnotationValue::Bool(true));
        assert_eq!(float(&out, engine_keys::CUE_IN), 0.0);
        assert_eq!(float(&out, engine_keys::CUE_OUT), 30.0);
        assert_eq!(float(&out, engine_keys::FADE_IN), 3.0);
        assert_eq!(float(&out, engine_keys::FADE_OUT), 3.0);
        assert_eq!(float(&out, engine_keys::START_NEXT), 27.0);
        assert!(!out.contains_key(engine_keys::AMPLIFY));
    }

    #[test]
    fn test_structured_defaults_without_crossfade() {
        for duration in [0.0, 0.5, 30.0, 3600.25] {
            let out = process_autocue_annotations(&no_crossfade(), BTreeMap::new(), duration);
            assert_eq!(float(&out, engine_keys::CUE_IN), 0.0);
            assert_eq!(float(&out, engine_keys::CUE_OUT), duration);
            assert_eq!(float(&out, engine_keys::FADE_IN), 0.0);
            assert_eq!(float(&out, engine_keys::FADE_OUT), 0.0);
            assert_eq!(float(&out, engine_keys::START_NEXT), duration);
        }
    }

    #[test]
    fn test_start_next_never_negative() {
        // Crossfade longer than the track
        let out = process_autocue_annotations(&crossfade(5.0), BTreeMap::new(), 4.0);
        assert_eq!(float(&out, engine_keys::START_NEXT), 4.0);

        // Only a negative offset falls back; equal length starts the next track at once
        let out = process_autocue_annotations(&crossfade(5.0), BTreeMap::new(), 5.0);
        assert_eq!(float(&out, engine_keys::START_NEXT), 0.0);

        let out = process_autocue_annotations(&crossfade(2.0), BTreeMap::new(), 10.0);
        assert_eq!(float(&out, engine_keys::START_NEXT), 8.0);
    }

    #[test]
    fn test_stored_values_win_over_defaults() {
        let mut raw = BTreeMap::new();
        raw.insert("cue_in".to_string(), AnnotationValue::Float(1.25));
        raw.insert("fade_out".to_string(), AnnotationValue::Float(6.0));
        raw.insert("cross_start_next".to_string(), AnnotationValue::Float(20.0));
        raw.insert("amplify".to_string(), AnnotationValue::Float(-2.5));

        let out = process_autocue_annotations(&crossfade(3.0), raw, 30.0);
        assert_eq!(float(&out, engine_keys::CUE_IN), 1.25);
        assert_eq!(float(&out, engine_keys::FADE_IN), 3.0);
        assert_eq!(float(&out, engine_keys::FADE_OUT), 6.0);
        assert_eq!(float(&out, engine_keys::START_NEXT), 20.0);
        assert_eq!(float(&out, engine_keys::AMPLIFY), -2.5);
    }

    #[test]
    fn test_structured_drops_unmapped_keys() {
        let mut raw = BTreeMap::new();
        raw.insert("duration".to_string(), AnnotationValue::Float(30.0));

        let out = process_autocue_annotations(&crossfade(3.0), raw, 30.0);
        assert!(!out.contains_key("duration"));
        assert!(!out.contains_key("liq_duration"));
        assert_eq!(out.len(), 6);
    }

    #[test]
    fn test_legacy_mode_is_a_pure_prefix() {
        let config = BackendConfig {
            legacy_cue_mode: true,
            ..crossfade(3.0)
        };
        let mut raw = BTreeMap::new();
        raw.insert("duration".to_string(), AnnotationValue::Float(30.0));

        let out = process_autocue_annotations(&config, raw, 30.0);
        assert_eq!(out.len(), 1);
        assert_eq!(out["liq_duration"], AnnotationValue::Float(30.0));
    }

    #[test]
    fn test_legacy_mode_keeps_count_and_values() {
        let config = BackendConfig {
            legacy_cue_mode: true,
            ..no_crossfade()
        };
        let mut raw = BTreeMap::new();
        raw.insert("cue_in".to_string(), AnnotationValue::Float(0.5));
        raw.insert("fade_in".to_string(), AnnotationValue::Float(1.0));
        raw.insert("amplify".to_string(), AnnotationValue::Str("-3 dB".into()));

        let out = process_autocue_annotations(&config, raw.clone(), 30.0);
        assert_eq!(out.len(), raw.len());
        for (key, value) in raw {
            assert_eq!(out[&format!("liq_{}", key)], value);
        }
    }

    #[test]
    fn test_legacy_mode_empty_input() {
        let config = BackendConfig {
            legacy_cue_mode: true,
            ..crossfade(3.0)
        };
        assert!(process_autocue_annotations(&config, BTreeMap::new(), 30.0).is_empty());
    }
}
