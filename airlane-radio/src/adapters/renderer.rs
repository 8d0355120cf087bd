//! Configuration rendering collaborators
//!
//! Adapters do not template their own configuration. The text comes from a
//! [`ConfigRenderer`] supplied by the management layer.

use super::AdapterType;
use crate::error::Result;
use airlane_common::models::Station;
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::PathBuf;

#[async_trait]
pub trait ConfigRenderer: Send + Sync {
    /// Configuration text for `adapter` on `station`, `None` when there is none
    async fn render(&self, station: &Station, adapter: AdapterType) -> Result<Option<String>>;
}

/// Serves configuration staged on disk by the management layer
///
/// Looks for `<radio_base_dir>/staged/<adapter>.conf`; a missing file means
/// nothing to render.
#[derive(Debug, Clone, Default)]
pub struct StagedConfigRenderer;

impl StagedConfigRenderer {
    pub fn staged_path(station: &Station, adapter: AdapterType) -> PathBuf {
        station
            .radio_base_dir
            .join("staged")
            .join(format!("{}.conf", adapter.name().to_lowercase()))
    }
}

#[async_trait]
impl ConfigRenderer for StagedConfigRenderer {
    async fn render(&self, station: &Station, adapter: AdapterType) -> Result<Option<String>> {
        match tokio::fs::read_to_string(Self::staged_path(station, adapter)).await {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
