//! Icecast streaming server (station frontend)
//!
//! Icecast re-reads its configuration on SIGHUP, so reloads do not drop
//! connected listeners.

use super::{AdapterSpec, AdapterType, ConfigRenderer};
use crate::error::Result;
use airlane_common::models::Station;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;

const CONFIG_FILE: &str = "icecast.xml";

pub struct Icecast {
    binary: Option<PathBuf>,
    renderer: Arc<dyn ConfigRenderer>,
}

impl Icecast {
    pub fn new(binary: Option<PathBuf>, renderer: Arc<dyn ConfigRenderer>) -> Self {
        Self { binary, renderer }
    }
}

#[async_trait]
impl AdapterSpec for Icecast {
    fn adapter_type(&self) -> AdapterType {
        AdapterType::Icecast
    }

    fn binary(&self) -> Option<&Path> {
        self.binary.as_deref()
    }

    fn config_path(&self, station: &Station) -> Option<PathBuf> {
        if !station.frontend_type.is_enabled() {
            return None;
        }
        Some(station.radio_config_dir().join(CONFIG_FILE))
    }

    async fn current_configuration(&self, station: &Station) -> Result<Option<String>> {
        if !station.frontend_type.is_enabled() {
            return Ok(None);
        }
        self.renderer.render(station, self.adapter_type()).await
    }

    fn command(&self, station: &Station) -> Option<String> {
        let binary = self.binary.as_ref()?;
        let config_path = self.config_path(station)?;
        Some(format!("{} -c {}", binary.display(), config_path.display()))
    }

    fn reload_signal(&self) -> Option<&'static str> {
        Some("HUP")
    }
}
