//! Liquidsoap broadcast engine (station backend)

use super::{AdapterSpec, AdapterType, ConfigRenderer};
use crate::error::Result;
use airlane_common::models::Station;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;

const CONFIG_FILE: &str = "liquidsoap.liq";

pub struct Liquidsoap {
    binary: Option<PathBuf>,
    renderer: Arc<dyn ConfigRenderer>,
}

impl Liquidsoap {
    pub fn new(binary: Option<PathBuf>, renderer: Arc<dyn ConfigRenderer>) -> Self {
        Self { binary, renderer }
    }
}

#[async_trait]
impl AdapterSpec for Liquidsoap {
    fn adapter_type(&self) -> AdapterType {
        AdapterType::Liquidsoap
    }

    fn binary(&self) -> Option<&Path> {
        self.binary.as_deref()
    }

    fn config_path(&self, station: &Station) -> Option<PathBuf> {
        if !station.backend_type.is_enabled() {
            return None;
        }
        Some(station.radio_config_dir().join(CONFIG_FILE))
    }

    async fn current_configuration(&self, station: &Station) -> Result<Option<String>> {
        if !station.backend_type.is_enabled() {
            return Ok(None);
        }
        self.renderer.render(station, self.adapter_type()).await
    }

    fn command(&self, station: &Station) -> Option<String> {
        let binary = self.binary.as_ref()?;
        let config_path = self.config_path(station)?;
        Some(format!("{} {}", binary.display(), config_path.display()))
    }
}
