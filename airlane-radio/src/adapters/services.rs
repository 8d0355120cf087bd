//! Per-station program orchestration
//!
//! Brings a station's frontend and backend in line with the desired state:
//! current configuration on disk, programs running, reloaded on change.

use super::{AdapterSpec, AdapterType, ConfigRenderer, Icecast, LocalAdapter, Liquidsoap};
use crate::error::{Error, Result};
use crate::supervisor::Supervisor;
use airlane_common::config::RadioConfig;
use airlane_common::models::Station;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

/// What reconciling one adapter did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdapterAction {
    Unchanged,
    Started,
    Reloaded,
}

/// Running state of one adapter, for status reporting
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdapterStatus {
    pub adapter_type: AdapterType,
    pub program_name: String,
    pub running: bool,
    pub log_path: PathBuf,
}

pub struct StationServices {
    frontend: LocalAdapter<Icecast>,
    backend: LocalAdapter<Liquidsoap>,
}

impl StationServices {
    pub fn new(
        config: &RadioConfig,
        supervisor: Arc<dyn Supervisor>,
        renderer: Arc<dyn ConfigRenderer>,
    ) -> Self {
        Self {
            frontend: LocalAdapter::new(
                Icecast::new(config.binaries.icecast.clone(), renderer.clone()),
                supervisor.clone(),
                config.environment,
            ),
            backend: LocalAdapter::new(
                Liquidsoap::new(config.binaries.liquidsoap.clone(), renderer),
                supervisor,
                config.environment,
            ),
        }
    }

    pub fn frontend(&self) -> &LocalAdapter<Icecast> {
        &self.frontend
    }

    pub fn backend(&self) -> &LocalAdapter<Liquidsoap> {
        &self.backend
    }

    /// Write configuration and make sure both programs run
    ///
    /// The frontend goes first since the backend connects to it.
    pub async fn ensure_running(&self, station: &Station) -> Result<Vec<(AdapterType, AdapterAction)>> {
        let frontend = ensure_adapter(&self.frontend, station).await?;
        let backend = ensure_adapter(&self.backend, station).await?;

        Ok(vec![
            (AdapterType::Icecast, frontend),
            (AdapterType::Liquidsoap, backend),
        ])
    }

    /// Stop the backend, then the frontend
    pub async fn stop_all(&self, station: &Station) -> Result<()> {
        stop_ignoring_not_running(&self.backend, station).await?;
        stop_ignoring_not_running(&self.frontend, station).await
    }

    pub async fn status(&self, station: &Station) -> Result<Vec<AdapterStatus>> {
        Ok(vec![
            adapter_status(&self.frontend, station).await?,
            adapter_status(&self.backend, station).await?,
        ])
    }
}

async fn ensure_adapter<S: AdapterSpec>(
    adapter: &LocalAdapter<S>,
    station: &Station,
) -> Result<AdapterAction> {
    let changed = adapter.write_configuration(station).await?;

    if !adapter.is_running(station).await? {
        return match adapter.start(station).await {
            Ok(()) => Ok(AdapterAction::Started),
            Err(Error::Supervisor(e)) if e.is_already_running() => {
                warn!(
                    station_id = station.id,
                    program = %e.program_name,
                    "Program came up while starting it"
                );
                Ok(AdapterAction::Unchanged)
            }
            Err(e) => Err(e),
        };
    }

    if changed && adapter.has_command(station) {
        info!(
            station_id = station.id,
            station_name = %station.name,
            "Reloading {} after configuration change",
            adapter.adapter_type()
        );
        adapter.reload(station).await?;
        return Ok(AdapterAction::Reloaded);
    }

    Ok(AdapterAction::Unchanged)
}

async fn stop_ignoring_not_running<S: AdapterSpec>(
    adapter: &LocalAdapter<S>,
    station: &Station,
) -> Result<()> {
    match adapter.stop(station).await {
        Err(Error::Supervisor(e)) if e.is_not_running() => Ok(()),
        other => other,
    }
}

async fn adapter_status<S: AdapterSpec>(
    adapter: &LocalAdapter<S>,
    station: &Station,
) -> Result<AdapterStatus> {
    Ok(AdapterStatus {
        adapter_type: adapter.adapter_type(),
        program_name: adapter.full_name(station),
        running: adapter.is_running(station).await?,
        log_path: adapter.log_path(station),
    })
}
