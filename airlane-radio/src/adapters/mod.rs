//! Supervised station programs
//!
//! A [`LocalAdapter`] drives one external program per station through the
//! process supervisor. What differs between programs (binary, config file,
//! command line, reload behaviour) lives in an [`AdapterSpec`].
//!
//! Process control for one station is not reentrant: callers must not run
//! start/stop/restart/reload for the same station concurrently.

pub mod config_file;
pub mod icecast;
pub mod liquidsoap;
pub mod renderer;
pub mod services;

use crate::error::{Result, SupervisorError};
use crate::supervisor::{Supervisor, SupervisorFault};
use airlane_common::config::AppEnvironment;
use airlane_common::models::Station;
use async_trait::async_trait;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

pub use icecast::Icecast;
pub use liquidsoap::Liquidsoap;
pub use renderer::{ConfigRenderer, StagedConfigRenderer};
pub use services::StationServices;

/// Kind of supervised program
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AdapterType {
    Liquidsoap,
    Icecast,
}

impl AdapterType {
    pub fn name(&self) -> &'static str {
        match self {
            AdapterType::Liquidsoap => "Liquidsoap",
            AdapterType::Icecast => "Icecast",
        }
    }

    /// Role suffix of the supervisor program name
    pub fn program_suffix(&self) -> &'static str {
        match self {
            AdapterType::Liquidsoap => "backend",
            AdapterType::Icecast => "frontend",
        }
    }
}

impl fmt::Display for AdapterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Identity of one supervised program: `group:program`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProcessIdentity {
    pub group: String,
    pub program: String,
}

impl ProcessIdentity {
    pub fn new(station: &Station, adapter_type: AdapterType) -> Self {
        Self {
            group: supervisor_group_name(station),
            program: format!("station_{}_{}", station.id, adapter_type.program_suffix()),
        }
    }
}

impl fmt::Display for ProcessIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.group, self.program)
    }
}

/// Supervisor group holding every program of a station
pub fn supervisor_group_name(station: &Station) -> String {
    format!("station_{}", station.id)
}

/// Program-specific half of an adapter
#[async_trait]
pub trait AdapterSpec: Send + Sync {
    fn adapter_type(&self) -> AdapterType;

    /// Installed executable, if one is configured
    fn binary(&self) -> Option<&Path>;

    /// Where this adapter's configuration lives, if it has one
    fn config_path(&self, station: &Station) -> Option<PathBuf>;

    /// Configuration text as it should exist with current settings
    async fn current_configuration(&self, station: &Station) -> Result<Option<String>>;

    /// Shell command the supervisor runs, `None` when nothing runs
    fn command(&self, station: &Station) -> Option<String>;

    /// Signal that makes the program re-read its configuration in place.
    /// Without one, reload falls back to a full restart.
    fn reload_signal(&self) -> Option<&'static str> {
        None
    }
}

/// Generic process control for one adapter type
pub struct LocalAdapter<S> {
    spec: S,
    supervisor: Arc<dyn Supervisor>,
    environment: AppEnvironment,
}

impl<S: AdapterSpec> LocalAdapter<S> {
    pub fn new(spec: S, supervisor: Arc<dyn Supervisor>, environment: AppEnvironment) -> Self {
        Self {
            spec,
            supervisor,
            environment,
        }
    }

    pub fn spec(&self) -> &S {
        &self.spec
    }

    pub fn adapter_type(&self) -> AdapterType {
        self.spec.adapter_type()
    }

    /// Write configuration from the station to disk
    ///
    /// Returns whether the newly written configuration differs from what was
    /// already on disk.
    pub async fn write_configuration(&self, station: &Station) -> Result<bool> {
        let Some(path) = self.spec.config_path(station) else {
            return Ok(false);
        };

        let rendered = self.spec.current_configuration(station).await?;
        let changed = config_file::reconcile(&path, rendered.as_deref()).await?;

        if changed {
            info!(
                station_id = station.id,
                station_name = %station.name,
                path = %path.display(),
                "{} configuration changed",
                self.adapter_type()
            );
        } else {
            debug!(station_id = station.id, "{} configuration unchanged", self.adapter_type());
        }

        Ok(changed)
    }

    /// Whether the binary this adapter runs is present
    pub fn is_installed(&self) -> bool {
        self.spec.binary().map(|b| b.exists()).unwrap_or(false)
    }

    /// Whether there is anything for the supervisor to run
    pub fn has_command(&self, station: &Station) -> bool {
        if self.environment.is_testing() || !station.is_enabled {
            return false;
        }

        self.spec.command(station).is_some()
    }

    pub fn identity(&self, station: &Station) -> ProcessIdentity {
        ProcessIdentity::new(station, self.adapter_type())
    }

    /// Fully qualified supervisor name (`group:program`)
    pub fn full_name(&self, station: &Station) -> String {
        self.identity(station).to_string()
    }

    /// Check if the program is running
    ///
    /// Without a command there is nothing to supervise, which counts as
    /// running. A program the supervisor does not know is not running.
    pub async fn is_running(&self, station: &Station) -> Result<bool> {
        if !self.has_command(station) {
            return Ok(true);
        }

        let program_name = self.full_name(station);
        match self.supervisor.get_process_info(&program_name).await {
            Ok(info) => Ok(info.is_running()),
            Err(SupervisorFault::BadName(_)) => Ok(false),
            Err(fault) => Err(self.supervisor_error(fault, &program_name, station)),
        }
    }

    pub async fn start(&self, station: &Station) -> Result<()> {
        if !self.has_command(station) {
            return Ok(());
        }

        let program_name = self.full_name(station);
        self.supervisor
            .start_process(&program_name)
            .await
            .map_err(|fault| self.supervisor_error(fault, &program_name, station))?;

        info!(
            station_id = station.id,
            station_name = %station.name,
            program = %program_name,
            "Adapter {} started",
            self.adapter_type()
        );
        Ok(())
    }

    pub async fn stop(&self, station: &Station) -> Result<()> {
        if !self.has_command(station) {
            return Ok(());
        }

        let program_name = self.full_name(station);
        self.supervisor
            .stop_process(&program_name)
            .await
            .map_err(|fault| self.supervisor_error(fault, &program_name, station))?;

        info!(
            station_id = station.id,
            station_name = %station.name,
            program = %program_name,
            "Adapter {} stopped",
            self.adapter_type()
        );
        Ok(())
    }

    /// Stop then start
    ///
    /// A stop on a program that is already stopped does not prevent the start.
    pub async fn restart(&self, station: &Station) -> Result<()> {
        match self.stop(station).await {
            Err(crate::Error::Supervisor(e)) if e.is_not_running() => {
                debug!(station_id = station.id, "{} was not running", self.adapter_type());
            }
            other => other?,
        }
        self.start(station).await
    }

    /// Reload configuration, in place when the program supports it
    pub async fn reload(&self, station: &Station) -> Result<()> {
        let Some(signal) = self.spec.reload_signal() else {
            return self.restart(station).await;
        };

        if !self.has_command(station) {
            return Ok(());
        }

        let program_name = self.full_name(station);
        self.supervisor
            .signal_process(&program_name, signal)
            .await
            .map_err(|fault| self.supervisor_error(fault, &program_name, station))?;

        info!(
            station_id = station.id,
            station_name = %station.name,
            program = %program_name,
            signal,
            "Adapter {} reloaded",
            self.adapter_type()
        );
        Ok(())
    }

    /// Log file of the program, inside the station config directory
    pub fn log_path(&self, station: &Station) -> PathBuf {
        station
            .radio_config_dir()
            .join(format!("{}.log", self.adapter_type().name().to_lowercase()))
    }

    fn supervisor_error(
        &self,
        fault: SupervisorFault,
        program_name: &str,
        station: &Station,
    ) -> crate::Error {
        SupervisorError::from_fault(fault, program_name)
            .with_station(station)
            .into()
    }
}
