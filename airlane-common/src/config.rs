//! Configuration loading and config file resolution

use crate::models::Station;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "AIRLANE_CONFIG";

/// Runtime environment of the control plane
///
/// In `Testing`, adapters never report an executable command, so nothing is
/// handed to the process supervisor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AppEnvironment {
    #[default]
    Production,
    Development,
    Testing,
}

impl AppEnvironment {
    pub fn is_testing(&self) -> bool {
        matches!(self, AppEnvironment::Testing)
    }
}

/// Connection settings for the process supervisor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupervisorConfig {
    /// Base URL of the supervisord XML-RPC interface
    #[serde(default = "default_supervisor_url")]
    pub url: String,

    /// Upper bound for a single supervisor call, in seconds
    #[serde(default = "default_supervisor_timeout")]
    pub timeout_secs: f64,
}

fn default_supervisor_url() -> String {
    "http://127.0.0.1:9001".to_string()
}

fn default_supervisor_timeout() -> f64 {
    10.0
}

impl Default for SupervisorConfig {
    fn default() -> Self {
        Self {
            url: default_supervisor_url(),
            timeout_secs: default_supervisor_timeout(),
        }
    }
}

/// Locations of the supervised executables
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BinaryConfig {
    pub liquidsoap: Option<PathBuf>,
    pub icecast: Option<PathBuf>,
}

/// Top-level TOML configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RadioConfig {
    #[serde(default)]
    pub environment: AppEnvironment,

    #[serde(default = "default_database_url")]
    pub database_url: String,

    /// Tracing filter directive used when RUST_LOG is not set
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub supervisor: SupervisorConfig,

    #[serde(default)]
    pub binaries: BinaryConfig,

    #[serde(default)]
    pub stations: Vec<Station>,
}

fn default_database_url() -> String {
    "sqlite://airlane.db".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for RadioConfig {
    fn default() -> Self {
        Self {
            environment: AppEnvironment::default(),
            database_url: default_database_url(),
            log_level: default_log_level(),
            supervisor: SupervisorConfig::default(),
            binaries: BinaryConfig::default(),
            stations: Vec::new(),
        }
    }
}

impl RadioConfig {
    /// Load configuration from a TOML file
    ///
    /// A missing file is not fatal: a warning is logged and defaults are used.
    /// A file that exists but cannot be parsed is a configuration error.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            warn!("Config file {} not found, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let config = Self::from_toml(&content)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;

        info!(
            "Loaded configuration from {} ({} stations)",
            path.display(),
            config.stations.len()
        );
        Ok(config)
    }

    /// Parse configuration from TOML text
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Look up a station by its short name
    pub fn station(&self, short_name: &str) -> Option<&Station> {
        self.stations.iter().find(|s| s.short_name == short_name)
    }

    fn validate(&self) -> Result<()> {
        if !(self.supervisor.timeout_secs.is_finite() && self.supervisor.timeout_secs > 0.0) {
            return Err(Error::Config(
                "supervisor.timeout_secs must be positive".to_string(),
            ));
        }

        let mut ids: Vec<i64> = self.stations.iter().map(|s| s.id).collect();
        ids.sort_unstable();
        if let Some(dup) = ids.windows(2).find(|w| w[0] == w[1]) {
            return Err(Error::Config(format!("Duplicate station id {}", dup[0])));
        }

        for station in &self.stations {
            if station.backend_config.crossfade < 0.0 {
                return Err(Error::Config(format!(
                    "Station {}: crossfade must not be negative",
                    station.short_name
                )));
            }
        }

        Ok(())
    }
}

/// Config file resolution, in priority order:
/// 1. Command-line argument
/// 2. `AIRLANE_CONFIG` environment variable
/// 3. `<user config dir>/airlane/config.toml`, if it exists
/// 4. `/etc/airlane/config.toml`
pub fn resolve_config_path(cli_arg: Option<&Path>) -> PathBuf {
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }

    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        if !path.is_empty() {
            return PathBuf::from(path);
        }
    }

    if let Some(user_config) = dirs::config_dir().map(|d| d.join("airlane").join("config.toml")) {
        if user_config.exists() {
            return user_config;
        }
    }

    PathBuf::from("/etc/airlane/config.toml")
}
