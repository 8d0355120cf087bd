//! Error types for airlane-radio
//!
//! Supervisor failures carry the process identity and the station they were
//! raised for as structured fields, so log sinks can index them.

use airlane_common::models::Station;
use thiserror::Error;

use crate::supervisor::SupervisorFault;

/// What went wrong inside the process supervisor
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SupervisorErrorKind {
    /// The supervisor does not know the program
    #[error("process not found")]
    NotFound,

    /// Start requested for a process that is already running
    #[error("process is already running")]
    AlreadyRunning,

    /// Stop requested for a process that is not running
    #[error("process is not running")]
    NotRunning,

    /// Any other supervisor or transport failure
    #[error("{0}")]
    Other(String),
}

/// Supervisor failure with station context attached
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Supervisor error for {program_name}: {kind}")]
pub struct SupervisorError {
    pub kind: SupervisorErrorKind,
    /// Fully qualified `group:program` name
    pub program_name: String,
    pub station_id: Option<i64>,
    pub station_name: Option<String>,
}

impl SupervisorError {
    pub fn from_fault(fault: SupervisorFault, program_name: &str) -> Self {
        let kind = match fault {
            SupervisorFault::BadName(_) => SupervisorErrorKind::NotFound,
            SupervisorFault::AlreadyStarted(_) => SupervisorErrorKind::AlreadyRunning,
            SupervisorFault::NotRunning(_) => SupervisorErrorKind::NotRunning,
            other => SupervisorErrorKind::Other(other.to_string()),
        };

        Self {
            kind,
            program_name: program_name.to_string(),
            station_id: None,
            station_name: None,
        }
    }

    pub fn with_station(mut self, station: &Station) -> Self {
        self.station_id = Some(station.id);
        self.station_name = Some(station.name.clone());
        self
    }

    pub fn is_already_running(&self) -> bool {
        self.kind == SupervisorErrorKind::AlreadyRunning
    }

    pub fn is_not_running(&self) -> bool {
        self.kind == SupervisorErrorKind::NotRunning
    }
}

/// Main error type for airlane-radio
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Supervisor(#[from] SupervisorError),

    /// File I/O errors (configuration writes propagate these unchanged)
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    /// Queue records that cannot be interpreted
    #[error("Queue error: {0}")]
    Queue(String),
}

impl From<airlane_common::Error> for Error {
    fn from(e: airlane_common::Error) -> Self {
        match e {
            airlane_common::Error::Io(io) => Error::Io(io),
            other => Error::Config(other.to_string()),
        }
    }
}

/// Convenience Result type using airlane-radio Error
pub type Result<T> = std::result::Result<T, Error>;
