//! Process supervision protocol
//!
//! The control plane never spawns the broadcast engine itself. It asks an
//! external supervisor to start, stop and signal programs by their
//! `group:program` name.

pub mod xmlrpc;

use async_trait::async_trait;
use thiserror::Error;

pub use xmlrpc::XmlRpcSupervisor;

/// supervisord fault codes the control plane distinguishes
pub mod fault_codes {
    pub const BAD_NAME: i32 = 10;
    pub const ALREADY_STARTED: i32 = 60;
    pub const NOT_RUNNING: i32 = 70;
}

/// Low-level failure reported by the supervisor
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SupervisorFault {
    #[error("BAD_NAME: {0}")]
    BadName(String),

    #[error("ALREADY_STARTED: {0}")]
    AlreadyStarted(String),

    #[error("NOT_RUNNING: {0}")]
    NotRunning(String),

    #[error("fault {code}: {message}")]
    Other { code: i32, message: String },

    /// The supervisor could not be reached or answered garbage
    #[error("transport error: {0}")]
    Transport(String),
}

impl SupervisorFault {
    pub fn from_code(code: i32, message: String) -> Self {
        match code {
            fault_codes::BAD_NAME => SupervisorFault::BadName(message),
            fault_codes::ALREADY_STARTED => SupervisorFault::AlreadyStarted(message),
            fault_codes::NOT_RUNNING => SupervisorFault::NotRunning(message),
            code => SupervisorFault::Other { code, message },
        }
    }
}

/// supervisord process states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessState {
    Stopped,
    Starting,
    Running,
    Backoff,
    Stopping,
    Exited,
    Fatal,
    Unknown,
}

impl ProcessState {
    pub fn from_code(code: i64) -> Self {
        match code {
            0 => ProcessState::Stopped,
            10 => ProcessState::Starting,
            20 => ProcessState::Running,
            30 => ProcessState::Backoff,
            40 => ProcessState::Stopping,
            100 => ProcessState::Exited,
            200 => ProcessState::Fatal,
            _ => ProcessState::Unknown,
        }
    }
}

/// Snapshot of one supervised program
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessInfo {
    pub name: String,
    pub group: String,
    pub state: ProcessState,
    pub pid: Option<i64>,
}

impl ProcessInfo {
    pub fn is_running(&self) -> bool {
        self.state == ProcessState::Running
    }
}

/// Client side of the process supervision protocol
///
/// Every call is bounded by the implementation's own timeout; a timeout is
/// reported as [`SupervisorFault::Transport`].
#[async_trait]
pub trait Supervisor: Send + Sync {
    async fn start_process(&self, name: &str) -> Result<(), SupervisorFault>;

    async fn stop_process(&self, name: &str) -> Result<(), SupervisorFault>;

    async fn get_process_info(&self, name: &str) -> Result<ProcessInfo, SupervisorFault>;

    /// Deliver a signal (e.g. `HUP`) to a running program
    async fn signal_process(&self, name: &str, signal: &str) -> Result<(), SupervisorFault>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fault_from_code() {
        assert_eq!(
            SupervisorFault::from_code(10, "BAD_NAME: foo".into()),
            SupervisorFault::BadName("BAD_NAME: foo".into())
        );
        assert!(matches!(
            SupervisorFault::from_code(60, String::new()),
            SupervisorFault::AlreadyStarted(_)
        ));
        assert!(matches!(
            SupervisorFault::from_code(70, String::new()),
            SupervisorFault::NotRunning(_)
        ));
        assert!(matches!(
            SupervisorFault::from_code(50, String::new()),
            SupervisorFault::Other { code: 50, .. }
        ));
    }

    #[test]
    fn test_only_running_state_is_running() {
        let mut info = ProcessInfo {
            name: "station_1_backend".into(),
            group: "station_1".into(),
            state: ProcessState::Starting,
            pid: None,
        };
        assert!(!info.is_running());

        info.state = ProcessState::from_code(20);
        assert!(info.is_running());

        assert_eq!(ProcessState::from_code(999), ProcessState::Unknown);
    }
}
