//! Recording supervisor double
//!
//! Behaves like supervisord for the calls the adapters make: starting a
//! running program fails with ALREADY_STARTED, stopping a stopped one with
//! NOT_RUNNING, and an unknown program reports BAD_NAME. Faults can be
//! injected per operation.

use airlane_radio::supervisor::{ProcessInfo, ProcessState, Supervisor, SupervisorFault};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Default)]
pub struct MockSupervisor {
    calls: Mutex<Vec<String>>,
    states: Mutex<HashMap<String, ProcessState>>,
    faults: Mutex<HashMap<&'static str, SupervisorFault>>,
}

impl MockSupervisor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a program in the given state
    pub fn set_state(&self, name: &str, state: ProcessState) {
        self.states.lock().unwrap().insert(name.to_string(), state);
    }

    pub fn state(&self, name: &str) -> Option<ProcessState> {
        self.states.lock().unwrap().get(name).copied()
    }

    /// Fail the next `op` ("start", "stop", "info", "signal") with `fault`
    pub fn fail_next(&self, op: &'static str, fault: SupervisorFault) {
        self.faults.lock().unwrap().insert(op, fault);
    }

    /// Every call so far, as `"<op> <name>"` (`"signal <name> <sig>"`)
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    fn record(&self, op: &'static str, call: String) -> Result<(), SupervisorFault> {
        self.calls.lock().unwrap().push(call);
        match self.faults.lock().unwrap().remove(op) {
            Some(fault) => Err(fault),
            None => Ok(()),
        }
    }

    fn is_running(&self, name: &str) -> bool {
        self.state(name) == Some(ProcessState::Running)
    }
}

#[async_trait]
impl Supervisor for MockSupervisor {
    async fn start_process(&self, name: &str) -> Result<(), SupervisorFault> {
        self.record("start", format!("start {}", name))?;
        if self.is_running(name) {
            return Err(SupervisorFault::AlreadyStarted(name.to_string()));
        }
        self.set_state(name, ProcessState::Running);
        Ok(())
    }

    async fn stop_process(&self, name: &str) -> Result<(), SupervisorFault> {
        self.record("stop", format!("stop {}", name))?;
        if !self.is_running(name) {
            return Err(SupervisorFault::NotRunning(name.to_string()));
        }
        self.set_state(name, ProcessState::Stopped);
        Ok(())
    }

    async fn get_process_info(&self, name: &str) -> Result<ProcessInfo, SupervisorFault> {
        self.record("info", format!("info {}", name))?;
        let state = self
            .state(name)
            .ok_or_else(|| SupervisorFault::BadName(name.to_string()))?;

        let (group, program) = name.split_once(':').unwrap_or(("", name));
        Ok(ProcessInfo {
            name: program.to_string(),
            group: group.to_string(),
            state,
            pid: (state == ProcessState::Running).then_some(4242),
        })
    }

    async fn signal_process(&self, name: &str, signal: &str) -> Result<(), SupervisorFault> {
        self.record("signal", format!("signal {} {}", name, signal))?;
        if !self.is_running(name) {
            return Err(SupervisorFault::NotRunning(name.to_string()));
        }
        Ok(())
    }
}
