//! # Airlane Radio Library (airlane-radio)
//!
//! Control plane for per-station broadcast programs.
//!
//! **Purpose:** Keep each station's engine and streaming server running with
//! current configuration, and compute the annotated request for every track
//! handed to the engine.
//!
//! **Architecture:** supervisord drives the programs ([`supervisor`]),
//! [`adapters`] wrap one program type each, and [`autodj`] runs the
//! annotation pipeline over queue entries from [`db`].

pub mod adapters;
pub mod autodj;
pub mod db;
pub mod error;
pub mod supervisor;

pub use error::{Error, Result, SupervisorError, SupervisorErrorKind};
