//! Test helper modules for airlane-radio integration tests
//!
//! - MockSupervisor: in-process stand-in for supervisord that records calls
//! - fixtures: stations, media and queue entries
//! - schema: station queue tables for SQLite tests

#![allow(dead_code)]

pub mod fixtures;
pub mod mock_supervisor;
pub mod schema;

pub use fixtures::{media, station, station_with_crossfade, write_staged};
pub use mock_supervisor::MockSupervisor;
pub use schema::create_queue_schema;
