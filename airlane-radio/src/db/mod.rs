//! Database access layer
//!
//! Provides queue access for the AutoDJ annotation pipeline.

pub mod queue;

pub use queue::{MemoryQueueRepository, QueueRepository, SqliteQueueRepository};
