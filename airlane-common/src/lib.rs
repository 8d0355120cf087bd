//! # Airlane Common Library
//!
//! Shared code for the Airlane station control plane:
//! - Station, media, playlist, request and queue models
//! - Annotation scalar values and their canonical string form
//! - Configuration loading
//! - Timestamp utilities

pub mod config;
pub mod error;
pub mod models;
pub mod time;
pub mod values;

pub use error::{Error, Result};
pub use values::{value_to_string, AnnotationValue};
