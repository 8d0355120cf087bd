//! AutoDJ hand-off to the broadcast engine
//!
//! Computes the annotated request for the next queued track: playable path,
//! descriptive metadata and cue/fade/crossfade timing.

pub mod annotations;
pub mod autocue;
pub mod event;

pub use annotations::{AnnotationStage, Annotations};
pub use autocue::process_autocue_annotations;
pub use event::AnnotateNextSong;
