// src/output/mod.rs
//! Progress collection and its terminal rendering.
//!
//! Use cases only ever push into a [`ProgressReporter`]; turning it into
//! text is left to the binary.

mod render;
mod types;

pub use render::{render_progress, render_sync_summary};
pub use types::{
    EntityAction, EntityProgress, MarkStatus, ProgressMark, ProgressReporter, ProgressStats,
    StepMark,
};
