//! Job graph, per-tick scheduler and the chunk engine that drives builds and edits.
#![forbid(unsafe_code)]

mod config;
mod engine;
mod error;
mod graph;
pub mod pipeline;
mod scheduler;
mod scratch;

pub use config::EngineConfig;
pub use engine::{ChunkUpdated, Engine, ObserverId, TickStats};
pub use error::{EditError, EngineError, JobError};
pub use graph::{JobGraph, JobHandle, JobToken};
pub use pipeline::{BuildKind, ChunkBuildOutput, StageTimings};
pub use scheduler::JobScheduler;
pub use scratch::{Pooled, ScratchPool};

#[cfg(test)]
mod tests;
