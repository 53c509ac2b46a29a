use std::fmt;

use bitvox_chunk::ChunkCoord;

/// Why a job handle holds no value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum JobError {
    /// The stage panicked; carries the panic message.
    Panicked(String),
    /// A stage this one depends on failed.
    DependencyFailed,
    NotFinished,
    AlreadyTaken,
}

impl fmt::Display for JobError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobError::Panicked(msg) => write!(f, "job panicked: {msg}"),
            JobError::DependencyFailed => write!(f, "a dependency failed"),
            JobError::NotFinished => write!(f, "job has not finished"),
            JobError::AlreadyTaken => write!(f, "job result was already taken"),
        }
    }
}

impl std::error::Error for JobError {}

#[derive(Debug)]
pub enum EngineError {
    ThreadPool(rayon::ThreadPoolBuildError),
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::ThreadPool(e) => write!(f, "failed to start worker pool: {e}"),
        }
    }
}

impl std::error::Error for EngineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EngineError::ThreadPool(e) => Some(e),
        }
    }
}

impl From<rayon::ThreadPoolBuildError> for EngineError {
    fn from(e: rayon::ThreadPoolBuildError) -> Self {
        EngineError::ThreadPool(e)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EditError {
    ChunkNotLoaded(ChunkCoord),
    /// The chunk is loaded but its voxels are still being generated.
    ChunkNotReady(ChunkCoord),
    EmptyMaterial,
}

impl fmt::Display for EditError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EditError::ChunkNotLoaded(c) => write!(f, "chunk {c} is not loaded"),
            EditError::ChunkNotReady(c) => write!(f, "chunk {c} has no voxels yet"),
            EditError::EmptyMaterial => write!(f, "material id 0 cannot be placed"),
        }
    }
}

impl std::error::Error for EditError {}
