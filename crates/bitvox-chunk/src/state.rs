use std::sync::atomic::{AtomicU8, Ordering};

/// Chunk lifecycle. Ordered so that later stages compare greater.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum ChunkState {
    Uninitialized = 0,
    /// Uniform content; no bit matrix, light or mesh is produced.
    Skipped = 1,
    LocalLightComputed = 2,
    LightFullyComputed = 3,
    FullyRendered = 4,
}

impl ChunkState {
    #[inline]
    pub fn from_u8(v: u8) -> ChunkState {
        match v {
            1 => ChunkState::Skipped,
            2 => ChunkState::LocalLightComputed,
            3 => ChunkState::LightFullyComputed,
            4 => ChunkState::FullyRendered,
            _ => ChunkState::Uninitialized,
        }
    }

    #[inline]
    pub fn is_settled(self) -> bool {
        matches!(self, ChunkState::Skipped | ChunkState::FullyRendered)
    }
}

/// Shared lifecycle slot written by pipeline stages on worker threads.
#[derive(Debug)]
pub struct StateCell(AtomicU8);

impl StateCell {
    pub fn new(state: ChunkState) -> Self {
        Self(AtomicU8::new(state as u8))
    }

    #[inline]
    pub fn get(&self) -> ChunkState {
        ChunkState::from_u8(self.0.load(Ordering::Acquire))
    }

    #[inline]
    pub fn set(&self, state: ChunkState) {
        self.0.store(state as u8, Ordering::Release);
    }

    /// Moves forward to `state`; never moves backwards. Returns true if the state changed.
    #[inline]
    pub fn advance(&self, state: ChunkState) -> bool {
        let prev = self.0.fetch_max(state as u8, Ordering::AcqRel);
        prev < state as u8
    }
}

impl Default for StateCell {
    fn default() -> Self {
        Self::new(ChunkState::Uninitialized)
    }
}
