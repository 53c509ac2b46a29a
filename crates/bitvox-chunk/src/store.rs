use std::sync::Mutex;

use hashbrown::HashMap;

use crate::{ChunkCoord, VoxelGrid};

/// Persistence contract consulted before generation and on unload.
pub trait ChunkStore: Send + Sync {
    fn is_chunk_serialized(&self, coord: ChunkCoord) -> bool;
    /// Returns false if the chunk could not be stored.
    fn serialize(&self, coord: ChunkCoord, voxels: &VoxelGrid) -> bool;
    fn deserialize(&self, coord: ChunkCoord) -> Option<VoxelGrid>;
}

/// Never stores anything; every chunk is regenerated.
#[derive(Default, Debug, Clone, Copy)]
pub struct NullStore;

impl ChunkStore for NullStore {
    fn is_chunk_serialized(&self, _coord: ChunkCoord) -> bool {
        false
    }

    fn serialize(&self, _coord: ChunkCoord, _voxels: &VoxelGrid) -> bool {
        false
    }

    fn deserialize(&self, _coord: ChunkCoord) -> Option<VoxelGrid> {
        None
    }
}

/// In-process store keeping raw voxel bytes per chunk.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<HashMap<ChunkCoord, Vec<u8>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().map(|m| m.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ChunkStore for MemoryStore {
    fn is_chunk_serialized(&self, coord: ChunkCoord) -> bool {
        self.inner
            .lock()
            .map(|m| m.contains_key(&coord))
            .unwrap_or(false)
    }

    fn serialize(&self, coord: ChunkCoord, voxels: &VoxelGrid) -> bool {
        match self.inner.lock() {
            Ok(mut m) => {
                m.insert(coord, voxels.as_slice().to_vec());
                true
            }
            Err(_) => {
                log::warn!("memory store poisoned; dropping chunk {}", coord);
                false
            }
        }
    }

    fn deserialize(&self, coord: ChunkCoord) -> Option<VoxelGrid> {
        let m = self.inner.lock().ok()?;
        m.get(&coord).map(|cells| VoxelGrid::from_cells(cells.clone()))
    }
}
