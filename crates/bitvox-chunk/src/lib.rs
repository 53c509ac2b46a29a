//! Chunk voxel storage, coordinates, lifecycle state and the content/persistence contracts.
#![forbid(unsafe_code)]

mod coord;
mod state;
mod store;

pub use coord::{ChunkCoord, local_to_world, world_to_chunk, world_to_local};
pub use state::{ChunkState, StateCell};
pub use store::{ChunkStore, MemoryStore, NullStore};

/// Side of the padded voxel cube, halo included.
pub const CHUNK_SIZE: usize = 64;
pub const CHUNK_SIZE_SQ: usize = CHUNK_SIZE * CHUNK_SIZE;
pub const CHUNK_VOLUME: usize = CHUNK_SIZE_SQ * CHUNK_SIZE;
/// Rendered span per axis; the outer cell on every side is halo.
pub const VISIBLE_SIZE: usize = CHUNK_SIZE - 2;
pub const INTERIOR_MIN: usize = 1;
pub const INTERIOR_MAX: usize = CHUNK_SIZE - 2;

pub const EMPTY: u8 = 0;

/// Dense `S^3` material ids, 0 = empty. Indexed `x + y*S + z*S^2`.
#[derive(Clone, PartialEq, Eq)]
pub struct VoxelGrid {
    cells: Vec<u8>,
}

impl VoxelGrid {
    pub fn new() -> Self {
        Self::filled(EMPTY)
    }

    pub fn filled(id: u8) -> Self {
        Self {
            cells: vec![id; CHUNK_VOLUME],
        }
    }

    /// Wraps a raw cell vector; short or long input is padded/truncated with empty cells.
    pub fn from_cells(mut cells: Vec<u8>) -> Self {
        if cells.len() != CHUNK_VOLUME {
            cells.resize(CHUNK_VOLUME, EMPTY);
        }
        Self { cells }
    }

    #[inline]
    pub const fn idx(x: usize, y: usize, z: usize) -> usize {
        x + y * CHUNK_SIZE + z * CHUNK_SIZE_SQ
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize, z: usize) -> u8 {
        self.cells[Self::idx(x, y, z)]
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, z: usize, id: u8) {
        self.cells[Self::idx(x, y, z)] = id;
    }

    #[inline]
    pub fn is_solid(&self, x: usize, y: usize, z: usize) -> bool {
        self.get(x, y, z) != EMPTY
    }

    /// Solidity with signed coordinates; anything outside the cube reads as empty.
    #[inline]
    pub fn is_solid_i(&self, x: i32, y: i32, z: i32) -> bool {
        let s = CHUNK_SIZE as i32;
        if x < 0 || y < 0 || z < 0 || x >= s || y >= s || z >= s {
            return false;
        }
        self.is_solid(x as usize, y as usize, z as usize)
    }

    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.cells
    }

    pub fn solid_count(&self) -> usize {
        self.cells.iter().filter(|&&v| v != EMPTY).count()
    }

    /// Classifies the whole cube, halo included.
    pub fn occupancy(&self) -> Occupancy {
        let mut any_solid = false;
        let mut any_empty = false;
        for &v in &self.cells {
            if v == EMPTY {
                any_empty = true;
            } else {
                any_solid = true;
            }
            if any_solid && any_empty {
                return Occupancy::Mixed;
            }
        }
        if any_solid { Occupancy::Solid } else { Occupancy::Empty }
    }
}

impl Default for VoxelGrid {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for VoxelGrid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VoxelGrid")
            .field("solid", &self.solid_count())
            .field("volume", &CHUNK_VOLUME)
            .finish()
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Occupancy {
    Empty,
    Solid,
    Mixed,
}

impl Occupancy {
    /// Uniform chunks produce no interior faces and skip bit-matrix, light and mesh work.
    #[inline]
    pub fn is_uniform(self) -> bool {
        !matches!(self, Occupancy::Mixed)
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        matches!(self, Occupancy::Empty)
    }
}

/// Procedural content contract: fills every cell of the padded cube for `coord`.
pub trait VoxelSource: Send + Sync {
    fn fill(&self, coord: ChunkCoord, voxels: &mut VoxelGrid) -> Occupancy;
}

impl<F> VoxelSource for F
where
    F: Fn(ChunkCoord, &mut VoxelGrid) -> Occupancy + Send + Sync,
{
    fn fill(&self, coord: ChunkCoord, voxels: &mut VoxelGrid) -> Occupancy {
        self(coord, voxels)
    }
}

#[cfg(test)]
mod tests;
