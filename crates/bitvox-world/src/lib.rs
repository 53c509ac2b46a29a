//! Procedural terrain: a noise height field (or a flat floor) written into padded chunk grids.
#![forbid(unsafe_code)]

mod config;

use bitvox_chunk::{CHUNK_SIZE, ChunkCoord, Occupancy, VoxelGrid, VoxelSource, local_to_world};
use fastnoise_lite::{FastNoiseLite, NoiseType};

pub use config::{TerrainConfig, TerrainMode};

pub struct TerrainGenerator {
    cfg: TerrainConfig,
    terrain: FastNoiseLite,
}

impl TerrainGenerator {
    pub fn new(cfg: TerrainConfig) -> Self {
        let mut terrain = FastNoiseLite::with_seed(cfg.seed);
        terrain.set_noise_type(Some(NoiseType::OpenSimplex2));
        terrain.set_frequency(Some(cfg.frequency));
        Self { cfg, terrain }
    }

    pub fn config(&self) -> &TerrainConfig {
        &self.cfg
    }

    /// Surface height at a world column; cells at or below it are solid.
    pub fn height_at(&self, wx: i32, wz: i32) -> f32 {
        match self.cfg.mode {
            TerrainMode::Noise => {
                let n = self.terrain.get_noise_2d(wx as f32, wz as f32);
                n * self.cfg.amplitude + self.cfg.base_height
            }
            // flat fills wy < flat_height
            TerrainMode::Flat => (self.cfg.flat_height - 1) as f32,
        }
    }
}

impl VoxelSource for TerrainGenerator {
    fn fill(&self, coord: ChunkCoord, voxels: &mut VoxelGrid) -> Occupancy {
        let material = self.cfg.material.max(1);
        for z in 0..CHUNK_SIZE {
            for x in 0..CHUNK_SIZE {
                let column = local_to_world(coord, x, 0, z);
                let height = self.height_at(column.x, column.z);
                for y in 0..CHUNK_SIZE {
                    let wy = column.y + y as i32;
                    let id = if wy as f32 <= height { material } else { 0 };
                    voxels.set(x, y, z, id);
                }
            }
        }
        let occ = voxels.occupancy();
        log::trace!(target: "pipeline", "terrain fill {} -> {:?}", coord, occ);
        occ
    }
}

impl std::fmt::Debug for TerrainGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TerrainGenerator").field("cfg", &self.cfg).finish()
    }
}
