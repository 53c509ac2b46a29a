//! Per-chunk sun light: column seeding, BFS flood fill and incremental edits.
#![forbid(unsafe_code)]

use std::collections::VecDeque;

use bitvox_chunk::{CHUNK_SIZE, CHUNK_VOLUME, INTERIOR_MAX, INTERIOR_MIN, VoxelGrid};

pub const MAX_LIGHT: u8 = 15;
/// Light lost per BFS hop. Sun columns travel straight down without decay.
pub const LIGHT_DECAY: u8 = 1;

const NEIGHBORS6: [(i32, i32, i32); 6] = [
    (1, 0, 0),
    (-1, 0, 0),
    (0, 1, 0),
    (0, -1, 0),
    (0, 0, 1),
    (0, 0, -1),
];

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct LightNode {
    pub x: u8,
    pub y: u8,
    pub z: u8,
    pub value: u8,
}

impl LightNode {
    #[inline]
    fn new(x: usize, y: usize, z: usize, value: u8) -> Self {
        Self { x: x as u8, y: y as u8, z: z as u8, value }
    }

    #[inline]
    fn pos(self) -> (usize, usize, usize) {
        (self.x as usize, self.y as usize, self.z as usize)
    }
}

#[inline]
fn interior(v: i32) -> bool {
    v >= INTERIOR_MIN as i32 && v <= INTERIOR_MAX as i32
}

#[inline]
fn step(p: (usize, usize, usize), d: (i32, i32, i32)) -> Option<(usize, usize, usize)> {
    let (x, y, z) = (p.0 as i32 + d.0, p.1 as i32 + d.1, p.2 as i32 + d.2);
    if interior(x) && interior(y) && interior(z) {
        Some((x as usize, y as usize, z as usize))
    } else {
        None
    }
}

/// Light values 0..=15 for every cell of the padded cube. Halo cells stay 0; reads through
/// [`LightField::sample`] treat them as fully lit.
#[derive(Clone, PartialEq, Eq)]
pub struct LightField {
    cells: Vec<u8>,
}

impl LightField {
    pub fn new() -> Self {
        Self {
            cells: vec![0; CHUNK_VOLUME],
        }
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize, z: usize) -> u8 {
        self.cells[VoxelGrid::idx(x, y, z)]
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, z: usize, v: u8) {
        self.cells[VoxelGrid::idx(x, y, z)] = v;
    }

    /// Signed read: coordinates `<= 0` or `>= S-1` return the sentinel [`MAX_LIGHT`].
    #[inline]
    pub fn sample(&self, x: i32, y: i32, z: i32) -> u8 {
        if !(interior(x) && interior(y) && interior(z)) {
            return MAX_LIGHT;
        }
        self.get(x as usize, y as usize, z as usize)
    }

    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.cells
    }

    /// Full recompute: seed every open column from the top, then flood.
    pub fn compute(voxels: &VoxelGrid) -> Self {
        let mut light = LightField::new();
        let mut queue = VecDeque::with_capacity(CHUNK_SIZE * CHUNK_SIZE * 4);
        light.seed_sun(voxels, &mut queue);
        let seeded = queue.len();
        light.propagate(voxels, &mut queue);
        log::trace!(target: "lighting", "sun flood: {} seeds", seeded);
        light
    }

    /// Walks each interior column down from the top while empty, lighting to 15.
    pub fn seed_sun(&mut self, voxels: &VoxelGrid, queue: &mut VecDeque<LightNode>) {
        for z in INTERIOR_MIN..=INTERIOR_MAX {
            for x in INTERIOR_MIN..=INTERIOR_MAX {
                self.seed_column(voxels, x, INTERIOR_MAX, z, queue);
            }
        }
    }

    fn seed_column(
        &mut self,
        voxels: &VoxelGrid,
        x: usize,
        top: usize,
        z: usize,
        queue: &mut VecDeque<LightNode>,
    ) {
        let mut y = top;
        while y >= INTERIOR_MIN && !voxels.is_solid(x, y, z) {
            self.set(x, y, z, MAX_LIGHT);
            queue.push_back(LightNode::new(x, y, z, MAX_LIGHT));
            y -= 1;
        }
    }

    /// BFS: each source lights open neighbours to `value - 1` when that is brighter.
    pub fn propagate(&mut self, voxels: &VoxelGrid, queue: &mut VecDeque<LightNode>) {
        while let Some(node) = queue.pop_front() {
            let p = node.pos();
            // Superseded by a brighter write or cleared by darkness.
            if self.get(p.0, p.1, p.2) != node.value {
                continue;
            }
            if node.value <= LIGHT_DECAY {
                continue;
            }
            let next = node.value - LIGHT_DECAY;
            for d in NEIGHBORS6 {
                let (nx, ny, nz) = (p.0 as i32 + d.0, p.1 as i32 + d.1, p.2 as i32 + d.2);
                if self.sample(nx, ny, nz) >= next {
                    continue;
                }
                let (nx, ny, nz) = (nx as usize, ny as usize, nz as usize);
                if voxels.is_solid(nx, ny, nz) {
                    continue;
                }
                self.set(nx, ny, nz, next);
                queue.push_back(LightNode::new(nx, ny, nz, next));
            }
        }
    }

    /// Retracts light that depended on the queued cells. Neighbours dimmer than the
    /// retracting value go dark; brighter or equal ones have another source and are
    /// pushed to `relight`.
    pub fn propagate_darkness(
        &mut self,
        dark: &mut VecDeque<LightNode>,
        relight: &mut VecDeque<LightNode>,
    ) {
        while let Some(node) = dark.pop_front() {
            for d in NEIGHBORS6 {
                let Some((nx, ny, nz)) = step(node.pos(), d) else {
                    continue;
                };
                let nl = self.get(nx, ny, nz);
                if nl == 0 {
                    continue;
                }
                if nl < node.value {
                    self.set(nx, ny, nz, 0);
                    dark.push_back(LightNode::new(nx, ny, nz, nl));
                } else {
                    relight.push_back(LightNode::new(nx, ny, nz, nl));
                }
            }
        }
    }

    /// Call after the cell at `(x,y,z)` was cleared in `voxels`.
    pub fn remove_voxel(&mut self, voxels: &VoxelGrid, x: usize, y: usize, z: usize) {
        debug_assert!(interior(x as i32) && interior(y as i32) && interior(z as i32));
        let mut queue = VecDeque::new();
        if self.sample(x as i32, y as i32 + 1, z as i32) == MAX_LIGHT {
            self.seed_column(voxels, x, y, z, &mut queue);
        } else {
            let brightest = NEIGHBORS6
                .iter()
                .filter_map(|&d| step((x, y, z), d))
                .map(|(nx, ny, nz)| self.get(nx, ny, nz))
                .max()
                .unwrap_or(0);
            let v = brightest.saturating_sub(LIGHT_DECAY);
            self.set(x, y, z, v);
            if v > 0 {
                queue.push_back(LightNode::new(x, y, z, v));
            }
        }
        self.propagate(voxels, &mut queue);
    }

    /// Call after the cell at `(x,y,z)` became solid in `voxels`.
    pub fn add_voxel(&mut self, voxels: &VoxelGrid, x: usize, y: usize, z: usize) {
        debug_assert!(interior(x as i32) && interior(y as i32) && interior(z as i32));
        let mut dark = VecDeque::new();
        let current = self.get(x, y, z);
        self.set(x, y, z, 0);
        dark.push_back(LightNode::new(x, y, z, current));

        // The sun column below is now shadowed.
        let mut yy = y - 1;
        while yy >= INTERIOR_MIN && self.get(x, yy, z) == MAX_LIGHT {
            self.set(x, yy, z, 0);
            dark.push_back(LightNode::new(x, yy, z, MAX_LIGHT));
            yy -= 1;
        }

        let mut relight = VecDeque::new();
        self.propagate_darkness(&mut dark, &mut relight);
        self.propagate(voxels, &mut relight);
    }
}

impl Default for LightField {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for LightField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let lit = self.cells.iter().filter(|&&v| v > 0).count();
        f.debug_struct("LightField").field("lit", &lit).finish()
    }
}
