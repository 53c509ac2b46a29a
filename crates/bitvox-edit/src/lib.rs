//! Persistent world edits and per-chunk revisions.
#![forbid(unsafe_code)]

use bitvox_chunk::{CHUNK_SIZE, ChunkCoord, INTERIOR_MAX, INTERIOR_MIN, VoxelGrid, world_to_local};
use bitvox_geom::IVec3;
use hashbrown::HashMap;

#[derive(Default, Debug, Clone, Copy)]
pub struct EditStoreStats {
    pub chunk_entries: usize,
    pub voxel_edits: usize,
    pub rev_entries: usize,
    pub built_entries: usize,
}

/// One chunk whose padded grid contains an edited world position.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Footprint {
    pub coord: ChunkCoord,
    pub local: (usize, usize, usize),
}

impl Footprint {
    /// True when the cell is in the chunk's halo rather than its interior.
    pub fn is_halo(&self) -> bool {
        let (x, y, z) = self.local;
        [x, y, z].iter().any(|&c| !(INTERIOR_MIN..=INTERIOR_MAX).contains(&c))
    }
}

/// Every chunk that stores world position `p`: the owner at an interior cell, then
/// up to seven neighbours holding it in their halo when `p` sits on a border.
pub fn footprint(p: IVec3) -> Vec<Footprint> {
    let (owner, (lx, ly, lz)) = world_to_local(p);
    let options = |l: usize| -> Vec<(i32, usize)> {
        let mut v = vec![(0, l)];
        if l == INTERIOR_MIN {
            v.push((-1, CHUNK_SIZE - 1));
        }
        if l == INTERIOR_MAX {
            v.push((1, 0));
        }
        v
    };
    let (ox, oy, oz) = (options(lx), options(ly), options(lz));
    let mut out = Vec::with_capacity(ox.len() * oy.len() * oz.len());
    for &(dx, x) in &ox {
        for &(dy, y) in &oy {
            for &(dz, z) in &oz {
                out.push(Footprint {
                    coord: owner.offset(dx, dy, dz),
                    local: (x, y, z),
                });
            }
        }
    }
    out
}

/// Chunk-aware persistent edit store with simple change tracking.
#[derive(Default)]
pub struct EditStore {
    // owner chunk -> world position -> material (0 = removed)
    inner: HashMap<ChunkCoord, HashMap<IVec3, u8>>,
    // latest edit stamp affecting a chunk
    rev: HashMap<ChunkCoord, u64>,
    // newest stamp a finished build has reflected
    built: HashMap<ChunkCoord, u64>,
    counter: u64,
}

impl EditStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stats(&self) -> EditStoreStats {
        EditStoreStats {
            chunk_entries: self.inner.len(),
            voxel_edits: self.inner.values().map(|m| m.len()).sum(),
            rev_entries: self.rev.len(),
            built_entries: self.built.len(),
        }
    }

    pub fn get(&self, p: IVec3) -> Option<u8> {
        let (owner, _) = world_to_local(p);
        self.inner.get(&owner).and_then(|m| m.get(&p).copied())
    }

    pub fn set(&mut self, p: IVec3, id: u8) {
        let (owner, _) = world_to_local(p);
        self.inner.entry(owner).or_default().insert(p, id);
    }

    /// Edits that land anywhere in `coord`'s padded grid, halo included, as local cells.
    pub fn snapshot_for_chunk(&self, coord: ChunkCoord) -> Vec<((usize, usize, usize), u8)> {
        let mut out = Vec::new();
        for dz in -1..=1 {
            for dy in -1..=1 {
                for dx in -1..=1 {
                    let Some(m) = self.inner.get(&coord.offset(dx, dy, dz)) else {
                        continue;
                    };
                    for (&p, &id) in m {
                        if let Some(f) = footprint(p).into_iter().find(|f| f.coord == coord) {
                            out.push((f.local, id));
                        }
                    }
                }
            }
        }
        out
    }

    /// Replays recorded edits into freshly generated voxels. Returns how many were applied.
    pub fn apply_to(&self, coord: ChunkCoord, voxels: &mut VoxelGrid) -> usize {
        let edits = self.snapshot_for_chunk(coord);
        for &((x, y, z), id) in &edits {
            voxels.set(x, y, z, id);
        }
        if !edits.is_empty() {
            log::debug!(target: "edits", "replayed {} edits into {}", edits.len(), coord);
        }
        edits.len()
    }

    /// Stamps every chunk in `p`'s footprint with a new monotonically increasing revision.
    pub fn bump_region_around(&mut self, p: IVec3) -> u64 {
        self.counter = self.counter.wrapping_add(1).max(1);
        let stamp = self.counter;
        for f in footprint(p) {
            self.rev.insert(f.coord, stamp);
        }
        stamp
    }

    pub fn get_rev(&self, coord: ChunkCoord) -> u64 {
        self.rev.get(&coord).copied().unwrap_or(0)
    }

    pub fn get_built_rev(&self, coord: ChunkCoord) -> u64 {
        self.built.get(&coord).copied().unwrap_or(0)
    }

    pub fn mark_built(&mut self, coord: ChunkCoord, rev: u64) {
        let e = self.built.entry(coord).or_insert(0);
        if rev > *e {
            *e = rev;
        }
    }

    pub fn needs_rebuild(&self, coord: ChunkCoord) -> bool {
        self.get_rev(coord) > self.get_built_rev(coord)
    }

    /// Forgets build progress for an unloaded chunk; its edits and revision stay.
    pub fn forget_built(&mut self, coord: ChunkCoord) {
        self.built.remove(&coord);
    }
}
