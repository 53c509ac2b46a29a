use bitvox_chunk::VoxelGrid;

use crate::constants::{PLANE_WORDS, S};

/// Occupancy as three axis-aligned bit planes of `S*S` words each.
///
/// - plane 0: word `z + y*S`, bit `x`
/// - plane 1: word `x + z*S`, bit `y`
/// - plane 2: word `x + y*S`, bit `z`
#[derive(Clone, PartialEq, Eq)]
pub struct BitMatrix {
    words: Vec<u64>,
}

impl BitMatrix {
    pub fn new() -> Self {
        Self {
            words: vec![0; PLANE_WORDS * 3],
        }
    }

    pub fn from_voxels(voxels: &VoxelGrid) -> Self {
        let mut m = Self::new();
        m.rebuild(voxels);
        m
    }

    /// Re-projects `voxels` into this matrix, reusing its storage.
    pub fn rebuild(&mut self, voxels: &VoxelGrid) {
        self.words.fill(0);
        for z in 0..S {
            for y in 0..S {
                for x in 0..S {
                    if voxels.is_solid(x, y, z) {
                        self.set(x, y, z, true);
                    }
                }
            }
        }
    }

    #[inline]
    fn slots(x: usize, y: usize, z: usize) -> [(usize, usize); 3] {
        [
            (z + y * S, x),
            (PLANE_WORDS + x + z * S, y),
            (PLANE_WORDS * 2 + x + y * S, z),
        ]
    }

    /// Updates all three planes together so they never disagree.
    #[inline]
    pub fn set(&mut self, x: usize, y: usize, z: usize, solid: bool) {
        for (word, bit) in Self::slots(x, y, z) {
            if solid {
                self.words[word] |= 1u64 << bit;
            } else {
                self.words[word] &= !(1u64 << bit);
            }
        }
    }

    #[inline]
    pub fn is_solid(&self, x: usize, y: usize, z: usize) -> bool {
        (self.words[z + y * S] >> x) & 1 == 1
    }

    /// Reads one cell back from a specific plane.
    #[inline]
    pub fn is_solid_in(&self, axis: usize, x: usize, y: usize, z: usize) -> bool {
        let (word, bit) = Self::slots(x, y, z)[axis];
        (self.words[word] >> bit) & 1 == 1
    }

    #[inline]
    pub fn plane(&self, axis: usize) -> &[u64] {
        &self.words[axis * PLANE_WORDS..(axis + 1) * PLANE_WORDS]
    }

    #[inline]
    pub fn words(&self) -> &[u64] {
        &self.words
    }
}

impl Default for BitMatrix {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for BitMatrix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let bits: u32 = self.plane(0).iter().map(|w| w.count_ones()).sum();
        f.debug_struct("BitMatrix").field("solid", &bits).finish()
    }
}
