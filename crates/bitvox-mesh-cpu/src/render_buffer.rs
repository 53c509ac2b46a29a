use bitvox_chunk::{CHUNK_SIZE, INTERIOR_MAX, INTERIOR_MIN, VISIBLE_SIZE, VoxelGrid};

const IDS_PER_WORD: usize = 4;
const SLICE: usize = VISIBLE_SIZE * VISIBLE_SIZE;

/// Visible material ids packed four to a word for shader-side lookup.
pub const RENDER_BUFFER_WORDS: usize = SLICE * (CHUNK_SIZE / IDS_PER_WORD);

#[derive(Clone, PartialEq, Eq)]
pub struct RenderBuffer {
    words: Vec<u32>,
}

impl RenderBuffer {
    #[inline]
    fn slot(x: usize, y: usize, z: usize) -> (usize, u32) {
        let word = (x - 1) + (y - 1) * VISIBLE_SIZE + ((z - 1) / IDS_PER_WORD) * SLICE;
        let shift = (3 - ((z - 1) % IDS_PER_WORD) as u32) * 8;
        (word, shift)
    }

    pub fn from_voxels(voxels: &VoxelGrid) -> Self {
        let mut words = vec![0u32; RENDER_BUFFER_WORDS];
        for z in INTERIOR_MIN..=INTERIOR_MAX {
            for y in INTERIOR_MIN..=INTERIOR_MAX {
                for x in INTERIOR_MIN..=INTERIOR_MAX {
                    let id = voxels.get(x, y, z);
                    if id != 0 {
                        let (w, shift) = Self::slot(x, y, z);
                        words[w] |= u32::from(id) << shift;
                    }
                }
            }
        }
        Self { words }
    }

    /// Material id at interior cell `(x, y, z)`.
    #[inline]
    pub fn get(&self, x: usize, y: usize, z: usize) -> u8 {
        let (w, shift) = Self::slot(x, y, z);
        (self.words[w] >> shift) as u8
    }

    #[inline]
    pub fn as_slice(&self) -> &[u32] {
        &self.words
    }
}

impl std::fmt::Debug for RenderBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderBuffer").field("words", &self.words.len()).finish()
    }
}
