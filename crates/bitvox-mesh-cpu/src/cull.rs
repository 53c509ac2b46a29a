use crate::bitmatrix::BitMatrix;
use crate::constants::{PLANE_WORDS, S};
use crate::face::Face;
use crate::transpose::transpose64;

/// Six exposed-face planes, indexed by [`Face::index`]. Scratch for one meshing pass.
pub struct FacePlanes {
    words: Vec<u64>,
}

impl FacePlanes {
    #[inline]
    pub fn face(&self, face: Face) -> &[u64] {
        let i = face.index();
        &self.words[i * PLANE_WORDS..(i + 1) * PLANE_WORDS]
    }

    #[inline]
    pub fn face_mut(&mut self, face: Face) -> &mut [u64] {
        let i = face.index();
        &mut self.words[i * PLANE_WORDS..(i + 1) * PLANE_WORDS]
    }

    pub fn exposed_count(&self, face: Face) -> u32 {
        self.face(face).iter().map(|w| w.count_ones()).sum()
    }

    /// Transposes every 64-row block of every face so rows run along the merge axis.
    pub fn transpose(&mut self) {
        for block in self.words.chunks_exact_mut(S) {
            transpose64(block);
        }
    }
}

/// A bit survives where the next cell along the axis is empty. Bits shifted in from outside
/// the word are zero, so the outermost cells always read as exposed.
pub fn cull(bits: &BitMatrix) -> FacePlanes {
    let mut words = vec![0u64; PLANE_WORDS * 6];
    for axis in 0..3 {
        let plane = bits.plane(axis);
        let (pos, rest) = words[axis * 2 * PLANE_WORDS..].split_at_mut(PLANE_WORDS);
        let neg = &mut rest[..PLANE_WORDS];
        for (i, &w) in plane.iter().enumerate() {
            pos[i] = w & !(w >> 1);
            neg[i] = w & !(w << 1);
        }
    }
    FacePlanes { words }
}
