use bitvox_chunk::VISIBLE_SIZE;
use bitvox_geom::Aabb;

use crate::constants::{INDICES_PER_QUAD, VERTS_PER_QUAD};
use crate::emit::{Quad, QuadSink, pack_vertex};

/// Packed vertex words and 32-bit triangle indices for one chunk.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ChunkMesh {
    pub vertices: Vec<u32>,
    pub indices: Vec<u32>,
}

impl ChunkMesh {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quad_capacity(quads: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(quads * VERTS_PER_QUAD),
            indices: Vec::with_capacity(quads * INDICES_PER_QUAD),
        }
    }

    pub fn clear(&mut self) {
        self.vertices.clear();
        self.indices.clear();
    }

    #[inline]
    pub fn quad_count(&self) -> usize {
        self.vertices.len() / VERTS_PER_QUAD
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Chunk-local bounds, `[0, S-2]` on every axis.
    #[inline]
    pub fn bounds(&self) -> Aabb {
        Aabb::cube(VISIBLE_SIZE as f32)
    }
}

impl QuadSink for ChunkMesh {
    #[inline]
    fn push_quad(&mut self, quad: Quad) {
        let base = self.vertices.len() as u32;
        for ((x, y, z), light) in quad.vertices() {
            self.vertices.push(pack_vertex(x, y, z, quad.face, light));
        }
        self.indices.extend_from_slice(&quad.indices(base));
    }
}
