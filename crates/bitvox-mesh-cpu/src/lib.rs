//! CPU chunk meshing: bit-plane culling, 64x64 transposes, greedy merge with AO,
//! and packed vertex output.
#![forbid(unsafe_code)]

mod ao;
mod bitmatrix;
mod constants;
mod cull;
mod emit;
mod face;
mod greedy;
mod mesh;
mod naive;
mod render_buffer;
mod transpose;

use std::str::FromStr;
use std::sync::Arc;

use bitvox_chunk::VoxelGrid;
use bitvox_lighting::LightField;
use serde::Deserialize;

pub use ao::corner_light;
pub use bitmatrix::BitMatrix;
pub use cull::{FacePlanes, cull};
pub use emit::{PackedVertex, Quad, QuadSink, pack_vertex, unpack_vertex};
pub use face::{Face, plane_to_xyz, xyz_to_plane};
pub use greedy::greedy_mesh;
pub use mesh::ChunkMesh;
pub use naive::naive_mesh;
pub use render_buffer::{RENDER_BUFFER_WORDS, RenderBuffer};
pub use transpose::transpose64;

/// Everything a mesher may read for one chunk.
#[derive(Clone, Copy)]
pub struct MeshInput<'a> {
    pub voxels: &'a VoxelGrid,
    pub bits: &'a BitMatrix,
    pub light: &'a LightField,
}

/// Interchangeable chunk meshing strategy.
pub trait Mesher: Send + Sync {
    fn name(&self) -> &'static str;
    fn build_into(&self, input: MeshInput<'_>, out: &mut ChunkMesh);

    fn build(&self, input: MeshInput<'_>) -> ChunkMesh {
        let mut out = ChunkMesh::new();
        self.build_into(input, &mut out);
        out
    }
}

/// Cull, transpose, then greedy-merge. The face planes are scratch and dropped on return.
#[derive(Default, Debug, Clone, Copy)]
pub struct BinaryGreedyMesher;

impl Mesher for BinaryGreedyMesher {
    fn name(&self) -> &'static str {
        "greedy"
    }

    fn build_into(&self, input: MeshInput<'_>, out: &mut ChunkMesh) {
        out.clear();
        let mut planes = cull(input.bits);
        planes.transpose();
        greedy_mesh(&mut planes, input.light, out);
        log::trace!(target: "mesh", "greedy: {} quads", out.quad_count());
    }
}

#[derive(Default, Debug, Clone, Copy)]
pub struct NaiveMesher;

impl Mesher for NaiveMesher {
    fn name(&self) -> &'static str {
        "naive"
    }

    fn build_into(&self, input: MeshInput<'_>, out: &mut ChunkMesh) {
        out.clear();
        naive_mesh(input.voxels, input.light, out);
        log::trace!(target: "mesh", "naive: {} quads", out.quad_count());
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MesherKind {
    #[default]
    Greedy,
    Naive,
}

impl MesherKind {
    pub fn build(self) -> Arc<dyn Mesher> {
        match self {
            MesherKind::Greedy => Arc::new(BinaryGreedyMesher),
            MesherKind::Naive => Arc::new(NaiveMesher),
        }
    }
}

impl FromStr for MesherKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "greedy" => Ok(MesherKind::Greedy),
            "naive" => Ok(MesherKind::Naive),
            other => Err(format!("unknown mesher '{other}' (expected greedy or naive)")),
        }
    }
}
