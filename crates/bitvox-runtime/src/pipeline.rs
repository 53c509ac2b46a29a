//! Per-chunk build graph:
//! `FillVoxels -> {BuildBitMatrix, BuildRenderBuffer, PropagateLight} -> GenerateMesh -> join`.
//! A refresh starts from a pre-completed fill handle holding the edited voxels.

use std::sync::Arc;
use std::time::Instant;

use bitvox_chunk::{
    ChunkCoord, ChunkState, ChunkStore, Occupancy, StateCell, VoxelGrid, VoxelSource,
};
use bitvox_lighting::LightField;
use bitvox_mesh_cpu::{BitMatrix, ChunkMesh, MeshInput, Mesher, RenderBuffer};

use crate::graph::{JobGraph, JobHandle};
use crate::scratch::{Pooled, ScratchPool};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BuildKind {
    Generate,
    Refresh,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct StageTimings {
    pub fill_ms: u32,
    pub bits_ms: u32,
    pub render_ms: u32,
    pub light_ms: u32,
    pub mesh_ms: u32,
}

impl StageTimings {
    pub fn total_ms(&self) -> u32 {
        self.fill_ms + self.bits_ms + self.render_ms + self.light_ms + self.mesh_ms
    }
}

#[inline]
fn elapsed_ms(t0: Instant) -> u32 {
    t0.elapsed().as_millis().min(u128::from(u32::MAX)) as u32
}

pub enum BuildInput {
    /// Fill from the store or the voxel source, then replay recorded edits.
    Generate {
        edits: Vec<((usize, usize, usize), u8)>,
    },
    /// Rebuild from voxels already edited in place. `light` is reused when present.
    Refresh {
        voxels: Arc<VoxelGrid>,
        light: Option<Arc<LightField>>,
    },
}

pub struct BuildRequest {
    pub coord: ChunkCoord,
    pub rev: u64,
    pub input: BuildInput,
    pub state: Arc<StateCell>,
}

impl BuildRequest {
    pub fn kind(&self) -> BuildKind {
        match self.input {
            BuildInput::Generate { .. } => BuildKind::Generate,
            BuildInput::Refresh { .. } => BuildKind::Refresh,
        }
    }
}

/// Collaborators shared by every build.
#[derive(Clone)]
pub struct PipelineContext {
    pub source: Arc<dyn VoxelSource>,
    pub store: Arc<dyn ChunkStore>,
    pub mesher: Arc<dyn Mesher>,
    pub bits_pool: Arc<ScratchPool<BitMatrix>>,
}

#[derive(Clone, Debug)]
pub struct ChunkBuildOutput {
    pub coord: ChunkCoord,
    pub rev: u64,
    pub kind: BuildKind,
    pub occupancy: Occupancy,
    pub from_store: bool,
    pub voxels: Arc<VoxelGrid>,
    pub light: Option<Arc<LightField>>,
    pub render_buffer: Option<Arc<RenderBuffer>>,
    pub mesh: Option<Arc<ChunkMesh>>,
    pub timings: StageTimings,
}

#[derive(Clone)]
struct Filled {
    voxels: Arc<VoxelGrid>,
    occupancy: Occupancy,
    from_store: bool,
    ms: u32,
}

/// A stage's product; `None` when the chunk is uniform and the stage had nothing to do.
#[derive(Clone)]
struct Stage<T> {
    value: Option<T>,
    ms: u32,
}

impl<T> Stage<T> {
    fn skipped() -> Self {
        Self { value: None, ms: 0 }
    }
}

/// Mesh stage product; carries the bit-matrix time since the matrix itself is consumed.
struct Meshed {
    mesh: Stage<Arc<ChunkMesh>>,
    bits_ms: u32,
}

fn fill_voxels(
    coord: ChunkCoord,
    source: &dyn VoxelSource,
    store: &dyn ChunkStore,
    edits: &[((usize, usize, usize), u8)],
    state: &StateCell,
) -> Filled {
    let t0 = Instant::now();
    let mut loaded = None;
    if store.is_chunk_serialized(coord) {
        loaded = store.deserialize(coord);
        if loaded.is_none() {
            log::warn!(target: "pipeline", "chunk {} is marked serialized but failed to load; regenerating", coord);
        }
    }
    let from_store = loaded.is_some();
    let (mut voxels, mut occupancy) = match loaded {
        Some(v) => {
            let occ = v.occupancy();
            (v, occ)
        }
        None => {
            let mut v = VoxelGrid::new();
            let occ = source.fill(coord, &mut v);
            (v, occ)
        }
    };
    if !edits.is_empty() {
        for &((x, y, z), id) in edits {
            voxels.set(x, y, z, id);
        }
        occupancy = voxels.occupancy();
    }
    if occupancy.is_uniform() {
        state.set(ChunkState::Skipped);
    }
    Filled {
        voxels: Arc::new(voxels),
        occupancy,
        from_store,
        ms: elapsed_ms(t0),
    }
}

/// Wires one chunk's build graph and returns the handle of its final join.
pub fn launch(graph: &JobGraph, ctx: &PipelineContext, req: BuildRequest) -> JobHandle<ChunkBuildOutput> {
    let kind = req.kind();
    let BuildRequest {
        coord,
        rev,
        input,
        state,
    } = req;

    let (fill, reuse_light) = match input {
        BuildInput::Generate { edits } => {
            let source = Arc::clone(&ctx.source);
            let store = Arc::clone(&ctx.store);
            let state = Arc::clone(&state);
            let fill = graph.spawn(move || {
                fill_voxels(coord, source.as_ref(), store.as_ref(), &edits, &state)
            });
            (fill, None)
        }
        BuildInput::Refresh { voxels, light } => {
            let occupancy = voxels.occupancy();
            if occupancy.is_uniform() {
                state.set(ChunkState::Skipped);
            }
            let filled = Filled {
                voxels,
                occupancy,
                from_store: false,
                ms: 0,
            };
            (graph.completed(filled), light)
        }
    };

    let bits: JobHandle<Stage<Pooled<BitMatrix>>> = {
        let fill = fill.clone();
        let pool = Arc::clone(&ctx.bits_pool);
        graph.spawn_after(&[fill.token()], move || {
            let filled = fill.input()?;
            if filled.occupancy.is_uniform() {
                return Ok(Stage::skipped());
            }
            let t0 = Instant::now();
            let mut bits = pool.acquire(BitMatrix::new);
            bits.rebuild(&filled.voxels);
            Ok(Stage {
                value: Some(bits),
                ms: elapsed_ms(t0),
            })
        })
    };

    let render: JobHandle<Stage<Arc<RenderBuffer>>> = {
        let fill = fill.clone();
        graph.spawn_after(&[fill.token()], move || {
            let filled = fill.input()?;
            if filled.occupancy.is_uniform() {
                return Ok(Stage::skipped());
            }
            let t0 = Instant::now();
            let rb = RenderBuffer::from_voxels(&filled.voxels);
            Ok(Stage {
                value: Some(Arc::new(rb)),
                ms: elapsed_ms(t0),
            })
        })
    };

    let light: JobHandle<Stage<Arc<LightField>>> = {
        let fill = fill.clone();
        let state = Arc::clone(&state);
        graph.spawn_after(&[fill.token()], move || {
            let filled = fill.input()?;
            if filled.occupancy.is_uniform() {
                return Ok(Stage::skipped());
            }
            let t0 = Instant::now();
            let light = match reuse_light {
                Some(l) => l,
                None => Arc::new(LightField::compute(&filled.voxels)),
            };
            state.advance(ChunkState::LocalLightComputed);
            Ok(Stage {
                value: Some(light),
                ms: elapsed_ms(t0),
            })
        })
    };

    let mesh: JobHandle<Meshed> = {
        let (fill, bits, light) = (fill.clone(), bits.clone(), light.clone());
        let mesher = Arc::clone(&ctx.mesher);
        let state = Arc::clone(&state);
        let deps = [fill.token(), bits.token(), light.token()];
        graph.spawn_after(&deps, move || {
            let filled = fill.input()?;
            let bits = bits.take_input()?;
            let light = light.input()?;
            let bits_ms = bits.ms;
            let (Some(bits), Some(light)) = (bits.value, light.value) else {
                return Ok(Meshed {
                    mesh: Stage::skipped(),
                    bits_ms,
                });
            };
            state.advance(ChunkState::LightFullyComputed);
            let t0 = Instant::now();
            let mesh = mesher.build(MeshInput {
                voxels: &filled.voxels,
                bits: &bits,
                light: &light,
            });
            // the bit matrix goes back to the pool here
            drop(bits);
            Ok(Meshed {
                mesh: Stage {
                    value: Some(Arc::new(mesh)),
                    ms: elapsed_ms(t0),
                },
                bits_ms,
            })
        })
    };

    let deps = [fill.token(), render.token(), light.token(), mesh.token()];
    graph.spawn_after(&deps, move || {
        let filled = fill.input()?;
        let render = render.input()?;
        let light = light.input()?;
        let Meshed { mesh, bits_ms } = mesh.take_input()?;
        let timings = StageTimings {
            fill_ms: filled.ms,
            bits_ms,
            render_ms: render.ms,
            light_ms: light.ms,
            mesh_ms: mesh.ms,
        };
        log::debug!(
            target: "pipeline",
            "{:?} {} timings fill={}ms bits={}ms render={}ms light={}ms mesh={}ms",
            kind, coord, timings.fill_ms, timings.bits_ms, timings.render_ms, timings.light_ms, timings.mesh_ms
        );
        Ok(ChunkBuildOutput {
            coord,
            rev,
            kind,
            occupancy: filled.occupancy,
            from_store: filled.from_store,
            voxels: filled.voxels,
            light: light.value,
            render_buffer: render.value,
            mesh: mesh.value,
            timings,
        })
    })
}
