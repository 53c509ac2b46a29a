use std::collections::VecDeque;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use bitvox_chunk::{
    ChunkCoord, ChunkState, ChunkStore, StateCell, VoxelGrid, VoxelSource, world_to_local,
};
use bitvox_edit::{EditStore, footprint};
use bitvox_geom::IVec3;
use bitvox_lighting::LightField;
use bitvox_mesh_cpu::{ChunkMesh, RenderBuffer};
use crossbeam_channel::{Receiver, Sender, unbounded};
use hashbrown::{HashMap, HashSet};

use crate::config::EngineConfig;
use crate::error::{EditError, EngineError, JobError};
use crate::graph::JobGraph;
use crate::pipeline::{self, BuildInput, BuildKind, BuildRequest, ChunkBuildOutput, PipelineContext, StageTimings};
use crate::scheduler::JobScheduler;
use crate::scratch::ScratchPool;

/// Fired on the tick thread after a chunk build is finalized.
#[derive(Clone, Debug)]
pub struct ChunkUpdated {
    pub coord: ChunkCoord,
    pub kind: BuildKind,
    pub state: ChunkState,
    pub rev: u64,
    pub mesh: Option<Arc<ChunkMesh>>,
    pub timings: StageTimings,
}

pub type ObserverId = u64;

type Observer = Box<dyn FnMut(&ChunkUpdated) + Send>;

#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickStats {
    pub tick: u64,
    pub generations_started: usize,
    pub refreshes_started: usize,
    pub finalized: usize,
    pub in_flight: usize,
    pub queued: usize,
}

struct ChunkEntry {
    state: Arc<StateCell>,
    voxels: Option<Arc<VoxelGrid>>,
    light: Option<Arc<LightField>>,
    render: Option<Arc<RenderBuffer>>,
    mesh: Option<Arc<ChunkMesh>>,
    // id of the build whose result this entry accepts
    job: Option<u64>,
    queued: bool,
    from_store: bool,
}

impl ChunkEntry {
    fn queued() -> Self {
        Self {
            state: Arc::new(StateCell::default()),
            voxels: None,
            light: None,
            render: None,
            mesh: None,
            job: None,
            queued: true,
            from_store: false,
        }
    }
}

struct Finished {
    coord: ChunkCoord,
    job_id: u64,
    kind: BuildKind,
    result: Result<ChunkBuildOutput, JobError>,
}

/// Owns loaded chunks and drives their builds, edits and observers from one tick thread.
pub struct Engine {
    cfg: EngineConfig,
    graph: JobGraph,
    scheduler: JobScheduler,
    ctx: PipelineContext,
    chunks: HashMap<ChunkCoord, ChunkEntry>,
    load_queue: VecDeque<ChunkCoord>,
    dirty: HashSet<ChunkCoord>,
    edits: EditStore,
    done_tx: Sender<Finished>,
    done_rx: Receiver<Finished>,
    observers: Vec<(ObserverId, Observer)>,
    next_observer: ObserverId,
    next_job: u64,
    in_flight: usize,
    ticks: u64,
}

impl Engine {
    pub fn new(
        cfg: EngineConfig,
        source: Arc<dyn VoxelSource>,
        store: Arc<dyn ChunkStore>,
    ) -> Result<Self, EngineError> {
        let workers = cfg.resolved_workers();
        let graph = JobGraph::new(workers)?;
        let (done_tx, done_rx) = unbounded();
        let ctx = PipelineContext {
            source,
            store,
            mesher: cfg.mesher.build(),
            bits_pool: ScratchPool::new(workers * 2),
        };
        log::info!(
            target: "pipeline",
            "engine up: {} workers, {} mesher, {} generations per tick",
            workers,
            ctx.mesher.name(),
            cfg.max_jobs_per_tick
        );
        Ok(Self {
            cfg,
            graph,
            scheduler: JobScheduler::new(),
            ctx,
            chunks: HashMap::new(),
            load_queue: VecDeque::new(),
            dirty: HashSet::new(),
            edits: EditStore::new(),
            done_tx,
            done_rx,
            observers: Vec::new(),
            next_observer: 1,
            next_job: 0,
            in_flight: 0,
            ticks: 0,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.cfg
    }

    pub fn worker_threads(&self) -> usize {
        self.graph.threads()
    }

    // ---- loading ----

    /// Queues a chunk for generation. Returns false if it is already known.
    pub fn request_chunk(&mut self, coord: ChunkCoord) -> bool {
        if self.chunks.contains_key(&coord) {
            return false;
        }
        self.chunks.insert(coord, ChunkEntry::queued());
        self.load_queue.push_back(coord);
        true
    }

    /// Queues every chunk within `radius` of `center`, nearest first.
    pub fn request_radius(&mut self, center: ChunkCoord, radius: i32) -> usize {
        center
            .sphere(radius)
            .into_iter()
            .filter(|&c| self.request_chunk(c))
            .count()
    }

    /// Drops a chunk, handing its voxels to the store. In-flight results for it are discarded.
    pub fn unload_chunk(&mut self, coord: ChunkCoord) -> bool {
        let Some(entry) = self.chunks.remove(&coord) else {
            return false;
        };
        self.dirty.remove(&coord);
        if entry.queued {
            self.load_queue.retain(|c| *c != coord);
        }
        self.edits.forget_built(coord);
        if let Some(voxels) = &entry.voxels {
            if self.ctx.store.serialize(coord, voxels) {
                log::debug!(target: "pipeline", "stored {}", coord);
            } else {
                log::debug!(target: "pipeline", "{} not persisted", coord);
            }
        }
        log::info!(target: "pipeline", "unloaded {}", coord);
        true
    }

    // ---- ticking ----

    /// Starts queued generations (throttled) and pending refreshes, then drains finished
    /// builds. Never blocks on unfinished work.
    pub fn tick(&mut self) -> TickStats {
        self.ticks += 1;
        let mut stats = TickStats {
            tick: self.ticks,
            ..TickStats::default()
        };

        while stats.generations_started < self.cfg.max_jobs_per_tick.max(1) {
            let Some(coord) = self.load_queue.pop_front() else {
                break;
            };
            let queued = self
                .chunks
                .get_mut(&coord)
                .map(|e| std::mem::replace(&mut e.queued, false))
                .unwrap_or(false);
            if queued && self.launch(coord, BuildKind::Generate) {
                stats.generations_started += 1;
            }
        }

        let dirty: Vec<ChunkCoord> = self.dirty.iter().copied().collect();
        for coord in dirty {
            let Some(entry) = self.chunks.get(&coord) else {
                self.dirty.remove(&coord);
                continue;
            };
            if entry.job.is_some() {
                // retried after the running build lands
                continue;
            }
            self.dirty.remove(&coord);
            if self.edits.needs_rebuild(coord) && self.launch(coord, BuildKind::Refresh) {
                stats.refreshes_started += 1;
            }
        }

        stats.finalized = self.scheduler.tick();
        let finished: Vec<Finished> = self.done_rx.try_iter().collect();
        for f in finished {
            self.finalize(f);
        }

        stats.in_flight = self.in_flight;
        stats.queued = self.load_queue.len();
        if stats.generations_started + stats.refreshes_started + stats.finalized > 0 {
            log::debug!(
                target: "scheduler",
                "tick {}: +{} gen +{} refresh, {} finalized, {} in flight, {} queued",
                stats.tick,
                stats.generations_started,
                stats.refreshes_started,
                stats.finalized,
                stats.in_flight,
                stats.queued
            );
        }
        stats
    }

    pub fn is_idle(&self) -> bool {
        self.load_queue.is_empty()
            && self.in_flight == 0
            && self.dirty.is_empty()
            && self.scheduler.is_empty()
    }

    /// Ticks until idle or `max_ticks` elapse. Returns whether the engine went idle.
    pub fn run_until_idle(&mut self, max_ticks: u64) -> bool {
        for _ in 0..max_ticks {
            let stats = self.tick();
            if self.is_idle() {
                return true;
            }
            if stats.generations_started + stats.refreshes_started + stats.finalized == 0 {
                thread::sleep(Duration::from_millis(1));
            }
        }
        self.is_idle()
    }

    fn launch(&mut self, coord: ChunkCoord, kind: BuildKind) -> bool {
        let Some(entry) = self.chunks.get_mut(&coord) else {
            return false;
        };
        let input = match kind {
            BuildKind::Generate => BuildInput::Generate {
                edits: self.edits.snapshot_for_chunk(coord),
            },
            BuildKind::Refresh => match &entry.voxels {
                Some(voxels) => BuildInput::Refresh {
                    voxels: Arc::clone(voxels),
                    light: entry.light.clone(),
                },
                None => return false,
            },
        };
        let rev = self.edits.get_rev(coord);
        self.next_job += 1;
        let job_id = self.next_job;
        entry.job = Some(job_id);

        let req = BuildRequest {
            coord,
            rev,
            input,
            state: Arc::clone(&entry.state),
        };
        let handle = pipeline::launch(&self.graph, &self.ctx, req);
        let tx = self.done_tx.clone();
        self.scheduler.schedule(handle, move |result| {
            let _ = tx.send(Finished {
                coord,
                job_id,
                kind,
                result,
            });
        });
        self.in_flight += 1;
        log::debug!(target: "pipeline", "{:?} {} started at rev {}", kind, coord, rev);
        true
    }

    fn finalize(&mut self, f: Finished) {
        self.in_flight = self.in_flight.saturating_sub(1);
        let Some(entry) = self.chunks.get_mut(&f.coord) else {
            log::debug!(target: "pipeline", "dropping result for unloaded {}", f.coord);
            return;
        };
        if entry.job != Some(f.job_id) {
            log::debug!(target: "pipeline", "dropping superseded result for {}", f.coord);
            return;
        }
        entry.job = None;

        let out = match f.result {
            Ok(out) => out,
            Err(e) => {
                log::warn!(target: "pipeline", "{:?} of {} failed: {}", f.kind, f.coord, e);
                return;
            }
        };

        let stale = out.rev < self.edits.get_rev(f.coord);
        match out.kind {
            BuildKind::Generate => {
                let mut voxels = out.voxels;
                entry.from_store = out.from_store;
                if stale {
                    // Edits reached this chunk while it generated.
                    self.edits.apply_to(f.coord, Arc::make_mut(&mut voxels));
                    entry.voxels = Some(voxels);
                    self.dirty.insert(f.coord);
                    return;
                }
                entry.voxels = Some(voxels);
            }
            BuildKind::Refresh if stale => {
                self.dirty.insert(f.coord);
                return;
            }
            BuildKind::Refresh => {}
        }

        entry.light = out.light;
        entry.render = out.render_buffer;
        entry.mesh = out.mesh;
        self.edits.mark_built(f.coord, out.rev);
        if entry.mesh.is_some() {
            entry.state.advance(ChunkState::FullyRendered);
        }

        let update = ChunkUpdated {
            coord: f.coord,
            kind: out.kind,
            state: entry.state.get(),
            rev: out.rev,
            mesh: entry.mesh.clone(),
            timings: out.timings,
        };
        log::info!(
            target: "pipeline",
            "{:?} {} -> {:?}, {} quads{} in {}ms",
            update.kind,
            update.coord,
            update.state,
            update.mesh.as_ref().map_or(0, |m| m.quad_count()),
            if entry.from_store { " (stored)" } else { "" },
            update.timings.total_ms()
        );
        for (_, observer) in self.observers.iter_mut() {
            observer(&update);
        }
    }

    // ---- edits ----

    pub fn add_voxel(&mut self, p: IVec3, material: u8) -> Result<(), EditError> {
        if material == 0 {
            return Err(EditError::EmptyMaterial);
        }
        self.apply_edit(p, material)
    }

    pub fn remove_voxel(&mut self, p: IVec3) -> Result<(), EditError> {
        self.apply_edit(p, 0)
    }

    /// Writes the owner's cell and every loaded neighbour's halo copy, updates the owner's
    /// light incrementally and marks each touched chunk for refresh. Neighbours that are
    /// missing or still generating are skipped; the edit store replays into them later.
    fn apply_edit(&mut self, p: IVec3, id: u8) -> Result<(), EditError> {
        let (owner, _) = world_to_local(p);
        match self.chunks.get(&owner) {
            None => return Err(EditError::ChunkNotLoaded(owner)),
            Some(e) if e.voxels.is_none() => return Err(EditError::ChunkNotReady(owner)),
            Some(_) => {}
        }

        self.edits.set(p, id);
        let rev = self.edits.bump_region_around(p);
        let mut touched = 0;
        for f in footprint(p) {
            let Some(entry) = self.chunks.get_mut(&f.coord) else {
                continue;
            };
            let Some(voxels) = entry.voxels.as_mut() else {
                continue;
            };
            let (x, y, z) = f.local;
            let grid = Arc::make_mut(voxels);
            let was_solid = grid.is_solid(x, y, z);
            grid.set(x, y, z, id);
            if !f.is_halo() && was_solid != (id != 0) {
                if let Some(light) = entry.light.as_mut() {
                    let light = Arc::make_mut(light);
                    if id == 0 {
                        light.remove_voxel(grid, x, y, z);
                    } else {
                        light.add_voxel(grid, x, y, z);
                    }
                }
            }
            self.dirty.insert(f.coord);
            touched += 1;
        }
        log::info!(
            target: "edits",
            "set {:?} = {} in {} (rev {}, {} chunks touched)",
            p,
            id,
            owner,
            rev,
            touched
        );
        Ok(())
    }

    pub fn edits(&self) -> &EditStore {
        &self.edits
    }

    // ---- observers ----

    pub fn subscribe<F>(&mut self, observer: F) -> ObserverId
    where
        F: FnMut(&ChunkUpdated) + Send + 'static,
    {
        let id = self.next_observer;
        self.next_observer += 1;
        self.observers.push((id, Box::new(observer)));
        id
    }

    pub fn unsubscribe(&mut self, id: ObserverId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(oid, _)| *oid != id);
        self.observers.len() != before
    }

    // ---- queries ----

    pub fn voxel_at(&self, p: IVec3) -> Option<u8> {
        let (coord, (x, y, z)) = world_to_local(p);
        let voxels = self.chunks.get(&coord)?.voxels.as_ref()?;
        Some(voxels.get(x, y, z))
    }

    /// The chunk's padded grid, halo included.
    pub fn voxels(&self, coord: ChunkCoord) -> Option<Arc<VoxelGrid>> {
        self.chunks.get(&coord)?.voxels.clone()
    }

    pub fn light_at(&self, p: IVec3) -> Option<u8> {
        let (coord, (x, y, z)) = world_to_local(p);
        let light = self.chunks.get(&coord)?.light.as_ref()?;
        Some(light.get(x, y, z))
    }

    pub fn state(&self, coord: ChunkCoord) -> Option<ChunkState> {
        self.chunks.get(&coord).map(|e| e.state.get())
    }

    pub fn mesh(&self, coord: ChunkCoord) -> Option<Arc<ChunkMesh>> {
        self.chunks.get(&coord)?.mesh.clone()
    }

    pub fn render_buffer(&self, coord: ChunkCoord) -> Option<Arc<RenderBuffer>> {
        self.chunks.get(&coord)?.render.clone()
    }

    pub fn loaded_chunks(&self) -> usize {
        self.chunks.len()
    }

    pub fn loaded_coords(&self) -> Vec<ChunkCoord> {
        let mut v: Vec<ChunkCoord> = self.chunks.keys().copied().collect();
        v.sort();
        v
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("chunks", &self.chunks.len())
            .field("queued", &self.load_queue.len())
            .field("in_flight", &self.in_flight)
            .field("ticks", &self.ticks)
            .finish()
    }
}
