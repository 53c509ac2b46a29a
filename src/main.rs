//! Headless driver: streams terrain chunks around the origin through the engine and
//! reports meshing results.
#![forbid(unsafe_code)]

mod config;

use std::error::Error;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

use bitvox_chunk::{ChunkCoord, ChunkState, ChunkStore, MemoryStore, NullStore};
use bitvox_geom::IVec3;
use bitvox_mesh_cpu::MesherKind;
use bitvox_runtime::{ChunkUpdated, Engine};
use bitvox_world::TerrainGenerator;
use clap::Parser;

use crate::config::load_config_from_path;

#[derive(Parser, Debug)]
#[command(name = "bitvox", about = "Voxel chunk meshing and lighting engine")]
struct Args {
    /// TOML config; missing file means defaults
    #[arg(long, default_value = "bitvox.toml")]
    config: PathBuf,
    /// Chunk radius to load around the origin (overrides config)
    #[arg(long)]
    radius: Option<i32>,
    /// greedy or naive (overrides config)
    #[arg(long)]
    mesher: Option<MesherKind>,
    #[arg(long)]
    seed: Option<i32>,
    #[arg(long)]
    workers: Option<usize>,
    #[arg(long, default_value_t = 100_000)]
    max_ticks: u64,
    /// Dig a shaft and build a tower after loading, then reload the edited chunk
    #[arg(long)]
    edit_demo: bool,
}

fn main() -> Result<(), Box<dyn Error>> {
    let mut log_builder = env_logger::Builder::new();
    log_builder
        .target(env_logger::Target::Stdout)
        .filter_level(log::LevelFilter::Info)
        .parse_env("RUST_LOG")
        .init();

    let args = Args::parse();
    let mut cfg = load_config_from_path(&args.config)?;
    if let Some(r) = args.radius {
        cfg.engine.world_radius = r;
    }
    if let Some(m) = args.mesher {
        cfg.engine.mesher = m;
    }
    if let Some(s) = args.seed {
        cfg.terrain.seed = s;
    }
    if let Some(w) = args.workers {
        cfg.engine.worker_threads = w;
    }

    let terrain = Arc::new(TerrainGenerator::new(cfg.terrain.clone()));
    let store: Arc<dyn ChunkStore> = if args.edit_demo {
        Arc::new(MemoryStore::new())
    } else {
        Arc::new(NullStore)
    };
    let radius = cfg.engine.world_radius;
    let mut engine = Engine::new(cfg.engine.clone(), terrain.clone(), store)?;

    let quads = Arc::new(AtomicUsize::new(0));
    let meshed = Arc::new(AtomicUsize::new(0));
    {
        let (quads, meshed) = (Arc::clone(&quads), Arc::clone(&meshed));
        engine.subscribe(move |u: &ChunkUpdated| {
            if let Some(mesh) = &u.mesh {
                quads.fetch_add(mesh.quad_count(), Ordering::Relaxed);
                meshed.fetch_add(1, Ordering::Relaxed);
            }
        });
    }

    let origin = ChunkCoord::new(0, 0, 0);
    let t0 = Instant::now();
    let requested = engine.request_radius(origin, radius);
    log::info!("requested {} chunks within radius {}", requested, radius);
    if !engine.run_until_idle(args.max_ticks) {
        log::warn!("engine still busy after {} ticks", args.max_ticks);
    }
    let ms: u32 = t0.elapsed().as_millis().min(u128::from(u32::MAX)) as u32;
    let settled = engine
        .loaded_coords()
        .into_iter()
        .filter(|&c| engine.state(c).is_some_and(ChunkState::is_settled))
        .count();
    log::info!(
        "loaded {} chunks ({} settled) in {}ms: {} meshed, {} quads",
        engine.loaded_chunks(),
        settled,
        ms,
        meshed.load(Ordering::Relaxed),
        quads.load(Ordering::Relaxed)
    );

    if args.edit_demo {
        run_edit_demo(&mut engine, &terrain, args.max_ticks)?;
    }
    Ok(())
}

fn run_edit_demo(
    engine: &mut Engine,
    terrain: &TerrainGenerator,
    max_ticks: u64,
) -> Result<(), Box<dyn Error>> {
    let (x, z) = (61, 20);
    let surface = terrain.height_at(x, z).floor() as i32;
    for y in (surface - 6)..=surface {
        engine.remove_voxel(IVec3::new(x, y, z))?;
    }
    let bottom = IVec3::new(x, surface - 6, z);
    log::info!(
        "dug shaft at ({}, {}), light at bottom {:?}",
        x,
        z,
        engine.light_at(bottom)
    );
    for y in (surface + 1)..=(surface + 8) {
        engine.add_voxel(IVec3::new(x, y, z), 2)?;
    }
    engine.run_until_idle(max_ticks);
    let stats = engine.edits().stats();
    log::info!(
        "edit store: {} edits in {} chunks, {} revision stamps",
        stats.voxel_edits,
        stats.chunk_entries,
        stats.rev_entries
    );

    let owner = bitvox_chunk::world_to_chunk(bottom);
    engine.unload_chunk(owner);
    engine.request_chunk(owner);
    engine.run_until_idle(max_ticks);
    log::info!(
        "reloaded {}: voxel at tower top = {:?}, state {:?}",
        owner,
        engine.voxel_at(IVec3::new(x, surface + 8, z)),
        engine.state(owner)
    );
    Ok(())
}

#[cfg(test)]
mod tests;
