use std::sync::{Arc, Mutex};

use bitvox_chunk::{
    CHUNK_SIZE, ChunkCoord, ChunkState, ChunkStore, MemoryStore, NullStore, Occupancy, VoxelGrid,
    VoxelSource,
};
use bitvox_geom::IVec3;
use bitvox_mesh_cpu::MesherKind;
use bitvox_runtime::{BuildKind, ChunkUpdated, EditError, Engine, EngineConfig};

const ORIGIN: ChunkCoord = ChunkCoord::new(0, 0, 0);

fn config() -> EngineConfig {
    EngineConfig {
        worker_threads: 2,
        ..EngineConfig::default()
    }
}

fn fill_with<F>(solid: F) -> Arc<dyn VoxelSource>
where
    F: Fn(ChunkCoord, i32, i32, i32) -> bool + Send + Sync + 'static,
{
    Arc::new(move |coord: ChunkCoord, v: &mut VoxelGrid| -> Occupancy {
        let o = coord.origin();
        for z in 0..CHUNK_SIZE {
            for y in 0..CHUNK_SIZE {
                for x in 0..CHUNK_SIZE {
                    let (wx, wy, wz) = (o.x + x as i32 - 1, o.y + y as i32 - 1, o.z + z as i32 - 1);
                    v.set(x, y, z, u8::from(solid(coord, wx, wy, wz)));
                }
            }
        }
        v.occupancy()
    })
}

/// Solid below world y = 30.
fn ground() -> Arc<dyn VoxelSource> {
    fill_with(|_, _, wy, _| wy < 30)
}

fn slab() -> Arc<dyn VoxelSource> {
    fill_with(|_, wx, wy, wz| wy == 0 && (9..=12).contains(&wx) && (9..=12).contains(&wz))
}

fn engine(source: Arc<dyn VoxelSource>) -> Engine {
    Engine::new(config(), source, Arc::new(NullStore)).unwrap()
}

fn record(engine: &mut Engine) -> Arc<Mutex<Vec<ChunkUpdated>>> {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    engine.subscribe(move |u: &ChunkUpdated| sink.lock().unwrap().push(u.clone()));
    seen
}

#[test]
fn slab_chunk_meshes_to_six_quads() {
    let mut e = engine(slab());
    let seen = record(&mut e);
    assert!(e.request_chunk(ORIGIN));
    assert!(!e.request_chunk(ORIGIN));
    assert!(e.run_until_idle(10_000));

    assert_eq!(e.state(ORIGIN), Some(ChunkState::FullyRendered));
    let mesh = e.mesh(ORIGIN).unwrap();
    assert_eq!(mesh.quad_count(), 6);
    assert_eq!(mesh.indices.len(), 36);
    assert_eq!(e.light_at(IVec3::new(10, 1, 10)), Some(15));
    assert_eq!(e.voxel_at(IVec3::new(10, 0, 10)), Some(1));
    assert!(e.render_buffer(ORIGIN).is_some());

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].kind, BuildKind::Generate);
    assert_eq!(seen[0].state, ChunkState::FullyRendered);
}

#[test]
fn naive_mesher_is_selected_by_config() {
    let cfg = EngineConfig {
        mesher: MesherKind::Naive,
        ..config()
    };
    let mut e = Engine::new(cfg, slab(), Arc::new(NullStore)).unwrap();
    e.request_chunk(ORIGIN);
    assert!(e.run_until_idle(10_000));
    // 16 top + 16 bottom + 4 sides of 4
    assert_eq!(e.mesh(ORIGIN).unwrap().quad_count(), 48);
}

#[test]
fn uniform_chunks_are_skipped() {
    let mut e = engine(ground());
    let below = ChunkCoord::new(0, -1, 0);
    let above = ChunkCoord::new(0, 1, 0);
    e.request_chunk(below);
    e.request_chunk(above);
    assert!(e.run_until_idle(10_000));
    assert_eq!(e.state(below), Some(ChunkState::Skipped));
    assert_eq!(e.state(above), Some(ChunkState::Skipped));
    assert!(e.mesh(below).is_none());
    assert_eq!(e.voxel_at(IVec3::new(5, -10, 5)), Some(1));
    assert_eq!(e.light_at(IVec3::new(5, 70, 5)), None);
}

#[test]
fn generations_are_throttled_per_tick() {
    let cfg = EngineConfig {
        max_jobs_per_tick: 1,
        ..config()
    };
    let mut e = Engine::new(cfg, ground(), Arc::new(NullStore)).unwrap();
    assert_eq!(e.request_radius(ORIGIN, 1), 7);
    let first = e.tick();
    assert_eq!(first.generations_started, 1);
    assert_eq!(first.queued, 6);
    assert!(e.run_until_idle(50_000));
    assert_eq!(e.loaded_chunks(), 7);
    let coords = e.loaded_coords();
    assert_eq!(coords.len(), 7);
    assert!(coords.windows(2).all(|w| w[0] < w[1]));
    assert!(coords.iter().all(|&c| e.state(c).is_some_and(ChunkState::is_settled)));
}

#[test]
fn digging_lets_sunlight_in() {
    let mut e = engine(ground());
    e.request_chunk(ORIGIN);
    assert!(e.run_until_idle(10_000));
    let before = e.mesh(ORIGIN).unwrap().quad_count();

    e.remove_voxel(IVec3::new(20, 29, 20)).unwrap();
    e.remove_voxel(IVec3::new(20, 28, 20)).unwrap();
    e.remove_voxel(IVec3::new(21, 28, 20)).unwrap();
    e.remove_voxel(IVec3::new(22, 28, 20)).unwrap();
    // incremental light is applied at edit time
    assert_eq!(e.light_at(IVec3::new(20, 29, 20)), Some(15));
    assert_eq!(e.light_at(IVec3::new(20, 28, 20)), Some(15));
    assert_eq!(e.light_at(IVec3::new(21, 28, 20)), Some(14));
    assert_eq!(e.light_at(IVec3::new(22, 28, 20)), Some(13));

    assert!(e.run_until_idle(10_000));
    assert_eq!(e.state(ORIGIN), Some(ChunkState::FullyRendered));
    assert_ne!(e.mesh(ORIGIN).unwrap().quad_count(), before);
    let rev = e.edits().get_rev(ORIGIN);
    assert!(rev >= 4);
    assert_eq!(e.edits().get_built_rev(ORIGIN), rev);

    // filling the hole back in restores the dark
    e.add_voxel(IVec3::new(20, 29, 20), 1).unwrap();
    assert_eq!(e.light_at(IVec3::new(22, 28, 20)), Some(0));
}

#[test]
fn edit_errors() {
    let mut e = engine(ground());
    assert_eq!(
        e.add_voxel(IVec3::new(1, 1, 1), 1),
        Err(EditError::ChunkNotLoaded(ORIGIN))
    );
    e.request_chunk(ORIGIN);
    assert_eq!(
        e.remove_voxel(IVec3::new(1, 1, 1)),
        Err(EditError::ChunkNotReady(ORIGIN))
    );
    assert_eq!(e.add_voxel(IVec3::new(1, 1, 1), 0), Err(EditError::EmptyMaterial));
}

#[test]
fn seam_edits_refresh_both_chunks() {
    let mut e = engine(ground());
    let east = ChunkCoord::new(1, 0, 0);
    e.request_chunk(ORIGIN);
    e.request_chunk(east);
    assert!(e.run_until_idle(10_000));
    let seen = record(&mut e);

    // world x = 61 is the last interior column of the origin chunk
    e.add_voxel(IVec3::new(61, 40, 5), 3).unwrap();
    assert_eq!(e.voxels(ORIGIN).unwrap().get(62, 41, 6), 3);
    assert_eq!(e.voxels(east).unwrap().get(0, 41, 6), 3);
    assert!(e.run_until_idle(10_000));

    let seen = seen.lock().unwrap();
    let mut refreshed: Vec<ChunkCoord> = seen
        .iter()
        .filter(|u| u.kind == BuildKind::Refresh)
        .map(|u| u.coord)
        .collect();
    refreshed.sort();
    refreshed.dedup();
    assert_eq!(refreshed, vec![ORIGIN, east]);
}

#[test]
fn edits_reach_neighbours_that_were_still_generating() {
    let (gate_tx, gate_rx) = crossbeam_channel::bounded::<()>(0);
    let east = ChunkCoord::new(1, 0, 0);
    let inner = ground();
    let source: Arc<dyn VoxelSource> = Arc::new(move |coord: ChunkCoord, v: &mut VoxelGrid| {
        if coord == east {
            let _ = gate_rx.recv();
        }
        inner.fill(coord, v)
    });
    let mut e = engine(source);
    e.request_chunk(ORIGIN);
    e.request_chunk(east);
    for _ in 0..10_000 {
        e.tick();
        if e.state(ORIGIN) == Some(ChunkState::FullyRendered) {
            break;
        }
        std::thread::sleep(std::time::Duration::from_millis(1));
    }
    assert_eq!(e.state(ORIGIN), Some(ChunkState::FullyRendered));
    assert!(e.voxels(east).is_none());

    e.add_voxel(IVec3::new(61, 40, 5), 3).unwrap();
    gate_tx.send(()).unwrap();
    assert!(e.run_until_idle(10_000));

    assert_eq!(e.voxels(east).unwrap().get(0, 41, 6), 3);
    assert_eq!(e.state(east), Some(ChunkState::FullyRendered));
    assert_eq!(e.edits().get_built_rev(east), e.edits().get_rev(east));
}

#[test]
fn unloaded_chunks_round_trip_through_the_store() {
    let store = Arc::new(MemoryStore::new());
    let mut e = Engine::new(config(), ground(), store.clone()).unwrap();
    e.request_chunk(ORIGIN);
    assert!(e.run_until_idle(10_000));
    e.add_voxel(IVec3::new(7, 35, 7), 2).unwrap();
    assert!(e.run_until_idle(10_000));

    assert!(e.unload_chunk(ORIGIN));
    assert!(!e.unload_chunk(ORIGIN));
    assert!(store.is_chunk_serialized(ORIGIN));
    assert_eq!(e.voxel_at(IVec3::new(7, 35, 7)), None);

    e.request_chunk(ORIGIN);
    assert!(e.run_until_idle(10_000));
    assert_eq!(e.voxel_at(IVec3::new(7, 35, 7)), Some(2));
    assert_eq!(e.state(ORIGIN), Some(ChunkState::FullyRendered));
}

#[test]
fn stored_voxels_replace_generation() {
    let store = Arc::new(MemoryStore::new());
    let far = ChunkCoord::new(5, 0, 0);
    let mut grid = VoxelGrid::new();
    grid.set(30, 30, 30, 9);
    assert!(store.serialize(far, &grid));

    let mut e = Engine::new(config(), fill_with(|_, _, _, _| false), store).unwrap();
    e.request_chunk(far);
    assert!(e.run_until_idle(10_000));
    assert_eq!(e.mesh(far).unwrap().quad_count(), 6);
    assert_eq!(e.render_buffer(far).unwrap().get(30, 30, 30), 9);
}

#[test]
fn unsubscribed_observers_stop_hearing_updates() {
    let mut e = engine(slab());
    let seen = record(&mut e);
    let extra = Arc::new(Mutex::new(0));
    let counter = Arc::clone(&extra);
    let id = e.subscribe(move |_: &ChunkUpdated| *counter.lock().unwrap() += 1);
    e.request_chunk(ORIGIN);
    assert!(e.run_until_idle(10_000));
    assert!(e.unsubscribe(id));
    assert!(!e.unsubscribe(id));

    e.add_voxel(IVec3::new(30, 30, 30), 1).unwrap();
    assert!(e.run_until_idle(10_000));
    assert_eq!(seen.lock().unwrap().len(), 2);
    assert_eq!(*extra.lock().unwrap(), 1);
}

#[test]
fn idle_engine_stays_idle() {
    let mut e = engine(slab());
    assert!(e.is_idle());
    let stats = e.tick();
    assert_eq!(stats.generations_started, 0);
    assert!(e.run_until_idle(1));
}
