use super::*;
use bitvox_geom::IVec3;

#[test]
fn occupancy_of_uniform_and_mixed_grids() {
    assert_eq!(VoxelGrid::new().occupancy(), Occupancy::Empty);
    assert_eq!(VoxelGrid::filled(3).occupancy(), Occupancy::Solid);
    let mut g = VoxelGrid::new();
    g.set(0, 0, 0, 1);
    assert_eq!(g.occupancy(), Occupancy::Mixed);
    assert!(!g.occupancy().is_uniform());
    // halo counts too
    let mut g = VoxelGrid::filled(1);
    g.set(63, 63, 63, EMPTY);
    assert_eq!(g.occupancy(), Occupancy::Mixed);
}

#[test]
fn signed_solidity_reads_outside_as_empty() {
    let g = VoxelGrid::filled(1);
    assert!(g.is_solid_i(0, 0, 0));
    assert!(!g.is_solid_i(-1, 0, 0));
    assert!(!g.is_solid_i(0, 64, 0));
}

#[test]
fn from_cells_pads_short_input() {
    let g = VoxelGrid::from_cells(vec![7; 10]);
    assert_eq!(g.as_slice().len(), CHUNK_VOLUME);
    assert_eq!(g.get(9, 0, 0), 7);
    assert_eq!(g.get(10, 0, 0), EMPTY);
}

#[test]
fn state_cell_only_moves_forward() {
    let s = StateCell::default();
    assert_eq!(s.get(), ChunkState::Uninitialized);
    assert!(s.advance(ChunkState::LocalLightComputed));
    assert!(!s.advance(ChunkState::Skipped));
    assert_eq!(s.get(), ChunkState::LocalLightComputed);
    assert!(s.advance(ChunkState::FullyRendered));
    assert!(!s.advance(ChunkState::FullyRendered));
    assert!(s.get().is_settled());
    s.set(ChunkState::Skipped);
    assert_eq!(s.get(), ChunkState::Skipped);
}

#[test]
fn world_to_local_handles_negative_positions() {
    let (c, l) = world_to_local(IVec3::new(-1, 0, 61));
    assert_eq!(c, ChunkCoord::new(-1, 0, 0));
    assert_eq!(l, (62, 1, 62));
    let (c, l) = world_to_local(IVec3::new(62, -62, -63));
    assert_eq!(c, ChunkCoord::new(1, -1, -2));
    assert_eq!(l, (1, 1, 62));
}

#[test]
fn halo_cells_resolve_to_neighbour_interior() {
    let c = ChunkCoord::new(0, 0, 0);
    let w = local_to_world(c, 63, 5, 0);
    let (owner, l) = world_to_local(w);
    assert_eq!(owner, ChunkCoord::new(1, 0, -1));
    assert_eq!(l, (1, 5, 62));
}

#[test]
fn sphere_is_sorted_nearest_first() {
    let centre = ChunkCoord::new(2, 0, -1);
    let s = centre.sphere(1);
    assert_eq!(s.len(), 7);
    assert_eq!(s[0], centre);
    assert!(s.windows(2).all(|w| w[0].distance_sq(centre) <= w[1].distance_sq(centre)));
    assert_eq!(centre.sphere(0), vec![centre]);
}

#[test]
fn memory_store_round_trips_voxels() {
    let store = MemoryStore::new();
    let c = ChunkCoord::new(4, 0, 4);
    assert!(!store.is_chunk_serialized(c));
    let mut g = VoxelGrid::new();
    g.set(10, 20, 30, 9);
    assert!(store.serialize(c, &g));
    assert!(store.is_chunk_serialized(c));
    assert_eq!(store.deserialize(c), Some(g));
    assert_eq!(store.len(), 1);
    assert!(NullStore.deserialize(c).is_none());
    assert!(!NullStore.serialize(c, &VoxelGrid::new()));
}
