use criterion::{Criterion, black_box, criterion_group, criterion_main};
use std::time::Duration;

use bitvox_chunk::{CHUNK_SIZE, VoxelGrid};
use bitvox_lighting::LightField;
use bitvox_mesh_cpu::{BinaryGreedyMesher, BitMatrix, ChunkMesh, MeshInput, Mesher, NaiveMesher};

/// Rolling hills with a few caves, roughly what terrain chunks look like.
fn hills() -> VoxelGrid {
    let mut g = VoxelGrid::new();
    for z in 0..CHUNK_SIZE {
        for x in 0..CHUNK_SIZE {
            let fx = x as f32 * 0.15;
            let fz = z as f32 * 0.11;
            let h = 24.0 + 8.0 * fx.sin() + 6.0 * fz.cos();
            for y in 0..CHUNK_SIZE {
                let cave = (x / 8 + y / 6 + z / 8) % 5 == 0 && y < 18;
                if (y as f32) <= h && !cave {
                    g.set(x, y, z, 1 + (y % 3) as u8);
                }
            }
        }
    }
    g
}

fn bench_meshers(c: &mut Criterion) {
    let mut group = c.benchmark_group("mesh_hills");
    let voxels = hills();
    let light = LightField::compute(&voxels);
    let bits = BitMatrix::from_voxels(&voxels);
    let input = MeshInput { voxels: &voxels, bits: &bits, light: &light };
    let mut out = ChunkMesh::with_quad_capacity(8192);

    group.bench_function("greedy", |b| {
        b.iter(|| {
            BinaryGreedyMesher.build_into(black_box(input), &mut out);
            black_box(out.quad_count());
        })
    });
    group.bench_function("naive", |b| {
        b.iter(|| {
            NaiveMesher.build_into(black_box(input), &mut out);
            black_box(out.quad_count());
        })
    });
    group.finish();
}

fn bench_prepare(c: &mut Criterion) {
    let mut group = c.benchmark_group("prepare_hills");
    let voxels = hills();
    group.bench_function("bit_matrix", |b| b.iter(|| black_box(BitMatrix::from_voxels(&voxels))));
    group.bench_function("sun_light", |b| b.iter(|| black_box(LightField::compute(&voxels))));
    group.finish();
}

fn short_config() -> Criterion {
    Criterion::default()
        .measurement_time(Duration::from_secs(10))
        .warm_up_time(Duration::from_secs(2))
        .sample_size(30)
}

criterion_group! {
    name = benches;
    config = short_config();
    targets = bench_meshers, bench_prepare
}
criterion_main!(benches);
