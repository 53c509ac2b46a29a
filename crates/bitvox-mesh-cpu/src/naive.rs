use bitvox_chunk::{INTERIOR_MAX, INTERIOR_MIN, VoxelGrid};
use bitvox_lighting::LightField;

use crate::ao::corner_light;
use crate::emit::{Quad, QuadSink};
use crate::face::{Face, xyz_to_plane};

/// One unit quad per exposed voxel face, no merging.
pub fn naive_mesh(voxels: &VoxelGrid, light: &LightField, sink: &mut impl QuadSink) {
    for z in INTERIOR_MIN..=INTERIOR_MAX {
        for y in INTERIOR_MIN..=INTERIOR_MAX {
            for x in INTERIOR_MIN..=INTERIOR_MAX {
                if !voxels.is_solid(x, y, z) {
                    continue;
                }
                for face in Face::ALL {
                    let (dx, dy, dz) = face.delta();
                    if voxels.is_solid_i(x as i32 + dx, y as i32 + dy, z as i32 + dz) {
                        continue;
                    }
                    let (k, u, v) = xyz_to_plane(face.axis(), x, y, z);
                    let ao = corner_light(light, face, k, u, v);
                    sink.push_quad(Quad::from_grid(face, k, u, v, 1, 1, ao));
                }
            }
        }
    }
}
