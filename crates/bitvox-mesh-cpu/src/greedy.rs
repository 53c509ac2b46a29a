use bitvox_chunk::{INTERIOR_MAX, INTERIOR_MIN};
use bitvox_lighting::LightField;

use crate::ao::corner_light;
use crate::constants::{INTERIOR_BITS, S};
use crate::cull::FacePlanes;
use crate::emit::{Quad, QuadSink};
use crate::face::Face;

#[inline]
fn run_mask(start: usize, width: usize) -> u64 {
    ((1u64 << width) - 1) << start
}

/// Greedy merge over transposed, culled planes. Consumes the planes: every bit that ends up
/// in a quad is cleared.
///
/// Runs grow along `u` while the next bit is set and its corner light matches, then grow along
/// `v` while the next row holds the whole run and every cell in it has the same corner light.
pub fn greedy_mesh(planes: &mut FacePlanes, light: &LightField, sink: &mut impl QuadSink) {
    for face in Face::ALL {
        let plane = planes.face_mut(face);
        for k in INTERIOR_MIN..=INTERIOR_MAX {
            for v in INTERIOR_MIN..=INTERIOR_MAX {
                let row_ix = k + v * S;
                let mut row = plane[row_ix] & INTERIOR_BITS;
                while row != 0 {
                    let u0 = row.trailing_zeros() as usize;
                    let ao = corner_light(light, face, k, u0, v);

                    let mut w = 1;
                    while u0 + w <= INTERIOR_MAX
                        && (row >> (u0 + w)) & 1 == 1
                        && corner_light(light, face, k, u0 + w, v) == ao
                    {
                        w += 1;
                    }
                    let mask = run_mask(u0, w);
                    row &= !mask;
                    plane[row_ix] &= !mask;

                    let mut h = 1;
                    while v + h <= INTERIOR_MAX {
                        let next_ix = k + (v + h) * S;
                        if plane[next_ix] & mask != mask {
                            break;
                        }
                        if !(u0..u0 + w).all(|u| corner_light(light, face, k, u, v + h) == ao) {
                            break;
                        }
                        plane[next_ix] &= !mask;
                        h += 1;
                    }

                    sink.push_quad(Quad::from_grid(face, k, u0, v, w, h, ao));
                }
            }
        }
    }
}
