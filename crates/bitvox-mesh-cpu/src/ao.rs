use bitvox_lighting::{LightField, MAX_LIGHT};

use crate::face::{Face, plane_to_xyz};

/// Per-corner light for the face of grid cell `(k, u, v)` on `face`'s plane.
///
/// Samples the 3x3 neighbourhood of the open cell in front of the face; halo samples read as
/// fully lit. A corner sums its two
/// edge samples, the diagonal (skipped when both edges are dark), and the centre, then averages
/// over four. Corners are ordered `(-u,-v)`, `(+u,-v)`, `(+u,+v)`, `(-u,+v)`.
pub fn corner_light(light: &LightField, face: Face, k: usize, u: usize, v: usize) -> [u8; 4] {
    let axis = face.axis();
    let layer = if face.is_positive() { k + 1 } else { k - 1 };
    let at = |du: isize, dv: isize| -> u16 {
        let uu = (u as isize + du) as usize;
        let vv = (v as isize + dv) as usize;
        let (x, y, z) = plane_to_xyz(axis, layer, uu, vv);
        u16::from(light.sample(x as i32, y as i32, z as i32))
    };

    let centre = at(0, 0);
    let (left, right, down, up) = (at(-1, 0), at(1, 0), at(0, -1), at(0, 1));
    let corner = |e0: u16, e1: u16, diag: u16| -> u8 {
        let mut sum = e0 + e1;
        if sum != 0 {
            sum += diag;
        }
        ((sum + centre) / 4).min(u16::from(MAX_LIGHT)) as u8
    };

    [
        corner(left, down, at(-1, -1)),
        corner(right, down, at(1, -1)),
        corner(right, up, at(1, 1)),
        corner(left, up, at(-1, 1)),
    ]
}
