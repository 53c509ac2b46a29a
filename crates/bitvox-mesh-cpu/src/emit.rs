use crate::constants::{
    FACE_MASK, FACE_SHIFT, INDICES_PER_QUAD, LIGHT_MASK, LIGHT_SHIFT, POS_BITS, POS_MASK,
};
use crate::face::{Face, plane_to_xyz};

const FRONT: [u32; INDICES_PER_QUAD] = [0, 1, 2, 0, 2, 3];
const FRONT_FLIPPED: [u32; INDICES_PER_QUAD] = [0, 1, 3, 1, 2, 3];
const BACK: [u32; INDICES_PER_QUAD] = [0, 2, 1, 0, 3, 2];
const BACK_FLIPPED: [u32; INDICES_PER_QUAD] = [1, 3, 2, 1, 0, 3];

/// A merged rectangle on one face plane, in visible (halo-free) coordinates.
///
/// `layer` is the plane position along the face axis; `(u, v)` is the minimum corner and
/// `ao` holds the light of corners `(u,v)`, `(u+w,v)`, `(u+w,v+h)`, `(u,v+h)`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Quad {
    pub face: Face,
    pub layer: u8,
    pub u: u8,
    pub v: u8,
    pub w: u8,
    pub h: u8,
    pub ao: [u8; 4],
}

impl Quad {
    /// Builds a quad from a run found at grid cell `(k, u, v)` of the padded cube.
    #[inline]
    pub fn from_grid(face: Face, k: usize, u: usize, v: usize, w: usize, h: usize, ao: [u8; 4]) -> Self {
        let layer = if face.is_positive() { k } else { k - 1 };
        Quad {
            face,
            layer: layer as u8,
            u: (u - 1) as u8,
            v: (v - 1) as u8,
            w: w as u8,
            h: h as u8,
            ao,
        }
    }

    #[inline]
    pub fn area(&self) -> u32 {
        u32::from(self.w) * u32::from(self.h)
    }

    /// Diagonal flip toward the brighter pair of opposite corners.
    #[inline]
    pub fn flipped(&self) -> bool {
        let [a0, a1, a2, a3] = self.ao.map(u16::from);
        a0 + a2 < a1 + a3
    }

    /// Corner positions and light in emission order.
    pub fn vertices(&self) -> [((u8, u8, u8), u8); 4] {
        let (u0, v0) = (self.u as usize, self.v as usize);
        let (u1, v1) = (u0 + self.w as usize, v0 + self.h as usize);
        let corners = [(u0, v0), (u1, v0), (u1, v1), (u0, v1)];
        // Y and Z planes walk the corners the other way round.
        let order = if self.face.axis() == 0 { [0, 1, 2, 3] } else { [0, 3, 2, 1] };
        let axis = self.face.axis();
        order.map(|c| {
            let (cu, cv) = corners[c];
            let (x, y, z) = plane_to_xyz(axis, self.layer as usize, cu, cv);
            ((x as u8, y as u8, z as u8), self.ao[c])
        })
    }

    /// Six indices for the two triangles, offset by `base`.
    #[inline]
    pub fn indices(&self, base: u32) -> [u32; INDICES_PER_QUAD] {
        let table = match (self.face.front_wound(), self.flipped()) {
            (true, false) => FRONT,
            (true, true) => FRONT_FLIPPED,
            (false, false) => BACK,
            (false, true) => BACK_FLIPPED,
        };
        table.map(|i| base + i)
    }
}

/// Receives quads as the mesher finds them.
pub trait QuadSink {
    fn push_quad(&mut self, quad: Quad);
}

impl QuadSink for Vec<Quad> {
    #[inline]
    fn push_quad(&mut self, quad: Quad) {
        self.push(quad);
    }
}

/// `x[0:6) | y[6:12) | z[12:18) | face[18:21) | light[21:25)`.
#[inline]
pub fn pack_vertex(x: u8, y: u8, z: u8, face: Face, light: u8) -> u32 {
    (u32::from(x) & POS_MASK)
        | ((u32::from(y) & POS_MASK) << POS_BITS)
        | ((u32::from(z) & POS_MASK) << (POS_BITS * 2))
        | ((face.index() as u32 & FACE_MASK) << FACE_SHIFT)
        | ((u32::from(light) & LIGHT_MASK) << LIGHT_SHIFT)
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PackedVertex {
    pub x: u8,
    pub y: u8,
    pub z: u8,
    pub face: Face,
    pub light: u8,
}

#[inline]
pub fn unpack_vertex(word: u32) -> PackedVertex {
    PackedVertex {
        x: (word & POS_MASK) as u8,
        y: ((word >> POS_BITS) & POS_MASK) as u8,
        z: ((word >> (POS_BITS * 2)) & POS_MASK) as u8,
        face: Face::from_index(((word >> FACE_SHIFT) & FACE_MASK) as usize),
        light: ((word >> LIGHT_SHIFT) & LIGHT_MASK) as u8,
    }
}
