use bitvox_geom::Vec3;

/// Face id as written into packed vertices. Even ids face the positive axis direction.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Face {
    PosX = 0,
    NegX = 1,
    PosY = 2,
    NegY = 3,
    PosZ = 4,
    NegZ = 5,
}

impl Face {
    pub const ALL: [Face; 6] = [
        Face::PosX,
        Face::NegX,
        Face::PosY,
        Face::NegY,
        Face::PosZ,
        Face::NegZ,
    ];

    /// Returns the `[0..6)` index of this face.
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Converts a face index `[0..6)` back into a `Face` value.
    /// Falls back to `PosX` for out-of-range indices.
    #[inline]
    pub fn from_index(i: usize) -> Face {
        match i {
            1 => Face::NegX,
            2 => Face::PosY,
            3 => Face::NegY,
            4 => Face::PosZ,
            5 => Face::NegZ,
            _ => Face::PosX,
        }
    }

    /// 0 = X, 1 = Y, 2 = Z.
    #[inline]
    pub fn axis(self) -> usize {
        self.index() / 2
    }

    #[inline]
    pub fn is_positive(self) -> bool {
        self.index() % 2 == 0
    }

    /// Returns the integer grid delta `(dx,dy,dz)` when stepping out of this face.
    #[inline]
    pub fn delta(self) -> (i32, i32, i32) {
        match self {
            Face::PosX => (1, 0, 0),
            Face::NegX => (-1, 0, 0),
            Face::PosY => (0, 1, 0),
            Face::NegY => (0, -1, 0),
            Face::PosZ => (0, 0, 1),
            Face::NegZ => (0, 0, -1),
        }
    }

    #[inline]
    pub fn normal(self) -> Vec3 {
        let (x, y, z) = self.delta();
        Vec3::new(x as f32, y as f32, z as f32)
    }

    /// Faces whose corner order is already counter-clockwise seen from outside.
    #[inline]
    pub(crate) fn front_wound(self) -> bool {
        matches!(self, Face::NegX | Face::PosY | Face::NegZ)
    }
}

/// Maps plane coordinates `(k, u, v)` of `axis` back to `(x, y, z)`.
///
/// Layer `k` runs along the face normal, `u` along the row bits and `v` across rows:
/// X planes are `(x, z, y)`, Y planes `(y, x, z)`, Z planes `(z, x, y)`.
#[inline]
pub fn plane_to_xyz(axis: usize, k: usize, u: usize, v: usize) -> (usize, usize, usize) {
    match axis {
        0 => (k, v, u),
        1 => (u, k, v),
        _ => (u, v, k),
    }
}

#[inline]
pub fn xyz_to_plane(axis: usize, x: usize, y: usize, z: usize) -> (usize, usize, usize) {
    match axis {
        0 => (x, z, y),
        1 => (y, x, z),
        _ => (z, x, y),
    }
}
