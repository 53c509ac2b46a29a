use bitvox_geom::IVec3;

use crate::VISIBLE_SIZE;

const VIS: i32 = VISIBLE_SIZE as i32;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChunkCoord {
    pub cx: i32,
    pub cy: i32,
    pub cz: i32,
}

impl ChunkCoord {
    #[inline]
    pub const fn new(cx: i32, cy: i32, cz: i32) -> Self {
        Self { cx, cy, cz }
    }

    #[inline]
    pub fn offset(self, dx: i32, dy: i32, dz: i32) -> Self {
        Self {
            cx: self.cx + dx,
            cy: self.cy + dy,
            cz: self.cz + dz,
        }
    }

    #[inline]
    pub fn distance_sq(self, other: ChunkCoord) -> i64 {
        let dx = i64::from(self.cx - other.cx);
        let dy = i64::from(self.cy - other.cy);
        let dz = i64::from(self.cz - other.cz);
        dx * dx + dy * dy + dz * dz
    }

    /// World position of visible cell `(0,0,0)`, i.e. local `(1,1,1)`.
    #[inline]
    pub fn origin(self) -> IVec3 {
        IVec3::new(self.cx * VIS, self.cy * VIS, self.cz * VIS)
    }

    /// Every coord within `radius` (euclidean, in chunks) of `self`, nearest first.
    pub fn sphere(self, radius: i32) -> Vec<ChunkCoord> {
        let r = radius.max(0);
        let r2 = i64::from(r) * i64::from(r);
        let mut out = Vec::new();
        for dy in -r..=r {
            for dz in -r..=r {
                for dx in -r..=r {
                    let c = self.offset(dx, dy, dz);
                    if c.distance_sq(self) <= r2 {
                        out.push(c);
                    }
                }
            }
        }
        out.sort_by_key(|c| (c.distance_sq(self), *c));
        out
    }
}

impl From<(i32, i32, i32)> for ChunkCoord {
    fn from(value: (i32, i32, i32)) -> Self {
        Self::new(value.0, value.1, value.2)
    }
}

impl std::fmt::Display for ChunkCoord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {}, {})", self.cx, self.cy, self.cz)
    }
}

#[inline]
pub fn world_to_chunk(p: IVec3) -> ChunkCoord {
    let c = p.div_euclid(VIS);
    ChunkCoord::new(c.x, c.y, c.z)
}

/// Owning chunk plus the interior local cell `[1, S-2]` for a world position.
#[inline]
pub fn world_to_local(p: IVec3) -> (ChunkCoord, (usize, usize, usize)) {
    let r = p.rem_euclid(VIS);
    (
        world_to_chunk(p),
        (r.x as usize + 1, r.y as usize + 1, r.z as usize + 1),
    )
}

/// Inverse of [`world_to_local`]; halo cells map into the neighbouring chunk's interior.
#[inline]
pub fn local_to_world(coord: ChunkCoord, x: usize, y: usize, z: usize) -> IVec3 {
    coord.origin() + IVec3::new(x as i32 - 1, y as i32 - 1, z as i32 - 1)
}
