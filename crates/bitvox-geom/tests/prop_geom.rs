use bitvox_geom::{Aabb, IVec3, Vec3};
use proptest::prelude::*;

fn small_vec3() -> impl Strategy<Value = Vec3> {
    (-64i32..=64, -64i32..=64, -64i32..=64).prop_map(|(x, y, z)| Vec3::new(x as f32, y as f32, z as f32))
}

fn small_ivec3() -> impl Strategy<Value = IVec3> {
    (-10_000i32..=10_000, -10_000i32..=10_000, -10_000i32..=10_000).prop_map(IVec3::from)
}

proptest! {
    // Small integral components keep every product exact in f32
    #[test]
    fn cross_is_orthogonal(a in small_vec3(), b in small_vec3()) {
        let c = a.cross(b);
        prop_assert_eq!(c.dot(a), 0.0);
        prop_assert_eq!(c.dot(b), 0.0);
    }

    #[test]
    fn cross_is_anticommutative(a in small_vec3(), b in small_vec3()) {
        prop_assert_eq!(a.cross(b), b.cross(a) * -1.0);
    }

    #[test]
    fn manhattan_is_symmetric_and_zero_on_self(a in small_ivec3(), b in small_ivec3()) {
        prop_assert_eq!(a.manhattan(b), b.manhattan(a));
        prop_assert_eq!(a.manhattan(a), 0);
        prop_assert_eq!(a.manhattan(b), (a - b).manhattan(IVec3::ZERO));
    }

    #[test]
    fn negation_round_trips_through_vec3(a in small_ivec3()) {
        let f = Vec3::from(-a);
        prop_assert_eq!(f, Vec3::new(-(a.x as f32), -(a.y as f32), -(a.z as f32)));
    }

    #[test]
    fn aabb_contains_points_inside(edge in 1u8..=64, x in 0u8..=64, y in 0u8..=64, z in 0u8..=64) {
        let b = Aabb::cube(edge as f32);
        let inside = x <= edge && y <= edge && z <= edge;
        prop_assert_eq!(b.contains(Vec3::new(x as f32, y as f32, z as f32)), inside);
    }
}
