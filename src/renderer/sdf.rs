//! Signed distance functions for every supported primitive. Each takes a
//! point already in the primitive's local space plus the shape's size
//! parameter and returns a Euclidean signed distance, negative inside. The
//! marcher's step sizing relies on the Euclidean metric, so nothing here may
//! scale the space itself.

use crate::common::MAX_DIS;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum ShapeKind {
    None,
    Sphere,
    Box,
    Cylinder,
    Cone,
    Plane,
    Menger,
}

/// Scale semantics per shape: Sphere uses x as radius; Box uses xyz as half
/// extents; Cylinder and Cone use (radius, half height); Plane and None
/// ignore it.
pub fn signed_distance(kind: ShapeKind, p: &na::Vector3<f32>, scale: &na::Vector3<f32>) -> f32 {
    match kind {
        ShapeKind::None => MAX_DIS,
        ShapeKind::Sphere => sd_sphere(p, scale.x),
        ShapeKind::Box => sd_box(p, scale),
        ShapeKind::Cylinder => sd_cylinder(p, scale.x, scale.y),
        ShapeKind::Cone => sd_cone(p, scale.x, scale.y),
        ShapeKind::Plane => sd_plane(p),
        ShapeKind::Menger => sd_menger(p, scale),
    }
}

pub fn sd_sphere(p: &na::Vector3<f32>, radius: f32) -> f32 {
    p.norm() - radius
}

pub fn sd_box(p: &na::Vector3<f32>, half_extents: &na::Vector3<f32>) -> f32 {
    let q = p.abs() - half_extents;
    q.sup(&na::Vector3::zeros()).norm() + q.x.max(q.y.max(q.z)).min(0.0)
}

pub fn sd_cylinder(p: &na::Vector3<f32>, radius: f32, half_height: f32) -> f32 {
    let d = na::Vector2::new(na::Vector2::new(p.x, p.z).norm(), p.y).abs()
        - na::Vector2::new(radius, half_height);
    d.x.max(d.y).min(0.0) + d.sup(&na::Vector2::zeros()).norm()
}

/// Capped cone with base radius at y = -half_height tapering to a point at
/// y = +half_height (exact distance, Inigo Quilez's formulation with the top
/// radius at zero).
pub fn sd_cone(p: &na::Vector3<f32>, radius: f32, half_height: f32) -> f32 {
    let r1 = radius;
    let r2 = 0.0;
    let h = half_height;

    let q = na::Vector2::new(na::Vector2::new(p.x, p.z).norm(), p.y);
    let k1 = na::Vector2::new(r2, h);
    let k2 = na::Vector2::new(r2 - r1, 2.0 * h);
    let ca = na::Vector2::new(
        q.x - q.x.min(if q.y < 0.0 { r1 } else { r2 }),
        q.y.abs() - h,
    );
    let t = ((k1 - q).dot(&k2) / k2.norm_squared()).clamp(0.0, 1.0);
    let cb = q - k1 + k2 * t;
    let s = if cb.x < 0.0 && ca.y < 0.0 { -1.0 } else { 1.0 };
    s * ca.norm_squared().min(cb.norm_squared()).sqrt()
}

/// Horizontal plane through the local origin, facing +y; orientation comes
/// from the object transform.
pub fn sd_plane(p: &na::Vector3<f32>) -> f32 {
    p.y
}

const MENGER_ITERATIONS: usize = 4;

/// Menger-sponge style fractal: a box hollowed by iterative domain folding.
/// Only a distance bound rather than an exact distance, which sphere marching
/// tolerates as long as it never overestimates.
pub fn sd_menger(p: &na::Vector3<f32>, half_extents: &na::Vector3<f32>) -> f32 {
    let mut d = sd_box(p, half_extents);
    let mut s = 1.0;
    for _ in 0..MENGER_ITERATIONS {
        let a = na::Vector3::new(
            (p.x * s).rem_euclid(2.0) - 1.0,
            (p.y * s).rem_euclid(2.0) - 1.0,
            (p.z * s).rem_euclid(2.0) - 1.0,
        );
        s *= 3.0;
        let r = na::Vector3::new(
            (1.0 - 3.0 * a.x.abs()).abs(),
            (1.0 - 3.0 * a.y.abs()).abs(),
            (1.0 - 3.0 * a.z.abs()).abs(),
        );

        let da = r.x.max(r.y);
        let db = r.y.max(r.z);
        let dc = r.z.max(r.x);
        let c = (da.min(db.min(dc)) - 1.0) / s;

        d = d.max(c);
    }
    d
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sphere_distance_is_euclidean() {
        let r = 0.5;
        // outside, on surface, inside
        approx::assert_relative_eq!(
            sd_sphere(&na::Vector3::new(2.0, 0.0, 0.0), r),
            1.5,
            epsilon = 1e-6
        );
        approx::assert_relative_eq!(
            sd_sphere(&na::Vector3::new(0.0, r, 0.0), r),
            0.0,
            epsilon = 1e-6
        );
        approx::assert_relative_eq!(
            sd_sphere(&na::Vector3::new(0.1, 0.0, 0.0), r),
            -0.4,
            epsilon = 1e-6
        );
    }

    #[test]
    fn test_box_face_edge_corner() {
        let b = na::Vector3::new(1.0, 1.0, 1.0);
        // straight out of a face
        approx::assert_relative_eq!(
            sd_box(&na::Vector3::new(3.0, 0.0, 0.0), &b),
            2.0,
            epsilon = 1e-6
        );
        // past an edge, diagonal distance
        approx::assert_relative_eq!(
            sd_box(&na::Vector3::new(2.0, 2.0, 0.0), &b),
            2.0f32.sqrt(),
            epsilon = 1e-6
        );
        // past a corner
        approx::assert_relative_eq!(
            sd_box(&na::Vector3::new(2.0, 2.0, 2.0), &b),
            3.0f32.sqrt(),
            epsilon = 1e-6
        );
        // inside, nearest face
        approx::assert_relative_eq!(
            sd_box(&na::Vector3::new(0.5, 0.0, 0.0), &b),
            -0.5,
            epsilon = 1e-6
        );
    }

    #[test]
    fn test_cylinder_radial_and_cap() {
        let (r, h) = (0.5, 1.0);
        approx::assert_relative_eq!(
            sd_cylinder(&na::Vector3::new(1.5, 0.0, 0.0), r, h),
            1.0,
            epsilon = 1e-6
        );
        approx::assert_relative_eq!(
            sd_cylinder(&na::Vector3::new(0.0, 2.0, 0.0), r, h),
            1.0,
            epsilon = 1e-6
        );
        assert!(sd_cylinder(&na::Vector3::zeros(), r, h) < 0.0);
    }

    #[test]
    fn test_cone_signs() {
        let (r, h) = (0.5, 0.5);
        // apex is at +h, base disk at -h
        assert!(sd_cone(&na::Vector3::new(0.0, -0.49, 0.0), r, h) < 0.0);
        assert!(sd_cone(&na::Vector3::new(0.0, 1.0, 0.0), r, h) > 0.0);
        assert!(sd_cone(&na::Vector3::new(1.0, -0.5, 0.0), r, h) > 0.0);
    }

    #[test]
    fn test_plane() {
        assert_eq!(sd_plane(&na::Vector3::new(5.0, 2.0, -3.0)), 2.0);
        assert_eq!(sd_plane(&na::Vector3::new(0.0, -1.0, 0.0)), -1.0);
    }

    #[test]
    fn test_menger_bounded_by_box() {
        let b = na::Vector3::from_element(1.0);
        // carving only removes material, so the sponge distance is never
        // smaller than the box distance outside
        for p in &[
            na::Vector3::new(2.0, 0.3, 0.1),
            na::Vector3::new(0.0, 3.0, 0.0),
            na::Vector3::new(-1.5, -1.5, 0.2),
        ] {
            assert!(sd_menger(p, &b) >= sd_box(p, &b) - 1e-6);
        }
    }

    #[test]
    fn test_none_is_unreachable() {
        let d = signed_distance(
            ShapeKind::None,
            &na::Vector3::zeros(),
            &na::Vector3::zeros(),
        );
        assert_eq!(d, MAX_DIS);
    }
}
