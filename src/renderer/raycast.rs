use super::scene::Scene;
use super::Ray;
use crate::common::{MAX_DIS, MAX_RAYMARCH, MIN_DIS};

/// Result of one march. `index` is only meaningful when `hit` is set; on a
/// miss it still names whatever object was nearest at the final position.
#[derive(Clone, Copy, Debug)]
pub struct HitRecord {
    pub index: usize,
    pub position: na::Vector3<f32>,
    pub hit: bool,
}

// over-relaxation starting weight; >1 trades extra back-off iterations for
// fewer total distance queries on open scenes
const RELAXATION: f32 = 1.6;

/// Sphere march a ray against the scene. Steps are sized by the nearest
/// unsigned distance and over-relaxed by `w`; when the relaxed step turns out
/// to have jumped past the surface guard (previous + current distance shorter
/// than the step just taken), the step is rewound and `w` decays toward 1.0
/// before retrying, which prevents tunnelling through thin objects.
///
/// A hit is declared when the relative error `d / t` drops under the given
/// pixel radius, so precision scales with both image resolution and distance.
/// Running out of iterations is a miss, never an error.
pub fn raycast(ray: &Ray, scene: &Scene, pixel_radius: f32) -> HitRecord {
    let mut t = MIN_DIS;
    let mut w = RELAXATION;
    let mut s = 0.0;
    let mut d = 0.0;
    let mut cerr = f32::MAX;

    let mut record = HitRecord {
        index: 0,
        position: ray.origin,
        hit: false,
    };

    for _ in 0..MAX_RAYMARCH {
        record.position = ray.at(t);
        let (index, distance) = scene.nearest(&record.position);
        record.index = index;

        let ld = d;
        d = distance;

        if w > 1.0 && ld + d < s {
            s -= w * s;
            t += s;
            w = 0.5 + 0.5 * w;
            continue;
        }

        let err = d / t;
        if err < cerr {
            cerr = err;
        }

        s = w * d;
        t += s;

        record.hit = err < pixel_radius;
        if t > MAX_DIS || record.hit {
            break;
        }
    }

    record
}
