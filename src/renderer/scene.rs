use super::sdf::{self, ShapeKind};
use crate::common::{math, MAX_DIS};
use std::ops::Range;

/// Rigid transform plus per-shape size. The cached matrix maps world space
/// into object space and must be refreshed from the Euler angles before any
/// distance query in a frame; `Scene::update_transforms` is that refresh.
/// Scale is consumed inside the primitive functions, never applied to the
/// point itself, which would squeeze the distance metric and break marching.
#[derive(Clone, Debug)]
pub struct Transform {
    pub position: na::Vector3<f32>,
    /// Euler angles in degrees, applied in Z * Y * X order.
    pub rotation: na::Vector3<f32>,
    pub scale: na::Vector3<f32>,
    world_to_local: na::Matrix3<f32>,
}

impl Transform {
    pub fn new(
        position: na::Vector3<f32>,
        rotation: na::Vector3<f32>,
        scale: na::Vector3<f32>,
    ) -> Self {
        let mut transform = Self {
            position,
            rotation,
            scale,
            world_to_local: na::Matrix3::identity(),
        };
        transform.update_matrix();
        transform
    }

    pub fn update_matrix(&mut self) {
        let radians = self.rotation.map(|deg| deg.to_radians());
        // inverse rotation: world point into object space
        self.world_to_local = math::euler_rotation(&-radians);
    }

    pub fn to_local(&self, world_point: &na::Vector3<f32>) -> na::Vector3<f32> {
        self.world_to_local * (world_point - self.position)
    }
}

#[derive(Clone, Debug)]
pub struct Material {
    /// Reflectance per channel, components in [0, 1].
    pub albedo: na::Vector3<f32>,
    /// Radiance multiplier applied after every bounce; (1, 1, 1) is inert.
    pub emission: na::Vector3<f32>,
    pub roughness: f32,
    pub metallic: f32,
    pub transmission: f32,
    pub ior: f32,
}

impl Material {
    pub fn diffuse(albedo: na::Vector3<f32>) -> Self {
        Self {
            albedo,
            emission: na::Vector3::from_element(1.0),
            roughness: 1.0,
            metallic: 0.0,
            transmission: 0.0,
            ior: 1.5,
        }
    }

    pub fn emissive(emission: na::Vector3<f32>) -> Self {
        Self {
            albedo: na::Vector3::from_element(1.0),
            emission,
            roughness: 1.0,
            metallic: 0.0,
            transmission: 0.0,
            ior: 1.0,
        }
    }
}

#[derive(Clone, Debug)]
pub struct SdfObject {
    pub kind: ShapeKind,
    pub transform: Transform,
    pub material: Material,
}

impl SdfObject {
    pub fn new(kind: ShapeKind, transform: Transform, material: Material) -> Self {
        Self {
            kind,
            transform,
            material,
        }
    }

    /// Signed distance from a world point to this object's surface.
    pub fn signed_distance(&self, world_point: &na::Vector3<f32>) -> f32 {
        let local = self.transform.to_local(world_point);
        sdf::signed_distance(self.kind, &local, &self.transform.scale)
    }
}

// tetrahedron offset magnitude, 1/sqrt(3) scaled to a sub-MIN_DIS epsilon
const NORMAL_EPS: f32 = 0.5773 * 0.005;

/// Scene of SDF objects. Object count and materials are fixed at
/// construction; only the cached rotation matrices change between frames.
/// Objects are stably sorted by shape kind so the nearest query can walk
/// uniform groups.
pub struct Scene {
    objects: Vec<SdfObject>,
    groups: Vec<(ShapeKind, Range<usize>)>,
}

impl Scene {
    pub fn new(mut objects: Vec<SdfObject>) -> Self {
        objects.sort_by_key(|o| o.kind);

        let mut groups: Vec<(ShapeKind, Range<usize>)> = Vec::new();
        for (i, object) in objects.iter().enumerate() {
            match groups.last_mut() {
                Some((kind, range)) if *kind == object.kind => range.end = i + 1,
                _ => groups.push((object.kind, i..i + 1)),
            }
        }

        Self { objects, groups }
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn object(&self, index: usize) -> &SdfObject {
        &self.objects[index]
    }

    /// Refresh every object's cached rotation matrix. Must run once per
    /// frame, before marching, and is the only mutation the scene sees.
    pub fn update_transforms(&mut self) {
        for object in &mut self.objects {
            object.transform.update_matrix();
        }
    }

    /// Index and unsigned distance of the object nearest to a world point.
    /// The magnitude is used so that marching still has a distance oracle
    /// when the ray origin sits inside an object. First object in iteration
    /// order wins ties; grouping by kind never changes the result.
    pub fn nearest(&self, world_point: &na::Vector3<f32>) -> (usize, f32) {
        let mut index = 0;
        let mut min_dis = MAX_DIS;
        for (kind, range) in &self.groups {
            for i in range.clone() {
                let object = &self.objects[i];
                let local = object.transform.to_local(world_point);
                let dis = sdf::signed_distance(*kind, &local, &object.transform.scale).abs();
                if dis < min_dis {
                    min_dis = dis;
                    index = i;
                }
            }
        }
        (index, min_dis)
    }

    /// Surface normal of one object by tetrahedron-offset finite differences
    /// of its distance field, the four sample offsets being the (±1, ±1, ±1)
    /// sign patterns whose components multiply to +1.
    pub fn calc_normal(&self, index: usize, p: &na::Vector3<f32>) -> na::Vector3<f32> {
        let object = &self.objects[index];
        let e = NORMAL_EPS;
        let offsets = [
            na::Vector3::new(e, -e, -e),
            na::Vector3::new(-e, -e, e),
            na::Vector3::new(-e, e, -e),
            na::Vector3::new(e, e, e),
        ];

        let mut gradient = na::Vector3::zeros();
        for offset in &offsets {
            gradient += offset * object.signed_distance(&(p + offset));
        }
        math::normalize_or(&gradient, &na::Vector3::y())
    }
}
