use super::sampler::RenderSampler;
use super::Ray;
use crate::common::CameraPose;

/// Thin-lens camera rebuilt from the externally supplied pose each frame.
/// Precomputes the right-handed view basis and the focus-plane corners so the
/// per-sample work is two fused multiply-adds and a normalize.
pub struct Camera {
    origin: na::Vector3<f32>,
    lower_left_corner: na::Vector3<f32>,
    horizontal: na::Vector3<f32>,
    vertical: na::Vector3<f32>,
    u: na::Vector3<f32>,
    v: na::Vector3<f32>,
    lens_radius: f32,
}

impl Camera {
    pub fn new(pose: &CameraPose) -> Self {
        let theta = pose.vfov.to_radians();
        let half_height = (theta * 0.5).tan();
        let half_width = pose.aspect * half_height;

        let lookfrom = pose.lookfrom.coords;
        let w = (lookfrom - pose.lookat.coords).normalize();
        let u = pose.vup.cross(&w).normalize();
        let v = w.cross(&u);

        let hwfu = half_width * pose.focus * u;
        let hhfv = half_height * pose.focus * v;

        Self {
            origin: lookfrom,
            lower_left_corner: lookfrom - hwfu - hhfv - pose.focus * w,
            horizontal: 2.0 * hwfu,
            vertical: 2.0 * hhfv,
            u,
            v,
            lens_radius: pose.aperture * 0.5,
        }
    }

    /// Primary ray through film coordinates uv in [0, 1)², with a lens-disk
    /// offset for depth of field.
    pub fn get_ray(&self, uv: &na::Vector2<f32>, sampler: &mut RenderSampler) -> Ray {
        let rud = self.lens_radius * sampler.in_unit_disk();
        let offset = self.u * rud.x + self.v * rud.y;

        let origin = self.origin + offset;
        let target = self.lower_left_corner + uv.x * self.horizontal + uv.y * self.vertical;

        Ray {
            origin,
            direction: (target - origin).normalize(),
            color: na::Vector3::from_element(1.0),
            depth: 0,
        }
    }
}
