pub mod bsdf;
pub mod camera;
pub mod integrator;
pub mod raycast;
pub mod sampler;
pub mod scene;
pub mod sdf;

use crate::common::envmap::EnvironmentMap;
use crate::common::film::Film;
use crate::common::CameraPose;
use camera::Camera;
use integrator::PathIntegrator;
use rayon::prelude::*;
use sampler::RenderSampler;
use scene::Scene;
use std::time::Instant;

/// One light path in flight. Color is the multiplicative throughput; depth
/// counts bounces while the path is active and flips negative on
/// termination.
#[derive(Clone, Debug)]
pub struct Ray {
    pub origin: na::Vector3<f32>,
    pub direction: na::Vector3<f32>,
    pub color: na::Vector3<f32>,
    pub depth: i32,
}

impl Ray {
    pub fn at(&self, t: f32) -> na::Vector3<f32> {
        self.origin + t * self.direction
    }
}

/// Owns everything the render kernel touches: the scene, the sky, the
/// accumulation buffer and the integrator. The scene is only mutated in the
/// single-writer transform pass between frames; during shading it is shared
/// read-only across all pixel invocations, and every invocation writes only
/// its own film cell, so the parallel loop needs no locks.
pub struct RenderContext {
    scene: Scene,
    sky: EnvironmentMap,
    film: Film,
    integrator: PathIntegrator,
    pixel_radius: f32,
    samples: u32,
    frame: u64,
    log: slog::Logger,
}

impl RenderContext {
    pub fn new(
        log: &slog::Logger,
        scene: Scene,
        sky: EnvironmentMap,
        film: Film,
        integrator: PathIntegrator,
    ) -> Self {
        let log = log.new(o!("module" => "renderer"));
        let resolution = film.resolution;
        // hits resolve at half the smaller screen-space pixel extent
        let pixel_radius = 0.5 / (resolution.x.max(resolution.y)) as f32;

        info!(
            log,
            "render context created";
            "resolution" => format!("{}x{}", resolution.x, resolution.y),
            "objects" => scene.len(),
        );

        Self {
            scene,
            sky,
            film,
            integrator,
            pixel_radius,
            samples: 1,
            frame: 0,
            log,
        }
    }

    /// Samples deposited per pixel on every frame; one by default.
    pub fn samples_per_frame(mut self, samples: u32) -> Self {
        self.samples = samples.max(1);
        self
    }

    pub fn film(&self) -> &Film {
        &self.film
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Shade every pixel once with the given camera pose, depositing one
    /// sample per pixel into the accumulation buffer. Restarts accumulation
    /// when the pose reports motion.
    pub fn render_frame(&mut self, pose: &CameraPose) {
        let start = Instant::now();

        if pose.moving {
            debug!(self.log, "camera moving, accumulation restarted"; "frame" => self.frame);
            self.film.clear();
        }

        self.scene.update_transforms();

        let camera = Camera::new(pose);
        let resolution = self.film.resolution;
        let width = resolution.x;
        let height = resolution.y;
        let inv_pixel = na::Vector2::new(1.0 / width as f32, 1.0 / height as f32);
        let frame = self.frame;
        let samples = self.samples;

        let scene = &self.scene;
        let sky = &self.sky;
        let integrator = &self.integrator;
        let pixel_radius = self.pixel_radius;

        let shade_row = |(y, row): (usize, &mut [na::Vector4<f32>])| {
            for (x, pixel) in row.iter_mut().enumerate() {
                for sample in 0..samples {
                    let stream = frame * samples as u64 + sample as u64;
                    let mut sampler =
                        RenderSampler::new(RenderSampler::pixel_seed(x as u32, y as u32, stream));

                    let jitter = sampler.get_2d();
                    let uv = na::Vector2::new(
                        (x as f32 + jitter.x) * inv_pixel.x,
                        (y as f32 + jitter.y) * inv_pixel.y,
                    );

                    let ray = camera.get_ray(&uv, &mut sampler);
                    let ray = integrator.raytrace(ray, scene, sky, pixel_radius, &mut sampler);

                    *pixel += na::Vector4::new(ray.color.x, ray.color.y, ray.color.z, 1.0);
                }
            }
        };

        if cfg!(feature = "disable_rayon") {
            self.film.rows_mut().enumerate().for_each(shade_row);
        } else {
            self.film
                .rows_mut()
                .enumerate()
                .par_bridge()
                .for_each(shade_row);
        }

        self.frame += 1;
        debug!(
            self.log,
            "frame rendered";
            "frame" => self.frame,
            "duration" => format!("{:?}", start.elapsed()),
        );
    }

    /// Tone-mapped display buffer for the presenter.
    pub fn display(&self) -> Vec<na::Vector3<f32>> {
        self.film.to_display()
    }

    /// Snapshot export of the current display buffer.
    pub fn save(&self, path: &std::path::Path) -> anyhow::Result<()> {
        info!(self.log, "saving render"; "path" => format!("{:?}", path));
        self.film.save(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::{self, math};
    use scene::{Material, SdfObject, Transform};
    use sdf::ShapeKind;

    fn test_logger() -> slog::Logger {
        slog::Logger::root(slog::Discard, o!())
    }

    fn small_context(objects: Vec<SdfObject>) -> RenderContext {
        let resolution = glm::vec2(32, 32);
        RenderContext::new(
            &test_logger(),
            Scene::new(objects),
            EnvironmentMap::gradient(),
            Film::new(&resolution, common::DEFAULT_EXPOSURE, common::DEFAULT_GAMMA),
            PathIntegrator::default(),
        )
    }

    fn emissive_sphere() -> SdfObject {
        SdfObject::new(
            ShapeKind::Sphere,
            Transform::new(
                na::Vector3::zeros(),
                na::Vector3::zeros(),
                na::Vector3::from_element(0.5),
            ),
            Material::emissive(na::Vector3::from_element(10.0)),
        )
    }

    fn pose_for(resolution: &glm::UVec2) -> CameraPose {
        let mut pose = CameraPose::new(
            na::Point3::new(0.0, 0.0, 4.0),
            na::Point3::origin(),
            35.0,
            resolution,
        );
        pose.aperture = 0.0;
        pose
    }

    #[test]
    fn test_pixel_radius_is_half_the_smaller_pixel_extent() {
        // at 768x432 the smaller screen-pixel extent is 1/768, so hits must
        // resolve at half of that, not half of 1/432
        let context = RenderContext::new(
            &test_logger(),
            Scene::new(vec![]),
            EnvironmentMap::gradient(),
            Film::new(&glm::vec2(768, 432), common::DEFAULT_EXPOSURE, common::DEFAULT_GAMMA),
            PathIntegrator::default(),
        );
        approx::assert_relative_eq!(context.pixel_radius, 0.5 / 768.0, epsilon = 1e-9);

        // and the same when the short axis is horizontal
        let portrait = RenderContext::new(
            &test_logger(),
            Scene::new(vec![]),
            EnvironmentMap::gradient(),
            Film::new(&glm::vec2(432, 768), common::DEFAULT_EXPOSURE, common::DEFAULT_GAMMA),
            PathIntegrator::default(),
        );
        approx::assert_relative_eq!(portrait.pixel_radius, 0.5 / 768.0, epsilon = 1e-9);
    }

    #[test]
    fn test_samples_per_frame_multiplies_weight() {
        let mut context = small_context(vec![emissive_sphere()]).samples_per_frame(4);
        let pose = pose_for(&context.film.resolution);
        context.render_frame(&pose);
        assert_eq!(context.film.get_pixel(16, 16).w, 4.0);
        context.render_frame(&pose);
        assert_eq!(context.film.get_pixel(16, 16).w, 8.0);
    }

    #[test]
    fn test_reset_on_motion() {
        let mut context = small_context(vec![emissive_sphere()]);
        let resolution = context.film.resolution;
        let mut pose = pose_for(&resolution);

        context.render_frame(&pose);
        assert!(context.film.get_pixel(16, 16).w > 0.0);

        pose.moving = true;
        // the clear happens before the frame's samples land, so weight is
        // back to exactly one sample afterwards
        context.render_frame(&pose);
        for y in 0..resolution.y {
            for x in 0..resolution.x {
                assert_eq!(context.film.get_pixel(x, y).w, 1.0);
            }
        }
    }

    #[test]
    fn test_accumulation_weight_counts_frames() {
        let mut context = small_context(vec![emissive_sphere()]);
        let pose = pose_for(&context.film.resolution);
        for _ in 0..5 {
            context.render_frame(&pose);
        }
        assert_eq!(context.film.get_pixel(0, 0).w, 5.0);
    }

    #[test]
    fn test_emissive_sphere_end_to_end() {
        let mut context = small_context(vec![emissive_sphere()]);
        let resolution = context.film.resolution;
        let pose = pose_for(&resolution);

        for _ in 0..32 {
            context.render_frame(&pose);
        }

        // center pixel looks straight at the emitter: mean radiance
        // approaches the emission value
        let center = context.film.get_pixel(resolution.x / 2, resolution.y / 2);
        let mean = center.xyz() / center.w;
        assert!(
            math::brightness(&mean) > 5.0,
            "center luminance {} too low for a 10x emitter",
            math::brightness(&mean)
        );

        // corner pixel misses the emitter and converges into the sky's
        // value range
        let corner = context.film.get_pixel(0, 0);
        let corner_mean = corner.xyz() / corner.w;
        assert!(math::brightness(&corner_mean) < 1.5);
        assert!(math::brightness(&corner_mean) > 0.1);
    }

    #[test]
    fn test_display_buffer_shape_and_range() {
        let mut context = small_context(vec![emissive_sphere()]);
        let pose = pose_for(&context.film.resolution);
        context.render_frame(&pose);

        let display = context.display();
        assert_eq!(display.len(), 32 * 32);
        for pixel in &display {
            for c in pixel.iter() {
                assert!((0.0..=1.0).contains(c));
            }
        }
    }
}
