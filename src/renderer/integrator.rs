use super::bsdf::ray_surface_interaction;
use super::raycast::raycast;
use super::sampler::RenderSampler;
use super::scene::Scene;
use super::Ray;
use crate::common::envmap::EnvironmentMap;
use crate::common::{math, LIGHT_QUALITY, MAX_RAYTRACE, VISIBILITY};

/// Unidirectional path integrator. Drives the marcher and the surface
/// interaction until the ray escapes to the sky, is extinguished by the
/// visibility window, gets killed by Russian roulette, or runs out of
/// bounces. The hard bounce cap truncates the sample, never the program.
pub struct PathIntegrator {
    /// Roulette depth-decay constant; survival shrinks as exp(-depth/quality).
    quality: f32,
    max_bounces: usize,
}

impl Default for PathIntegrator {
    fn default() -> Self {
        Self {
            quality: LIGHT_QUALITY,
            max_bounces: MAX_RAYTRACE,
        }
    }
}

impl PathIntegrator {
    pub fn new(quality: f32, max_bounces: usize) -> Self {
        Self {
            quality,
            max_bounces: max_bounces.min(MAX_RAYTRACE),
        }
    }

    /// Trace one camera ray to completion, returning its accumulated color.
    /// The ray's depth counts bounces while active and flips negative once
    /// the path terminates.
    pub fn raytrace(
        &self,
        mut ray: Ray,
        scene: &Scene,
        sky: &EnvironmentMap,
        pixel_radius: f32,
        sampler: &mut RenderSampler,
    ) -> Ray {
        for depth in 0..self.max_bounces {
            // unbiased early termination: the kill probability grows with
            // depth, and a killed path keeps its color scaled by that
            // probability
            let roulette_prob = 1.0 - (-(depth as f32) / self.quality).exp();
            if sampler.get_1d() < roulette_prob {
                ray.color *= roulette_prob;
                ray.depth = -ray.depth;
                break;
            }

            ray.depth += 1;
            let record = raycast(&ray, scene, pixel_radius);

            if !record.hit {
                let sky_color = sky.sample(&ray.direction);
                ray.color.component_mul_assign(&sky_color);
                ray.depth = -ray.depth;
                break;
            }

            ray_surface_interaction(&mut ray, scene, record.index, &record.position, sampler);

            let intensity = math::brightness(&ray.color);
            ray.color
                .component_mul_assign(&scene.object(record.index).material.emission);
            let visible = math::brightness(&ray.color);

            // a path that got brighter is now a net emitter and is done; one
            // below the visibility floor carries nothing worth following
            if intensity < visible || visible < VISIBILITY.0 || visible > VISIBILITY.1 {
                ray.depth = -ray.depth;
                break;
            }
        }

        ray
    }
}
