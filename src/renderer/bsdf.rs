use super::sampler::RenderSampler;
use super::scene::Scene;
use super::Ray;
use crate::common::{math, ENV_IOR, MIN_DIS};

/// Schlick reflectance, interpolated back toward the base reflectance for
/// rough surfaces so glancing highlights soften with roughness.
pub fn fresnel_schlick(no_i: f32, f0: f32, roughness: f32) -> f32 {
    math::mix(math::mix((1.0 + no_i).abs().powi(5), 1.0, f0), f0, roughness)
}

/// Uniform direction on the hemisphere around `normal`, by normalizing the
/// normal plus a uniform unit vector.
pub fn hemispheric_sampling(
    normal: &na::Vector3<f32>,
    sampler: &mut RenderSampler,
) -> na::Vector3<f32> {
    let vector = sampler.on_unit_sphere();
    math::normalize_or(&(normal + vector), normal)
}

/// Blend of the surface normal toward a hemisphere sample by `roughness²`,
/// approximating a GGX-style lobe without carrying a microfacet pdf.
fn roughness_sampling(
    hemispheric_sample: &na::Vector3<f32>,
    normal: &na::Vector3<f32>,
    roughness: f32,
) -> na::Vector3<f32> {
    let alpha = roughness * roughness;
    math::normalize_or(&math::mix_vec3(normal, hemispheric_sample, alpha), normal)
}

/// Scatter a ray at a surface hit: pick reflection, transmission or a diffuse
/// bounce from the material's probability tree, attenuate by albedo, and move
/// the origin just off the surface. The three stochastic draws happen in a
/// fixed order (lobe perturbation, reflect branch, transmit branch) so a
/// seeded sampler replays the exact same path.
pub fn ray_surface_interaction(
    ray: &mut Ray,
    scene: &Scene,
    index: usize,
    position: &na::Vector3<f32>,
    sampler: &mut RenderSampler,
) {
    let material = &scene.object(index).material;
    let albedo = material.albedo;
    let roughness = material.roughness;
    let metallic = material.metallic;
    let transmission = material.transmission;
    let ior = material.ior;

    let mut normal = scene.calc_normal(index, position);
    let outer = ray.direction.dot(&normal) < 0.0;
    if !outer {
        normal = -normal;
    }

    let hemispheric_sample = hemispheric_sampling(&normal, sampler);
    let roughness_sample = roughness_sampling(&hemispheric_sample, &normal, roughness);

    let n = roughness_sample;
    let i = ray.direction;
    let no_i = n.dot(&i);

    let eta = if outer { ENV_IOR / ior } else { ior / ENV_IOR };
    // total-internal-reflection discriminant; negative k forces reflection
    // and keeps the sqrt below well defined
    let k = 1.0 - eta * eta * (1.0 - no_i * no_i);
    let f0 = 2.0 * (eta - 1.0) / (eta + 1.0);
    let f = fresnel_schlick(no_i, f0 * f0, roughness);

    if sampler.get_1d() < f + metallic || k < 0.0 {
        ray.direction = i - 2.0 * no_i * n;
        // a perturbed normal can reflect into the surface; that energy is lost
        if ray.direction.dot(&normal) <= 0.0 {
            ray.color = na::Vector3::zeros();
        }
    } else if sampler.get_1d() < transmission {
        ray.direction = eta * i - (k.sqrt() + eta * no_i) * n;
    } else {
        ray.direction = hemispheric_sample;
    }

    ray.color.component_mul_assign(&albedo);

    let outgoing_outer = ray.direction.dot(&normal) < 0.0;
    let offset = if outgoing_outer { -MIN_DIS } else { MIN_DIS };
    ray.origin = position + normal * offset;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::scene::{Material, SdfObject, Transform};
    use crate::renderer::sdf::ShapeKind;

    fn scene_with_material(material: Material) -> Scene {
        Scene::new(vec![SdfObject::new(
            ShapeKind::Sphere,
            Transform::new(
                na::Vector3::zeros(),
                na::Vector3::zeros(),
                na::Vector3::from_element(1.0),
            ),
            material,
        )])
    }

    fn incoming_ray() -> Ray {
        Ray {
            origin: na::Vector3::new(0.0, 0.0, 2.0),
            direction: na::Vector3::new(0.0, 0.0, -1.0),
            color: na::Vector3::from_element(1.0),
            depth: 1,
        }
    }

    #[test]
    fn test_fresnel_schlick_bounds() {
        // head-on incidence on a smooth surface stays near base reflectance
        let f0 = 0.04;
        let f = fresnel_schlick(-1.0, f0, 0.0);
        approx::assert_relative_eq!(f, f0, epsilon = 1e-6);
        // grazing incidence approaches full reflectance
        let f = fresnel_schlick(0.0, f0, 0.0);
        assert!(f > 0.9);
    }

    #[test]
    fn test_hemispheric_sampling_stays_in_hemisphere() {
        let mut sampler = RenderSampler::new(11);
        let normal = na::Vector3::y();
        for _ in 0..1000 {
            let d = hemispheric_sampling(&normal, &mut sampler);
            assert!(d.dot(&normal) >= 0.0);
            approx::assert_relative_eq!(d.norm(), 1.0, epsilon = 1e-5);
        }
    }

    #[test]
    fn test_mirror_reflection_direction() {
        // metallic 1, roughness 0: the branch always reflects and the lobe is
        // unperturbed, so the direction is the exact mirror reflection
        let scene = scene_with_material(Material {
            albedo: na::Vector3::from_element(1.0),
            emission: na::Vector3::from_element(1.0),
            roughness: 0.0,
            metallic: 1.0,
            transmission: 0.0,
            ior: 1.5,
        });
        let mut sampler = RenderSampler::new(1);
        let mut ray = incoming_ray();
        let hit = na::Vector3::new(0.0, 0.0, 1.0);
        ray_surface_interaction(&mut ray, &scene, 0, &hit, &mut sampler);
        approx::assert_relative_eq!(
            ray.direction,
            na::Vector3::new(0.0, 0.0, 1.0),
            epsilon = 1e-3
        );
        // origin pushed off the surface along the normal
        assert!(ray.origin.z > 1.0);
    }

    #[test]
    fn test_diffuse_bounce_leaves_surface() {
        let scene = scene_with_material(Material::diffuse(na::Vector3::from_element(0.5)));
        for seed in 0..200 {
            let mut sampler = RenderSampler::new(seed);
            let mut ray = incoming_ray();
            let hit = na::Vector3::new(0.0, 0.0, 1.0);
            ray_surface_interaction(&mut ray, &scene, 0, &hit, &mut sampler);
            if ray.color != na::Vector3::zeros() {
                assert!(
                    ray.direction.dot(&na::Vector3::z()) > -1e-3,
                    "diffuse sample re-entered the surface"
                );
            }
        }
    }

    #[test]
    fn test_albedo_attenuates_color() {
        let albedo = na::Vector3::new(0.25, 0.5, 0.75);
        let scene = scene_with_material(Material::diffuse(albedo));
        let mut sampler = RenderSampler::new(5);
        let mut ray = incoming_ray();
        ray_surface_interaction(
            &mut ray,
            &scene,
            0,
            &na::Vector3::new(0.0, 0.0, 1.0),
            &mut sampler,
        );
        if ray.color != na::Vector3::zeros() {
            approx::assert_relative_eq!(ray.color, albedo, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_transmission_enters_glass() {
        let scene = scene_with_material(Material {
            albedo: na::Vector3::from_element(1.0),
            emission: na::Vector3::from_element(1.0),
            roughness: 0.0,
            metallic: 0.0,
            transmission: 1.0,
            ior: 1.5,
        });
        let mut refracted = 0;
        for seed in 0..500 {
            let mut sampler = RenderSampler::new(seed);
            let mut ray = incoming_ray();
            ray_surface_interaction(
                &mut ray,
                &scene,
                0,
                &na::Vector3::new(0.0, 0.0, 1.0),
                &mut sampler,
            );
            if ray.direction.z < 0.0 {
                refracted += 1;
            }
        }
        // head-on dielectric reflectance is ~4%, most samples must refract
        assert!(refracted > 400, "only {} of 500 samples refracted", refracted);
    }
}
