use super::math::spherical_uv;
use anyhow::Context;
use std::path::Path;

/// Pre-decoded equirectangular environment map. Radiance lookups are a
/// nearest-texel fetch through the spherical mapping; decode and exposure
/// pre-processing happen once at load time so the render kernel never touches
/// the image crate.
pub enum EnvironmentMap {
    Image {
        width: u32,
        height: u32,
        texels: Vec<na::Vector3<f32>>,
    },
    /// Procedural vertical gradient, the no-asset fallback sky.
    Gradient {
        horizon: na::Vector3<f32>,
        zenith: na::Vector3<f32>,
    },
}

impl EnvironmentMap {
    pub fn load(path: &Path, exposure: f32, gamma: f32) -> anyhow::Result<Self> {
        let image = image::open(path)
            .with_context(|| format!("failed to load environment map {:?}", path))?
            .to_rgb32f();
        let (width, height) = image.dimensions();

        let texels = image
            .pixels()
            .map(|p| {
                na::Vector3::new(
                    (p[0] * exposure).max(0.0).powf(gamma),
                    (p[1] * exposure).max(0.0).powf(gamma),
                    (p[2] * exposure).max(0.0).powf(gamma),
                )
            })
            .collect();

        Ok(Self::Image {
            width,
            height,
            texels,
        })
    }

    pub fn gradient() -> Self {
        Self::Gradient {
            horizon: na::Vector3::new(1.0, 1.0, 1.0),
            zenith: na::Vector3::new(0.5, 0.7, 1.0),
        }
    }

    /// Sky radiance along a unit direction.
    pub fn sample(&self, direction: &na::Vector3<f32>) -> na::Vector3<f32> {
        match self {
            Self::Image {
                width,
                height,
                texels,
            } => {
                let uv = spherical_uv(direction);
                let x = ((uv.x * *width as f32) as u32).min(width - 1);
                // texel rows run top to bottom, v runs bottom to top
                let y = (((1.0 - uv.y) * *height as f32) as u32).min(height - 1);
                texels[(y * width + x) as usize]
            }
            Self::Gradient { horizon, zenith } => {
                let t = 0.5 * (direction.y + 1.0);
                horizon + (zenith - horizon) * t
            }
        }
    }
}
