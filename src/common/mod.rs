pub mod envmap;
pub mod film;
pub mod math;
pub mod tonemap;

lazy_static::lazy_static! {
    pub static ref DEFAULT_RESOLUTION: glm::UVec2 = glm::vec2(768, 432);
}

/// Distance below which a march is considered to start on a surface, also
/// used to nudge bounce origins off the surface they scattered from.
pub const MIN_DIS: f32 = 0.005;
/// Travel distance beyond which a ray is treated as escaped to the sky.
pub const MAX_DIS: f32 = 1e3;

pub const MAX_RAYMARCH: usize = 512;
pub const MAX_RAYTRACE: usize = 512;

/// Running-color luminance window; rays outside it carry no visible energy.
pub const VISIBILITY: (f32, f32) = (1e-4, 1e4);

/// Index of refraction of the medium surrounding the scene (air).
pub const ENV_IOR: f32 = 1.000_277;

/// Russian-roulette depth decay constant, larger is higher quality.
pub const LIGHT_QUALITY: f32 = 128.0;

pub const DEFAULT_EXPOSURE: f32 = 1.0;
pub const DEFAULT_GAMMA: f32 = 2.2;

/// Camera pose handed to the renderer each frame by whatever owns the
/// window/input loop. The renderer never smooths or interpolates this, it
/// only consumes the latest pose and the motion flag.
#[derive(Clone, Debug)]
pub struct CameraPose {
    pub lookfrom: na::Point3<f32>,
    pub lookat: na::Point3<f32>,
    pub vup: na::Vector3<f32>,
    /// Vertical field of view in degrees.
    pub vfov: f32,
    pub aspect: f32,
    pub aperture: f32,
    pub focus: f32,
    /// True when the view changed beyond the motion threshold since the last
    /// frame; accumulation restarts from zero.
    pub moving: bool,
}

impl CameraPose {
    pub fn new(
        lookfrom: na::Point3<f32>,
        lookat: na::Point3<f32>,
        vfov: f32,
        resolution: &glm::UVec2,
    ) -> Self {
        Self {
            lookfrom,
            lookat,
            vup: na::Vector3::y(),
            vfov,
            aspect: resolution.x as f32 / resolution.y as f32,
            aperture: 0.01,
            focus: 4.0,
            moving: false,
        }
    }
}
