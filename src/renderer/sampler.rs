use rand::{Rng, SeedableRng};

pub type Random = rand::rngs::SmallRng;

/// Explicit per-pixel random stream, threaded through the march/bounce calls
/// instead of any ambient RNG. Seeding is deterministic in (pixel, frame) so
/// renders are reproducible under test.
pub struct RenderSampler {
    rng: Random,
}

impl RenderSampler {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Random::seed_from_u64(seed),
        }
    }

    /// Seed for the sampler shading pixel (x, y) on a given frame. Mixed with
    /// splitmix-style odd constants so neighboring pixels land far apart in
    /// the stream.
    pub fn pixel_seed(x: u32, y: u32, frame: u64) -> u64 {
        (x as u64)
            .wrapping_mul(0x9e37_79b9_7f4a_7c15)
            .wrapping_add((y as u64).wrapping_mul(0x6c62_272e_07bb_0142))
            .wrapping_add(frame.wrapping_mul(0x2545_f491_4f6c_dd1d))
    }

    pub fn get_1d(&mut self) -> f32 {
        self.rng.gen::<f32>()
    }

    pub fn get_2d(&mut self) -> na::Vector2<f32> {
        na::Vector2::new(self.rng.gen::<f32>(), self.rng.gen::<f32>())
    }

    pub fn in_unit_disk(&mut self) -> na::Vector2<f32> {
        let u = self.get_2d();
        let r = u.x.sqrt();
        let a = u.y * 2.0 * std::f32::consts::PI;
        na::Vector2::new(r * a.sin(), r * a.cos())
    }

    pub fn on_unit_sphere(&mut self) -> na::Vector3<f32> {
        let u = self.get_2d();
        let z = 2.0 * u.x - 1.0;
        let a = u.y * 2.0 * std::f32::consts::PI;
        let r = (1.0 - z * z).max(0.0).sqrt();
        na::Vector3::new(r * a.sin(), r * a.cos(), z)
    }
}
