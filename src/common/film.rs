use super::tonemap;
use anyhow::Context;
use image::RgbImage;
use itertools::Itertools;
use std::path::Path;

/// Progressive accumulation buffer. Each pixel keeps a running radiance sum
/// in rgb and its sample count in the fourth component; the display value is
/// always the tone-mapped mean. The weight only grows within a convergence
/// epoch and is zeroed exactly when the camera moves.
pub struct Film {
    pub resolution: glm::UVec2,
    pixels: Vec<na::Vector4<f32>>,
    exposure: f32,
    gamma: f32,
}

impl Film {
    pub fn new(resolution: &glm::UVec2, exposure: f32, gamma: f32) -> Self {
        Self {
            resolution: *resolution,
            pixels: vec![na::Vector4::zeros(); (resolution.x * resolution.y) as usize],
            exposure,
            gamma,
        }
    }

    pub fn clear(&mut self) {
        for pixel in &mut self.pixels {
            *pixel = na::Vector4::zeros();
        }
    }

    pub fn add_sample(&mut self, x: u32, y: u32, color: &na::Vector3<f32>) {
        let pixel = &mut self.pixels[(y * self.resolution.x + x) as usize];
        *pixel += na::Vector4::new(color.x, color.y, color.z, 1.0);
    }

    /// Accumulated (sum, weight) for one pixel.
    pub fn get_pixel(&self, x: u32, y: u32) -> &na::Vector4<f32> {
        &self.pixels[(y * self.resolution.x + x) as usize]
    }

    /// Rows of the raw accumulation buffer, for the data-parallel shading
    /// loop; every invocation owns exactly its own row slice.
    pub fn rows_mut(&mut self) -> std::slice::ChunksMut<'_, na::Vector4<f32>> {
        let width = self.resolution.x as usize;
        self.pixels.chunks_mut(width)
    }

    /// Tone-mapped mean radiance of one pixel. The first-frame zero weight is
    /// guarded, an unsampled pixel reads as black.
    pub fn display_pixel(&self, x: u32, y: u32) -> na::Vector3<f32> {
        let buffer = self.get_pixel(x, y);
        let mean = if buffer.w > 0.0 {
            buffer.xyz() / buffer.w
        } else {
            na::Vector3::zeros()
        };
        tonemap::to_display(&mean, self.exposure, self.gamma)
    }

    /// Full display read-out as linear rows of RGB floats, the only surface
    /// the window presenter consumes.
    pub fn to_display(&self) -> Vec<na::Vector3<f32>> {
        (0..self.resolution.y)
            .cartesian_product(0..self.resolution.x)
            .map(|(y, x)| self.display_pixel(x, y))
            .collect()
    }

    pub fn to_rgb_image(&self) -> RgbImage {
        let mut image = RgbImage::new(self.resolution.x, self.resolution.y);
        for (x, y, pixel) in image.enumerate_pixels_mut() {
            // image rows run top to bottom, film rows bottom to top
            let color = self.display_pixel(x, self.resolution.y - 1 - y);
            *pixel = image::Rgb([
                (color.x * 255.0 + 0.5) as u8,
                (color.y * 255.0 + 0.5) as u8,
                (color.z * 255.0 + 0.5) as u8,
            ]);
        }
        image
    }

    pub fn save(&self, file_path: &Path) -> anyhow::Result<()> {
        self.to_rgb_image()
            .save(file_path)
            .with_context(|| format!("failed to save render to {:?}", file_path))
    }
}
