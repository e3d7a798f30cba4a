pub const INV_2_PI: f32 = std::f32::consts::FRAC_1_PI * 0.5;

/// Perceptual luminance of a linear RGB color (ITU-R BT.601 weights, matching
/// the integrator's visibility heuristic).
pub fn brightness(rgb: &na::Vector3<f32>) -> f32 {
    rgb.dot(&na::Vector3::new(0.299, 0.587, 0.114))
}

/// Rotation matrix from Euler angles in radians, composed in Z * Y * X order.
pub fn euler_rotation(a: &na::Vector3<f32>) -> na::Matrix3<f32> {
    let (sx, cx) = a.x.sin_cos();
    let (sy, cy) = a.y.sin_cos();
    let (sz, cz) = a.z.sin_cos();

    let rz = na::Matrix3::new(
        cz, -sz, 0.0, //
        sz, cz, 0.0, //
        0.0, 0.0, 1.0,
    );
    let ry = na::Matrix3::new(
        cy, 0.0, sy, //
        0.0, 1.0, 0.0, //
        -sy, 0.0, cy,
    );
    let rx = na::Matrix3::new(
        1.0, 0.0, 0.0, //
        0.0, cx, -sx, //
        0.0, sx, cx,
    );

    rz * ry * rx
}

/// Equirectangular UV for a unit direction, `u = atan2(z, x) / 2pi + 0.5`,
/// `v = asin(y) / pi + 0.5`.
pub fn spherical_uv(v: &na::Vector3<f32>) -> na::Vector2<f32> {
    na::Vector2::new(
        v.z.atan2(v.x) * INV_2_PI + 0.5,
        v.y.clamp(-1.0, 1.0).asin() * std::f32::consts::FRAC_1_PI + 0.5,
    )
}

pub fn mix(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

pub fn mix_vec3(a: &na::Vector3<f32>, b: &na::Vector3<f32>, t: f32) -> na::Vector3<f32> {
    a + (b - a) * t
}

/// Normalize with a defined fallback so grazing-angle degeneracies never
/// produce NaN directions.
pub fn normalize_or(v: &na::Vector3<f32>, fallback: &na::Vector3<f32>) -> na::Vector3<f32> {
    let len = v.norm();
    if len > 1e-12 {
        v / len
    } else {
        *fallback
    }
}
