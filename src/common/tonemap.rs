//! ACES fitted filmic tone mapping, constants from Stephen Hill's fit of the
//! RRT+ODT reference transform.

lazy_static::lazy_static! {
    static ref ACES_INPUT_MAT: na::Matrix3<f32> = na::Matrix3::new(
        0.59719, 0.35458, 0.04823, //
        0.07600, 0.90834, 0.01566, //
        0.02840, 0.13383, 0.83777,
    );

    static ref ACES_OUTPUT_MAT: na::Matrix3<f32> = na::Matrix3::new(
        1.60475, -0.53108, -0.07367, //
        -0.10208, 1.10813, -0.00605, //
        -0.00327, -0.07276, 1.07602,
    );
}

fn rrt_and_odt_fit(v: &na::Vector3<f32>) -> na::Vector3<f32> {
    let a = v.component_mul(&v.add_scalar(0.0245786)).add_scalar(-0.000090537);
    let b = v
        .component_mul(&(v * 0.983729).add_scalar(0.4329510))
        .add_scalar(0.238081);
    a.component_div(&b)
}

pub fn aces_fitted(color: &na::Vector3<f32>) -> na::Vector3<f32> {
    let color = *ACES_INPUT_MAT * color;
    let color = rrt_and_odt_fit(&color);
    *ACES_OUTPUT_MAT * color
}

/// Linear radiance to display color: exposure, filmic curve, gamma, clamp.
pub fn to_display(color: &na::Vector3<f32>, exposure: f32, gamma: f32) -> na::Vector3<f32> {
    let color = aces_fitted(&(color * exposure));
    let inv_gamma = 1.0 / gamma;
    na::Vector3::new(
        color.x.max(0.0).powf(inv_gamma).clamp(0.0, 1.0),
        color.y.max(0.0).powf(inv_gamma).clamp(0.0, 1.0),
        color.z.max(0.0).powf(inv_gamma).clamp(0.0, 1.0),
    )
}
