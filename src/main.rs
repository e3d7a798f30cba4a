#[macro_use]
extern crate slog;

extern crate nalgebra as na;
extern crate nalgebra_glm as glm;

use anyhow::Context;
use clap::clap_app;
use indicatif::{ProgressBar, ProgressStyle};
use marcher_rs::common::envmap::EnvironmentMap;
use marcher_rs::common::film::Film;
use marcher_rs::common::{self, CameraPose};
use marcher_rs::renderer::integrator::PathIntegrator;
use marcher_rs::renderer::scene::{Material, Scene, SdfObject, Transform};
use marcher_rs::renderer::sdf::ShapeKind;
use marcher_rs::renderer::RenderContext;
use slog::Drain;
use std::path::Path;

fn new_drain(level: slog::Level) -> slog::Fuse<slog::LevelFilter<slog::Fuse<slog_async::Async>>> {
    let decorator = slog_term::TermDecorator::new().build();
    let drain = slog_term::FullFormat::new(decorator).build().fuse();
    let drain = slog_async::Async::new(drain).build().fuse();
    drain.filter_level(level).fuse()
}

/// Showcase scene: emissive sphere over a metallic ground plane, one of each
/// remaining shape kind around it.
fn demo_scene() -> Scene {
    let unrotated = na::Vector3::zeros();
    Scene::new(vec![
        SdfObject::new(
            ShapeKind::Plane,
            Transform::new(
                na::Vector3::new(0.0, -0.5, 0.0),
                unrotated,
                na::Vector3::from_element(1.0),
            ),
            Material {
                albedo: na::Vector3::from_element(0.6),
                emission: na::Vector3::from_element(1.0),
                roughness: 1.0,
                metallic: 1.0,
                transmission: 0.0,
                ior: 1.635,
            },
        ),
        SdfObject::new(
            ShapeKind::Sphere,
            Transform::new(
                na::Vector3::zeros(),
                unrotated,
                na::Vector3::from_element(0.5),
            ),
            Material::emissive(na::Vector3::from_element(10.0)),
        ),
        SdfObject::new(
            ShapeKind::Sphere,
            Transform::new(
                na::Vector3::new(1.0, -0.2, 0.0),
                unrotated,
                na::Vector3::from_element(0.3),
            ),
            Material {
                albedo: na::Vector3::new(0.2, 0.2, 1.0),
                emission: na::Vector3::from_element(1.0),
                roughness: 0.2,
                metallic: 1.0,
                transmission: 0.0,
                ior: 1.1,
            },
        ),
        SdfObject::new(
            ShapeKind::Sphere,
            Transform::new(
                na::Vector3::new(0.0, -0.2, 2.0),
                unrotated,
                na::Vector3::from_element(0.3),
            ),
            Material {
                albedo: na::Vector3::from_element(0.9),
                emission: na::Vector3::from_element(1.0),
                roughness: 0.0,
                metallic: 0.0,
                transmission: 1.0,
                ior: 1.5,
            },
        ),
        SdfObject::new(
            ShapeKind::Cylinder,
            Transform::new(
                na::Vector3::new(-1.0, -0.2, 0.0),
                unrotated,
                na::Vector3::from_element(0.3),
            ),
            Material {
                albedo: na::Vector3::new(1.0, 0.2, 0.2),
                emission: na::Vector3::from_element(1.0),
                roughness: 0.0,
                metallic: 0.0,
                transmission: 0.0,
                ior: 1.46,
            },
        ),
        SdfObject::new(
            ShapeKind::Cone,
            Transform::new(
                na::Vector3::new(-0.6, -0.2, 1.2),
                unrotated,
                na::Vector3::new(0.3, 0.3, 0.3),
            ),
            Material {
                albedo: na::Vector3::new(0.2, 0.8, 0.3),
                emission: na::Vector3::from_element(1.0),
                roughness: 0.3,
                metallic: 0.0,
                transmission: 0.0,
                ior: 1.3,
            },
        ),
        SdfObject::new(
            ShapeKind::Menger,
            Transform::new(
                na::Vector3::new(1.2, -0.1, 1.5),
                na::Vector3::new(0.0, 30.0, 0.0),
                na::Vector3::from_element(0.4),
            ),
            Material {
                albedo: na::Vector3::new(1.0, 0.8, 0.3),
                emission: na::Vector3::from_element(1.0),
                roughness: 0.5,
                metallic: 0.0,
                transmission: 0.0,
                ior: 1.4,
            },
        ),
        SdfObject::new(
            ShapeKind::Box,
            Transform::new(
                na::Vector3::new(0.0, 0.0, 5.0),
                unrotated,
                na::Vector3::new(2.0, 1.0, 0.2),
            ),
            Material {
                albedo: na::Vector3::new(0.9, 0.9, 0.18),
                emission: na::Vector3::from_element(1.0),
                roughness: 0.0,
                metallic: 1.0,
                transmission: 0.0,
                ior: 0.47,
            },
        ),
        SdfObject::new(
            ShapeKind::Box,
            Transform::new(
                na::Vector3::new(0.0, 0.0, -2.0),
                unrotated,
                na::Vector3::new(2.0, 1.0, 0.2),
            ),
            Material {
                albedo: na::Vector3::from_element(0.9),
                emission: na::Vector3::from_element(1.0),
                roughness: 0.0,
                metallic: 1.0,
                transmission: 0.0,
                ior: 2.95,
            },
        ),
    ])
}

fn main() -> anyhow::Result<()> {
    let matches = clap_app!(marcher_rs =>
        (version: "1.0")
        (author: "Eric F. <eric1221bday@gmail.com>")
        (about: "Progressive path tracer over signed-distance-field scenes")
        (@arg output: -o --output +takes_value +required "Sets the output path of the rendered image")
        (@arg frames: -f --frames default_value("64") "Number of progressive frames to accumulate")
        (@arg samples: -s --samples default_value("1") "Samples per pixel per frame")
        (@arg width: --width +takes_value "Horizontal resolution")
        (@arg height: --height +takes_value "Vertical resolution")
        (@arg environment: -e --environment +takes_value "Equirectangular HDR environment map to light the scene with")
        (@arg verbose: -v --verbose "Print frame information verbosely")
    )
    .get_matches();

    let level = if matches.is_present("verbose") {
        slog::Level::Debug
    } else {
        slog::Level::Info
    };
    let log = slog::Logger::root(new_drain(level), o!());

    let output_path = Path::new(matches.value_of("output").unwrap()).to_owned();
    let frames = matches
        .value_of("frames")
        .unwrap()
        .parse::<u64>()
        .context("could not parse frame count")?;
    let samples = matches
        .value_of("samples")
        .unwrap()
        .parse::<u32>()
        .context("could not parse sample count")?;
    let width = match matches.value_of("width") {
        Some(arg) => arg.parse::<u32>().context("could not parse width")?,
        None => common::DEFAULT_RESOLUTION.x,
    };
    let height = match matches.value_of("height") {
        Some(arg) => arg.parse::<u32>().context("could not parse height")?,
        None => common::DEFAULT_RESOLUTION.y,
    };
    let resolution = glm::vec2(width, height);

    // a named but unreadable asset is fatal at startup; no asset at all
    // falls back to the procedural sky
    let sky = match matches.value_of("environment") {
        Some(path) => {
            info!(log, "loading environment map"; "path" => path);
            EnvironmentMap::load(Path::new(path), 1.8, common::DEFAULT_GAMMA)?
        }
        None => EnvironmentMap::gradient(),
    };

    let film = Film::new(&resolution, common::DEFAULT_EXPOSURE, common::DEFAULT_GAMMA);
    let mut context = RenderContext::new(
        &log,
        demo_scene(),
        sky,
        film,
        PathIntegrator::default(),
    )
    .samples_per_frame(samples);

    let pose = CameraPose::new(
        na::Point3::new(0.0, -0.2, 4.0),
        na::Point3::new(0.0, -0.2, 0.0),
        35.0,
        &resolution,
    );

    info!(log, "rendering"; "frames" => frames, "samples" => samples, "resolution" => format!("{}x{}", width, height));
    let progress = ProgressBar::new(frames);
    progress.set_style(
        ProgressStyle::default_bar().template("{wide_bar} {pos}/{len} frames [{elapsed_precise}]"),
    );
    for _ in 0..frames {
        context.render_frame(&pose);
        progress.inc(1);
    }
    progress.finish();

    context.save(&output_path)?;
    info!(log, "done"; "output" => format!("{:?}", output_path));

    Ok(())
}
