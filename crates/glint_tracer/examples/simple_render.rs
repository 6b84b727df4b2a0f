//! Simple Whitted ray tracer example.
//!
//! Renders a room with one of every primitive and saves to PPM format.
//! Usage: `cargo run --release --example simple_render [output.ppm]`

use std::f64::consts::{FRAC_PI_2, FRAC_PI_3, FRAC_PI_4};
use std::fs::File;
use std::io::{BufWriter, Write};

use anyhow::{Context, Result};
use glint_tracer::{
    color_to_rgba, Camera, Color, Cone, Cylinder, DMat4, DVec3, ImageBuffer, Material, Pattern,
    PointLight, RenderConfig, Shape, World,
};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let filename = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "output.ppm".to_string());

    let start = std::time::Instant::now();
    let world = build_scene()?;
    log::info!(
        "Scene built in {:?} ({} shapes)",
        start.elapsed(),
        world.shapes().len()
    );

    let camera = Camera::new(800, 450, FRAC_PI_3)?.look_at(
        DVec3::new(0.0, 1.5, -5.0),
        DVec3::new(0.0, 1.0, 0.0),
        DVec3::Y,
    )?;

    let (image, stats) = camera.render(&world, &RenderConfig::default())?;
    if stats.arena_overflow > 0 {
        log::warn!("Image may be missing surfaces; raise arena_capacity_bytes");
    }

    save_ppm(&image, &filename).with_context(|| format!("Failed to save {filename}"))?;
    log::info!("Saved to {}", filename);
    Ok(())
}

fn build_scene() -> Result<World> {
    let mut world = World::new();
    world.add_light(PointLight::new(DVec3::new(-10.0, 10.0, -10.0), Color::ONE));
    world.add_light(PointLight::new(
        DVec3::new(5.0, 8.0, -8.0),
        Color::splat(0.3),
    ));

    // Floor and back wall
    world.add_shape(Shape::plane().with_material(Material {
        pattern: Some(Pattern::checker(
            Color::splat(0.9),
            Color::new(0.2, 0.25, 0.3),
        )),
        specular: 0.0,
        reflective: 0.15,
        ..Default::default()
    }));
    world.add_shape(
        Shape::plane()
            .with_transform(
                DMat4::from_translation(DVec3::new(0.0, 0.0, 10.0))
                    * DMat4::from_rotation_x(FRAC_PI_2),
            )?
            .with_material(Material {
                pattern: Some(
                    Pattern::stripe(Color::new(0.6, 0.5, 0.4), Color::new(0.5, 0.4, 0.3))
                        .with_transform(DMat4::from_rotation_y(FRAC_PI_4))?,
                ),
                specular: 0.0,
                ..Default::default()
            }),
    );

    // Glass sphere holding an air bubble
    world.add_shape(
        Shape::glass_sphere()
            .with_transform(DMat4::from_translation(DVec3::new(0.0, 1.0, 0.5)))?
            .with_material(Material {
                color: Color::splat(0.05),
                ambient: 0.0,
                diffuse: 0.1,
                reflective: 0.9,
                shininess: 300.0,
                ..Material::glass()
            })
            .with_shadow(false),
    );
    world.add_shape(
        Shape::sphere()
            .with_transform(
                DMat4::from_translation(DVec3::new(0.0, 1.0, 0.5))
                    * DMat4::from_scale(DVec3::splat(0.5)),
            )?
            .with_material(Material {
                color: Color::ZERO,
                ambient: 0.0,
                diffuse: 0.0,
                transparency: 1.0,
                refractive_index: 1.0003,
                ..Default::default()
            })
            .with_shadow(false),
    );

    // A table: a cube top on four cylinder legs, grouped and rotated together
    let table = world.add_shape(Shape::group().with_transform(
        DMat4::from_translation(DVec3::new(-2.5, 0.0, 2.0)) * DMat4::from_rotation_y(0.4),
    )?);
    world.add_child(
        table,
        Shape::cube()
            .with_transform(
                DMat4::from_translation(DVec3::new(0.0, 1.0, 0.0))
                    * DMat4::from_scale(DVec3::new(1.0, 0.05, 0.7)),
            )?
            .with_material(Material {
                pattern: Some(
                    Pattern::ring(Color::new(0.55, 0.35, 0.2), Color::new(0.45, 0.28, 0.15))
                        .with_transform(DMat4::from_scale(DVec3::splat(0.05)))?,
                ),
                reflective: 0.1,
                ..Default::default()
            }),
    )?;
    for (x, z) in [(-0.9, -0.6), (0.9, -0.6), (-0.9, 0.6), (0.9, 0.6)] {
        world.add_child(
            table,
            Shape::cylinder(Cylinder::new(0.0, 0.95, true))
                .with_transform(
                    DMat4::from_translation(DVec3::new(x, 0.0, z))
                        * DMat4::from_scale(DVec3::new(0.05, 1.0, 0.05)),
                )?
                .with_material(Material::with_color(Color::new(0.3, 0.2, 0.1))),
        )?;
    }

    // Cone lamp on the right
    world.add_shape(
        Shape::cone(Cone::new(-1.0, 0.0, true))
            .with_transform(
                DMat4::from_translation(DVec3::new(2.5, 1.5, 1.5))
                    * DMat4::from_scale(DVec3::new(0.6, 1.5, 0.6)),
            )?
            .with_material(Material {
                pattern: Some(Pattern::gradient(
                    Color::new(0.9, 0.2, 0.1),
                    Color::new(0.9, 0.8, 0.1),
                )),
                ..Default::default()
            }),
    );

    Ok(world)
}

fn save_ppm(image: &ImageBuffer, filename: &str) -> std::io::Result<()> {
    let file = File::create(filename)?;
    let mut writer = BufWriter::new(file);

    writeln!(writer, "P3")?;
    writeln!(writer, "{} {}", image.width, image.height)?;
    writeln!(writer, "255")?;

    for y in 0..image.height {
        for x in 0..image.width {
            let rgba = color_to_rgba(image.get(x, y));
            writeln!(writer, "{} {} {}", rgba[0], rgba[1], rgba[2])?;
        }
    }

    writer.flush()
}
