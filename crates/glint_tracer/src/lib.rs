//! Glint tracer - Whitted-style CPU ray tracing
//!
//! Shapes (spheres, planes, cubes, cylinders, cones and groups) are
//! intersected with rays, and hit points are shaded with the Phong model plus
//! shadows, recursive reflection and refraction weighted by Schlick's
//! approximation. Rendering runs one pixel per rayon task, each worker reusing
//! its own intersection arena.

mod arena;
mod camera;
mod intersection;
mod material;
mod pattern;
mod renderer;
mod shape;
mod world;

use thiserror::Error;

pub use arena::{Arena, ArenaError};
pub use camera::{Camera, CameraError};
pub use intersection::{
    hit, prepare_computations, schlick, sort_intersections, Computations, Intersection,
    INTERSECTION_EPSILON,
};
pub use material::{Color, Material, PointLight};
pub use pattern::{Pattern, PatternKind};
pub use renderer::{color_to_rgba, render, ImageBuffer, RenderConfig, RenderStats};
pub use shape::{
    Cone, Cube, Cylinder, Geometry, Group, Plane, SceneError, Shape, ShapeGraph, ShapeId,
    ShapeKind, Sphere,
};
pub use world::{World, DEFAULT_MAX_DEPTH};

/// Re-export math types from glint_math
pub use glint_math::{view_transform, Aabb, DMat4, DVec3, Interval, Ray, EPSILON};

/// Any error the tracer can report.
#[derive(Error, Debug)]
pub enum TracerError {
    #[error(transparent)]
    Arena(#[from] ArenaError),

    #[error(transparent)]
    Scene(#[from] SceneError),

    #[error(transparent)]
    Camera(#[from] CameraError),
}
