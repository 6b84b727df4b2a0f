//! Shapes: a shared transform/material base over per-kind local geometry.
//!
//! Every primitive is defined in its own object space (unit sphere at the
//! origin, the xz plane, and so on). A [`Shape`] places it in its parent's
//! space through a transform whose inverse is cached alongside it. Shapes live
//! in a [`ShapeGraph`] and are addressed by [`ShapeId`]; groups store child ids
//! and every shape stores its parent's id.

mod cone;
mod cube;
mod cylinder;
mod graph;
mod plane;
mod sphere;

pub use cone::Cone;
pub use cube::Cube;
pub use cylinder::Cylinder;
pub use graph::ShapeGraph;
pub use plane::Plane;
pub use sphere::Sphere;

use glint_math::{Aabb, DMat4, DVec3, Mat4Ext, Ray};
use thiserror::Error;

use crate::{Arena, Intersection, Material};

/// Errors raised while building a scene.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SceneError {
    #[error("Transform matrix is not invertible")]
    NonInvertibleTransform,

    #[error("Shape {0:?} is not a group")]
    NotAGroup(ShapeId),

    #[error("Unknown shape {0:?}")]
    UnknownShape(ShapeId),
}

/// Handle to a shape inside a [`ShapeGraph`]. Issued in insertion order and
/// stable for the lifetime of the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ShapeId(u32);

impl ShapeId {
    pub(crate) fn new(index: u32) -> Self {
        Self(index)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Local-space geometry of a primitive.
pub trait Geometry {
    /// Push every intersection of the object-space `ray` into `xs`, tagged
    /// with `id`. Negative distances are kept.
    fn local_intersect(&self, ray: &Ray, id: ShapeId, xs: &mut Arena<Intersection>);

    /// Surface normal at an object-space point. Not necessarily normalized.
    fn local_normal_at(&self, point: DVec3) -> DVec3;

    /// Object-space bounding box.
    fn bounds(&self) -> Aabb;
}

/// Ordered children of a group.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Group {
    children: Vec<ShapeId>,
}

impl Group {
    pub fn children(&self) -> &[ShapeId] {
        &self.children
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ShapeKind {
    Sphere(Sphere),
    Plane(Plane),
    Cube(Cube),
    Cylinder(Cylinder),
    Cone(Cone),
    Group(Group),
}

impl ShapeKind {
    /// Primitive geometry, or `None` for a group.
    pub fn geometry(&self) -> Option<&dyn Geometry> {
        match self {
            ShapeKind::Sphere(s) => Some(s),
            ShapeKind::Plane(p) => Some(p),
            ShapeKind::Cube(c) => Some(c),
            ShapeKind::Cylinder(c) => Some(c),
            ShapeKind::Cone(c) => Some(c),
            ShapeKind::Group(_) => None,
        }
    }
}

/// A primitive or group together with its placement and surface.
#[derive(Debug, Clone)]
pub struct Shape {
    kind: ShapeKind,
    transform: DMat4,
    inverse: DMat4,
    normal_matrix: DMat4,
    material: Material,
    casts_shadow: bool,
    parent: Option<ShapeId>,
    bounds: Aabb,
}

impl Shape {
    pub fn new(kind: ShapeKind) -> Self {
        let bounds = match kind.geometry() {
            Some(geometry) => geometry.bounds(),
            None => Aabb::EMPTY,
        };

        Self {
            kind,
            transform: DMat4::IDENTITY,
            inverse: DMat4::IDENTITY,
            normal_matrix: DMat4::IDENTITY,
            material: Material::default(),
            casts_shadow: true,
            parent: None,
            bounds,
        }
    }

    pub fn sphere() -> Self {
        Self::new(ShapeKind::Sphere(Sphere))
    }

    /// Unit sphere with [`Material::glass`].
    pub fn glass_sphere() -> Self {
        Self::sphere().with_material(Material::glass())
    }

    pub fn plane() -> Self {
        Self::new(ShapeKind::Plane(Plane))
    }

    pub fn cube() -> Self {
        Self::new(ShapeKind::Cube(Cube))
    }

    pub fn cylinder(cylinder: Cylinder) -> Self {
        Self::new(ShapeKind::Cylinder(cylinder))
    }

    pub fn cone(cone: Cone) -> Self {
        Self::new(ShapeKind::Cone(cone))
    }

    /// Empty group. Children are added through [`ShapeGraph::add_child`].
    pub fn group() -> Self {
        Self::new(ShapeKind::Group(Group::default()))
    }

    pub fn with_transform(mut self, transform: DMat4) -> Result<Self, SceneError> {
        self.set_transform(transform)?;
        Ok(self)
    }

    pub fn with_material(mut self, material: Material) -> Self {
        self.material = material;
        self
    }

    pub fn with_shadow(mut self, casts_shadow: bool) -> Self {
        self.casts_shadow = casts_shadow;
        self
    }

    /// Replace the transform and recompute the cached inverse. A singular
    /// matrix leaves the shape untouched.
    pub(crate) fn set_transform(&mut self, transform: DMat4) -> Result<(), SceneError> {
        let inverse = transform
            .try_inverse()
            .ok_or(SceneError::NonInvertibleTransform)?;
        self.transform = transform;
        self.inverse = inverse;
        self.normal_matrix = inverse.normal_matrix();
        Ok(())
    }

    pub fn kind(&self) -> &ShapeKind {
        &self.kind
    }

    pub fn transform(&self) -> &DMat4 {
        &self.transform
    }

    pub fn inverse(&self) -> &DMat4 {
        &self.inverse
    }

    pub fn material(&self) -> &Material {
        &self.material
    }

    pub fn material_mut(&mut self) -> &mut Material {
        &mut self.material
    }

    pub fn casts_shadow(&self) -> bool {
        self.casts_shadow
    }

    pub fn set_casts_shadow(&mut self, casts_shadow: bool) {
        self.casts_shadow = casts_shadow;
    }

    pub fn parent(&self) -> Option<ShapeId> {
        self.parent
    }

    /// Bounding box in object space.
    pub fn bounds(&self) -> Aabb {
        self.bounds
    }

    /// Bounding box in the parent's space.
    pub fn parent_space_bounds(&self) -> Aabb {
        self.transform.transform_aabb(&self.bounds)
    }

    /// Object-space normal.
    ///
    /// # Panics
    ///
    /// Groups have no surface of their own; asking one for a normal is a bug
    /// in the caller.
    pub fn local_normal_at(&self, point: DVec3) -> DVec3 {
        match self.kind.geometry() {
            Some(geometry) => geometry.local_normal_at(point),
            None => panic!("local_normal_at called on a group"),
        }
    }

    /// Object-space normal carried through this shape's own transform only.
    pub(crate) fn normal_to_parent(&self, normal: DVec3) -> DVec3 {
        self.normal_matrix.transform_vector3(normal).normalize()
    }
}
