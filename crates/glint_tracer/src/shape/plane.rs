//! Infinite plane: the object-space xz plane (y = 0).

use glint_math::{Aabb, DVec3, Interval, Ray, EPSILON};

use super::{Geometry, ShapeId};
use crate::{Arena, Intersection};

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Plane;

impl Geometry for Plane {
    fn local_intersect(&self, ray: &Ray, id: ShapeId, xs: &mut Arena<Intersection>) {
        if ray.direction.y.abs() < EPSILON {
            return;
        }
        xs.push(Intersection::new(-ray.origin.y / ray.direction.y, id));
    }

    fn local_normal_at(&self, _point: DVec3) -> DVec3 {
        DVec3::Y
    }

    fn bounds(&self) -> Aabb {
        Aabb::new(Interval::UNIVERSE, Interval::new(0.0, 0.0), Interval::UNIVERSE)
    }
}
