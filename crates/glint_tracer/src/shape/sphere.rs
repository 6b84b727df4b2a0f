//! Unit sphere centered at the object-space origin.

use glint_math::{Aabb, DVec3, Ray};

use super::{Geometry, ShapeId};
use crate::{Arena, Intersection};

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Sphere;

impl Geometry for Sphere {
    fn local_intersect(&self, ray: &Ray, id: ShapeId, xs: &mut Arena<Intersection>) {
        let a = ray.direction.length_squared();
        if a == 0.0 {
            return;
        }
        let b = 2.0 * ray.direction.dot(ray.origin);
        let c = ray.origin.length_squared() - 1.0;

        let discriminant = b * b - 4.0 * a * c;
        if discriminant < 0.0 {
            return;
        }

        // Both roots are kept, even behind the origin; hit selection filters.
        let sqrtd = discriminant.sqrt();
        xs.push(Intersection::new((-b - sqrtd) / (2.0 * a), id));
        xs.push(Intersection::new((-b + sqrtd) / (2.0 * a), id));
    }

    fn local_normal_at(&self, point: DVec3) -> DVec3 {
        point
    }

    fn bounds(&self) -> Aabb {
        Aabb::from_points(DVec3::splat(-1.0), DVec3::splat(1.0))
    }
}
