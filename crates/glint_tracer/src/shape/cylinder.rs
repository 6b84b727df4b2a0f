//! Cylinder of radius 1 around the object-space y axis.

use glint_math::{Aabb, DVec3, Ray, EPSILON};

use super::{Geometry, ShapeId};
use crate::{Arena, Intersection};

/// Cylinder truncated to `minimum < y < maximum` (exclusive), optionally
/// closed with flat caps.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cylinder {
    pub minimum: f64,
    pub maximum: f64,
    pub closed: bool,
}

impl Default for Cylinder {
    /// Infinite, open cylinder.
    fn default() -> Self {
        Self {
            minimum: f64::NEG_INFINITY,
            maximum: f64::INFINITY,
            closed: false,
        }
    }
}

impl Cylinder {
    pub fn new(minimum: f64, maximum: f64, closed: bool) -> Self {
        Self {
            minimum,
            maximum,
            closed,
        }
    }

    fn intersect_caps(&self, ray: &Ray, id: ShapeId, xs: &mut Arena<Intersection>) {
        if !self.closed || ray.direction.y.abs() < EPSILON {
            return;
        }

        // An infinite bound has no cap
        for bound in [self.minimum, self.maximum].into_iter().filter(|b| b.is_finite()) {
            let t = (bound - ray.origin.y) / ray.direction.y;
            if within_cap(ray, t, 1.0) {
                xs.push(Intersection::new(t, id));
            }
        }
    }
}

/// True if the ray at `t` lies within `radius` of the y axis.
pub(super) fn within_cap(ray: &Ray, t: f64, radius: f64) -> bool {
    let x = ray.origin.x + t * ray.direction.x;
    let z = ray.origin.z + t * ray.direction.z;
    x * x + z * z <= radius * radius
}

impl Geometry for Cylinder {
    fn local_intersect(&self, ray: &Ray, id: ShapeId, xs: &mut Arena<Intersection>) {
        let d = ray.direction;
        let o = ray.origin;

        let a = d.x * d.x + d.z * d.z;
        // Parallel to the y axis: only the caps can be hit.
        if a.abs() >= EPSILON {
            let b = 2.0 * (o.x * d.x + o.z * d.z);
            let c = o.x * o.x + o.z * o.z - 1.0;

            let discriminant = b * b - 4.0 * a * c;
            if discriminant < 0.0 {
                return;
            }

            let sqrtd = discriminant.sqrt();
            let mut t0 = (-b - sqrtd) / (2.0 * a);
            let mut t1 = (-b + sqrtd) / (2.0 * a);
            if t0 > t1 {
                std::mem::swap(&mut t0, &mut t1);
            }

            for t in [t0, t1] {
                let y = o.y + t * d.y;
                if self.minimum < y && y < self.maximum {
                    xs.push(Intersection::new(t, id));
                }
            }
        }

        self.intersect_caps(ray, id, xs);
    }

    fn local_normal_at(&self, point: DVec3) -> DVec3 {
        let dist = point.x * point.x + point.z * point.z;

        if dist < 1.0 && point.y >= self.maximum - EPSILON {
            DVec3::Y
        } else if dist < 1.0 && point.y <= self.minimum + EPSILON {
            DVec3::NEG_Y
        } else {
            DVec3::new(point.x, 0.0, point.z)
        }
    }

    fn bounds(&self) -> Aabb {
        Aabb::from_points(
            DVec3::new(-1.0, self.minimum, -1.0),
            DVec3::new(1.0, self.maximum, 1.0),
        )
    }
}
