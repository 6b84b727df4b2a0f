//! Double-napped cone with its apex at the object-space origin.

use glint_math::{Aabb, DVec3, Ray, EPSILON};

use super::cylinder::within_cap;
use super::{Geometry, ShapeId};
use crate::{Arena, Intersection};

/// Cone truncated to `minimum < y < maximum`, optionally capped. The radius
/// at height y is |y|.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cone {
    pub minimum: f64,
    pub maximum: f64,
    pub closed: bool,
}

impl Default for Cone {
    /// Infinite, open double cone.
    fn default() -> Self {
        Self {
            minimum: f64::NEG_INFINITY,
            maximum: f64::INFINITY,
            closed: false,
        }
    }
}

impl Cone {
    pub fn new(minimum: f64, maximum: f64, closed: bool) -> Self {
        Self {
            minimum,
            maximum,
            closed,
        }
    }

    fn push_if_in_range(&self, ray: &Ray, t: f64, id: ShapeId, xs: &mut Arena<Intersection>) {
        let y = ray.origin.y + t * ray.direction.y;
        if self.minimum < y && y < self.maximum {
            xs.push(Intersection::new(t, id));
        }
    }

    fn intersect_caps(&self, ray: &Ray, id: ShapeId, xs: &mut Arena<Intersection>) {
        if !self.closed || ray.direction.y.abs() < EPSILON {
            return;
        }

        // An infinite bound has no cap
        for bound in [self.minimum, self.maximum].into_iter().filter(|b| b.is_finite()) {
            let t = (bound - ray.origin.y) / ray.direction.y;
            if within_cap(ray, t, bound.abs()) {
                xs.push(Intersection::new(t, id));
            }
        }
    }
}

impl Geometry for Cone {
    fn local_intersect(&self, ray: &Ray, id: ShapeId, xs: &mut Arena<Intersection>) {
        let d = ray.direction;
        let o = ray.origin;

        let a = d.x * d.x - d.y * d.y + d.z * d.z;
        let b = 2.0 * (o.x * d.x - o.y * d.y + o.z * d.z);
        let c = o.x * o.x - o.y * o.y + o.z * o.z;

        // a and the discriminant grow with |d|^2 and b with |d|, so the
        // tolerances follow the local direction's length.
        let len2 = d.length_squared();

        if a.abs() < EPSILON * len2 {
            // Parallel to one nappe: at most one body hit.
            if b.abs() >= EPSILON * len2.sqrt() {
                self.push_if_in_range(ray, -c / (2.0 * b), id, xs);
            }
        } else {
            let discriminant = b * b - 4.0 * a * c;
            // Rays through the apex along the surface land a rounding error
            // below zero.
            if discriminant >= -EPSILON * len2 {
                let sqrtd = discriminant.max(0.0).sqrt();
                let mut t0 = (-b - sqrtd) / (2.0 * a);
                let mut t1 = (-b + sqrtd) / (2.0 * a);
                if t0 > t1 {
                    std::mem::swap(&mut t0, &mut t1);
                }
                self.push_if_in_range(ray, t0, id, xs);
                self.push_if_in_range(ray, t1, id, xs);
            }
        }

        self.intersect_caps(ray, id, xs);
    }

    fn local_normal_at(&self, point: DVec3) -> DVec3 {
        let dist = point.x * point.x + point.z * point.z;

        if dist < self.maximum * self.maximum && point.y >= self.maximum - EPSILON {
            return DVec3::Y;
        }
        if dist < self.minimum * self.minimum && point.y <= self.minimum + EPSILON {
            return DVec3::NEG_Y;
        }

        let mut y = dist.sqrt();
        if point.y > 0.0 {
            y = -y;
        }
        DVec3::new(point.x, y, point.z)
    }

    fn bounds(&self) -> Aabb {
        let limit = self.minimum.abs().max(self.maximum.abs());
        Aabb::from_points(
            DVec3::new(-limit, self.minimum, -limit),
            DVec3::new(limit, self.maximum, limit),
        )
    }
}
