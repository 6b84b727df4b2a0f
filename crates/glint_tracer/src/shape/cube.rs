//! Axis-aligned cube spanning [-1, 1] on every axis.

use glint_math::{Aabb, DVec3, Ray, EPSILON};

use super::{Geometry, ShapeId};
use crate::{Arena, Intersection};

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Cube;

/// Entry and exit distances against the pair of faces at -1 and 1 on one axis.
fn check_axis(origin: f64, direction: f64) -> (f64, f64) {
    let tmin_numerator = -1.0 - origin;
    let tmax_numerator = 1.0 - origin;

    let (tmin, tmax) = if direction.abs() >= EPSILON {
        (tmin_numerator / direction, tmax_numerator / direction)
    } else {
        (
            f64::INFINITY.copysign(tmin_numerator),
            f64::INFINITY.copysign(tmax_numerator),
        )
    };

    if tmin > tmax {
        (tmax, tmin)
    } else {
        (tmin, tmax)
    }
}

impl Geometry for Cube {
    fn local_intersect(&self, ray: &Ray, id: ShapeId, xs: &mut Arena<Intersection>) {
        let (xtmin, xtmax) = check_axis(ray.origin.x, ray.direction.x);
        let (ytmin, ytmax) = check_axis(ray.origin.y, ray.direction.y);
        let (ztmin, ztmax) = check_axis(ray.origin.z, ray.direction.z);

        let tmin = xtmin.max(ytmin).max(ztmin);
        let tmax = xtmax.min(ytmax).min(ztmax);
        if tmin > tmax {
            return;
        }

        xs.push(Intersection::new(tmin, id));
        xs.push(Intersection::new(tmax, id));
    }

    fn local_normal_at(&self, point: DVec3) -> DVec3 {
        let abs = point.abs();
        let maxc = abs.max_element();

        if maxc == abs.x {
            DVec3::new(point.x, 0.0, 0.0)
        } else if maxc == abs.y {
            DVec3::new(0.0, point.y, 0.0)
        } else {
            DVec3::new(0.0, 0.0, point.z)
        }
    }

    fn bounds(&self) -> Aabb {
        Aabb::from_points(DVec3::splat(-1.0), DVec3::splat(1.0))
    }
}
