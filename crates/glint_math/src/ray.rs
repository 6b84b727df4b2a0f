use crate::{DMat4, DVec3};

/// A ray in 3D space: `origin + t * direction`.
///
/// The direction is not required to be normalized. Transforming a ray into a
/// shape's object space deliberately leaves it unnormalized so that `t` values
/// stay comparable between spaces.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Ray {
    pub origin: DVec3,
    pub direction: DVec3,
}

impl Ray {
    /// Create a new ray.
    pub fn new(origin: DVec3, direction: DVec3) -> Self {
        Self { origin, direction }
    }

    /// Get the point along the ray at parameter t.
    ///
    /// Returns: origin + t * direction
    #[inline]
    pub fn at(&self, t: f64) -> DVec3 {
        self.origin + self.direction * t
    }

    /// Apply a matrix to the ray: the origin as a point (w=1), the direction as
    /// a vector (w=0).
    #[inline]
    pub fn transform(&self, m: &DMat4) -> Ray {
        Ray {
            origin: m.transform_point3(self.origin),
            direction: m.transform_vector3(self.direction),
        }
    }
}
