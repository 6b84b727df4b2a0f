// Re-export glam for convenience
pub use glam::*;

// Glint math types
mod aabb;
mod interval;
mod ray;
mod transform;

pub use aabb::Aabb;
pub use interval::Interval;
pub use ray::Ray;
pub use transform::{view_transform, Mat4Ext};

/// Tolerance used for geometric comparisons and surface offsets.
pub const EPSILON: f64 = 1e-5;

/// Returns true if two scalars differ by less than [`EPSILON`].
#[inline]
pub fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < EPSILON
}

/// Reflect `v` about the normal `n`.
#[inline]
pub fn reflect(v: DVec3, n: DVec3) -> DVec3 {
    v - n * 2.0 * v.dot(n)
}
