// Transform utilities for DMat4
//
// Extends glam::DMat4 with the operations shapes and the camera need.
// Note: glam::DMat4 already provides transform_point3(), transform_vector3()
// and inverse()

use glam::{DMat4, DVec3, DVec4};
use crate::{Aabb, EPSILON};

/// Extension trait for DMat4 to provide additional transform utilities
pub trait Mat4Ext {
    /// Inverse of the matrix, or `None` when it is singular.
    fn try_inverse(&self) -> Option<DMat4>;

    /// Matrix for carrying normals out of object space: the transpose of the
    /// inverse. `self` is expected to already be the inverse transform.
    fn normal_matrix(&self) -> DMat4;

    /// Transform an axis-aligned bounding box.
    /// Computes the bounding box of all 8 transformed corners. Unbounded boxes
    /// map to [`Aabb::UNIVERSE`].
    fn transform_aabb(&self, aabb: &Aabb) -> Aabb;

    /// Element-wise comparison within [`EPSILON`].
    fn approx_eq(&self, other: &DMat4) -> bool;
}

impl Mat4Ext for DMat4 {
    fn try_inverse(&self) -> Option<DMat4> {
        let det = self.determinant();
        // |det| is bounded by the product of the column lengths (Hadamard),
        // reached when the columns are orthogonal. Comparing against that
        // keeps the test independent of the matrix's scale.
        let bound = self.x_axis.length()
            * self.y_axis.length()
            * self.z_axis.length()
            * self.w_axis.length();
        if !det.is_finite() || det == 0.0 || det.abs() <= f64::EPSILON * bound {
            return None;
        }
        let inverse = self.inverse();
        inverse.is_finite().then_some(inverse)
    }

    fn normal_matrix(&self) -> DMat4 {
        self.transpose()
    }

    fn transform_aabb(&self, aabb: &Aabb) -> Aabb {
        if aabb.is_empty() {
            return Aabb::EMPTY;
        }
        if !aabb.is_finite() {
            return Aabb::UNIVERSE;
        }

        let lo = aabb.min();
        let hi = aabb.max();

        let mut result_min = DVec3::splat(f64::INFINITY);
        let mut result_max = DVec3::splat(f64::NEG_INFINITY);

        for i in 0..8 {
            let corner = DVec3::new(
                if i & 1 == 0 { lo.x } else { hi.x },
                if i & 2 == 0 { lo.y } else { hi.y },
                if i & 4 == 0 { lo.z } else { hi.z },
            );
            let p = self.transform_point3(corner);
            result_min = result_min.min(p);
            result_max = result_max.max(p);
        }

        Aabb::from_points(result_min, result_max)
    }

    fn approx_eq(&self, other: &DMat4) -> bool {
        self.abs_diff_eq(*other, EPSILON)
    }
}

/// Build the world-to-eye matrix for an eye at `from` looking at `to`.
pub fn view_transform(from: DVec3, to: DVec3, up: DVec3) -> DMat4 {
    let forward = (to - from).normalize();
    let left = forward.cross(up.normalize());
    let true_up = left.cross(forward);

    let orientation = DMat4::from_cols(
        DVec4::new(left.x, true_up.x, -forward.x, 0.0),
        DVec4::new(left.y, true_up.y, -forward.y, 0.0),
        DVec4::new(left.z, true_up.z, -forward.z, 0.0),
        DVec4::W,
    );

    orientation * DMat4::from_translation(-from)
}
