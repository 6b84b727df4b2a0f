//! Pinhole camera mapping pixels to world-space rays.

use glint_math::{view_transform, DMat4, DVec3, Mat4Ext, Ray};
use thiserror::Error;

use crate::{ImageBuffer, RenderConfig, RenderStats, TracerError, World};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CameraError {
    #[error("Image must be at least 1x1 (got {hsize}x{vsize})")]
    EmptyImage { hsize: u32, vsize: u32 },

    #[error("Field of view must lie in (0, pi) radians (got {0})")]
    InvalidFieldOfView(f64),

    #[error("Camera transform is not invertible")]
    NonInvertibleTransform,
}

/// Camera looking down -z from the origin of its own space, with the canvas
/// one unit in front of the eye.
#[derive(Debug, Clone)]
pub struct Camera {
    hsize: u32,
    vsize: u32,
    field_of_view: f64,
    transform: DMat4,
    inverse: DMat4,

    // Derived from the canvas size and field of view
    half_width: f64,
    half_height: f64,
    pixel_size: f64,
}

impl Camera {
    /// Camera with an identity transform. `field_of_view` is the horizontal
    /// angle (vertical for portrait images) in radians.
    pub fn new(hsize: u32, vsize: u32, field_of_view: f64) -> Result<Self, CameraError> {
        if hsize == 0 || vsize == 0 {
            return Err(CameraError::EmptyImage { hsize, vsize });
        }
        if !(field_of_view > 0.0 && field_of_view < std::f64::consts::PI) {
            return Err(CameraError::InvalidFieldOfView(field_of_view));
        }

        let half_view = (field_of_view / 2.0).tan();
        let aspect = hsize as f64 / vsize as f64;
        let (half_width, half_height) = if aspect >= 1.0 {
            (half_view, half_view / aspect)
        } else {
            (half_view * aspect, half_view)
        };

        Ok(Self {
            hsize,
            vsize,
            field_of_view,
            transform: DMat4::IDENTITY,
            inverse: DMat4::IDENTITY,
            half_width,
            half_height,
            pixel_size: half_width * 2.0 / hsize as f64,
        })
    }

    /// Set the world-to-camera (view) transform.
    pub fn with_transform(mut self, transform: DMat4) -> Result<Self, CameraError> {
        self.inverse = transform
            .try_inverse()
            .ok_or(CameraError::NonInvertibleTransform)?;
        self.transform = transform;
        Ok(self)
    }

    /// Place the eye at `from`, looking toward `to`.
    pub fn look_at(self, from: DVec3, to: DVec3, up: DVec3) -> Result<Self, CameraError> {
        self.with_transform(view_transform(from, to, up))
    }

    pub fn hsize(&self) -> u32 {
        self.hsize
    }

    pub fn vsize(&self) -> u32 {
        self.vsize
    }

    pub fn field_of_view(&self) -> f64 {
        self.field_of_view
    }

    pub fn transform(&self) -> &DMat4 {
        &self.transform
    }

    /// World-space width of one pixel on the canvas.
    pub fn pixel_size(&self) -> f64 {
        self.pixel_size
    }

    /// Ray from the eye through the center of pixel (`px`, `py`), with y
    /// growing downward.
    pub fn ray_for_pixel(&self, px: u32, py: u32) -> Ray {
        let x_offset = (px as f64 + 0.5) * self.pixel_size;
        let y_offset = (py as f64 + 0.5) * self.pixel_size;

        // The camera looks toward -z, so +x is to the left
        let world_x = self.half_width - x_offset;
        let world_y = self.half_height - y_offset;

        let pixel = self
            .inverse
            .transform_point3(DVec3::new(world_x, world_y, -1.0));
        let origin = self.inverse.transform_point3(DVec3::ZERO);
        Ray::new(origin, (pixel - origin).normalize())
    }

    /// Render `world` as seen by this camera. See [`crate::render`].
    pub fn render(
        &self,
        world: &World,
        config: &RenderConfig,
    ) -> Result<(ImageBuffer, RenderStats), TracerError> {
        crate::render(self, world, config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::{FRAC_1_SQRT_2, FRAC_PI_2, FRAC_PI_4};

    fn assert_vec(actual: DVec3, expected: DVec3) {
        assert!(
            actual.abs_diff_eq(expected, 1e-4),
            "expected {expected:?}, got {actual:?}"
        );
    }

    #[test]
    fn test_pixel_size_landscape() {
        let c = Camera::new(200, 125, FRAC_PI_2).unwrap();
        assert!((c.pixel_size() - 0.01).abs() < 1e-9);
    }

    #[test]
    fn test_pixel_size_portrait() {
        let c = Camera::new(125, 200, FRAC_PI_2).unwrap();
        assert!((c.pixel_size() - 0.01).abs() < 1e-9);
    }

    #[test]
    fn test_ray_through_canvas_center() {
        let c = Camera::new(201, 101, FRAC_PI_2).unwrap();
        let r = c.ray_for_pixel(100, 50);
        assert_vec(r.origin, DVec3::ZERO);
        assert_vec(r.direction, DVec3::NEG_Z);
    }

    #[test]
    fn test_ray_through_canvas_corner() {
        let c = Camera::new(201, 101, FRAC_PI_2).unwrap();
        let r = c.ray_for_pixel(0, 0);
        assert_vec(r.origin, DVec3::ZERO);
        assert_vec(r.direction, DVec3::new(0.66519, 0.33259, -0.66851));
    }

    #[test]
    fn test_ray_with_transformed_camera() {
        let c = Camera::new(201, 101, FRAC_PI_2)
            .unwrap()
            .with_transform(
                DMat4::from_rotation_y(FRAC_PI_4)
                    * DMat4::from_translation(DVec3::new(0.0, -2.0, 5.0)),
            )
            .unwrap();
        let r = c.ray_for_pixel(100, 50);
        assert_vec(r.origin, DVec3::new(0.0, 2.0, -5.0));
        assert_vec(r.direction, DVec3::new(FRAC_1_SQRT_2, 0.0, -FRAC_1_SQRT_2));
    }

    #[test]
    fn test_look_at_matches_view_transform() {
        let from = DVec3::new(0.0, 0.0, 8.0);
        let c = Camera::new(11, 11, FRAC_PI_2)
            .unwrap()
            .look_at(from, DVec3::ZERO, DVec3::Y)
            .unwrap();
        assert!(c
            .transform()
            .approx_eq(&DMat4::from_translation(DVec3::new(0.0, 0.0, -8.0))));
        assert_vec(c.ray_for_pixel(5, 5).origin, from);
    }

    #[test]
    fn test_rejects_bad_parameters() {
        assert_eq!(
            Camera::new(0, 10, FRAC_PI_2).unwrap_err(),
            CameraError::EmptyImage { hsize: 0, vsize: 10 }
        );
        assert_eq!(
            Camera::new(10, 10, 0.0).unwrap_err(),
            CameraError::InvalidFieldOfView(0.0)
        );
        assert_eq!(
            Camera::new(10, 10, FRAC_PI_2)
                .unwrap()
                .with_transform(DMat4::ZERO)
                .unwrap_err(),
            CameraError::NonInvertibleTransform
        );
    }
}
