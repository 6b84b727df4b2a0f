//! Phong surface materials and point lights.

use glint_math::{reflect, DVec3};

use crate::Pattern;

/// Color type alias (RGB values typically 0-1)
pub type Color = DVec3;

/// A point light with no size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointLight {
    pub position: DVec3,
    pub intensity: Color,
}

impl PointLight {
    pub fn new(position: DVec3, intensity: Color) -> Self {
        Self {
            position,
            intensity,
        }
    }
}

/// Surface description for the Phong model plus reflection and refraction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    pub color: Color,
    /// Replaces `color` when present.
    pub pattern: Option<Pattern>,
    pub ambient: f64,
    pub diffuse: f64,
    pub specular: f64,
    pub shininess: f64,
    /// 0 = matte, 1 = perfect mirror
    pub reflective: f64,
    pub transparency: f64,
    pub refractive_index: f64,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            color: Color::ONE,
            pattern: None,
            ambient: 0.1,
            diffuse: 0.9,
            specular: 0.9,
            shininess: 200.0,
            reflective: 0.0,
            transparency: 0.0,
            refractive_index: 1.0,
        }
    }
}

impl Material {
    /// Default material with a different color.
    pub fn with_color(color: Color) -> Self {
        Self {
            color,
            ..Default::default()
        }
    }

    /// Clear glass: fully transparent with a refractive index of 1.5.
    pub fn glass() -> Self {
        Self {
            transparency: 1.0,
            refractive_index: 1.5,
            ..Default::default()
        }
    }

    /// Surface color at a point in the owning shape's object space.
    pub fn color_at(&self, object_point: DVec3) -> Color {
        match &self.pattern {
            Some(pattern) => pattern.color_at_object(object_point),
            None => self.color,
        }
    }

    /// Phong illumination from a single light.
    ///
    /// `surface` is the (possibly patterned) color at `point`. When
    /// `in_shadow` is set only the ambient term survives.
    pub fn lighting(
        &self,
        light: &PointLight,
        surface: Color,
        point: DVec3,
        eye: DVec3,
        normal: DVec3,
        in_shadow: bool,
    ) -> Color {
        let effective = surface * light.intensity;
        let ambient = effective * self.ambient;
        if in_shadow {
            return ambient;
        }

        let light_v = (light.position - point).normalize();
        let light_dot_normal = light_v.dot(normal);
        if light_dot_normal < 0.0 {
            // Light is on the other side of the surface
            return ambient;
        }

        let diffuse = effective * self.diffuse * light_dot_normal;

        let reflect_v = reflect(-light_v, normal);
        let reflect_dot_eye = reflect_v.dot(eye);
        let specular = if reflect_dot_eye <= 0.0 {
            Color::ZERO
        } else {
            light.intensity * self.specular * reflect_dot_eye.powf(self.shininess)
        };

        ambient + diffuse + specular
    }
}
