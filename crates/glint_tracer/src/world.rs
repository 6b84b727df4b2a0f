//! Scene aggregation and recursive shading.
//!
//! A [`World`] owns the shape graph and the lights. It is built once and then
//! shared read-only between render workers; every query takes the caller's
//! [`Arena`] as scratch space for intersection lists.

use glint_math::{DMat4, DVec3, Ray};

use crate::intersection::{hit, prepare_computations, schlick, sort_intersections};
use crate::{
    Arena, Color, Computations, Intersection, Material, PointLight, SceneError, Shape, ShapeGraph,
    ShapeId,
};

/// Recursion limit for reflection and refraction rays.
pub const DEFAULT_MAX_DEPTH: u32 = 5;

#[derive(Debug, Clone, Default)]
pub struct World {
    shapes: ShapeGraph,
    lights: Vec<PointLight>,
}

impl World {
    pub fn new() -> Self {
        Self::default()
    }

    /// Two concentric spheres lit from the upper left.
    pub fn default_world() -> Result<Self, SceneError> {
        let mut world = Self::new();
        world.add_light(PointLight::new(DVec3::new(-10.0, 10.0, -10.0), Color::ONE));
        world.add_shape(Shape::sphere().with_material(Material {
            color: Color::new(0.8, 1.0, 0.6),
            diffuse: 0.7,
            specular: 0.2,
            ..Default::default()
        }));
        world.add_shape(Shape::sphere().with_transform(DMat4::from_scale(DVec3::splat(0.5)))?);
        Ok(world)
    }

    pub fn add_light(&mut self, light: PointLight) {
        self.lights.push(light);
    }

    pub fn lights(&self) -> &[PointLight] {
        &self.lights
    }

    pub fn add_shape(&mut self, shape: Shape) -> ShapeId {
        self.shapes.add(shape)
    }

    pub fn add_child(&mut self, group: ShapeId, shape: Shape) -> Result<ShapeId, SceneError> {
        self.shapes.add_child(group, shape)
    }

    pub fn set_transform(&mut self, id: ShapeId, transform: DMat4) -> Result<(), SceneError> {
        self.shapes.set_transform(id, transform)
    }

    pub fn shapes(&self) -> &ShapeGraph {
        &self.shapes
    }

    pub fn shape_mut(&mut self, id: ShapeId) -> Option<&mut Shape> {
        self.shapes.get_mut(id)
    }

    /// Append the hits of every top-level shape to `xs` and sort the appended
    /// range by distance. Returns the index where the range starts; entries
    /// before it are left alone.
    pub fn intersect(&self, ray: &Ray, xs: &mut Arena<Intersection>) -> usize {
        let start = xs.len();
        for &root in self.shapes.roots() {
            self.shapes.intersect(root, ray, xs);
        }
        sort_intersections(&mut xs.as_mut_slice()[start..]);
        start
    }

    /// Whether a shadow-casting shape lies between `point` and the light.
    pub fn is_shadowed(
        &self,
        light_position: DVec3,
        point: DVec3,
        xs: &mut Arena<Intersection>,
    ) -> bool {
        let v = light_position - point;
        let distance = v.length();
        let ray = Ray::new(point, v / distance);

        let start = self.intersect(&ray, xs);
        let shadowed = xs.as_slice()[start..]
            .iter()
            .any(|x| x.t > 0.0 && x.t < distance && self.shapes[x.shape].casts_shadow());
        xs.truncate(start);
        shadowed
    }

    /// Color at a prepared hit: surface lighting from every light, plus any
    /// reflected and refracted contribution.
    pub fn shade_hit(
        &self,
        comps: &Computations,
        xs: &mut Arena<Intersection>,
        depth: u32,
    ) -> Color {
        let material = self.shapes[comps.shape].material();
        let surface_color = match material.pattern {
            Some(_) => material.color_at(self.shapes.world_to_object(comps.shape, comps.point)),
            None => material.color,
        };

        let surface = self.lights.iter().fold(Color::ZERO, |acc, light| {
            let in_shadow = self.is_shadowed(light.position, comps.over_point, xs);
            acc + material.lighting(
                light,
                surface_color,
                comps.over_point,
                comps.eye,
                comps.normal,
                in_shadow,
            )
        });

        let reflected = self.reflected_color(comps, xs, depth);
        let refracted = self.refracted_color(comps, xs, depth);

        if material.reflective > 0.0 && material.transparency > 0.0 {
            let reflectance = schlick(comps);
            surface + reflected * reflectance + refracted * (1.0 - reflectance)
        } else {
            surface + reflected + refracted
        }
    }

    pub fn reflected_color(
        &self,
        comps: &Computations,
        xs: &mut Arena<Intersection>,
        depth: u32,
    ) -> Color {
        let reflective = self.shapes[comps.shape].material().reflective;
        if depth == 0 || reflective == 0.0 {
            return Color::ZERO;
        }

        let ray = Ray::new(comps.over_point, comps.reflect);
        self.color_at(&ray, xs, depth - 1) * reflective
    }

    pub fn refracted_color(
        &self,
        comps: &Computations,
        xs: &mut Arena<Intersection>,
        depth: u32,
    ) -> Color {
        let transparency = self.shapes[comps.shape].material().transparency;
        if depth == 0 || transparency == 0.0 {
            return Color::ZERO;
        }

        // Snell's law
        let n_ratio = comps.n1 / comps.n2;
        let cos_i = comps.eye.dot(comps.normal);
        let sin2_t = n_ratio * n_ratio * (1.0 - cos_i * cos_i);
        if sin2_t > 1.0 {
            return Color::ZERO;
        }

        let cos_t = (1.0 - sin2_t).sqrt();
        let direction = comps.normal * (n_ratio * cos_i - cos_t) - comps.eye * n_ratio;
        let ray = Ray::new(comps.under_point, direction);
        self.color_at(&ray, xs, depth - 1) * transparency
    }

    /// Color seen along `ray`, or black when it hits nothing.
    ///
    /// Scratch entries pushed by this call are truncated away before it
    /// returns.
    pub fn color_at(&self, ray: &Ray, xs: &mut Arena<Intersection>, depth: u32) -> Color {
        let start = self.intersect(ray, xs);

        let comps = {
            let found = &xs.as_slice()[start..];
            hit(found).map(|h| prepare_computations(&h, ray, found, &self.shapes))
        };
        let color = match comps {
            Some(comps) => self.shade_hit(&comps, xs, depth),
            None => Color::ZERO,
        };

        xs.truncate(start);
        color
    }
}
