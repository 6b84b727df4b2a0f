//! Index-addressed storage for a scene's shapes.

use std::ops::Index;

use glint_math::{Aabb, DMat4, DVec3, Interval, Ray};

use super::{SceneError, Shape, ShapeId, ShapeKind};
use crate::{Arena, Intersection};

/// Owns every shape in a scene and issues their ids.
///
/// Top-level shapes are tracked as roots. Group membership is stored twice:
/// the group lists its children (ownership) and each child records its
/// parent (a back-reference used only for coordinate conversion).
#[derive(Debug, Clone, Default)]
pub struct ShapeGraph {
    shapes: Vec<Shape>,
    roots: Vec<ShapeId>,
}

impl ShapeGraph {
    pub fn new() -> Self {
        Self::default()
    }

    fn insert(&mut self, mut shape: Shape, parent: Option<ShapeId>) -> ShapeId {
        let id = ShapeId::new(self.shapes.len() as u32);
        shape.parent = parent;
        self.shapes.push(shape);
        id
    }

    /// Add a top-level shape.
    pub fn add(&mut self, shape: Shape) -> ShapeId {
        let id = self.insert(shape, None);
        self.roots.push(id);
        log::debug!("Added shape {:?} at top level", id);
        id
    }

    /// Add `shape` as the last child of `group`.
    pub fn add_child(&mut self, group: ShapeId, shape: Shape) -> Result<ShapeId, SceneError> {
        match self.get(group).map(Shape::kind) {
            None => return Err(SceneError::UnknownShape(group)),
            Some(ShapeKind::Group(_)) => {}
            Some(_) => return Err(SceneError::NotAGroup(group)),
        }

        let id = self.insert(shape, Some(group));
        if let ShapeKind::Group(g) = &mut self.shapes[group.index()].kind {
            g.children.push(id);
        }
        self.refresh_bounds(group);
        log::debug!("Added shape {:?} to group {:?}", id, group);
        Ok(id)
    }

    /// Replace a shape's transform, refreshing the bounds of every ancestor.
    pub fn set_transform(&mut self, id: ShapeId, transform: DMat4) -> Result<(), SceneError> {
        let shape = self
            .shapes
            .get_mut(id.index())
            .ok_or(SceneError::UnknownShape(id))?;
        shape.set_transform(transform)?;

        let parent = shape.parent;
        if let Some(parent) = parent {
            self.refresh_bounds(parent);
        }
        Ok(())
    }

    /// Recompute a group's box from its children, then walk up the parents.
    fn refresh_bounds(&mut self, mut id: ShapeId) {
        loop {
            let shape = &self.shapes[id.index()];
            let ShapeKind::Group(group) = &shape.kind else {
                return;
            };

            let bounds = group
                .children
                .iter()
                .map(|&child| self.shapes[child.index()].parent_space_bounds())
                .fold(Aabb::EMPTY, |acc, b| Aabb::surrounding(&acc, &b));
            let parent = shape.parent;

            self.shapes[id.index()].bounds = bounds;
            log::trace!("Refreshed bounds of group {:?}: {:?}", id, bounds);

            match parent {
                Some(p) => id = p,
                None => return,
            }
        }
    }

    pub fn get(&self, id: ShapeId) -> Option<&Shape> {
        self.shapes.get(id.index())
    }

    /// Mutable access for material and shadow edits. Transforms go through
    /// [`ShapeGraph::set_transform`] so group bounds stay current.
    pub fn get_mut(&mut self, id: ShapeId) -> Option<&mut Shape> {
        self.shapes.get_mut(id.index())
    }

    pub fn roots(&self) -> &[ShapeId] {
        &self.roots
    }

    /// Children of a group; empty for primitives.
    pub fn children(&self, id: ShapeId) -> &[ShapeId] {
        match &self[id].kind {
            ShapeKind::Group(group) => group.children(),
            _ => &[],
        }
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    /// Intersect `ray`, given in the shape's parent space, with shape `id` and
    /// everything beneath it.
    pub fn intersect(&self, id: ShapeId, ray: &Ray, xs: &mut Arena<Intersection>) {
        let shape = &self[id];
        let local = ray.transform(&shape.inverse);

        match &shape.kind {
            ShapeKind::Group(group) => {
                // Negative distances matter for refraction, so test the whole line.
                if !shape.bounds.hit(&local, Interval::UNIVERSE) {
                    return;
                }
                for &child in &group.children {
                    self.intersect(child, &local, xs);
                }
            }
            kind => {
                if let Some(geometry) = kind.geometry() {
                    geometry.local_intersect(&local, id, xs);
                }
            }
        }
    }

    /// Convert a world-space point into the object space of shape `id`.
    pub fn world_to_object(&self, id: ShapeId, point: DVec3) -> DVec3 {
        let shape = &self[id];
        let point = match shape.parent {
            Some(parent) => self.world_to_object(parent, point),
            None => point,
        };
        shape.inverse.transform_point3(point)
    }

    /// Convert an object-space normal of shape `id` into world space.
    pub fn normal_to_world(&self, id: ShapeId, normal: DVec3) -> DVec3 {
        let shape = &self[id];
        let normal = shape.normal_to_parent(normal);
        match shape.parent {
            Some(parent) => self.normal_to_world(parent, normal),
            None => normal,
        }
    }

    /// World-space surface normal of shape `id` at a world-space point.
    pub fn normal_at(&self, id: ShapeId, world_point: DVec3) -> DVec3 {
        let local_point = self.world_to_object(id, world_point);
        let local_normal = self[id].local_normal_at(local_point);
        self.normal_to_world(id, local_normal)
    }
}

impl Index<ShapeId> for ShapeGraph {
    type Output = Shape;

    /// # Panics
    ///
    /// Panics if `id` was not issued by this graph.
    fn index(&self, id: ShapeId) -> &Shape {
        &self.shapes[id.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glint_math::Mat4Ext;
    use std::f64::consts::{FRAC_PI_2, PI};

    fn arena() -> Arena<Intersection> {
        Arena::new(1 << 16, 16).unwrap()
    }

    fn assert_vec(actual: DVec3, expected: DVec3) {
        assert!(
            actual.abs_diff_eq(expected, 1e-4),
            "expected {expected:?}, got {actual:?}"
        );
    }

    #[test]
    fn test_ids_are_issued_in_order() {
        let mut graph = ShapeGraph::new();
        let a = graph.add(Shape::sphere());
        let b = graph.add(Shape::plane());

        assert_eq!(a.index(), 0);
        assert_eq!(b.index(), 1);
        assert_eq!(graph.roots(), &[a, b]);
        assert_eq!(graph.len(), 2);
    }

    #[test]
    fn test_add_child_sets_parent() {
        let mut graph = ShapeGraph::new();
        let g = graph.add(Shape::group());
        let s = graph.add_child(g, Shape::sphere()).unwrap();

        assert_eq!(graph[s].parent(), Some(g));
        assert_eq!(graph.children(g), &[s]);
        assert_eq!(graph.roots(), &[g]);
    }

    #[test]
    fn test_add_child_requires_group() {
        let mut graph = ShapeGraph::new();
        let s = graph.add(Shape::sphere());

        assert_eq!(
            graph.add_child(s, Shape::cube()).unwrap_err(),
            SceneError::NotAGroup(s)
        );
        assert_eq!(
            graph.add_child(ShapeId::new(42), Shape::cube()).unwrap_err(),
            SceneError::UnknownShape(ShapeId::new(42))
        );
    }

    #[test]
    fn test_intersect_transformed_sphere() {
        let mut graph = ShapeGraph::new();
        let scaled = graph.add(
            Shape::sphere()
                .with_transform(DMat4::from_scale(DVec3::splat(2.0)))
                .unwrap(),
        );
        let moved = graph.add(
            Shape::sphere()
                .with_transform(DMat4::from_translation(DVec3::new(5.0, 0.0, 0.0)))
                .unwrap(),
        );
        let ray = Ray::new(DVec3::new(0.0, 0.0, -5.0), DVec3::Z);

        let mut xs = arena();
        graph.intersect(scaled, &ray, &mut xs);
        let ts: Vec<f64> = xs.as_slice().iter().map(|x| x.t).collect();
        assert_eq!(ts, vec![3.0, 7.0]);

        xs.clear();
        graph.intersect(moved, &ray, &mut xs);
        assert!(xs.is_empty());
    }

    #[test]
    fn test_transform_round_trip_restores_intersections() {
        let m = DMat4::from_rotation_x(0.7)
            * DMat4::from_scale(DVec3::new(1.5, 0.5, 2.0))
            * DMat4::from_translation(DVec3::new(0.3, -0.2, 1.0));
        let mut graph = ShapeGraph::new();
        let plain = graph.add(Shape::cube());
        let shape = graph.add(Shape::cube());
        graph.set_transform(shape, m).unwrap();
        graph.set_transform(shape, m.inverse() * m).unwrap();

        let rays = [
            Ray::new(DVec3::new(0.2, 0.1, -5.0), DVec3::Z),
            Ray::new(DVec3::new(-4.0, 0.5, 0.3), DVec3::new(1.0, 0.1, -0.2)),
            Ray::new(DVec3::new(3.0, 3.0, 3.0), DVec3::new(-1.0, -1.0, -1.0)),
        ];
        for ray in rays {
            let mut a = arena();
            let mut b = arena();
            graph.intersect(plain, &ray, &mut a);
            graph.intersect(shape, &ray, &mut b);
            assert_eq!(a.len(), b.len());
            for (x, y) in a.as_slice().iter().zip(b.as_slice()) {
                assert!((x.t - y.t).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn test_normal_on_translated_sphere() {
        let mut graph = ShapeGraph::new();
        let s = graph.add(
            Shape::sphere()
                .with_transform(DMat4::from_translation(DVec3::new(0.0, 1.0, 0.0)))
                .unwrap(),
        );
        let n = graph.normal_at(s, DVec3::new(0.0, 1.70711, -0.70711));
        assert_vec(n, DVec3::new(0.0, 0.70711, -0.70711));
    }

    #[test]
    fn test_normal_on_transformed_sphere() {
        let mut graph = ShapeGraph::new();
        let m = DMat4::from_scale(DVec3::new(1.0, 0.5, 1.0)) * DMat4::from_rotation_z(PI / 5.0);
        let s = graph.add(Shape::sphere().with_transform(m).unwrap());

        let h = 2f64.sqrt() / 2.0;
        let n = graph.normal_at(s, DVec3::new(0.0, h, -h));
        assert_vec(n, DVec3::new(0.0, 0.97014, -0.24254));
    }

    #[test]
    fn test_empty_group_has_no_hits() {
        let mut graph = ShapeGraph::new();
        let g = graph.add(Shape::group());
        let mut xs = arena();
        graph.intersect(g, &Ray::new(DVec3::ZERO, DVec3::Z), &mut xs);
        assert!(xs.is_empty());
    }

    #[test]
    fn test_group_intersects_children() {
        let mut graph = ShapeGraph::new();
        let g = graph.add(Shape::group());
        let s1 = graph.add_child(g, Shape::sphere()).unwrap();
        let s2 = graph
            .add_child(
                g,
                Shape::sphere()
                    .with_transform(DMat4::from_translation(DVec3::new(0.0, 0.0, -3.0)))
                    .unwrap(),
            )
            .unwrap();
        graph
            .add_child(
                g,
                Shape::sphere()
                    .with_transform(DMat4::from_translation(DVec3::new(5.0, 0.0, 0.0)))
                    .unwrap(),
            )
            .unwrap();

        let mut xs = arena();
        graph.intersect(g, &Ray::new(DVec3::new(0.0, 0.0, -5.0), DVec3::Z), &mut xs);
        let slice = xs.as_mut_slice();
        slice.sort_by(|a, b| a.t.total_cmp(&b.t));

        let ids: Vec<ShapeId> = slice.iter().map(|x| x.shape).collect();
        assert_eq!(ids, vec![s2, s2, s1, s1]);
    }

    #[test]
    fn test_transformed_group() {
        let mut graph = ShapeGraph::new();
        let g = graph.add(Shape::group());
        graph
            .set_transform(g, DMat4::from_scale(DVec3::splat(2.0)))
            .unwrap();
        graph
            .add_child(
                g,
                Shape::sphere()
                    .with_transform(DMat4::from_translation(DVec3::new(5.0, 0.0, 0.0)))
                    .unwrap(),
            )
            .unwrap();

        let mut xs = arena();
        graph.intersect(g, &Ray::new(DVec3::new(10.0, 0.0, -10.0), DVec3::Z), &mut xs);
        assert_eq!(xs.len(), 2);
    }

    #[test]
    fn test_group_bounds_skip_missed_children() {
        let mut graph = ShapeGraph::new();
        let g = graph.add(Shape::group());
        graph
            .add_child(
                g,
                Shape::cube()
                    .with_transform(DMat4::from_translation(DVec3::new(4.0, 0.0, 0.0)))
                    .unwrap(),
            )
            .unwrap();

        let b = graph[g].bounds();
        assert!((b.x.min - 3.0).abs() < 1e-9);
        assert!((b.x.max - 5.0).abs() < 1e-9);

        let mut xs = arena();
        graph.intersect(g, &Ray::new(DVec3::new(0.0, 0.0, -5.0), DVec3::Z), &mut xs);
        assert!(xs.is_empty());
    }

    #[test]
    fn test_transformed_group_with_unbounded_child() {
        let mut graph = ShapeGraph::new();
        let g = graph.add(Shape::group());
        graph
            .set_transform(
                g,
                DMat4::from_translation(DVec3::new(0.0, 0.0, 10.0))
                    * DMat4::from_rotation_x(FRAC_PI_2),
            )
            .unwrap();
        graph
            .add_child(
                g,
                Shape::sphere()
                    .with_transform(DMat4::from_translation(DVec3::new(0.0, 5.0, 0.0)))
                    .unwrap(),
            )
            .unwrap();
        // Lands in world space as the z = 10 plane
        let p = graph.add_child(g, Shape::plane()).unwrap();

        assert!(!graph[g].bounds().is_finite());
        assert!(!graph[g].parent_space_bounds().is_finite());

        // Far from the origin and from the bounded sibling
        let ray = Ray::new(DVec3::new(1000.0, -2000.0, 0.0), DVec3::Z);
        let mut xs = arena();
        graph.intersect(g, &ray, &mut xs);
        assert_eq!(xs.len(), 1);
        assert_eq!(xs[0].shape, p);
        assert!((xs[0].t - 10.0).abs() < 1e-9, "t = {}", xs[0].t);

        let n = graph.normal_at(p, ray.at(xs[0].t));
        assert_vec(n, DVec3::Z);
    }

    #[test]
    fn test_child_transform_refreshes_ancestor_bounds() {
        let mut graph = ShapeGraph::new();
        let outer = graph.add(Shape::group());
        let inner = graph.add_child(outer, Shape::group()).unwrap();
        let s = graph.add_child(inner, Shape::sphere()).unwrap();

        graph
            .set_transform(s, DMat4::from_translation(DVec3::new(0.0, 10.0, 0.0)))
            .unwrap();

        assert!((graph[inner].bounds().y.max - 11.0).abs() < 1e-9);
        assert!((graph[outer].bounds().y.min - 9.0).abs() < 1e-9);
    }

    fn nested_scene() -> (ShapeGraph, ShapeId) {
        let mut graph = ShapeGraph::new();
        let g1 = graph.add(Shape::group());
        graph
            .set_transform(g1, DMat4::from_rotation_y(FRAC_PI_2))
            .unwrap();
        let g2 = graph.add_child(g1, Shape::group()).unwrap();
        graph
            .set_transform(g2, DMat4::from_scale(DVec3::new(1.0, 2.0, 3.0)))
            .unwrap();
        let s = graph
            .add_child(
                g2,
                Shape::sphere()
                    .with_transform(DMat4::from_translation(DVec3::new(5.0, 0.0, 0.0)))
                    .unwrap(),
            )
            .unwrap();
        (graph, s)
    }

    #[test]
    fn test_world_to_object_through_groups() {
        let (graph, s) = nested_scene();
        let p = graph.world_to_object(s, DVec3::new(-2.0, 0.0, -10.0));
        assert_vec(p, DVec3::new(0.0, 0.0, -1.0));
    }

    #[test]
    fn test_normal_to_world_through_groups() {
        let (graph, s) = nested_scene();
        let k = 3f64.sqrt() / 3.0;
        let n = graph.normal_to_world(s, DVec3::splat(k));
        assert_vec(n, DVec3::new(0.2857, 0.4286, -0.8571));
    }

    #[test]
    fn test_normal_at_child_shape() {
        let (graph, s) = nested_scene();
        let n = graph.normal_at(s, DVec3::new(1.7321, 1.1547, -5.5774));
        assert_vec(n, DVec3::new(0.2857, 0.4286, -0.8571));
    }

    #[test]
    fn test_transform_setter_keeps_inverse_exact() {
        let mut graph = ShapeGraph::new();
        let s = graph.add(Shape::cylinder(Default::default()));
        let m = DMat4::from_rotation_z(1.1) * DMat4::from_scale(DVec3::new(3.0, 1.0, 0.5));
        graph.set_transform(s, m).unwrap();

        assert!((*graph[s].inverse() * m).approx_eq(&DMat4::IDENTITY));
        assert_eq!(
            graph.set_transform(s, DMat4::ZERO).unwrap_err(),
            SceneError::NonInvertibleTransform
        );
        assert_eq!(*graph[s].transform(), m);
    }
}
