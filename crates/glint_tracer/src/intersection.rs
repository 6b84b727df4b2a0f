//! Ray-shape intersections, hit selection and the per-hit shading bundle.

use glint_math::{reflect, DVec3, Ray, EPSILON};

use crate::{ShapeGraph, ShapeId};

/// Distance tolerance when comparing two intersections.
pub const INTERSECTION_EPSILON: f64 = 1e-6;

/// Nesting depth tracked on the stack before the containers move to the heap.
const INLINE_CONTAINERS: usize = 32;

/// A shape crossed by a ray at distance `t`.
#[derive(Debug, Clone, Copy)]
pub struct Intersection {
    pub t: f64,
    pub shape: ShapeId,
}

impl Intersection {
    #[inline]
    pub fn new(t: f64, shape: ShapeId) -> Self {
        Self { t, shape }
    }
}

impl PartialEq for Intersection {
    fn eq(&self, other: &Self) -> bool {
        self.shape == other.shape && (self.t - other.t).abs() < INTERSECTION_EPSILON
    }
}

/// Sort intersections by ascending distance.
pub fn sort_intersections(xs: &mut [Intersection]) {
    xs.sort_unstable_by(|a, b| a.t.total_cmp(&b.t));
}

/// The intersection with the smallest strictly positive distance. The list
/// does not need to be sorted.
pub fn hit(xs: &[Intersection]) -> Option<Intersection> {
    xs.iter()
        .filter(|x| x.t > 0.0)
        .min_by(|a, b| a.t.total_cmp(&b.t))
        .copied()
}

/// Everything shading needs to know about one hit.
#[derive(Debug, Clone, Copy)]
pub struct Computations {
    pub t: f64,
    pub shape: ShapeId,
    pub point: DVec3,
    /// `point` nudged along the normal; origin for shadow and reflection rays.
    pub over_point: DVec3,
    /// `point` nudged against the normal; origin for refraction rays.
    pub under_point: DVec3,
    pub eye: DVec3,
    pub normal: DVec3,
    pub reflect: DVec3,
    /// The hit is on the inside surface; `normal` has been flipped.
    pub inside: bool,
    /// Refractive index of the medium being left.
    pub n1: f64,
    /// Refractive index of the medium being entered.
    pub n2: f64,
}

/// Shapes the ray is currently inside, innermost last.
enum Containers {
    Inline {
        ids: [ShapeId; INLINE_CONTAINERS],
        len: usize,
    },
    Spilled(Vec<ShapeId>),
}

impl Containers {
    fn new() -> Self {
        Containers::Inline {
            ids: [ShapeId::new(0); INLINE_CONTAINERS],
            len: 0,
        }
    }

    fn as_slice(&self) -> &[ShapeId] {
        match self {
            Containers::Inline { ids, len } => &ids[..*len],
            Containers::Spilled(ids) => ids,
        }
    }

    /// Leave `id` if the ray is inside it, otherwise enter it.
    fn toggle(&mut self, id: ShapeId) {
        let spilled = match self {
            Containers::Inline { ids, len } => {
                if let Some(pos) = ids[..*len].iter().position(|&c| c == id) {
                    ids.copy_within(pos + 1..*len, pos);
                    *len -= 1;
                    None
                } else if *len < INLINE_CONTAINERS {
                    ids[*len] = id;
                    *len += 1;
                    None
                } else {
                    let mut heap = Vec::with_capacity(INLINE_CONTAINERS * 2);
                    heap.extend_from_slice(&ids[..]);
                    heap.push(id);
                    Some(heap)
                }
            }
            Containers::Spilled(ids) => {
                match ids.iter().position(|&c| c == id) {
                    Some(pos) => {
                        ids.remove(pos);
                    }
                    None => ids.push(id),
                }
                None
            }
        };

        if let Some(heap) = spilled {
            *self = Containers::Spilled(heap);
        }
    }

    fn refractive_index(&self, shapes: &ShapeGraph) -> f64 {
        self.as_slice()
            .last()
            .map_or(1.0, |&id| shapes[id].material().refractive_index)
    }
}

/// Build the shading bundle for `hit`.
///
/// `xs` must hold every intersection along `ray`, sorted by ascending
/// distance; it is walked up to `hit` to find the media on either side.
pub fn prepare_computations(
    hit: &Intersection,
    ray: &Ray,
    xs: &[Intersection],
    shapes: &ShapeGraph,
) -> Computations {
    let point = ray.at(hit.t);
    let eye = -ray.direction;
    let mut normal = shapes.normal_at(hit.shape, point);

    let inside = normal.dot(eye) < 0.0;
    if inside {
        normal = -normal;
    }

    let mut n1 = 1.0;
    let mut n2 = 1.0;
    let mut containers = Containers::new();
    for x in xs {
        let is_hit = x == hit;
        if is_hit {
            n1 = containers.refractive_index(shapes);
        }
        containers.toggle(x.shape);
        if is_hit {
            n2 = containers.refractive_index(shapes);
            break;
        }
    }

    Computations {
        t: hit.t,
        shape: hit.shape,
        point,
        over_point: point + normal * EPSILON,
        under_point: point - normal * EPSILON,
        eye,
        normal,
        reflect: reflect(ray.direction, normal),
        inside,
        n1,
        n2,
    }
}

/// Schlick's approximation of the Fresnel reflectance at a hit.
pub fn schlick(comps: &Computations) -> f64 {
    let mut cos = comps.eye.dot(comps.normal);

    if comps.n1 > comps.n2 {
        let n = comps.n1 / comps.n2;
        let sin2_t = n * n * (1.0 - cos * cos);
        if sin2_t > 1.0 {
            // Total internal reflection
            return 1.0;
        }
        cos = (1.0 - sin2_t).sqrt();
    }

    let r0 = ((comps.n1 - comps.n2) / (comps.n1 + comps.n2)).powi(2);
    r0 + (1.0 - r0) * (1.0 - cos).powi(5)
}
