use crate::{DVec3, Interval, Ray};

/// Axis-aligned box, one interval per axis, used to reject rays before
/// visiting a group's children.
///
/// Any axis may be unbounded (planes, open cylinders and cones).
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Aabb {
    pub x: Interval,
    pub y: Interval,
    pub z: Interval,
}

impl Aabb {
    /// Box from per-axis extents, widened so no axis is thinner than the
    /// padding width.
    pub fn new(x: Interval, y: Interval, z: Interval) -> Self {
        let mut aabb = Self { x, y, z };
        aabb.pad_to_minimums();
        aabb
    }

    /// Box spanning two opposite corners, in any order.
    pub fn from_points(a: DVec3, b: DVec3) -> Self {
        Self::new(
            Interval::new(a.x.min(b.x), a.x.max(b.x)),
            Interval::new(a.y.min(b.y), a.y.max(b.y)),
            Interval::new(a.z.min(b.z), a.z.max(b.z)),
        )
    }

    /// Smallest box containing both inputs.
    pub fn surrounding(box0: &Aabb, box1: &Aabb) -> Self {
        Self {
            x: Interval::surrounding(&box0.x, &box1.x),
            y: Interval::surrounding(&box0.y, &box1.y),
            z: Interval::surrounding(&box0.z, &box1.z),
        }
    }

    /// Extent along axis `n` (0 = x, 1 = y, anything else = z).
    pub fn axis_interval(&self, n: usize) -> Interval {
        match n {
            0 => self.x,
            1 => self.y,
            _ => self.z,
        }
    }

    /// Minimum corner.
    pub fn min(&self) -> DVec3 {
        DVec3::new(self.x.min, self.y.min, self.z.min)
    }

    /// Maximum corner.
    pub fn max(&self) -> DVec3 {
        DVec3::new(self.x.max, self.y.max, self.z.max)
    }

    /// True when every axis has finite bounds.
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }

    /// True when the box contains nothing.
    pub fn is_empty(&self) -> bool {
        self.x.min > self.x.max || self.y.min > self.y.max || self.z.min > self.z.max
    }

    /// Whether the ray passes through the box for some t in `ray_t`.
    ///
    /// Slab method. A direction component of zero means the ray is parallel to
    /// that pair of slabs: it passes only if the origin lies between them.
    pub fn hit(&self, r: &Ray, mut ray_t: Interval) -> bool {
        if self.is_empty() {
            return false;
        }

        for axis in 0..3 {
            let slab = self.axis_interval(axis);
            let origin = r.origin[axis];
            let direction = r.direction[axis];

            if direction == 0.0 {
                if !slab.contains(origin) {
                    return false;
                }
                continue;
            }

            let inv = direction.recip();
            let (near, far) = {
                let a = (slab.min - origin) * inv;
                let b = (slab.max - origin) * inv;
                if inv < 0.0 { (b, a) } else { (a, b) }
            };
            ray_t.min = ray_t.min.max(near);
            ray_t.max = ray_t.max.min(far);
            if ray_t.max < ray_t.min {
                return false;
            }
        }

        true
    }

    // Flat boxes (a plane's y extent, say) would be missed by grazing rays.
    fn pad_to_minimums(&mut self) {
        for axis in [&mut self.x, &mut self.y, &mut self.z] {
            if axis.size() < Self::MIN_EXTENT {
                *axis = axis.expand(Self::MIN_EXTENT);
            }
        }
    }

    const MIN_EXTENT: f64 = 1e-4;

    /// Contains nothing; the identity for [`Aabb::surrounding`].
    pub const EMPTY: Aabb = Aabb {
        x: Interval::EMPTY,
        y: Interval::EMPTY,
        z: Interval::EMPTY,
    };

    /// Contains everything.
    pub const UNIVERSE: Aabb = Aabb {
        x: Interval::UNIVERSE,
        y: Interval::UNIVERSE,
        z: Interval::UNIVERSE,
    };
}
