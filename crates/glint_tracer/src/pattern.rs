//! Procedural surface patterns.
//!
//! A pattern is a pure function of a point in pattern space. The shape's
//! inverse transform takes a world point to object space, and the pattern's
//! own inverse transform takes that to pattern space.

use crate::Color;
use crate::shape::SceneError;
use glint_math::{DMat4, DVec3, Mat4Ext};

/// The kinds of pattern a material can carry. Each alternates or blends
/// between two colors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PatternKind {
    /// Alternates on integer steps of x.
    Stripe { a: Color, b: Color },
    /// Linear blend from `a` to `b` across each unit of x.
    Gradient { a: Color, b: Color },
    /// Concentric rings in the xz plane.
    Ring { a: Color, b: Color },
    /// 3D checkerboard.
    Checker { a: Color, b: Color },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pattern {
    kind: PatternKind,
    transform: DMat4,
    inverse: DMat4,
}

impl Pattern {
    pub fn new(kind: PatternKind) -> Self {
        Self {
            kind,
            transform: DMat4::IDENTITY,
            inverse: DMat4::IDENTITY,
        }
    }

    pub fn stripe(a: Color, b: Color) -> Self {
        Self::new(PatternKind::Stripe { a, b })
    }

    pub fn gradient(a: Color, b: Color) -> Self {
        Self::new(PatternKind::Gradient { a, b })
    }

    pub fn ring(a: Color, b: Color) -> Self {
        Self::new(PatternKind::Ring { a, b })
    }

    pub fn checker(a: Color, b: Color) -> Self {
        Self::new(PatternKind::Checker { a, b })
    }

    /// Set the pattern transform, caching its inverse.
    pub fn with_transform(mut self, transform: DMat4) -> Result<Self, SceneError> {
        self.inverse = transform
            .try_inverse()
            .ok_or(SceneError::NonInvertibleTransform)?;
        self.transform = transform;
        Ok(self)
    }

    pub fn kind(&self) -> &PatternKind {
        &self.kind
    }

    pub fn transform(&self) -> &DMat4 {
        &self.transform
    }

    /// Color at a point already in pattern space.
    pub fn pattern_at(&self, p: DVec3) -> Color {
        match self.kind {
            PatternKind::Stripe { a, b } => {
                if p.x.floor().rem_euclid(2.0) == 0.0 {
                    a
                } else {
                    b
                }
            }
            PatternKind::Gradient { a, b } => a + (b - a) * (p.x - p.x.floor()),
            PatternKind::Ring { a, b } => {
                let r = (p.x * p.x + p.z * p.z).sqrt();
                if r.floor().rem_euclid(2.0) == 0.0 {
                    a
                } else {
                    b
                }
            }
            PatternKind::Checker { a, b } => {
                let sum = p.x.floor() + p.y.floor() + p.z.floor();
                if sum.rem_euclid(2.0) == 0.0 {
                    a
                } else {
                    b
                }
            }
        }
    }

    /// Color at a point in the shape's object space.
    pub fn color_at_object(&self, object_point: DVec3) -> Color {
        self.pattern_at(self.inverse.transform_point3(object_point))
    }
}
