#![warn(missing_docs)]

//! Geometry primitives for the strata slicer.
//!
//! Thin wrappers around nalgebra: points, vectors, world transforms and
//! the tolerance rules used when stitching slice segments together.

use nalgebra::{Matrix4, Vector3};
use serde::{Deserialize, Serialize};

/// A point in 3D space.
pub type Point3 = nalgebra::Point3<f64>;

/// A vector in 3D space.
pub type Vec3 = Vector3<f64>;

/// A 4x4 affine transformation matrix.
///
/// Serialized as 16 numbers in column-major order, the layout scene graphs
/// use for world matrices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 16]", into = "[f64; 16]")]
pub struct Transform {
    /// The underlying 4x4 matrix.
    pub matrix: Matrix4<f64>,
}

impl Transform {
    /// Identity transform.
    pub fn identity() -> Self {
        Self {
            matrix: Matrix4::identity(),
        }
    }

    /// Build from 16 elements in column-major order.
    pub fn from_column_major(elements: [f64; 16]) -> Self {
        Self {
            matrix: Matrix4::from_column_slice(&elements),
        }
    }

    /// The 16 matrix elements in column-major order.
    pub fn to_column_major(&self) -> [f64; 16] {
        let mut out = [0.0; 16];
        out.copy_from_slice(self.matrix.as_slice());
        out
    }

    /// Translation by `(dx, dy, dz)`.
    pub fn translation(dx: f64, dy: f64, dz: f64) -> Self {
        Self {
            matrix: Matrix4::new_translation(&Vector3::new(dx, dy, dz)),
        }
    }

    /// Non-uniform scale by `(sx, sy, sz)`.
    pub fn scale(sx: f64, sy: f64, sz: f64) -> Self {
        Self {
            matrix: Matrix4::new_nonuniform_scaling(&Vector3::new(sx, sy, sz)),
        }
    }

    /// Right-handed rotation about the world X axis, in radians.
    ///
    /// `rotation_x(FRAC_PI_2)` turns a Y-up model so it stands on a Z-up bed.
    pub fn rotation_x(angle: f64) -> Self {
        Self {
            matrix: Matrix4::from_axis_angle(&Vector3::x_axis(), angle),
        }
    }

    /// Compose: `self * other`, so `other` is applied first.
    pub fn then(&self, other: &Transform) -> Self {
        Self {
            matrix: self.matrix * other.matrix,
        }
    }

    /// Transform a point.
    pub fn apply_point(&self, p: &Point3) -> Point3 {
        self.matrix.transform_point(p)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

impl From<[f64; 16]> for Transform {
    fn from(elements: [f64; 16]) -> Self {
        Self::from_column_major(elements)
    }
}

impl From<Transform> for [f64; 16] {
    fn from(t: Transform) -> Self {
        t.to_column_major()
    }
}

/// Tolerances used while reconstructing slice contours.
pub struct Tolerance;

impl Tolerance {
    /// Per-axis absolute difference below which two endpoints connect.
    pub const CONNECT: f64 = 1e-10;

    /// Squared cross-product magnitude below which two directions are collinear.
    pub const COLLINEAR: f64 = 1e-10;
}

/// Whether `a` and `b` agree on every axis within [`Tolerance::CONNECT`].
pub fn points_coincide(a: &Point3, b: &Point3) -> bool {
    (a.x - b.x).abs() < Tolerance::CONNECT
        && (a.y - b.y).abs() < Tolerance::CONNECT
        && (a.z - b.z).abs() < Tolerance::CONNECT
}

/// Whether two direction vectors are parallel or anti-parallel.
///
/// Not normalized: long vectors need a proportionally smaller angle.
pub fn directions_collinear(u: &Vec3, v: &Vec3) -> bool {
    u.cross(v).norm_squared() < Tolerance::COLLINEAR
}
