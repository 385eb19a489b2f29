//! World-space triangle extraction from a raw vertex buffer.

use serde::{Deserialize, Serialize};
use strata_math::{Point3, Transform};

use crate::error::{Result, SlicerError};

/// Scalars per triangle in a non-indexed position buffer.
const FLOATS_PER_TRIANGLE: usize = 9;

/// A non-indexed triangle mesh placed in the world.
///
/// Every three consecutive vertices in `positions` form one triangle, in
/// local coordinates. `transform` maps local to world space.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Mesh {
    /// Flat array of local vertex positions: `[x0, y0, z0, x1, y1, z1, ...]`.
    pub positions: Vec<f32>,
    /// Local-to-world transform.
    #[serde(default)]
    pub transform: Transform,
}

impl Mesh {
    /// Create a mesh with an identity world transform.
    pub fn new(positions: Vec<f32>) -> Self {
        Self {
            positions,
            transform: Transform::identity(),
        }
    }

    /// Same mesh with a different world transform.
    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    /// Axis-aligned box spanning `[0, size]` on each axis, 12 triangles.
    pub fn cuboid(size: [f32; 3]) -> Self {
        let [sx, sy, sz] = size;
        let corners = [
            [0.0, 0.0, 0.0],
            [sx, 0.0, 0.0],
            [sx, sy, 0.0],
            [0.0, sy, 0.0],
            [0.0, 0.0, sz],
            [sx, 0.0, sz],
            [sx, sy, sz],
            [0.0, sy, sz],
        ];
        let indices: [usize; 36] = [
            0, 2, 1, 0, 3, 2, // bottom
            4, 5, 6, 4, 6, 7, // top
            0, 1, 5, 0, 5, 4, // front
            2, 3, 7, 2, 7, 6, // back
            0, 4, 7, 0, 7, 3, // left
            1, 2, 6, 1, 6, 5, // right
        ];
        let positions = indices.iter().flat_map(|&i| corners[i]).collect();
        Self::new(positions)
    }

    /// Copy with `placement` applied after the current world transform.
    pub fn transformed(&self, placement: &Transform) -> Self {
        Self {
            positions: self.positions.clone(),
            transform: placement.then(&self.transform),
        }
    }

    /// Copy whose world transform also lifts the mesh so its lowest point sits at z = 0.
    pub fn place_on_bed(&self) -> Self {
        let lift = match world_z_bounds(self) {
            Some((min_z, _)) => -min_z,
            None => 0.0,
        };
        self.transformed(&Transform::translation(0.0, 0.0, lift))
    }

    /// Number of complete vertices in the buffer.
    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    fn world_vertex(&self, i: usize) -> Point3 {
        let local = Point3::new(
            self.positions[i * 3] as f64,
            self.positions[i * 3 + 1] as f64,
            self.positions[i * 3 + 2] as f64,
        );
        self.transform.apply_point(&local)
    }
}

/// A world-space triangle: an ordered vertex triple.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    /// The three corners.
    pub vertices: [Point3; 3],
}

impl Triangle {
    /// Create a triangle from its corners.
    pub fn new(a: Point3, b: Point3, c: Point3) -> Self {
        Self {
            vertices: [a, b, c],
        }
    }

    /// The edges `v0→v1`, `v1→v2`, `v2→v0`.
    pub fn edges(&self) -> [(Point3, Point3); 3] {
        let [a, b, c] = self.vertices;
        [(a, b), (b, c), (c, a)]
    }

    /// Lowest vertex Z.
    pub fn min_z(&self) -> f64 {
        self.vertices.iter().map(|v| v.z).fold(f64::INFINITY, f64::min)
    }

    /// Highest vertex Z.
    pub fn max_z(&self) -> f64 {
        self.vertices
            .iter()
            .map(|v| v.z)
            .fold(f64::NEG_INFINITY, f64::max)
    }
}

/// Pull world-space triangles out of the mesh buffer.
pub fn extract_triangles(mesh: &Mesh) -> Result<Vec<Triangle>> {
    if mesh.positions.is_empty() {
        return Err(SlicerError::MissingPositions);
    }
    if mesh.positions.len() % FLOATS_PER_TRIANGLE != 0 {
        return Err(SlicerError::MalformedPositions {
            len: mesh.positions.len(),
        });
    }

    let num_triangles = mesh.positions.len() / FLOATS_PER_TRIANGLE;
    let triangles = (0..num_triangles)
        .map(|t| {
            Triangle::new(
                mesh.world_vertex(t * 3),
                mesh.world_vertex(t * 3 + 1),
                mesh.world_vertex(t * 3 + 2),
            )
        })
        .collect();

    Ok(triangles)
}

/// World-space Z range over every vertex, or `None` for an empty buffer.
///
/// Rotation and scale change the range, so each vertex is transformed
/// rather than offsetting local bounds by the translation.
pub fn world_z_bounds(mesh: &Mesh) -> Option<(f64, f64)> {
    let count = mesh.vertex_count();
    if count == 0 {
        return None;
    }

    let mut min_z = f64::INFINITY;
    let mut max_z = f64::NEG_INFINITY;
    for i in 0..count {
        let z = mesh.world_vertex(i).z;
        min_z = min_z.min(z);
        max_z = max_z.max(z);
    }

    Some((min_z, max_z))
}
