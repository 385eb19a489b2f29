//! Triangle/plane classification.

use serde::{Deserialize, Serialize};

use crate::mesh::Triangle;

/// How many vertices of a triangle lie above, on, or below a plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VertexCounts {
    /// Vertices with `z > plane`.
    pub above: u8,
    /// Vertices with `z == plane`.
    pub on: u8,
    /// Vertices with `z < plane`.
    pub below: u8,
}

impl VertexCounts {
    /// Count the triangle's vertices against the plane at height `z`.
    ///
    /// The comparison is exact; a NaN coordinate counts as below.
    pub fn of(triangle: &Triangle, z: f64) -> Self {
        let mut counts = Self::default();
        for v in &triangle.vertices {
            if v.z > z {
                counts.above += 1;
            } else if v.z == z {
                counts.on += 1;
            } else {
                counts.below += 1;
            }
        }
        counts
    }
}

/// The single way a triangle meets a horizontal plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IntersectionCase {
    /// Entirely on one side, or only touching the plane at a corner.
    None,
    /// Two edges cross the plane and no vertex lies on it.
    EdgeCrossing,
    /// One vertex lies on the plane and the opposite edge crosses it.
    VertexTouch,
    /// One edge lies in the plane.
    EdgeOnPlane,
    /// The whole triangle is coplanar with the plane. Produces no segment.
    FaceOnPlane,
}

impl IntersectionCase {
    /// Select the case for a set of vertex counts.
    pub fn from_counts(counts: VertexCounts) -> Self {
        let straddles = counts.above >= 1 && counts.below >= 1;
        match counts.on {
            3 => IntersectionCase::FaceOnPlane,
            2 => IntersectionCase::EdgeOnPlane,
            1 if straddles => IntersectionCase::VertexTouch,
            0 if straddles => IntersectionCase::EdgeCrossing,
            _ => IntersectionCase::None,
        }
    }

    /// Whether this case can yield a segment.
    pub fn produces_segment(self) -> bool {
        matches!(
            self,
            IntersectionCase::EdgeCrossing
                | IntersectionCase::VertexTouch
                | IntersectionCase::EdgeOnPlane
        )
    }
}

/// Classify a triangle against the plane at height `z`.
pub fn classify(triangle: &Triangle, z: f64) -> IntersectionCase {
    IntersectionCase::from_counts(VertexCounts::of(triangle, z))
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_math::Point3;

    fn tri(z0: f64, z1: f64, z2: f64) -> Triangle {
        Triangle::new(
            Point3::new(0.0, 0.0, z0),
            Point3::new(1.0, 0.0, z1),
            Point3::new(0.0, 1.0, z2),
        )
    }

    #[test]
    fn test_counts_always_sum_to_three() {
        let heights = [-1.0, 0.0, 0.5, 1.0, 2.0];
        for &a in &heights {
            for &b in &heights {
                for &c in &heights {
                    let t = tri(a, b, c);
                    for &z in &[0.0, 0.5, 1.0] {
                        let n = VertexCounts::of(&t, z);
                        assert_eq!(n.above + n.on + n.below, 3);
                    }
                }
            }
        }
    }

    #[test]
    fn test_all_cases() {
        assert_eq!(classify(&tri(1.0, 2.0, 3.0), 0.5), IntersectionCase::None);
        assert_eq!(classify(&tri(-1.0, -2.0, -3.0), 0.5), IntersectionCase::None);
        assert_eq!(classify(&tri(0.0, 2.0, 3.0), 1.0), IntersectionCase::EdgeCrossing);
        assert_eq!(classify(&tri(0.0, 1.0, 3.0), 1.0), IntersectionCase::VertexTouch);
        assert_eq!(classify(&tri(1.0, 1.0, 3.0), 1.0), IntersectionCase::EdgeOnPlane);
        assert_eq!(classify(&tri(1.0, 1.0, 1.0), 1.0), IntersectionCase::FaceOnPlane);
    }

    #[test]
    fn test_corner_touch_is_none() {
        // One vertex on the plane, the rest above: a point contact.
        let counts = VertexCounts::of(&tri(1.0, 2.0, 3.0), 1.0);
        assert_eq!(counts, VertexCounts { above: 2, on: 1, below: 0 });
        assert_eq!(IntersectionCase::from_counts(counts), IntersectionCase::None);
    }

    #[test]
    fn test_edge_on_plane_regardless_of_third_vertex() {
        assert_eq!(classify(&tri(1.0, 1.0, -3.0), 1.0), IntersectionCase::EdgeOnPlane);
        assert!(IntersectionCase::EdgeOnPlane.produces_segment());
        assert!(!IntersectionCase::FaceOnPlane.produces_segment());
    }
}
