//! Segment construction for a classified triangle/plane pair.

use strata_math::Point3;

use crate::classify::{classify, IntersectionCase};
use crate::error::{Result, SlicerError};
use crate::mesh::Triangle;
use crate::path::Segment;

/// Build the segment where `triangle` meets the plane at height `z`.
///
/// Returns `Ok(None)` for cases that produce no geometry, including
/// [`IntersectionCase::FaceOnPlane`]. A crossing case whose points do not
/// form exactly one segment is reported as [`SlicerError::Classification`].
pub fn build_segment(
    triangle: &Triangle,
    z: f64,
    case: IntersectionCase,
) -> Result<Option<Segment>> {
    match case {
        IntersectionCase::None | IntersectionCase::FaceOnPlane => Ok(None),
        IntersectionCase::EdgeCrossing | IntersectionCase::VertexTouch => {
            let points = crossing_points(triangle, z);
            match points.as_slice() {
                [a, b] => Ok(Some(Segment::new(*a, *b))),
                other => Err(SlicerError::Classification {
                    case,
                    points: other.len(),
                }),
            }
        }
        IntersectionCase::EdgeOnPlane => Ok(triangle
            .edges()
            .into_iter()
            .find(|(p0, p1)| p0.z == z && p1.z == z)
            .map(|(p0, p1)| Segment::new(on_plane(&p0, z), on_plane(&p1, z)))),
    }
}

/// Points where the triangle's boundary meets the plane, in edge order.
///
/// Each edge contributes its starting vertex if that vertex lies on the
/// plane, and its interpolated crossing if the plane falls strictly
/// between its endpoints.
fn crossing_points(triangle: &Triangle, z: f64) -> Vec<Point3> {
    let mut points = Vec::with_capacity(2);
    for (p0, p1) in triangle.edges() {
        if p0.z == z {
            points.push(on_plane(&p0, z));
        } else if (p0.z < z && z < p1.z) || (p1.z < z && z < p0.z) {
            points.push(interpolate(&p0, &p1, z));
        }
    }
    points
}

/// Point on `p0→p1` at height `z`, with Z pinned to the plane.
fn interpolate(p0: &Point3, p1: &Point3, z: f64) -> Point3 {
    let t = (z - p0.z) / (p1.z - p0.z);
    Point3::new(p0.x + t * (p1.x - p0.x), p0.y + t * (p1.y - p0.y), z)
}

fn on_plane(p: &Point3, z: f64) -> Point3 {
    Point3::new(p.x, p.y, z)
}

/// Classify and build in one step.
pub fn intersect_triangle(triangle: &Triangle, z: f64) -> Result<Option<Segment>> {
    build_segment(triangle, z, classify(triangle, z))
}
