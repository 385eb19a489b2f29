//! Directed line segments produced by slicing.

use serde::{Deserialize, Serialize};
use strata_math::{directions_collinear, Point3, Vec3};

/// A directed vertex pair lying in one slicing plane.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    /// Where the segment begins.
    pub start: Point3,
    /// Where the segment ends.
    pub end: Point3,
}

impl Segment {
    /// Create a new segment.
    pub fn new(start: Point3, end: Point3) -> Self {
        Self { start, end }
    }

    /// Swap the endpoints in place.
    pub fn reverse(&mut self) {
        std::mem::swap(&mut self.start, &mut self.end);
    }

    /// Vector from start to end.
    pub fn direction(&self) -> Vec3 {
        self.end - self.start
    }

    /// Euclidean length.
    pub fn length(&self) -> f64 {
        self.direction().norm()
    }

    /// Whether both segments run along the same line direction (either sense).
    pub fn is_collinear_with(&self, other: &Segment) -> bool {
        directions_collinear(&self.direction(), &other.direction())
    }
}

/// Total length of a run of segments.
pub fn chain_length(segments: &[Segment]) -> f64 {
    segments.iter().map(Segment::length).sum()
}
