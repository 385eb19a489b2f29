//! Reorder one layer's loose segments into connected chains.
//!
//! Segments arrive in triangle order with arbitrary orientation. The
//! stitcher walks them end-to-start, flipping segments that face the wrong
//! way and folding collinear neighbours into one longer segment. When no
//! segment continues the current chain, a new sub-chain starts and is
//! appended to the same output.

use serde::{Deserialize, Serialize};
use strata_math::{points_coincide, Point3};
use tracing::debug;

use crate::path::Segment;

/// Where the distance to a candidate starting segment is measured from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StartAnchor {
    /// The coordinate origin, regardless of the continuity reference.
    #[default]
    Origin,
    /// The continuity reference point (end of the previous accepted layer).
    Reference,
}

/// One layer after stitching.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StitchedLayer {
    /// Ordered segments, sub-chains concatenated.
    pub segments: Vec<Segment>,
    /// Number of chains started.
    pub sub_chains: usize,
    /// Times the walk found no continuation and had to start a new chain.
    pub restarts: usize,
}

/// Stitch an unordered segment set into ordered chains.
///
/// `reference` is the point the previous layer finished at. It only
/// influences start selection under [`StartAnchor::Reference`].
pub fn stitch_segments(
    segments: Vec<Segment>,
    reference: &Point3,
    anchor: StartAnchor,
) -> StitchedLayer {
    let mut pool = segments;
    let mut chain = ChainBuilder::with_capacity(pool.len());

    let origin = Point3::origin();
    let anchor_point = |from: &Point3| match anchor {
        StartAnchor::Origin => origin,
        StartAnchor::Reference => *from,
    };

    match take_start(&mut pool, &anchor_point(reference)) {
        Some(first) => chain.start_chain(first),
        None => return chain.finish(),
    }

    while !pool.is_empty() {
        let tail = chain.tail();
        match find_continuation(&pool, &tail) {
            Some((index, reversed)) => {
                let mut next = pool.remove(index);
                if reversed {
                    next.reverse();
                }
                // Matched within tolerance; make the joint exact.
                next.start = tail;
                chain.append(next);
            }
            None => {
                debug!(remaining = pool.len(), "chain broken, starting new sub-chain");
                chain.restarts += 1;
                if let Some(first) = take_start(&mut pool, &anchor_point(&tail)) {
                    chain.start_chain(first);
                }
            }
        }
    }

    chain.finish()
}

/// Remove and return the segment with the closest endpoint to `anchor`,
/// oriented so that endpoint is its start.
///
/// Ties keep the earliest segment. Returns `None` only for an empty pool,
/// even when distances overflow to infinity or are NaN.
fn take_start(pool: &mut Vec<Segment>, anchor: &Point3) -> Option<Segment> {
    let (index, _, flip) = pool
        .iter()
        .enumerate()
        .map(|(i, seg)| {
            let dist_start = (seg.start - anchor).norm();
            let dist_end = (seg.end - anchor).norm();
            (i, dist_start.min(dist_end), dist_start > dist_end)
        })
        .min_by(|a, b| a.1.total_cmp(&b.1))?;

    let mut seg = pool.remove(index);
    if flip {
        seg.reverse();
    }
    Some(seg)
}

/// First segment touching `tail`; `true` when it touches with its end.
fn find_continuation(pool: &[Segment], tail: &Point3) -> Option<(usize, bool)> {
    pool.iter().enumerate().find_map(|(i, seg)| {
        if points_coincide(tail, &seg.start) {
            Some((i, false))
        } else if points_coincide(tail, &seg.end) {
            Some((i, true))
        } else {
            None
        }
    })
}

/// Accumulates the stitched output for one layer.
struct ChainBuilder {
    segments: Vec<Segment>,
    sub_chains: usize,
    restarts: usize,
}

impl ChainBuilder {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            segments: Vec::with_capacity(capacity),
            sub_chains: 0,
            restarts: 0,
        }
    }

    /// Begin a new chain; never merged with what came before.
    fn start_chain(&mut self, first: Segment) {
        self.sub_chains += 1;
        self.segments.push(first);
    }

    /// Continue the current chain, extending the last segment if collinear.
    fn append(&mut self, next: Segment) {
        match self.segments.last_mut() {
            Some(last) if last.is_collinear_with(&next) => last.end = next.end,
            _ => self.segments.push(next),
        }
    }

    fn tail(&self) -> Point3 {
        self.segments
            .last()
            .map_or_else(Point3::origin, |seg| seg.end)
    }

    fn finish(self) -> StitchedLayer {
        StitchedLayer {
            segments: self.segments,
            sub_chains: self.sub_chains,
            restarts: self.restarts,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seg(a: [f64; 3], b: [f64; 3]) -> Segment {
        Segment::new(Point3::new(a[0], a[1], a[2]), Point3::new(b[0], b[1], b[2]))
    }

    fn assert_connected(segments: &[Segment]) {
        for pair in segments.windows(2) {
            assert_eq!(pair[0].end, pair[1].start);
        }
    }

    #[test]
    fn test_unit_square_any_order_and_orientation() {
        let shuffled = vec![
            seg([1.0, 1.0, 0.0], [0.0, 1.0, 0.0]),
            seg([1.0, 0.0, 0.0], [0.0, 0.0, 0.0]), // reversed
            seg([0.0, 0.0, 0.0], [0.0, 1.0, 0.0]), // reversed
            seg([1.0, 0.0, 0.0], [1.0, 1.0, 0.0]),
        ];
        let layer = stitch_segments(shuffled, &Point3::origin(), StartAnchor::Origin);

        assert_eq!(layer.segments.len(), 4);
        assert_eq!(layer.sub_chains, 1);
        assert_eq!(layer.restarts, 0);
        assert_eq!(layer.segments[0].start, Point3::origin());
        assert_connected(&layer.segments);
        assert_eq!(layer.segments[3].end, Point3::origin());
    }

    #[test]
    fn test_collinear_neighbours_merge() {
        let parts = vec![
            seg([0.0, 0.0, 0.0], [1.0, 0.0, 0.0]),
            seg([2.0, 0.0, 0.0], [1.0, 0.0, 0.0]),
        ];
        let layer = stitch_segments(parts, &Point3::origin(), StartAnchor::Origin);
        assert_eq!(layer.segments, vec![seg([0.0, 0.0, 0.0], [2.0, 0.0, 0.0])]);
    }

    #[test]
    fn test_fuzzy_joint_is_snapped() {
        let parts = vec![
            seg([0.0, 0.0, 0.0], [1.0, 0.0, 0.0]),
            seg([1.0 + 1e-13, 0.0, 0.0], [1.0, 1.0, 0.0]),
        ];
        let layer = stitch_segments(parts, &Point3::origin(), StartAnchor::Origin);
        assert_eq!(layer.segments.len(), 2);
        assert_connected(&layer.segments);
    }

    #[test]
    fn test_disjoint_loops_concatenate() {
        let mut parts = Vec::new();
        for offset in [5.0, 0.0] {
            parts.push(seg([offset, 0.0, 0.0], [offset + 1.0, 0.0, 0.0]));
            parts.push(seg([offset + 1.0, 0.0, 0.0], [offset + 1.0, 1.0, 0.0]));
            parts.push(seg([offset + 1.0, 1.0, 0.0], [offset, 1.0, 0.0]));
            parts.push(seg([offset, 1.0, 0.0], [offset, 0.0, 0.0]));
        }
        let layer = stitch_segments(parts, &Point3::origin(), StartAnchor::Origin);

        assert_eq!(layer.segments.len(), 8);
        assert_eq!(layer.sub_chains, 2);
        assert_eq!(layer.restarts, 1);
        // The loop at the origin is walked first.
        assert_eq!(layer.segments[0].start, Point3::origin());
        assert_connected(&layer.segments[..4]);
        assert_connected(&layer.segments[4..]);
        assert_eq!(layer.segments[4].start, Point3::new(5.0, 0.0, 0.0));
    }

    #[test]
    fn test_reference_anchor_changes_start() {
        let square = vec![
            seg([0.0, 0.0, 0.0], [1.0, 0.0, 0.0]),
            seg([1.0, 0.0, 0.0], [1.0, 1.0, 0.0]),
            seg([1.0, 1.0, 0.0], [0.0, 1.0, 0.0]),
            seg([0.0, 1.0, 0.0], [0.0, 0.0, 0.0]),
        ];
        let reference = Point3::new(3.0, 3.0, 0.0);

        let from_origin = stitch_segments(square.clone(), &reference, StartAnchor::Origin);
        assert_eq!(from_origin.segments[0].start, Point3::origin());

        let from_reference = stitch_segments(square, &reference, StartAnchor::Reference);
        assert_eq!(from_reference.segments[0].start, Point3::new(1.0, 1.0, 0.0));
    }

    #[test]
    fn test_far_segment_after_break_is_kept() {
        let parts = vec![
            seg([0.0, 0.0, 0.0], [1.0, 0.0, 0.0]),
            seg([1.0, 0.0, 0.0], [1.0, 1.0, 0.0]),
            seg([1.0, 1.0, 0.0], [0.0, 1.0, 0.0]),
            seg([1e200, 0.0, 0.0], [1e200, 1.0, 0.0]),
        ];
        let layer = stitch_segments(parts, &Point3::origin(), StartAnchor::Origin);
        assert_eq!(layer.segments.len(), 4);
        assert_eq!(layer.sub_chains, 2);
        assert_eq!(layer.restarts, 1);
        assert_eq!(layer.segments[3].start.x, 1e200);
    }

    #[test]
    fn test_unmeasurable_segments_are_all_kept() {
        // Every distance to the anchor overflows, so all candidates tie at infinity.
        let parts = vec![
            seg([1e200, 0.0, 0.0], [1e200, 1.0, 0.0]),
            seg([-1e200, 0.0, 0.0], [-1e200, 1.0, 0.0]),
            seg([0.0, f64::NAN, 0.0], [1.0, f64::NAN, 0.0]),
        ];
        let layer = stitch_segments(parts, &Point3::origin(), StartAnchor::Origin);
        assert_eq!(layer.segments.len(), 3);
        assert_eq!(layer.sub_chains, 3);
        assert!(layer.segments.iter().any(|s| s.start.x == 1e200));
        assert!(layer.segments.iter().any(|s| s.start.x == -1e200));
        assert!(layer.segments.iter().any(|s| s.start.y.is_nan()));
    }

    #[test]
    fn test_empty_input() {
        let layer = stitch_segments(Vec::new(), &Point3::origin(), StartAnchor::Origin);
        assert!(layer.segments.is_empty());
        assert_eq!(layer.sub_chains, 0);
    }

    #[test]
    fn test_open_chain_keeps_every_segment() {
        let parts = vec![
            seg([0.0, 0.0, 0.0], [1.0, 0.0, 0.0]),
            seg([1.0, 0.0, 0.0], [1.0, 1.0, 0.0]),
            seg([9.0, 9.0, 0.0], [9.0, 8.0, 0.0]),
        ];
        let layer = stitch_segments(parts, &Point3::origin(), StartAnchor::Origin);
        assert_eq!(layer.segments.len(), 3);
        assert_eq!(layer.restarts, 1);
    }
}
