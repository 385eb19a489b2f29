//! Layer-by-layer slicing of a whole mesh.

use serde::{Deserialize, Serialize};
use strata_math::Point3;
use tracing::{debug, warn};

use crate::error::Result;
use crate::intersect::intersect_triangle;
use crate::mesh::{extract_triangles, world_z_bounds, Mesh, Triangle};
use crate::path::Segment;
use crate::stitch::{stitch_segments, StartAnchor};
use crate::SliceSettings;

/// A stitched chain needs more segments than this to count as a polygon.
pub const MIN_CHAIN_SEGMENTS: usize = 3;

/// One visited slicing plane.
#[derive(Debug, Clone, PartialEq)]
pub struct SliceLayer {
    /// Plane height.
    pub z: f64,
    /// Plane index, counting from the bottom of the mesh.
    pub index: usize,
    /// Stitched segments at this height.
    pub segments: Vec<Segment>,
    /// Number of separate chains in `segments`.
    pub sub_chains: usize,
    /// Whether the chain is long enough to join the toolpath.
    pub accepted: bool,
}

/// Diagnostic counters for a slicing run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SliceStats {
    /// Planes visited.
    pub planes_visited: usize,
    /// Planes whose chain joined the output.
    pub layers_accepted: usize,
    /// Planes dropped for having too few segments (including none).
    pub degenerate_layers: usize,
    /// Times a layer's chain broke and a new sub-chain was started.
    pub broken_chains: usize,
    /// Triangles skipped because their crossing points contradicted their case.
    pub classification_faults: usize,
    /// Segments in accepted layers.
    pub segments_emitted: usize,
    /// The mesh buffer was missing or malformed; nothing was sliced.
    pub input_rejected: bool,
    /// World Z range of the mesh.
    pub z_range: Option<(f64, f64)>,
}

/// Incremental slicer: yields one [`SliceLayer`] per plane, bottom up.
///
/// Each call to `next` does one plane's worth of work, so a caller can stop
/// early by dropping the slicer.
#[derive(Debug, Clone)]
pub struct LayerSlicer {
    triangles: Vec<Triangle>,
    z_res: f64,
    anchor: StartAnchor,
    next_index: usize,
    next_z: f64,
    reference: Point3,
    stats: SliceStats,
}

impl LayerSlicer {
    /// Prepare to slice `mesh`.
    ///
    /// Only invalid settings are an error. A missing or malformed vertex
    /// buffer is logged and produces a slicer with no planes.
    pub fn new(mesh: &Mesh, settings: &SliceSettings) -> Result<Self> {
        settings.validate()?;

        let (triangles, input_rejected) = match extract_triangles(mesh) {
            Ok(triangles) => (triangles, false),
            Err(err) => {
                warn!(error = %err, "mesh rejected, slicing nothing");
                (Vec::new(), true)
            }
        };
        let z_range = if input_rejected {
            None
        } else {
            world_z_bounds(mesh)
        };

        Ok(Self {
            triangles,
            z_res: settings.z_res,
            anchor: settings.start_anchor,
            next_index: 0,
            next_z: z_range.map_or(0.0, |(z_min, _)| z_min),
            reference: Point3::origin(),
            stats: SliceStats {
                input_rejected,
                z_range,
                ..Default::default()
            },
        })
    }

    /// Point the next layer's chain continues from.
    pub fn reference(&self) -> Point3 {
        self.reference
    }

    /// Counters so far.
    pub fn stats(&self) -> &SliceStats {
        &self.stats
    }

    /// Consume the slicer, keeping its counters.
    pub fn into_stats(self) -> SliceStats {
        self.stats
    }

    /// Take the next plane height, stepping by `z_res` from the bottom.
    fn advance(&mut self) -> Option<(usize, f64)> {
        let (_, z_max) = self.stats.z_range?;
        let z = self.next_z;
        if z > z_max {
            return None;
        }

        self.next_z = z + self.z_res;
        if self.next_z <= z {
            // Spacing is below float resolution at this height.
            warn!(z, z_res = self.z_res, "plane spacing too fine, stopping");
            self.next_z = f64::INFINITY;
        }
        let index = self.next_index;
        self.next_index += 1;
        Some((index, z))
    }

    fn collect_segments(&mut self, z: f64) -> Vec<Segment> {
        let mut segments = Vec::new();
        for tri in &self.triangles {
            if tri.max_z() < z || tri.min_z() > z {
                continue;
            }
            match intersect_triangle(tri, z) {
                Ok(Some(seg)) => segments.push(seg),
                Ok(None) => {}
                Err(err) => {
                    warn!(z, error = %err, "skipping triangle");
                    self.stats.classification_faults += 1;
                }
            }
        }
        segments
    }
}

impl Iterator for LayerSlicer {
    type Item = SliceLayer;

    fn next(&mut self) -> Option<SliceLayer> {
        let (index, z) = self.advance()?;

        let raw = self.collect_segments(z);
        let raw_count = raw.len();
        let stitched = stitch_segments(raw, &self.reference, self.anchor);
        let accepted = stitched.segments.len() >= MIN_CHAIN_SEGMENTS;

        self.stats.planes_visited += 1;
        self.stats.broken_chains += stitched.restarts;
        if accepted {
            self.stats.layers_accepted += 1;
            self.stats.segments_emitted += stitched.segments.len();
            if let Some(last) = stitched.segments.last() {
                self.reference = last.end;
            }
        } else {
            self.stats.degenerate_layers += 1;
        }

        debug!(
            index,
            z,
            raw = raw_count,
            stitched = stitched.segments.len(),
            sub_chains = stitched.sub_chains,
            accepted,
            "layer sliced"
        );

        Some(SliceLayer {
            z,
            index,
            segments: stitched.segments,
            sub_chains: stitched.sub_chains,
            accepted,
        })
    }
}
