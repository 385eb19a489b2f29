#![warn(missing_docs)]

//! Planar slicing for the strata toolchain.
//!
//! This crate cuts a triangle mesh with horizontal planes at a fixed
//! spacing. It stitches each plane's loose segments into ordered chains and
//! concatenates the accepted chains into one toolpath-ordered segment stream.
//!
//! # Example
//!
//! ```
//! use strata_slicer::{slice_mesh, Mesh, SliceSettings};
//!
//! let cube = Mesh::cuboid([10.0, 10.0, 10.0]);
//! let settings = SliceSettings { z_res: 3.0, ..Default::default() };
//! let output = slice_mesh(&cube, &settings).unwrap();
//!
//! assert_eq!(output.stats.planes_visited, 4);
//! println!("segments: {}", output.segments.len());
//! ```

pub mod classify;
pub mod error;
pub mod intersect;
pub mod mesh;
pub mod path;
pub mod slice;
pub mod stitch;

pub use classify::{classify, IntersectionCase, VertexCounts};
pub use error::{Result, SlicerError};
pub use intersect::{build_segment, intersect_triangle};
pub use mesh::{extract_triangles, world_z_bounds, Mesh, Triangle};
pub use path::{chain_length, Segment};
pub use slice::{LayerSlicer, SliceLayer, SliceStats, MIN_CHAIN_SEGMENTS};
pub use stitch::{stitch_segments, StartAnchor, StitchedLayer};

use serde::{Deserialize, Serialize};
use tracing::info;

/// Slicing parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SliceSettings {
    /// Vertical distance between slicing planes (mm).
    pub z_res: f64,
    /// Where each layer's starting segment is measured from.
    #[serde(default)]
    pub start_anchor: StartAnchor,
}

impl Default for SliceSettings {
    fn default() -> Self {
        Self {
            z_res: 3.0,
            start_anchor: StartAnchor::Origin,
        }
    }
}

impl SliceSettings {
    /// Validate settings.
    pub fn validate(&self) -> Result<()> {
        if !self.z_res.is_finite() || self.z_res <= 0.0 {
            return Err(SlicerError::InvalidSettings(format!(
                "z_res must be a positive number, got {}",
                self.z_res
            )));
        }
        Ok(())
    }
}

/// Result of slicing a whole mesh.
#[derive(Debug, Clone, Default)]
pub struct SliceOutput {
    /// Accepted layers' chains, bottom layer first.
    pub segments: Vec<Segment>,
    /// Diagnostic counters.
    pub stats: SliceStats,
}

/// Slice a mesh with the given settings.
///
/// This drains a [`LayerSlicer`] and keeps only accepted layers. Malformed
/// mesh data yields an empty output with `stats.input_rejected` set; only
/// invalid settings return an error.
pub fn slice_mesh(mesh: &Mesh, settings: &SliceSettings) -> Result<SliceOutput> {
    let mut slicer = LayerSlicer::new(mesh, settings)?;

    info!(
        z_res = settings.z_res,
        z_range = ?slicer.stats().z_range,
        anchor = ?settings.start_anchor,
        "Starting mesh slicing"
    );

    let mut segments = Vec::new();
    for layer in slicer.by_ref() {
        if layer.accepted {
            segments.extend(layer.segments);
        }
    }
    let stats = slicer.into_stats();

    info!(
        planes = stats.planes_visited,
        accepted = stats.layers_accepted,
        degenerate = stats.degenerate_layers,
        broken_chains = stats.broken_chains,
        segments = segments.len(),
        "Slicing complete"
    );

    Ok(SliceOutput { segments, stats })
}
