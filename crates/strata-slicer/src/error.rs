//! Error types for the slicer.

use thiserror::Error;

use crate::classify::IntersectionCase;

/// Errors that can occur during slicing.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SlicerError {
    /// Mesh has no position buffer.
    #[error("mesh has no vertex positions")]
    MissingPositions,

    /// Position buffer does not describe whole triangles.
    #[error("position buffer of {len} values is not a whole number of triangles")]
    MalformedPositions {
        /// Number of scalars in the buffer.
        len: usize,
    },

    /// Invalid slice settings.
    #[error("invalid settings: {0}")]
    InvalidSettings(String),

    /// A triangle's classification did not match its crossing points.
    #[error("{case:?} triangle produced {points} crossing points")]
    Classification {
        /// The case the classifier selected.
        case: IntersectionCase,
        /// How many points the builder found.
        points: usize,
    },
}

impl SlicerError {
    /// True for malformed or missing mesh data, which degrades to an empty slice.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            SlicerError::MissingPositions | SlicerError::MalformedPositions { .. }
        )
    }
}

/// Result type for slicer operations.
pub type Result<T> = std::result::Result<T, SlicerError>;
