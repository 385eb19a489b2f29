#![warn(missing_docs)]

//! Move planning and G-code for the strata slicer.
//!
//! Takes the ordered segment stream from `strata-slicer`, turns it into
//! travel and print moves with cumulative extrusion, and serializes the
//! moves as a minimal `G0`/`G1` program. The parser reads such a program
//! back, so a written toolpath can be inspected or replayed.
//!
//! # Example
//!
//! ```
//! use strata_gcode::{parse_gcode, plan_moves, write_gcode, PrinterConfig};
//! use strata_slicer::{slice_mesh, Mesh};
//! use strata_slicer::StartAnchor;
//!
//! let config = PrinterConfig::default();
//! let cube = Mesh::cuboid([10.0, 10.0, 10.0]);
//! let sliced = slice_mesh(&cube, &config.slice_settings(StartAnchor::Origin)).unwrap();
//!
//! let toolpath = plan_moves(&sliced.segments, &config);
//! let text = write_gcode(&toolpath.moves);
//! assert!(text.starts_with(";G-code:"));
//!
//! let parsed = parse_gcode(&text);
//! assert_eq!(parsed.moves.len(), toolpath.moves.len());
//! ```

pub mod codec;
pub mod config;
pub mod error;
pub mod planner;

pub use codec::{
    format_move, parse_gcode, write_gcode, ParseWarning, ParsedProgram, WarningKind, HEADER,
};
pub use config::PrinterConfig;
pub use error::{GcodeError, Result};
pub use planner::{plan_moves, Move, MovePlanner, Toolpath, ToolpathStats};
