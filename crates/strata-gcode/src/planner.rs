//! Convert ordered slice segments into travel and print moves.

use serde::{Deserialize, Serialize};
use strata_math::Point3;
use strata_slicer::Segment;

use crate::config::PrinterConfig;

/// One straight motion of the nozzle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Move {
    /// Where the motion begins.
    pub start: Point3,
    /// Where the motion ends.
    pub end: Point3,
    /// Feed rate.
    pub speed: f64,
    /// `true` deposits material; `false` is a travel.
    pub is_print: bool,
    /// Filament pushed so far, including this move.
    pub cumulative_extrusion: f64,
}

impl Move {
    /// Whether this is a non-extruding relocation.
    pub fn is_travel(&self) -> bool {
        !self.is_print
    }

    /// Straight-line length.
    pub fn length(&self) -> f64 {
        (self.end - self.start).norm()
    }
}

/// Totals over a planned toolpath.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolpathStats {
    /// Number of print moves.
    pub print_moves: usize,
    /// Number of travel moves.
    pub travel_moves: usize,
    /// Summed length of print moves (mm).
    pub printed_distance: f64,
    /// Summed length of travel moves (mm).
    pub travel_distance: f64,
    /// Filament consumed by the whole toolpath (mm).
    pub total_extrusion: f64,
}

impl ToolpathStats {
    /// Tally an existing move sequence.
    pub fn from_moves(moves: &[Move]) -> Self {
        let mut stats = Self::default();
        for mv in moves {
            stats.record(mv);
        }
        stats
    }

    fn record(&mut self, mv: &Move) {
        if mv.is_print {
            self.print_moves += 1;
            self.printed_distance += mv.length();
        } else {
            self.travel_moves += 1;
            self.travel_distance += mv.length();
        }
        self.total_extrusion = self.total_extrusion.max(mv.cumulative_extrusion);
    }
}

/// A finished, ordered move list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Toolpath {
    /// Moves in execution order.
    pub moves: Vec<Move>,
    /// Totals over `moves`.
    pub stats: ToolpathStats,
}

/// Running nozzle state for one planning pass.
#[derive(Debug, Clone, Copy, PartialEq)]
struct PlannerState {
    position: Point3,
    printed_distance: f64,
    extrusion: f64,
}

impl Default for PlannerState {
    fn default() -> Self {
        Self {
            position: Point3::origin(),
            printed_distance: 0.0,
            extrusion: 0.0,
        }
    }
}

/// Builds a toolpath one segment at a time.
///
/// The nozzle starts at the origin with nothing extruded. The planner is
/// consumed by [`MovePlanner::finish`], so its state never outlives the pass.
#[derive(Debug, Clone)]
pub struct MovePlanner {
    config: PrinterConfig,
    state: PlannerState,
    moves: Vec<Move>,
    stats: ToolpathStats,
}

impl MovePlanner {
    /// Start a pass with the given printer settings.
    pub fn new(config: &PrinterConfig) -> Self {
        Self {
            config: config.clone(),
            state: PlannerState::default(),
            moves: Vec::new(),
            stats: ToolpathStats::default(),
        }
    }

    /// Current nozzle position.
    pub fn position(&self) -> Point3 {
        self.state.position
    }

    /// Filament extruded so far.
    pub fn extrusion(&self) -> f64 {
        self.state.extrusion
    }

    /// Print along `segment`, travelling to its start first if needed.
    pub fn push_segment(&mut self, segment: &Segment) {
        if self.state.position != segment.start {
            self.emit(segment.start, self.config.move_speed, false);
        }

        self.state.printed_distance += segment.length();
        self.state.extrusion = self.config.extrusion_for(self.state.printed_distance);
        self.emit(segment.end, self.config.print_speed, true);
    }

    /// Push every segment in order.
    pub fn extend<'a>(&mut self, segments: impl IntoIterator<Item = &'a Segment>) {
        for segment in segments {
            self.push_segment(segment);
        }
    }

    /// End the pass and hand over the moves.
    pub fn finish(self) -> Toolpath {
        Toolpath {
            moves: self.moves,
            stats: self.stats,
        }
    }

    fn emit(&mut self, end: Point3, speed: f64, is_print: bool) {
        let mv = Move {
            start: self.state.position,
            end,
            speed,
            is_print,
            cumulative_extrusion: self.state.extrusion,
        };
        self.stats.record(&mv);
        self.moves.push(mv);
        self.state.position = end;
    }
}

/// Plan a whole segment stream in one call.
pub fn plan_moves(segments: &[Segment], config: &PrinterConfig) -> Toolpath {
    let mut planner = MovePlanner::new(config);
    planner.extend(segments);
    planner.finish()
}
