//! Line-oriented G-code: write a move list, and read one back.
//!
//! Only `G0` (travel) and `G1` (print) are understood. Each emitted line
//! carries the move's destination; its origin is implied by the line before.

use serde::{Deserialize, Serialize};
use strata_math::Point3;
use tracing::{debug, warn};

use crate::planner::{Move, Toolpath, ToolpathStats};

/// First line of every generated program.
pub const HEADER: &str = ";G-code:";

/// Format one move as a command line, without the trailing newline.
pub fn format_move(mv: &Move) -> String {
    let end = &mv.end;
    if mv.is_print {
        format!(
            "G1 X{:.3} Y{:.3} Z{:.3} F{} E{:.5}",
            end.x, end.y, end.z, mv.speed, mv.cumulative_extrusion
        )
    } else {
        format!("G0 X{:.3} Y{:.3} Z{:.3} F{}", end.x, end.y, end.z, mv.speed)
    }
}

/// Serialize a move list, header first, one newline-terminated line per move.
pub fn write_gcode(moves: &[Move]) -> String {
    let mut out = String::with_capacity(64 * (moves.len() + 1));
    out.push_str(HEADER);
    out.push('\n');
    for mv in moves {
        out.push_str(&format_move(mv));
        out.push('\n');
    }
    out
}

/// Why a token was skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WarningKind {
    /// The token's letter is not one of `G X Y Z F E`.
    UnknownKey,
    /// The letter is known but the rest is not a number.
    BadValue,
}

/// A skipped token. The rest of its line is still used.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseWarning {
    /// 1-based line number.
    pub line: usize,
    /// The token as written.
    pub token: String,
    /// What was wrong with it.
    pub kind: WarningKind,
}

/// Moves recovered from a command log, with diagnostics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParsedProgram {
    /// Reconstructed moves.
    pub moves: Vec<Move>,
    /// Tokens that were skipped.
    pub warnings: Vec<ParseWarning>,
    /// 1-based numbers of non-blank lines with no `G0`/`G1`.
    pub discarded_lines: Vec<usize>,
}

impl ParsedProgram {
    /// Wrap the moves as a toolpath with recomputed totals.
    pub fn into_toolpath(self) -> Toolpath {
        let stats = ToolpathStats::from_moves(&self.moves);
        Toolpath {
            moves: self.moves,
            stats,
        }
    }
}

/// Values carried from one valid line to the next.
#[derive(Debug, Clone, Copy)]
struct ModalState {
    position: Point3,
    speed: f64,
    extrusion: f64,
}

/// Parse a command log back into moves.
///
/// Coordinates, feed rate and extrusion are modal: a word missing from a
/// line keeps the previous move's value. The first move starts at the
/// origin. Text after `;` is a comment.
pub fn parse_gcode(text: &str) -> ParsedProgram {
    let mut program = ParsedProgram::default();
    let mut modal = ModalState {
        position: Point3::origin(),
        speed: 0.0,
        extrusion: 0.0,
    };

    for (idx, raw) in text.lines().enumerate() {
        let line_no = idx + 1;
        let code = raw.split(';').next().unwrap_or("").trim();
        if code.is_empty() {
            continue;
        }

        match parse_line(code, line_no, &modal, &mut program.warnings) {
            Some(mv) => {
                modal = ModalState {
                    position: mv.end,
                    speed: mv.speed,
                    extrusion: mv.cumulative_extrusion,
                };
                program.moves.push(mv);
            }
            None => {
                debug!(line = line_no, text = code, "discarding line without G0/G1");
                program.discarded_lines.push(line_no);
            }
        }
    }

    program
}

fn parse_line(
    code: &str,
    line: usize,
    modal: &ModalState,
    warnings: &mut Vec<ParseWarning>,
) -> Option<Move> {
    let mut end = modal.position;
    let mut speed = modal.speed;
    let mut extrusion = modal.extrusion;
    let mut is_print = None;

    for token in code.split_whitespace() {
        let mut chars = token.chars();
        let Some(letter) = chars.next() else {
            continue;
        };
        let key = letter.to_ascii_uppercase();
        if !matches!(key, 'G' | 'X' | 'Y' | 'Z' | 'F' | 'E') {
            warn!(line, token, "unrecognized G-code word");
            warnings.push(ParseWarning {
                line,
                token: token.to_string(),
                kind: WarningKind::UnknownKey,
            });
            continue;
        }

        let value: f64 = match chars.as_str().parse() {
            Ok(v) => v,
            Err(_) => {
                warn!(line, token, "G-code word has no numeric value");
                warnings.push(ParseWarning {
                    line,
                    token: token.to_string(),
                    kind: WarningKind::BadValue,
                });
                continue;
            }
        };

        match key {
            'G' if value == 0.0 => is_print = Some(false),
            'G' if value == 1.0 => is_print = Some(true),
            'G' => debug!(line, token, "ignoring unsupported G command"),
            'X' => end.x = value,
            'Y' => end.y = value,
            'Z' => end.z = value,
            'F' => speed = value,
            _ => extrusion = value,
        }
    }

    is_print.map(|is_print| Move {
        start: modal.position,
        end,
        speed,
        is_print,
        cumulative_extrusion: extrusion,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn mv(end: [f64; 3], speed: f64, is_print: bool, extrusion: f64) -> Move {
        Move {
            start: Point3::origin(),
            end: Point3::new(end[0], end[1], end[2]),
            speed,
            is_print,
            cumulative_extrusion: extrusion,
        }
    }

    #[test]
    fn test_format_lines() {
        assert_eq!(
            format_move(&mv([1.0, 2.5, 3.0], 500.0, false, 0.0)),
            "G0 X1.000 Y2.500 Z3.000 F500"
        );
        assert_eq!(
            format_move(&mv([10.0, 0.0, 3.0], 12.5, true, 0.123456789)),
            "G1 X10.000 Y0.000 Z3.000 F12.5 E0.12346"
        );
    }

    #[test]
    fn test_write_has_header() {
        let text = write_gcode(&[mv([1.0, 0.0, 0.0], 500.0, true, 0.5)]);
        assert_eq!(text, ";G-code:\nG1 X1.000 Y0.000 Z0.000 F500 E0.50000\n");
        assert_eq!(write_gcode(&[]), ";G-code:\n");
    }

    #[test]
    fn test_parse_modal_words() {
        let program = parse_gcode("G0 X1 Y2 Z3 F600\nG1 X4 E0.25\nG1 Y5\n");
        assert!(program.warnings.is_empty());
        assert_eq!(program.moves.len(), 3);

        let second = program.moves[1];
        assert!(second.is_print);
        assert_eq!(second.start, Point3::new(1.0, 2.0, 3.0));
        assert_eq!(second.end, Point3::new(4.0, 2.0, 3.0));
        assert_relative_eq!(second.speed, 600.0);
        assert_relative_eq!(second.cumulative_extrusion, 0.25);

        let third = program.moves[2];
        assert_eq!(third.start, second.end);
        assert_eq!(third.end, Point3::new(4.0, 5.0, 3.0));
        assert_relative_eq!(third.cumulative_extrusion, 0.25);
    }

    #[test]
    fn test_first_move_starts_at_origin() {
        let program = parse_gcode("G1 X2 Y2 Z0 F100 E1");
        assert_eq!(program.moves[0].start, Point3::origin());
    }

    #[test]
    fn test_lines_without_motion_are_discarded() {
        let program = parse_gcode(";G-code:\nM104 S200\n\nG28\nX5 Y5\nG0 X1\n");
        assert_eq!(program.moves.len(), 1);
        assert_eq!(program.discarded_lines, vec![2, 4, 5]);
        assert_eq!(program.moves[0].end, Point3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn test_unknown_word_warns_but_keeps_line() {
        let program = parse_gcode("G1 X3 S9 Y4 E0.1\n");
        assert_eq!(program.moves.len(), 1);
        assert_eq!(program.moves[0].end, Point3::new(3.0, 4.0, 0.0));
        assert_eq!(
            program.warnings,
            vec![ParseWarning {
                line: 1,
                token: "S9".into(),
                kind: WarningKind::UnknownKey,
            }]
        );
    }

    #[test]
    fn test_bad_value_is_skipped() {
        let program = parse_gcode("G0 Xabc Y1\n");
        assert_eq!(program.moves[0].end, Point3::new(0.0, 1.0, 0.0));
        assert_eq!(program.warnings[0].kind, WarningKind::BadValue);
    }

    #[test]
    fn test_lowercase_and_comments() {
        let program = parse_gcode("g1 x1 y1 z0 f50 e0.2 ; outer wall\n");
        assert_eq!(program.moves.len(), 1);
        assert!(program.moves[0].is_print);
        assert!(program.warnings.is_empty());
    }

    #[test]
    fn test_invalid_line_does_not_move_modal_state() {
        let program = parse_gcode("G0 X1\nG28 X9\nG0 Y1\n");
        assert_eq!(program.moves[1].start, Point3::new(1.0, 0.0, 0.0));
        assert_eq!(program.moves[1].end, Point3::new(1.0, 1.0, 0.0));
    }

    #[test]
    fn test_round_trip() {
        let moves = vec![
            Move {
                start: Point3::origin(),
                end: Point3::new(1.23456, 2.0, 0.5),
                speed: 900.0,
                is_print: false,
                cumulative_extrusion: 0.0,
            },
            Move {
                start: Point3::new(1.23456, 2.0, 0.5),
                end: Point3::new(7.0, 2.0, 0.5),
                speed: 450.0,
                is_print: true,
                cumulative_extrusion: 0.0123456,
            },
        ];
        let parsed = parse_gcode(&write_gcode(&moves));
        assert!(parsed.warnings.is_empty());
        assert!(parsed.discarded_lines.is_empty());
        assert_eq!(parsed.moves.len(), moves.len());
        for (a, b) in moves.iter().zip(&parsed.moves) {
            assert_eq!(a.is_print, b.is_print);
            assert_relative_eq!(a.speed, b.speed);
            assert!((a.end - b.end).amax() <= 5e-4);
            assert!((a.cumulative_extrusion - b.cumulative_extrusion).abs() <= 5e-6);
        }
        let toolpath = parsed.into_toolpath();
        assert_eq!(toolpath.stats.print_moves, 1);
        assert_eq!(toolpath.stats.travel_moves, 1);
    }
}
