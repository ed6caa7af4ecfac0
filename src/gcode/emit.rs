//! G-code emission for one physical page of Braille.
//!
//! ## Canvas model
//!
//! Layout happens on a canvas with its origin at the top-left corner of the
//! paper and Y growing downwards. Each cell is a 2×3 dot grid anchored at
//! its top-left dot:
//!
//! ```text
//!  x →  cx        cx+lw
//!  cy    ● 1       ● 4
//!  +lw   ● 2       ● 5
//!  +2lw  ● 3       ● 6
//! ```
//!
//! The anchor advances by `letter_width + letter_padding` per cell and by
//! `3 × letter_width + line_padding` per line. A line is cut where the next
//! cell would cross `paper_width - margin`; lines below
//! `paper_height - margin` are dropped. The caller paginates first, so
//! dropping is only a guard.
//!
//! ## Printer coordinates
//!
//! Canvas points are mapped to machine coordinates (Y up) by
//! [`to_machine`], then rounded to two decimals on output.

use super::cell::{dot_slot, Dots};
use super::settings::PrinterSettings;
use crate::error::BrailleError;
use std::fmt;
use tracing::{debug, warn};

/// Rough time cost of one instruction, used for the estimate.
pub const SECONDS_PER_INSTRUCTION: f64 = 0.05;

/// One line of the emitted program.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Instruction {
    /// `G90`
    AbsolutePositioning,
    /// `G1 F…`
    FeedRate(f64),
    /// `G0 X… Y…`
    Travel { x: f64, y: f64 },
    /// `G1 Z…` down to the embossing height.
    Press { z: f64 },
    /// `G1 Z…` up to the travel height.
    Lift { z: f64 },
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instruction::AbsolutePositioning => write!(f, "G90"),
            Instruction::FeedRate(rate) => write!(f, "G1 F{rate:.2}"),
            Instruction::Travel { x, y } => write!(f, "G0 X{x:.2} Y{y:.2}"),
            Instruction::Press { z } | Instruction::Lift { z } => write!(f, "G1 Z{z:.2}"),
        }
    }
}

/// A complete embossing program for one page.
#[derive(Debug, Clone, PartialEq)]
pub struct GcodeProgram {
    pub instructions: Vec<Instruction>,
    /// Width of the embossed area, dot bounding box plus dot diameter.
    pub width: f64,
    pub height: f64,
    pub estimated_seconds: f64,
    /// Lines cut short at the right margin.
    pub truncated_lines: usize,
    /// Lines not embossed because the page was full.
    pub dropped_lines: usize,
}

impl GcodeProgram {
    /// Number of dots the program presses.
    pub fn press_count(&self) -> usize {
        self.instructions
            .iter()
            .filter(|i| matches!(i, Instruction::Press { .. }))
            .count()
    }

    /// The program as text, one instruction per line, newline-terminated.
    pub fn to_gcode(&self) -> String {
        let mut out = String::with_capacity(self.instructions.len() * 20);
        for instruction in &self.instructions {
            out.push_str(&instruction.to_string());
            out.push('\n');
        }
        out
    }
}

impl fmt::Display for GcodeProgram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_gcode())
    }
}

/// Build the embossing program for `braille_text` with `settings`.
///
/// Either a complete program is returned or an error; there is no partial
/// output. Characters outside the Braille block are treated as blank cells.
pub fn emit(braille_text: &str, settings: &PrinterSettings) -> Result<GcodeProgram, BrailleError> {
    settings.validate()?;

    let lw = settings.letter_width;
    let right_edge = settings.paper_width - settings.margin;
    let bottom_edge = settings.paper_height - settings.margin;

    let mut instructions = vec![
        Instruction::AbsolutePositioning,
        Instruction::FeedRate(settings.feed_rate),
        Instruction::Lift {
            z: settings.head_up_z,
        },
    ];
    let mut bounds = Bounds::default();
    let mut last_travel: Option<(f64, f64)> = None;
    let mut truncated_lines = 0usize;
    let mut dropped_lines = 0usize;

    let lines: Vec<&str> = braille_text.split('\n').collect();
    let mut cy = settings.margin;

    for (line_idx, line) in lines.iter().enumerate() {
        if cy + 2.0 * lw > bottom_edge {
            dropped_lines = lines.len() - line_idx;
            break;
        }

        let mut cx = settings.margin;
        for (col, c) in line.chars().enumerate() {
            if cx + lw > right_edge {
                if line.chars().skip(col).any(|c| c != ' ' && c != '\u{2800}') {
                    truncated_lines += 1;
                }
                break;
            }
            if let Some(dots) = Dots::from_char(c) {
                for dot in dots.numbers() {
                    let (dx, dy) = dot_slot(dot);
                    let x = cx + f64::from(dx) * lw;
                    let y = cy + f64::from(dy) * lw;
                    bounds.include(x, y);

                    let (gx, gy) = to_machine(x, y, settings)?;
                    if last_travel != Some((gx, gy)) {
                        instructions.push(Instruction::Travel { x: gx, y: gy });
                        last_travel = Some((gx, gy));
                    }
                    instructions.push(Instruction::Press {
                        z: settings.head_down_z,
                    });
                    instructions.push(Instruction::Lift {
                        z: settings.head_up_z,
                    });
                }
            }
            cx += settings.cell_advance();
        }
        cy += settings.line_advance();
    }

    instructions.push(Instruction::Lift {
        z: settings.head_up_z,
    });

    if truncated_lines > 0 {
        warn!(
            "G-code: {} line(s) cut at the right margin ({:.1} mm)",
            truncated_lines, right_edge
        );
    }
    if dropped_lines > 0 {
        warn!(
            "G-code: {} line(s) did not fit on the page and were not embossed",
            dropped_lines
        );
    }

    let (width, height) = bounds.size(settings.dot_radius);
    let program = GcodeProgram {
        estimated_seconds: instructions.len() as f64 * SECONDS_PER_INSTRUCTION,
        instructions,
        width,
        height,
        truncated_lines,
        dropped_lines,
    };
    debug!(
        "G-code: {} instructions, {} dots, {:.1}×{:.1} mm",
        program.instructions.len(),
        program.press_count(),
        program.width,
        program.height
    );
    Ok(program)
}

/// Map a canvas point (origin top-left, Y down) to machine coordinates.
///
/// `gx = invert_x ? -x : paper_width - x`, `gy = -y`; then a delta machine
/// is re-centred by half the paper size, otherwise `paper_height` is added
/// unless Y is inverted. Mirroring negates the result.
pub fn to_machine(x: f64, y: f64, s: &PrinterSettings) -> Result<(f64, f64), BrailleError> {
    let mut gx = if s.invert_x { -x } else { s.paper_width - x };
    let mut gy = -y;

    if s.delta {
        gx += if s.invert_x {
            s.paper_width / 2.0
        } else {
            -s.paper_width / 2.0
        };
        gy += if s.invert_y {
            -s.paper_height / 2.0
        } else {
            s.paper_height / 2.0
        };
    } else if !s.invert_y {
        gy += s.paper_height;
    }

    if s.mirror_x {
        gx = -gx;
    }
    if s.mirror_y {
        gy = -gy;
    }

    if !gx.is_finite() || !gy.is_finite() {
        return Err(BrailleError::Generation(format!(
            "coordinate ({x}, {y}) maps to a non-finite machine position"
        )));
    }
    Ok((gx, gy))
}

// ── Internal helpers ─────────────────────────────────────────────────────────

#[derive(Default)]
struct Bounds {
    min: Option<(f64, f64)>,
    max: Option<(f64, f64)>,
}

impl Bounds {
    fn include(&mut self, x: f64, y: f64) {
        self.min = Some(match self.min {
            Some((mx, my)) => (mx.min(x), my.min(y)),
            None => (x, y),
        });
        self.max = Some(match self.max {
            Some((mx, my)) => (mx.max(x), my.max(y)),
            None => (x, y),
        });
    }

    fn size(&self, dot_radius: f64) -> (f64, f64) {
        match (self.min, self.max) {
            (Some((x0, y0)), Some((x1, y1))) => {
                (x1 - x0 + 2.0 * dot_radius, y1 - y0 + 2.0 * dot_radius)
            }
            _ => (0.0, 0.0),
        }
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn defaults() -> PrinterSettings {
        PrinterSettings::default()
    }

    fn a4() -> PrinterSettings {
        PrinterSettings {
            paper_width: 210.0,
            paper_height: 297.0,
            ..defaults()
        }
    }

    #[test]
    fn test_single_cell_dots_one_and_two() {
        let program = emit("\u{2803}", &defaults()).unwrap();
        assert_eq!(program.press_count(), 2);

        let s = defaults();
        let (x1, y1) = to_machine(s.margin, s.margin, &s).unwrap();
        let (x2, y2) = to_machine(s.margin, s.margin + s.letter_width, &s).unwrap();
        let travels: Vec<(f64, f64)> = program
            .instructions
            .iter()
            .filter_map(|i| match i {
                Instruction::Travel { x, y } => Some((*x, *y)),
                _ => None,
            })
            .collect();
        assert_eq!(travels, vec![(x1, y1), (x2, y2)]);
    }

    #[test]
    fn test_program_shape() {
        let program = emit("\u{2801}", &a4()).unwrap();
        let text = program.to_gcode();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "G90");
        assert_eq!(lines[1], "G1 F5000.00");
        assert_eq!(lines[2], "G1 Z10.00");
        assert_eq!(lines[3], "G0 X200.00 Y287.00");
        assert_eq!(lines[4], "G1 Z-2.00");
        assert_eq!(lines[5], "G1 Z10.00");
        assert_eq!(*lines.last().unwrap(), "G1 Z10.00");
        assert_eq!(text.matches("G90").count(), 1);
        assert_eq!(text.matches(" F").count(), 1);
    }

    #[test]
    fn test_space_and_blank_cell_emit_nothing() {
        let program = emit(" \u{2800} ", &defaults()).unwrap();
        assert_eq!(program.press_count(), 0);
        assert_eq!(program.width, 0.0);
        assert_eq!(program.instructions.len(), 4);
    }

    #[test]
    fn test_space_advances_cursor() {
        let s = defaults();
        let program = emit(" \u{2801}", &s).unwrap();
        let (gx, gy) = to_machine(s.margin + s.cell_advance(), s.margin, &s).unwrap();
        assert!(program
            .instructions
            .contains(&Instruction::Travel { x: gx, y: gy }));
    }

    #[test]
    fn test_long_line_truncated() {
        // (210 - 2*10) / 6 mm per cell: 32 cells fit, 40 do not.
        let line = "\u{2801}".repeat(40);
        let program = emit(&line, &a4()).unwrap();
        assert_eq!(program.press_count(), 32);
        assert_eq!(program.truncated_lines, 1);
    }

    #[test]
    fn test_default_sheet_fits_forty_by_twenty_five() {
        let text = vec!["\u{2801}".repeat(40); 25].join("\n");
        let program = emit(&text, &defaults()).unwrap();
        assert_eq!(program.truncated_lines, 0);
        assert_eq!(program.dropped_lines, 0);
        assert_eq!(program.press_count(), 40 * 25);
    }

    #[test]
    fn test_page_exhaustion_drops_lines() {
        let text = vec!["\u{2801}"; 60].join("\n");
        let program = emit(&text, &defaults()).unwrap();
        assert!(program.dropped_lines > 0);
        assert_eq!(program.press_count(), 60 - program.dropped_lines);
    }

    #[test]
    fn test_invalid_settings_error() {
        let s = PrinterSettings {
            feed_rate: -1.0,
            ..defaults()
        };
        assert!(matches!(emit("\u{2801}", &s), Err(BrailleError::Generation(_))));
    }

    #[test]
    fn test_transform_variants() {
        let mut s = a4();
        assert_eq!(to_machine(10.0, 20.0, &s).unwrap(), (200.0, 277.0));

        s.invert_x = true;
        s.invert_y = true;
        assert_eq!(to_machine(10.0, 20.0, &s).unwrap(), (-10.0, -20.0));

        s = a4();
        s.delta = true;
        assert_eq!(to_machine(10.0, 20.0, &s).unwrap(), (95.0, 128.5));

        s = a4();
        s.mirror_x = true;
        s.mirror_y = true;
        assert_eq!(to_machine(10.0, 20.0, &s).unwrap(), (-200.0, -277.0));
    }

    #[test]
    fn test_bounding_box() {
        // Dots 1 and 6: opposite corners of one cell.
        let program = emit("\u{2821}", &defaults()).unwrap();
        assert!((program.width - 3.5).abs() < 1e-9);
        assert!((program.height - 6.0).abs() < 1e-9);
        assert!(program.estimated_seconds > 0.0);
    }
}
