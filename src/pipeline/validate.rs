//! Line-budget enforcement: the last word on line length.
//!
//! The formatter can leave a line over budget when a single word is longer
//! than the available width. This pass re-scans every line and force-breaks
//! offenders at the last space that fits, or at the budget boundary when
//! there is none, until every fragment fits. It never fails.

use crate::pipeline::classify::{classify_line, LineContext, LineKind};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Result of [`enforce_line_budget`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    /// Text in which every line is at most the budget.
    pub text: String,
    /// Number of source lines that had to be broken.
    pub corrections: usize,
}

/// Break every line longer than `column_budget` characters.
///
/// Continuation fragments keep the original line's indentation when it is
/// narrower than half the budget. For a list item the indentation includes
/// the marker width, so hanging indents survive the break.
pub fn enforce_line_budget(text: &str, column_budget: usize) -> ValidationReport {
    let budget = column_budget.max(1);
    let mut lines: Vec<String> = Vec::new();
    let mut corrections = 0usize;

    for line in text.split('\n') {
        if line.chars().count() <= budget {
            lines.push(line.to_string());
            continue;
        }
        corrections += 1;
        lines.extend(break_line(line, budget));
    }

    if corrections > 0 {
        warn!(
            "Line budget: fixed {} line(s) longer than {} characters",
            corrections, budget
        );
    }

    ValidationReport {
        text: lines.join("\n"),
        corrections,
    }
}

/// `true` when no line of `text` exceeds `column_budget` characters.
pub fn fits_budget(text: &str, column_budget: usize) -> bool {
    text.split('\n').all(|l| l.chars().count() <= column_budget)
}

// ── Internal helpers ─────────────────────────────────────────────────────────

fn break_line(line: &str, budget: usize) -> Vec<String> {
    let width = hanging_width(line);
    let indent = if width * 2 < budget {
        " ".repeat(width)
    } else {
        String::new()
    };

    let mut pieces = Vec::new();
    let mut rest: Vec<char> = line.chars().collect();
    // The list marker is not a break point.
    let mut keep = width;

    while rest.len() > budget {
        let split = last_break_space(&rest, budget, keep);
        keep = 0;
        let (head, tail) = match split {
            Some(idx) => (&rest[..idx], &rest[idx + 1..]),
            None => (&rest[..budget], &rest[budget..]),
        };
        pieces.push(head.iter().collect::<String>().trim_end().to_string());

        let tail: String = tail.iter().collect();
        let tail = tail.trim_start();
        if tail.is_empty() {
            rest.clear();
            break;
        }
        rest = indent.chars().chain(tail.chars()).collect();
    }
    if !rest.is_empty() {
        pieces.push(rest.into_iter().collect());
    }
    pieces
}

/// Leading spaces, plus the marker of a list item.
fn hanging_width(line: &str) -> usize {
    let leading = line.chars().take_while(|c| *c == ' ').count();
    let trimmed = line.trim();
    match classify_line(trimmed, LineContext::default()) {
        LineKind::ListItem { body, .. } => leading + trimmed.chars().count() - body.chars().count(),
        _ => leading,
    }
}

/// Index of the last space at or before `budget` that has content before it
/// and lies at or past `keep`.
fn last_break_space(chars: &[char], budget: usize, keep: usize) -> Option<usize> {
    let first_content = chars.iter().position(|c| *c != ' ')?.max(keep.saturating_sub(1));
    (first_content + 1..=budget.min(chars.len() - 1))
        .rev()
        .find(|&i| chars[i] == ' ')
}

// ── Tests ────────────────────────────────────────────────────────────────────
