//! Braille page formatting: indentation and fixed-width word wrapping.
//!
//! Works in the source alphabet, before translation, because contractions
//! change the cell count of a line in ways that cannot be predicted from the
//! Braille side. Every length here is a `char` count, never a byte count.
//!
//! ## Layout rules
//!
//! - Titles are upper-cased and sit between exactly one blank line on each
//!   side. A title that already fits is not rewrapped.
//! - List items use a hanging indent: the marker opens the first line and
//!   continuation lines are padded by the marker's width.
//! - Paragraph lines carry a two-space indent unless the source line was
//!   already indented, in which case its own indentation is kept.
//! - A word longer than the available width is placed alone on its line;
//!   [`crate::pipeline::validate`] force-breaks it afterwards.

use crate::config::ParagraphJoin;
use crate::error::BrailleError;
use crate::pipeline::classify::{classify_line, LineContext, LineKind};
use tracing::debug;

/// Indent given to paragraph lines that are not already indented.
pub const PARAGRAPH_INDENT: &str = "  ";

/// Lines at or below this length are candidates for paragraph rejoining.
pub const SHORT_LINE_CHARS: usize = 20;

/// Format normalised text for a `column_budget`-wide Braille line.
///
/// Returns `BrailleError::Formatting` only when the budget cannot hold a
/// paragraph indent plus one character.
pub fn format_text(
    text: &str,
    column_budget: usize,
    join: ParagraphJoin,
) -> Result<String, BrailleError> {
    if column_budget <= PARAGRAPH_INDENT.len() {
        return Err(BrailleError::Formatting(format!(
            "column budget {column_budget} cannot hold an indented line"
        )));
    }

    let blocks = split_blocks(text);
    let multi = blocks.len() > 1;
    let mut out: Vec<String> = Vec::new();

    for block in &blocks {
        let ctx = LineContext {
            isolated: multi && block.len() == 1,
        };
        let items = join_paragraph_lines(classify_block(block, ctx), join);
        for item in items {
            render_item(item, column_budget, &mut out);
        }
        out.push(String::new());
    }

    let formatted = collapse_blank_lines(&out);
    debug!(
        "Formatted {} blocks into {} lines (budget {})",
        blocks.len(),
        formatted.lines().count(),
        column_budget
    );
    Ok(formatted)
}

/// Greedily wrap `words` into lines of at most `first_max` characters for
/// the first line and `rest_max` for the others.
///
/// A word is appended while `current + 1 + word ≤ max`; an over-long word
/// goes alone on its own line.
pub fn wrap_words(words: &[&str], first_max: usize, rest_max: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;

    for word in words {
        let word_len = word.chars().count();
        let max = if lines.is_empty() { first_max } else { rest_max };
        if current_len == 0 {
            current.push_str(word);
            current_len = word_len;
        } else if current_len + 1 + word_len <= max {
            current.push(' ');
            current.push_str(word);
            current_len += 1 + word_len;
        } else {
            lines.push(std::mem::take(&mut current));
            current.push_str(word);
            current_len = word_len;
        }
    }
    if current_len > 0 {
        lines.push(current);
    }
    lines
}

// ── Internal helpers ─────────────────────────────────────────────────────────

#[derive(Debug, PartialEq)]
enum Item {
    Title(String),
    List { marker: String, body: String },
    /// `indent` is `None` when the source line was not indented.
    Para { text: String, indent: Option<String> },
}

/// Non-empty lines grouped by blank-line boundaries.
fn split_blocks(text: &str) -> Vec<Vec<&str>> {
    let mut blocks = Vec::new();
    let mut current = Vec::new();
    for line in text.lines() {
        let line = line.trim_end();
        if line.trim().is_empty() {
            if !current.is_empty() {
                blocks.push(std::mem::take(&mut current));
            }
        } else {
            current.push(line);
        }
    }
    if !current.is_empty() {
        blocks.push(current);
    }
    blocks
}

fn classify_block(block: &[&str], ctx: LineContext) -> Vec<Item> {
    block
        .iter()
        .map(|line| match classify_line(line, ctx) {
            LineKind::Title => Item::Title(line.trim().to_string()),
            LineKind::ListItem { marker, body } => Item::List { marker, body },
            LineKind::Paragraph => {
                let lead_len = line.len() - line.trim_start().len();
                Item::Para {
                    text: line.trim().to_string(),
                    indent: (lead_len > 0).then(|| line[..lead_len].to_string()),
                }
            }
        })
        .collect()
}

/// Rejoin paragraph lines that an extractor split at visual line breaks.
fn join_paragraph_lines(items: Vec<Item>, join: ParagraphJoin) -> Vec<Item> {
    if join == ParagraphJoin::Off {
        return items;
    }
    let joinable = |item: &Item| match item {
        Item::Para { text, indent: None } => {
            join == ParagraphJoin::Always || text.chars().count() <= SHORT_LINE_CHARS
        }
        _ => false,
    };

    let mut out: Vec<Item> = Vec::with_capacity(items.len());
    let mut run_open = false;
    for item in items {
        let can_join = joinable(&item);
        if can_join && run_open {
            if let (Some(Item::Para { text: prev, .. }), Item::Para { text, .. }) =
                (out.last_mut(), &item)
            {
                prev.push(' ');
                prev.push_str(text);
                continue;
            }
        }
        run_open = can_join;
        out.push(item);
    }
    out
}

fn render_item(item: Item, budget: usize, out: &mut Vec<String>) {
    match item {
        Item::Title(text) => {
            let upper = text.to_uppercase();
            if out.last().is_some_and(|l| !l.is_empty()) {
                out.push(String::new());
            }
            if upper.chars().count() <= budget {
                out.push(upper);
            } else {
                let words: Vec<&str> = upper.split_whitespace().collect();
                out.extend(wrap_words(&words, budget, budget));
            }
            out.push(String::new());
        }
        Item::List { marker, body } => {
            let marker_width = marker.chars().count();
            let max = budget.saturating_sub(marker_width).max(1);
            let hanging = " ".repeat(marker_width);
            let words: Vec<&str> = body.split_whitespace().collect();
            for (i, line) in wrap_words(&words, max, max).into_iter().enumerate() {
                let prefix = if i == 0 { marker.as_str() } else { hanging.as_str() };
                out.push(format!("{prefix}{line}"));
            }
        }
        Item::Para { text, indent } => {
            let indent = indent.unwrap_or_else(|| PARAGRAPH_INDENT.to_string());
            let max = budget.saturating_sub(indent.chars().count()).max(1);
            let words: Vec<&str> = text.split_whitespace().collect();
            for line in wrap_words(&words, max, max) {
                out.push(format!("{indent}{line}"));
            }
        }
    }
}

fn collapse_blank_lines(lines: &[String]) -> String {
    let mut kept: Vec<&str> = Vec::with_capacity(lines.len());
    for line in lines {
        if line.is_empty() && kept.last().is_none_or(|l| l.is_empty()) {
            continue;
        }
        kept.push(line);
    }
    while kept.last().is_some_and(|l| l.is_empty()) {
        kept.pop();
    }
    kept.join("\n")
}

// ── Tests ────────────────────────────────────────────────────────────────────
