//! Embedded lookup-table translator.
//!
//! Grade 1 maps character by character. Grade 2 works word by word:
//!
//! 1. the whole word (case-insensitive) against the word table;
//! 2. the word stripped of surrounding punctuation against the same table;
//! 3. otherwise a left-to-right scan that prefers the longest letter-group
//!    contraction at each position over a single-character mapping.
//!
//! Grade 2 passes whitespace through verbatim. Grade 1 keeps spaces and
//! newlines, writes a tab as [`TAB_CELLS`] and other whitespace as a space.
//! Characters with no mapping become [`UNTRANSLATABLE`].

use super::tables::{
    DIGITS, GROUP_CONTRACTIONS, LETTERS, MAX_GROUP_LEN, NUMERIC_INDICATOR, PUNCTUATION,
    TAB_CELLS, UNTRANSLATABLE, WORD_CONTRACTIONS,
};
use super::BrailleTranslator;
use crate::config::Grade;
use crate::error::BrailleError;
use futures::future::{BoxFuture, FutureExt};
use tracing::debug;

/// Translator backed by the built-in tables. Never performs I/O.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbeddedTranslator;

impl BrailleTranslator for EmbeddedTranslator {
    fn name(&self) -> &'static str {
        "embedded"
    }

    fn translate<'a>(
        &'a self,
        text: &'a str,
        grade: Grade,
    ) -> BoxFuture<'a, Result<String, BrailleError>> {
        futures::future::ready(translate_text(text, grade)).boxed()
    }
}

/// Translate `text` to Unicode Braille with the embedded tables.
///
/// Fails with [`BrailleError::TranslationContent`] when `text` holds no
/// printable characters.
pub fn translate_text(text: &str, grade: Grade) -> Result<String, BrailleError> {
    if text.trim().is_empty() {
        return Err(BrailleError::TranslationContent {
            engine: "embedded".into(),
            reason: "input text is empty".into(),
        });
    }

    let mut out = String::with_capacity(text.len() * 3);
    match grade {
        Grade::One => {
            for c in text.chars() {
                push_char(c, &mut out);
            }
        }
        Grade::Two => {
            for token in split_preserving_whitespace(text) {
                if token.starts_with(char::is_whitespace) {
                    out.push_str(token);
                } else {
                    push_word(token, &mut out);
                }
            }
        }
    }

    debug!(
        "Embedded {}: {} chars → {} cells",
        grade,
        text.chars().count(),
        out.chars().count()
    );
    Ok(out)
}

// ── Internal helpers ─────────────────────────────────────────────────────────

/// Single character, case-folded, no contractions.
fn push_char(c: char, out: &mut String) {
    match c {
        ' ' | '\n' => out.push(c),
        '\t' => out.push_str(TAB_CELLS),
        c if c.is_whitespace() => out.push(' '),
        _ => {
            let lower = c.to_ascii_lowercase();
            if let Some(cell) = LETTERS.get(&lower) {
                out.push(*cell);
            } else if let Some(cell) = DIGITS.get(&lower) {
                out.push(NUMERIC_INDICATOR);
                out.push(*cell);
            } else if let Some(cells) = PUNCTUATION.get(&lower) {
                out.push_str(cells);
            } else {
                out.push(UNTRANSLATABLE);
            }
        }
    }
}

fn push_word(word: &str, out: &mut String) {
    let lower = word.to_lowercase();
    if let Some(cells) = WORD_CONTRACTIONS.get(lower.as_str()) {
        out.push_str(cells);
        return;
    }

    // "and," or "(the" still take the whole-word sign.
    let core = lower.trim_matches(|c: char| !c.is_alphanumeric());
    if !core.is_empty() && core.len() < lower.len() {
        if let Some(cells) = WORD_CONTRACTIONS.get(core) {
            let start = lower.find(core).unwrap_or(0);
            lower[..start].chars().for_each(|c| push_char(c, out));
            out.push_str(cells);
            lower[start + core.len()..]
                .chars()
                .for_each(|c| push_char(c, out));
            return;
        }
    }

    scan_word(&lower, out);
}

/// Greedy left-to-right scan: longest group contraction, then one character.
fn scan_word(word: &str, out: &mut String) {
    let chars: Vec<char> = word.chars().collect();
    let mut i = 0;
    'outer: while i < chars.len() {
        for len in (2..=MAX_GROUP_LEN).rev() {
            if i + len > chars.len() {
                continue;
            }
            let group: String = chars[i..i + len].iter().collect();
            if let Some(cell) = GROUP_CONTRACTIONS.get(group.as_str()) {
                out.push(*cell);
                i += len;
                continue 'outer;
            }
        }
        push_char(chars[i], out);
        i += 1;
    }
}

/// Alternating runs of whitespace and non-whitespace, in order.
fn split_preserving_whitespace(text: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let mut start = 0;
    let mut in_space: Option<bool> = None;
    for (idx, c) in text.char_indices() {
        let space = c.is_whitespace();
        if in_space.is_some_and(|s| s != space) {
            tokens.push(&text[start..idx]);
            start = idx;
        }
        in_space = Some(space);
    }
    if start < text.len() {
        tokens.push(&text[start..]);
    }
    tokens
}

// ── Tests ────────────────────────────────────────────────────────────────────
