//! Text normalisation: deterministic noise removal on raw extracted text.
//!
//! Extractors (OCR, PDF text layers, web scrapes) hand us text full of
//! artefacts that make no sense on an embossed page: URLs, social handles,
//! running page numbers, copyright footers, decorative rules, smart quotes
//! and codepoints outside Latin-1 that the translator cannot map.
//!
//! Every rule is a pure `&str → String` pass with no failure mode, so
//! [`normalize`] cannot fail and never drops text that is not noise.
//!
//! ## Rule Order
//!
//! Line endings are normalised first so the multi-line rules see `\n` only.
//! Emails are removed before handles, otherwise `@host` would be stripped
//! out of the middle of an address and leave `user.com` behind. Typography
//! runs before the Latin-1 filter so bullets and curly quotes become ASCII
//! instead of spaces, and before the decorative-rule pass so `———` is caught.
//! Whitespace collapsing runs last.

use once_cell::sync::Lazy;
use regex::Regex;

/// Apply all normalisation rules to raw extracted text.
///
/// Rules (applied in order):
/// 1. Normalise line endings (CRLF/CR → LF)
/// 2. Strip invisible Unicode (zero-width spaces, BOM, soft hyphens)
/// 3. Remove URLs
/// 4. Remove email addresses
/// 5. Remove social handles and hashtags
/// 6. Remove page-number and copyright boilerplate
/// 7. Normalise typography (bullets, quotes, dashes, ellipsis)
/// 8. Remove decorative symbol runs (`===`, `---`, `___`, `***`)
/// 9. Replace codepoints outside Latin-1 with a space
/// 10. Tidy punctuation spacing
/// 11. Turn sentence-ending line breaks into paragraph breaks
/// 12. Collapse whitespace and blank lines, trim every line
///
/// `normalize("")` returns `""`.
pub fn normalize(input: &str) -> String {
    let s = normalise_line_endings(input);
    let s = remove_invisible_chars(&s);
    let s = remove_urls(&s);
    let s = remove_emails(&s);
    let s = remove_handles(&s);
    let s = remove_boilerplate(&s);
    let s = normalise_typography(&s);
    let s = remove_decorative_runs(&s);
    let s = replace_non_latin1(&s);
    let s = tidy_punctuation(&s);
    let s = break_after_sentences(&s);
    collapse_whitespace(&s)
}

/// Strip an outer Markdown code fence that chat models sometimes wrap
/// their reply in.
pub fn strip_code_fences(input: &str) -> String {
    if let Some(caps) = RE_OUTER_FENCES.captures(input.trim()) {
        caps[1].to_string()
    } else {
        input.to_string()
    }
}

static RE_OUTER_FENCES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)^```[A-Za-z]*\n(.*)\n```\s*$").unwrap());

// ── Rule 1: Normalise line endings ───────────────────────────────────────────

fn normalise_line_endings(input: &str) -> String {
    input.replace("\r\n", "\n").replace('\r', "\n")
}

// ── Rule 2: Remove invisible Unicode characters ─────────────────────────────

fn remove_invisible_chars(input: &str) -> String {
    input.replace(
        [
            '\u{200B}', '\u{FEFF}', '\u{00AD}', '\u{200C}', '\u{200D}', '\u{2060}',
        ],
        "",
    )
}

// ── Rule 3: Remove URLs ──────────────────────────────────────────────────────

static RE_URL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(?:https?://|www\.)\S+").unwrap());

fn remove_urls(input: &str) -> String {
    RE_URL.replace_all(input, "").to_string()
}

// ── Rule 4: Remove email addresses ──────────────────────────────────────────

static RE_EMAIL: Lazy<Regex> = Lazy::new(|| Regex::new(r"\S+@\S+\.\S+").unwrap());

fn remove_emails(input: &str) -> String {
    RE_EMAIL.replace_all(input, "").to_string()
}

// ── Rule 5: Remove handles and hashtags ─────────────────────────────────────
//
// Only at a word start: `C#` and `a@b` style fragments are left alone.

static RE_HANDLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)(^|[ \t])[@#][A-Za-z_][A-Za-z0-9_]*").unwrap());

fn remove_handles(input: &str) -> String {
    RE_HANDLE.replace_all(input, "$1").to_string()
}

// ── Rule 6: Remove boilerplate ──────────────────────────────────────────────

static RE_PAGE_LABEL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bpage\s+\d+(?:\s*of\s*\d+)?").unwrap());

static RE_NUMBER_LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^[ \t]*\d+[ \t]*$").unwrap());

static RE_COPYRIGHT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?im)(?:©|\bcopyright\b|\ball rights reserved\b).*$").unwrap());

fn remove_boilerplate(input: &str) -> String {
    let s = RE_PAGE_LABEL.replace_all(input, "");
    let s = RE_NUMBER_LINE.replace_all(&s, "");
    RE_COPYRIGHT.replace_all(&s, "").to_string()
}

// ── Rule 7: Normalise typography ────────────────────────────────────────────

static RE_BULLET: Lazy<Regex> = Lazy::new(|| Regex::new(r"[•·∙◦▪●‣⁃]").unwrap());

fn normalise_typography(input: &str) -> String {
    let s = RE_BULLET.replace_all(input, "-");
    s.replace(['\u{201C}', '\u{201D}', '\u{201E}', '\u{00AB}', '\u{00BB}'], "\"")
        .replace(['\u{2018}', '\u{2019}', '\u{201A}', '\u{2032}'], "'")
        .replace('\u{2026}', "...")
        .replace(['\u{2013}', '\u{2014}', '\u{2012}', '\u{2212}'], "-")
        .replace('\u{00A0}', " ")
}

// ── Rule 8: Remove decorative symbol runs ───────────────────────────────────

static RE_DECORATIVE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"={3,}|-{3,}|_{3,}|\*{3,}|~{3,}").unwrap());

fn remove_decorative_runs(input: &str) -> String {
    RE_DECORATIVE.replace_all(input, "").to_string()
}

// ── Rule 9: Replace non-Latin-1 codepoints ──────────────────────────────────
//
// Replaced with a space, not deleted, so adjacent words stay separate.

fn replace_non_latin1(input: &str) -> String {
    input
        .chars()
        .map(|c| if (c as u32) > 0xFF { ' ' } else { c })
        .collect()
}

// ── Rule 10: Tidy punctuation spacing ───────────────────────────────────────
//
// Missing spaces are only restored between a lowercase word and a capital,
// which leaves decimals, abbreviations and times intact.

static RE_SPACE_BEFORE_PUNCT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[ \t]+([,.!?;:])").unwrap());

static RE_MISSING_SPACE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([a-z]{2}[,.!?;:])([A-Z])").unwrap());

fn tidy_punctuation(input: &str) -> String {
    let s = RE_SPACE_BEFORE_PUNCT.replace_all(input, "$1");
    RE_MISSING_SPACE.replace_all(&s, "$1 $2").to_string()
}

// ── Rule 11: Paragraph break after sentences ────────────────────────────────

static RE_SENTENCE_BREAK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([.!?])[ \t]*\n").unwrap());

fn break_after_sentences(input: &str) -> String {
    RE_SENTENCE_BREAK.replace_all(input, "$1\n\n").to_string()
}

// ── Rule 12: Collapse whitespace ────────────────────────────────────────────

static RE_INLINE_SPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[ \t]+").unwrap());
static RE_BLANK_LINES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").unwrap());

fn collapse_whitespace(input: &str) -> String {
    let s = RE_INLINE_SPACE.replace_all(input, " ");
    let s = s.lines().map(str::trim).collect::<Vec<_>>().join("\n");
    RE_BLANK_LINES.replace_all(&s, "\n\n").trim().to_string()
}

// ── Tests ────────────────────────────────────────────────────────────────────
