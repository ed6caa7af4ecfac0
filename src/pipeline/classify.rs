//! Line classification: title, list item or paragraph line.
//!
//! Pure pattern matching with no wrapping logic, so every heuristic can be
//! tested in isolation. The formatter calls [`classify_line`] once per
//! physical line.

use once_cell::sync::Lazy;
use regex::Regex;

/// Titles at or above this many characters are treated as prose.
pub const MAX_TITLE_CHARS: usize = 60;

/// What a single source line is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineKind {
    /// A heading: rendered upper-cased between blank lines.
    Title,
    /// A list entry. `marker` is `"- "` for bullets or the ordinal verbatim
    /// (e.g. `"2) "`); `body` is the text after the marker.
    ListItem { marker: String, body: String },
    /// Anything else.
    Paragraph,
}

/// Layout facts about a line that cannot be read from the line itself.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LineContext {
    /// The line is a paragraph of its own: blank line (or document edge)
    /// before and after, and the document has other paragraphs.
    pub isolated: bool,
}

/// Classify one line of normalised text.
pub fn classify_line(line: &str, ctx: LineContext) -> LineKind {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return LineKind::Paragraph;
    }

    if let Some(body) = bullet_body(trimmed) {
        return LineKind::ListItem {
            marker: "- ".to_string(),
            body: body.to_string(),
        };
    }

    if let Some(caps) = RE_ORDINAL.captures(trimmed) {
        // "1. Introduction" standing alone is a numbered heading, not a list.
        if ctx.isolated && is_title_like(trimmed) {
            return LineKind::Title;
        }
        return LineKind::ListItem {
            marker: format!("{} ", &caps[1]),
            body: caps[2].trim().to_string(),
        };
    }

    if is_title(trimmed, ctx) {
        LineKind::Title
    } else {
        LineKind::Paragraph
    }
}

/// `true` when a non-list line reads as a heading.
pub fn is_title(line: &str, ctx: LineContext) -> bool {
    if !is_title_like(line) {
        return false;
    }
    is_all_caps(line)
        || is_title_case(line)
        || RE_KEYWORD.is_match(line)
        || RE_NUMBERED.is_match(line)
        || RE_ROMAN.is_match(line)
        || ctx.isolated
}

// ── Internal helpers ─────────────────────────────────────────────────────────

const BULLETS: [char; 5] = ['-', '*', '•', '‣', '⁃'];

static RE_ORDINAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{1,3}[.)]|[A-Za-z][.)])\s+(\S.*)$").unwrap());

static RE_KEYWORD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^(chapter|section|part|introduction|conclusion|abstract|summary|contents|preface|appendix|references|bibliography|glossary|index|acknowledg(e)?ments)\b",
    )
    .unwrap()
});

static RE_NUMBERED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d+(?:\.\d+)*\.?\s+[A-Z]").unwrap());

static RE_ROMAN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[IVXLC]+\.\s+\w").unwrap());

const SMALL_WORDS: [&str; 14] = [
    "a", "an", "the", "and", "or", "nor", "of", "in", "on", "to", "for", "with", "at", "by",
];

fn bullet_body(line: &str) -> Option<&str> {
    let mut chars = line.chars();
    let first = chars.next()?;
    if !BULLETS.contains(&first) {
        return None;
    }
    let rest = chars.as_str();
    // "-5 degrees" and "*emphasis*" are not bullets.
    if !rest.starts_with([' ', '\t']) {
        return None;
    }
    let body = rest.trim();
    if body.is_empty() {
        None
    } else {
        Some(body)
    }
}

/// Short, has letters, and does not end like a sentence.
fn is_title_like(line: &str) -> bool {
    line.chars().count() < MAX_TITLE_CHARS
        && !line.ends_with(['.', '!', '?'])
        && line.chars().any(char::is_alphabetic)
}

fn is_all_caps(line: &str) -> bool {
    let letters: Vec<char> = line.chars().filter(|c| c.is_alphabetic()).collect();
    letters.len() >= 2 && letters.iter().all(|c| c.is_uppercase())
}

/// Every word capitalised except short function words; at least two words.
fn is_title_case(line: &str) -> bool {
    let words: Vec<&str> = line.split_whitespace().collect();
    if words.len() < 2 {
        return false;
    }
    words.iter().enumerate().all(|(i, word)| {
        let Some(first) = word.chars().find(|c| c.is_alphabetic()) else {
            return true;
        };
        if first.is_uppercase() {
            return true;
        }
        let bare = word.trim_matches(|c: char| !c.is_alphanumeric());
        i > 0 && SMALL_WORDS.contains(&bare)
    })
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    const PLAIN: LineContext = LineContext { isolated: false };
    const ALONE: LineContext = LineContext { isolated: true };

    #[test]
    fn test_all_caps_title() {
        assert_eq!(classify_line("INTRODUCTION TO BRAILLE", PLAIN), LineKind::Title);
    }

    #[test]
    fn test_title_case_title() {
        assert_eq!(classify_line("The History of Embossing", PLAIN), LineKind::Title);
        assert_eq!(classify_line("The history of embossing", PLAIN), LineKind::Paragraph);
    }

    #[test]
    fn test_keyword_title() {
        assert_eq!(classify_line("chapter one: the start", PLAIN), LineKind::Title);
        assert_eq!(classify_line("Summary", PLAIN), LineKind::Title);
    }

    #[test]
    fn test_numbered_and_roman_headings() {
        assert_eq!(classify_line("1.2 Background", PLAIN), LineKind::Title);
        assert_eq!(classify_line("IV. Results", PLAIN), LineKind::Title);
    }

    #[test]
    fn test_sentence_is_never_title() {
        assert_eq!(classify_line("THIS ENDS WITH A STOP.", ALONE), LineKind::Paragraph);
        assert_eq!(classify_line("Is This A Question?", PLAIN), LineKind::Paragraph);
    }

    #[test]
    fn test_long_line_is_never_title() {
        let long = "A Very Long Heading That Goes On And On Past The Sixty Char Limit";
        assert!(long.len() >= MAX_TITLE_CHARS);
        assert_eq!(classify_line(long, ALONE), LineKind::Paragraph);
    }

    #[test]
    fn test_isolated_short_line_is_title() {
        assert_eq!(classify_line("getting started", ALONE), LineKind::Title);
        assert_eq!(classify_line("getting started", PLAIN), LineKind::Paragraph);
    }

    #[test]
    fn test_bullets_normalised() {
        for line in ["- milk", "* milk", "• milk", "‣ milk", "⁃ milk"] {
            assert_eq!(
                classify_line(line, PLAIN),
                LineKind::ListItem {
                    marker: "- ".into(),
                    body: "milk".into()
                },
                "line: {line}"
            );
        }
    }

    #[test]
    fn test_not_a_bullet() {
        assert_eq!(classify_line("-5 degrees outside", PLAIN), LineKind::Paragraph);
        assert_eq!(classify_line("-", PLAIN), LineKind::Paragraph);
    }

    #[test]
    fn test_ordinal_kept_verbatim() {
        assert_eq!(
            classify_line("2) buy bread", PLAIN),
            LineKind::ListItem {
                marker: "2) ".into(),
                body: "buy bread".into()
            }
        );
        assert_eq!(
            classify_line("b. second choice", PLAIN),
            LineKind::ListItem {
                marker: "b. ".into(),
                body: "second choice".into()
            }
        );
    }

    #[test]
    fn test_isolated_numbered_line_is_heading() {
        assert_eq!(classify_line("1. Introduction", ALONE), LineKind::Title);
        assert!(matches!(
            classify_line("1. Introduction", PLAIN),
            LineKind::ListItem { .. }
        ));
    }
}
