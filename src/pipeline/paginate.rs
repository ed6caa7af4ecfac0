//! Pagination of a Braille cell stream into fixed-size pages.
//!
//! Pages are filled line by line. A page is closed as soon as the next line
//! would exceed either the line ceiling or the character ceiling, whichever
//! is hit first. The two ceilings disagree on pages of many short lines
//! (line ceiling wins) and pages of few long lines (character ceiling wins).
//!
//! A line longer than `chars_per_line` is tolerated and budgeted as
//! `ceil(len / chars_per_line)` visual lines. An empty line still occupies
//! one visual line. With that rounding the character ceiling only binds on a
//! page where the line ceiling binds too.

use crate::config::PageLayout;
use serde::{Deserialize, Serialize};

/// One embossed page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    /// 1-based, contiguous.
    pub page_number: usize,
    pub lines: Vec<String>,
    /// Cells on the page, newlines excluded.
    pub char_count: usize,
    /// Visual lines the page occupies.
    pub line_count: usize,
}

impl Page {
    /// The page's lines joined with `\n`.
    pub fn content(&self) -> String {
        self.lines.join("\n")
    }

    /// The page as it is embossed: lines longer than `chars_per_line` are
    /// split into the visual lines [`paginate`] counted for them.
    pub fn wrapped_content(&self, chars_per_line: usize) -> String {
        let width = chars_per_line.max(1);
        let mut visual: Vec<String> = Vec::with_capacity(self.line_count);
        for line in &self.lines {
            let cells: Vec<char> = line.chars().collect();
            if cells.is_empty() {
                visual.push(String::new());
                continue;
            }
            visual.extend(cells.chunks(width).map(|chunk| chunk.iter().collect::<String>()));
        }
        visual.join("\n")
    }
}

/// A full pagination of one Braille text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub total_pages: usize,
    /// Cells in the whole text, newlines excluded.
    pub total_characters: usize,
    /// Number of `\n`-separated source lines.
    pub total_lines: usize,
    pub chars_per_page: usize,
    pub lines_per_page: usize,
    pub chars_per_line: usize,
    pub pages: Vec<Page>,
}

impl Pagination {
    /// Page `page_number` (1-based), or `None` when out of range.
    pub fn page(&self, page_number: usize) -> Option<&Page> {
        page_number
            .checked_sub(1)
            .and_then(|idx| self.pages.get(idx))
    }

    /// The pagination of an empty text: zero pages.
    pub fn empty(layout: PageLayout) -> Self {
        Self {
            total_pages: 0,
            total_characters: 0,
            total_lines: 0,
            chars_per_page: layout.chars_per_page(),
            lines_per_page: layout.lines_per_page(),
            chars_per_line: layout.chars_per_line(),
            pages: Vec::new(),
        }
    }
}

/// Split `braille_text` into pages of `layout` geometry.
///
/// Empty text yields zero pages, not one page holding an empty line.
/// Pure: identical input always yields an identical [`Pagination`].
pub fn paginate(braille_text: &str, layout: PageLayout) -> Pagination {
    if braille_text.is_empty() {
        return Pagination::empty(layout);
    }

    let chars_per_line = layout.chars_per_line();
    let lines_per_page = layout.lines_per_page();
    let chars_per_page = layout.chars_per_page();

    let mut pages: Vec<Page> = Vec::new();
    let mut current: Vec<String> = Vec::new();
    let mut current_chars = 0usize;
    let mut current_lines = 0usize;
    let mut total_characters = 0usize;
    let mut total_lines = 0usize;

    for line in braille_text.split('\n') {
        let len = line.chars().count();
        let needed = if len == 0 {
            1
        } else {
            len.div_ceil(chars_per_line)
        };
        total_characters += len;
        total_lines += 1;

        let fits = current_lines + needed <= lines_per_page
            && current_chars + len <= chars_per_page;
        if !fits && !current.is_empty() {
            pages.push(Page {
                page_number: pages.len() + 1,
                lines: std::mem::take(&mut current),
                char_count: current_chars,
                line_count: current_lines,
            });
            current_chars = 0;
            current_lines = 0;
        }
        current.push(line.to_string());
        current_chars += len;
        current_lines += needed;
    }

    if !current.is_empty() {
        pages.push(Page {
            page_number: pages.len() + 1,
            lines: current,
            char_count: current_chars,
            line_count: current_lines,
        });
    }

    Pagination {
        total_pages: pages.len(),
        total_characters,
        total_lines,
        chars_per_page,
        lines_per_page,
        chars_per_line,
        pages,
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn layout(cols: usize, rows: usize) -> PageLayout {
        PageLayout::new(cols, rows).unwrap()
    }

    fn assert_contiguous(p: &Pagination) {
        let numbers: Vec<usize> = p.pages.iter().map(|pg| pg.page_number).collect();
        let expected: Vec<usize> = (1..=p.total_pages).collect();
        assert_eq!(numbers, expected);
        let visual: usize = p.pages.iter().map(|pg| pg.line_count).sum();
        assert!(visual >= p.total_lines);
    }

    #[test]
    fn test_empty_text_has_no_pages() {
        let p = paginate("", PageLayout::default());
        assert_eq!(p.total_pages, 0);
        assert!(p.pages.is_empty());
        assert_eq!(p.chars_per_line, 40);
        assert!(p.page(1).is_none());
    }

    #[test]
    fn test_single_page() {
        let p = paginate("⠁⠃\n\n⠉", PageLayout::default());
        assert_eq!(p.total_pages, 1);
        assert_eq!(p.total_characters, 3);
        assert_eq!(p.total_lines, 3);
        assert_eq!(p.pages[0].line_count, 3);
        assert_eq!(p.page(1).unwrap().content(), "⠁⠃\n\n⠉");
    }

    #[test]
    fn test_line_ceiling_closes_page() {
        let text = vec!["⠁"; 7].join("\n");
        let p = paginate(&text, layout(40, 3));
        assert_eq!(p.total_pages, 3);
        assert_eq!(p.pages[0].lines.len(), 3);
        assert_eq!(p.pages[2].lines.len(), 1);
        assert_contiguous(&p);
    }

    #[test]
    fn test_full_page_closes() {
        // 4×4 layout: the fifth line opens page 2.
        let text = ["⠁⠁⠁⠁", "⠁⠁⠁⠁", "⠁⠁⠁⠁", "⠁⠁⠁⠁", "⠁"].join("\n");
        let p = paginate(&text, layout(4, 4));
        assert_eq!(p.total_pages, 2);
        assert_eq!(p.pages[0].char_count, 16);
        assert_eq!(p.pages[1].char_count, 1);
    }

    #[test]
    fn test_overlong_line_counts_multiple_visual_lines() {
        let long = "⠁".repeat(90);
        let p = paginate(&long, PageLayout::default());
        assert_eq!(p.total_pages, 1);
        assert_eq!(p.pages[0].line_count, 3);
        assert_contiguous(&p);
    }

    #[test]
    fn test_wrapped_content_matches_line_count() {
        let text = format!("{}\n\n⠃", "⠁".repeat(90));
        let p = paginate(&text, PageLayout::default());
        let wrapped = p.pages[0].wrapped_content(40);
        let lines: Vec<&str> = wrapped.split('\n').collect();
        assert_eq!(lines.len(), p.pages[0].line_count);
        assert_eq!(
            lines.iter().map(|l| l.chars().count()).collect::<Vec<_>>(),
            vec![40, 40, 10, 0, 1]
        );
    }

    #[test]
    fn test_overlong_line_on_fresh_page() {
        // A single line larger than a page still lands somewhere.
        let long = "⠁".repeat(50);
        let p = paginate(&format!("⠃\n{long}"), layout(10, 2));
        assert_eq!(p.total_pages, 2);
        assert_eq!(p.pages[1].lines[0], long);
        assert_contiguous(&p);
    }

    #[test]
    fn test_idempotent() {
        let text = (0..200).map(|i| "⠁".repeat(i % 45)).collect::<Vec<_>>().join("\n");
        let a = paginate(&text, PageLayout::default());
        let b = paginate(&text, PageLayout::default());
        assert_eq!(a, b);
        assert_contiguous(&a);
    }
}
