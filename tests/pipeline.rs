//! End-to-end tests for the text → Braille → G-code pipeline.
//!
//! Everything here runs offline with the embedded translator. The remote
//! translation service is covered in `tests/remote.rs`.

use braille_emboss::gcode::{emit, Dots, Instruction};
use braille_emboss::pipeline::format::format_text;
use braille_emboss::pipeline::normalize::normalize;
use braille_emboss::pipeline::paginate::paginate;
use braille_emboss::pipeline::validate::enforce_line_budget;
use braille_emboss::translate::translate_text;
use braille_emboss::{
    convert, convert_batch, convert_extracted, convert_to_file, gcode_for_page, gcode_for_pages, CleanupError,
    ConversionConfig, ConversionProgressCallback, ExtractedText, GcodeOverrides, Grade, PageLayout, ParagraphJoin,
    PrinterSettings, TextCleaner,
};
use futures::future::{BoxFuture, FutureExt};
use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

// ── Test helpers ─────────────────────────────────────────────────────────────

fn is_braille_output(s: &str) -> bool {
    s.chars()
        .all(|c| c == ' ' || c == '\n' || ('\u{2800}'..='\u{28FF}').contains(&c))
}

fn raised_dots(braille: &str) -> usize {
    braille.chars().filter_map(Dots::from_char).map(Dots::count).sum()
}

fn long_paragraph() -> (String, Vec<String>) {
    let pool = ["braille", "readers", "feel", "raised", "dots", "on", "thick", "paper", "quickly"];
    let mut words = Vec::new();
    let mut len = 0;
    let mut i = 0;
    while len < 1200 {
        let w = pool[i % pool.len()].to_string();
        len += w.len() + 1;
        words.push(w);
        i += 1;
    }
    (words.join(" "), words)
}

struct FailingCleaner;

impl TextCleaner for FailingCleaner {
    fn clean<'a>(&'a self, _text: &'a str, _document_type: &'a str) -> BoxFuture<'a, Result<String, CleanupError>> {
        async { Err(CleanupError::Timeout { chunk: 0, secs: 30 }) }.boxed()
    }
}

struct ReplacingCleaner(&'static str);

impl TextCleaner for ReplacingCleaner {
    fn clean<'a>(&'a self, _text: &'a str, _document_type: &'a str) -> BoxFuture<'a, Result<String, CleanupError>> {
        let out = self.0.to_string();
        async move { Ok(out) }.boxed()
    }
}

// ── Scenarios ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_sentence_converts_to_one_page() {
    let output = convert(
        "Hello world! This is a test of the Braille system.",
        &ConversionConfig::default(),
    )
    .await
    .unwrap();

    assert!(is_braille_output(&output.braille_text), "got: {:?}", output.braille_text);
    assert!(!output.braille_text.trim().is_empty());
    assert_eq!(output.pagination.total_pages, 1);
    assert_eq!(output.pagination.chars_per_line, 40);
    assert_eq!(output.grade, Grade::Two);
    assert_eq!(output.stats.translator_used, "embedded");
    assert!(!output.stats.fell_back);
}

#[test]
fn test_long_paragraph_wraps_without_losing_words() {
    let (text, words) = long_paragraph();
    let formatted = format_text(&text, 40, ParagraphJoin::ShortLines).unwrap();
    let report = enforce_line_budget(&formatted, 40);

    assert!(report.text.lines().count() > 1);
    for line in report.text.lines() {
        assert!(line.chars().count() <= 40, "line too long: {line:?}");
    }
    let rejoined: Vec<&str> = report.text.split_whitespace().collect();
    assert_eq!(rejoined, words);
}

#[test]
fn test_list_item_hanging_indent() {
    let input = "- first item\n- a very long second item that needs wrapping across multiple lines because it exceeds forty characters";
    let formatted = format_text(input, 40, ParagraphJoin::ShortLines).unwrap();
    let lines: Vec<&str> = formatted.lines().collect();

    assert_eq!(lines[0], "- first item");
    let start = lines
        .iter()
        .position(|l| l.starts_with("- a very long"))
        .unwrap();
    let continuation: Vec<&str> = lines[start + 1..]
        .iter()
        .take_while(|l| !l.is_empty() && !l.starts_with("- "))
        .copied()
        .collect();

    assert!(!continuation.is_empty());
    for line in continuation {
        assert!(line.starts_with("  "), "got: {line:?}");
        assert!(!line.starts_with("   "), "got: {line:?}");
        assert!(line.chars().count() <= 40);
    }
}

#[test]
fn test_gcode_single_cell_presses_two_dots() {
    let program = emit("\u{2803}", &PrinterSettings::default()).unwrap();

    let mut pressed_at = Vec::new();
    let mut position = None;
    for instruction in &program.instructions {
        match instruction {
            Instruction::Travel { x, y } => position = Some((*x, *y)),
            Instruction::Press { .. } => pressed_at.push(position.unwrap()),
            _ => {}
        }
    }
    assert_eq!(pressed_at.len(), 2);
    // dots 1 and 2 share a column and sit on different rows
    assert_eq!(pressed_at[0].0, pressed_at[1].0);
    assert_ne!(pressed_at[0].1, pressed_at[1].1);

    let lifts = program
        .instructions
        .iter()
        .filter(|i| matches!(i, Instruction::Lift { .. }))
        .count();
    // initial lift + one per dot + final lift
    assert_eq!(lifts, 4);
}

// ── Properties ───────────────────────────────────────────────────────────────

#[test]
fn test_pagination_numbers_are_contiguous() {
    let (text, _) = long_paragraph();
    let repeated = vec![text.as_str(); 8].join("\n\n");
    let formatted = enforce_line_budget(&format_text(&repeated, 40, ParagraphJoin::ShortLines).unwrap(), 40).text;
    let braille = translate_text(&formatted, Grade::One).unwrap();

    let layout = PageLayout::default();
    let pagination = paginate(&braille, layout);
    assert!(pagination.total_pages > 1);

    let numbers: Vec<usize> = pagination.pages.iter().map(|p| p.page_number).collect();
    assert_eq!(numbers, (1..=pagination.total_pages).collect::<Vec<_>>());
    let lines: usize = pagination.pages.iter().map(|p| p.line_count).sum();
    assert!(lines >= pagination.total_lines);
    for page in &pagination.pages {
        assert!(page.line_count <= layout.lines_per_page());
    }

    assert_eq!(paginate(&braille, layout), pagination);
}

#[test]
fn test_contraction_precedence() {
    assert_eq!(translate_text("and", Grade::Two).unwrap(), "\u{282F}");
    let handy = translate_text("handy", Grade::Two).unwrap();
    assert!(!handy.contains('\u{282F}'), "got: {handy}");
    assert_eq!(handy.chars().count(), 5);
}

#[test]
fn test_normalize_fails_open() {
    assert_eq!(normalize(""), "");
    let garbage = String::from_utf8_lossy(&[0xFF, 0x00, 0xC3, 0x28, 0x1B, b'[', b'0', b'm', 0xE2, 0x82]).to_string();
    let _ = normalize(&garbage);
}

// ── Orchestration ────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_noise_only_input_is_zero_pages() {
    let output = convert("https://example.com\n\nPage 3 of 9\n\n=====", &ConversionConfig::default())
        .await
        .unwrap();
    assert_eq!(output.pagination.total_pages, 0);
    assert!(output.braille_text.is_empty());
}

#[tokio::test]
async fn test_failing_cleaner_falls_back_to_normalized_text() {
    let config = ConversionConfig::builder()
        .cleaner(Arc::new(FailingCleaner))
        .build()
        .unwrap();
    let output = convert("The cat sat on the mat.", &config).await.unwrap();

    assert!(!output.stats.cleanup_applied);
    assert!(matches!(output.stats.cleanup_error, Some(CleanupError::Timeout { .. })));
    assert!(output.formatted_text.contains("The cat sat on the mat."));
    assert_eq!(output.pagination.total_pages, 1);
}

#[tokio::test]
async fn test_cleaner_output_is_formatted() {
    let config = ConversionConfig::builder()
        .cleaner(Arc::new(ReplacingCleaner("Cleaned paragraph text.")))
        .build()
        .unwrap();
    let output = convert("cleaned   paragraph\ntext .", &config).await.unwrap();

    assert!(output.stats.cleanup_applied);
    assert!(output.stats.cleanup_error.is_none());
    assert!(output.formatted_text.contains("Cleaned paragraph text."));
}

#[tokio::test]
async fn test_grade_one_differs_from_grade_two() {
    let text = "The children and the mother went for a walk.";
    let g1 = convert(text, &ConversionConfig::builder().grade(Grade::One).build().unwrap())
        .await
        .unwrap();
    let g2 = convert(text, &ConversionConfig::default()).await.unwrap();
    assert!(g2.stats.braille_cells < g1.stats.braille_cells);
}

#[tokio::test]
async fn test_low_confidence_input_still_converts() {
    let extracted = ExtractedText::new("Blurry scan text.").with_confidence(31.0).with_page_count(1);
    let output = convert_extracted(&extracted, &ConversionConfig::default()).await.unwrap();
    assert_eq!(output.stats.source_confidence, Some(31.0));
    assert_eq!(output.stats.source_pages, Some(1));
    assert_eq!(output.pagination.total_pages, 1);
}

#[tokio::test]
async fn test_convert_to_file_writes_braille() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in.txt");
    std::fs::write(&input, "Hello there.").unwrap();
    let out = dir.path().join("out/in.brl");

    let stats = convert_to_file(input.to_str().unwrap(), &out, &ConversionConfig::default())
        .await
        .unwrap();
    let written = std::fs::read_to_string(&out).unwrap();
    assert!(is_braille_output(&written));
    assert_eq!(stats.braille_cells, written.chars().filter(|c| !c.is_whitespace()).count());
}

#[derive(Default)]
struct Counting {
    complete: AtomicUsize,
    errors: AtomicUsize,
    successes: AtomicUsize,
}

impl ConversionProgressCallback for Counting {
    fn on_document_complete(&self, _index: usize, _total: usize, _pages: usize) {
        self.complete.fetch_add(1, Ordering::SeqCst);
    }
    fn on_document_error(&self, _index: usize, _total: usize, _error: &str) {
        self.errors.fetch_add(1, Ordering::SeqCst);
    }
    fn on_batch_complete(&self, _total: usize, success_count: usize) {
        self.successes.store(success_count, Ordering::SeqCst);
    }
}

#[tokio::test]
async fn test_batch_keeps_input_order() {
    let mut a = tempfile::NamedTempFile::new().unwrap();
    write!(a, "First document.").unwrap();
    let mut b = tempfile::NamedTempFile::new().unwrap();
    write!(b, "Second document.").unwrap();

    let inputs = vec![
        a.path().to_str().unwrap().to_string(),
        "/definitely/not/here.txt".to_string(),
        b.path().to_str().unwrap().to_string(),
    ];
    let counter = Arc::new(Counting::default());
    let config = ConversionConfig::builder()
        .concurrency(3)
        .progress_callback(counter.clone())
        .build()
        .unwrap();

    let items = convert_batch(&inputs, &config).await;
    assert_eq!(items.len(), 3);
    for (item, input) in items.iter().zip(&inputs) {
        assert_eq!(&item.input, input);
    }
    assert!(items[0].result.is_ok());
    assert!(items[1].result.is_err());
    assert!(items[2].result.is_ok());
    assert_eq!(counter.complete.load(Ordering::SeqCst), 2);
    assert_eq!(counter.errors.load(Ordering::SeqCst), 1);
    assert_eq!(counter.successes.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_gcode_for_every_page() {
    let (text, _) = long_paragraph();
    let config = ConversionConfig::builder()
        .page_layout(PageLayout::new(40, 5).unwrap())
        .build()
        .unwrap();
    let output = convert(&text, &config).await.unwrap();
    assert!(output.pagination.total_pages > 1);

    let programs = gcode_for_pages(&output.pagination, &PrinterSettings::default(), &GcodeOverrides::default())
        .unwrap();
    assert_eq!(programs.len(), output.pagination.total_pages);
    for (page, program) in output.pagination.pages.iter().zip(&programs) {
        assert_eq!(program.truncated_lines, 0, "page {} truncated", page.page_number);
        assert_eq!(program.dropped_lines, 0, "page {} dropped lines", page.page_number);
        assert_eq!(
            program.press_count(),
            raised_dots(&page.content()),
            "page {} pressed the wrong number of dots",
            page.page_number
        );
    }
}

#[test]
fn test_full_default_page_embosses_completely() {
    let full_cell = '\u{283F}';
    let line: String = std::iter::repeat(full_cell).take(40).collect();
    let text = vec![line; 25].join("\n");

    let pagination = paginate(&text, PageLayout::default());
    assert_eq!(pagination.total_pages, 1);

    let program = gcode_for_page(&pagination, 1, &PrinterSettings::default(), &GcodeOverrides::default()).unwrap();
    assert_eq!(program.truncated_lines, 0);
    assert_eq!(program.dropped_lines, 0);
    assert_eq!(program.press_count(), 25 * 40 * 6);
}

#[tokio::test]
async fn test_gcode_overrides_apply_and_reject() {
    let output = convert("Dots.", &ConversionConfig::default()).await.unwrap();

    let overrides = GcodeOverrides::parse_query("?feed_rate=3000&head_down_z=-1.5&colour=red").unwrap();
    let program = gcode_for_page(&output.pagination, 1, &PrinterSettings::default(), &overrides).unwrap();
    let gcode = program.to_gcode();
    assert!(gcode.contains("G1 F3000.00"));
    assert!(gcode.contains("G1 Z-1.50"));

    assert!(GcodeOverrides::parse_query("feed_rate=fast").is_err());

    let inverted = GcodeOverrides::parse_query("head_down_z=20").unwrap();
    let err = gcode_for_page(&output.pagination, 1, &PrinterSettings::default(), &inverted).unwrap_err();
    assert_eq!(err.stage().to_string(), "gcode generation");
}
