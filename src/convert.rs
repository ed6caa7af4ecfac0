//! Conversion entry points: text in, paginated Braille (and G-code) out.
//!
//! ```text
//! normalize ──▶ [cleanup] ──▶ format ──▶ validate ──▶ translate ──▶ paginate
//! ```
//!
//! Normalisation and formatting never abort a conversion. Translation is
//! the only stage of [`convert`] that can fail, and G-code emission is a
//! separate call ([`gcode_for_page`], [`gcode_for_pages`]) on the result.

use crate::config::ConversionConfig;
use crate::error::BrailleError;
use crate::gcode::{self, GcodeOverrides, GcodeProgram, PrinterSettings};
use crate::output::{BatchItem, ConversionOutput, ConversionStats, ExtractedText};
use crate::pipeline::paginate::{paginate, Pagination};
use crate::pipeline::{format, input, normalize, validate};
use crate::translate::{translator_for, BrailleTranslator, EmbeddedTranslator};
use futures::stream::{self, StreamExt};
use std::io::Write;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Convert raw extracted text to paginated Braille.
///
/// This is the primary entry point for the library.
///
/// # Errors
/// Only translation failures are returned:
/// [`BrailleError::TranslationUnavailable`] when the configured engine
/// cannot be used (and `fallback_to_embedded` is off), and
/// [`BrailleError::TranslationContent`] when it produced nothing usable.
/// Empty or all-noise input is not an error; it yields zero pages.
pub async fn convert(raw_text: &str, config: &ConversionConfig) -> Result<ConversionOutput, BrailleError> {
    convert_extracted(&ExtractedText::new(raw_text), config).await
}

/// Like [`convert`], for text that comes with extractor metadata.
pub async fn convert_extracted(
    extracted: &ExtractedText,
    config: &ConversionConfig,
) -> Result<ConversionOutput, BrailleError> {
    let total_start = Instant::now();
    let mut stats = ConversionStats {
        input_chars: extracted.text.chars().count(),
        source_confidence: extracted.confidence,
        source_pages: extracted.page_count,
        ..ConversionStats::default()
    };
    info!(
        "Starting conversion: {} chars, {}",
        stats.input_chars, config.grade
    );
    if extracted.is_low_confidence() {
        warn!(
            "Extractor confidence {:.0} is below {:.0}; expect recognition errors",
            extracted.confidence.unwrap_or_default(),
            crate::output::LOW_CONFIDENCE
        );
    }

    // ── Step 1: Normalise ────────────────────────────────────────────────
    let step = Instant::now();
    let normalized = normalize::normalize(&extracted.text);
    stats.normalize_ms = step.elapsed().as_millis() as u64;
    debug!("Normalised to {} chars", normalized.chars().count());

    if normalized.is_empty() {
        info!("Nothing to convert after normalisation");
        stats.total_ms = total_start.elapsed().as_millis() as u64;
        return Ok(ConversionOutput {
            braille_text: String::new(),
            formatted_text: String::new(),
            grade: config.grade,
            pagination: Pagination::empty(config.page_layout),
            stats,
        });
    }

    // ── Step 2: Optional AI cleanup ──────────────────────────────────────
    let step = Instant::now();
    let source = match &config.cleaner {
        Some(cleaner) => match cleaner.clean(&normalized, &config.document_type).await {
            Ok(cleaned) if !cleaned.trim().is_empty() => {
                stats.cleanup_applied = true;
                cleaned
            }
            Ok(_) => {
                warn!("AI cleanup returned empty text; using normalised text");
                normalized
            }
            Err(e) => {
                warn!("AI cleanup failed ({}); using normalised text", e);
                stats.cleanup_error = Some(e);
                normalized
            }
        },
        None => normalized,
    };
    stats.cleanup_ms = step.elapsed().as_millis() as u64;

    // ── Step 3: Format and enforce the line budget ───────────────────────
    let step = Instant::now();
    let formatted = format::format_text(&source, config.column_budget, config.paragraph_join)?;
    let report = validate::enforce_line_budget(&formatted, config.column_budget);
    stats.corrections = report.corrections;
    stats.format_ms = step.elapsed().as_millis() as u64;

    // ── Step 4: Translate ────────────────────────────────────────────────
    let step = Instant::now();
    let (braille_text, engine, fell_back) = translate_with_policy(&report.text, config).await?;
    stats.translator_used = engine.to_string();
    stats.fell_back = fell_back;
    stats.braille_cells = braille_text.chars().filter(|c| !c.is_whitespace()).count();
    stats.translate_ms = step.elapsed().as_millis() as u64;

    // ── Step 5: Paginate ─────────────────────────────────────────────────
    let step = Instant::now();
    let pagination = paginate(&braille_text, config.page_layout);
    stats.paginate_ms = step.elapsed().as_millis() as u64;
    stats.total_ms = total_start.elapsed().as_millis() as u64;

    info!(
        "Conversion complete: {} pages, {} cells via {}, {}ms total",
        pagination.total_pages, stats.braille_cells, stats.translator_used, stats.total_ms
    );

    Ok(ConversionOutput {
        braille_text,
        formatted_text: report.text,
        grade: config.grade,
        pagination,
        stats,
    })
}

/// Read a local text file or download a URL, then convert it.
pub async fn convert_input(
    input_str: impl AsRef<str>,
    config: &ConversionConfig,
) -> Result<ConversionOutput, BrailleError> {
    let extracted = input::resolve_input(input_str.as_ref(), config.download_timeout_secs).await?;
    convert_extracted(&extracted, config).await
}

/// Convert an input and write the Braille text directly to a file.
///
/// Uses an atomic write (temp file in the target directory + rename) so a
/// reader never sees a partial file.
pub async fn convert_to_file(
    input_str: impl AsRef<str>,
    output_path: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<ConversionStats, BrailleError> {
    let output = convert_input(input_str, config).await?;
    write_atomic(output_path.as_ref(), &output.braille_text)?;
    Ok(output.stats)
}

/// Synchronous wrapper around [`convert`].
///
/// Creates a temporary tokio runtime internally.
pub fn convert_sync(raw_text: &str, config: &ConversionConfig) -> Result<ConversionOutput, BrailleError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| BrailleError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(convert(raw_text, config))
}

/// Convert many inputs, up to `config.concurrency` at a time.
///
/// Results come back in input order. One failing document does not stop
/// the others; progress events go to `config.progress_callback`.
pub async fn convert_batch(inputs: &[String], config: &ConversionConfig) -> Vec<BatchItem> {
    let total = inputs.len();
    if let Some(ref cb) = config.progress_callback {
        cb.on_batch_start(total);
    }

    let mut results: Vec<(usize, BatchItem)> = stream::iter(inputs.iter().enumerate().map(
        |(idx, input_str)| async move {
            let index = idx + 1;
            if let Some(ref cb) = config.progress_callback {
                cb.on_document_start(index, total, input_str);
            }
            let result = convert_input(input_str, config).await;
            if let Some(ref cb) = config.progress_callback {
                match &result {
                    Ok(output) => cb.on_document_complete(index, total, output.pagination.total_pages),
                    Err(e) => cb.on_document_error(index, total, &e.to_string()),
                }
            }
            (
                idx,
                BatchItem {
                    input: input_str.clone(),
                    result,
                },
            )
        },
    ))
    .buffer_unordered(config.concurrency.max(1))
    .collect()
    .await;

    results.sort_by_key(|(idx, _)| *idx);
    let successes = results.iter().filter(|(_, item)| item.result.is_ok()).count();
    info!("Batch complete: {}/{} documents converted", successes, total);
    if let Some(ref cb) = config.progress_callback {
        cb.on_batch_complete(total, successes);
    }
    results.into_iter().map(|(_, item)| item).collect()
}

/// Emit the G-code program for one page (1-based) of a pagination.
///
/// `overrides` are applied on top of `settings` before validation.
///
/// # Errors
/// [`BrailleError::Generation`] when the page is out of range, the settings
/// are invalid, or the sheet cannot hold `chars_per_line × lines_per_page`
/// cells. A page is never embossed partially.
pub fn gcode_for_page(
    pagination: &Pagination,
    page_number: usize,
    settings: &PrinterSettings,
    overrides: &GcodeOverrides,
) -> Result<GcodeProgram, BrailleError> {
    let page = pagination.page(page_number).ok_or_else(|| {
        BrailleError::Generation(format!(
            "page {} out of range (document has {} pages)",
            page_number, pagination.total_pages
        ))
    })?;
    let settings = overrides.apply(settings);
    check_sheet_fits(pagination, &settings)?;
    emit_whole_page(page_number, &page.wrapped_content(pagination.chars_per_line), &settings)
}

/// Emit one G-code program per page, in page order.
///
/// Fails on the first page that cannot be emitted; no partial list is returned.
pub fn gcode_for_pages(
    pagination: &Pagination,
    settings: &PrinterSettings,
    overrides: &GcodeOverrides,
) -> Result<Vec<GcodeProgram>, BrailleError> {
    let settings = overrides.apply(settings);
    check_sheet_fits(pagination, &settings)?;
    pagination
        .pages
        .iter()
        .map(|page| {
            let content = page.wrapped_content(pagination.chars_per_line);
            emit_whole_page(page.page_number, &content, &settings)
        })
        .collect()
}

/// Write a G-code program to `path` atomically.
pub fn write_gcode(program: &GcodeProgram, path: impl AsRef<Path>) -> Result<(), BrailleError> {
    write_atomic(path.as_ref(), &program.to_gcode())
}

// ── Internal helpers ─────────────────────────────────────────────────────

/// Translate with the configured engine; fall back to the embedded tables
/// only when the caller asked for it and the engine was unavailable.
async fn translate_with_policy(
    text: &str,
    config: &ConversionConfig,
) -> Result<(String, &'static str, bool), BrailleError> {
    let translator = translator_for(config)?;
    match translator.translate(text, config.grade).await {
        Ok(cells) => Ok((cells, translator.name(), false)),
        Err(e) if e.is_unavailable() && config.fallback_to_embedded => {
            warn!("{}; falling back to the embedded translator", e);
            let embedded = EmbeddedTranslator;
            let cells = embedded.translate(text, config.grade).await?;
            Ok((cells, embedded.name(), true))
        }
        Err(e) => Err(e),
    }
}

/// The sheet must hold a full page of the pagination's layout.
fn check_sheet_fits(pagination: &Pagination, settings: &PrinterSettings) -> Result<(), BrailleError> {
    settings.validate()?;
    let (cells, lines) = (settings.cells_per_line(), settings.lines_per_page());
    if pagination.chars_per_line > cells || pagination.lines_per_page > lines {
        return Err(BrailleError::Generation(format!(
            "page layout {}×{} does not fit the sheet ({} cells × {} lines at {:.1}×{:.1} mm, margin {:.1})",
            pagination.chars_per_line,
            pagination.lines_per_page,
            cells,
            lines,
            settings.paper_width,
            settings.paper_height,
            settings.margin,
        )));
    }
    Ok(())
}

fn emit_whole_page(
    page_number: usize,
    content: &str,
    settings: &PrinterSettings,
) -> Result<GcodeProgram, BrailleError> {
    let program = gcode::emit(content, settings)?;
    if program.truncated_lines > 0 || program.dropped_lines > 0 {
        return Err(BrailleError::Generation(format!(
            "page {}: {} lines cut at the margin, {} lines past the page end",
            page_number, program.truncated_lines, program.dropped_lines
        )));
    }
    Ok(program)
}

fn write_atomic(path: &Path, contents: &str) -> Result<(), BrailleError> {
    let write_err = |source: std::io::Error| BrailleError::OutputWriteFailed {
        path: path.to_path_buf(),
        source,
    };

    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir).map_err(write_err)?;

    let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(write_err)?;
    tmp.write_all(contents.as_bytes()).map_err(write_err)?;
    tmp.persist(path).map_err(|e| write_err(e.error))?;
    debug!("Wrote {} bytes to {}", contents.len(), path.display());
    Ok(())
}
