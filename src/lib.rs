//! # braille-emboss
//!
//! Turn extracted document text into paginated Unicode Braille and G-code
//! for embossing Braille dots with a 3D printer.
//!
//! ## Why this crate?
//!
//! Text coming out of OCR or a PDF text layer is full of noise: URLs, page
//! labels, decorative rules, broken lines, typographic punctuation. Braille
//! pages are also tiny (40 cells by 25 lines by default). This crate cleans
//! the text, lays it out for that budget, translates it to Grade 1 or
//! Grade 2 Braille, splits it into pages and, on request, emits the
//! movements that press each dot into paper.
//!
//! ## Pipeline Overview
//!
//! ```text
//! text
//!  │
//!  ├─ 1. Normalise  deterministic noise removal (never fails)
//!  ├─ 2. Cleanup    optional LLM tidy-up; falls back to step 1 on failure
//!  ├─ 3. Format     titles, lists, paragraphs, word wrap to the column budget
//!  ├─ 4. Validate   force-break anything still over budget
//!  ├─ 5. Translate  embedded tables or a remote translation service
//!  ├─ 6. Paginate   fixed-size Braille pages
//!  └─ 7. G-code     per page, on request
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use braille_emboss::{convert, gcode_for_page, ConversionConfig, GcodeOverrides, PrinterSettings};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConversionConfig::default();
//!     let output = convert("CHAPTER ONE\n\nThe cat sat on the mat.", &config).await?;
//!     println!("{}", output.braille_text);
//!
//!     let program = gcode_for_page(
//!         &output.pagination,
//!         1,
//!         &PrinterSettings::default(),
//!         &GcodeOverrides::default(),
//!     )?;
//!     eprintln!("{} dots, ~{:.0}s", program.press_count(), program.estimated_seconds);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `braille-emboss` binary (clap + anyhow + tracing-subscriber) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! braille-emboss = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod error;
pub mod gcode;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod prompts;
pub mod translate;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ConversionConfig, ConversionConfigBuilder, Grade, PageLayout, ParagraphJoin, TranslatorKind};
pub use convert::{
    convert, convert_batch, convert_extracted, convert_input, convert_sync, convert_to_file, gcode_for_page,
    gcode_for_pages, write_gcode,
};
pub use error::{BrailleError, CleanupError, Stage};
pub use gcode::{GcodeOverrides, GcodeProgram, PrinterSettings};
pub use output::{BatchItem, ConversionOutput, ConversionRecord, ConversionStats, ExtractedText, RecordStatus};
pub use pipeline::cleanup::{LlmCleaner, TextCleaner};
pub use pipeline::paginate::{Page, Pagination};
pub use progress::{ConversionProgressCallback, NoopProgressCallback, ProgressCallback};
pub use translate::{BrailleTranslator, EmbeddedTranslator, RemoteTranslator};
