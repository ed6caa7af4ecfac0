//! Configuration types for text-to-Braille conversion.
//!
//! All conversion behaviour is controlled through [`ConversionConfig`], built
//! via its [`ConversionConfigBuilder`]. Every stage of the pipeline receives
//! its geometry (column budget, page layout) from here instead of reading
//! module-level constants, so tests can exercise non-default layouts.
//!
//! Printer geometry for G-code lives separately in
//! [`crate::gcode::PrinterSettings`]: it is supplied per emission call, not
//! per conversion.

use crate::error::BrailleError;
use crate::pipeline::cleanup::TextCleaner;
use crate::progress::ProgressCallback;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Default number of source columns a formatted line may occupy.
pub const DEFAULT_COLUMN_BUDGET: usize = 40;

/// Smallest column budget the formatter accepts.
pub const MIN_COLUMN_BUDGET: usize = 10;

/// Configuration for a text-to-Braille conversion.
///
/// Built via [`ConversionConfig::builder()`] or using
/// [`ConversionConfig::default()`].
///
/// # Example
/// ```rust
/// use braille_emboss::{ConversionConfig, Grade};
///
/// let config = ConversionConfig::builder()
///     .grade(Grade::One)
///     .column_budget(32)
///     .build()
///     .unwrap();
/// assert_eq!(config.column_budget, 32);
/// ```
#[derive(Clone)]
pub struct ConversionConfig {
    /// Braille grade. Default: [`Grade::Two`].
    pub grade: Grade,

    /// Maximum printable length of a formatted source line. Default: 40.
    ///
    /// Line-length accounting happens in the source alphabet, before
    /// translation, because contractions change the cell count.
    pub column_budget: usize,

    /// Page geometry used by the paginator. Default: 40 × 25.
    pub page_layout: PageLayout,

    /// How the formatter repairs paragraphs broken into short physical lines.
    /// Default: [`ParagraphJoin::ShortLines`].
    pub paragraph_join: ParagraphJoin,

    /// Which translation strategy to use. Default: [`TranslatorKind::Embedded`].
    pub translator: TranslatorKind,

    /// Timeout for one call to a remote translation engine, in seconds. Default: 30.
    pub translator_timeout_secs: u64,

    /// Caller policy: retry with the embedded translator when the configured
    /// remote engine is unavailable. Default: false.
    ///
    /// Only [`BrailleError::TranslationUnavailable`] triggers the fallback;
    /// content errors are reported as-is.
    pub fallback_to_embedded: bool,

    /// Optional AI cleanup collaborator run between normalisation and
    /// formatting. Default: None.
    pub cleaner: Option<Arc<dyn TextCleaner>>,

    /// Document-type hint forwarded to the cleaner (e.g. "textbook"). Default: "general".
    pub document_type: String,

    /// Number of documents converted at once by
    /// [`crate::convert::convert_batch`]. Default: 4.
    pub concurrency: usize,

    /// Download timeout for URL inputs in seconds. Default: 120.
    pub download_timeout_secs: u64,

    /// Optional progress callback for batch conversion.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            grade: Grade::default(),
            column_budget: DEFAULT_COLUMN_BUDGET,
            page_layout: PageLayout::default(),
            paragraph_join: ParagraphJoin::default(),
            translator: TranslatorKind::default(),
            translator_timeout_secs: 30,
            fallback_to_embedded: false,
            cleaner: None,
            document_type: "general".to_string(),
            concurrency: 4,
            download_timeout_secs: 120,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ConversionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionConfig")
            .field("grade", &self.grade)
            .field("column_budget", &self.column_budget)
            .field("page_layout", &self.page_layout)
            .field("paragraph_join", &self.paragraph_join)
            .field("translator", &self.translator)
            .field("translator_timeout_secs", &self.translator_timeout_secs)
            .field("fallback_to_embedded", &self.fallback_to_embedded)
            .field("cleaner", &self.cleaner.as_ref().map(|_| "<dyn TextCleaner>"))
            .field("document_type", &self.document_type)
            .field("concurrency", &self.concurrency)
            .field("download_timeout_secs", &self.download_timeout_secs)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn ConversionProgressCallback>"),
            )
            .finish()
    }
}

impl ConversionConfig {
    /// Create a new builder for `ConversionConfig`.
    pub fn builder() -> ConversionConfigBuilder {
        ConversionConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ConversionConfig`].
#[derive(Debug)]
pub struct ConversionConfigBuilder {
    config: ConversionConfig,
}

impl ConversionConfigBuilder {
    pub fn grade(mut self, grade: Grade) -> Self {
        self.config.grade = grade;
        self
    }

    pub fn column_budget(mut self, columns: usize) -> Self {
        self.config.column_budget = columns;
        self
    }

    pub fn page_layout(mut self, layout: PageLayout) -> Self {
        self.config.page_layout = layout;
        self
    }

    pub fn paragraph_join(mut self, join: ParagraphJoin) -> Self {
        self.config.paragraph_join = join;
        self
    }

    pub fn translator(mut self, kind: TranslatorKind) -> Self {
        self.config.translator = kind;
        self
    }

    pub fn translator_timeout_secs(mut self, secs: u64) -> Self {
        self.config.translator_timeout_secs = secs;
        self
    }

    pub fn fallback_to_embedded(mut self, v: bool) -> Self {
        self.config.fallback_to_embedded = v;
        self
    }

    pub fn cleaner(mut self, cleaner: Arc<dyn TextCleaner>) -> Self {
        self.config.cleaner = Some(cleaner);
        self
    }

    pub fn document_type(mut self, kind: impl Into<String>) -> Self {
        self.config.document_type = kind.into();
        self
    }

    pub fn concurrency(mut self, n: usize) -> Self {
        self.config.concurrency = n.max(1);
        self
    }

    pub fn download_timeout_secs(mut self, secs: u64) -> Self {
        self.config.download_timeout_secs = secs;
        self
    }

    /// Attach a progress callback to receive per-document events.
    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ConversionConfig, BrailleError> {
        let c = &self.config;
        if c.column_budget < MIN_COLUMN_BUDGET {
            return Err(BrailleError::InvalidConfig(format!(
                "Column budget must be ≥ {MIN_COLUMN_BUDGET}, got {}",
                c.column_budget
            )));
        }
        if c.translator_timeout_secs == 0 {
            return Err(BrailleError::InvalidConfig(
                "Translator timeout must be ≥ 1s".into(),
            ));
        }
        if let TranslatorKind::Remote { url } = &c.translator {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(BrailleError::InvalidConfig(format!(
                    "Remote translator URL must be http(s), got '{url}'"
                )));
            }
        }
        Ok(self.config)
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// Braille grade.
///
/// | Grade | Output |
/// |-------|--------|
/// | 1 | Uncontracted: one cell per letter, digits and punctuation only |
/// | 2 | Contracted: whole-word and letter-group contractions (default) |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Grade {
    One,
    #[default]
    Two,
}

impl Grade {
    /// Numeric grade as stored by the persistence collaborator.
    pub fn number(self) -> u8 {
        match self {
            Grade::One => 1,
            Grade::Two => 2,
        }
    }

    /// Grade table name understood by table-driven translation engines.
    pub fn table_name(self) -> &'static str {
        match self {
            Grade::One => "en-us-g1.ctb",
            Grade::Two => "en-us-g2.ctb",
        }
    }
}

impl TryFrom<u8> for Grade {
    type Error = BrailleError;

    fn try_from(n: u8) -> Result<Self, Self::Error> {
        match n {
            1 => Ok(Grade::One),
            2 => Ok(Grade::Two),
            other => Err(BrailleError::InvalidConfig(format!(
                "Braille grade must be 1 or 2, got {other}"
            ))),
        }
    }
}

impl From<Grade> for u8 {
    fn from(g: Grade) -> u8 {
        g.number()
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Grade {}", self.number())
    }
}

/// Fixed page geometry: cells per line and lines per page.
///
/// Fields are private so a zero-sized layout cannot be constructed; the
/// paginator relies on both values being positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageLayout {
    chars_per_line: usize,
    lines_per_page: usize,
}

impl Default for PageLayout {
    fn default() -> Self {
        Self {
            chars_per_line: 40,
            lines_per_page: 25,
        }
    }
}

impl PageLayout {
    pub fn new(chars_per_line: usize, lines_per_page: usize) -> Result<Self, BrailleError> {
        if chars_per_line == 0 || lines_per_page == 0 {
            return Err(BrailleError::InvalidConfig(format!(
                "Page layout must be at least 1×1, got {chars_per_line}×{lines_per_page}"
            )));
        }
        Ok(Self {
            chars_per_line,
            lines_per_page,
        })
    }

    pub fn chars_per_line(&self) -> usize {
        self.chars_per_line
    }

    pub fn lines_per_page(&self) -> usize {
        self.lines_per_page
    }

    pub fn chars_per_page(&self) -> usize {
        self.chars_per_line * self.lines_per_page
    }
}

/// Paragraph reconstruction policy for text whose visual lines were split
/// into separate physical lines by the extractor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParagraphJoin {
    /// Keep every physical line as its own paragraph line.
    Off,
    /// Join runs of consecutive short (≤ 20 chars) plain lines. (default)
    #[default]
    ShortLines,
    /// Join every run of consecutive plain lines inside a paragraph block.
    Always,
}

/// Translation strategy selection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum TranslatorKind {
    /// Built-in lookup tables; no I/O. (default)
    #[default]
    Embedded,
    /// A Braille translation service reached over HTTP.
    Remote { url: String },
}
