//! Result types returned by the conversion entry points.

use crate::config::Grade;
use crate::error::{BrailleError, CleanupError};
use crate::pipeline::paginate::Pagination;
use serde::{Deserialize, Serialize};

/// Extractor confidence (0–100) below which a warning is logged.
pub const LOW_CONFIDENCE: f32 = 60.0;

/// Text handed over by an extractor (OCR, PDF text layer, plain file).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractedText {
    pub text: String,
    /// Extractor confidence, 0–100, when the extractor reports one.
    pub confidence: Option<f32>,
    /// Number of source pages, when known.
    pub page_count: Option<usize>,
}

impl ExtractedText {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            confidence: None,
            page_count: None,
        }
    }

    pub fn with_confidence(mut self, confidence: f32) -> Self {
        self.confidence = Some(confidence);
        self
    }

    pub fn with_page_count(mut self, pages: usize) -> Self {
        self.page_count = Some(pages);
        self
    }

    pub fn is_low_confidence(&self) -> bool {
        self.confidence.is_some_and(|c| c < LOW_CONFIDENCE)
    }
}

/// The complete result of one conversion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionOutput {
    /// Unicode Braille, lines separated by `\n`.
    pub braille_text: String,
    /// The formatted source text the Braille was translated from.
    pub formatted_text: String,
    pub grade: Grade,
    pub pagination: Pagination,
    pub stats: ConversionStats,
}

/// Timing and outcome details for one conversion.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConversionStats {
    pub input_chars: usize,
    pub braille_cells: usize,
    /// Lines the validator had to break.
    pub corrections: usize,
    /// Engine that produced `braille_text` ("embedded" or "remote").
    pub translator_used: String,
    /// `true` when the remote engine was unavailable and the embedded
    /// translator was used instead.
    pub fell_back: bool,
    /// `true` when the AI cleanup output was used.
    pub cleanup_applied: bool,
    /// Why the cleanup output was not used, if a cleaner was configured.
    pub cleanup_error: Option<CleanupError>,
    pub source_confidence: Option<f32>,
    pub source_pages: Option<usize>,
    pub normalize_ms: u64,
    pub cleanup_ms: u64,
    pub format_ms: u64,
    pub translate_ms: u64,
    pub paginate_ms: u64,
    pub total_ms: u64,
}

/// The page geometry part of a stored record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationSummary {
    pub total_pages: usize,
    pub chars_per_line: usize,
    pub lines_per_page: usize,
    pub chars_per_page: usize,
}

impl From<&Pagination> for PaginationSummary {
    fn from(p: &Pagination) -> Self {
        Self {
            total_pages: p.total_pages,
            chars_per_line: p.chars_per_line,
            lines_per_page: p.lines_per_page,
            chars_per_page: p.chars_per_page,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordStatus {
    Success,
    Error,
}

/// Everything a persistence layer needs to store for one document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversionRecord {
    pub braille_text: String,
    pub grade: Grade,
    pub pagination: Option<PaginationSummary>,
    pub status: RecordStatus,
    pub error: Option<String>,
}

impl ConversionRecord {
    /// Build the record for a finished conversion. `grade` is the requested
    /// grade, used when the conversion failed.
    pub fn from_result(result: &Result<ConversionOutput, BrailleError>, grade: Grade) -> Self {
        match result {
            Ok(output) => Self {
                braille_text: output.braille_text.clone(),
                grade: output.grade,
                pagination: Some(PaginationSummary::from(&output.pagination)),
                status: RecordStatus::Success,
                error: None,
            },
            Err(e) => Self {
                braille_text: String::new(),
                grade,
                pagination: None,
                status: RecordStatus::Error,
                error: Some(format!("{} failed: {}", e.stage(), e)),
            },
        }
    }
}

/// One document's outcome in a batch.
#[derive(Debug)]
pub struct BatchItem {
    /// Input as given (path, URL or label).
    pub input: String,
    pub result: Result<ConversionOutput, BrailleError>,
}
