//! Error types for the braille-emboss library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`BrailleError`] — **Fatal**: the conversion cannot produce a result
//!   (translation engine unreachable, translation produced nothing, G-code
//!   geometry impossible, bad override value). Returned as
//!   `Err(BrailleError)` from the top-level `convert*` and `gcode*`
//!   functions.
//!
//! * [`CleanupError`] — **Non-fatal**: the optional AI cleanup collaborator
//!   failed (timeout, provider error, empty reply). The pipeline continues
//!   with the normalised text and the reason is kept in
//!   [`crate::output::ConversionStats`].
//!
//! Normalisation, formatting and pagination never abort a conversion: losing
//! user content is worse than imperfect layout. Only translation and G-code
//! generation may stop the pipeline, and [`BrailleError::stage`] tells the
//! caller which one did.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the braille-emboss library.
#[derive(Debug, Error)]
pub enum BrailleError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("Text file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The input bytes are not valid UTF-8 text.
    #[error("Input '{source_name}' is not valid UTF-8 text (first invalid byte at offset {offset})")]
    NotUtf8 { source_name: String, offset: usize },

    /// HTTP URL was syntactically valid but download failed.
    #[error("Failed to download '{url}': {reason}\nCheck your internet connection.")]
    DownloadFailed { url: String, reason: String },

    /// Download exceeded the configured timeout.
    #[error("Download timed out after {secs}s for '{url}'\nIncrease --download-timeout.")]
    DownloadTimeout { url: String, secs: u64 },

    // ── Formatting errors ─────────────────────────────────────────────────
    /// Programmer error: the layout parameters cannot hold any text.
    #[error("Formatting error: {0}")]
    Formatting(String),

    // ── Translation errors ────────────────────────────────────────────────
    /// The translation engine could not be reached or did not answer in time.
    ///
    /// Distinct from [`BrailleError::TranslationContent`]: the text itself may
    /// be perfectly translatable, so callers may retry or fall back to the
    /// embedded translator.
    #[error("Braille translation unavailable ({engine}): {reason}")]
    TranslationUnavailable { engine: String, reason: String },

    /// The engine ran but produced no usable output.
    #[error("Braille translation failed ({engine}): {reason}")]
    TranslationContent { engine: String, reason: String },

    // ── G-code errors ─────────────────────────────────────────────────────
    /// G-code emission failed; no partial program is returned.
    #[error("G-code generation failed: {0}")]
    Generation(String),

    /// A printer setting override was not a valid number.
    #[error("Invalid value for '{name}': '{value}' is not a finite number")]
    InvalidOverride { name: String, value: String },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write an output file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The cleanup provider could not be created (missing API key, unknown name).
    #[error("Cleanup provider '{provider}' is not configured.\n{hint}")]
    ProviderNotConfigured { provider: String, hint: String },

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// The pipeline stage an error belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Input,
    Formatting,
    Translation,
    Generation,
    Configuration,
    Output,
    Internal,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Input => "input",
            Stage::Formatting => "formatting",
            Stage::Translation => "translation",
            Stage::Generation => "gcode generation",
            Stage::Configuration => "configuration",
            Stage::Output => "output",
            Stage::Internal => "internal",
        };
        f.write_str(name)
    }
}

impl BrailleError {
    /// Which stage of the pipeline produced this error.
    pub fn stage(&self) -> Stage {
        match self {
            BrailleError::FileNotFound { .. }
            | BrailleError::PermissionDenied { .. }
            | BrailleError::NotUtf8 { .. }
            | BrailleError::DownloadFailed { .. }
            | BrailleError::DownloadTimeout { .. } => Stage::Input,
            BrailleError::Formatting(_) => Stage::Formatting,
            BrailleError::TranslationUnavailable { .. }
            | BrailleError::TranslationContent { .. } => Stage::Translation,
            BrailleError::Generation(_) | BrailleError::InvalidOverride { .. } => {
                Stage::Generation
            }
            BrailleError::InvalidConfig(_) | BrailleError::ProviderNotConfigured { .. } => {
                Stage::Configuration
            }
            BrailleError::OutputWriteFailed { .. } => Stage::Output,
            BrailleError::Internal(_) => Stage::Internal,
        }
    }

    /// `true` when the failure is about reaching the engine, not the text.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, BrailleError::TranslationUnavailable { .. })
    }
}

/// A non-fatal failure of the AI cleanup collaborator.
///
/// Stored in [`crate::output::ConversionStats::cleanup_error`] when the
/// pipeline fell back to the normalised text.
#[derive(Debug, Clone, Error, Serialize, Deserialize)]
pub enum CleanupError {
    /// The provider call failed after all retries.
    #[error("cleanup chunk {chunk}: provider call failed after {retries} retries: {detail}")]
    ProviderFailed {
        chunk: usize,
        retries: u32,
        detail: String,
    },

    /// The provider did not answer in time.
    #[error("cleanup chunk {chunk}: provider call timed out after {secs}s")]
    Timeout { chunk: usize, secs: u64 },

    /// The provider answered with nothing usable.
    #[error("cleanup chunk {chunk}: provider returned empty text")]
    EmptyResponse { chunk: usize },
}
