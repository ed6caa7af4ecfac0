//! Braille translation strategies.
//!
//! One capability, two implementations, chosen by
//! [`crate::config::TranslatorKind`]:
//!
//! | Strategy | Module | I/O |
//! |----------|--------|-----|
//! | Embedded lookup tables | [`embedded`] | none |
//! | External translation service | [`remote`] | HTTP, with timeout |
//!
//! Call sites only ever hold an `Arc<dyn BrailleTranslator>`; the fallback
//! from remote to embedded lives in [`crate::convert`] as caller policy.

pub mod embedded;
pub mod remote;
pub mod tables;

pub use embedded::{translate_text, EmbeddedTranslator};
pub use remote::RemoteTranslator;

use crate::config::{ConversionConfig, Grade, TranslatorKind};
use crate::error::BrailleError;
use futures::future::BoxFuture;
use std::sync::Arc;

/// Maps formatted source text to Unicode Braille cells.
///
/// Implementations must be `Send + Sync`: batch conversion shares one
/// translator across concurrently running documents.
pub trait BrailleTranslator: Send + Sync {
    /// Short engine name recorded in conversion stats ("embedded", "remote").
    fn name(&self) -> &'static str;

    /// Translate `text` at `grade`.
    ///
    /// Errors are [`BrailleError::TranslationUnavailable`] when the engine
    /// could not be used and [`BrailleError::TranslationContent`] when it
    /// ran but produced nothing usable.
    fn translate<'a>(
        &'a self,
        text: &'a str,
        grade: Grade,
    ) -> BoxFuture<'a, Result<String, BrailleError>>;
}

/// Build the translator selected by `config.translator`.
pub fn translator_for(config: &ConversionConfig) -> Result<Arc<dyn BrailleTranslator>, BrailleError> {
    match &config.translator {
        TranslatorKind::Embedded => Ok(Arc::new(EmbeddedTranslator)),
        TranslatorKind::Remote { url } => Ok(Arc::new(RemoteTranslator::new(
            url.clone(),
            config.translator_timeout_secs,
        )?)),
    }
}
