//! Pipeline stages for text-to-Braille conversion.
//!
//! Each submodule implements exactly one transformation step, so each is
//! testable alone and geometry always arrives as a parameter.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ normalize ──▶ [cleanup] ──▶ format ──▶ validate ──▶ translate ──▶ paginate
//! (file/URL)  (noise)      (AI, opt.)   (layout)   (budget)    (crate::translate)
//! ```
//!
//! 1. [`input`]     — read a local file or download a URL as UTF-8 text
//! 2. [`normalize`] — deterministic noise removal; never fails
//! 3. [`cleanup`]   — optional AI tidy-up; failure falls back to step 2's text
//! 4. [`format`]    — titles, lists, paragraphs and word wrap, using
//!    [`classify`] for the line kinds
//! 5. [`validate`]  — force-break anything still over the column budget
//! 6. [`paginate`]  — split the Braille cell stream into fixed-size pages

pub mod classify;
pub mod cleanup;
pub mod format;
pub mod input;
pub mod normalize;
pub mod paginate;
pub mod validate;
