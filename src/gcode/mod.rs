//! Braille-to-G-code emission for embossing on a 3D printer.
//!
//! ```text
//! page text ──▶ cell ──▶ emit ──▶ GcodeProgram
//!              (dots)   (geometry + transform)
//! ```
//!
//! - [`cell`]     — decode a Braille codepoint to its raised dots
//! - [`settings`] — [`PrinterSettings`] and query-style [`GcodeOverrides`]
//! - [`emit`]     — lay cells out on the page and build the program
//!
//! One call handles one physical page; paginate before emitting.

pub mod cell;
pub mod emit;
pub mod settings;

pub use cell::Dots;
pub use emit::{emit, GcodeProgram, Instruction};
pub use settings::{GcodeOverrides, PrinterSettings};

use std::path::Path;

/// MIME type the program is served with.
pub const GCODE_CONTENT_TYPE: &str = "text/plain";

/// Download filename for a document: `<stem>_braille.gcode`.
///
/// `"notes.pdf"` becomes `"notes_braille.gcode"`; an empty name falls back
/// to `"document"`.
pub fn gcode_filename(document_name: &str) -> String {
    let stem = Path::new(document_name)
        .file_stem()
        .and_then(|s| s.to_str())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or("document");
    format!("{stem}_braille.gcode")
}

/// Filename for one page of a multi-page document: `<stem>_braille_p<N>.gcode`.
pub fn gcode_page_filename(document_name: &str, page_number: usize) -> String {
    let single = gcode_filename(document_name);
    let stem = single.trim_end_matches(".gcode");
    format!("{stem}_p{page_number}.gcode")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gcode_filename() {
        assert_eq!(gcode_filename("notes.pdf"), "notes_braille.gcode");
        assert_eq!(gcode_filename("/tmp/scan.final.png"), "scan.final_braille.gcode");
        assert_eq!(gcode_filename("README"), "README_braille.gcode");
        assert_eq!(gcode_filename(""), "document_braille.gcode");
    }

    #[test]
    fn test_gcode_page_filename() {
        assert_eq!(gcode_page_filename("notes.pdf", 3), "notes_braille_p3.gcode");
        assert_eq!(gcode_page_filename("", 1), "document_braille_p1.gcode");
    }
}
