//! Six-dot Braille cell decoding.
//!
//! A Unicode Braille pattern is `U+2800 + mask`. Bits 0–5 are dots 1–6:
//!
//! ```text
//! dot 1 = 0x01   dot 4 = 0x08
//! dot 2 = 0x02   dot 5 = 0x10
//! dot 3 = 0x04   dot 6 = 0x20
//! ```
//!
//! Bits 6 and 7 (dots 7 and 8) belong to eight-dot Braille and are ignored.

/// Empty Braille pattern, U+2800.
pub const BRAILLE_BASE: char = '\u{2800}';

const SIX_DOT_MASK: u8 = 0x3F;

/// The raised dots of one six-dot cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Dots(u8);

impl Dots {
    /// Decode a Braille pattern codepoint; `None` for anything else.
    pub fn from_char(c: char) -> Option<Self> {
        let offset = (c as u32).checked_sub(BRAILLE_BASE as u32)?;
        if offset > 0xFF {
            return None;
        }
        Some(Self(offset as u8 & SIX_DOT_MASK))
    }

    /// Build from dot numbers 1–6; other numbers are ignored.
    pub fn from_numbers(dots: &[u8]) -> Self {
        let mask = dots
            .iter()
            .filter(|d| (1..=6).contains(*d))
            .fold(0u8, |m, d| m | (1 << (d - 1)));
        Self(mask)
    }

    /// Re-encode as a Braille pattern codepoint.
    pub fn to_char(self) -> char {
        char::from_u32(BRAILLE_BASE as u32 + self.0 as u32).unwrap_or(BRAILLE_BASE)
    }

    pub fn contains(self, dot: u8) -> bool {
        (1..=6).contains(&dot) && self.0 & (1 << (dot - 1)) != 0
    }

    /// Raised dot numbers in ascending order.
    pub fn numbers(self) -> impl Iterator<Item = u8> {
        (1..=6u8).filter(move |d| self.contains(*d))
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn count(self) -> usize {
        self.0.count_ones() as usize
    }
}

/// Grid slot of a dot: `(column, row)`, column 0 for dots 1–3.
pub fn dot_slot(dot: u8) -> (u8, u8) {
    let idx = dot.clamp(1, 6) - 1;
    (idx / 3, idx % 3)
}
