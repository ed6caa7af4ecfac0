//! Lookup tables for the embedded translator.
//!
//! Read-only after first use, so any number of translations can run in
//! parallel without locking.

use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Cell emitted for any character with no mapping (all six dots).
pub const UNTRANSLATABLE: char = '\u{283F}';

/// Numeric indicator placed before every digit.
pub const NUMERIC_INDICATOR: char = '\u{283C}';

/// Tabs become two blank cells.
pub const TAB_CELLS: &str = "\u{2800}\u{2800}";

/// Letters `a`–`z`.
pub static LETTERS: Lazy<HashMap<char, char>> = Lazy::new(|| {
    ('a'..='z')
        .zip("⠁⠃⠉⠙⠑⠋⠛⠓⠊⠚⠅⠇⠍⠝⠕⠏⠟⠗⠎⠞⠥⠧⠺⠭⠽⠵".chars())
        .collect()
});

/// Digits use the cells of `a`–`j`: `1` is `a`, `0` is `j`.
pub static DIGITS: Lazy<HashMap<char, char>> = Lazy::new(|| {
    "1234567890"
        .chars()
        .zip("⠁⠃⠉⠙⠑⠋⠛⠓⠊⠚".chars())
        .collect()
});

/// Punctuation and symbols. Some take a prefix cell, hence `&str`.
pub static PUNCTUATION: Lazy<HashMap<char, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ('.', "⠲"),
        (',', "⠂"),
        ('?', "⠦"),
        ('!', "⠖"),
        (';', "⠆"),
        (':', "⠒"),
        ('-', "⠤"),
        ('(', "⠐⠣"),
        (')', "⠐⠜"),
        ('"', "⠐⠦"),
        ('\'', "⠄"),
        ('/', "⠌"),
        ('\\', "⠡"),
        ('@', "⠈⠁"),
        ('#', "⠼"),
        ('$', "⠈⠎"),
        ('%', "⠨⠴"),
        ('&', "⠈⠯"),
        ('*', "⠈⠔"),
        ('+', "⠬"),
        ('=', "⠨⠅"),
        ('<', "⠈⠣"),
        ('>', "⠈⠜"),
        ('[', "⠪"),
        (']', "⠻"),
        ('{', "⠸⠣"),
        ('}', "⠸⠜"),
    ])
});

/// Letter-group contractions, matched inside words. Longest first.
pub static GROUP_CONTRACTIONS: Lazy<HashMap<&'static str, char>> = Lazy::new(|| {
    HashMap::from([
        ("ing", '⠬'),
        ("ch", '⠡'),
        ("gh", '⠣'),
        ("sh", '⠩'),
        ("th", '⠹'),
        ("wh", '⠱'),
        ("ed", '⠫'),
        ("er", '⠻'),
        ("ou", '⠳'),
        ("ow", '⠪'),
        ("st", '⠌'),
        ("ar", '⠜'),
        ("en", '⠢'),
        ("in", '⠔'),
    ])
});

/// Longest key in [`GROUP_CONTRACTIONS`], in characters.
pub const MAX_GROUP_LEN: usize = 3;

/// Whole-word contractions, matched case-insensitively against a full word.
pub static WORD_CONTRACTIONS: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("and", "⠯"),
        ("for", "⠿"),
        ("of", "⠷"),
        ("the", "⠮"),
        ("with", "⠾"),
        ("about", "⠁⠃"),
        ("above", "⠁⠃⠧"),
        ("according", "⠁⠉⠉"),
        ("across", "⠁⠉⠗"),
        ("after", "⠁⠋"),
        ("afternoon", "⠁⠋⠝"),
        ("afterward", "⠁⠋⠺"),
        ("again", "⠁⠛"),
        ("against", "⠁⠛⠌"),
        ("almost", "⠁⠇⠍"),
        ("already", "⠁⠇⠗"),
        ("also", "⠁⠇"),
        ("although", "⠁⠇⠹"),
        ("altogether", "⠁⠇⠞"),
        ("always", "⠁⠇⠺"),
        ("because", "⠃⠉"),
        ("before", "⠃⠋"),
        ("behind", "⠃⠓"),
        ("below", "⠃⠇"),
        ("beneath", "⠃⠢"),
        ("beside", "⠃⠎"),
        ("between", "⠃⠞"),
        ("beyond", "⠃⠽"),
        ("blind", "⠃⠇"),
        ("braille", "⠃⠗⠇"),
        ("children", "⠡⠝"),
        ("conceive", "⠒⠉⠧"),
        ("could", "⠉⠙"),
        ("deceive", "⠙⠉⠧"),
        ("declare", "⠙⠉⠇"),
        ("either", "⠑⠊"),
        ("first", "⠋⠌"),
        ("friend", "⠋⠗"),
        ("good", "⠛⠙"),
        ("great", "⠛⠗⠞"),
        ("herself", "⠓⠻⠋"),
        ("himself", "⠓⠍⠋"),
        ("immediate", "⠊⠍⠍"),
        ("its", "⠭"),
        ("itself", "⠭⠋"),
        ("letter", "⠇⠗"),
        ("little", "⠇⠇"),
        ("much", "⠍⠡"),
        ("must", "⠍⠌"),
        ("myself", "⠍⠽⠋"),
        ("necessary", "⠝⠑⠉"),
        ("neither", "⠝⠑⠊"),
        ("oneself", "⠕⠝⠋"),
        ("ourselves", "⠳⠗⠧⠎"),
        ("paid", "⠏⠙"),
        ("perceive", "⠏⠻⠉⠧"),
        ("perhaps", "⠏⠻⠓"),
        ("quick", "⠟⠅"),
        ("receive", "⠗⠉⠧"),
        ("rejoice", "⠗⠚⠉"),
        ("said", "⠎⠙"),
        ("should", "⠩⠙"),
        ("such", "⠎⠡"),
        ("themselves", "⠹⠍⠧⠎"),
        ("through", "⠹⠗⠳"),
        ("today", "⠞⠙"),
        ("together", "⠞⠛⠗"),
        ("tomorrow", "⠞⠍"),
        ("tonight", "⠞⠝"),
        ("would", "⠺⠙"),
        ("your", "⠽⠗"),
        ("yourself", "⠽⠗⠋"),
        ("yourselves", "⠽⠗⠧⠎"),
    ])
});
