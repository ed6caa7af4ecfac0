//! Printer geometry and per-request overrides.
//!
//! All lengths are millimetres, feed rate is mm/min. Every field has a
//! default so a JSON settings file only needs the values that differ.
//!
//! The default sheet is 11.5 × 11 in Braille paper: with a 6 mm cell pitch
//! it holds 45 cells × 26 lines, enough for the default 40 × 25 page.

use crate::error::BrailleError;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Embosser geometry and motion parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrinterSettings {
    pub paper_width: f64,
    pub paper_height: f64,
    /// Blank border on every side.
    pub margin: f64,
    /// Distance between neighbouring dots inside a cell.
    pub letter_width: f64,
    pub dot_radius: f64,
    /// Extra gap between cells on a line.
    pub letter_padding: f64,
    /// Extra gap between lines.
    pub line_padding: f64,
    /// Z height that presses a dot.
    pub head_down_z: f64,
    /// Z height for travel moves.
    pub head_up_z: f64,
    pub feed_rate: f64,
    pub invert_x: bool,
    pub invert_y: bool,
    pub mirror_x: bool,
    pub mirror_y: bool,
    /// Delta-kinematics machine: origin at the bed centre.
    pub delta: bool,
}

impl Default for PrinterSettings {
    fn default() -> Self {
        Self {
            paper_width: 292.1,
            paper_height: 279.4,
            margin: 10.0,
            letter_width: 2.5,
            dot_radius: 0.5,
            letter_padding: 3.5,
            line_padding: 2.5,
            head_down_z: -2.0,
            head_up_z: 10.0,
            feed_rate: 5000.0,
            invert_x: false,
            invert_y: false,
            mirror_x: false,
            mirror_y: false,
            delta: false,
        }
    }
}

impl PrinterSettings {
    /// Parse settings from JSON; missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, BrailleError> {
        serde_json::from_str(json)
            .map_err(|e| BrailleError::InvalidConfig(format!("printer settings: {e}")))
    }

    /// Horizontal advance from one cell to the next.
    pub fn cell_advance(&self) -> f64 {
        self.letter_width + self.letter_padding
    }

    /// Vertical advance from one printer line to the next.
    pub fn line_advance(&self) -> f64 {
        3.0 * self.letter_width + self.line_padding
    }

    /// Cells that fit on one printer line between the side margins.
    pub fn cells_per_line(&self) -> usize {
        let usable = self.paper_width - 2.0 * self.margin - self.letter_width;
        fit_count(usable, self.cell_advance())
    }

    /// Braille lines that fit between the top and bottom margins.
    pub fn lines_per_page(&self) -> usize {
        let usable = self.paper_height - 2.0 * self.margin - 2.0 * self.letter_width;
        fit_count(usable, self.line_advance())
    }

    /// Reject geometry no program can be built for.
    pub fn validate(&self) -> Result<(), BrailleError> {
        let numbers = [
            ("paper_width", self.paper_width),
            ("paper_height", self.paper_height),
            ("margin", self.margin),
            ("letter_width", self.letter_width),
            ("dot_radius", self.dot_radius),
            ("letter_padding", self.letter_padding),
            ("line_padding", self.line_padding),
            ("head_down_z", self.head_down_z),
            ("head_up_z", self.head_up_z),
            ("feed_rate", self.feed_rate),
        ];
        if let Some((name, _)) = numbers.iter().find(|(_, v)| !v.is_finite()) {
            return Err(BrailleError::Generation(format!("{name} is not a finite number")));
        }
        if self.paper_width <= 0.0 || self.paper_height <= 0.0 {
            return Err(BrailleError::Generation("paper size must be positive".into()));
        }
        if self.letter_width <= 0.0 {
            return Err(BrailleError::Generation("letter_width must be positive".into()));
        }
        if self.margin < 0.0 || self.letter_padding < 0.0 || self.line_padding < 0.0 {
            return Err(BrailleError::Generation(
                "margin and paddings must not be negative".into(),
            ));
        }
        if self.feed_rate <= 0.0 {
            return Err(BrailleError::Generation("feed_rate must be positive".into()));
        }
        if 2.0 * self.margin + self.letter_width >= self.paper_width
            || 2.0 * self.margin + 2.0 * self.letter_width >= self.paper_height
        {
            return Err(BrailleError::Generation(
                "margins leave no room for a single cell".into(),
            ));
        }
        if self.head_down_z >= self.head_up_z {
            return Err(BrailleError::Generation(format!(
                "head_down_z ({}) must be below head_up_z ({})",
                self.head_down_z, self.head_up_z
            )));
        }
        Ok(())
    }
}

/// Optional per-request overrides: feed rate and the two Z heights.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GcodeOverrides {
    pub feed_rate: Option<f64>,
    pub head_down_z: Option<f64>,
    pub head_up_z: Option<f64>,
}

impl GcodeOverrides {
    /// Parse a query string such as `feed_rate=3000&head_down_z=-1.5`.
    ///
    /// Unknown keys are skipped. A known key with a value that is not a
    /// finite number is rejected with [`BrailleError::InvalidOverride`].
    pub fn parse_query(query: &str) -> Result<Self, BrailleError> {
        let mut overrides = Self::default();
        for pair in query.trim_start_matches('?').split('&').filter(|p| !p.is_empty()) {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            overrides.set(key, value)?;
        }
        Ok(overrides)
    }

    /// Set one override by name from its textual value.
    pub fn set(&mut self, name: &str, value: &str) -> Result<(), BrailleError> {
        let slot = match name {
            "feed_rate" => &mut self.feed_rate,
            "head_down_z" => &mut self.head_down_z,
            "head_up_z" => &mut self.head_up_z,
            other => {
                debug!("Ignoring unknown G-code override '{other}'");
                return Ok(());
            }
        };
        *slot = Some(parse_number(name, value)?);
        Ok(())
    }

    /// `settings` with every present override applied.
    pub fn apply(&self, settings: &PrinterSettings) -> PrinterSettings {
        let mut out = settings.clone();
        if let Some(v) = self.feed_rate {
            out.feed_rate = v;
        }
        if let Some(v) = self.head_down_z {
            out.head_down_z = v;
        }
        if let Some(v) = self.head_up_z {
            out.head_up_z = v;
        }
        out
    }

    pub fn is_empty(&self) -> bool {
        self.feed_rate.is_none() && self.head_down_z.is_none() && self.head_up_z.is_none()
    }
}

/// Anchors `0, step, 2·step, …` that stay within `usable`.
fn fit_count(usable: f64, step: f64) -> usize {
    if !usable.is_finite() || usable < 0.0 || step <= 0.0 {
        return 0;
    }
    (usable / step).floor() as usize + 1
}

fn parse_number(name: &str, value: &str) -> Result<f64, BrailleError> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| BrailleError::InvalidOverride {
            name: name.to_string(),
            value: value.to_string(),
        })
}
