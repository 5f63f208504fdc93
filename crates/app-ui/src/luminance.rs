//! Perceptual light/dark classification
//!
//! Foreground colors (button labels, active background chips) are picked by
//! classifying the color they sit on. The score is a weighted channel sum
//! (Rec. 601 weights, green heaviest and blue lightest) expressed on the same
//! `0..=765` scale as a plain `r + g + b` sum, so thresholds read naturally
//! against three 8-bit channels.
//!
//! Scores are computed in integer thousandths so two visually identical
//! colors can never land on different sides of a threshold through floating
//! point rounding.

use crate::color::Rgba;
use serde::{Deserialize, Serialize};

/// Channel weights in thousandths (sum to 1000)
const WEIGHT_R: u32 = 299;
const WEIGHT_G: u32 = 587;
const WEIGHT_B: u32 = 114;

/// Near-black text used on light backgrounds (`#111827`)
pub const TEXT_ON_LIGHT: Rgba = Rgba::rgb(17, 24, 39);

/// White text used on dark backgrounds
pub const TEXT_ON_DARK: Rgba = Rgba::WHITE;

/// Result of a luminance classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Brightness {
    /// Perceptually light; pair with dark text
    Light,
    /// Perceptually dark; pair with light text
    Dark,
}

impl Brightness {
    /// Whether this is [`Brightness::Light`]
    pub fn is_light(&self) -> bool {
        matches!(self, Brightness::Light)
    }
}

impl std::fmt::Display for Brightness {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Brightness::Light => write!(f, "light"),
            Brightness::Dark => write!(f, "dark"),
        }
    }
}

/// Brightness score in thousandths of a unit on the `0..=765` scale
fn score_milli(color: &Rgba) -> u32 {
    3 * (WEIGHT_R * color.r as u32 + WEIGHT_G * color.g as u32 + WEIGHT_B * color.b as u32)
}

/// Perceptual brightness score in `0.0..=765.0`
pub fn brightness_score(color: &Rgba) -> f32 {
    score_milli(color) as f32 / 1000.0
}

/// Classify a color against a caller-supplied threshold
///
/// Scores strictly above `threshold` are [`Brightness::Light`]; scores at or
/// below it are [`Brightness::Dark`]. Alpha is ignored.
pub fn classify(color: &Rgba, threshold: u32) -> Brightness {
    if score_milli(color) > threshold.saturating_mul(1000) {
        Brightness::Light
    } else {
        Brightness::Dark
    }
}

/// Pick a readable text color for content drawn on `background`
pub fn readable_text_color(background: &Rgba, threshold: u32) -> Rgba {
    match classify(background, threshold) {
        Brightness::Light => TEXT_ON_LIGHT,
        Brightness::Dark => TEXT_ON_DARK,
    }
}

/// Thresholds used by the different places that need a readable foreground
///
/// The action threshold drives the primary button and the selected
/// background-variant chip; the preview threshold drives text inside the
/// schedule preview card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContrastThresholds {
    /// Threshold for action controls drawn on the primary color
    pub action: u32,
    /// Threshold for text drawn inside the preview card
    pub preview: u32,
}

impl Default for ContrastThresholds {
    fn default() -> Self {
        Self { action: 400, preview: 256 }
    }
}
