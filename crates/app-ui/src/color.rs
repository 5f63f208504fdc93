//! Color conversion utilities
//!
//! Colors travel through the system in three shapes: hex strings typed or
//! stored by users (`#F472B6`), the normalized [`Rgba`] value used by the
//! theme model and the render backend, and CSS `rgba(...)` strings used as
//! style values.
//!
//! # Usage
//!
//! ```rust
//! use app_ui::color::{color_to_css, hex_to_color};
//!
//! let pink = hex_to_color("#F472B6").unwrap();
//! assert_eq!(color_to_css(&pink), "rgba(244, 114, 182, 1)");
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Color parsing errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ColorError {
    /// Input was not a well-formed color string
    #[error("Invalid color: {0}")]
    Parse(String),

    /// A channel value was non-finite or outside its range
    #[error("Channel out of range: {channel}={value}")]
    OutOfRange {
        /// Channel name (r, g, b or a)
        channel: char,
        /// Rejected value
        value: String,
    },
}

/// Result type for color operations
pub type Result<T> = std::result::Result<T, ColorError>;

// =============================================================================
// RGBA Color
// =============================================================================

/// An RGBA color with 8-bit color channels and a unit alpha channel
///
/// The alpha channel is always finite and within `[0, 1]`. Values arriving
/// from JSON are checked on deserialization, values built in code are clamped.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawRgba")]
pub struct Rgba {
    /// Red channel
    pub r: u8,
    /// Green channel
    pub g: u8,
    /// Blue channel
    pub b: u8,
    /// Alpha channel in `[0, 1]`
    pub a: f32,
}

impl Rgba {
    /// Opaque black
    pub const BLACK: Rgba = Rgba::rgb(0, 0, 0);

    /// Opaque white
    pub const WHITE: Rgba = Rgba::rgb(255, 255, 255);

    /// Create an opaque color
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// Create a color with alpha, clamping alpha into `[0, 1]`
    ///
    /// A non-finite alpha is treated as fully opaque.
    pub fn new(r: u8, g: u8, b: u8, a: f32) -> Self {
        let a = if a.is_finite() { a.clamp(0.0, 1.0) } else { 1.0 };
        Self { r, g, b, a }
    }
}

impl Default for Rgba {
    fn default() -> Self {
        Self::BLACK
    }
}

impl std::fmt::Display for Rgba {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&color_to_css(self))
    }
}

impl std::str::FromStr for Rgba {
    type Err = ColorError;

    /// Accepts either hex (`#RRGGBB`, `#RRGGBBAA`) or CSS `rgba(...)` syntax
    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        if trimmed.starts_with("rgba(") || trimmed.starts_with("rgb(") {
            parse_css_rgba(trimmed)
        } else {
            hex_to_color(trimmed)
        }
    }
}

/// Wire form used when deserializing, before range checks
#[derive(Deserialize)]
struct RawRgba {
    r: f64,
    g: f64,
    b: f64,
    #[serde(default = "opaque")]
    a: f64,
}

fn opaque() -> f64 {
    1.0
}

impl TryFrom<RawRgba> for Rgba {
    type Error = ColorError;

    fn try_from(raw: RawRgba) -> Result<Self> {
        Ok(Self {
            r: channel_u8('r', raw.r)?,
            g: channel_u8('g', raw.g)?,
            b: channel_u8('b', raw.b)?,
            a: channel_alpha(raw.a)?,
        })
    }
}

fn channel_u8(channel: char, value: f64) -> Result<u8> {
    if !value.is_finite() || !(0.0..=255.0).contains(&value) || value.fract() != 0.0 {
        return Err(ColorError::OutOfRange { channel, value: value.to_string() });
    }
    Ok(value as u8)
}

fn channel_alpha(value: f64) -> Result<f32> {
    if !value.is_finite() || !(0.0..=1.0).contains(&value) {
        return Err(ColorError::OutOfRange { channel: 'a', value: value.to_string() });
    }
    Ok(value as f32)
}

// =============================================================================
// Conversions
// =============================================================================

/// Parse a hex color string into an [`Rgba`]
///
/// Accepts an optional single leading `#` followed by exactly 6 (`RRGGBB`) or 8
/// (`RRGGBBAA`) hex digits. Alpha defaults to 1 when absent.
pub fn hex_to_color(hex: &str) -> Result<Rgba> {
    let trimmed = hex.trim();
    let digits = trimmed.strip_prefix('#').unwrap_or(trimmed);
    if !(digits.len() == 6 || digits.len() == 8) || !digits.chars().all(|c| c.is_ascii_hexdigit())
    {
        return Err(ColorError::Parse(hex.to_string()));
    }

    let byte = |i: usize| {
        u8::from_str_radix(&digits[i..i + 2], 16).map_err(|_| ColorError::Parse(hex.to_string()))
    };

    let a = if digits.len() == 8 { byte(6)? as f32 / 255.0 } else { 1.0 };
    Ok(Rgba { r: byte(0)?, g: byte(2)?, b: byte(4)?, a })
}

/// Parse a hex color, falling back to `fallback` when the input is malformed
pub fn hex_to_color_or(hex: &str, fallback: Rgba) -> Rgba {
    hex_to_color(hex).unwrap_or(fallback)
}

/// Render a color as a CSS `rgba(r, g, b, a)` value
pub fn color_to_css(color: &Rgba) -> String {
    format!("rgba({}, {}, {}, {})", color.r, color.g, color.b, color.a)
}

/// Render the color channels as `#RRGGBB`, dropping alpha
pub fn color_to_hex(color: &Rgba) -> String {
    format!("#{:02X}{:02X}{:02X}", color.r, color.g, color.b)
}

/// Parse a CSS `rgba(r, g, b, a)` or `rgb(r, g, b)` value
pub fn parse_css_rgba(css: &str) -> Result<Rgba> {
    let err = || ColorError::Parse(css.to_string());

    let trimmed = css.trim();
    let inner = trimmed
        .strip_prefix("rgba(")
        .or_else(|| trimmed.strip_prefix("rgb("))
        .and_then(|rest| rest.strip_suffix(')'))
        .ok_or_else(err)?;

    let parts: Vec<&str> = inner.split(',').map(str::trim).collect();
    if parts.len() != 3 && parts.len() != 4 {
        return Err(err());
    }

    let channel = |i: usize| parts[i].parse::<u8>().map_err(|_| err());
    let a = match parts.get(3) {
        Some(alpha) => channel_alpha(alpha.parse::<f64>().map_err(|_| err())?)?,
        None => 1.0,
    };

    Ok(Rgba { r: channel(0)?, g: channel(1)?, b: channel(2)?, a })
}
