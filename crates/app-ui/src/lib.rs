//! Theme color model for Schedule Studio
//!
//! This crate provides the color primitives and theme catalog behind the
//! schedule card: hex/CSS color conversion, perceptual light/dark
//! classification, the eight-slot theme palette with its built-in and custom
//! catalogs, and the decorative background variants.
//!
//! # Modules
//!
//! - [`color`] - RGBA colors and hex/CSS conversion
//! - [`luminance`] - Light/dark classification and readable foregrounds
//! - [`theme`] - Palettes, built-in themes, custom catalog, theme references
//! - [`background`] - Decorative overlay variants
//!
//! # Example
//!
//! ```rust
//! use app_ui::{classify, default_theme, Brightness, ContrastThresholds};
//!
//! let theme = default_theme();
//! let thresholds = ContrastThresholds::default();
//! let primary = theme.palette.primary();
//! assert_eq!(classify(&primary, thresholds.action), Brightness::Light);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod background;
pub mod color;
pub mod luminance;
pub mod theme;

// Re-export commonly used types
pub use background::Background;
pub use color::{color_to_css, color_to_hex, hex_to_color, hex_to_color_or, parse_css_rgba, ColorError, Rgba};
pub use luminance::{classify, readable_text_color, Brightness, ContrastThresholds};
pub use theme::{
    builtin_theme, default_theme, BuiltinTheme, Palette, Slot, Theme, ThemeCatalog, ThemeError,
    ThemeRef, BUILTIN_THEMES, DEFAULT_THEME_KEY,
};
