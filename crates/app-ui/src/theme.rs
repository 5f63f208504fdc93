//! Theme model for the schedule card
//!
//! A theme is a named palette of eight color slots:
//! - `bg`: page backdrop
//! - `t1`: primary color (buttons, active states, readable-text decisions)
//! - `t2`: secondary text/accent tone
//! - `c1`..`c5`: free swatches
//!
//! Themes come from two disjoint places: the built-in catalog, compiled in and
//! never mutated, and the user's custom themes keyed by generated ids. Every
//! reference to a theme carries its origin ([`ThemeRef`]), serialized as the
//! prefixed string `d-<key>` or `c-<id>`.
//!
//! # Usage
//!
//! ```rust
//! use app_ui::theme::{default_theme, ThemeCatalog};
//!
//! let mut catalog = ThemeCatalog::new();
//! let base = default_theme().palette;
//! let (id, theme) = catalog.create_custom(base, "My Theme").unwrap();
//! assert_eq!(theme.name, "My Theme");
//! assert!(catalog.custom(&id).is_some());
//! ```

use crate::color::Rgba;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;
use uuid::Uuid;

/// Theme model errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ThemeError {
    /// Input failed validation (e.g. empty theme name)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Custom theme id not present in the catalog
    #[error("Custom theme not found: {0}")]
    NotFound(String),

    /// Theme reference string could not be parsed
    #[error("Invalid theme reference: {0}")]
    InvalidRef(String),
}

/// Result type for theme operations
pub type Result<T> = std::result::Result<T, ThemeError>;

// =============================================================================
// Palette
// =============================================================================

/// One of the eight palette slots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Slot {
    /// Page backdrop
    Bg,
    /// Primary color
    T1,
    /// Secondary text/accent
    T2,
    /// Swatch 1
    C1,
    /// Swatch 2
    C2,
    /// Swatch 3
    C3,
    /// Swatch 4
    C4,
    /// Swatch 5
    C5,
}

impl Slot {
    /// All slots in display order
    pub const ALL: [Slot; 8] =
        [Slot::Bg, Slot::T1, Slot::T2, Slot::C1, Slot::C2, Slot::C3, Slot::C4, Slot::C5];

    /// Wire name of the slot
    pub fn as_str(&self) -> &'static str {
        match self {
            Slot::Bg => "bg",
            Slot::T1 => "t1",
            Slot::T2 => "t2",
            Slot::C1 => "c1",
            Slot::C2 => "c2",
            Slot::C3 => "c3",
            Slot::C4 => "c4",
            Slot::C5 => "c5",
        }
    }
}

impl std::fmt::Display for Slot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Slot {
    type Err = ThemeError;

    fn from_str(s: &str) -> Result<Self> {
        Slot::ALL
            .into_iter()
            .find(|slot| slot.as_str() == s)
            .ok_or_else(|| ThemeError::Validation(format!("unknown slot: {}", s)))
    }
}

/// The eight color slots of a theme
///
/// Every slot is always populated; JSON missing any slot is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Palette {
    /// Page backdrop
    pub bg: Rgba,
    /// Primary color
    pub t1: Rgba,
    /// Secondary text/accent
    pub t2: Rgba,
    /// Swatch 1
    pub c1: Rgba,
    /// Swatch 2
    pub c2: Rgba,
    /// Swatch 3
    pub c3: Rgba,
    /// Swatch 4
    pub c4: Rgba,
    /// Swatch 5
    pub c5: Rgba,
}

impl Palette {
    /// Get the color in a slot
    pub fn slot(&self, slot: Slot) -> Rgba {
        match slot {
            Slot::Bg => self.bg,
            Slot::T1 => self.t1,
            Slot::T2 => self.t2,
            Slot::C1 => self.c1,
            Slot::C2 => self.c2,
            Slot::C3 => self.c3,
            Slot::C4 => self.c4,
            Slot::C5 => self.c5,
        }
    }

    /// Replace the color in a slot
    pub fn set_slot(&mut self, slot: Slot, color: Rgba) {
        let target = match slot {
            Slot::Bg => &mut self.bg,
            Slot::T1 => &mut self.t1,
            Slot::T2 => &mut self.t2,
            Slot::C1 => &mut self.c1,
            Slot::C2 => &mut self.c2,
            Slot::C3 => &mut self.c3,
            Slot::C4 => &mut self.c4,
            Slot::C5 => &mut self.c5,
        };
        *target = color;
    }

    /// Copy of this palette with one slot replaced
    pub fn with_slot(mut self, slot: Slot, color: Rgba) -> Self {
        self.set_slot(slot, color);
        self
    }

    /// The primary color (`t1`)
    pub fn primary(&self) -> Rgba {
        self.t1
    }
}

// =============================================================================
// Theme
// =============================================================================

/// A named palette
///
/// Serialized flat: `{"name": "...", "bg": {...}, "t1": {...}, ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Theme {
    /// Display name
    pub name: String,
    /// Color slots
    #[serde(flatten)]
    pub palette: Palette,
}

impl Theme {
    /// Create a theme from a name and palette
    pub fn new(name: impl Into<String>, palette: Palette) -> Self {
        Self { name: name.into(), palette }
    }
}

// =============================================================================
// Built-in Themes
// =============================================================================

/// A compiled-in theme
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BuiltinTheme {
    /// Catalog key (used in `d-<key>` references)
    pub key: &'static str,
    /// Display name
    pub name: &'static str,
    /// Color slots
    pub palette: Palette,
}

impl BuiltinTheme {
    /// Materialize as an owned [`Theme`]
    pub fn to_theme(&self) -> Theme {
        Theme::new(self.name, self.palette)
    }
}

/// Key of the theme used whenever a reference cannot be resolved
pub const DEFAULT_THEME_KEY: &str = "Pink";

/// The built-in catalog, in display order
pub const BUILTIN_THEMES: [BuiltinTheme; 5] = [
    BuiltinTheme {
        key: "Pink",
        name: "Sakura Pink",
        palette: Palette {
            bg: Rgba::rgb(253, 242, 248), // #FDF2F8
            t1: Rgba::rgb(244, 114, 182), // #F472B6
            t2: Rgba::rgb(157, 23, 77),   // #9D174D
            c1: Rgba::rgb(252, 231, 243), // #FCE7F3
            c2: Rgba::rgb(251, 207, 232), // #FBCFE8
            c3: Rgba::rgb(249, 168, 212), // #F9A8D4
            c4: Rgba::rgb(236, 72, 153),  // #EC4899
            c5: Rgba::rgb(190, 24, 93),   // #BE185D
        },
    },
    BuiltinTheme {
        key: "Blue",
        name: "Ocean Blue",
        palette: Palette {
            bg: Rgba::rgb(239, 246, 255), // #EFF6FF
            t1: Rgba::rgb(59, 130, 246),  // #3B82F6
            t2: Rgba::rgb(30, 58, 138),   // #1E3A8A
            c1: Rgba::rgb(219, 234, 254), // #DBEAFE
            c2: Rgba::rgb(191, 219, 254), // #BFDBFE
            c3: Rgba::rgb(147, 197, 253), // #93C5FD
            c4: Rgba::rgb(37, 99, 235),   // #2563EB
            c5: Rgba::rgb(29, 78, 216),   // #1D4ED8
        },
    },
    BuiltinTheme {
        key: "Green",
        name: "Forest Green",
        palette: Palette {
            bg: Rgba::rgb(240, 253, 244), // #F0FDF4
            t1: Rgba::rgb(34, 197, 94),   // #22C55E
            t2: Rgba::rgb(20, 83, 45),    // #14532D
            c1: Rgba::rgb(220, 252, 231), // #DCFCE7
            c2: Rgba::rgb(187, 247, 208), // #BBF7D0
            c3: Rgba::rgb(134, 239, 172), // #86EFAC
            c4: Rgba::rgb(22, 163, 74),   // #16A34A
            c5: Rgba::rgb(21, 128, 61),   // #15803D
        },
    },
    BuiltinTheme {
        key: "Purple",
        name: "Lavender",
        palette: Palette {
            bg: Rgba::rgb(250, 245, 255), // #FAF5FF
            t1: Rgba::rgb(168, 85, 247),  // #A855F7
            t2: Rgba::rgb(88, 28, 135),   // #581C87
            c1: Rgba::rgb(243, 232, 255), // #F3E8FF
            c2: Rgba::rgb(233, 213, 255), // #E9D5FF
            c3: Rgba::rgb(216, 180, 254), // #D8B4FE
            c4: Rgba::rgb(147, 51, 234),  // #9333EA
            c5: Rgba::rgb(126, 34, 206),  // #7E22CE
        },
    },
    BuiltinTheme {
        key: "Christmas",
        name: "Merry Christmas",
        palette: Palette {
            bg: Rgba::rgb(254, 242, 242), // #FEF2F2
            t1: Rgba::rgb(220, 38, 38),   // #DC2626
            t2: Rgba::rgb(20, 83, 45),    // #14532D
            c1: Rgba::rgb(254, 226, 226), // #FEE2E2
            c2: Rgba::rgb(187, 247, 208), // #BBF7D0
            c3: Rgba::rgb(252, 165, 165), // #FCA5A5
            c4: Rgba::rgb(22, 163, 74),   // #16A34A
            c5: Rgba::rgb(185, 28, 28),   // #B91C1C
        },
    },
];

/// Look up a built-in theme by key
pub fn builtin_theme(key: &str) -> Option<Theme> {
    BUILTIN_THEMES.iter().find(|t| t.key == key).map(BuiltinTheme::to_theme)
}

/// The fallback theme (`d-Pink`)
pub fn default_theme() -> Theme {
    BUILTIN_THEMES[0].to_theme()
}

// =============================================================================
// Theme References
// =============================================================================

/// A reference to a theme in either catalog
///
/// Serialized as the prefixed legacy string (`d-Pink`, `c-<uuid>`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum ThemeRef {
    /// A built-in theme, by catalog key
    Default {
        /// Built-in catalog key
        key: String,
    },
    /// A user-defined theme, by generated id
    Custom {
        /// Custom theme id
        id: String,
    },
}

impl ThemeRef {
    /// Reference to a built-in theme
    pub fn builtin(key: impl Into<String>) -> Self {
        ThemeRef::Default { key: key.into() }
    }

    /// Reference to a custom theme
    pub fn custom(id: impl Into<String>) -> Self {
        ThemeRef::Custom { id: id.into() }
    }

    /// Whether this references a custom theme
    pub fn is_custom(&self) -> bool {
        matches!(self, ThemeRef::Custom { .. })
    }
}

impl Default for ThemeRef {
    fn default() -> Self {
        ThemeRef::builtin(DEFAULT_THEME_KEY)
    }
}

impl std::fmt::Display for ThemeRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ThemeRef::Default { key } => write!(f, "d-{}", key),
            ThemeRef::Custom { id } => write!(f, "c-{}", id),
        }
    }
}

impl std::str::FromStr for ThemeRef {
    type Err = ThemeError;

    /// Split on the first `-`; ids may contain further dashes
    fn from_str(s: &str) -> Result<Self> {
        match s.split_once('-') {
            Some(("d", key)) if !key.is_empty() => Ok(ThemeRef::builtin(key)),
            Some(("c", id)) if !id.is_empty() => Ok(ThemeRef::custom(id)),
            _ => Err(ThemeError::InvalidRef(s.to_string())),
        }
    }
}

impl From<ThemeRef> for String {
    fn from(value: ThemeRef) -> Self {
        value.to_string()
    }
}

impl TryFrom<String> for ThemeRef {
    type Error = ThemeError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

// =============================================================================
// Catalog
// =============================================================================

/// Built-in themes plus the user's custom themes
///
/// Only the custom side is stored; built-ins are always read from
/// [`BUILTIN_THEMES`]. Serializes as the bare `id -> Theme` map.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ThemeCatalog {
    custom: BTreeMap<String, Theme>,
}

impl ThemeCatalog {
    /// Empty custom catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog with the given custom themes
    pub fn with_custom(custom: BTreeMap<String, Theme>) -> Self {
        Self { custom }
    }

    /// Look up a built-in theme by key
    pub fn builtin(&self, key: &str) -> Option<Theme> {
        builtin_theme(key)
    }

    /// Look up a custom theme by id
    pub fn custom(&self, id: &str) -> Option<&Theme> {
        self.custom.get(id)
    }

    /// Iterate custom themes as `(id, theme)`
    pub fn custom_entries(&self) -> impl Iterator<Item = (&str, &Theme)> {
        self.custom.iter().map(|(id, theme)| (id.as_str(), theme))
    }

    /// Custom themes as a map, e.g. for persistence
    pub fn custom_themes(&self) -> &BTreeMap<String, Theme> {
        &self.custom
    }

    /// Number of custom themes
    pub fn custom_len(&self) -> usize {
        self.custom.len()
    }

    /// Create a custom theme with a fresh 128-bit random id
    ///
    /// The new theme is inserted and returned together with its id.
    pub fn create_custom(&mut self, palette: Palette, name: &str) -> Result<(String, Theme)> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ThemeError::Validation("theme name must not be empty".to_string()));
        }

        let id = Uuid::new_v4().to_string();
        let theme = Theme::new(name, palette);
        self.custom.insert(id.clone(), theme.clone());
        Ok((id, theme))
    }

    /// Replace the colors of a custom theme, keeping its id and name
    pub fn update_custom(&mut self, id: &str, palette: Palette) -> Result<()> {
        let theme = self.custom.get_mut(id).ok_or_else(|| ThemeError::NotFound(id.to_string()))?;
        theme.palette = palette;
        Ok(())
    }

    /// Remove a custom theme
    ///
    /// Idempotent: returns `false` when the id was already absent.
    pub fn delete_custom(&mut self, id: &str) -> bool {
        self.custom.remove(id).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::hex_to_color;
    use std::collections::HashSet;

    fn sample_palette() -> Palette {
        let c = |hex: &str| hex_to_color(hex).unwrap();
        Palette {
            bg: c("#101010"),
            t1: c("#202020"),
            t2: c("#303030"),
            c1: c("#404040"),
            c2: c("#505050"),
            c3: c("#606060"),
            c4: c("#707070"),
            c5: c("#808080"),
        }
    }

    // ==========================================================================
    // Built-in Catalog
    // ==========================================================================

    #[test]
    fn test_builtin_keys_unique() {
        let keys: HashSet<_> = BUILTIN_THEMES.iter().map(|t| t.key).collect();
        assert_eq!(keys.len(), BUILTIN_THEMES.len());
    }

    #[test]
    fn test_default_theme_is_pink() {
        assert_eq!(default_theme(), builtin_theme(DEFAULT_THEME_KEY).unwrap());
        assert_eq!(default_theme().name, "Sakura Pink");
    }

    #[test]
    fn test_builtin_lookup() {
        let christmas = builtin_theme("Christmas").unwrap();
        assert_eq!(christmas.name, "Merry Christmas");
        assert_eq!(christmas.palette.t1, hex_to_color("#DC2626").unwrap());
        assert!(builtin_theme("pink").is_none());
        assert!(builtin_theme("Missing").is_none());
    }

    // ==========================================================================
    // Palette
    // ==========================================================================

    #[test]
    fn test_palette_slots() {
        let palette = sample_palette();
        let values: Vec<_> = Slot::ALL.iter().map(|s| palette.slot(*s)).collect();
        assert_eq!(values.len(), 8);
        assert_eq!(palette.primary(), palette.t1);

        let edited = palette.with_slot(Slot::C3, Rgba::WHITE);
        assert_eq!(edited.c3, Rgba::WHITE);
        assert_eq!(edited.c2, palette.c2);
        assert_eq!(palette.c3, hex_to_color("#606060").unwrap());
    }

    #[test]
    fn test_slot_parse() {
        assert_eq!("t1".parse::<Slot>().unwrap(), Slot::T1);
        assert_eq!(Slot::C5.to_string(), "c5");
        assert!("c6".parse::<Slot>().is_err());
    }

    #[test]
    fn test_theme_serialization_is_flat() {
        let theme = Theme::new("Night", sample_palette());
        let value = serde_json::to_value(&theme).unwrap();
        assert_eq!(value["name"], "Night");
        assert_eq!(value["bg"]["r"], 16);
        assert_eq!(value["c5"]["b"], 128);

        let back: Theme = serde_json::from_value(value).unwrap();
        assert_eq!(back, theme);
    }

    #[test]
    fn test_partial_theme_rejected() {
        let mut value = serde_json::to_value(Theme::new("Broken", sample_palette())).unwrap();
        value.as_object_mut().unwrap().remove("c4");
        assert!(serde_json::from_value::<Theme>(value).is_err());
    }

    // ==========================================================================
    // Theme References
    // ==========================================================================

    #[test]
    fn test_theme_ref_parse() {
        assert_eq!("d-Pink".parse::<ThemeRef>().unwrap(), ThemeRef::builtin("Pink"));

        let id = "0b6f6c5e-3f7e-4b8e-9a51-2f4d9f0a1c11";
        let parsed: ThemeRef = format!("c-{}", id).parse().unwrap();
        assert_eq!(parsed, ThemeRef::custom(id));
        assert!(parsed.is_custom());
    }

    #[test]
    fn test_theme_ref_rejects_malformed() {
        for bad in ["", "Pink", "x-Pink", "d-", "c-", "-Pink", "dPink"] {
            assert!(bad.parse::<ThemeRef>().is_err(), "accepted {:?}", bad);
        }
    }

    #[test]
    fn test_theme_ref_serializes_as_prefixed_string() {
        let json = serde_json::to_string(&ThemeRef::builtin("Blue")).unwrap();
        assert_eq!(json, "\"d-Blue\"");

        let back: ThemeRef = serde_json::from_str("\"c-abc\"").unwrap();
        assert_eq!(back, ThemeRef::custom("abc"));
        assert_eq!(ThemeRef::default().to_string(), "d-Pink");
    }

    // ==========================================================================
    // Custom Catalog
    // ==========================================================================

    #[test]
    fn test_create_custom() {
        let mut catalog = ThemeCatalog::new();
        let (id, theme) = catalog.create_custom(sample_palette(), "My Theme").unwrap();

        assert_eq!(theme.name, "My Theme");
        assert_eq!(theme.palette, sample_palette());
        assert_eq!(catalog.custom(&id), Some(&theme));
        assert!(Uuid::parse_str(&id).is_ok());
    }

    #[test]
    fn test_create_custom_ids_unique() {
        let mut catalog = ThemeCatalog::new();
        let ids: HashSet<_> = (0..50)
            .map(|i| catalog.create_custom(sample_palette(), &format!("T{}", i)).unwrap().0)
            .collect();
        assert_eq!(ids.len(), 50);
        assert_eq!(catalog.custom_len(), 50);
    }

    #[test]
    fn test_create_custom_rejects_empty_name() {
        let mut catalog = ThemeCatalog::new();
        assert!(matches!(
            catalog.create_custom(sample_palette(), ""),
            Err(ThemeError::Validation(_))
        ));
        assert!(matches!(
            catalog.create_custom(sample_palette(), "   "),
            Err(ThemeError::Validation(_))
        ));
        assert_eq!(catalog.custom_len(), 0);
    }

    #[test]
    fn test_update_custom_preserves_name() {
        let mut catalog = ThemeCatalog::new();
        let (id, _) = catalog.create_custom(default_theme().palette, "Keep Me").unwrap();

        catalog.update_custom(&id, sample_palette()).unwrap();

        let theme = catalog.custom(&id).unwrap();
        assert_eq!(theme.name, "Keep Me");
        assert_eq!(theme.palette, sample_palette());
    }

    #[test]
    fn test_update_missing_custom() {
        let mut catalog = ThemeCatalog::new();
        assert_eq!(
            catalog.update_custom("ghost", sample_palette()),
            Err(ThemeError::NotFound("ghost".to_string()))
        );
    }

    #[test]
    fn test_delete_custom_idempotent() {
        let mut catalog = ThemeCatalog::new();
        let (id, _) = catalog.create_custom(sample_palette(), "Gone").unwrap();
        catalog.create_custom(sample_palette(), "Stays").unwrap();

        assert!(catalog.delete_custom(&id));
        let after_once = catalog.clone();

        assert!(!catalog.delete_custom(&id));
        assert_eq!(catalog, after_once);
        assert_eq!(catalog.custom_len(), 1);
    }

    #[test]
    fn test_catalog_serializes_as_map() {
        let mut custom = BTreeMap::new();
        custom.insert("abc".to_string(), Theme::new("A", sample_palette()));
        let catalog = ThemeCatalog::with_custom(custom);

        let value = serde_json::to_value(&catalog).unwrap();
        assert_eq!(value["abc"]["name"], "A");

        let back: ThemeCatalog = serde_json::from_value(value).unwrap();
        assert_eq!(back, catalog);
    }
}
