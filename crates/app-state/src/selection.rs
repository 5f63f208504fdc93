//! Theme selection state
//!
//! Tracks which theme is active, the palette currently being edited, and the
//! selected background. The materialized [`Theme`] is always re-derived from
//! the catalog after the active reference changes or the catalog is mutated,
//! so it can never point at stale data.
//!
//! # Usage
//!
//! ```rust
//! use app_state::selection::{resolve, SelectionState};
//! use app_ui::{ThemeCatalog, ThemeRef};
//!
//! let catalog = ThemeCatalog::new();
//! assert_eq!(resolve("d-Christmas", &catalog).name, "Merry Christmas");
//! assert_eq!(resolve("nonsense", &catalog).name, "Sakura Pink");
//!
//! let mut state = SelectionState::new();
//! state.select(ThemeRef::builtin("Blue"));
//! assert_eq!(state.theme().name, "Ocean Blue");
//! ```

use app_ui::{
    default_theme, Background, Palette, Rgba, Slot, Theme, ThemeCatalog, ThemeError, ThemeRef,
};
use storage::UserPreferences;

/// Resolve a prefixed reference string against a catalog
///
/// Never fails: malformed references and references to missing themes fall
/// back to the default theme.
pub fn resolve(reference: &str, catalog: &ThemeCatalog) -> Theme {
    match reference.parse::<ThemeRef>() {
        Ok(theme_ref) => resolve_ref(&theme_ref, catalog),
        Err(_) => default_theme(),
    }
}

/// Resolve a parsed reference against a catalog, falling back to the default
pub fn resolve_ref(reference: &ThemeRef, catalog: &ThemeCatalog) -> Theme {
    let found = match reference {
        ThemeRef::Default { key } => catalog.builtin(key),
        ThemeRef::Custom { id } => catalog.custom(id).cloned(),
    };
    found.unwrap_or_else(default_theme)
}

/// Merge remote preferences over local state
///
/// Remote is authoritative: its custom themes and active reference replace
/// the local ones wholesale. A malformed remote reference becomes the default
/// reference.
pub fn merge_remote(
    _local_catalog: ThemeCatalog,
    _local_ref: ThemeRef,
    remote: &UserPreferences,
) -> (ThemeCatalog, ThemeRef) {
    let catalog = ThemeCatalog::with_custom(remote.custom_themes.clone());
    let reference = remote.theme_ref().unwrap_or_default();
    (catalog, reference)
}

/// Active theme, working palette and background for one session
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionState {
    catalog: ThemeCatalog,
    active: ThemeRef,
    theme: Theme,
    working: Palette,
    background: Background,
}

impl Default for SelectionState {
    fn default() -> Self {
        Self::new()
    }
}

impl SelectionState {
    /// Default theme, empty custom catalog, no background
    pub fn new() -> Self {
        Self::with_catalog(ThemeCatalog::new(), ThemeRef::default())
    }

    /// Start from an existing catalog and active reference
    pub fn with_catalog(catalog: ThemeCatalog, active: ThemeRef) -> Self {
        let theme = resolve_ref(&active, &catalog);
        let working = theme.palette;
        Self { catalog, active, theme, working, background: Background::None }
    }

    /// Active theme reference
    pub fn active(&self) -> &ThemeRef {
        &self.active
    }

    /// Materialized active theme
    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    /// Palette being edited; this is what previews and render requests use
    pub fn working_palette(&self) -> &Palette {
        &self.working
    }

    /// Theme catalog
    pub fn catalog(&self) -> &ThemeCatalog {
        &self.catalog
    }

    /// Selected background
    pub fn background(&self) -> Background {
        self.background
    }

    /// Whether the working palette differs from the active theme
    pub fn has_unsaved_edits(&self) -> bool {
        self.working != self.theme.palette
    }

    /// Activate a theme
    pub fn select(&mut self, reference: ThemeRef) {
        self.active = reference;
        self.refresh();
    }

    /// Activate a theme by prefixed string; malformed input selects the default
    pub fn select_str(&mut self, reference: &str) {
        self.select(reference.parse().unwrap_or_default());
    }

    /// Change the background overlay
    pub fn set_background(&mut self, background: Background) {
        self.background = background;
    }

    /// Change one slot of the working palette
    pub fn edit_slot(&mut self, slot: Slot, color: Rgba) {
        self.working.set_slot(slot, color);
    }

    /// Save the working palette as a new custom theme and activate it
    pub fn create_custom(&mut self, name: &str) -> Result<(String, Theme), ThemeError> {
        let (id, theme) = self.catalog.create_custom(self.working, name)?;
        self.active = ThemeRef::custom(id.clone());
        self.refresh();
        Ok((id, theme))
    }

    /// Replace the colors of a custom theme
    pub fn update_custom(&mut self, id: &str, palette: Palette) -> Result<(), ThemeError> {
        self.catalog.update_custom(id, palette)?;
        self.refresh();
        Ok(())
    }

    /// Delete a custom theme; deleting the active theme selects the default
    pub fn delete_custom(&mut self, id: &str) -> bool {
        let removed = self.catalog.delete_custom(id);
        if matches!(&self.active, ThemeRef::Custom { id: active } if active == id) {
            self.active = ThemeRef::default();
        }
        self.refresh();
        removed
    }

    /// Replace local themes, active reference and background with remote ones
    pub fn merge_remote(&mut self, remote: &UserPreferences) {
        let local_catalog = std::mem::take(&mut self.catalog);
        let local_ref = std::mem::take(&mut self.active);
        let (catalog, active) = merge_remote(local_catalog, local_ref, remote);

        self.catalog = catalog;
        self.active = active;
        self.background = remote.background;
        self.refresh();
    }

    /// Snapshot for the preference store
    pub fn to_preferences(&self) -> UserPreferences {
        UserPreferences {
            background: self.background,
            theme: self.active.to_string(),
            custom_themes: self.catalog.custom_themes().clone(),
        }
    }

    /// Re-derive the materialized theme; edits survive only if it is unchanged
    fn refresh(&mut self) {
        let theme = resolve_ref(&self.active, &self.catalog);
        if theme != self.theme {
            self.working = theme.palette;
        }
        self.theme = theme;
    }
}
