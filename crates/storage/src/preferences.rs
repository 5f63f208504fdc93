//! Per-user theme preferences and the remote preference store
//!
//! Signed-in users keep their active theme, background and custom themes in a
//! remote store keyed by user id. This module defines the stored record, the
//! [`PreferenceStore`] contract the rest of the app talks to, and a sled-backed
//! implementation used by the CLI and tests.

use app_ui::{Background, Theme, ThemeRef};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;

use crate::kv::{KvError, KvStore};

/// Preference store errors
#[derive(Debug, Error)]
pub enum PreferenceError {
    /// Underlying key-value store failed
    #[error("Storage error: {0}")]
    Storage(#[from] KvError),

    /// Remote service could not be reached or refused the write
    #[error("Preference store unavailable: {0}")]
    Unavailable(String),

    /// User id was empty or malformed
    #[error("Invalid user id: {0:?}")]
    InvalidUser(String),
}

/// Result type for preference operations
pub type Result<T> = std::result::Result<T, PreferenceError>;

/// The stored preference record for one user
///
/// Field names match the existing remote documents:
/// `{ "background": "none", "theme": "d-Pink", "customThemes": { ... } }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPreferences {
    /// Selected background overlay
    #[serde(default)]
    pub background: Background,

    /// Active theme reference in prefixed string form
    #[serde(default = "default_theme_ref")]
    pub theme: String,

    /// Custom themes by id
    #[serde(default)]
    pub custom_themes: BTreeMap<String, Theme>,
}

impl Default for UserPreferences {
    fn default() -> Self {
        Self {
            background: Background::None,
            theme: default_theme_ref(),
            custom_themes: BTreeMap::new(),
        }
    }
}

impl UserPreferences {
    /// Parse the stored theme reference
    ///
    /// Returns `None` for malformed strings; callers fall back to the default
    /// theme.
    pub fn theme_ref(&self) -> Option<ThemeRef> {
        self.theme.parse().ok()
    }
}

fn default_theme_ref() -> String {
    ThemeRef::default().to_string()
}

/// Asynchronous get/set access to per-user preferences
///
/// Last write wins; implementations do no conflict resolution.
#[async_trait]
pub trait PreferenceStore: Send + Sync {
    /// Load the record for a user, `None` if the user has none yet
    async fn load(&self, user_id: &str) -> Result<Option<UserPreferences>>;

    /// Replace the record for a user
    async fn save(&self, user_id: &str, preferences: &UserPreferences) -> Result<()>;
}

/// Preference store backed by the local key-value store
///
/// Records live under `account:<user_id>:preferences`.
#[derive(Clone)]
pub struct KvPreferenceStore {
    kv: Arc<KvStore>,
}

impl KvPreferenceStore {
    /// Create a store on top of a key-value store
    pub fn new(kv: Arc<KvStore>) -> Self {
        Self { kv }
    }

    fn check_user(user_id: &str) -> Result<()> {
        if user_id.trim().is_empty() {
            return Err(PreferenceError::InvalidUser(user_id.to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl PreferenceStore for KvPreferenceStore {
    async fn load(&self, user_id: &str) -> Result<Option<UserPreferences>> {
        Self::check_user(user_id)?;
        Ok(self.kv.get_scoped(&["account", user_id, "preferences"])?)
    }

    async fn save(&self, user_id: &str, preferences: &UserPreferences) -> Result<()> {
        Self::check_user(user_id)?;
        self.kv.set_scoped(&["account", user_id, "preferences"], preferences)?;
        tracing::debug!(
            user_id,
            custom_themes = preferences.custom_themes.len(),
            "Saved user preferences"
        );
        Ok(())
    }
}
