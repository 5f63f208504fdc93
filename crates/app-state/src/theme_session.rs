//! Theme session: selection state plus remote persistence
//!
//! Wraps [`SelectionState`] with the signed-in user and the remote
//! [`PreferenceStore`]. Custom-theme mutations are local-first: the in-memory
//! change always takes effect, then (when signed in) the whole preference
//! record is written to the store. A failed write raises an error
//! notification and is logged; it is never rolled back.

use app_ui::{Background, Palette, Rgba, Slot, ThemeError, ThemeRef};
use std::sync::Arc;
use storage::{PreferenceError, PreferenceStore};
use thiserror::Error;

use crate::notification::Notifier;
use crate::selection::SelectionState;

/// Theme session errors
#[derive(Debug, Error)]
pub enum SessionError {
    /// Theme model rejected the change
    #[error("Theme error: {0}")]
    Theme(#[from] ThemeError),

    /// A new theme needs a name before it can be saved
    #[error("A name is required to save a built-in theme as a custom theme")]
    NameRequired,
}

/// Result type for theme session operations
pub type Result<T> = std::result::Result<T, SessionError>;

/// What happened when a user signed in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignInOutcome {
    /// Remote preferences existed and replaced local state
    Merged,
    /// No remote record existed; local state was written as the first record
    Seeded,
    /// The store could not be read; local state is kept
    Unavailable,
}

/// What [`ThemeSession::save_active`] did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    /// The active custom theme was overwritten with the working palette
    Updated(String),
    /// A new custom theme was created from the working palette
    Created(String),
}

/// User-facing messages
const MSG_SAVED: &str = "Theme saved";
const MSG_SAVE_FAILED: &str = "Could not save your themes; changes are kept on this device";
const MSG_LOAD_FAILED: &str = "Could not load your saved themes";
const MSG_NAME_REQUIRED: &str = "Please enter a theme name";
const MSG_THEME_MISSING: &str = "This theme no longer exists";

/// Selection state bound to an optional signed-in user
pub struct ThemeSession {
    selection: SelectionState,
    user_id: Option<String>,
    store: Arc<dyn PreferenceStore>,
    notifier: Notifier,
}

impl ThemeSession {
    /// Create a signed-out session with default selection
    pub fn new(store: Arc<dyn PreferenceStore>, notifier: Notifier) -> Self {
        Self { selection: SelectionState::new(), user_id: None, store, notifier }
    }

    /// Current selection state
    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    /// Notification channels
    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    /// Signed-in user id
    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    /// Whether a user is signed in
    pub fn is_signed_in(&self) -> bool {
        self.user_id.is_some()
    }

    /// Sign a user in and load their preferences
    ///
    /// Remote preferences are authoritative and replace local state entirely.
    /// Users without a stored record get the current local state written as
    /// their first record.
    pub async fn sign_in(&mut self, user_id: impl Into<String>) -> SignInOutcome {
        let user_id = user_id.into();
        let loaded = self.store.load(&user_id).await;
        self.user_id = Some(user_id);

        match loaded {
            Ok(Some(remote)) => {
                tracing::info!(
                    theme = %remote.theme,
                    custom_themes = remote.custom_themes.len(),
                    "Merged remote preferences"
                );
                self.selection.merge_remote(&remote);
                SignInOutcome::Merged
            }
            Ok(None) => {
                self.persist().await;
                SignInOutcome::Seeded
            }
            Err(e) => {
                tracing::warn!("Failed to load preferences: {}", e);
                self.notifier.error(MSG_LOAD_FAILED);
                SignInOutcome::Unavailable
            }
        }
    }

    /// Sign out; local state stays as it is
    pub fn sign_out(&mut self) {
        self.user_id = None;
    }

    /// Activate a theme and persist the choice
    pub async fn select(&mut self, reference: ThemeRef) {
        self.selection.select(reference);
        self.persist().await;
    }

    /// Change the background overlay and persist the choice
    pub async fn select_background(&mut self, background: Background) {
        self.selection.set_background(background);
        self.persist().await;
    }

    /// Change one slot of the working palette
    pub fn edit_slot(&mut self, slot: Slot, color: Rgba) {
        self.selection.edit_slot(slot, color);
    }

    /// Save the working palette as a new custom theme and activate it
    pub async fn create_custom(&mut self, name: &str) -> Result<String> {
        match self.selection.create_custom(name) {
            Ok((id, _)) => {
                self.after_mutation().await;
                Ok(id)
            }
            Err(e) => {
                self.notifier.error(MSG_NAME_REQUIRED);
                Err(e.into())
            }
        }
    }

    /// Replace the colors of a custom theme
    ///
    /// Unknown ids are a no-op and return `false`.
    pub async fn update_custom(&mut self, id: &str, palette: Palette) -> bool {
        match self.selection.update_custom(id, palette) {
            Ok(()) => {
                self.after_mutation().await;
                true
            }
            Err(e) => {
                tracing::debug!("Ignoring update: {}", e);
                false
            }
        }
    }

    /// Delete a custom theme; idempotent
    pub async fn delete_custom(&mut self, id: &str) -> bool {
        let removed = self.selection.delete_custom(id);
        if removed {
            self.after_mutation().await;
        }
        removed
    }

    /// Save the working palette
    ///
    /// A custom active theme is overwritten in place. A built-in active theme
    /// is never modified; the palette is saved as a new custom theme instead,
    /// which requires `name`. An active custom reference whose theme is gone
    /// from the catalog fails with [`ThemeError::NotFound`].
    pub async fn save_active(&mut self, name: Option<&str>) -> Result<SaveOutcome> {
        match self.selection.active().clone() {
            ThemeRef::Custom { id } => {
                let palette = *self.selection.working_palette();
                if self.update_custom(&id, palette).await {
                    Ok(SaveOutcome::Updated(id))
                } else {
                    self.notifier.error(MSG_THEME_MISSING);
                    Err(ThemeError::NotFound(id).into())
                }
            }
            ThemeRef::Default { .. } => match name {
                Some(name) => Ok(SaveOutcome::Created(self.create_custom(name).await?)),
                None => {
                    self.notifier.error(MSG_NAME_REQUIRED);
                    Err(SessionError::NameRequired)
                }
            },
        }
    }

    async fn after_mutation(&self) {
        self.notifier.success(MSG_SAVED);
        self.persist().await;
    }

    /// Write the full preference record when signed in
    async fn persist(&self) {
        let Some(user_id) = self.user_id.as_deref() else {
            return;
        };

        let preferences = self.selection.to_preferences();
        if let Err(e) = self.store.save(user_id, &preferences).await {
            log_persist_failure(&e);
            self.notifier.error(MSG_SAVE_FAILED);
        }
    }
}

fn log_persist_failure(error: &PreferenceError) {
    tracing::warn!("Failed to persist preferences: {}", error);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notification::Channel;
    use app_ui::{default_theme, Theme};
    use async_trait::async_trait;
    use mockall::mock;
    use storage::{KvPreferenceStore, KvStore, UserPreferences};

    mock! {
        pub Store {}

        #[async_trait]
        impl PreferenceStore for Store {
            async fn load(&self, user_id: &str) -> storage::preferences::Result<Option<UserPreferences>>;
            async fn save(
                &self,
                user_id: &str,
                preferences: &UserPreferences,
            ) -> storage::preferences::Result<()>;
        }
    }

    fn kv_session() -> (ThemeSession, Arc<KvPreferenceStore>) {
        let store = Arc::new(KvPreferenceStore::new(Arc::new(KvStore::in_memory().unwrap())));
        (ThemeSession::new(store.clone(), Notifier::default()), store)
    }

    // ==========================================================================
    // Sign-in
    // ==========================================================================

    #[tokio::test]
    async fn test_sign_in_merges_remote() {
        let (mut session, store) = kv_session();
        let mut remote = UserPreferences { theme: "d-Blue".to_string(), ..Default::default() };
        remote.custom_themes.insert("r1".to_string(), Theme::new("Remote", default_theme().palette));
        store.save("user", &remote).await.unwrap();

        session.create_custom("Local while signed out").await.unwrap();

        assert_eq!(session.sign_in("user").await, SignInOutcome::Merged);
        assert_eq!(session.selection().active(), &ThemeRef::builtin("Blue"));
        assert_eq!(session.selection().catalog().custom_len(), 1);
        assert!(session.selection().catalog().custom("r1").is_some());
    }

    #[tokio::test]
    async fn test_sign_in_seeds_new_user() {
        let (mut session, store) = kv_session();
        session.select(ThemeRef::builtin("Christmas")).await;

        assert_eq!(session.sign_in("fresh").await, SignInOutcome::Seeded);

        let stored = store.load("fresh").await.unwrap().unwrap();
        assert_eq!(stored.theme, "d-Christmas");
    }

    #[tokio::test]
    async fn test_sign_in_store_unavailable() {
        let mut store = MockStore::new();
        store
            .expect_load()
            .returning(|_| Err(PreferenceError::Unavailable("offline".to_string())));
        store.expect_save().never();

        let mut session = ThemeSession::new(Arc::new(store), Notifier::default());
        session.select(ThemeRef::builtin("Green")).await;

        assert_eq!(session.sign_in("user").await, SignInOutcome::Unavailable);
        assert_eq!(session.selection().active(), &ThemeRef::builtin("Green"));
        assert!(session.notifier().is_visible(Channel::Error));
    }

    // ==========================================================================
    // Mutations and Persistence
    // ==========================================================================

    #[tokio::test]
    async fn test_mutations_persist_when_signed_in() {
        let (mut session, store) = kv_session();
        session.sign_in("user").await;

        let id = session.create_custom("Mine").await.unwrap();
        let stored = store.load("user").await.unwrap().unwrap();
        assert_eq!(stored.theme, format!("c-{}", id));
        assert_eq!(stored.custom_themes[&id].name, "Mine");

        assert!(session.delete_custom(&id).await);
        let stored = store.load("user").await.unwrap().unwrap();
        assert!(stored.custom_themes.is_empty());
        assert_eq!(stored.theme, "d-Pink");
    }

    #[tokio::test]
    async fn test_selection_persists_when_signed_in() {
        let (mut session, store) = kv_session();
        session.sign_in("user").await;

        session.select(ThemeRef::builtin("Purple")).await;
        session.select_background(Background::Ordaments).await;

        let stored = store.load("user").await.unwrap().unwrap();
        assert_eq!(stored.theme, "d-Purple");
        assert_eq!(stored.background, Background::Ordaments);
    }

    #[tokio::test]
    async fn test_mutations_not_persisted_when_signed_out() {
        let mut store = MockStore::new();
        store.expect_save().never();

        let mut session = ThemeSession::new(Arc::new(store), Notifier::default());
        let id = session.create_custom("Offline").await.unwrap();
        assert!(session.selection().catalog().custom(&id).is_some());
    }

    #[tokio::test]
    async fn test_persist_failure_keeps_local_change() {
        let mut store = MockStore::new();
        store.expect_load().returning(|_| Ok(Some(UserPreferences::default())));
        store
            .expect_save()
            .times(1)
            .returning(|_, _| Err(PreferenceError::Unavailable("write rejected".to_string())));

        let mut session = ThemeSession::new(Arc::new(store), Notifier::default());
        session.sign_in("user").await;

        let id = session.create_custom("Kept").await.unwrap();

        assert_eq!(session.selection().active(), &ThemeRef::custom(id.clone()));
        assert_eq!(session.selection().theme().name, "Kept");
        assert_eq!(
            session.notifier().current(Channel::Error),
            Some(MSG_SAVE_FAILED.to_string())
        );
    }

    #[tokio::test]
    async fn test_create_custom_empty_name_notifies() {
        let (mut session, _) = kv_session();
        let result = session.create_custom("").await;

        assert!(matches!(result, Err(SessionError::Theme(ThemeError::Validation(_)))));
        assert!(session.notifier().is_visible(Channel::Error));
        assert!(!session.notifier().is_visible(Channel::Success));
    }

    #[tokio::test]
    async fn test_update_unknown_is_noop() {
        let mut store = MockStore::new();
        store.expect_save().never();
        let mut session = ThemeSession::new(Arc::new(store), Notifier::default());

        assert!(!session.update_custom("ghost", default_theme().palette).await);
    }

    #[tokio::test]
    async fn test_delete_twice_persists_once() {
        let mut store = MockStore::new();
        store.expect_load().returning(|_| Ok(Some(UserPreferences::default())));
        store.expect_save().times(2).returning(|_, _| Ok(()));

        let mut session = ThemeSession::new(Arc::new(store), Notifier::default());
        session.sign_in("user").await;

        // One save for the create, one for the first delete
        let id = session.create_custom("Temp").await.unwrap();
        assert!(session.delete_custom(&id).await);
        assert!(!session.delete_custom(&id).await);
    }

    // ==========================================================================
    // Save Button
    // ==========================================================================

    #[tokio::test]
    async fn test_save_active_custom_updates() {
        let (mut session, _) = kv_session();
        let id = session.create_custom("Mine").await.unwrap();
        session.edit_slot(Slot::C1, Rgba::BLACK);

        let outcome = session.save_active(None).await.unwrap();

        assert_eq!(outcome, SaveOutcome::Updated(id.clone()));
        let saved = session.selection().catalog().custom(&id).unwrap();
        assert_eq!(saved.palette.c1, Rgba::BLACK);
        assert_eq!(saved.name, "Mine");
    }

    #[tokio::test]
    async fn test_save_active_dangling_custom_ref() {
        let (mut session, store) = kv_session();
        let remote = UserPreferences { theme: "c-ghost".to_string(), ..Default::default() };
        store.save("alice", &remote).await.unwrap();
        assert_eq!(session.sign_in("alice").await, SignInOutcome::Merged);
        assert_eq!(session.selection().active(), &ThemeRef::custom("ghost"));

        session.edit_slot(Slot::C1, Rgba::BLACK);
        let result = session.save_active(None).await;

        assert!(matches!(
            result,
            Err(SessionError::Theme(ThemeError::NotFound(ref id))) if id == "ghost"
        ));
        assert_eq!(session.notifier().current(Channel::Error), Some(MSG_THEME_MISSING.to_string()));
        assert_eq!(session.notifier().current(Channel::Success), None);
        assert_eq!(session.selection().catalog().custom_len(), 0);
        assert_eq!(store.load("alice").await.unwrap(), Some(remote));
    }

    #[tokio::test]
    async fn test_save_active_builtin_requires_name() {
        let (mut session, _) = kv_session();
        session.edit_slot(Slot::C1, Rgba::BLACK);

        assert!(matches!(session.save_active(None).await, Err(SessionError::NameRequired)));
        assert_eq!(session.selection().catalog().custom_len(), 0);

        let outcome = session.save_active(Some("From Pink")).await.unwrap();
        let SaveOutcome::Created(id) = outcome else {
            panic!("expected a new custom theme");
        };
        assert_eq!(session.selection().catalog().custom(&id).unwrap().palette.c1, Rgba::BLACK);
        // The built-in stays untouched
        assert_eq!(app_ui::builtin_theme("Pink").unwrap(), default_theme());
    }

    #[tokio::test]
    async fn test_sign_out_keeps_state() {
        let (mut session, _) = kv_session();
        session.sign_in("user").await;
        session.select_background(Background::Mistletoe).await;
        session.sign_out();

        assert!(!session.is_signed_in());
        assert_eq!(session.selection().background(), Background::Mistletoe);
    }
}
