//! Application state for Schedule Studio
//!
//! This crate holds the theme selection state, the signed-in theme session
//! that persists custom themes, and the auto-dismissing notification
//! channels shared with the image pipeline.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod notification;
pub mod selection;
pub mod theme_session;

pub use notification::{Channel, Notifier, DEFAULT_NOTIFICATION_DURATION};
pub use selection::{resolve, resolve_ref, SelectionState};
pub use theme_session::{SaveOutcome, SessionError, SignInOutcome, ThemeSession};
