//! Storage layer for Schedule Studio
//!
//! This crate provides the device-local key-value store (last submitted
//! room) and the per-user preference store that holds custom themes.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod kv;
pub mod preferences;

pub use kv::{KvConfig, KvError, KvStore, LocalStore, ROOM_KEY};
pub use preferences::{
    KvPreferenceStore, PreferenceError, PreferenceStore, UserPreferences,
};
