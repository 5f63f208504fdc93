//! Key-value store for local settings
//!
//! This module provides a small, typed key-value store on top of sled. Values
//! are stored either as JSON ([`KvStore::get`]/[`KvStore::set`]) or as plain
//! UTF-8 text ([`KvStore::get_text`]/[`KvStore::set_text`]) for keys shared
//! with other clients that expect raw strings.

use serde::{de::DeserializeOwned, Serialize};
use sled::Db;
use std::sync::Arc;
use thiserror::Error;

/// Key-value store error types
#[derive(Debug, Error)]
pub enum KvError {
    /// Sled database error
    #[error("Database error: {0}")]
    Database(#[from] sled::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Stored bytes were not valid UTF-8 text
    #[error("Invalid text value for key: {0}")]
    InvalidText(String),
}

/// Result type for key-value operations
pub type Result<T> = std::result::Result<T, KvError>;

/// Key-value store configuration
#[derive(Debug, Clone)]
pub struct KvConfig {
    /// Database path
    pub path: String,
    /// Cache capacity in bytes
    pub cache_capacity: u64,
    /// Enable compression
    pub use_compression: bool,
    /// Background flush interval in milliseconds (None disables it)
    pub flush_every_ms: Option<u64>,
}

impl Default for KvConfig {
    fn default() -> Self {
        Self {
            path: "schedule_studio_kv.db".to_string(),
            cache_capacity: 8 * 1024 * 1024, // 8MB
            use_compression: true,
            flush_every_ms: Some(500),
        }
    }
}

impl KvConfig {
    /// Create a new configuration with a custom path
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into(), ..Default::default() }
    }

    /// Set cache capacity in bytes
    pub fn cache_capacity(mut self, bytes: u64) -> Self {
        self.cache_capacity = bytes;
        self
    }

    /// Enable or disable compression
    pub fn use_compression(mut self, enabled: bool) -> Self {
        self.use_compression = enabled;
        self
    }

    /// Set flush interval in milliseconds
    pub fn flush_every_ms(mut self, ms: Option<u64>) -> Self {
        self.flush_every_ms = ms;
        self
    }
}

/// Key-value store implementation
pub struct KvStore {
    db: Arc<Db>,
    separator: &'static str,
}

impl KvStore {
    /// Create a new key-value store with configuration
    pub fn new(config: KvConfig) -> Result<Self> {
        let db = sled::Config::new()
            .path(&config.path)
            .cache_capacity(config.cache_capacity)
            .use_compression(config.use_compression)
            .flush_every_ms(config.flush_every_ms)
            .open()?;
        tracing::debug!(path = %config.path, "Opened key-value store");

        Ok(Self { db: Arc::new(db), separator: ":" })
    }

    /// Create an in-memory key-value store (for testing)
    pub fn in_memory() -> Result<Self> {
        let db = sled::Config::new().temporary(true).open()?;

        Ok(Self { db: Arc::new(db), separator: ":" })
    }

    /// Get a JSON value by key
    pub fn get<T>(&self, key: &str) -> Result<Option<T>>
    where
        T: DeserializeOwned,
    {
        match self.db.get(key.as_bytes())? {
            Some(bytes) => {
                let value: T = serde_json::from_slice(&bytes)?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    /// Get a JSON value by scoped key (e.g., ["account", "42", "preferences"])
    pub fn get_scoped<T>(&self, scopes: &[&str]) -> Result<Option<T>>
    where
        T: DeserializeOwned,
    {
        let key = scopes.join(self.separator);
        self.get(&key)
    }

    /// Set a JSON value by key
    pub fn set<T>(&self, key: &str, value: &T) -> Result<()>
    where
        T: Serialize,
    {
        let bytes = serde_json::to_vec(value)?;
        self.db.insert(key.as_bytes(), bytes)?;
        Ok(())
    }

    /// Set a JSON value by scoped key
    pub fn set_scoped<T>(&self, scopes: &[&str], value: &T) -> Result<()>
    where
        T: Serialize,
    {
        let key = scopes.join(self.separator);
        self.set(&key, value)
    }

    /// Get a plain text value by key
    pub fn get_text(&self, key: &str) -> Result<Option<String>> {
        match self.db.get(key.as_bytes())? {
            Some(bytes) => String::from_utf8(bytes.to_vec())
                .map(Some)
                .map_err(|_| KvError::InvalidText(key.to_string())),
            None => Ok(None),
        }
    }

    /// Set a plain text value by key
    pub fn set_text(&self, key: &str, value: &str) -> Result<()> {
        self.db.insert(key.as_bytes(), value.as_bytes())?;
        Ok(())
    }

    /// Remove a value by key
    pub fn remove(&self, key: &str) -> Result<bool> {
        Ok(self.db.remove(key.as_bytes())?.is_some())
    }

    /// Remove a value by scoped key
    pub fn remove_scoped(&self, scopes: &[&str]) -> Result<bool> {
        let key = scopes.join(self.separator);
        self.remove(&key)
    }

    /// Check if a key exists
    pub fn contains(&self, key: &str) -> Result<bool> {
        Ok(self.db.contains_key(key.as_bytes())?)
    }

    /// Flush pending writes to disk
    pub fn flush(&self) -> Result<()> {
        self.db.flush()?;
        Ok(())
    }

    /// Number of stored keys
    pub fn len(&self) -> usize {
        self.db.len()
    }

    /// Whether the store is empty
    pub fn is_empty(&self) -> bool {
        self.db.is_empty()
    }
}

/// Key under which the last submitted room is stored
pub const ROOM_KEY: &str = "room";

/// Device-local settings that survive restarts
///
/// The last submitted room is stored as plain text under [`ROOM_KEY`].
#[derive(Clone)]
pub struct LocalStore {
    kv: Arc<KvStore>,
}

impl LocalStore {
    /// Create a new local store
    pub fn new(kv: Arc<KvStore>) -> Self {
        Self { kv }
    }

    /// Last submitted room, if any
    pub fn last_room(&self) -> Result<Option<String>> {
        self.kv.get_text(ROOM_KEY)
    }

    /// Remember the submitted room
    pub fn set_last_room(&self, room: &str) -> Result<()> {
        self.kv.set_text(ROOM_KEY, room)?;
        self.kv.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
    struct TestData {
        name: String,
        count: i32,
    }

    #[test]
    fn test_kv_store_creation() {
        let kv = KvStore::in_memory().unwrap();
        assert!(kv.is_empty());
    }

    #[test]
    fn test_set_and_get_struct() {
        let kv = KvStore::in_memory().unwrap();

        let data = TestData { name: "Alice".to_string(), count: 42 };

        kv.set("user", &data).unwrap();

        let retrieved: Option<TestData> = kv.get("user").unwrap();
        assert_eq!(retrieved, Some(data));
        assert_eq!(kv.len(), 1);
    }

    #[test]
    fn test_get_nonexistent() {
        let kv = KvStore::in_memory().unwrap();
        let value: Option<String> = kv.get("nonexistent").unwrap();
        assert_eq!(value, None);
        assert_eq!(kv.get_text("nonexistent").unwrap(), None);
    }

    #[test]
    fn test_scoped_operations() {
        let kv = KvStore::in_memory().unwrap();

        kv.set_scoped(&["account", "42", "prefs"], &7).unwrap();
        assert!(kv.contains("account:42:prefs").unwrap());

        let value: Option<i32> = kv.get_scoped(&["account", "42", "prefs"]).unwrap();
        assert_eq!(value, Some(7));

        assert!(kv.remove_scoped(&["account", "42", "prefs"]).unwrap());
        assert!(!kv.remove_scoped(&["account", "42", "prefs"]).unwrap());
    }

    #[test]
    fn test_text_values_are_raw() {
        let kv = KvStore::in_memory().unwrap();
        kv.set_text("room", "276").unwrap();

        assert_eq!(kv.get_text("room").unwrap(), Some("276".to_string()));
        // Plain text, not a JSON string
        assert!(kv.get::<String>("room").is_err());
    }

    #[test]
    fn test_local_store_room() {
        let store = LocalStore::new(Arc::new(KvStore::in_memory().unwrap()));
        assert_eq!(store.last_room().unwrap(), None);

        store.set_last_room("65").unwrap();
        store.set_last_room("276").unwrap();
        assert_eq!(store.last_room().unwrap(), Some("276".to_string()));
    }

    #[test]
    fn test_local_store_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kv").to_string_lossy().to_string();

        let config = KvConfig::new(&path).flush_every_ms(None);

        {
            let kv = KvStore::new(config.clone()).unwrap();
            LocalStore::new(Arc::new(kv)).set_last_room("276").unwrap();
        }

        let kv = KvStore::new(config).unwrap();
        assert_eq!(LocalStore::new(Arc::new(kv)).last_room().unwrap(), Some("276".to_string()));
    }

    #[test]
    fn test_config_builder() {
        let config = KvConfig::new("/tmp/test.db")
            .cache_capacity(1024)
            .use_compression(false)
            .flush_every_ms(None);

        assert_eq!(config.path, "/tmp/test.db");
        assert_eq!(config.cache_capacity, 1024);
        assert!(!config.use_compression);
        assert_eq!(config.flush_every_ms, None);
    }
}
