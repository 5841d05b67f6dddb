use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::errors::CoreError;

/// A persistent mapping from string keys to JSON-serialized values.
///
/// Contract:
/// - `get` on a key holding malformed data returns `None` — callers
///   must treat "absent" and "corrupt" identically.
/// - `set` failure (disk full, permissions) is reported, never
///   silently dropped; the caller decides whether to retry or surface.
/// - No multi-key atomicity. Callers that need an atomic multi-entry
///   update store one composite value (the user registry and the
///   portfolio collection are each a single value).
pub trait KeyValueStore: Send + Sync {
    /// Raw stored string for a key, if present.
    fn get_raw(&self, key: &str) -> Option<String>;

    /// Store a raw string under a key.
    fn set_raw(&self, key: &str, value: &str) -> Result<(), CoreError>;

    /// Remove a key. Removing an absent key is a no-op.
    fn delete(&self, key: &str);
}

/// Typed JSON accessors over any [`KeyValueStore`].
pub trait KeyValueStoreExt: KeyValueStore {
    /// Deserialize the value under `key`. Absent keys and values that
    /// fail to parse both return `None`.
    fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = self.get_raw(key)?;
        serde_json::from_str(&raw).ok()
    }

    /// Serialize `value` as JSON and store it under `key`.
    fn set<T: Serialize>(&self, key: &str, value: &T) -> Result<(), CoreError> {
        let raw = serde_json::to_string(value)?;
        self.set_raw(key, &raw)
    }
}

impl<S: KeyValueStore + ?Sized> KeyValueStoreExt for S {}
