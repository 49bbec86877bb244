//! Typed, failure-tolerant access on top of a [`KeyValueStore`]
//!
//! Reads fall back to the caller's default and writes report `false` on any
//! backend or JSON failure. Failures are logged, never propagated.

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::warn;

use crate::error::{StoreError, StoreResult};
use crate::kv::KeyValueStore;

pub struct Storage<S> {
    store: S,
}

impl<S: KeyValueStore> Storage<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Stored value for `key`, or `default` when missing or unreadable
    pub fn get<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        match self.try_get(key) {
            Ok(Some(value)) => value,
            Ok(None) => default,
            Err(e) => {
                warn!(key, error = %e, "failed to read stored value, using default");
                default
            }
        }
    }

    fn try_get<T: DeserializeOwned>(&self, key: &str) -> StoreResult<Option<T>> {
        match self.store.load(key)? {
            Some(text) => Ok(Some(serde_json::from_str(&text)?)),
            None => Ok(None),
        }
    }

    /// Store `value` under `key`; false if it could not be written
    pub fn set<T: Serialize + ?Sized>(&mut self, key: &str, value: &T) -> bool {
        let result = serde_json::to_string(value)
            .map_err(StoreError::from)
            .and_then(|text| self.store.save(key, &text));
        match result {
            Ok(()) => true,
            Err(e) => {
                warn!(key, error = %e, "failed to store value");
                false
            }
        }
    }

    pub fn remove(&mut self, key: &str) -> bool {
        match self.store.delete(key) {
            Ok(()) => true,
            Err(e) => {
                warn!(key, error = %e, "failed to remove stored value");
                false
            }
        }
    }

    pub fn inner(&self) -> &S {
        &self.store
    }
}
