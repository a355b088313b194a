//! Thread-safe wizard context.

use parking_lot::RwLock;
use std::collections::HashMap;

/// The bag of values collected while walking through a flow's steps.
///
/// Keys are step keys; values are whatever the step's widget produced.
/// Unlike a write-once bag, setting an existing key overwrites it: a
/// user who walks back and forward again replaces the earlier value.
#[derive(Debug, Default)]
pub struct FlowContext {
    values: RwLock<HashMap<String, serde_json::Value>>,
}

impl FlowContext {
    /// Creates a new empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a context from existing data.
    #[must_use]
    pub fn from_map(values: HashMap<String, serde_json::Value>) -> Self {
        Self {
            values: RwLock::new(values),
        }
    }

    /// Gets a value.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<serde_json::Value> {
        self.values.read().get(key).cloned()
    }

    /// Checks if a key exists.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.values.read().contains_key(key)
    }

    /// Sets a value, overwriting any existing one.
    pub fn set(&self, key: impl Into<String>, value: serde_json::Value) {
        self.values.write().insert(key.into(), value);
    }

    /// Merges another map into this context, overwriting on collision.
    pub fn merge(&self, other: HashMap<String, serde_json::Value>) {
        self.values.write().extend(other);
    }

    /// Removes every entry.
    pub fn clear(&self) {
        self.values.write().clear();
    }

    /// Returns a copy of all data.
    #[must_use]
    pub fn snapshot(&self) -> HashMap<String, serde_json::Value> {
        self.values.read().clone()
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.read().len()
    }

    /// Returns true if the context is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.read().is_empty()
    }

    /// Returns all keys.
    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        self.values.read().keys().cloned().collect()
    }
}

impl Clone for FlowContext {
    fn clone(&self) -> Self {
        Self {
            values: RwLock::new(self.values.read().clone()),
        }
    }
}
