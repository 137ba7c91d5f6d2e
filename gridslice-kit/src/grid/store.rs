//! Data Stream Store
//!
//! Shared value/form store keyed by scope name (the node id prefix before its
//! separator). The renderer never reaches it through a global: hosts create a
//! [`StoreHandle`] and inject it into the services that need it.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// Everything stored for one scope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScopeValue {
    /// Last submitted form data
    #[serde(default = "empty_object")]
    pub form_data: Value,

    /// Current item published by the scope
    #[serde(default)]
    pub value_stream: Value,
}

fn empty_object() -> Value {
    Value::Object(Map::new())
}

impl Default for ScopeValue {
    fn default() -> Self {
        ScopeValue {
            form_data: empty_object(),
            value_stream: Value::Null,
        }
    }
}

/// Scope-keyed store. Writes are last-write-wins.
#[derive(Debug, Default)]
pub struct DataStreamStore {
    values: HashMap<String, ScopeValue>,

    /// Version counter for change detection
    version: u64,
}

impl DataStreamStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the current version number
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Set a scope's data
    pub fn set_value(&mut self, key: &str, data: ScopeValue) {
        self.values.insert(key.to_string(), data);
        self.touch();
    }

    /// Replace only a scope's form data
    pub fn set_form_data(&mut self, key: &str, form_data: Value) {
        self.entry(key).form_data = form_data;
        self.touch();
    }

    /// Replace only a scope's value stream
    pub fn set_value_stream(&mut self, key: &str, value_stream: Value) {
        self.entry(key).value_stream = value_stream;
        self.touch();
    }

    pub fn get_value(&self, key: &str) -> Option<&ScopeValue> {
        self.values.get(key)
    }

    pub fn get_form_data(&self, key: &str) -> Option<&Value> {
        self.values.get(key).map(|v| &v.form_data)
    }

    pub fn get_value_stream(&self, key: &str) -> Option<&Value> {
        self.values.get(key).map(|v| &v.value_stream)
    }

    pub fn has_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn remove_value(&mut self, key: &str) -> Option<ScopeValue> {
        let removed = self.values.remove(key);
        if removed.is_some() {
            self.touch();
        }
        removed
    }

    pub fn clear_values(&mut self) {
        self.values.clear();
        self.touch();
    }

    /// All scope keys, sorted
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.values.keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Snapshot of the whole store as a JSON object
    pub fn to_json(&self) -> Value {
        let mut out = Map::new();
        for key in self.keys() {
            if let Some(value) = self.values.get(&key) {
                out.insert(
                    key,
                    serde_json::to_value(value).unwrap_or(Value::Null),
                );
            }
        }
        Value::Object(out)
    }

    fn entry(&mut self, key: &str) -> &mut ScopeValue {
        self.values.entry(key.to_string()).or_default()
    }

    fn touch(&mut self) {
        self.version += 1;
    }
}

/// Shared handle to a [`DataStreamStore`].
///
/// Rendering is single-threaded, so the handle is a plain `Rc<RefCell<_>>`.
/// Borrows are never held across calls into other components.
#[derive(Debug, Clone, Default)]
pub struct StoreHandle {
    inner: Rc<RefCell<DataStreamStore>>,
}

impl StoreHandle {
    pub fn new(store: DataStreamStore) -> Self {
        StoreHandle {
            inner: Rc::new(RefCell::new(store)),
        }
    }

    /// Run `f` with shared access to the store
    pub fn with<R>(&self, f: impl FnOnce(&DataStreamStore) -> R) -> R {
        f(&self.inner.borrow())
    }

    /// Run `f` with exclusive access to the store
    pub fn with_mut<R>(&self, f: impl FnOnce(&mut DataStreamStore) -> R) -> R {
        f(&mut self.inner.borrow_mut())
    }

    pub fn set_form_data(&self, key: &str, form_data: Value) {
        log::debug!("[store] setFormData {}", key);
        self.with_mut(|store| store.set_form_data(key, form_data));
    }

    pub fn set_value(&self, key: &str, data: ScopeValue) {
        self.with_mut(|store| store.set_value(key, data));
    }

    pub fn get_value(&self, key: &str) -> Option<ScopeValue> {
        self.with(|store| store.get_value(key).cloned())
    }

    pub fn get_form_data(&self, key: &str) -> Option<Value> {
        self.with(|store| store.get_form_data(key).cloned())
    }

    pub fn version(&self) -> u64 {
        self.with(DataStreamStore::version)
    }

    /// Check if two handles share the same store
    pub fn ptr_eq(&self, other: &StoreHandle) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_set_form_data_creates_scope() {
        let mut store = DataStreamStore::new();
        assert!(!store.has_key("signup"));

        store.set_form_data("signup", json!({"email": "a@b.c"}));

        assert!(store.has_key("signup"));
        assert_eq!(store.get_form_data("signup"), Some(&json!({"email": "a@b.c"})));
        assert_eq!(store.get_value_stream("signup"), Some(&Value::Null));
    }

    #[test]
    fn test_last_write_wins() {
        let mut store = DataStreamStore::new();
        store.set_value_stream("list", json!(1));
        store.set_value_stream("list", json!(2));
        assert_eq!(store.get_value_stream("list"), Some(&json!(2)));
    }

    #[test]
    fn test_remove_and_clear() {
        let mut store = DataStreamStore::new();
        store.set_value("a", ScopeValue::default());
        store.set_value("b", ScopeValue::default());
        assert_eq!(store.keys(), vec!["a".to_string(), "b".to_string()]);

        assert!(store.remove_value("a").is_some());
        assert!(store.remove_value("a").is_none());
        assert_eq!(store.keys(), vec!["b".to_string()]);

        store.clear_values();
        assert!(store.keys().is_empty());
    }

    #[test]
    fn test_version_bumps_on_write() {
        let handle = StoreHandle::default();
        let v0 = handle.version();
        handle.set_form_data("x", json!({}));
        assert!(handle.version() > v0);
    }

    #[test]
    fn test_handles_share_store() {
        let handle = StoreHandle::default();
        let other = handle.clone();
        other.set_form_data("x", json!({"ok": true}));

        assert!(handle.ptr_eq(&other));
        assert_eq!(handle.get_form_data("x"), Some(json!({"ok": true})));
    }

    #[test]
    fn test_scope_value_deserialize_defaults() {
        let value: ScopeValue = serde_json::from_value(json!({"valueStream": [1]})).unwrap();
        assert_eq!(value.form_data, json!({}));
        assert_eq!(value.value_stream, json!([1]));
    }
}
