//! Prop Value Types
//!
//! Represents the values a resolved prop bag can hold: plain JSON, converted
//! date-times, computed styles, synthesized elements, deferred sub-renders and
//! event handlers.

use chrono::NaiveDateTime;
use indexmap::IndexMap;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value, json};
use std::fmt;
use std::rc::Rc;

use super::element::Element;
use super::props::Deferred;
use super::style::Style;

/// Format used when date-times are written out.
pub const DATE_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// A named event handler.
///
/// Handlers are cheap to clone; clones share the same callback.
#[derive(Clone)]
pub struct Handler {
    name: Rc<str>,
    callback: Rc<dyn Fn(Option<&Value>)>,
}

impl Handler {
    /// Create a handler from a callback
    pub fn new(name: impl Into<String>, callback: impl Fn(Option<&Value>) + 'static) -> Self {
        let name: String = name.into();
        Handler {
            name: name.into(),
            callback: Rc::new(callback),
        }
    }

    /// Handler name, e.g. `onClick`
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Invoke the handler
    pub fn call(&self, arg: Option<&Value>) {
        (self.callback)(arg)
    }

    /// Check if two handlers share the same callback
    pub fn ptr_eq(&self, other: &Handler) -> bool {
        Rc::ptr_eq(&self.callback, &other.callback)
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Handler").field(&self.name).finish()
    }
}

/// A single prop value.
#[derive(Debug, Clone)]
pub enum PropValue {
    /// Plain JSON value
    Json(Value),
    /// Date-time converted from a string
    DateTime(NaiveDateTime),
    /// Computed style object
    Style(Style),
    /// Synthesized element, e.g. a dropdown trigger
    Element(Box<Element>),
    /// Synthesized elements, e.g. map markers
    Elements(Vec<Element>),
    /// Array holding non-JSON values
    List(Vec<PropValue>),
    /// Object holding non-JSON values
    Map(PropBag),
    /// Sub-render evaluated on demand
    Deferred(Deferred),
    /// Event handler
    Handler(Handler),
}

impl PropValue {
    /// Get the JSON value if this is plain JSON
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            PropValue::Json(v) => Some(v),
            _ => None,
        }
    }

    /// Get the string if this is a JSON string
    pub fn as_str(&self) -> Option<&str> {
        self.as_json().and_then(Value::as_str)
    }

    pub fn as_date_time(&self) -> Option<&NaiveDateTime> {
        match self {
            PropValue::DateTime(dt) => Some(dt),
            _ => None,
        }
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self {
            PropValue::Element(el) => Some(el.as_ref()),
            _ => None,
        }
    }

    pub fn as_elements(&self) -> Option<&[Element]> {
        match self {
            PropValue::Elements(els) => Some(els.as_slice()),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[PropValue]> {
        match self {
            PropValue::List(items) => Some(items.as_slice()),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&PropBag> {
        match self {
            PropValue::Map(bag) => Some(bag),
            _ => None,
        }
    }

    pub fn as_deferred(&self) -> Option<&Deferred> {
        match self {
            PropValue::Deferred(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_handler(&self) -> Option<&Handler> {
        match self {
            PropValue::Handler(h) => Some(h),
            _ => None,
        }
    }

    pub fn as_style(&self) -> Option<&Style> {
        match self {
            PropValue::Style(s) => Some(s),
            _ => None,
        }
    }

    /// JSON snapshot. Non-data values are written as `$`-tagged markers.
    pub fn to_json(&self) -> Value {
        match self {
            PropValue::Json(v) => v.clone(),
            PropValue::DateTime(dt) => json!({ "$dateTime": dt.format(DATE_TIME_FORMAT).to_string() }),
            PropValue::Style(style) => style.to_json(),
            PropValue::Element(el) => el.to_json(),
            PropValue::Elements(els) => Value::Array(els.iter().map(Element::to_json).collect()),
            PropValue::List(items) => Value::Array(items.iter().map(PropValue::to_json).collect()),
            PropValue::Map(bag) => bag.to_json(),
            PropValue::Deferred(d) => d.to_json(),
            PropValue::Handler(h) => json!({ "$handler": h.name() }),
        }
    }
}

impl From<Value> for PropValue {
    fn from(value: Value) -> Self {
        PropValue::Json(value)
    }
}

impl From<Handler> for PropValue {
    fn from(handler: Handler) -> Self {
        PropValue::Handler(handler)
    }
}

impl From<Element> for PropValue {
    fn from(element: Element) -> Self {
        PropValue::Element(Box::new(element))
    }
}

impl Serialize for PropValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

/// Insertion-ordered property bag handed to a widget.
///
/// Inserting an existing key replaces its value in place, so merge order is
/// observable the same way object spreading is.
#[derive(Debug, Clone, Default)]
pub struct PropBag {
    entries: IndexMap<String, PropValue>,
}

impl PropBag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a bag of plain JSON values from an object
    pub fn from_json_map(map: &Map<String, Value>) -> Self {
        map.iter()
            .map(|(k, v)| (k.clone(), PropValue::Json(v.clone())))
            .collect()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<PropValue>) -> Option<PropValue> {
        self.entries.insert(key.into(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&PropValue> {
        self.entries.get(key)
    }

    /// Get a plain JSON prop
    pub fn get_json(&self, key: &str) -> Option<&Value> {
        self.get(key).and_then(PropValue::as_json)
    }

    /// Get a handler prop
    pub fn handler(&self, key: &str) -> Option<&Handler> {
        self.get(key).and_then(PropValue::as_handler)
    }

    /// Remove a key, keeping the order of the remaining entries
    pub fn remove(&mut self, key: &str) -> Option<PropValue> {
        self.entries.shift_remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Overlay `other` on top of this bag; its keys win
    pub fn merge(&mut self, other: PropBag) {
        self.entries.extend(other.entries);
    }

    /// JSON snapshot of the whole bag
    pub fn to_json(&self) -> Value {
        Value::Object(
            self.entries
                .iter()
                .map(|(k, v)| (k.clone(), v.to_json()))
                .collect(),
        )
    }
}

impl FromIterator<(String, PropValue)> for PropBag {
    fn from_iter<I: IntoIterator<Item = (String, PropValue)>>(iter: I) -> Self {
        PropBag {
            entries: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for PropBag {
    type Item = (String, PropValue);
    type IntoIter = indexmap::map::IntoIter<String, PropValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl Serialize for PropBag {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_merge_overrides_in_place() {
        let mut bag = PropBag::from_json_map(json!({"a": 1, "b": 2}).as_object().unwrap());
        let mut overlay = PropBag::new();
        overlay.insert("a", json!(10));
        overlay.insert("c", json!(3));

        bag.merge(overlay);

        let keys: Vec<&str> = bag.keys().collect();
        assert_eq!(keys, vec!["a", "b", "c"]);
        assert_eq!(bag.get_json("a"), Some(&json!(10)));
    }

    #[test]
    fn test_remove_keeps_order() {
        let mut bag = PropBag::from_json_map(json!({"a": 1, "b": 2, "c": 3}).as_object().unwrap());
        bag.remove("a");
        let keys: Vec<&str> = bag.keys().collect();
        assert_eq!(keys, vec!["b", "c"]);
    }

    #[test]
    fn test_handler_call_and_snapshot() {
        let calls = Rc::new(Cell::new(0));
        let counter = calls.clone();
        let handler = Handler::new("onClick", move |_| counter.set(counter.get() + 1));

        let mut bag = PropBag::new();
        bag.insert("onClick", handler.clone());

        bag.handler("onClick").unwrap().call(None);
        handler.call(None);
        assert_eq!(calls.get(), 2);
        assert!(bag.handler("onClick").unwrap().ptr_eq(&handler));

        assert_eq!(bag.to_json(), json!({"onClick": {"$handler": "onClick"}}));
    }

    #[test]
    fn test_date_time_snapshot() {
        let dt = chrono::NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert_eq!(
            PropValue::DateTime(dt).to_json(),
            json!({"$dateTime": "2024-01-01T00:00:00"})
        );
    }
}
