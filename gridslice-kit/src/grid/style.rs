//! Style Computation
//!
//! Turns a node's advanced style spec into a style object. A spec is either a
//! CSS declaration string (`"margin: 8px; font-size: 12px"`) or a structured
//! object, possibly nested for selectors (`{"&:hover": {"color": "red"}}`).

use indexmap::IndexMap;
use serde_json::{Map, Value};

/// A computed style object with camelCase property names.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Style {
    rules: IndexMap<String, Value>,
}

impl Style {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Get a property or nested selector block
    pub fn get(&self, property: &str) -> Option<&Value> {
        self.rules.get(property)
    }

    pub fn insert(&mut self, property: impl Into<String>, value: Value) {
        self.rules.insert(property.into(), value);
    }

    pub fn to_json(&self) -> Value {
        Value::Object(self.rules.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
    }
}

/// Computes styles from advanced style specs.
pub trait StyleComputer {
    /// Absent or malformed specs yield an empty style.
    fn compute_style(&self, spec: Option<&Value>) -> Style;
}

/// Default computer understanding CSS strings and CSS-in-JS objects.
#[derive(Debug, Clone, Copy, Default)]
pub struct CssStyleComputer;

impl StyleComputer for CssStyleComputer {
    fn compute_style(&self, spec: Option<&Value>) -> Style {
        match spec {
            None | Some(Value::Null) => Style::new(),
            Some(Value::String(css)) => parse_declarations(css),
            Some(Value::Object(map)) => Style {
                rules: convert_object(map),
            },
            Some(other) => {
                log::warn!("[style] Ignoring malformed style spec: {}", other);
                Style::new()
            }
        }
    }
}

/// Parse `prop: value; prop: value` declarations. Malformed declarations are skipped.
fn parse_declarations(css: &str) -> Style {
    let mut style = Style::new();
    let css = css.trim().trim_start_matches('{').trim_end_matches('}');

    for declaration in css.split(';') {
        let declaration = declaration.trim();
        if declaration.is_empty() {
            continue;
        }
        match declaration.split_once(':') {
            Some((property, value)) if !property.trim().is_empty() && !value.trim().is_empty() => {
                style.insert(
                    camel_case(property.trim()),
                    Value::String(value.trim().to_string()),
                );
            }
            _ => log::debug!("[style] Skipping declaration `{}`", declaration),
        }
    }

    style
}

fn convert_object(map: &Map<String, Value>) -> IndexMap<String, Value> {
    let mut rules = IndexMap::new();
    for (key, value) in map {
        match value {
            Value::String(_) | Value::Number(_) => {
                rules.insert(camel_case(key), value.clone());
            }
            Value::Object(nested) => {
                let nested = convert_object(nested);
                rules.insert(key.clone(), Value::Object(nested.into_iter().collect()));
            }
            _ => log::debug!("[style] Skipping property `{}`", key),
        }
    }
    rules
}

/// `font-size` -> `fontSize`, `-webkit-box` -> `WebkitBox`. Custom properties and
/// selectors are left alone.
fn camel_case(property: &str) -> String {
    if property.starts_with("--") || !property.contains('-') {
        return property.to_string();
    }

    let mut out = String::with_capacity(property.len());
    let mut upper_next = false;
    for (i, ch) in property.chars().enumerate() {
        if ch == '-' {
            upper_next = i > 0 || property.starts_with('-');
            continue;
        }
        if upper_next {
            out.extend(ch.to_uppercase());
            upper_next = false;
        } else {
            out.push(ch);
        }
    }
    out
}
