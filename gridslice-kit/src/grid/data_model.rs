//! Path-addressed Data Model
//!
//! The DataModel stores a JSON document whose values are reached by field paths.
//! Form state is kept in one, and the resolvers use [`lookup_path`] to reach into
//! bound values.

use serde_json::{Map, Value};
use std::collections::HashSet;

/// A JSON document addressed by field paths.
///
/// # Path Format
///
/// Two notations are accepted:
/// - dotted paths: `user.name`, `items.0.id`, `items[0].id`
/// - JSON Pointer (RFC 6901) paths: `/user/name`, `/items/0/id`
///
/// The empty path, `.` and `/` address the root.
///
/// # Example
///
/// ```rust,ignore
/// let mut model = DataModel::new();
///
/// model.set("user.name", json!("Alice"));
/// model.set("/items", json!([{"id": 1}, {"id": 2}]));
///
/// let name = model.get("user.name");   // Some(&json!("Alice"))
/// let id = lookup_path(model.as_value(), "items.1.id"); // Some(&json!(2))
/// ```
#[derive(Debug, Clone)]
pub struct DataModel {
    /// The root data value
    data: Value,

    /// Set of paths that have been modified since last clear
    dirty_paths: HashSet<String>,

    /// Version counter for change detection
    version: u64,
}

impl Default for DataModel {
    fn default() -> Self {
        Self::new()
    }
}

impl DataModel {
    /// Create a new empty data model
    pub fn new() -> Self {
        DataModel {
            data: Value::Object(Map::new()),
            dirty_paths: HashSet::new(),
            version: 0,
        }
    }

    /// Create a data model with initial data
    pub fn with_data(data: Value) -> Self {
        DataModel {
            data,
            dirty_paths: HashSet::new(),
            version: 0,
        }
    }

    /// Get the current version number
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Check if a path, one of its parents or one of its children has been modified
    pub fn is_dirty(&self, path: &str) -> bool {
        let path = normalize_path(path);
        self.dirty_paths
            .iter()
            .any(|dirty| is_within(&path, dirty) || is_within(dirty, &path))
    }

    /// Get a value at the given path
    pub fn get(&self, path: &str) -> Option<&Value> {
        lookup_path(&self.data, path)
    }

    /// Set a value at the given path
    ///
    /// Creates intermediate objects/arrays as needed.
    pub fn set(&mut self, path: &str, value: Value) {
        let segments = parse_path(path);
        if set_by_segments(&mut self.data, &segments, value) {
            self.dirty_paths.insert(normalize_path(path));
            self.version += 1;
        }
    }

    /// Get the entire data as a Value
    pub fn as_value(&self) -> &Value {
        &self.data
    }

    /// Replace the entire data model. The new data starts clean.
    pub fn replace(&mut self, data: Value) {
        self.data = data;
        self.dirty_paths.clear();
        self.version += 1;
    }
}

/// Look up `path` inside `root`. See [`DataModel`] for the path format.
pub fn lookup_path<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = root;
    for segment in parse_path(path) {
        current = match current {
            Value::Object(map) => map.get(segment.as_str())?,
            Value::Array(arr) => {
                let index: usize = segment.parse().ok()?;
                arr.get(index)?
            }
            _ => return None,
        };
    }
    Some(current)
}

/// Split a path into segments, unescaping JSON Pointer sequences.
fn parse_path(path: &str) -> Vec<String> {
    let path = path.trim();
    if path.is_empty() || path == "/" || path == "." {
        return vec![];
    }

    if let Some(pointer) = path.strip_prefix('/') {
        // ~1 -> /, ~0 -> ~ (order matters)
        return pointer
            .split('/')
            .map(|s| s.replace("~1", "/").replace("~0", "~"))
            .collect();
    }

    path.replace('[', ".")
        .replace(']', "")
        .split('.')
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// `path` equals `ancestor` or lies below it
fn is_within(path: &str, ancestor: &str) -> bool {
    ancestor.is_empty()
        || path
            .strip_prefix(ancestor)
            .is_some_and(|rest| rest.is_empty() || rest.starts_with('.'))
}

/// Canonical dotted form used for dirty tracking.
fn normalize_path(path: &str) -> String {
    parse_path(path).join(".")
}

fn empty_container_for(next_segment: &str) -> Value {
    if next_segment.parse::<usize>().is_ok() {
        Value::Array(vec![])
    } else {
        Value::Object(Map::new())
    }
}

fn set_by_segments(root: &mut Value, segments: &[String], value: Value) -> bool {
    let Some((last, parents)) = segments.split_last() else {
        *root = value;
        return true;
    };

    let mut current = root;
    for (i, segment) in parents.iter().enumerate() {
        let next = segments[i + 1].as_str();

        if !current.is_object() && !current.is_array() {
            *current = Value::Object(Map::new());
        }

        current = match current {
            Value::Object(map) => map
                .entry(segment.clone())
                .or_insert_with(|| empty_container_for(next)),
            Value::Array(arr) => {
                let index = match segment.parse::<usize>() {
                    Ok(index) if index <= arr.len() => index,
                    _ => return false,
                };
                if index == arr.len() {
                    arr.push(Value::Null);
                }
                if arr[index].is_null() {
                    arr[index] = empty_container_for(next);
                }
                &mut arr[index]
            }
            _ => return false,
        };
    }

    if !current.is_object() && !current.is_array() {
        *current = empty_container_for(last);
    }

    match current {
        Value::Object(map) => {
            map.insert(last.clone(), value);
            true
        }
        Value::Array(arr) => match last.parse::<usize>() {
            Ok(index) if index < arr.len() => {
                arr[index] = value;
                true
            }
            Ok(index) if index == arr.len() => {
                arr.push(value);
                true
            }
            _ => false,
        },
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_get_set_basic() {
        let mut model = DataModel::new();

        model.set("name", json!("Alice"));
        assert_eq!(model.get("name"), Some(&json!("Alice")));

        model.set("count", json!(42));
        assert_eq!(model.get("count"), Some(&json!(42)));

        model.set("enabled", json!(true));
        assert_eq!(model.get("enabled"), Some(&json!(true)));
    }

    #[test]
    fn test_dotted_and_pointer_paths_agree() {
        let mut model = DataModel::new();

        model.set("user.name", json!("Alice"));
        assert_eq!(model.get("/user/name"), Some(&json!("Alice")));

        model.set("/user/email", json!("alice@example.com"));
        assert_eq!(model.get("user.email"), Some(&json!("alice@example.com")));
        assert_eq!(model.as_value(), &json!({"user": {"name": "Alice", "email": "alice@example.com"}}));
    }

    #[test]
    fn test_array_access() {
        let mut model = DataModel::new();

        model.set("items", json!([{"id": 1}, {"id": 2}, {"id": 3}]));

        assert_eq!(model.get("items.0.id"), Some(&json!(1)));
        assert_eq!(model.get("items[1].id"), Some(&json!(2)));
        assert_eq!(model.get("/items/2/id"), Some(&json!(3)));
        assert_eq!(model.get("items").and_then(Value::as_array).map(Vec::len), Some(3));
    }

    #[test]
    fn test_set_creates_arrays_for_numeric_segments() {
        let mut model = DataModel::new();

        model.set("rows.0.title", json!("first"));
        assert_eq!(model.as_value(), &json!({"rows": [{"title": "first"}]}));
    }

    #[test]
    fn test_set_rejects_index_past_end() {
        let mut model = DataModel::with_data(json!({"rows": [{"title": "first"}]}));
        let version = model.version();

        model.set("rows.5000000.name", json!("far"));
        assert_eq!(model.get("rows").and_then(Value::as_array).map(Vec::len), Some(1));
        assert_eq!(model.version(), version);
        assert!(!model.is_dirty("rows.5000000.name"));

        model.set("rows.1.title", json!("second"));
        assert_eq!(model.get("rows.1.title"), Some(&json!("second")));
    }

    #[test]
    fn test_set_replaces_scalar_parent() {
        let mut model = DataModel::with_data(json!({"user": "anonymous"}));

        model.set("user.name", json!("Bob"));
        assert_eq!(model.get("user.name"), Some(&json!("Bob")));
    }

    #[test]
    fn test_pointer_unescaping() {
        let model = DataModel::with_data(json!({"a/b": 1, "m~n": 2}));
        assert_eq!(model.get("/a~1b"), Some(&json!(1)));
        assert_eq!(model.get("/m~0n"), Some(&json!(2)));
    }

    #[test]
    fn test_dirty_tracking() {
        let mut model = DataModel::new();

        assert!(!model.is_dirty("name"));

        model.set("user.name", json!("Alice"));
        assert!(model.is_dirty("/user/name"));
        assert!(model.is_dirty("user"));
        assert!(!model.is_dirty("user.email"));
        assert!(!model.is_dirty("username"));

        model.replace(json!({}));
        assert!(!model.is_dirty("user.name"));
    }

    #[test]
    fn test_version() {
        let mut model = DataModel::new();

        let v0 = model.version();
        model.set("name", json!("Alice"));
        let v1 = model.version();

        assert!(v1 > v0);
    }

    #[test]
    fn test_lookup_root() {
        let value = json!({"a": 1});
        assert_eq!(lookup_path(&value, ""), Some(&value));
        assert_eq!(lookup_path(&value, "b"), None);
        assert_eq!(lookup_path(&json!(3), "a"), None);
    }
}
