//! Grid Item Node Types
//!
//! This module defines the Rust types for the declarative node tree consumed by
//! the renderer. Nodes are deserialized using serde_json and are never mutated
//! while rendering.

use serde::{Deserialize, Deserializer, Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};

use super::error::{GridError, GridResult};
use super::registry::WidgetKind;

/// Descriptor `type` of a dynamic-value binding.
pub const DATA_BINDING_TYPE: &str = "data";

/// Any descriptor whose `type` contains this marker is an action binding.
pub const ACTION_BINDING_MARKER: &str = "MouseEventHandler";

/// Default separator between a node id's scope prefix and the rest of the id.
pub const SCOPE_SEPARATOR: char = '$';

/// Lenient string deserializer: accepts strings and numbers, ignores other types.
fn lenient_string<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    let val = match Option::<Value>::deserialize(d)? {
        Some(Value::String(s)) => s,
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    };
    Ok(val)
}

/// Lenient list deserializer: malformed entries are skipped, non-arrays are empty.
fn lenient_list<'de, D, T>(d: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let Some(Value::Array(items)) = Option::<Value>::deserialize(d)? else {
        return Ok(Vec::new());
    };

    let mut out = Vec::with_capacity(items.len());
    for (i, item) in items.into_iter().enumerate() {
        match serde_json::from_value::<T>(item) {
            Ok(v) => out.push(v),
            Err(e) => log::warn!("[grid] Skipping malformed entry [{}]: {}", i, e),
        }
    }
    Ok(out)
}

/// Child nodes keep their position: a malformed child becomes an inert placeholder.
fn lenient_childs<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<GridItem>, D::Error> {
    let Some(Value::Array(items)) = Option::<Value>::deserialize(d)? else {
        return Ok(Vec::new());
    };

    Ok(items
        .into_iter()
        .enumerate()
        .map(|(i, item)| match serde_json::from_value::<GridItem>(item) {
            Ok(child) => child,
            Err(e) => {
                log::warn!("[grid] Malformed child [{}] replaced by placeholder: {}", i, e);
                GridItem::placeholder()
            }
        })
        .collect())
}

fn lenient_component_props<'de, D: Deserializer<'de>>(d: D) -> Result<ComponentProps, D::Error> {
    let val = match Option::<Value>::deserialize(d)? {
        Some(v @ Value::Object(_)) => serde_json::from_value(v).unwrap_or_else(|e| {
            log::warn!("[grid] Malformed componentProps ignored: {}", e);
            ComponentProps::default()
        }),
        _ => ComponentProps::default(),
    };
    Ok(val)
}

/// One declarative node of the UI tree.
///
/// # Example JSON
///
/// ```text
/// {
///   "id": "orders$table",
///   "value": "Table",
///   "componentProps": {
///     "bordered": true,
///     "dataProps": [{"type": "data", "name": "dataSource", "data": {...}}],
///     "styleMultiple": "margin: 8px"
///   },
///   "childs": []
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridItem {
    /// Node id, may carry a scope prefix before [`SCOPE_SEPARATOR`]
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: String,

    /// Widget kind identifier (case-insensitive)
    #[serde(default, deserialize_with = "lenient_string")]
    pub value: String,

    /// Binding name used to match form keys
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Static props, bindings and style spec
    #[serde(default, deserialize_with = "lenient_component_props")]
    pub component_props: ComponentProps,

    /// Ordered child nodes
    #[serde(default, deserialize_with = "lenient_childs")]
    pub childs: Vec<GridItem>,
}

impl GridItem {
    /// Create a node with the given id and widget kind
    pub fn new(id: impl Into<String>, value: impl Into<String>) -> Self {
        GridItem {
            id: id.into(),
            value: value.into(),
            ..Default::default()
        }
    }

    /// An inert node that renders as an empty placeholder
    pub fn placeholder() -> Self {
        Self::default()
    }

    /// Set a static prop (builder)
    pub fn with_prop(mut self, key: impl Into<String>, value: Value) -> Self {
        self.component_props.props.insert(key.into(), value);
        self
    }

    /// Add a binding descriptor (builder)
    pub fn with_binding(mut self, binding: BindingDescriptor) -> Self {
        self.component_props.data_props.push(binding);
        self
    }

    /// Add a child node (builder)
    pub fn with_child(mut self, child: GridItem) -> Self {
        self.childs.push(child);
        self
    }

    /// Set the binding name (builder)
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Parse a node tree from JSON text. The root must be an object.
    pub fn from_json(json: &str) -> GridResult<Self> {
        let value: Value = serde_json::from_str(json)?;
        Self::from_value(value)
    }

    /// Build a node tree from an already parsed JSON value.
    pub fn from_value(value: Value) -> GridResult<Self> {
        if !value.is_object() {
            return Err(GridError::InvalidRoot(format!(
                "expected an object, found {}",
                json_type_name(&value)
            )));
        }
        Ok(serde_json::from_value(value)?)
    }

    /// The parsed widget kind
    pub fn widget_kind(&self) -> WidgetKind {
        WidgetKind::parse(&self.value)
    }

    /// The scope name: the id prefix before `separator`, or the whole id.
    pub fn scope_name(&self, separator: char) -> &str {
        self.id
            .split_once(separator)
            .map(|(scope, _)| scope)
            .unwrap_or(&self.id)
    }

    /// The name a form key mapping entry matches against.
    pub fn binding_name(&self) -> Option<&str> {
        self.name
            .as_deref()
            .or_else(|| self.component_props.props.get("name").and_then(Value::as_str))
    }

    /// Split the bindings into `(data, actions)`.
    pub fn partition_bindings(&self) -> (Vec<&BindingDescriptor>, Vec<&BindingDescriptor>) {
        let bindings = &self.component_props.data_props;
        (
            bindings.iter().filter(|b| b.is_data()).collect(),
            bindings.iter().filter(|b| b.is_action()).collect(),
        )
    }
}

/// Config bag of a node.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentProps {
    /// Data and action binding descriptors
    #[serde(default, deserialize_with = "lenient_list", skip_serializing_if = "Vec::is_empty")]
    pub data_props: Vec<BindingDescriptor>,

    /// Advanced style spec (CSS string or structured object)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style_multiple: Option<Value>,

    /// Form key mapping, only meaningful on form roots
    #[serde(default, deserialize_with = "lenient_list", skip_serializing_if = "Vec::is_empty")]
    pub form_keys: Vec<FormKey>,

    /// Remaining static props
    #[serde(flatten)]
    pub props: Map<String, Value>,
}

/// A dynamic data or action link declared on a node.
///
/// # Examples
///
/// ```json
/// {"type": "data", "name": "value", "data": {"source": "valueStream", "path": "title"}}
/// {"type": "MouseEventHandler<HTMLElement>", "name": "onClick", "data": {"action": "open"}}
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BindingDescriptor {
    /// Descriptor type, `data` or an event handler type
    #[serde(rename = "type")]
    pub kind: String,

    /// Prop name the binding fills
    #[serde(default)]
    pub name: String,

    /// Source description, interpreted by the resolvers
    #[serde(default)]
    pub data: Value,

    /// Any other descriptor fields
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl BindingDescriptor {
    /// Create a data binding for prop `name`
    pub fn data(name: impl Into<String>, data: Value) -> Self {
        BindingDescriptor {
            kind: DATA_BINDING_TYPE.to_string(),
            name: name.into(),
            data,
            extra: Map::new(),
        }
    }

    /// Create an action binding for handler `name`
    pub fn action(name: impl Into<String>, data: Value) -> Self {
        BindingDescriptor {
            kind: format!("{}<HTMLElement>", ACTION_BINDING_MARKER),
            name: name.into(),
            data,
            extra: Map::new(),
        }
    }

    /// Check if this is a dynamic-value binding
    pub fn is_data(&self) -> bool {
        self.kind == DATA_BINDING_TYPE
    }

    /// Check if this is an action binding
    pub fn is_action(&self) -> bool {
        self.kind.contains(ACTION_BINDING_MARKER)
    }
}

/// One entry of a form root's key mapping.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FormKey {
    /// Field path in the shared form state
    pub key: String,

    /// Binding name of the descendant input
    pub value: String,
}

impl FormKey {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        FormKey {
            key: key.into(),
            value: value.into(),
        }
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_node_tree() {
        let json = r#"{
            "id": "shop$root",
            "value": "Card",
            "componentProps": {
                "title": "Orders",
                "styleMultiple": "padding: 4px",
                "dataProps": [
                    {"type": "data", "name": "extra", "data": {"source": "static", "value": 1}},
                    {"type": "MouseEventHandler<HTMLElement>", "name": "onClick"}
                ]
            },
            "childs": [{"id": "shop$text", "value": "text"}]
        }"#;

        let node = GridItem::from_json(json).unwrap();
        assert_eq!(node.id, "shop$root");
        assert_eq!(node.widget_kind(), WidgetKind::Card);
        assert_eq!(node.component_props.props.get("title"), Some(&json!("Orders")));
        assert!(!node.component_props.props.contains_key("styleMultiple"));
        assert!(!node.component_props.props.contains_key("dataProps"));
        assert_eq!(node.component_props.style_multiple, Some(json!("padding: 4px")));
        assert_eq!(node.childs.len(), 1);

        let (data, actions) = node.partition_bindings();
        assert_eq!(data.len(), 1);
        assert_eq!(actions.len(), 1);
        assert_eq!(actions[0].name, "onClick");
    }

    #[test]
    fn test_malformed_child_becomes_placeholder() {
        let node = GridItem::from_value(json!({
            "id": "root",
            "value": "card",
            "childs": [
                {"id": "a", "value": "text"},
                {"id": "b", "value": "text", "name": 42},
                {"id": "c", "value": "button"}
            ]
        }))
        .unwrap();

        assert_eq!(node.childs.len(), 3);
        assert_eq!(node.childs[0].id, "a");
        assert_eq!(node.childs[1], GridItem::placeholder());
        assert_eq!(node.childs[2].id, "c");
    }

    #[test]
    fn test_malformed_bindings_are_skipped() {
        let node = GridItem::from_value(json!({
            "id": "root",
            "value": "form",
            "componentProps": {
                "dataProps": [{"name": "missing type"}, {"type": "data", "name": "ok"}],
                "formKeys": [{"key": "user.name", "value": "name"}, {"key": 1}]
            }
        }))
        .unwrap();

        assert_eq!(node.component_props.data_props.len(), 1);
        assert_eq!(node.component_props.data_props[0].name, "ok");
        assert_eq!(node.component_props.form_keys, vec![FormKey::new("user.name", "name")]);
    }

    #[test]
    fn test_root_must_be_object() {
        assert!(matches!(
            GridItem::from_json("[1, 2]"),
            Err(GridError::InvalidRoot(_))
        ));
        assert!(matches!(GridItem::from_json("{"), Err(GridError::Json(_))));
    }

    #[test]
    fn test_scope_name() {
        assert_eq!(GridItem::new("orders$table", "table").scope_name('$'), "orders");
        assert_eq!(GridItem::new("plain", "table").scope_name('$'), "plain");
        assert_eq!(GridItem::new("a$b$c", "table").scope_name('$'), "a");
    }

    #[test]
    fn test_binding_name_falls_back_to_prop() {
        let node = GridItem::new("x", "inputtext").with_prop("name", json!("email"));
        assert_eq!(node.binding_name(), Some("email"));

        let node = node.with_name("login");
        assert_eq!(node.binding_name(), Some("login"));
    }

    #[test]
    fn test_numeric_id_is_accepted() {
        let node = GridItem::from_value(json!({"id": 7, "value": "text"})).unwrap();
        assert_eq!(node.id, "7");
    }
}
