//! Rendered Element Tree
//!
//! The renderer's output: a toolkit-agnostic tree of widget instances that the
//! host UI runtime materializes. Keys give stable identity across re-renders.

use serde::{Serialize, Serializer};
use serde_json::{Value, json};

use super::form::FieldElement;
use super::registry::WidgetKind;
use super::value::{PropBag, PropValue};

/// A node of the rendered tree.
#[derive(Debug, Clone)]
pub enum Element {
    /// Inert placeholder, renders nothing observable
    Empty,
    /// Loading placeholder shown while data resolution is pending
    Loading,
    /// Static text content
    Text(String),
    /// A widget instance
    Widget(WidgetElement),
    /// A sized frame wrapping a widget, used for maps
    Frame(FrameElement),
    /// A widget bound to a form field path
    Field(FieldElement),
}

/// A widget instance with its final props and rendered children.
#[derive(Debug, Clone)]
pub struct WidgetElement {
    /// Identity among siblings
    pub key: Option<String>,

    /// The widget kind
    pub kind: WidgetKind,

    /// Toolkit widget name from the registry
    pub widget: &'static str,

    /// Final prop bag
    pub props: PropBag,

    /// Rendered children
    pub children: Vec<Element>,
}

impl WidgetElement {
    pub fn new(kind: WidgetKind, widget: &'static str) -> Self {
        WidgetElement {
            key: None,
            kind,
            widget,
            props: PropBag::new(),
            children: Vec::new(),
        }
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn with_props(mut self, props: PropBag) -> Self {
        self.props = props;
        self
    }

    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    /// Concatenated text of the direct text children
    pub fn text(&self) -> String {
        self.children
            .iter()
            .filter_map(|c| match c {
                Element::Text(s) => Some(s.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn to_json(&self) -> Value {
        json!({
            "type": "widget",
            "kind": self.kind.name(),
            "widget": self.widget,
            "key": self.key,
            "props": self.props.to_json(),
            "children": self.children.iter().map(Element::to_json).collect::<Vec<_>>(),
        })
    }
}

/// Fixed-size frame around a child element.
#[derive(Debug, Clone)]
pub struct FrameElement {
    pub width: String,
    pub height: String,
    pub child: Box<Element>,
}

impl Element {
    pub fn is_empty(&self) -> bool {
        matches!(self, Element::Empty)
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Element::Loading)
    }

    /// Get the widget if this is a plain widget instance
    pub fn as_widget(&self) -> Option<&WidgetElement> {
        match self {
            Element::Widget(w) => Some(w),
            _ => None,
        }
    }

    pub fn as_field(&self) -> Option<&FieldElement> {
        match self {
            Element::Field(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_frame(&self) -> Option<&FrameElement> {
        match self {
            Element::Frame(f) => Some(f),
            _ => None,
        }
    }

    /// The widget instance behind this element, looking through frames and fields
    pub fn widget(&self) -> Option<&WidgetElement> {
        match self {
            Element::Widget(w) => Some(w),
            Element::Frame(f) => f.child.widget(),
            Element::Field(f) => Some(&f.widget),
            _ => None,
        }
    }

    pub fn key(&self) -> Option<&str> {
        match self {
            Element::Field(f) => f.key.as_deref(),
            other => other.widget().and_then(|w| w.key.as_deref()),
        }
    }

    /// Rendered children of the underlying widget
    pub fn children(&self) -> &[Element] {
        self.widget().map(|w| w.children.as_slice()).unwrap_or(&[])
    }

    /// Depth-first search by key
    pub fn find(&self, key: &str) -> Option<&Element> {
        if self.key() == Some(key) {
            return Some(self);
        }
        self.children().iter().find_map(|c| c.find(key))
    }

    /// Depth-first search for the first widget of `kind`
    pub fn find_kind(&self, kind: WidgetKind) -> Option<&Element> {
        if self.widget().map(|w| w.kind) == Some(kind) {
            return Some(self);
        }
        self.children().iter().find_map(|c| c.find_kind(kind))
    }

    /// Convert a `children` prop into child elements.
    ///
    /// Strings and scalars become text, arrays are flattened, elements are kept.
    pub fn from_children_prop(value: PropValue) -> Vec<Element> {
        match value {
            PropValue::Json(json) => json_to_elements(json),
            PropValue::Element(el) => vec![*el],
            PropValue::Elements(els) => els,
            PropValue::List(items) => items.into_iter().flat_map(Element::from_children_prop).collect(),
            other => {
                log::debug!("[element] Dropping non-renderable children prop: {:?}", other);
                Vec::new()
            }
        }
    }

    /// JSON snapshot of the tree
    pub fn to_json(&self) -> Value {
        match self {
            Element::Empty => json!({ "type": "empty" }),
            Element::Loading => json!({ "type": "loading" }),
            Element::Text(s) => Value::String(s.clone()),
            Element::Widget(w) => w.to_json(),
            Element::Frame(f) => json!({
                "type": "frame",
                "width": f.width,
                "height": f.height,
                "child": f.child.to_json(),
            }),
            Element::Field(f) => f.to_json(),
        }
    }
}

fn json_to_elements(value: Value) -> Vec<Element> {
    match value {
        Value::Null => Vec::new(),
        Value::String(s) => vec![Element::Text(s)],
        Value::Number(n) => vec![Element::Text(n.to_string())],
        Value::Bool(b) => vec![Element::Text(b.to_string())],
        Value::Array(items) => items.into_iter().flat_map(json_to_elements).collect(),
        Value::Object(_) => {
            log::debug!("[element] Dropping object children prop");
            Vec::new()
        }
    }
}

impl Serialize for Element {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}
