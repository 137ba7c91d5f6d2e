//! Prop Resolution
//!
//! Builds the final prop bag of a widget from its resolved data state, the
//! per-kind static prop transformation, the computed style and the bound
//! action handlers.
//!
//! # Merge order
//!
//! ```text
//! data state  →  converted props  →  css  →  actions
//! (later layers win on key collision, menus skip the data state)
//! ```
//!
//! Sub-trees that must render per item (list rows, table cells, tab panes,
//! footer cells) are stored as [`Deferred`] values and evaluated on demand.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use indexmap::IndexMap;
use serde_json::{Map, Value, json};
use std::fmt;
use std::rc::Rc;

use super::classifier::Capabilities;
use super::element::{Element, WidgetElement};
use super::node::GridItem;
use super::registry::WidgetKind;
use super::renderer::Renderer;
use super::style::Style;
use super::value::{Handler, PropBag, PropValue};

/// Keys that only carry config and never reach a widget.
const CONFIG_KEYS: &[&str] = &["styleMultiple", "dataProps"];

/// Date-time formats accepted besides RFC 3339.
const DATE_TIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"];

/// The four layers merged into a prop bag.
#[derive(Debug, Clone, Default)]
pub struct PropLayers {
    /// Resolved data state (static props with bindings overlaid)
    pub data: Map<String, Value>,

    /// Computed inline style
    pub style: Style,

    /// Resolved action handlers
    pub actions: IndexMap<String, Handler>,
}

/// A sub-tree template bound to the renderer that evaluates it.
#[derive(Clone)]
pub struct LazyTree {
    node: Option<Rc<GridItem>>,
    renderer: Renderer,
}

impl LazyTree {
    /// Build from a raw template value. Malformed or absent templates render empty.
    pub fn from_value(renderer: &Renderer, template: Option<&Value>) -> Self {
        let node = match template {
            None | Some(Value::Null) => None,
            Some(value) => match GridItem::from_value(value.clone()) {
                Ok(node) => Some(Rc::new(node)),
                Err(e) => {
                    log::warn!("[props] Ignoring malformed box template: {}", e);
                    None
                }
            },
        };
        LazyTree {
            node,
            renderer: renderer.clone(),
        }
    }

    /// Template root id
    pub fn id(&self) -> Option<&str> {
        self.node.as_deref().map(|n| n.id.as_str())
    }

    pub fn node(&self) -> Option<&GridItem> {
        self.node.as_deref()
    }

    /// Render the template with `value_stream` as the current item
    pub fn render(&self, value_stream: Option<&Value>) -> Element {
        match &self.node {
            Some(node) => self.renderer.render(node, value_stream, None),
            None => Element::Empty,
        }
    }
}

impl fmt::Debug for LazyTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("LazyTree").field(&self.id()).finish()
    }
}

/// One cell of a table footer row.
#[derive(Debug, Clone)]
pub struct SummaryCell {
    pub key: String,
    pub index: usize,
    pub align: String,
    pub tree: LazyTree,
}

/// A sub-render evaluated when the widget asks for it.
#[derive(Debug, Clone)]
pub enum Deferred {
    /// Tab pane content
    Tree(LazyTree),
    /// List row: the template wrapped in a list item
    ListItem(LazyTree),
    /// Table cell: the column template keyed by its own id
    Cell(LazyTree),
    /// Table footer row
    Summary(Vec<SummaryCell>),
}

impl Deferred {
    /// Evaluate the sub-render. `value_stream` is the current item or cell value.
    pub fn render(&self, value_stream: Option<&Value>) -> Element {
        match self {
            Deferred::Tree(tree) | Deferred::Cell(tree) => tree.render(value_stream),
            Deferred::ListItem(tree) => {
                let widget = tree.renderer.registry().lookup(WidgetKind::ListItem);
                Element::Widget(
                    WidgetElement::new(WidgetKind::ListItem, widget)
                        .with_child(tree.render(value_stream)),
                )
            }
            Deferred::Summary(cells) => {
                let Some(first) = cells.first() else {
                    return Element::Empty;
                };
                let registry = first.tree.renderer.registry();
                let mut row = WidgetElement::new(
                    WidgetKind::SummaryRow,
                    registry.lookup(WidgetKind::SummaryRow),
                );
                for cell in cells {
                    let mut props = PropBag::new();
                    props.insert("index", json!(cell.index));
                    props.insert("align", json!(cell.align));
                    row.children.push(Element::Widget(
                        WidgetElement::new(
                            WidgetKind::SummaryCell,
                            registry.lookup(WidgetKind::SummaryCell),
                        )
                        .with_key(cell.key.clone())
                        .with_props(props)
                        .with_child(cell.tree.render(None)),
                    ));
                }
                Element::Widget(row)
            }
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            Deferred::Tree(tree) => json!({ "$render": "tree", "box": tree.id() }),
            Deferred::ListItem(tree) => json!({ "$render": "listItem", "box": tree.id() }),
            Deferred::Cell(tree) => json!({ "$render": "cell", "box": tree.id() }),
            Deferred::Summary(cells) => json!({
                "$render": "summary",
                "cells": cells
                    .iter()
                    .map(|c| json!({
                        "key": c.key,
                        "index": c.index,
                        "align": c.align,
                        "box": c.tree.id(),
                    }))
                    .collect::<Vec<_>>(),
            }),
        }
    }
}

/// JavaScript-style truthiness of a config value
pub(crate) fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|n| n != 0.0 && !n.is_nan()),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(_)) | Some(Value::Object(_)) => true,
    }
}

/// Render a scalar the way string interpolation would
fn interpolate(value: Option<&Value>) -> String {
    match value {
        None => "undefined".to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Apply the per-kind static prop transformation.
pub fn convert_props(renderer: &Renderer, kind: WidgetKind, initial: &Map<String, Value>) -> PropBag {
    let mut props = PropBag::from_json_map(initial);

    match kind {
        WidgetKind::Tabs => {
            if let Some(Value::Array(items)) = initial.get("items") {
                let items = items
                    .iter()
                    .map(|item| match item {
                        Value::Object(fields) => {
                            let mut tab = PropBag::from_json_map(fields);
                            tab.insert(
                                "children",
                                PropValue::Deferred(Deferred::Tree(LazyTree::from_value(
                                    renderer,
                                    fields.get("children"),
                                ))),
                            );
                            PropValue::Map(tab)
                        }
                        other => PropValue::Json(other.clone()),
                    })
                    .collect();
                props.insert("items", PropValue::List(items));
            }
        }

        WidgetKind::Dropdown => {
            let label = match initial.get("label") {
                Some(Value::String(s)) if !s.is_empty() => s.clone(),
                Some(Value::Number(n)) => n.to_string(),
                _ => kind.name().to_string(),
            };
            let trigger = WidgetElement::new(
                WidgetKind::Button,
                renderer.registry().lookup(WidgetKind::Button),
            )
            .with_child(Element::Text(label));
            props.insert("children", Element::Widget(trigger));
        }

        WidgetKind::List => {
            props.insert(
                "renderItem",
                PropValue::Deferred(Deferred::ListItem(LazyTree::from_value(
                    renderer,
                    initial.get("box"),
                ))),
            );
        }

        WidgetKind::Table => {
            let footer_columns = initial
                .get("footerColumns")
                .and_then(Value::as_array)
                .filter(|cols| !cols.is_empty());

            if let Some(footer_columns) = footer_columns.filter(|_| is_truthy(initial.get("enableFooter"))) {
                let cells = footer_columns
                    .iter()
                    .enumerate()
                    .map(|(index, footer)| SummaryCell {
                        key: match footer.get("key") {
                            Some(key) if is_truthy(Some(key)) => interpolate(Some(key)),
                            _ => index.to_string(),
                        },
                        index,
                        align: footer
                            .get("align")
                            .and_then(Value::as_str)
                            .filter(|a| !a.is_empty())
                            .unwrap_or("left")
                            .to_string(),
                        tree: LazyTree::from_value(renderer, footer.get("box")),
                    })
                    .collect();
                props.insert("summary", PropValue::Deferred(Deferred::Summary(cells)));
            }

            if let Some(Value::Array(columns)) = initial.get("columns") {
                let columns = columns
                    .iter()
                    .map(|column| match column {
                        Value::Object(fields) => {
                            let mut col = PropBag::from_json_map(fields);
                            col.insert(
                                "render",
                                PropValue::Deferred(Deferred::Cell(LazyTree::from_value(
                                    renderer,
                                    fields.get("box"),
                                ))),
                            );
                            PropValue::Map(col)
                        }
                        other => PropValue::Json(other.clone()),
                    })
                    .collect();
                props.insert("columns", PropValue::List(columns));
            }
        }

        WidgetKind::Button => {
            let name = initial.get("iconData").and_then(|icon| icon.get("name"));
            if is_truthy(name) {
                let icon = match name {
                    Some(Value::String(name)) => {
                        let mut icon_props = PropBag::new();
                        icon_props.insert("icon", json!(name));
                        PropValue::from(Element::Widget(
                            WidgetElement::new(WidgetKind::Icon, renderer.registry().lookup(WidgetKind::Icon))
                                .with_props(icon_props),
                        ))
                    }
                    _ => PropValue::Json(Value::Null),
                };
                props.insert("icon", icon);
                props.remove("iconData");
            }
        }

        WidgetKind::Map => {
            if let Some(Value::Array(items)) = initial.get("dataSource") {
                let config = renderer.config();
                let markers = items
                    .iter()
                    .map(|item| {
                        let lat = item.get("lat");
                        let lng = item.get("lng");
                        let mut marker_props = PropBag::new();
                        marker_props.insert("lat", lat.cloned().unwrap_or(Value::Null));
                        marker_props.insert("lng", lng.cloned().unwrap_or(Value::Null));
                        marker_props.insert("text", json!(config.marker_text));
                        marker_props.insert("icon", json!(config.marker_icon));

                        Element::Widget(
                            WidgetElement::new(WidgetKind::Marker, renderer.registry().lookup(WidgetKind::Marker))
                                .with_key(format!("{}-{}", interpolate(lat), interpolate(lng)))
                                .with_props(marker_props),
                        )
                    })
                    .collect();
                props.insert("children", PropValue::Elements(markers));
            }
        }

        // Image, modal, drawer and everything else pass through.
        _ => {}
    }

    props
}

/// Parse a date-time string. Date-only strings resolve to midnight.
pub fn parse_date_time(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_local());
    }
    for format in DATE_TIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Turn date-picker `value` and `defaultValue` strings into date-times.
pub(crate) fn normalize_dates(props: &mut PropBag) {
    for key in ["value", "defaultValue"] {
        let Some(raw) = props.get(key).and_then(PropValue::as_str).map(str::to_string) else {
            continue;
        };
        match parse_date_time(&raw) {
            Some(dt) => {
                props.insert(key, PropValue::DateTime(dt));
            }
            None => log::warn!("[props] Keeping unparseable date `{}` for {}", raw, key),
        }
    }
}

/// Post-merge normalization that applies to every kind.
fn normalize(props: &mut PropBag, caps: Capabilities) {
    if caps.is_date_picker {
        normalize_dates(props);
    }

    if caps.is_no_children {
        props.remove("children");
    }

    for key in CONFIG_KEYS {
        props.remove(key);
    }
}

/// Merge the layers of a node into its final prop bag.
pub fn resolve_props(renderer: &Renderer, kind: WidgetKind, caps: Capabilities, layers: PropLayers) -> PropBag {
    let PropLayers { data, style, actions } = layers;

    let mut props = PropBag::new();
    if kind != WidgetKind::Menu {
        props.merge(PropBag::from_json_map(&data));
    }
    props.merge(convert_props(renderer, kind, &data));
    props.insert("css", PropValue::Style(style));
    for (name, handler) in actions {
        props.insert(name, handler);
    }

    normalize(&mut props, caps);

    renderer.services().sanitizer.sanitize(props, kind)
}
