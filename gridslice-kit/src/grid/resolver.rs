//! Data and Action Resolution
//!
//! The renderer treats binding resolution as a swappable backend. This module
//! defines the two contracts and the default store-backed implementations.
//!
//! # Data binding sources
//!
//! ```json
//! {"type": "data", "name": "title", "data": {"source": "static", "value": "Hello"}}
//! {"type": "data", "name": "price", "data": {"source": "valueStream", "path": "item.price"}}
//! {"type": "data", "name": "user",  "data": {"source": "store", "key": "profile", "path": "user"}}
//! ```

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::cell::RefCell;
use std::rc::Rc;

use super::data_model::lookup_path;
use super::node::{BindingDescriptor, ComponentProps, GridItem, SCOPE_SEPARATOR};
use super::registry::WidgetKind;
use super::store::StoreHandle;
use super::value::Handler;

/// Outcome of resolving a node's data bindings.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataResolution {
    /// Static props with every resolved binding overlaid
    pub value: Map<String, Value>,

    /// Only the values the bindings resolved to
    pub raw: Map<String, Value>,

    /// A binding is still waiting for its data
    pub is_loading: bool,
}

/// Resolves data bindings into the node's dynamic data state.
pub trait DataResolver {
    fn resolve_data(
        &self,
        bindings: &[&BindingDescriptor],
        component_props: &ComponentProps,
        value_stream: Option<&Value>,
        kind: WidgetKind,
        node: &GridItem,
    ) -> DataResolution;
}

/// Resolves action bindings into named handlers.
pub trait ActionResolver {
    fn resolve_actions(
        &self,
        bindings: &[&BindingDescriptor],
        node: &GridItem,
        value_stream: Option<&Value>,
    ) -> IndexMap<String, Handler>;
}

/// Default data resolver reading from the shared store and the value stream.
#[derive(Debug, Clone)]
pub struct StoreDataResolver {
    store: StoreHandle,
    separator: char,
}

impl StoreDataResolver {
    pub fn new(store: StoreHandle) -> Self {
        StoreDataResolver {
            store,
            separator: SCOPE_SEPARATOR,
        }
    }

    /// Use a different scope separator when deriving store keys from node ids
    pub fn with_separator(mut self, separator: char) -> Self {
        self.separator = separator;
        self
    }

    /// Resolve one binding. `Err(())` means the data is not available yet.
    fn resolve_binding(
        &self,
        binding: &BindingDescriptor,
        value_stream: Option<&Value>,
        node: &GridItem,
    ) -> Result<Option<Value>, ()> {
        let source = binding.data.get("source").and_then(Value::as_str);
        let path = binding.data.get("path").and_then(Value::as_str).unwrap_or("");

        match source {
            Some("static") => Ok(binding.data.get("value").cloned()),
            Some("valueStream") => Ok(value_stream.and_then(|stream| at_path(stream, path))),
            Some("store") | Some("formData") => {
                let key = binding
                    .data
                    .get("key")
                    .and_then(Value::as_str)
                    .unwrap_or_else(|| node.scope_name(self.separator));

                match self.store.get_form_data(key) {
                    Some(form_data) => Ok(at_path(&form_data, path)),
                    None => {
                        log::debug!("[resolver] Store scope `{}` not ready for {}", key, node.id);
                        Err(())
                    }
                }
            }
            other => {
                log::debug!(
                    "[resolver] Skipping binding `{}` with source {:?}",
                    binding.name,
                    other
                );
                Ok(None)
            }
        }
    }
}

fn at_path(root: &Value, path: &str) -> Option<Value> {
    if path.is_empty() {
        Some(root.clone())
    } else {
        lookup_path(root, path).cloned()
    }
}

impl DataResolver for StoreDataResolver {
    fn resolve_data(
        &self,
        bindings: &[&BindingDescriptor],
        component_props: &ComponentProps,
        value_stream: Option<&Value>,
        _kind: WidgetKind,
        node: &GridItem,
    ) -> DataResolution {
        let mut resolution = DataResolution {
            value: component_props.props.clone(),
            ..Default::default()
        };

        for binding in bindings {
            if binding.name.is_empty() {
                log::warn!("[resolver] Data binding without a name on {}", node.id);
                continue;
            }
            match self.resolve_binding(binding, value_stream, node) {
                Ok(Some(value)) => {
                    resolution.raw.insert(binding.name.clone(), value.clone());
                    resolution.value.insert(binding.name.clone(), value);
                }
                Ok(None) => {}
                Err(()) => resolution.is_loading = true,
            }
        }

        resolution
    }
}

/// An action triggered by a widget event, waiting for the host to handle it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAction {
    /// Node that fired the event
    pub component_id: String,

    /// Handler prop name, e.g. `onClick`
    pub handler: String,

    /// Action name from the binding
    pub action: String,

    /// Context values resolved against the value stream at render time
    #[serde(default)]
    pub context: Map<String, Value>,

    /// Argument the widget passed to the handler
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
}

/// Shared queue of fired actions.
#[derive(Debug, Clone, Default)]
pub struct ActionQueue {
    pending: Rc<RefCell<Vec<UserAction>>>,
}

impl ActionQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, action: UserAction) {
        self.pending.borrow_mut().push(action);
    }

    /// Take all pending actions
    pub fn take_pending(&self) -> Vec<UserAction> {
        std::mem::take(&mut *self.pending.borrow_mut())
    }

    pub fn len(&self) -> usize {
        self.pending.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.borrow().is_empty()
    }
}

/// Default action resolver. Every handler queues a [`UserAction`].
#[derive(Debug, Clone, Default)]
pub struct QueueActionResolver {
    queue: ActionQueue,
}

impl QueueActionResolver {
    pub fn new(queue: ActionQueue) -> Self {
        QueueActionResolver { queue }
    }

    pub fn queue(&self) -> &ActionQueue {
        &self.queue
    }
}

/// Resolve context entries. `{"path": "..."}` reads the value stream, anything
/// else is a literal.
fn resolve_context(data: &Value, value_stream: Option<&Value>) -> Map<String, Value> {
    let mut context = Map::new();
    let Some(entries) = data.get("context").and_then(Value::as_object) else {
        return context;
    };

    for (key, entry) in entries {
        let value = match entry.get("path").and_then(Value::as_str) {
            Some(path) => value_stream
                .and_then(|stream| at_path(stream, path))
                .unwrap_or(Value::Null),
            None => entry.clone(),
        };
        context.insert(key.clone(), value);
    }
    context
}

impl ActionResolver for QueueActionResolver {
    fn resolve_actions(
        &self,
        bindings: &[&BindingDescriptor],
        node: &GridItem,
        value_stream: Option<&Value>,
    ) -> IndexMap<String, Handler> {
        let mut handlers = IndexMap::new();

        for binding in bindings {
            if binding.name.is_empty() {
                continue;
            }

            let queue = self.queue.clone();
            let component_id = node.id.clone();
            let handler_name = binding.name.clone();
            let action = binding
                .data
                .get("action")
                .and_then(Value::as_str)
                .unwrap_or(binding.name.as_str())
                .to_string();
            let context = resolve_context(&binding.data, value_stream);

            let handler = Handler::new(binding.name.clone(), move |payload| {
                log::debug!("[resolver] {} fired {} on {}", handler_name, action, component_id);
                queue.push(UserAction {
                    component_id: component_id.clone(),
                    handler: handler_name.clone(),
                    action: action.clone(),
                    context: context.clone(),
                    payload: payload.cloned(),
                });
            });
            handlers.insert(binding.name.clone(), handler);
        }

        handlers
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn resolve(node: &GridItem, store: &StoreHandle, stream: Option<&Value>) -> DataResolution {
        let (data, _) = node.partition_bindings();
        StoreDataResolver::new(store.clone()).resolve_data(
            &data,
            &node.component_props,
            stream,
            node.widget_kind(),
            node,
        )
    }

    #[test]
    fn test_static_and_value_stream_sources() {
        let node = GridItem::new("t", "text")
            .with_prop("strong", json!(true))
            .with_binding(BindingDescriptor::data(
                "children",
                json!({"source": "valueStream", "path": "name"}),
            ))
            .with_binding(BindingDescriptor::data(
                "type",
                json!({"source": "static", "value": "success"}),
            ));

        let stream = json!({"name": "Ada"});
        let res = resolve(&node, &StoreHandle::default(), Some(&stream));

        assert!(!res.is_loading);
        assert_eq!(
            Value::Object(res.value),
            json!({"strong": true, "children": "Ada", "type": "success"})
        );
        assert_eq!(Value::Object(res.raw), json!({"children": "Ada", "type": "success"}));
    }

    #[test]
    fn test_missing_store_scope_is_loading() {
        let node = GridItem::new("profile$form", "form")
            .with_binding(BindingDescriptor::data("name", json!({"source": "store", "path": "name"})));
        let store = StoreHandle::default();

        assert!(resolve(&node, &store, None).is_loading);

        store.set_form_data("profile", json!({"name": "Grace"}));
        let res = resolve(&node, &store, None);
        assert!(!res.is_loading);
        assert_eq!(res.raw.get("name"), Some(&json!("Grace")));
    }

    #[test]
    fn test_unknown_source_is_skipped() {
        let node = GridItem::new("x", "text")
            .with_binding(BindingDescriptor::data("children", json!({"source": "api"})));
        let res = resolve(&node, &StoreHandle::default(), None);
        assert!(!res.is_loading);
        assert!(res.raw.is_empty());
    }

    #[test]
    fn test_action_handler_queues() {
        let node = GridItem::new("buy", "button").with_binding(BindingDescriptor::action(
            "onClick",
            json!({"action": "purchase", "context": {"sku": {"path": "sku"}, "qty": 1}}),
        ));
        let resolver = QueueActionResolver::default();
        let (_, actions) = node.partition_bindings();
        let stream = json!({"sku": "A-1"});

        let handlers = resolver.resolve_actions(&actions, &node, Some(&stream));
        handlers["onClick"].call(Some(&json!("click")));

        let pending = resolver.queue().take_pending();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].component_id, "buy");
        assert_eq!(pending[0].action, "purchase");
        assert_eq!(Value::Object(pending[0].context.clone()), json!({"sku": "A-1", "qty": 1}));
        assert_eq!(pending[0].payload, Some(json!("click")));
        assert!(resolver.queue().is_empty());
    }
}
