//! Recursive Renderer
//!
//! Walks a [`GridItem`] tree and produces an [`Element`] tree. Per node:
//!
//! 1. Classify the widget kind once ([`Capabilities`]).
//! 2. Resolve data, actions and style through the injected [`RenderServices`].
//! 3. Merge the final prop bag ([`resolve_props`]).
//! 4. Pick the [`RenderPath`] and dispatch.
//!
//! Rendering never fails. Unknown kinds and missing templates degrade to
//! placeholders so one bad node cannot blank the tree.

use indexmap::IndexMap;
use serde_json::Value;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use super::classifier::{Capabilities, RenderPath};
use super::config::RenderConfig;
use super::element::{Element, FrameElement, WidgetElement};
use super::form::{self, FormState};
use super::node::{FormKey, GridItem};
use super::props::{PropLayers, resolve_props};
use super::registry::{WidgetKind, WidgetRegistry};
use super::resolver::{
    ActionQueue, ActionResolver, DataResolution, DataResolver, QueueActionResolver,
    StoreDataResolver,
};
use super::sanitize::{DefaultSanitizer, PropSanitizer};
use super::store::StoreHandle;
use super::style::{CssStyleComputer, StyleComputer};
use super::value::PropBag;

/// The swappable collaborators the renderer calls into.
#[derive(Clone)]
pub struct RenderServices {
    pub data: Rc<dyn DataResolver>,
    pub actions: Rc<dyn ActionResolver>,
    pub style: Rc<dyn StyleComputer>,
    pub sanitizer: Rc<dyn PropSanitizer>,

    /// Form-state and value store
    pub store: StoreHandle,

    /// Queue the default action resolver writes to
    pub queue: ActionQueue,
}

impl RenderServices {
    /// Default backends over `store`
    pub fn new(store: StoreHandle) -> Self {
        let queue = ActionQueue::new();
        RenderServices {
            data: Rc::new(StoreDataResolver::new(store.clone())),
            actions: Rc::new(QueueActionResolver::new(queue.clone())),
            style: Rc::new(CssStyleComputer),
            sanitizer: Rc::new(DefaultSanitizer),
            store,
            queue,
        }
    }

    pub fn with_data_resolver(mut self, resolver: impl DataResolver + 'static) -> Self {
        self.data = Rc::new(resolver);
        self
    }

    pub fn with_action_resolver(mut self, resolver: impl ActionResolver + 'static) -> Self {
        self.actions = Rc::new(resolver);
        self
    }

    pub fn with_style_computer(mut self, computer: impl StyleComputer + 'static) -> Self {
        self.style = Rc::new(computer);
        self
    }

    pub fn with_sanitizer(mut self, sanitizer: impl PropSanitizer + 'static) -> Self {
        self.sanitizer = Rc::new(sanitizer);
        self
    }
}

impl fmt::Debug for RenderServices {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderServices")
            .field("store", &self.store)
            .field("queue", &self.queue)
            .finish_non_exhaustive()
    }
}

/// A node after the per-node resolution pipeline.
#[derive(Debug, Clone)]
pub struct ResolvedNode {
    pub kind: WidgetKind,
    pub caps: Capabilities,

    /// Toolkit widget name
    pub widget: &'static str,

    pub props: PropBag,
    pub data: DataResolution,
}

impl ResolvedNode {
    pub fn is_loading(&self) -> bool {
        self.data.is_loading
    }

    pub fn path(&self) -> RenderPath {
        RenderPath::decide(self.kind, self.caps, self.data.is_loading)
    }

    /// Instantiate the widget. A `children` prop fills the children slot.
    pub fn into_widget(self, key: Option<String>) -> WidgetElement {
        let mut props = self.props;
        let children = props
            .remove("children")
            .map(Element::from_children_prop)
            .unwrap_or_default();
        WidgetElement {
            key,
            kind: self.kind,
            widget: self.widget,
            props,
            children,
        }
    }

    /// Instantiate as a container. Rendered `childs` replace the `children`
    /// prop when there are any. Containers never receive `style`.
    pub fn into_container(self, key: Option<String>, childs: Vec<Element>) -> WidgetElement {
        let mut widget = self.into_widget(key);
        widget.props.remove("style");
        if !childs.is_empty() {
            widget.children = childs;
        }
        widget
    }
}

struct RendererInner {
    registry: WidgetRegistry,
    services: RenderServices,
    config: RenderConfig,

    /// Form state per form id, kept across render passes
    forms: RefCell<IndexMap<String, FormState>>,
}

/// Renders grid item trees. Cheap to clone; clones share state.
#[derive(Clone)]
pub struct Renderer {
    inner: Rc<RendererInner>,
}

impl fmt::Debug for Renderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Renderer")
            .field("config", &self.inner.config)
            .field("forms", &self.form_ids())
            .finish_non_exhaustive()
    }
}

impl Renderer {
    /// Renderer with the standard catalog and default config
    pub fn new(services: RenderServices) -> Self {
        Self::with_config(services, RenderConfig::default())
    }

    pub fn with_config(services: RenderServices, config: RenderConfig) -> Self {
        Self::with_parts(WidgetRegistry::with_standard_catalog(), services, config)
    }

    pub fn with_parts(registry: WidgetRegistry, services: RenderServices, config: RenderConfig) -> Self {
        Renderer {
            inner: Rc::new(RendererInner {
                registry,
                services,
                config,
                forms: RefCell::new(IndexMap::new()),
            }),
        }
    }

    pub fn registry(&self) -> &WidgetRegistry {
        &self.inner.registry
    }

    pub fn services(&self) -> &RenderServices {
        &self.inner.services
    }

    pub fn config(&self) -> &RenderConfig {
        &self.inner.config
    }

    pub fn store(&self) -> &StoreHandle {
        &self.inner.services.store
    }

    pub fn actions(&self) -> &ActionQueue {
        &self.inner.services.queue
    }

    /// Form state of a rendered form
    pub fn form_state(&self, form_id: &str) -> Option<FormState> {
        self.inner.forms.borrow().get(form_id).cloned()
    }

    /// Ids of every form rendered so far, in first-render order
    pub fn form_ids(&self) -> Vec<String> {
        self.inner.forms.borrow().keys().cloned().collect()
    }

    /// Sum of all form state versions, for change detection
    pub fn forms_version(&self) -> u64 {
        self.inner.forms.borrow().values().map(FormState::version).sum()
    }

    /// Form state for `form_id`, created from `seed` or reset when `seed` changed
    pub(crate) fn form_state_for(&self, form_id: &str, seed: Value) -> FormState {
        let mut forms = self.inner.forms.borrow_mut();
        match forms.get(form_id) {
            Some(state) => {
                state.sync_seed(seed);
                state.clone()
            }
            None => {
                log::debug!("[renderer] Creating form state for {}", form_id);
                let state = FormState::new(seed);
                forms.insert(form_id.to_string(), state.clone());
                state
            }
        }
    }

    /// Render a tree.
    ///
    /// `value_stream` is the current item for collection templates. `form_keys`
    /// is an ambient form-key mapping used by forms that declare none.
    pub fn render(&self, tree: &GridItem, value_stream: Option<&Value>, form_keys: Option<&[FormKey]>) -> Element {
        let key = (!tree.id.is_empty()).then(|| tree.id.clone());
        self.render_node(tree, value_stream, form_keys, key)
    }

    /// Run the per-node resolution pipeline.
    pub fn resolve(&self, node: &GridItem, value_stream: Option<&Value>) -> ResolvedNode {
        let kind = node.widget_kind();
        let caps = kind.capabilities();
        let services = self.services();

        let (data_bindings, action_bindings) = node.partition_bindings();
        let data = services.data.resolve_data(
            &data_bindings,
            &node.component_props,
            value_stream,
            kind,
            node,
        );
        let actions = services.actions.resolve_actions(&action_bindings, node, value_stream);

        let style_spec = data
            .value
            .get("styleMultiple")
            .or(node.component_props.style_multiple.as_ref());
        let style = services.style.compute_style(style_spec);

        let props = resolve_props(
            self,
            kind,
            caps,
            PropLayers {
                data: data.value.clone(),
                style,
                actions,
            },
        );

        ResolvedNode {
            kind,
            caps,
            widget: self.registry().lookup(kind),
            props,
            data,
        }
    }

    pub(crate) fn render_node(
        &self,
        node: &GridItem,
        value_stream: Option<&Value>,
        form_keys: Option<&[FormKey]>,
        key: Option<String>,
    ) -> Element {
        let kind = node.widget_kind();
        if !kind.is_known() {
            log::debug!("[renderer] Unknown widget kind `{}` on node `{}`", node.value, node.id);
            return Element::Empty;
        }

        let resolved = self.resolve(node, value_stream);
        match resolved.path() {
            RenderPath::Empty => Element::Empty,
            RenderPath::Loading => Element::Loading,
            RenderPath::Form => form::render_form(self, node, resolved, value_stream, form_keys, key),
            RenderPath::Leaf => Element::Widget(resolved.into_widget(key)),
            RenderPath::Map => self.frame(resolved.into_widget(key)),
            RenderPath::Container => {
                let childs = node
                    .childs
                    .iter()
                    .enumerate()
                    .map(|(index, child)| {
                        let child_key = child_key(key.as_deref(), child, index);
                        self.render_node(child, value_stream, form_keys, Some(child_key))
                    })
                    .collect();
                Element::Widget(resolved.into_container(key, childs))
            }
        }
    }

    /// Wrap a map widget in a sized frame
    pub(crate) fn frame(&self, widget: WidgetElement) -> Element {
        let config = self.config();
        let width = dimension(widget.props.get_json("width")).unwrap_or_else(|| config.map_width.clone());
        let height = dimension(widget.props.get_json("height")).unwrap_or_else(|| config.map_height.clone());
        Element::Frame(FrameElement {
            width,
            height,
            child: Box::new(Element::Widget(widget)),
        })
    }
}

/// Stable child key: the child's own id, else a positional fallback
pub(crate) fn child_key(parent_key: Option<&str>, child: &GridItem, index: usize) -> String {
    if !child.id.is_empty() {
        return child.id.clone();
    }
    match parent_key {
        Some(parent) => format!("{}/child-{}", parent, index),
        None => format!("child-{}", index),
    }
}

/// CSS dimension from a prop. Numbers are pixels.
fn dimension(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(format!("{}px", n)),
        _ => None,
    }
}
