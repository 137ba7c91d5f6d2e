//! Form Binding
//!
//! A form root owns a [`FormState`] seeded from the values its data bindings
//! resolved to. Inside the form, inputs whose binding name appears in the root's
//! `formKeys` become controlled [`FieldElement`]s that read and write a field
//! path of that state. Submitting pushes the state to the store under the
//! scope name of the form's id.

use serde_json::{Value, json};
use std::cell::RefCell;
use std::rc::Rc;

use super::data_model::DataModel;
use super::element::{Element, WidgetElement};
use super::node::{FormKey, GridItem};
use super::props::normalize_dates;
use super::renderer::{Renderer, ResolvedNode, child_key};
use super::value::Handler;

#[derive(Debug)]
struct FormStateInner {
    model: DataModel,

    /// Data the state was last seeded from
    seed: Value,
}

/// Shared state of one form. Clones share the same state.
#[derive(Debug, Clone)]
pub struct FormState {
    inner: Rc<RefCell<FormStateInner>>,
}

impl FormState {
    pub fn new(seed: Value) -> Self {
        FormState {
            inner: Rc::new(RefCell::new(FormStateInner {
                model: DataModel::with_data(seed.clone()),
                seed,
            })),
        }
    }

    /// Reset to `seed` if it differs from the last seed. Returns whether it reset.
    pub fn sync_seed(&self, seed: Value) -> bool {
        let mut inner = self.inner.borrow_mut();
        if inner.seed == seed {
            return false;
        }
        log::debug!("[form] Seed data changed, resetting form state");
        inner.model.replace(seed.clone());
        inner.seed = seed;
        true
    }

    /// Value at a field path
    pub fn get(&self, path: &str) -> Option<Value> {
        self.inner.borrow().model.get(path).cloned()
    }

    /// Write a field path
    pub fn set(&self, path: &str, value: Value) {
        self.inner.borrow_mut().model.set(path, value);
    }

    /// The whole current state
    pub fn snapshot(&self) -> Value {
        self.inner.borrow().model.as_value().clone()
    }

    pub fn version(&self) -> u64 {
        self.inner.borrow().model.version()
    }

    pub fn is_dirty(&self, path: &str) -> bool {
        self.inner.borrow().model.is_dirty(path)
    }
}

/// What descendants of a form root render against.
#[derive(Debug, Clone)]
pub struct FormScope {
    pub form_id: String,
    pub state: FormState,
    pub keys: Rc<[FormKey]>,
}

impl FormScope {
    /// Mapping entry whose `value` matches `binding_name`
    pub fn field_for(&self, binding_name: &str) -> Option<&FormKey> {
        self.keys.iter().find(|k| k.value == binding_name)
    }
}

/// An input widget bound to a field path of a form's state.
#[derive(Debug, Clone)]
pub struct FieldElement {
    pub key: Option<String>,

    /// Field path in the form state
    pub path: String,

    /// The input widget, with `name`, `value` and `onChange` bound
    pub widget: WidgetElement,

    state: FormState,
}

impl FieldElement {
    /// Bind `widget` to `path` of `state`
    pub fn bind(mut widget: WidgetElement, path: impl Into<String>, state: FormState) -> Self {
        let path = path.into();

        let on_change = {
            let state = state.clone();
            let path = path.clone();
            Handler::new("onChange", move |event| {
                state.set(&path, event.map(event_value).unwrap_or(Value::Null));
            })
        };

        widget.props.insert("name", json!(path));
        widget
            .props
            .insert("value", state.get(&path).unwrap_or(Value::Null));
        widget.props.insert("onChange", on_change);

        FieldElement {
            key: widget.key.clone(),
            path,
            widget,
            state,
        }
    }

    /// Live value from the form state
    pub fn value(&self) -> Value {
        self.state.get(&self.path).unwrap_or(Value::Null)
    }

    /// Write a new value, as the widget's `onChange` would
    pub fn change(&self, value: Value) {
        if let Some(on_change) = self.widget.props.handler("onChange") {
            on_change.call(Some(&value));
        }
    }

    pub fn state(&self) -> &FormState {
        &self.state
    }

    pub fn to_json(&self) -> Value {
        json!({
            "type": "field",
            "key": self.key,
            "path": self.path,
            "value": self.value(),
            "widget": self.widget.to_json(),
        })
    }
}

/// Unwrap a change event. `{target: {value}}` and `{target: {checked}}` yield
/// the inner value, anything else is taken as the value itself.
fn event_value(event: &Value) -> Value {
    let Some(target) = event.get("target").filter(|t| t.is_object()) else {
        return event.clone();
    };
    match target.get("value") {
        Some(value) if !value.is_null() => value.clone(),
        _ => target
            .get("checked")
            .cloned()
            .unwrap_or(Value::Null),
    }
}

/// Render a form root and its subtree.
///
/// Form state is held per root id, so sibling forms under one scope stay apart.
/// Submission writes to the store under the root's scope name.
pub(crate) fn render_form(
    renderer: &Renderer,
    node: &GridItem,
    resolved: ResolvedNode,
    value_stream: Option<&Value>,
    ambient_keys: Option<&[FormKey]>,
    key: Option<String>,
) -> Element {
    let form_id = node.id.clone();
    let store_key = node.scope_name(renderer.config().scope_separator).to_string();
    let state = renderer.form_state_for(&form_id, Value::Object(resolved.data.raw.clone()));

    let keys: Rc<[FormKey]> = if node.component_props.form_keys.is_empty() {
        ambient_keys.map(Rc::from).unwrap_or_else(|| Rc::from(Vec::new()))
    } else {
        Rc::from(node.component_props.form_keys.as_slice())
    };

    let mut resolved = resolved;
    let on_finish = {
        let original = resolved.props.handler("onFinish").cloned();
        let store = renderer.store().clone();
        let state = state.clone();
        Handler::new("onFinish", move |_| {
            let data = state.snapshot();
            store.set_form_data(&store_key, data.clone());
            if let Some(original) = &original {
                original.call(Some(&data));
            }
        })
    };
    resolved.props.insert("onFinish", on_finish);

    let scope = FormScope {
        form_id,
        state,
        keys,
    };

    let childs = render_form_childs(renderer, node, &scope, value_stream, key.as_deref());
    Element::Widget(resolved.into_container(key, childs))
}

/// Render a descendant of a form root.
///
/// Inputs are bound or left plain, loading nodes render nothing, and every
/// other node recurses with the same form scope.
pub(crate) fn render_form_item(
    renderer: &Renderer,
    node: &GridItem,
    scope: &FormScope,
    value_stream: Option<&Value>,
    key: String,
) -> Element {
    let kind = node.widget_kind();
    if !kind.is_known() {
        return Element::Empty;
    }

    let resolved = renderer.resolve(node, value_stream);
    let caps = resolved.caps;

    // Inputs are bound before the loading check.
    if caps.is_input {
        let field = node.binding_name().and_then(|name| scope.field_for(name));
        let widget = resolved.into_widget(Some(key));
        return match field {
            Some(field) => {
                let mut field = FieldElement::bind(widget, field.key.clone(), scope.state.clone());
                if caps.is_date_picker {
                    normalize_dates(&mut field.widget.props);
                }
                Element::Field(field)
            }
            None => Element::Widget(widget),
        };
    }

    if resolved.is_loading() {
        return Element::Empty;
    }

    let childs = render_form_childs(renderer, node, scope, value_stream, Some(key.as_str()));
    Element::Widget(resolved.into_container(Some(key), childs))
}

fn render_form_childs(
    renderer: &Renderer,
    node: &GridItem,
    scope: &FormScope,
    value_stream: Option<&Value>,
    parent_key: Option<&str>,
) -> Vec<Element> {
    node.childs
        .iter()
        .enumerate()
        .map(|(index, child)| {
            let key = form_child_key(parent_key, child, index);
            render_form_item(renderer, child, scope, value_stream, key)
        })
        .collect()
}

/// `form-child-{id}`, else the positional fallback
fn form_child_key(parent_key: Option<&str>, child: &GridItem, index: usize) -> String {
    if child.id.is_empty() {
        child_key(parent_key, child, index)
    } else {
        format!("form-child-{}", child.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{BindingDescriptor, PropValue, RenderServices, StoreHandle};

    fn signup_form() -> GridItem {
        let mut form = GridItem::new("signup$form", "form")
            .with_binding(BindingDescriptor::data(
                "user",
                json!({"source": "static", "value": {"name": "Ada"}}),
            ))
            .with_child(
                GridItem::new("row", "formitem")
                    .with_child(GridItem::new("name-input", "inputtext").with_name("name")),
            )
            .with_child(GridItem::new("age-input", "inputnumber").with_name("age"));
        form.component_props.form_keys = vec![FormKey::new("user.name", "name")];
        form
    }

    #[test]
    fn test_controlled_field_binding() {
        let renderer = Renderer::new(RenderServices::new(StoreHandle::default()));
        let el = renderer.render(&signup_form(), None, None);

        let field = el.find("form-child-name-input").and_then(Element::as_field).unwrap();
        assert_eq!(field.path, "user.name");
        assert_eq!(field.value(), json!("Ada"));

        field.change(json!({"target": {"value": "Grace"}}));
        let state = renderer.form_state("signup$form").unwrap();
        assert_eq!(state.get("user.name"), Some(json!("Grace")));
        assert!(state.is_dirty("user.name"));

        // No mapping entry: plain widget
        let age = el.find("form-child-age-input").unwrap();
        assert!(age.as_widget().is_some());
        assert!(age.as_field().is_none());
    }

    #[test]
    fn test_submit_pushes_state_to_store() {
        let store = StoreHandle::default();
        let renderer = Renderer::new(RenderServices::new(store.clone()));
        let el = renderer.render(&signup_form(), None, None);

        el.find("form-child-name-input")
            .and_then(Element::as_field)
            .unwrap()
            .change(json!("Grace"));

        let on_finish = el.as_widget().unwrap().props.handler("onFinish").unwrap();
        on_finish.call(None);

        assert_eq!(
            store.get_form_data("signup"),
            Some(json!({"user": {"name": "Grace"}}))
        );
    }

    #[test]
    fn test_submit_runs_original_handler() {
        let store = StoreHandle::default();
        let services = RenderServices::new(store);
        let queue = services.queue.clone();
        let renderer = Renderer::new(services);

        let form = GridItem::new("f", "form")
            .with_binding(BindingDescriptor::action("onFinish", json!({"action": "save"})));
        let el = renderer.render(&form, None, None);
        el.as_widget().unwrap().props.handler("onFinish").unwrap().call(None);

        let pending = queue.take_pending();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].action, "save");
        assert_eq!(pending[0].payload, Some(json!({})));
    }

    #[test]
    fn test_state_survives_rerender_until_seed_changes() {
        let renderer = Renderer::new(RenderServices::new(StoreHandle::default()));
        let form = signup_form();

        let el = renderer.render(&form, None, None);
        el.find("form-child-name-input")
            .and_then(Element::as_field)
            .unwrap()
            .change(json!("Grace"));

        let el = renderer.render(&form, None, None);
        let field = el.find("form-child-name-input").and_then(Element::as_field).unwrap();
        assert_eq!(field.widget.props.get_json("value"), Some(&json!("Grace")));

        let state = renderer.form_state("signup$form").unwrap();
        assert!(state.sync_seed(json!({"user": {"name": "Linus"}})));
        assert_eq!(state.get("user.name"), Some(json!("Linus")));
        assert!(!state.is_dirty("user.name"));
    }

    #[test]
    fn test_forms_in_one_scope_keep_separate_state() {
        let store = StoreHandle::default();
        let renderer = Renderer::new(RenderServices::new(store.clone()));

        let mut login = GridItem::new("page$login", "form")
            .with_binding(BindingDescriptor::data("user", json!({"source": "static", "value": "alice"})))
            .with_child(GridItem::new("user", "inputtext").with_name("user"));
        login.component_props.form_keys = vec![FormKey::new("user", "user")];

        let mut signup = GridItem::new("page$signup", "form")
            .with_binding(BindingDescriptor::data("email", json!({"source": "static", "value": "x@y"})))
            .with_child(GridItem::new("email", "inputtext").with_name("email"));
        signup.component_props.form_keys = vec![FormKey::new("email", "email")];

        let page = GridItem::new("page", "card").with_child(login).with_child(signup);
        let el = renderer.render(&page, None, None);

        assert_eq!(renderer.form_ids(), vec!["page$login".to_string(), "page$signup".to_string()]);
        let user = el.find("form-child-user").and_then(Element::as_field).unwrap();
        assert_eq!(user.value(), json!("alice"));

        // Re-rendering the sibling form must not reset this one.
        renderer.render(&page, None, None);
        assert_eq!(user.value(), json!("alice"));

        el.find("page$login")
            .and_then(Element::widget)
            .and_then(|w| w.props.handler("onFinish"))
            .unwrap()
            .call(None);
        assert_eq!(store.get_form_data("page"), Some(json!({"user": "alice"})));
    }

    #[test]
    fn test_input_under_no_children_container_is_bound() {
        let renderer = Renderer::new(RenderServices::new(StoreHandle::default()));
        let mut form = GridItem::new("f$form", "form").with_child(
            GridItem::new("panels", "collapse").with_child(GridItem::new("n", "inputtext").with_name("name")),
        );
        form.component_props.form_keys = vec![FormKey::new("user.name", "name")];

        let el = renderer.render(&form, None, None);
        let panels = el.find("form-child-panels").unwrap();
        assert_eq!(panels.children().len(), 1);

        let field = el.find("form-child-n").and_then(Element::as_field).unwrap();
        field.change(json!("Ada"));
        assert_eq!(renderer.form_state("f$form").unwrap().get("user.name"), Some(json!("Ada")));
    }

    #[test]
    fn test_form_children_without_ids_get_positional_keys() {
        let renderer = Renderer::new(RenderServices::new(StoreHandle::default()));
        let form = GridItem::new("f$form", "form")
            .with_child(GridItem::new("", "card").with_child(GridItem::new("", "button")))
            .with_child(GridItem::new("", "card"));

        let el = renderer.render(&form, None, None);
        let keys: Vec<_> = el.children().iter().map(Element::key).collect();
        assert_eq!(keys, vec![Some("f$form/child-0"), Some("f$form/child-1")]);
        assert_eq!(el.children()[0].children()[0].key(), Some("f$form/child-0/child-0"));
    }

    #[test]
    fn test_controlled_date_picker_value_is_date_time() {
        let renderer = Renderer::new(RenderServices::new(StoreHandle::default()));
        let mut form = GridItem::new("f$form", "form")
            .with_binding(BindingDescriptor::data("when", json!({"source": "static", "value": "2024-01-01"})))
            .with_child(GridItem::new("when", "datepicker").with_name("when"));
        form.component_props.form_keys = vec![FormKey::new("when", "when")];

        let el = renderer.render(&form, None, None);
        let field = el.find("form-child-when").and_then(Element::as_field).unwrap();
        let value = field.widget.props.get("value").and_then(PropValue::as_date_time).copied();
        let expected = chrono::NaiveDate::from_ymd_opt(2024, 1, 1).and_then(|d| d.and_hms_opt(0, 0, 0));
        assert_eq!(value, expected);
        assert_eq!(field.value(), json!("2024-01-01"));
    }

    #[test]
    fn test_event_value() {
        assert_eq!(event_value(&json!({"target": {"value": "x"}})), json!("x"));
        assert_eq!(event_value(&json!({"target": {"checked": true}})), json!(true));
        assert_eq!(event_value(&json!(5)), json!(5));
    }
}
