//! Grid Surface
//!
//! The stateful host wrapper around a [`Renderer`]: holds the current root and
//! value stream, and tracks whether anything it renders from changed since the
//! last pass.

use serde_json::Value;

use super::element::Element;
use super::error::GridResult;
use super::node::GridItem;
use super::renderer::Renderer;
use super::resolver::UserAction;

#[derive(Debug)]
pub struct GridSurface {
    renderer: Renderer,
    root: Option<GridItem>,
    value_stream: Option<Value>,

    /// Set by root/value-stream changes, cleared by `render`
    dirty: bool,

    /// Store and form versions seen by the last render
    rendered_versions: Option<(u64, u64)>,
}

impl GridSurface {
    pub fn new(renderer: Renderer) -> Self {
        GridSurface {
            renderer,
            root: None,
            value_stream: None,
            dirty: true,
            rendered_versions: None,
        }
    }

    pub fn renderer(&self) -> &Renderer {
        &self.renderer
    }

    pub fn root(&self) -> Option<&GridItem> {
        self.root.as_ref()
    }

    pub fn set_root(&mut self, root: GridItem) {
        self.root = Some(root);
        self.dirty = true;
    }

    /// Parse and install a root tree from JSON
    pub fn load_json(&mut self, json: &str) -> GridResult<()> {
        let root = GridItem::from_json(json)?;
        log::debug!("[surface] Loaded root `{}`", root.id);
        self.set_root(root);
        Ok(())
    }

    pub fn set_value_stream(&mut self, value_stream: Option<Value>) {
        self.value_stream = value_stream;
        self.dirty = true;
    }

    pub fn clear(&mut self) {
        self.root = None;
        self.dirty = true;
    }

    /// Force the next `needs_redraw` to report true
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Whether the root, the store or any form state changed since the last render
    pub fn needs_redraw(&self) -> bool {
        self.dirty || self.rendered_versions != Some(self.versions())
    }

    /// Render the current root. Without a root this is an empty placeholder.
    pub fn render(&mut self) -> Element {
        let element = match &self.root {
            Some(root) => self.renderer.render(root, self.value_stream.as_ref(), None),
            None => Element::Empty,
        };
        // Rendering may create form state, so versions are read afterwards.
        self.rendered_versions = Some(self.versions());
        self.dirty = false;
        element
    }

    /// Take the actions fired since the last call
    pub fn take_pending_actions(&self) -> Vec<UserAction> {
        self.renderer.actions().take_pending()
    }

    fn versions(&self) -> (u64, u64) {
        (self.renderer.store().version(), self.renderer.forms_version())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{RenderServices, StoreHandle};
    use serde_json::json;

    fn surface() -> GridSurface {
        GridSurface::new(Renderer::new(RenderServices::new(StoreHandle::default())))
    }

    #[test]
    fn test_redraw_tracking() {
        let mut surface = surface();
        assert!(surface.render().is_empty());

        surface
            .load_json(r#"{"id": "root", "value": "card", "childs": []}"#)
            .unwrap();
        assert!(surface.needs_redraw());

        let el = surface.render();
        assert_eq!(el.key(), Some("root"));
        assert!(!surface.needs_redraw());

        surface.renderer().store().set_form_data("other", json!({}));
        assert!(surface.needs_redraw());
        surface.render();
        assert!(!surface.needs_redraw());

        surface.set_value_stream(Some(json!(1)));
        assert!(surface.needs_redraw());
    }

    #[test]
    fn test_load_json_rejects_non_object_root() {
        let mut surface = surface();
        assert!(surface.load_json("[1, 2]").is_err());
        assert!(surface.root().is_none());
    }

    #[test]
    fn test_pending_actions() {
        let mut surface = surface();
        surface
            .load_json(
                r#"{"id": "go", "value": "button", "componentProps": {"dataProps": [
                    {"type": "MouseEventHandler<HTMLElement>", "name": "onClick", "data": {"action": "go"}}
                ]}}"#,
            )
            .unwrap();

        let el = surface.render();
        el.as_widget().unwrap().props.handler("onClick").unwrap().call(None);

        let actions = surface.take_pending_actions();
        assert_eq!(actions.len(), 1);
        assert_eq!(actions[0].component_id, "go");
        assert!(surface.take_pending_actions().is_empty());
    }
}
