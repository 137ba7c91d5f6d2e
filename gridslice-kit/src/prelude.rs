//! Common imports for hosts embedding the renderer.

pub use crate::grid::{
    ActionQueue, Capabilities, DataResolver, Element, FormKey, GridError, GridItem, GridSurface,
    Handler, PropBag, PropValue, RenderConfig, Renderer, RenderServices, StoreHandle, WidgetKind,
    WidgetRegistry,
};
