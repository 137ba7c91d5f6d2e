//! Grid Item Renderer
//!
//! A grid item tree is a declarative description of a UI: each node names a
//! widget kind, static props, data/action bindings and child nodes. This module
//! turns such a tree into an [`Element`] tree.
//!
//! # Architecture
//!
//! ```text
//!        GridItem tree
//!              ↓
//!   ┌──── Renderer ─────────────────┐
//!   │  classify → Capabilities      │
//!   │  DataResolver / ActionResolver│
//!   │  resolve_props → PropBag      │
//!   │  RenderPath::decide           │
//!   └──────────────┬────────────────┘
//!          ┌───────┴────────┐
//!          │                │
//!   generic recursion   form subtree
//!          │           (FormState, Field)
//!          └───────┬────────┘
//!                  ↓
//!            Element tree
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use gridslice_kit::grid::*;
//!
//! let tree = GridItem::from_json(r#"{"id": "root", "value": "card", "childs": []}"#)?;
//! let renderer = Renderer::new(RenderServices::new(StoreHandle::default()));
//! let element = renderer.render(&tree, None, None);
//! ```

mod classifier;
mod config;
mod data_model;
mod element;
mod error;
mod form;
mod node;
mod props;
mod registry;
mod renderer;
mod resolver;
mod sanitize;
mod store;
mod style;
mod surface;
mod value;

pub use classifier::*;
pub use config::*;
pub use data_model::*;
pub use element::*;
pub use error::*;
pub use form::*;
pub use node::*;
pub use props::*;
pub use registry::*;
pub use renderer::*;
pub use resolver::*;
pub use sanitize::*;
pub use store::*;
pub use style::*;
pub use surface::*;
pub use value::*;
