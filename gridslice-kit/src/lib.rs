//! # Description
//!
//! Gridslice Kit is a Rust crate that renders declarative "grid item" trees into
//! a toolkit-agnostic widget tree.
//!
//! Every node of the input tree names a widget kind, carries static props, data
//! bindings and child nodes. The renderer resolves the bindings, merges the prop
//! layers, wires event handlers and recurses, producing an [`grid::Element`]
//! tree that a host UI runtime can materialize.
//!
//! # Features
//!
//! - 🧩 Closed catalog of widget kinds with capability classification.
//! - 🔗 Pluggable data, action, style and sanitizer backends.
//! - 📝 Form subtrees with controlled fields bound to shared form state.
//! - 📋 Lists and tables rendering per-item sub-trees with a value stream.

pub mod grid;

pub mod prelude;
