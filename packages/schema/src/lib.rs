//! # Formedit Schema
//!
//! Data model for hierarchical form schemas: a forest of group, text and
//! field nodes plus the attribute registry that field nodes point into.
//!
//! ```text
//! Document
//! ├── nodes: [Node]           group | text | field
//! │     └── group.children    ordered, arbitrary depth
//! └── attributes              field name → metadata
//! ```
//!
//! This crate is pure data: lookup, identifier generation and traversal.
//! Editing lives in `formedit-editor`.

pub mod id_generator;
pub mod locator;
pub mod model;
pub mod registry;
pub mod visitor;

pub use id_generator::{seed_from, IdGenerator};
pub use locator::{NodePath, ParentContext};
pub use model::{
    Condition, ConditionMode, Config, Document, Node, NodeKind, NodeMeta, Style, Visibility,
};
pub use registry::{AttributeEntry, AttributeRegistry, ValueKind};
pub use visitor::{
    collect_field_names, collect_ids, walk_node, walk_node_mut, walk_nodes, walk_nodes_mut, Visitor,
    VisitorMut,
};
