//! # Element Factory
//!
//! Builds fresh nodes from a [`NodeSpec`]: per-kind defaults first, caller
//! overrides shallow-merged on top, a generated identifier always.

use chrono::{DateTime, Utc};
use formedit_schema::{AttributeRegistry, Config, IdGenerator, Node, NodeKind, NodeMeta, Style, Visibility};
use serde_json::{json, Value};

use crate::errors::OperationError;
use crate::operations::{NodeSpec, StructureSpec};

/// Node built by the factory plus any style keys it refused
#[derive(Debug, Clone, PartialEq)]
pub struct Built {
    pub node: Node,
    pub dropped: Vec<OperationError>,
}

/// Constructs nodes with regenerated identifiers.
///
/// Borrows the batch's identifier generator and attribute registry for the
/// duration of one operation.
pub struct ElementFactory<'a> {
    ids: &'a mut IdGenerator,
    registry: &'a mut AttributeRegistry,
    now: DateTime<Utc>,
}

impl<'a> ElementFactory<'a> {
    pub fn new(ids: &'a mut IdGenerator, registry: &'a mut AttributeRegistry, now: DateTime<Utc>) -> Self {
        Self { ids, registry, now }
    }

    /// Default configuration baseline for a kind
    pub fn default_config(kind: NodeKind) -> Config {
        let defaults = match kind {
            NodeKind::Group => json!({
                "collapsible": false,
                "show_in_toc": false,
                "default_open": true,
                "hide_label": false,
            }),
            NodeKind::Text => json!({}),
            NodeKind::Field => json!({
                "required": false,
                "read_only": false,
                "hide_label": false,
            }),
        };
        match defaults {
            Value::Object(map) => map,
            _ => Config::new(),
        }
    }

    /// Default styling baseline for a kind
    pub fn default_style(kind: NodeKind) -> Style {
        let mut style = Style::new();
        if kind == NodeKind::Group {
            style.insert("margin_bottom".to_string(), "16px".to_string());
        }
        style
    }

    /// Check a spec before anything is built or registered
    pub fn validate(spec: &NodeSpec) -> Result<(), OperationError> {
        if spec.element_type == NodeKind::Field
            && spec.field_name.as_deref().map_or(true, str::is_empty)
        {
            return Err(OperationError::malformed("field nodes need a field_name"));
        }
        Ok(())
    }

    pub fn validate_tree(structure: &StructureSpec) -> Result<(), OperationError> {
        Self::validate(&structure.node)?;
        if !structure.children.is_empty() && structure.node.element_type != NodeKind::Group {
            return Err(OperationError::InvalidStructure(format!(
                "{} nodes cannot have children",
                structure.node.element_type
            )));
        }
        structure.children.iter().try_for_each(Self::validate_tree)
    }

    /// Build a single node, registering its field when absent
    pub fn build(&mut self, spec: &NodeSpec) -> Result<Built, OperationError> {
        Self::validate(spec)?;
        Ok(self.build_unchecked(spec, Vec::new()))
    }

    /// Build a whole structure, regenerating every identifier in it
    pub fn build_tree(&mut self, structure: &StructureSpec) -> Result<Built, OperationError> {
        Self::validate_tree(structure)?;
        Ok(self.build_tree_unchecked(structure))
    }

    fn build_tree_unchecked(&mut self, structure: &StructureSpec) -> Built {
        let mut dropped = Vec::new();
        let mut children = Vec::with_capacity(structure.children.len());
        for child in &structure.children {
            let built = self.build_tree_unchecked(child);
            dropped.extend(built.dropped);
            children.push(built.node);
        }
        self.build_unchecked(&structure.node, children).merge_dropped(dropped)
    }

    fn build_unchecked(&mut self, spec: &NodeSpec, children: Vec<Node>) -> Built {
        let kind = spec.element_type;
        let mut dropped = Vec::new();

        let mut meta = NodeMeta::new(self.ids.new_id());
        meta.label = spec.label.clone();

        meta.config = Self::default_config(kind);
        for (key, value) in &spec.config {
            meta.config.insert(key.clone(), value.clone());
        }

        meta.style = Self::default_style(kind);
        for (key, value) in &spec.style {
            if kind.allows_style(key) {
                meta.style.insert(key.clone(), value.clone());
            } else {
                dropped.push(OperationError::disallowed(key.as_str(), kind));
            }
        }

        meta.visibility = Visibility::default();
        if let Some(patch) = &spec.visibility {
            patch.apply_to(&mut meta.visibility);
        }
        meta.visibility.condition = spec.condition.clone();

        let node = match kind {
            NodeKind::Group => Node::group(meta, children),
            NodeKind::Text => Node::text(meta, spec.content.clone().unwrap_or_default()),
            NodeKind::Field => {
                let field_name = spec.field_name.clone().unwrap_or_default();
                self.registry.ensure(&field_name, self.now);
                Node::field(meta, field_name)
            }
        };

        Built { node, dropped }
    }
}

impl Built {
    fn merge_dropped(mut self, mut earlier: Vec<OperationError>) -> Self {
        earlier.append(&mut self.dropped);
        self.dropped = earlier;
        self
    }
}
