use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

use crate::registry::AttributeRegistry;

/// Free-form configuration values keyed by name
pub type Config = Map<String, Value>;

/// Styling declarations keyed by property name
pub type Style = BTreeMap<String, String>;

/// Root document: an ordered forest of nodes plus the attribute registry
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Document {
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub attributes: AttributeRegistry,
}

/// Properties shared by every node variant
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NodeMeta {
    pub uid: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default)]
    pub config: Config,
    #[serde(default)]
    pub style: Style,
    #[serde(default)]
    pub visibility: Visibility,
}

impl NodeMeta {
    pub fn new(uid: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            ..Self::default()
        }
    }
}

/// Form schema node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Node {
    /// Section that owns an ordered list of child nodes
    Group {
        #[serde(flatten)]
        meta: NodeMeta,
        #[serde(default)]
        children: Vec<Node>,
    },

    /// Literal markup block
    Text {
        #[serde(flatten)]
        meta: NodeMeta,
        #[serde(default)]
        content: String,
    },

    /// Reference to an entry of the attribute registry
    Field {
        #[serde(flatten)]
        meta: NodeMeta,
        field_name: String,
    },
}

/// Discriminant of [`Node`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Group,
    Text,
    Field,
}

const GROUP_STYLE_KEYS: &[&str] = &[
    "background_color",
    "border_color",
    "border_width",
    "border_radius",
    "color",
    "font_size",
    "font_weight",
    "padding",
    "padding_top",
    "padding_bottom",
    "margin",
    "margin_top",
    "margin_bottom",
    "text_align",
    "width",
];

const SPACING_STYLE_KEYS: &[&str] = &[
    "padding",
    "padding_top",
    "padding_bottom",
    "margin",
    "margin_top",
    "margin_bottom",
    "text_align",
];

impl NodeKind {
    pub fn name(self) -> &'static str {
        match self {
            NodeKind::Group => "group",
            NodeKind::Text => "text",
            NodeKind::Field => "field",
        }
    }

    /// Styling properties a node of this kind may carry.
    ///
    /// Groups accept the full box/typography set; text and field nodes only
    /// accept spacing and alignment.
    pub fn allowed_style_keys(self) -> &'static [&'static str] {
        match self {
            NodeKind::Group => GROUP_STYLE_KEYS,
            NodeKind::Text | NodeKind::Field => SPACING_STYLE_KEYS,
        }
    }

    pub fn allows_style(self, key: &str) -> bool {
        self.allowed_style_keys().contains(&key)
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Display and workflow-state rules of a node
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Visibility {
    #[serde(default)]
    pub hidden: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub hidden_states: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub visible_states: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub read_only_states: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<Condition>,
}

/// Conditional visibility rule: show or hide when `field` holds one of `values`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub field: String,
    #[serde(default)]
    pub values: Vec<String>,
    #[serde(default)]
    pub mode: ConditionMode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionMode {
    #[default]
    Show,
    Hide,
}

impl Node {
    pub fn group(meta: NodeMeta, children: Vec<Node>) -> Self {
        Node::Group { meta, children }
    }

    pub fn text(meta: NodeMeta, content: impl Into<String>) -> Self {
        Node::Text {
            meta,
            content: content.into(),
        }
    }

    pub fn field(meta: NodeMeta, field_name: impl Into<String>) -> Self {
        Node::Field {
            meta,
            field_name: field_name.into(),
        }
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            Node::Group { .. } => NodeKind::Group,
            Node::Text { .. } => NodeKind::Text,
            Node::Field { .. } => NodeKind::Field,
        }
    }

    pub fn meta(&self) -> &NodeMeta {
        match self {
            Node::Group { meta, .. } | Node::Text { meta, .. } | Node::Field { meta, .. } => meta,
        }
    }

    pub fn meta_mut(&mut self) -> &mut NodeMeta {
        match self {
            Node::Group { meta, .. } | Node::Text { meta, .. } | Node::Field { meta, .. } => meta,
        }
    }

    pub fn uid(&self) -> &str {
        &self.meta().uid
    }

    pub fn label(&self) -> Option<&str> {
        self.meta().label.as_deref()
    }

    /// Children of a group; `None` for leaf variants
    pub fn children(&self) -> Option<&Vec<Node>> {
        match self {
            Node::Group { children, .. } => Some(children),
            _ => None,
        }
    }

    pub fn children_mut(&mut self) -> Option<&mut Vec<Node>> {
        match self {
            Node::Group { children, .. } => Some(children),
            _ => None,
        }
    }

    pub fn content(&self) -> Option<&str> {
        match self {
            Node::Text { content, .. } => Some(content),
            _ => None,
        }
    }

    pub fn field_name(&self) -> Option<&str> {
        match self {
            Node::Field { field_name, .. } => Some(field_name),
            _ => None,
        }
    }

    /// Read a boolean configuration flag, treating absence as `false`
    pub fn flag(&self, key: &str) -> bool {
        self.meta()
            .config
            .get(key)
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    pub fn set_flag(&mut self, key: &str, value: bool) {
        self.meta_mut()
            .config
            .insert(key.to_string(), Value::Bool(value));
    }

    /// Number of nodes in this subtree, including `self`
    pub fn subtree_len(&self) -> usize {
        1 + self
            .children()
            .map(|children| children.iter().map(Node::subtree_len).sum())
            .unwrap_or(0)
    }
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of nodes in the forest
    pub fn node_count(&self) -> usize {
        self.nodes.iter().map(Node::subtree_len).sum()
    }
}
