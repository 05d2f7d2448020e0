//! # Operations
//!
//! Structural edits proposed by the planner, one tagged record each.
//!
//! ## Addressing
//!
//! Every address field takes a reference string:
//! - `"root"`: the document's top-level list
//! - `"$name"`: an alias bound earlier in the same batch
//! - anything else: a concrete node identifier
//!
//! ## Decoding
//!
//! A batch is decoded entry by entry. An entry that does not decode into an
//! [`Operation`] stays in the batch as [`BatchEntry::Malformed`] and is skipped
//! when the batch runs, so one bad record never hides the rest.

use formedit_schema::{Condition, Config, NodeKind, Style, Visibility};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Placement relative to an anchor node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Position {
    Before,
    After,
    InsideStart,
    #[serde(alias = "inside")]
    InsideEnd,
    Replace,
}

impl Position {
    pub fn name(self) -> &'static str {
        match self {
            Position::Before => "before",
            Position::After => "after",
            Position::InsideStart => "inside_start",
            Position::InsideEnd => "inside_end",
            Position::Replace => "replace",
        }
    }
}

/// Partial update of a node's visibility rules
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VisibilityPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hidden: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hidden_states: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visible_states: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read_only_states: Option<Vec<String>>,
}

impl VisibilityPatch {
    pub fn apply_to(&self, visibility: &mut Visibility) {
        if let Some(hidden) = self.hidden {
            visibility.hidden = hidden;
        }
        if let Some(states) = &self.hidden_states {
            visibility.hidden_states = states.clone();
        }
        if let Some(states) = &self.visible_states {
            visibility.visible_states = states.clone();
        }
        if let Some(states) = &self.read_only_states {
            visibility.read_only_states = states.clone();
        }
    }
}

/// Description of a single node to construct
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeSpec {
    pub element_type: NodeKind,
    /// Caller-supplied identifier; never trusted, always regenerated
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_name: Option<String>,
    #[serde(default, skip_serializing_if = "Config::is_empty")]
    pub config: Config,
    #[serde(default, skip_serializing_if = "Style::is_empty")]
    pub style: Style,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visibility: Option<VisibilityPatch>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<Condition>,
}

impl NodeSpec {
    pub fn new(element_type: NodeKind) -> Self {
        Self {
            element_type,
            uid: None,
            label: None,
            content: None,
            field_name: None,
            config: Config::new(),
            style: Style::new(),
            visibility: None,
            condition: None,
        }
    }

    pub fn group(label: impl Into<String>) -> Self {
        Self::new(NodeKind::Group).with_label(label)
    }

    pub fn text(content: impl Into<String>) -> Self {
        let mut spec = Self::new(NodeKind::Text);
        spec.content = Some(content.into());
        spec
    }

    pub fn field(field_name: impl Into<String>) -> Self {
        let mut spec = Self::new(NodeKind::Field);
        spec.field_name = Some(field_name.into());
        spec
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_config(mut self, key: impl Into<String>, value: Value) -> Self {
        self.config.insert(key.into(), value);
        self
    }

    pub fn with_style(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.style.insert(key.into(), value.into());
        self
    }
}

/// Node description with nested children, for whole-subtree substitution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructureSpec {
    #[serde(flatten)]
    pub node: NodeSpec,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<StructureSpec>,
}

impl StructureSpec {
    pub fn leaf(node: NodeSpec) -> Self {
        Self {
            node,
            children: Vec::new(),
        }
    }

    pub fn with_child(mut self, child: StructureSpec) -> Self {
        self.children.push(child);
        self
    }

    /// Number of nodes this structure describes
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(StructureSpec::node_count).sum::<usize>()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddOp {
    #[serde(default, alias = "after_uid", alias = "parent_uid")]
    pub target: Option<String>,
    #[serde(default)]
    pub position: Option<Position>,
    #[serde(default)]
    pub alias: Option<String>,
    #[serde(flatten)]
    pub spec: NodeSpec,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EditOp {
    #[serde(alias = "target")]
    pub uid: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read_only: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hidden: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hide_label: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collapsible: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_in_toc: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_open: Option<bool>,
    #[serde(default, skip_serializing_if = "Config::is_empty")]
    pub config: Config,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<Condition>,
    #[serde(default, skip_serializing_if = "Style::is_empty")]
    pub style: Style,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visibility: Option<VisibilityPatch>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MoveOp {
    #[serde(alias = "source_uid")]
    pub uid: String,
    #[serde(alias = "after_uid")]
    pub target: String,
    #[serde(default = "default_move_position")]
    pub position: Position,
}

fn default_move_position() -> Position {
    Position::After
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DeleteOp {
    #[serde(alias = "target")]
    pub uid: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BulkReplaceOp {
    #[serde(default, alias = "targets")]
    pub uids: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read_only: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hidden: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collapsible: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_in_toc: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_open: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hide_label: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub find: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replace: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub find_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replace_color: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CloneSubtreeOp {
    #[serde(default, alias = "uid")]
    pub source_uid: Option<String>,
    #[serde(default)]
    pub label_find: Option<String>,
    #[serde(default)]
    pub label_replace: Option<String>,
    #[serde(default)]
    pub field_suffix: Option<String>,
    #[serde(default)]
    pub position: Option<Position>,
    #[serde(default)]
    pub alias: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReplaceSubtreeOp {
    #[serde(alias = "uid")]
    pub target: String,
    #[serde(default)]
    pub position: Option<Position>,
    #[serde(default)]
    pub structure: Option<StructureSpec>,
    #[serde(default)]
    pub alias: Option<String>,
}

/// Planner-proposed edit, tagged by `type`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Operation {
    Add(AddOp),
    Edit(EditOp),
    Move(MoveOp),
    Delete(DeleteOp),
    BulkReplace(BulkReplaceOp),
    CloneSubtree(CloneSubtreeOp),
    ReplaceSubtree(ReplaceSubtreeOp),
}

impl Operation {
    pub fn name(&self) -> &'static str {
        match self {
            Operation::Add(_) => "add",
            Operation::Edit(_) => "edit",
            Operation::Move(_) => "move",
            Operation::Delete(_) => "delete",
            Operation::BulkReplace(_) => "bulk_replace",
            Operation::CloneSubtree(_) => "clone_subtree",
            Operation::ReplaceSubtree(_) => "replace_subtree",
        }
    }
}

/// One record of a batch
#[derive(Debug, Clone, PartialEq)]
pub enum BatchEntry {
    Operation(Operation),
    /// Record that did not decode; kept so indices line up with the input
    Malformed { raw: Value, reason: String },
}

impl BatchEntry {
    pub fn decode(raw: Value) -> Self {
        match serde_json::from_value::<Operation>(raw.clone()) {
            Ok(operation) => BatchEntry::Operation(operation),
            Err(e) => BatchEntry::Malformed {
                raw,
                reason: e.to_string(),
            },
        }
    }

    /// Operation name, or the raw `type` tag for malformed records
    pub fn name(&self) -> &str {
        match self {
            BatchEntry::Operation(op) => op.name(),
            BatchEntry::Malformed { raw, .. } => {
                raw.get("type").and_then(Value::as_str).unwrap_or("unknown")
            }
        }
    }
}

/// Ordered list of operations applied to one document in one pass
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Batch {
    entries: Vec<BatchEntry>,
}

impl Batch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode a JSON array of operation records.
    ///
    /// Fails only when the input is not a JSON array; bad records become
    /// [`BatchEntry::Malformed`].
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let values: Vec<Value> = serde_json::from_str(json)?;
        Ok(Self::from_values(values))
    }

    pub fn from_values(values: Vec<Value>) -> Self {
        Self {
            entries: values.into_iter().map(BatchEntry::decode).collect(),
        }
    }

    pub fn push(&mut self, operation: Operation) {
        self.entries.push(BatchEntry::Operation(operation));
    }

    pub fn with(mut self, operation: Operation) -> Self {
        self.push(operation);
        self
    }

    pub fn entries(&self) -> &[BatchEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl From<Vec<Operation>> for Batch {
    fn from(operations: Vec<Operation>) -> Self {
        operations.into_iter().collect()
    }
}

impl FromIterator<Operation> for Batch {
    fn from_iter<I: IntoIterator<Item = Operation>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().map(BatchEntry::Operation).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operation_serialization() {
        let op = Operation::Delete(DeleteOp {
            uid: "abc-1".to_string(),
        });

        let json = serde_json::to_string(&op).unwrap();
        assert!(json.contains(r#""type":"delete""#));

        let back: Operation = serde_json::from_str(&json).unwrap();
        assert_eq!(op, back);
    }

    #[test]
    fn test_add_record_decodes_flattened_spec() {
        let json = r#"[{
            "type": "add",
            "element_type": "field",
            "after_uid": "$g1",
            "position": "inside",
            "field_name": "amount",
            "label": "Amount",
            "alias": "f1",
            "condition": { "field": "has_income", "values": ["yes"] }
        }]"#;

        let batch = Batch::from_json(json).unwrap();
        let BatchEntry::Operation(Operation::Add(add)) = &batch.entries()[0] else {
            panic!("expected add, got {:?}", batch.entries()[0]);
        };

        assert_eq!(add.target.as_deref(), Some("$g1"));
        assert_eq!(add.position, Some(Position::InsideEnd));
        assert_eq!(add.spec.element_type, NodeKind::Field);
        assert_eq!(add.spec.field_name.as_deref(), Some("amount"));
        assert_eq!(add.alias.as_deref(), Some("f1"));
        assert_eq!(add.spec.condition.as_ref().unwrap().values, vec!["yes"]);
    }

    #[test]
    fn test_bad_records_stay_in_batch() {
        let json = r#"[
            { "type": "delete", "uid": "a" },
            { "type": "explode", "uid": "b" },
            { "type": "move", "uid": "c" },
            { "type": "delete", "uid": "d" }
        ]"#;

        let batch = Batch::from_json(json).unwrap();
        assert_eq!(batch.len(), 4);
        assert!(matches!(batch.entries()[0], BatchEntry::Operation(_)));
        assert!(matches!(batch.entries()[1], BatchEntry::Malformed { .. }));
        assert_eq!(batch.entries()[1].name(), "explode");
        assert!(matches!(batch.entries()[2], BatchEntry::Malformed { .. }));
        assert!(matches!(batch.entries()[3], BatchEntry::Operation(_)));
    }

    #[test]
    fn test_batch_must_be_array() {
        assert!(Batch::from_json(r#"{ "type": "delete" }"#).is_err());
    }

    #[test]
    fn test_structure_spec_nests() {
        let json = r#"{
            "element_type": "group",
            "uid": "ignored",
            "label": "Income",
            "children": [
                { "element_type": "field", "field_name": "salary" },
                { "element_type": "text", "content": "<b>Total</b>" }
            ]
        }"#;

        let structure: StructureSpec = serde_json::from_str(json).unwrap();
        assert_eq!(structure.node_count(), 3);
        assert_eq!(structure.node.uid.as_deref(), Some("ignored"));
        assert_eq!(structure.children[0].node.field_name.as_deref(), Some("salary"));
    }
}
