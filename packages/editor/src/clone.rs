//! # Clone/Transform Engine
//!
//! Deep-copies a subtree so it can be attached elsewhere as an independent
//! sibling: every identifier is regenerated, labels can be rewritten
//! case-insensitively, and field names can take a suffix. The copy is returned
//! detached; attaching it is the interpreter's job.

use chrono::{DateTime, Utc};
use formedit_schema::{walk_node_mut, AttributeRegistry, IdGenerator, Node, VisitorMut};
use regex::{NoExpand, Regex, RegexBuilder};
use serde_json::Value;

use crate::errors::OperationError;

/// Rewrites applied to every node of a cloned subtree
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CloneTransform {
    pub label_find: Option<String>,
    pub label_replace: Option<String>,
    pub field_suffix: Option<String>,
}

impl CloneTransform {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_label_replace(mut self, find: impl Into<String>, replace: impl Into<String>) -> Self {
        self.label_find = Some(find.into());
        self.label_replace = Some(replace.into());
        self
    }

    pub fn with_field_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.field_suffix = Some(suffix.into());
        self
    }

    /// Case-insensitive literal matcher for `label_find`; `None` when unset or empty
    fn label_pattern(&self) -> Result<Option<Regex>, OperationError> {
        match self.label_find.as_deref() {
            None | Some("") => Ok(None),
            Some(find) => RegexBuilder::new(&regex::escape(find))
                .case_insensitive(true)
                .build()
                .map(Some)
                .map_err(|e| OperationError::malformed(format!("label_find: {}", e))),
        }
    }

    /// Produce a transformed, detached copy of `source`.
    ///
    /// Field names produced by the suffix are registered when absent.
    pub fn clone_subtree(
        &self,
        source: &Node,
        ids: &mut IdGenerator,
        registry: &mut AttributeRegistry,
        now: DateTime<Utc>,
    ) -> Result<Node, OperationError> {
        let pattern = self.label_pattern()?;
        let mut copy = source.clone();

        let mut rewriter = CloneRewriter {
            ids,
            pattern: pattern.as_ref(),
            replacement: self.label_replace.as_deref().unwrap_or(""),
            suffix: self.field_suffix.as_deref().filter(|s| !s.is_empty()),
            field_names: Vec::new(),
        };
        rewriter.visit_node_mut(&mut copy);

        for name in rewriter.field_names {
            registry.ensure(&name, now);
        }
        Ok(copy)
    }
}

struct CloneRewriter<'a> {
    ids: &'a mut IdGenerator,
    pattern: Option<&'a Regex>,
    replacement: &'a str,
    suffix: Option<&'a str>,
    field_names: Vec<String>,
}

impl CloneRewriter<'_> {
    fn rewrite(&self, text: &str) -> Option<String> {
        let pattern = self.pattern?;
        pattern
            .is_match(text)
            .then(|| pattern.replace_all(text, NoExpand(self.replacement)).into_owned())
    }
}

impl VisitorMut for CloneRewriter<'_> {
    fn visit_node_mut(&mut self, node: &mut Node) {
        let uid = self.ids.new_id();

        let label = node.label().and_then(|label| self.rewrite(label));
        let config_label = node
            .meta()
            .config
            .get("label")
            .and_then(Value::as_str)
            .and_then(|label| self.rewrite(label));

        let meta = node.meta_mut();
        meta.uid = uid;
        if let Some(label) = label {
            meta.label = Some(label);
        }
        if let Some(label) = config_label {
            meta.config.insert("label".to_string(), Value::String(label));
        }

        if let Node::Field { field_name, .. } = node {
            if let Some(suffix) = self.suffix {
                field_name.push_str(suffix);
            }
            self.field_names.push(field_name.clone());
        }

        walk_node_mut(self, node);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use formedit_schema::{collect_ids, NodeMeta};
    use serde_json::json;

    fn section() -> Node {
        let mut meta = NodeMeta::new("g");
        meta.label = Some("Section 1".to_string());
        meta.config.insert("label".to_string(), json!("SECTION 1 details"));
        let mut amount = NodeMeta::new("f1");
        amount.label = Some("Amount for section 1".to_string());
        Node::group(
            meta,
            vec![
                Node::field(amount, "amount"),
                Node::field(NodeMeta::new("f2"), "notes"),
                Node::text(NodeMeta::new("t1"), "Totals"),
            ],
        )
    }

    #[test]
    fn test_clone_regenerates_every_identifier() {
        let source = section();
        let mut ids = IdGenerator::from_seed("c".to_string());
        let mut registry = AttributeRegistry::new();

        let copy = CloneTransform::new()
            .clone_subtree(&source, &mut ids, &mut registry, Utc::now())
            .unwrap();

        let before = collect_ids(std::slice::from_ref(&source));
        let after = collect_ids(std::slice::from_ref(&copy));
        assert_eq!(after, vec!["c-1", "c-2", "c-3", "c-4"]);
        assert!(after.iter().all(|id| !before.contains(id)));
        assert_eq!(copy.label(), Some("Section 1"));
    }

    #[test]
    fn test_label_replace_is_case_insensitive() {
        let source = section();
        let mut ids = IdGenerator::from_seed("c".to_string());
        let mut registry = AttributeRegistry::new();

        let copy = CloneTransform::new()
            .with_label_replace("section 1", "Section 1 (Year 2)")
            .clone_subtree(&source, &mut ids, &mut registry, Utc::now())
            .unwrap();

        assert_eq!(copy.label(), Some("Section 1 (Year 2)"));
        assert_eq!(copy.meta().config["label"], json!("Section 1 (Year 2) details"));
        assert_eq!(
            copy.children().unwrap()[0].label(),
            Some("Amount for Section 1 (Year 2)")
        );
    }

    #[test]
    fn test_replacement_is_literal() {
        let source = section();
        let mut ids = IdGenerator::from_seed("c".to_string());
        let mut registry = AttributeRegistry::new();

        let copy = CloneTransform::new()
            .with_label_replace("Section 1", "$0 copy")
            .clone_subtree(&source, &mut ids, &mut registry, Utc::now())
            .unwrap();

        assert_eq!(copy.label(), Some("$0 copy"));
    }

    #[test]
    fn test_field_suffix_registers_new_names() {
        let source = section();
        let mut ids = IdGenerator::from_seed("c".to_string());
        let mut registry = AttributeRegistry::new();

        let copy = CloneTransform::new()
            .with_field_suffix("_y2")
            .clone_subtree(&source, &mut ids, &mut registry, Utc::now())
            .unwrap();

        let children = copy.children().unwrap();
        assert_eq!(children[0].field_name(), Some("amount_y2"));
        assert_eq!(children[1].field_name(), Some("notes_y2"));
        assert!(registry.contains("amount_y2"));
        assert!(registry.contains("notes_y2"));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_empty_find_leaves_labels() {
        let source = section();
        let mut ids = IdGenerator::from_seed("c".to_string());
        let mut registry = AttributeRegistry::new();

        let copy = CloneTransform::new()
            .with_label_replace("", "ignored")
            .clone_subtree(&source, &mut ids, &mut registry, Utc::now())
            .unwrap();

        assert_eq!(copy.label(), Some("Section 1"));
    }
}
