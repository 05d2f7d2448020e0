//! # Operation Interpreter
//!
//! Executes an ordered [`Batch`] against one working copy of a document.
//!
//! ## Semantics
//!
//! - The caller's document is cloned once; it is never touched.
//! - Operations run in batch order and each one is atomic: it is validated
//!   completely before the working copy changes, so it either applies fully
//!   or is skipped without a trace.
//! - Disallowed properties never fail an operation; the offending key is
//!   dropped and reported.
//! - In [`ExecutionMode::Lenient`] a failing operation is skipped and the batch
//!   continues. In [`ExecutionMode::Strict`] the first failure aborts the batch.
//! - After the last operation the post-effects restore registry integrity.

use chrono::{DateTime, Utc};
use formedit_schema::locator::subtree_contains;
use formedit_schema::{collect_ids, Document, IdGenerator, Node, NodePath, ParentContext};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::aliases::{AliasTable, Anchor, ROOT_REF};
use crate::clone::CloneTransform;
use crate::color::ColorRewrite;
use crate::errors::{BatchError, OperationError};
use crate::factory::ElementFactory;
use crate::operations::{
    AddOp, Batch, BatchEntry, BulkReplaceOp, CloneSubtreeOp, DeleteOp, EditOp, MoveOp, Operation,
    Position, ReplaceSubtreeOp,
};
use crate::post_effects::PostEffectEngine;
use crate::report::{Applied, BatchReport, OperationOutcome};

/// Configuration keys an `edit` may touch
pub const EDITABLE_CONFIG_KEYS: &[&str] = &[
    "label",
    "placeholder",
    "help_text",
    "default_value",
    "hide_label",
    "collapsible",
    "show_in_toc",
    "default_open",
    "required",
    "read_only",
    "columns",
    "css_class",
];

/// Failure policy for a batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionMode {
    /// Skip failing operations and continue
    #[default]
    Lenient,
    /// Abort on the first failing operation
    Strict,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct InterpreterOptions {
    pub mode: ExecutionMode,
    /// Fixed identifier seed; derived from the clock when absent
    pub id_seed: Option<String>,
}

/// Result document of a batch plus what happened along the way
#[derive(Debug, Clone, PartialEq)]
pub struct BatchOutput {
    pub document: Document,
    pub report: BatchReport,
    /// Changes made by post-effects
    pub effects: Vec<String>,
}

#[derive(Debug, Default)]
pub struct Interpreter {
    options: InterpreterOptions,
    effects: PostEffectEngine,
}

impl Interpreter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: InterpreterOptions) -> Self {
        Self {
            options,
            effects: PostEffectEngine::new(),
        }
    }

    pub fn strict() -> Self {
        Self::with_options(InterpreterOptions {
            mode: ExecutionMode::Strict,
            ..InterpreterOptions::default()
        })
    }

    pub fn with_seed(mut self, seed: impl Into<String>) -> Self {
        self.options.id_seed = Some(seed.into());
        self
    }

    pub fn with_effects(mut self, effects: PostEffectEngine) -> Self {
        self.effects = effects;
        self
    }

    pub fn options(&self) -> &InterpreterOptions {
        &self.options
    }

    /// Run a batch under the configured mode.
    ///
    /// Lenient mode always succeeds. Strict mode returns the first failing
    /// operation instead of a document.
    pub fn execute(&self, doc: &Document, batch: &Batch) -> Result<BatchOutput, BatchError> {
        match self.run(doc, batch, self.options.mode) {
            (_, Some(error)) => Err(error),
            (output, None) => Ok(output),
        }
    }

    /// Run a batch with skip-and-continue semantics, whatever the configured mode
    pub fn apply(&self, doc: &Document, batch: &Batch) -> BatchOutput {
        self.run(doc, batch, ExecutionMode::Lenient).0
    }

    fn run(&self, doc: &Document, batch: &Batch, mode: ExecutionMode) -> (BatchOutput, Option<BatchError>) {
        let mut working = WorkingCopy::new(doc, self.options.id_seed.as_deref(), Utc::now());
        let mut report = BatchReport::new();

        info!(operations = batch.len(), mode = ?mode, seed = working.ids.seed(), "executing batch");

        for (index, entry) in batch.entries().iter().enumerate() {
            let name = entry.name().to_string();
            let result = match entry {
                BatchEntry::Operation(operation) => {
                    debug!(index, operation = %name, "applying operation");
                    working.apply(operation)
                }
                BatchEntry::Malformed { reason, .. } => Err(OperationError::malformed(reason.clone())),
            };

            match result {
                Ok(applied) => {
                    for dropped in &applied.dropped_keys {
                        warn!(index, operation = %name, %dropped, "property dropped");
                    }
                    report.push(index, name, OperationOutcome::Applied(applied));
                }
                Err(error) => {
                    warn!(index, operation = %name, %error, "operation skipped");
                    if mode == ExecutionMode::Strict {
                        let failure = BatchError {
                            index,
                            operation: name,
                            error,
                        };
                        let output = working.finish(report, Vec::new());
                        return (output, Some(failure));
                    }
                    report.push(index, name, OperationOutcome::Skipped { error });
                }
            }
        }

        let effects = self.effects.run(&mut working.doc, working.now);

        info!(
            applied = report.applied_count(),
            skipped = report.skipped_count(),
            nodes = working.doc.node_count(),
            "batch complete"
        );

        (working.finish(report, effects), None)
    }
}

/// Where a node will be spliced in
#[derive(Debug, Clone, PartialEq, Eq)]
struct InsertionPoint {
    list_path: NodePath,
    index: usize,
}

impl From<ParentContext> for InsertionPoint {
    fn from(context: ParentContext) -> Self {
        Self {
            list_path: context.list_path,
            index: context.index,
        }
    }
}

/// Batch-scoped state: the document being edited, its identifier generator
/// and the alias bindings made so far
struct WorkingCopy {
    doc: Document,
    ids: IdGenerator,
    aliases: AliasTable,
    now: DateTime<Utc>,
}

fn not_found(reference: &str) -> OperationError {
    OperationError::ReferenceNotFound(reference.to_string())
}

impl WorkingCopy {
    fn new(doc: &Document, seed: Option<&str>, now: DateTime<Utc>) -> Self {
        let mut ids = match seed {
            Some(seed) => IdGenerator::from_seed(seed.to_string()),
            None => IdGenerator::new(&now.to_rfc3339()),
        };
        ids.reserve(collect_ids(&doc.nodes));

        Self {
            doc: doc.clone(),
            ids,
            aliases: AliasTable::new(),
            now,
        }
    }

    fn finish(self, report: BatchReport, effects: Vec<String>) -> BatchOutput {
        BatchOutput {
            document: self.doc,
            report,
            effects,
        }
    }

    fn apply(&mut self, operation: &Operation) -> Result<Applied, OperationError> {
        match operation {
            Operation::Add(op) => self.add(op),
            Operation::Edit(op) => self.edit(op),
            Operation::Move(op) => self.move_node(op),
            Operation::Delete(op) => self.delete(op),
            Operation::BulkReplace(op) => self.bulk_replace(op),
            Operation::CloneSubtree(op) => self.clone_subtree(op),
            Operation::ReplaceSubtree(op) => self.replace_subtree(op),
        }
    }

    fn factory(&mut self) -> ElementFactory<'_> {
        ElementFactory::new(&mut self.ids, &mut self.doc.attributes, self.now)
    }

    /// Resolve an anchor and placement into a concrete splice position
    fn insertion_point(&self, anchor: &Anchor, position: Position) -> Result<InsertionPoint, OperationError> {
        let uid = match anchor {
            Anchor::Root => {
                let index = match position {
                    Position::Before | Position::InsideStart => 0,
                    Position::After | Position::InsideEnd => self.doc.nodes.len(),
                    Position::Replace => return Err(replace_not_supported()),
                };
                return Ok(InsertionPoint {
                    list_path: Vec::new(),
                    index,
                });
            }
            Anchor::Node(uid) => uid,
        };

        match position {
            Position::Before | Position::After => {
                let context = self.doc.parent_context(uid).ok_or_else(|| not_found(uid))?;
                let offset = usize::from(position == Position::After);
                Ok(InsertionPoint {
                    list_path: context.list_path,
                    index: context.index + offset,
                })
            }
            Position::InsideStart | Position::InsideEnd => {
                let list_path = self.doc.path_of(uid).ok_or_else(|| not_found(uid))?;
                let children = self.doc.list(&list_path).ok_or_else(|| {
                    OperationError::InvalidStructure(format!("{} is not a group and cannot have children", uid))
                })?;
                let index = if position == Position::InsideStart {
                    0
                } else {
                    children.len()
                };
                Ok(InsertionPoint { list_path, index })
            }
            Position::Replace => Err(replace_not_supported()),
        }
    }

    fn insert(&mut self, point: &InsertionPoint, node: Node) -> Result<(), OperationError> {
        let list = self
            .doc
            .list_mut(&point.list_path)
            .ok_or_else(|| OperationError::InvalidStructure("insertion point no longer exists".to_string()))?;
        let index = point.index.min(list.len());
        list.insert(index, node);
        Ok(())
    }

    fn bind_alias(&mut self, alias: Option<&str>, uid: &str) {
        if let Some(alias) = alias.filter(|a| !a.is_empty()) {
            debug!(alias, uid, "alias bound");
            self.aliases.bind(alias, uid);
        }
    }

    fn add(&mut self, op: &AddOp) -> Result<Applied, OperationError> {
        ElementFactory::validate(&op.spec)?;

        let target = op.target.as_deref().unwrap_or(ROOT_REF);
        let anchor = self.aliases.resolve(target)?;
        let position = op.position.unwrap_or(match anchor {
            Anchor::Root => Position::InsideEnd,
            Anchor::Node(_) => Position::After,
        });
        let point = self.insertion_point(&anchor, position)?;

        let built = self.factory().build(&op.spec)?;
        let uid = built.node.uid().to_string();
        self.insert(&point, built.node)?;
        self.bind_alias(op.alias.as_deref(), &uid);

        Ok(Applied::created(uid).with_dropped(built.dropped))
    }

    fn edit(&mut self, op: &EditOp) -> Result<Applied, OperationError> {
        let uid = self.aliases.resolve_node(&op.uid)?;
        let node = self.doc.find_mut(&uid).ok_or_else(|| not_found(&op.uid))?;
        let kind = node.kind();
        let mut dropped = Vec::new();

        if let Some(new_content) = &op.content {
            match node {
                Node::Text { content, .. } => *content = new_content.clone(),
                _ => dropped.push(OperationError::disallowed("content", kind)),
            }
        }

        let meta = node.meta_mut();
        if let Some(label) = &op.label {
            meta.label = Some(label.clone());
        }
        if let Some(required) = op.required {
            meta.config.insert("required".to_string(), Value::Bool(required));
        }
        if let Some(read_only) = op.read_only {
            meta.config.insert("read_only".to_string(), Value::Bool(read_only));
        }
        if let Some(hidden) = op.hidden {
            meta.visibility.hidden = hidden;
        }

        for (key, value) in &op.config {
            if !EDITABLE_CONFIG_KEYS.contains(&key.as_str()) {
                dropped.push(OperationError::disallowed(key.as_str(), kind));
            } else if value.is_null() {
                meta.config.remove(key);
            } else {
                meta.config.insert(key.clone(), value.clone());
            }
        }

        if let Some(condition) = &op.condition {
            meta.visibility.condition = Some(condition.clone());
        }

        for (key, value) in &op.style {
            if !kind.allows_style(key) {
                dropped.push(OperationError::disallowed(key.as_str(), kind));
            } else if value.is_empty() {
                meta.style.remove(key);
            } else {
                meta.style.insert(key.clone(), value.clone());
            }
        }

        if let Some(patch) = &op.visibility {
            patch.apply_to(&mut meta.visibility);
        }

        let toggles = [
            ("hide_label", op.hide_label),
            ("collapsible", op.collapsible),
            ("show_in_toc", op.show_in_toc),
            ("default_open", op.default_open),
        ];
        for (key, value) in toggles {
            if let Some(value) = value {
                node.set_flag(key, value);
            }
        }

        Ok(Applied::default().with_dropped(dropped))
    }

    fn move_node(&mut self, op: &MoveOp) -> Result<Applied, OperationError> {
        if op.position == Position::Replace {
            return Err(replace_not_supported());
        }

        let uid = self.aliases.resolve_node(&op.uid)?;
        let anchor = self.aliases.resolve(&op.target)?;
        let source = self.doc.find(&uid).ok_or_else(|| not_found(&op.uid))?;

        if let Anchor::Node(target) = &anchor {
            if !self.doc.contains(target) {
                return Err(not_found(&op.target));
            }
            if subtree_contains(source, target) {
                return Err(OperationError::CycleDetected);
            }
        }
        self.insertion_point(&anchor, op.position)?;

        let origin = self.doc.parent_context(&uid).ok_or_else(|| not_found(&op.uid))?;
        let node = self.doc.take_at(&origin).ok_or_else(|| not_found(&op.uid))?;

        // Indices shift once the source is out of the tree
        match self.insertion_point(&anchor, op.position) {
            Ok(point) => self.insert(&point, node)?,
            Err(error) => {
                self.insert(&InsertionPoint::from(origin), node)?;
                return Err(error);
            }
        }

        Ok(Applied::default())
    }

    fn delete(&mut self, op: &DeleteOp) -> Result<Applied, OperationError> {
        let uid = self.aliases.resolve_node(&op.uid)?;
        let context = self.doc.parent_context(&uid).ok_or_else(|| not_found(&op.uid))?;
        let node = self.doc.take_at(&context).ok_or_else(|| not_found(&op.uid))?;

        Ok(Applied {
            removed: collect_ids(std::slice::from_ref(&node)),
            ..Applied::default()
        })
    }

    fn bulk_replace(&mut self, op: &BulkReplaceOp) -> Result<Applied, OperationError> {
        if op.uids.is_empty() {
            return Err(OperationError::malformed("bulk_replace needs at least one uid"));
        }
        let rewrite = TextRewrite::from_op(op)?;

        let mut targets: Vec<String> = Vec::new();
        let mut skipped_targets = Vec::new();
        for reference in &op.uids {
            match self.aliases.resolve_node(reference) {
                Ok(uid) if self.doc.contains(&uid) => {
                    if !targets.contains(&uid) {
                        targets.push(uid);
                    }
                }
                _ => skipped_targets.push(reference.clone()),
            }
        }
        if targets.is_empty() {
            return Err(OperationError::ReferenceNotFound(op.uids.join(", ")));
        }

        for uid in &targets {
            if let Some(node) = self.doc.find_mut(uid) {
                patch_node(node, op, rewrite.as_ref());
            }
        }
        if !skipped_targets.is_empty() {
            warn!(skipped = ?skipped_targets, "bulk_replace targets not found");
        }

        Ok(Applied {
            skipped_targets,
            ..Applied::default()
        })
    }

    fn clone_subtree(&mut self, op: &CloneSubtreeOp) -> Result<Applied, OperationError> {
        let reference = op
            .source_uid
            .as_deref()
            .ok_or_else(|| OperationError::malformed("clone_subtree needs a source_uid"))?;
        let position = op.position.unwrap_or(Position::After);
        if !matches!(position, Position::Before | Position::After) {
            return Err(OperationError::malformed(format!(
                "clone_subtree cannot insert {}",
                position.name()
            )));
        }

        let uid = self.aliases.resolve_node(reference)?;
        let source = self.doc.find(&uid).cloned().ok_or_else(|| not_found(reference))?;
        let point = self.insertion_point(&Anchor::Node(uid), position)?;

        let transform = CloneTransform {
            label_find: op.label_find.clone(),
            label_replace: op.label_replace.clone(),
            field_suffix: op.field_suffix.clone(),
        };
        let copy = transform.clone_subtree(&source, &mut self.ids, &mut self.doc.attributes, self.now)?;

        let created = collect_ids(std::slice::from_ref(&copy));
        self.bind_alias(op.alias.as_deref(), copy.uid());
        self.insert(&point, copy)?;

        Ok(Applied {
            created,
            ..Applied::default()
        })
    }

    fn replace_subtree(&mut self, op: &ReplaceSubtreeOp) -> Result<Applied, OperationError> {
        let structure = op
            .structure
            .as_ref()
            .ok_or_else(|| OperationError::malformed("replace_subtree needs a structure"))?;
        let position = op.position.unwrap_or(Position::Replace);
        if !matches!(position, Position::Replace | Position::Before | Position::After) {
            return Err(OperationError::malformed(format!(
                "replace_subtree cannot insert {}",
                position.name()
            )));
        }
        ElementFactory::validate_tree(structure)?;

        let uid = self.aliases.resolve_node(&op.target)?;
        let context = self.doc.parent_context(&uid).ok_or_else(|| not_found(&op.target))?;

        let built = self.factory().build_tree(structure)?;
        let created = collect_ids(std::slice::from_ref(&built.node));
        let new_uid = built.node.uid().to_string();

        let mut removed = Vec::new();
        let point = match position {
            Position::Replace => {
                let old = self.doc.take_at(&context).ok_or_else(|| not_found(&op.target))?;
                removed = collect_ids(std::slice::from_ref(&old));
                InsertionPoint::from(context)
            }
            Position::After => InsertionPoint {
                index: context.index + 1,
                list_path: context.list_path,
            },
            _ => InsertionPoint::from(context),
        };
        self.insert(&point, built.node)?;
        self.bind_alias(op.alias.as_deref(), &new_uid);

        Ok(Applied {
            created,
            removed,
            dropped_keys: built.dropped,
            skipped_targets: Vec::new(),
        })
    }
}

/// Style keys whose values are colors
const COLOR_STYLE_KEYS: [&str; 3] = ["color", "background_color", "border_color"];

fn replace_not_supported() -> OperationError {
    OperationError::malformed("the replace position is only valid for replace_subtree")
}

/// Text rewrite carried by a `bulk_replace`
#[derive(Debug, Clone, PartialEq)]
enum TextRewrite {
    Literal { find: String, replace: String },
    Color(ColorRewrite),
}

impl TextRewrite {
    fn from_op(op: &BulkReplaceOp) -> Result<Option<Self>, OperationError> {
        match (&op.find, &op.find_color, &op.replace_color) {
            (Some(_), Some(_), _) => Err(OperationError::malformed(
                "bulk_replace takes either find/replace or find_color/replace_color",
            )),
            (Some(find), None, _) if find.is_empty() => Ok(None),
            (Some(find), None, _) => Ok(Some(TextRewrite::Literal {
                find: find.clone(),
                replace: op.replace.clone().unwrap_or_default(),
            })),
            (None, Some(from), Some(to)) => Ok(Some(TextRewrite::Color(ColorRewrite::parse(from, to)?))),
            (None, Some(_), None) | (None, None, Some(_)) => Err(OperationError::malformed(
                "find_color and replace_color must be given together",
            )),
            (None, None, None) => Ok(None),
        }
    }

    fn text(&self, text: &str) -> String {
        match self {
            TextRewrite::Literal { find, replace } => text.replace(find.as_str(), replace),
            TextRewrite::Color(rewrite) => rewrite.apply(text),
        }
    }

    fn style_value(&self, key: &str, value: &str) -> String {
        match self {
            TextRewrite::Color(rewrite) if COLOR_STYLE_KEYS.contains(&key) => {
                rewrite.apply_to_value(value)
            }
            _ => self.text(value),
        }
    }
}

fn patch_node(node: &mut Node, op: &BulkReplaceOp, rewrite: Option<&TextRewrite>) {
    let toggles = [
        ("required", op.required),
        ("read_only", op.read_only),
        ("collapsible", op.collapsible),
        ("show_in_toc", op.show_in_toc),
        ("default_open", op.default_open),
        ("hide_label", op.hide_label),
    ];
    for (key, value) in toggles {
        if let Some(value) = value {
            node.set_flag(key, value);
        }
    }
    if let Some(hidden) = op.hidden {
        node.meta_mut().visibility.hidden = hidden;
    }

    let Some(rewrite) = rewrite else {
        return;
    };
    if let Node::Text { content, .. } = node {
        *content = rewrite.text(content);
    }
    let meta = node.meta_mut();
    meta.label = meta.label.as_deref().map(|label| rewrite.text(label));
    for (key, value) in meta.style.iter_mut() {
        *value = rewrite.style_value(key, value);
    }
}
