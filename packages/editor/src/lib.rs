//! # Formedit Editor
//!
//! Document mutation engine for form schemas.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ planner: natural language → Batch (JSON)    │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ editor: Interpreter over one working copy   │
//! │  - Resolve aliases and anchors              │
//! │  - Build nodes (factory), clone subtrees    │
//! │  - Recolor by color family                  │
//! │  - Post-effects restore registry integrity  │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ schema: Document (nodes + attributes)       │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **Input is never mutated**: a batch works on its own copy
//! 2. **Atomic operations**: each operation applies fully or not at all
//! 3. **Skip and continue**: a bad reference costs one operation, not the batch
//! 4. **Identifiers are ours**: every created node gets a generated identifier
//!
//! ## Usage
//!
//! ### One-shot batch
//!
//! ```rust,ignore
//! use formedit_editor::{Batch, Interpreter};
//!
//! let batch = Batch::from_json(r#"[
//!     { "type": "add", "element_type": "group", "label": "Section A", "alias": "g1" },
//!     { "type": "add", "element_type": "text", "content": "Hello",
//!       "target": "$g1", "position": "inside_end" }
//! ]"#)?;
//!
//! let output = Interpreter::new().apply(&schema, &batch);
//! println!("{}", output.report);
//! ```
//!
//! ### Editing with history
//!
//! ```rust,ignore
//! use formedit_editor::{Document, Interpreter};
//!
//! let mut doc = Document::load("form.json")?;
//! doc.apply_batch(&Interpreter::new(), &batch, Some("add section".into()))?;
//! doc.undo();
//! doc.save()?;
//! ```

mod aliases;
mod clone;
mod color;
mod document;
mod errors;
mod factory;
mod interpreter;
mod operations;
mod post_effects;
mod report;
mod undo_stack;

pub use aliases::{AliasTable, Anchor, Reference, ALIAS_PREFIX, ROOT_REF};
pub use clone::CloneTransform;
pub use color::{keyword_rgb, ColorFamily, ColorRewrite, Rgb};
pub use document::{BatchResult, Document, DocumentStorage};
pub use errors::{BatchError, EditorError, OperationError};
pub use factory::{Built, ElementFactory};
pub use interpreter::{BatchOutput, ExecutionMode, Interpreter, InterpreterOptions, EDITABLE_CONFIG_KEYS};
pub use operations::{
    AddOp, Batch, BatchEntry, BulkReplaceOp, CloneSubtreeOp, DeleteOp, EditOp, MoveOp, NodeSpec,
    Operation, Position, ReplaceSubtreeOp, StructureSpec, VisibilityPatch,
};
pub use post_effects::{PostEffect, PostEffectEngine, RegisterMissingAttributes};
pub use report::{Applied, BatchReport, OperationOutcome, OperationRecord};
pub use undo_stack::{Snapshot, UndoStack};

// Re-export common types for convenience
pub use formedit_schema::Document as SchemaDocument;
