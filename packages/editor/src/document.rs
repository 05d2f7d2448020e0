//! # Document Handle
//!
//! Editing state around one form-schema document.
//!
//! A Document can be:
//! - **Memory-backed**: Temporary, for testing or in-memory operations
//! - **File-backed**: Single-user editing with JSON persistence on disk
//!
//! ## Lifecycle
//!
//! ```text
//! Load → Apply batches → Undo/Redo → Save
//!   ↓          ↓             ↓         ↓
//! JSON   Interpreter    Snapshots    JSON
//! ```

use std::path::{Path, PathBuf};

use formedit_schema::Document as SchemaDocument;
use tracing::debug;

use crate::errors::EditorError;
use crate::interpreter::Interpreter;
use crate::operations::Batch;
use crate::report::BatchReport;
use crate::undo_stack::UndoStack;

/// Outcome of a batch applied through a [`Document`]
#[derive(Debug, Clone, PartialEq)]
pub struct BatchResult {
    /// Document version after the batch
    pub version: u64,
    pub report: BatchReport,
    pub effects: Vec<String>,
}

/// Editable form-schema document
#[derive(Debug)]
pub struct Document {
    /// Path of the JSON file (informational for memory-backed documents)
    pub path: PathBuf,

    /// Current version number (increments on each batch, undo and redo)
    pub version: u64,

    /// Backing storage strategy
    storage: DocumentStorage,

    /// `None` when the document keeps no undo history
    history: Option<UndoStack>,
}

/// Storage backend for document
#[derive(Debug)]
pub enum DocumentStorage {
    /// In-memory only (for testing, temp docs)
    Memory { schema: SchemaDocument },

    /// File-backed (single-user editing)
    File { schema: SchemaDocument, dirty: bool },
}

impl Document {
    /// Wrap an existing schema document (memory-backed)
    pub fn from_schema(path: impl Into<PathBuf>, schema: SchemaDocument) -> Self {
        Self {
            path: path.into(),
            version: 0,
            storage: DocumentStorage::Memory { schema },
            history: Some(UndoStack::new()),
        }
    }

    /// Create document from JSON text (memory-backed)
    pub fn from_json(path: impl Into<PathBuf>, json: &str) -> Result<Self, EditorError> {
        let schema = serde_json::from_str(json)?;
        Ok(Self::from_schema(path, schema))
    }

    /// Load document from file (file-backed)
    pub fn load(path: impl AsRef<Path>) -> Result<Self, EditorError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)?;
        let schema = serde_json::from_str(&source)?;
        debug!(path = %path.display(), "document loaded");

        Ok(Self {
            path: path.to_path_buf(),
            version: 0,
            storage: DocumentStorage::File {
                schema,
                dirty: false,
            },
            history: Some(UndoStack::new()),
        })
    }

    /// Limit the number of undo levels kept (0 = unlimited)
    pub fn with_history_limit(mut self, max_levels: usize) -> Self {
        self.history = Some(UndoStack::with_max_levels(max_levels));
        self
    }

    /// Keep no undo history; each batch drops the state it replaced
    pub fn without_history(mut self) -> Self {
        self.history = None;
        self
    }

    pub fn schema(&self) -> &SchemaDocument {
        match &self.storage {
            DocumentStorage::Memory { schema } => schema,
            DocumentStorage::File { schema, .. } => schema,
        }
    }

    fn schema_mut(&mut self) -> &mut SchemaDocument {
        match &mut self.storage {
            DocumentStorage::Memory { schema } => schema,
            DocumentStorage::File { schema, dirty } => {
                *dirty = true;
                schema
            }
        }
    }

    /// Run a batch and make its result the current state.
    ///
    /// The previous state becomes one undo step. In strict mode a failing
    /// batch leaves the document and its history untouched.
    pub fn apply_batch(
        &mut self,
        interpreter: &Interpreter,
        batch: &Batch,
        description: Option<String>,
    ) -> Result<BatchResult, EditorError> {
        let output = interpreter.execute(self.schema(), batch)?;

        let before = std::mem::replace(self.schema_mut(), output.document);
        if let Some(history) = &mut self.history {
            history.record(before, description);
        }
        self.version += 1;

        Ok(BatchResult {
            version: self.version,
            report: output.report,
            effects: output.effects,
        })
    }

    /// Revert the most recent batch; `false` when there is nothing to undo
    pub fn undo(&mut self) -> bool {
        if !self.can_undo() {
            return false;
        }
        let mut current = std::mem::take(self.schema_mut());
        if let Some(history) = &mut self.history {
            history.undo(&mut current);
        }
        *self.schema_mut() = current;
        self.version += 1;
        true
    }

    pub fn redo(&mut self) -> bool {
        if !self.can_redo() {
            return false;
        }
        let mut current = std::mem::take(self.schema_mut());
        if let Some(history) = &mut self.history {
            history.redo(&mut current);
        }
        *self.schema_mut() = current;
        self.version += 1;
        true
    }

    pub fn can_undo(&self) -> bool {
        self.history.as_ref().is_some_and(UndoStack::can_undo)
    }

    pub fn can_redo(&self) -> bool {
        self.history.as_ref().is_some_and(UndoStack::can_redo)
    }

    /// Check if document has unsaved changes
    pub fn is_dirty(&self) -> bool {
        match &self.storage {
            DocumentStorage::File { dirty, .. } => *dirty,
            _ => false,
        }
    }

    /// Serialize the current state
    pub fn to_json(&self, pretty: bool) -> Result<String, EditorError> {
        let json = if pretty {
            serde_json::to_string_pretty(self.schema())?
        } else {
            serde_json::to_string(self.schema())?
        };
        Ok(json)
    }

    /// Save document to disk (if file-backed)
    pub fn save(&mut self) -> Result<(), EditorError> {
        let json = self.to_json(true)?;
        match &mut self.storage {
            DocumentStorage::File { dirty, .. } => {
                std::fs::write(&self.path, json)?;
                *dirty = false;
                debug!(path = %self.path.display(), version = self.version, "document saved");
                Ok(())
            }
            _ => Err(EditorError::NotFileBacked),
        }
    }
}
