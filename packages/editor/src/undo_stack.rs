//! # Undo/Redo Stack
//!
//! Tracks batch history as whole-document snapshots.
//!
//! ## Design
//!
//! - Each applied batch records the document as it was before the batch
//! - Undo swaps the current document with the latest snapshot and moves the
//!   current one to the redo stack
//! - Redo does the reverse
//! - Recording a new batch clears the redo stack
//!
//! Documents are small (tens to hundreds of nodes), so a snapshot per batch is
//! cheaper to reason about than recording inverse operations.
//!
//! ## Example
//!
//! ```rust,ignore
//! let mut stack = UndoStack::new();
//!
//! let before = doc.clone();
//! doc = interpreter.apply(&doc, &batch).document;
//! stack.record(before, Some("add income section".to_string()));
//!
//! stack.undo(&mut doc);
//! stack.redo(&mut doc);
//! ```

use formedit_schema::Document;

/// Document state captured before a batch
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub document: Document,

    /// Optional description of the batch that followed this state
    pub description: Option<String>,
}

/// Undo/redo stack for document editing
#[derive(Debug)]
pub struct UndoStack {
    /// Snapshots to restore on undo (most recent last)
    undo_stack: Vec<Snapshot>,

    /// Snapshots to restore on redo (most recent last)
    redo_stack: Vec<Snapshot>,

    /// Maximum number of undo levels (0 = unlimited)
    max_levels: usize,
}

impl UndoStack {
    /// Create a new undo stack with default max levels (100)
    pub fn new() -> Self {
        Self::with_max_levels(100)
    }

    /// Create an undo stack with custom max levels
    pub fn with_max_levels(max_levels: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_levels,
        }
    }

    /// Record the state a batch started from
    pub fn record(&mut self, before: Document, description: Option<String>) {
        self.undo_stack.push(Snapshot {
            document: before,
            description,
        });

        // Trim if exceeded max levels
        if self.max_levels > 0 && self.undo_stack.len() > self.max_levels {
            self.undo_stack.remove(0);
        }

        // New history invalidates the redo branch
        self.redo_stack.clear();
    }

    /// Restore the state before the most recent batch.
    ///
    /// Returns `false` when there is nothing to undo.
    pub fn undo(&mut self, current: &mut Document) -> bool {
        match self.undo_stack.pop() {
            Some(snapshot) => {
                let undone = std::mem::replace(current, snapshot.document);
                self.redo_stack.push(Snapshot {
                    document: undone,
                    description: snapshot.description,
                });
                true
            }
            None => false,
        }
    }

    /// Reapply the most recently undone batch
    pub fn redo(&mut self, current: &mut Document) -> bool {
        match self.redo_stack.pop() {
            Some(snapshot) => {
                let before = std::mem::replace(current, snapshot.document);
                self.undo_stack.push(Snapshot {
                    document: before,
                    description: snapshot.description,
                });
                true
            }
            None => false,
        }
    }

    /// Check if undo is available
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    /// Check if redo is available
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Get the number of undo levels available
    pub fn undo_levels(&self) -> usize {
        self.undo_stack.len()
    }

    /// Get the number of redo levels available
    pub fn redo_levels(&self) -> usize {
        self.redo_stack.len()
    }

    /// Clear all undo/redo history
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }

    /// Get description of the next undo operation
    pub fn undo_description(&self) -> Option<&str> {
        self.undo_stack
            .last()
            .and_then(|snapshot| snapshot.description.as_deref())
    }

    /// Get description of the next redo operation
    pub fn redo_description(&self) -> Option<&str> {
        self.redo_stack
            .last()
            .and_then(|snapshot| snapshot.description.as_deref())
    }
}

impl Default for UndoStack {
    fn default() -> Self {
        Self::new()
    }
}
