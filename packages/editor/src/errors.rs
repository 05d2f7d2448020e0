//! Error types for the editor

use formedit_schema::NodeKind;
use thiserror::Error;

/// Why a single operation (or one of its properties) was not applied
#[derive(Error, Debug, Clone, PartialEq)]
pub enum OperationError {
    #[error("Reference not found: {0}")]
    ReferenceNotFound(String),

    #[error("Malformed operation: {0}")]
    MalformedOperation(String),

    #[error("Property `{key}` is not allowed on {kind} nodes")]
    DisallowedProperty { key: String, kind: NodeKind },

    #[error("Would create cycle")]
    CycleDetected,

    #[error("Invalid structure: {0}")]
    InvalidStructure(String),
}

impl OperationError {
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedOperation(message.into())
    }

    pub fn disallowed(key: impl Into<String>, kind: NodeKind) -> Self {
        Self::DisallowedProperty {
            key: key.into(),
            kind,
        }
    }
}

/// First failing operation of a batch run in strict mode
#[derive(Error, Debug, Clone, PartialEq)]
#[error("Operation #{index} ({operation}) failed: {error}")]
pub struct BatchError {
    pub index: usize,
    pub operation: String,
    #[source]
    pub error: OperationError,
}

#[derive(Error, Debug)]
pub enum EditorError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Batch error: {0}")]
    Batch(#[from] BatchError),

    #[error("Document is not file-backed")]
    NotFileBacked,
}
