//! Per-operation outcomes of one batch run

use std::fmt;

use crate::errors::OperationError;

/// Effects of an operation that went through
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Applied {
    /// Identifiers of nodes the operation created
    pub created: Vec<String>,
    /// Identifiers the operation removed from the document
    pub removed: Vec<String>,
    /// Properties refused for the node's kind
    pub dropped_keys: Vec<OperationError>,
    /// `bulk_replace` references that did not resolve
    pub skipped_targets: Vec<String>,
}

impl Applied {
    pub fn created(uid: impl Into<String>) -> Self {
        Self {
            created: vec![uid.into()],
            ..Self::default()
        }
    }

    pub fn with_dropped(mut self, dropped: Vec<OperationError>) -> Self {
        self.dropped_keys.extend(dropped);
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum OperationOutcome {
    Applied(Applied),
    Skipped { error: OperationError },
}

impl OperationOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, OperationOutcome::Applied(_))
    }

    pub fn error(&self) -> Option<&OperationError> {
        match self {
            OperationOutcome::Skipped { error } => Some(error),
            OperationOutcome::Applied(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OperationRecord {
    pub index: usize,
    pub operation: String,
    pub outcome: OperationOutcome,
}

/// What happened to every operation of a batch, in batch order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchReport {
    pub records: Vec<OperationRecord>,
}

impl BatchReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, index: usize, operation: impl Into<String>, outcome: OperationOutcome) {
        self.records.push(OperationRecord {
            index,
            operation: operation.into(),
            outcome,
        });
    }

    pub fn applied_count(&self) -> usize {
        self.records.iter().filter(|r| r.outcome.is_applied()).count()
    }

    pub fn skipped_count(&self) -> usize {
        self.records.len() - self.applied_count()
    }

    pub fn skipped(&self) -> impl Iterator<Item = &OperationRecord> {
        self.records.iter().filter(|r| !r.outcome.is_applied())
    }

    /// Identifiers created across the whole batch
    pub fn created_ids(&self) -> Vec<&str> {
        self.applied()
            .flat_map(|applied| applied.created.iter().map(String::as_str))
            .collect()
    }

    pub fn removed_ids(&self) -> Vec<&str> {
        self.applied()
            .flat_map(|applied| applied.removed.iter().map(String::as_str))
            .collect()
    }

    pub fn dropped_count(&self) -> usize {
        self.applied().map(|applied| applied.dropped_keys.len()).sum()
    }

    pub fn outcome(&self, index: usize) -> Option<&OperationOutcome> {
        self.records.iter().find(|r| r.index == index).map(|r| &r.outcome)
    }

    fn applied(&self) -> impl Iterator<Item = &Applied> {
        self.records.iter().filter_map(|r| match &r.outcome {
            OperationOutcome::Applied(applied) => Some(applied),
            OperationOutcome::Skipped { .. } => None,
        })
    }
}

impl fmt::Display for BatchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} applied, {} skipped ({} created, {} removed)",
            self.applied_count(),
            self.skipped_count(),
            self.created_ids().len(),
            self.removed_ids().len()
        )?;
        for record in &self.records {
            match &record.outcome {
                OperationOutcome::Applied(applied) => {
                    write!(f, "  #{} {}: ok", record.index, record.operation)?;
                    if !applied.created.is_empty() {
                        write!(f, ", created {}", applied.created.join(", "))?;
                    }
                    if !applied.removed.is_empty() {
                        write!(f, ", removed {}", applied.removed.len())?;
                    }
                    writeln!(f)?;
                    for dropped in &applied.dropped_keys {
                        writeln!(f, "      dropped: {}", dropped)?;
                    }
                    for target in &applied.skipped_targets {
                        writeln!(f, "      not found: {}", target)?;
                    }
                }
                OperationOutcome::Skipped { error } => {
                    writeln!(f, "  #{} {}: skipped ({})", record.index, record.operation, error)?;
                }
            }
        }
        Ok(())
    }
}
