//! # Post-Effect System
//!
//! Effects run once over the working document after the last operation of a
//! batch, to restore document-wide integrity that individual operations do
//! not guarantee on their own.
//!
//! ## Design
//!
//! Post-effects are:
//! - **Deterministic**: same document always produces the same changes
//! - **Additive**: they only grow the attribute registry, never prune
//! - **Composable**: the engine runs every registered effect in order

use chrono::{DateTime, Utc};
use formedit_schema::{collect_field_names, Document};
use tracing::debug;

/// Integrity pass over a finished working document
pub trait PostEffect: std::fmt::Debug {
    fn name(&self) -> &'static str;

    /// Apply the effect; returns a description of each change made
    fn apply(&self, doc: &mut Document, now: DateTime<Utc>) -> Vec<String>;
}

/// Register a default entry for every field name that lacks one
#[derive(Debug)]
pub struct RegisterMissingAttributes;

impl PostEffect for RegisterMissingAttributes {
    fn name(&self) -> &'static str {
        "register_missing_attributes"
    }

    fn apply(&self, doc: &mut Document, now: DateTime<Utc>) -> Vec<String> {
        collect_field_names(&doc.nodes)
            .into_iter()
            .filter(|name| doc.attributes.ensure(name, now))
            .map(|name| format!("registered attribute `{}`", name))
            .collect()
    }
}

/// Post-effect engine that applies all registered effects
#[derive(Debug)]
pub struct PostEffectEngine {
    effects: Vec<Box<dyn PostEffect>>,
}

impl PostEffectEngine {
    /// Create engine with default effects
    pub fn new() -> Self {
        Self {
            effects: vec![Box::new(RegisterMissingAttributes)],
        }
    }

    pub fn empty() -> Self {
        Self { effects: Vec::new() }
    }

    pub fn with_effect(mut self, effect: impl PostEffect + 'static) -> Self {
        self.effects.push(Box::new(effect));
        self
    }

    pub fn len(&self) -> usize {
        self.effects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    /// Run every effect, collecting their change descriptions
    pub fn run(&self, doc: &mut Document, now: DateTime<Utc>) -> Vec<String> {
        let mut changes = Vec::new();

        for effect in &self.effects {
            let mut effect_changes = effect.apply(doc, now);
            if !effect_changes.is_empty() {
                debug!(effect = effect.name(), changes = effect_changes.len(), "post-effect applied");
            }
            changes.append(&mut effect_changes);
        }

        changes
    }
}

impl Default for PostEffectEngine {
    fn default() -> Self {
        Self::new()
    }
}
