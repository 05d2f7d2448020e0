//! # Alias Table
//!
//! Batch-scoped names for identifiers generated earlier in the same batch.
//! An `add` carrying `"alias": "g1"` binds the new node's identifier; later
//! operations address it as `"$g1"`. The table lives for one batch only.

use std::collections::HashMap;

use crate::errors::OperationError;

/// Reference naming the document's top-level list
pub const ROOT_REF: &str = "root";

/// Prefix marking a reference as an alias
pub const ALIAS_PREFIX: char = '$';

/// Syntactic classification of a reference string
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reference<'a> {
    Root,
    Alias(&'a str),
    Id(&'a str),
}

impl<'a> Reference<'a> {
    pub fn parse(raw: &'a str) -> Self {
        if raw == ROOT_REF {
            Reference::Root
        } else if let Some(name) = raw.strip_prefix(ALIAS_PREFIX) {
            Reference::Alias(name)
        } else {
            Reference::Id(raw)
        }
    }
}

/// Resolved insertion anchor
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Anchor {
    Root,
    Node(String),
}

#[derive(Debug, Clone, Default)]
pub struct AliasTable {
    bindings: HashMap<String, String>,
}

impl AliasTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `name` (with or without the `$` prefix) to `uid`. Rebinding replaces.
    pub fn bind(&mut self, name: &str, uid: impl Into<String>) {
        let name = name.strip_prefix(ALIAS_PREFIX).unwrap_or(name);
        self.bindings.insert(name.to_string(), uid.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.bindings.get(name).map(String::as_str)
    }

    /// Resolve a reference that may name the root
    pub fn resolve(&self, raw: &str) -> Result<Anchor, OperationError> {
        match Reference::parse(raw) {
            Reference::Root => Ok(Anchor::Root),
            Reference::Alias(name) => self
                .get(name)
                .map(|uid| Anchor::Node(uid.to_string()))
                .ok_or_else(|| OperationError::ReferenceNotFound(raw.to_string())),
            Reference::Id(uid) => Ok(Anchor::Node(uid.to_string())),
        }
    }

    /// Resolve a reference that must name a node
    pub fn resolve_node(&self, raw: &str) -> Result<String, OperationError> {
        match self.resolve(raw)? {
            Anchor::Node(uid) => Ok(uid),
            Anchor::Root => Err(OperationError::malformed(
                "the root reference cannot be used as a node target",
            )),
        }
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_classification() {
        assert_eq!(Reference::parse("root"), Reference::Root);
        assert_eq!(Reference::parse("$g1"), Reference::Alias("g1"));
        assert_eq!(Reference::parse("abc-12"), Reference::Id("abc-12"));
    }

    #[test]
    fn test_bound_alias_resolves() {
        let mut aliases = AliasTable::new();
        aliases.bind("$g1", "abc-1");
        aliases.bind("g2", "abc-2");

        assert_eq!(aliases.resolve("$g1"), Ok(Anchor::Node("abc-1".to_string())));
        assert_eq!(aliases.resolve_node("$g2"), Ok("abc-2".to_string()));
        assert_eq!(aliases.len(), 2);
    }

    #[test]
    fn test_unbound_alias_is_not_found() {
        let aliases = AliasTable::new();
        assert_eq!(
            aliases.resolve("$later"),
            Err(OperationError::ReferenceNotFound("$later".to_string()))
        );
    }

    #[test]
    fn test_root_is_never_an_alias() {
        let mut aliases = AliasTable::new();
        aliases.bind("root", "abc-1");

        assert_eq!(aliases.resolve("root"), Ok(Anchor::Root));
        assert!(matches!(
            aliases.resolve_node("root"),
            Err(OperationError::MalformedOperation(_))
        ));
    }
}
