use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kind of value stored under a registry entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueKind {
    #[default]
    String,
    Number,
    Boolean,
    Date,
    Choice,
    File,
}

/// Metadata for one named field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeEntry {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub value_kind: ValueKind,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub multiple: bool,
}

impl AttributeEntry {
    /// Default single-valued string entry
    pub fn string(name: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            value_kind: ValueKind::String,
            created_at: now,
            updated_at: now,
            multiple: false,
        }
    }
}

/// Field metadata keyed by unique field name.
///
/// Serialized as a plain list. Entries are only ever added, never pruned.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttributeRegistry {
    entries: Vec<AttributeEntry>,
}

impl AttributeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&AttributeEntry> {
        self.entries.iter().find(|entry| entry.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Add an entry unless one with the same name exists. Returns whether it was added.
    pub fn insert(&mut self, entry: AttributeEntry) -> bool {
        if self.contains(&entry.name) {
            return false;
        }
        self.entries.push(entry);
        true
    }

    /// Make sure `name` has an entry, creating a default string entry if absent.
    /// Returns whether an entry was created.
    pub fn ensure(&mut self, name: &str, now: DateTime<Utc>) -> bool {
        self.insert(AttributeEntry::string(name, now))
    }

    pub fn iter(&self) -> impl Iterator<Item = &AttributeEntry> {
        self.entries.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|entry| entry.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<AttributeEntry> for AttributeRegistry {
    fn from_iter<I: IntoIterator<Item = AttributeEntry>>(iter: I) -> Self {
        let mut registry = Self::new();
        for entry in iter {
            registry.insert(entry);
        }
        registry
    }
}
