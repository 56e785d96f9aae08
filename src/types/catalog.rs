//! Lookup tables for category and state name resolution
//!
//! The validator resolves human-readable names against these snapshots and
//! falls back to a designated entry when a name is blank or unknown.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One resolvable entity (category or report state)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LookupEntry {
    pub id: Uuid,
    pub name: String,
}

impl LookupEntry {
    pub fn new(name: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.to_string(),
        }
    }
}

/// Name→id resolver with a designated fallback entry
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LookupTable {
    pub entries: Vec<LookupEntry>,
    pub fallback: LookupEntry,
}

impl LookupTable {
    pub fn new(fallback: LookupEntry, entries: Vec<LookupEntry>) -> Self {
        Self { entries, fallback }
    }

    /// Resolve a name, trimmed and case-insensitive. The fallback entry
    /// resolves by name as well.
    pub fn resolve(&self, name: &str) -> Option<Uuid> {
        let needle = name.trim();
        if needle.is_empty() {
            return None;
        }
        self.entries
            .iter()
            .chain(std::iter::once(&self.fallback))
            .find(|e| e.name.eq_ignore_ascii_case(needle))
            .map(|e| e.id)
    }

    pub fn fallback_id(&self) -> Uuid {
        self.fallback.id
    }

    pub fn fallback_name(&self) -> &str {
        &self.fallback.name
    }
}

/// Defaulting context for report imports
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Catalog {
    pub categories: LookupTable,
    pub states: LookupTable,
}

impl Catalog {
    /// Load a catalog from its JSON representation (the CLI's `--catalog` file).
    pub fn from_json(content: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(content)
    }
}
