use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{ModelGenError, Result};
use crate::types::ElementRecord;

/// How a schema source expresses a definition's base type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaDialect {
    /// Base named by the root record's type code
    Legacy,
    /// Base given as a `baseDefinition` URL on the definition
    Canonical,
}

/// One named definition as supplied by the schema source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefinitionEntry {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_definition: Option<String>,
    /// Value pattern of a primitive type, when the source declares one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regex: Option<String>,
    pub records: Vec<ElementRecord>,
}

impl DefinitionEntry {
    pub fn new(name: impl Into<String>, records: Vec<ElementRecord>) -> Self {
        Self {
            name: name.into(),
            url: None,
            base_definition: None,
            regex: None,
            records,
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn with_base_definition(mut self, url: impl Into<String>) -> Self {
        self.base_definition = Some(url.into());
        self
    }

    pub fn with_regex(mut self, regex: impl Into<String>) -> Self {
        self.regex = Some(regex.into());
        self
    }

    /// The record describing the definition itself.
    pub fn root_record(&self) -> Option<&ElementRecord> {
        self.records.iter().find(|record| record.is_root())
    }
}

/// Definitions keyed by their stable identifier, in load order.
#[derive(Debug, Clone, Default)]
pub struct DefinitionIndex {
    entries: IndexMap<String, DefinitionEntry>,
    dialect: Option<SchemaDialect>,
}

impl DefinitionIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = DefinitionEntry>,
    {
        let mut index = Self::new();
        for entry in entries {
            index.insert(entry);
        }
        index
    }

    /// Adds an entry; a later entry with the same name replaces the earlier one.
    pub fn insert(&mut self, entry: DefinitionEntry) -> Option<DefinitionEntry> {
        if self.entries.contains_key(&entry.name) {
            tracing::debug!("Replacing definition '{}'", entry.name);
        }
        self.entries.insert(entry.name.clone(), entry)
    }

    pub fn with_entry(mut self, entry: DefinitionEntry) -> Self {
        self.insert(entry);
        self
    }

    /// Pins the dialect instead of detecting it from the entries.
    pub fn with_dialect(mut self, dialect: SchemaDialect) -> Self {
        self.dialect = Some(dialect);
        self
    }

    pub fn set_dialect(&mut self, dialect: Option<SchemaDialect>) {
        self.dialect = dialect;
    }

    pub fn get(&self, name: &str) -> Option<&DefinitionEntry> {
        self.entries.get(name)
    }

    pub fn require(&self, name: &str) -> Result<&DefinitionEntry> {
        self.get(name).ok_or_else(|| ModelGenError::lookup(name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The pinned dialect, or the detected one: any entry carrying a
    /// `baseDefinition` makes the whole source canonical.
    pub fn dialect(&self) -> SchemaDialect {
        self.dialect.unwrap_or_else(|| self.detect_dialect())
    }

    pub fn detect_dialect(&self) -> SchemaDialect {
        if self
            .entries
            .values()
            .any(|entry| entry.base_definition.is_some())
        {
            SchemaDialect::Canonical
        } else {
            SchemaDialect::Legacy
        }
    }
}
