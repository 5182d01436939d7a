//! Field schema declarations and the indexed document shape

use crate::search::error::{SearchError, SearchResult};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// How a field is matched at query time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    /// Exact-match key used for update and delete
    Identifier,
    /// Whole-string exact match, never tokenized
    ExactText,
    /// Split into lower-cased word terms
    TokenizedText,
    /// Exact-match decimal text, read back as a number
    Integer,
}

impl FieldKind {
    /// Whether the field goes through the word tokenizer
    pub fn is_tokenized(self) -> bool {
        matches!(self, FieldKind::TokenizedText)
    }
}

/// Declaration of one record field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDef {
    pub name: &'static str,
    pub kind: FieldKind,
    pub stored: bool,
}

impl FieldDef {
    pub const fn new(name: &'static str, kind: FieldKind, stored: bool) -> Self {
        Self { name, kind, stored }
    }

    /// The update/delete key. Always stored.
    pub const fn identifier(name: &'static str) -> Self {
        Self::new(name, FieldKind::Identifier, true)
    }

    pub const fn exact(name: &'static str, stored: bool) -> Self {
        Self::new(name, FieldKind::ExactText, stored)
    }

    pub const fn text(name: &'static str, stored: bool) -> Self {
        Self::new(name, FieldKind::TokenizedText, stored)
    }

    pub const fn integer(name: &'static str, stored: bool) -> Self {
        Self::new(name, FieldKind::Integer, stored)
    }
}

/// Validated field declarations of one record type
#[derive(Debug, Clone)]
pub struct FieldSchema {
    fields: Vec<FieldDef>,
    identifier: usize,
}

impl FieldSchema {
    /// Validate a declaration: exactly one stored identifier, unique non-empty names
    pub fn new(fields: &[FieldDef]) -> SearchResult<Self> {
        let mut seen = HashSet::new();
        for def in fields {
            if def.name.is_empty() {
                return Err(SearchError::Schema("field names must not be empty".to_string()));
            }
            if !seen.insert(def.name) {
                return Err(SearchError::Schema(format!(
                    "field '{}' is declared more than once",
                    def.name
                )));
            }
        }

        let identifiers: Vec<usize> = fields
            .iter()
            .enumerate()
            .filter(|(_, def)| def.kind == FieldKind::Identifier)
            .map(|(pos, _)| pos)
            .collect();

        match identifiers.as_slice() {
            [identifier] if !fields[*identifier].stored => Err(SearchError::Schema(format!(
                "identifier field '{}' must be stored",
                fields[*identifier].name
            ))),
            [identifier] => Ok(Self {
                fields: fields.to_vec(),
                identifier: *identifier,
            }),
            [] => Err(SearchError::Schema(
                "schema declares no identifier field".to_string(),
            )),
            _ => Err(SearchError::Schema(format!(
                "schema declares {} identifier fields, expected exactly one",
                identifiers.len()
            ))),
        }
    }

    pub fn fields(&self) -> &[FieldDef] {
        &self.fields
    }

    pub fn identifier(&self) -> &FieldDef {
        &self.fields[self.identifier]
    }

    pub fn get(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|def| def.name == name)
    }

    /// Fields whose values come back from a search hit
    pub fn stored_fields(&self) -> impl Iterator<Item = &FieldDef> {
        self.fields.iter().filter(|def| def.stored)
    }

    /// Fields that are searchable but must be re-joined from the record store
    pub fn index_only_fields(&self) -> impl Iterator<Item = &FieldDef> {
        self.fields.iter().filter(|def| !def.stored)
    }
}

/// A record type that can be indexed.
///
/// Serde provides the generic field access: a record is serialized to a JSON
/// object to read its fields by name, and rebuilt from one on the way back.
/// Fields left out of a search hit keep their `Default` value.
pub trait Indexable: Serialize + DeserializeOwned + Default + Send + Sync + 'static {
    /// Static field declarations of this record type
    fn fields() -> &'static [FieldDef];
}

/// One encoded field of an index document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldEntry {
    pub name: String,
    pub value: String,
    pub kind: FieldKind,
    pub stored: bool,
}

/// The indexed representation of one record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexDocument {
    identifier: String,
    entries: Vec<FieldEntry>,
}

impl IndexDocument {
    /// Build a document from ordered entries; exactly one must be the identifier
    pub fn new(entries: Vec<FieldEntry>) -> SearchResult<Self> {
        let mut ids = entries
            .iter()
            .filter(|entry| entry.kind == FieldKind::Identifier);

        let identifier = match (ids.next(), ids.next()) {
            (Some(entry), None) => entry.value.clone(),
            (None, _) => {
                return Err(SearchError::Mapping(
                    "document has no identifier entry".to_string(),
                ))
            }
            (Some(_), Some(_)) => {
                return Err(SearchError::Mapping(
                    "document has more than one identifier entry".to_string(),
                ))
            }
        };

        Ok(Self {
            identifier,
            entries,
        })
    }

    /// Value of the identifier entry, used as the update/delete key
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn entries(&self) -> &[FieldEntry] {
        &self.entries
    }

    pub fn get(&self, name: &str) -> Option<&FieldEntry> {
        self.entries.iter().find(|entry| entry.name == name)
    }
}
