//! Schema-driven mapping between records and index documents

use crate::search::codec;
use crate::search::document::{FieldEntry, FieldSchema, IndexDocument, Indexable};
use crate::search::error::{SearchError, SearchResult};
use crate::search::index::{IndexStore, ReadView};
use crate::search::query::Hit;
use serde_json::{Map, Value};
use tantivy::schema::Value as _;
use tantivy::TantivyDocument;

/// Encode a record into an index document, one entry per declared field.
///
/// Fields that serialize to `null` are left out; the identifier never is.
pub fn to_document<T: Indexable>(record: &T, schema: &FieldSchema) -> SearchResult<IndexDocument> {
    let object = match serde_json::to_value(record) {
        Ok(Value::Object(object)) => object,
        Ok(_) => {
            return Err(SearchError::Mapping(
                "record does not serialize to an object".to_string(),
            ))
        }
        Err(e) => return Err(SearchError::Mapping(e.to_string())),
    };

    let mut entries = Vec::with_capacity(schema.fields().len());
    for def in schema.fields() {
        match object.get(def.name) {
            None | Some(Value::Null) if def == schema.identifier() => {
                return Err(SearchError::encoding(def.name, "identifier is missing"));
            }
            None | Some(Value::Null) => continue,
            Some(value) => entries.push(codec::encode(def.name, value, def.kind, def.stored)?),
        }
    }

    IndexDocument::new(entries)
}

/// Read back the stored entries of the document a hit points at
pub fn stored_document(
    hit: &Hit,
    schema: &FieldSchema,
    store: &IndexStore,
    view: &ReadView,
) -> SearchResult<IndexDocument> {
    let doc: TantivyDocument = view.searcher().doc(hit.address)?;

    let mut entries = Vec::new();
    for def in schema.stored_fields() {
        let Some(field) = store.field(def.name) else {
            continue;
        };
        if let Some(text) = doc.get_first(field).and_then(|v| v.as_str()) {
            entries.push(FieldEntry {
                name: def.name.to_string(),
                value: text.to_string(),
                kind: def.kind,
                stored: true,
            });
        }
    }

    IndexDocument::new(entries)
}

/// Build a partial record from the document a hit points at.
///
/// Stored fields are decoded and assigned; index-only fields keep their
/// default value and must be re-joined by identifier. A field that fails to
/// decode is logged and skipped.
pub fn from_hit<T: Indexable>(
    hit: &Hit,
    schema: &FieldSchema,
    store: &IndexStore,
    view: &ReadView,
) -> SearchResult<T> {
    let document = stored_document(hit, schema, store, view)?;
    Ok(materialize(&document, schema))
}

/// Assign every decodable stored entry of `document` onto `T::default()`
pub fn materialize<T: Indexable>(document: &IndexDocument, schema: &FieldSchema) -> T {
    let mut decoded = Map::new();
    for def in schema.stored_fields() {
        let Some(entry) = document.get(def.name) else {
            continue;
        };
        match codec::decode(entry, def.kind) {
            Ok(value) => {
                decoded.insert(def.name.to_string(), value);
            }
            Err(e) => {
                tracing::warn!(
                    id = document.identifier(),
                    field = def.name,
                    error = %e,
                    "Skipping undecodable field"
                );
            }
        }
    }

    let base = match serde_json::to_value(T::default()) {
        Ok(Value::Object(base)) => base,
        _ => Map::new(),
    };

    let mut merged = base.clone();
    merged.extend(decoded.clone());
    match serde_json::from_value(Value::Object(merged)) {
        Ok(record) => record,
        Err(e) => {
            tracing::warn!(
                id = document.identifier(),
                error = %e,
                "Record shape does not match document, assigning fields one by one"
            );
            assign_each(base, decoded, document.identifier())
        }
    }
}

/// Degraded path: keep only the fields the record type accepts
fn assign_each<T: Indexable>(base: Map<String, Value>, decoded: Map<String, Value>, id: &str) -> T {
    let mut accepted = base;
    for (name, value) in decoded {
        let mut candidate = accepted.clone();
        candidate.insert(name.clone(), value);
        if serde_json::from_value::<T>(Value::Object(candidate.clone())).is_ok() {
            accepted = candidate;
        } else {
            let err = SearchError::Mapping(format!("record type rejects field '{}'", name));
            tracing::warn!(id, error = %err, "Skipping field");
        }
    }

    serde_json::from_value(Value::Object(accepted)).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::document::{FieldDef, FieldKind};
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
    struct Book {
        id: String,
        title: String,
        summary: String,
        pages: i64,
        #[serde(skip_serializing_if = "Option::is_none")]
        isbn: Option<String>,
    }

    const BOOK_FIELDS: &[FieldDef] = &[
        FieldDef::identifier("id"),
        FieldDef::text("title", true),
        FieldDef::text("summary", false),
        FieldDef::integer("pages", true),
        FieldDef::exact("isbn", true),
    ];

    impl Indexable for Book {
        fn fields() -> &'static [FieldDef] {
            BOOK_FIELDS
        }
    }

    fn book() -> Book {
        Book {
            id: "b1".to_string(),
            title: "Journey to the West".to_string(),
            summary: "A monkey travels west".to_string(),
            pages: 2000,
            isbn: None,
        }
    }

    fn entry(name: &str, value: &str, kind: FieldKind) -> FieldEntry {
        FieldEntry {
            name: name.to_string(),
            value: value.to_string(),
            kind,
            stored: true,
        }
    }

    #[test]
    fn test_to_document_follows_schema_order() {
        let schema = FieldSchema::new(Book::fields()).unwrap();
        let doc = to_document(&book(), &schema).unwrap();

        let names: Vec<_> = doc.entries().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["id", "title", "summary", "pages"]);
        assert_eq!(doc.identifier(), "b1");
        assert_eq!(doc.get("pages").unwrap().value, "2000");
        assert!(!doc.get("summary").unwrap().stored);
    }

    #[test]
    fn test_missing_identifier_fails() {
        #[derive(Default, Serialize, Deserialize)]
        struct NoId {
            title: String,
        }
        impl Indexable for NoId {
            fn fields() -> &'static [FieldDef] {
                const FIELDS: &[FieldDef] = &[FieldDef::identifier("id"), FieldDef::text("title", true)];
                FIELDS
            }
        }

        let schema = FieldSchema::new(NoId::fields()).unwrap();
        let err = to_document(&NoId::default(), &schema).unwrap_err();
        assert!(matches!(err, SearchError::Encoding { ref field, .. } if field == "id"));
    }

    #[test]
    fn test_materialize_leaves_index_only_fields_default() {
        let schema = FieldSchema::new(Book::fields()).unwrap();
        let doc = to_document(&book(), &schema).unwrap();

        let record: Book = materialize(&doc, &schema);
        assert_eq!(record.id, "b1");
        assert_eq!(record.title, "Journey to the West");
        assert_eq!(record.pages, 2000);
        assert_eq!(record.summary, "");
        assert_eq!(record.isbn, None);
    }

    #[test]
    fn test_undecodable_field_is_skipped() {
        let schema = FieldSchema::new(Book::fields()).unwrap();
        let doc = IndexDocument::new(vec![
            entry("id", "b2", FieldKind::Identifier),
            entry("title", "Water Margin", FieldKind::TokenizedText),
            entry("pages", "many", FieldKind::Integer),
        ])
        .unwrap();

        let record: Book = materialize(&doc, &schema);
        assert_eq!(record.id, "b2");
        assert_eq!(record.title, "Water Margin");
        assert_eq!(record.pages, 0);
    }

    #[test]
    fn test_shape_mismatch_degrades_to_partial_record() {
        // Declared as an integer but the record holds text.
        #[derive(Debug, Default, Serialize, Deserialize)]
        struct Loose {
            id: String,
            title: String,
            pages: String,
        }
        impl Indexable for Loose {
            fn fields() -> &'static [FieldDef] {
                const FIELDS: &[FieldDef] = &[
                    FieldDef::identifier("id"),
                    FieldDef::text("title", true),
                    FieldDef::integer("pages", true),
                ];
                FIELDS
            }
        }

        let schema = FieldSchema::new(Loose::fields()).unwrap();
        let doc = IndexDocument::new(vec![
            entry("id", "l1", FieldKind::Identifier),
            entry("title", "Three Kingdoms", FieldKind::TokenizedText),
            entry("pages", "35", FieldKind::Integer),
        ])
        .unwrap();

        let record: Loose = materialize(&doc, &schema);
        assert_eq!(record.id, "l1");
        assert_eq!(record.title, "Three Kingdoms");
        assert_eq!(record.pages, "");
    }
}
