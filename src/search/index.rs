//! Durable index storage

use crate::search::config::SearchConfig;
use crate::search::document::{FieldSchema, IndexDocument};
use crate::search::error::{SearchError, SearchResult};
use crate::search::tokenizer::{self, WORD_TOKENIZER};
use parking_lot::{Mutex, MutexGuard};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tantivy::collector::Count;
use tantivy::query::TermQuery;
use tantivy::schema::{Field, IndexRecordOption, Schema, TextFieldIndexing, TextOptions};
use tantivy::{Index, IndexReader, IndexWriter, ReloadPolicy, Searcher, TantivyDocument, Term};

/// Index statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexStats {
    /// Total number of live documents in the index
    pub total_documents: u64,

    /// Index size in bytes
    pub index_size_bytes: u64,

    /// Number of segments
    pub num_segments: usize,
}

/// Build the Tantivy schema for a field schema
pub fn build_tantivy_schema(fields: &FieldSchema) -> Schema {
    let mut schema_builder = Schema::builder();

    for def in fields.fields() {
        let indexing = if def.kind.is_tokenized() {
            TextFieldIndexing::default()
                .set_tokenizer(WORD_TOKENIZER)
                .set_index_option(IndexRecordOption::WithFreqsAndPositions)
        } else {
            TextFieldIndexing::default()
                .set_tokenizer("raw")
                .set_index_option(IndexRecordOption::Basic)
        };

        let mut options = TextOptions::default().set_indexing_options(indexing);
        if def.stored {
            options = options.set_stored();
        }
        schema_builder.add_text_field(def.name, options);
    }

    schema_builder.build()
}

/// A snapshot of the index for one search.
///
/// Writes committed after the view was opened are not visible through it.
pub struct ReadView {
    searcher: Searcher,
}

impl ReadView {
    pub fn searcher(&self) -> &Searcher {
        &self.searcher
    }

    pub fn num_docs(&self) -> u64 {
        self.searcher.num_docs()
    }

    /// Release the segment readers held by this view
    pub fn close(self) {
        drop(self.searcher);
    }
}

/// One writer session: exclusive, short-lived, committed at most once.
///
/// Dropping a session without committing discards its pending operations
/// and releases the directory lock.
struct WriterSession<'a> {
    writer: IndexWriter,
    _guard: MutexGuard<'a, ()>,
}

impl WriterSession<'_> {
    fn commit(mut self, reader: &IndexReader) -> SearchResult<()> {
        self.writer.commit()?;
        // Dropping the writer cancels the merges this commit scheduled.
        self.writer.wait_merging_threads()?;
        // Reload before the lock is released so the next reader sees the write.
        reader.reload()?;
        Ok(())
    }
}

/// Manages the Tantivy index behind the search service
pub struct IndexStore {
    /// The Tantivy index
    index: Index,

    /// Field handles by name
    fields: HashMap<&'static str, Field>,

    /// The identifier field
    id_field: Field,

    /// Serializes writer sessions
    write_lock: Mutex<()>,

    /// Index reader
    reader: IndexReader,

    /// Configuration
    config: SearchConfig,
}

impl IndexStore {
    /// Open the index at the configured location, creating it if absent
    pub fn open(config: SearchConfig, schema: &FieldSchema) -> SearchResult<Self> {
        config.validate()?;

        std::fs::create_dir_all(&config.index_path).map_err(|e| {
            SearchError::Storage(format!(
                "Failed to create index directory {}: {}",
                config.index_path.display(),
                e
            ))
        })?;

        let tantivy_schema = build_tantivy_schema(schema);

        let index = if Self::index_exists(&config.index_path) {
            let index = Index::open_in_dir(&config.index_path).map_err(|e| {
                SearchError::Storage(format!("Failed to open existing index: {}", e))
            })?;
            if index.schema() != tantivy_schema {
                return Err(SearchError::Storage(format!(
                    "Index at {} was built with a different schema",
                    config.index_path.display()
                )));
            }
            index
        } else {
            Index::create_in_dir(&config.index_path, tantivy_schema.clone()).map_err(|e| {
                SearchError::Storage(format!("Failed to create new index: {}", e))
            })?
        };

        tokenizer::register(&index);

        let reader: IndexReader = index
            .reader_builder()
            .reload_policy(ReloadPolicy::Manual)
            .try_into()
            .map_err(|e| SearchError::Storage(format!("Failed to create reader: {}", e)))?;

        let mut fields = HashMap::new();
        for def in schema.fields() {
            let field = tantivy_schema
                .get_field(def.name)
                .map_err(|e| SearchError::Schema(e.to_string()))?;
            fields.insert(def.name, field);
        }
        let id_field = fields
            .get(schema.identifier().name)
            .copied()
            .ok_or_else(|| SearchError::Schema("identifier field missing from index".to_string()))?;

        tracing::info!(
            path = %config.index_path.display(),
            fields = fields.len(),
            "Index store opened"
        );

        Ok(Self {
            index,
            fields,
            id_field,
            write_lock: Mutex::new(()),
            reader,
            config,
        })
    }

    /// Check if an index exists at the given path
    fn index_exists(path: &Path) -> bool {
        path.join("meta.json").exists()
    }

    pub fn index(&self) -> &Index {
        &self.index
    }

    /// Tantivy field handle for a declared field name
    pub fn field(&self, name: &str) -> Option<Field> {
        self.fields.get(name).copied()
    }

    /// Open a read view over the latest committed state
    pub fn open_read_view(&self) -> ReadView {
        ReadView {
            searcher: self.reader.searcher(),
        }
    }

    fn begin_write(&self) -> SearchResult<WriterSession<'_>> {
        let guard = self.write_lock.lock();
        let writer: IndexWriter = self
            .index
            .writer_with_num_threads(1, self.config.writer_heap_size)
            .map_err(|e| SearchError::Storage(format!("Failed to create writer: {}", e)))?;
        Ok(WriterSession {
            writer,
            _guard: guard,
        })
    }

    fn id_term(&self, id: &str) -> Term {
        Term::from_field_text(self.id_field, id)
    }

    fn to_tantivy_doc(&self, document: &IndexDocument) -> SearchResult<TantivyDocument> {
        let mut doc = TantivyDocument::new();
        for entry in document.entries() {
            let field = self.field(&entry.name).ok_or_else(|| {
                SearchError::Mapping(format!("field '{}' is not in the index schema", entry.name))
            })?;
            doc.add_text(field, &entry.value);
        }
        Ok(doc)
    }

    /// Replace the document with the same identifier, or insert it
    pub fn upsert(&self, document: &IndexDocument) -> SearchResult<()> {
        self.upsert_batch(std::slice::from_ref(document)).map(|_| ())
    }

    /// Upsert several documents under one commit
    pub fn upsert_batch(&self, documents: &[IndexDocument]) -> SearchResult<usize> {
        let docs = documents
            .iter()
            .map(|document| Ok((document.identifier(), self.to_tantivy_doc(document)?)))
            .collect::<SearchResult<Vec<_>>>()?;

        let session = self.begin_write()?;
        for (id, doc) in docs {
            // Delete-then-add: only the newest add survives the commit.
            session.writer.delete_term(self.id_term(id));
            session.writer.add_document(doc)?;
        }
        session.commit(&self.reader)?;

        tracing::debug!(documents = documents.len(), "Documents upserted");
        Ok(documents.len())
    }

    /// Whether a document with this identifier is in the committed state
    pub fn contains(&self, id: &str) -> SearchResult<bool> {
        let searcher = self.reader.searcher();
        self.count_id(&searcher, id).map(|count| count > 0)
    }

    fn count_id(&self, searcher: &Searcher, id: &str) -> SearchResult<usize> {
        let query = TermQuery::new(self.id_term(id), IndexRecordOption::Basic);
        Ok(searcher.search(&query, &Count)?)
    }

    /// Delete the document with this identifier. Returns whether one existed.
    pub fn delete_by_identifier(&self, id: &str) -> SearchResult<bool> {
        let session = self.begin_write()?;

        // Checked under the writer lock so no commit can slip in between.
        let existed = self.count_id(&self.reader.searcher(), id)? > 0;
        if !existed {
            tracing::debug!(id, "Delete of absent identifier ignored");
            return Ok(false);
        }

        session.writer.delete_term(self.id_term(id));
        session.commit(&self.reader)?;

        tracing::debug!(id, "Document deleted");
        Ok(true)
    }

    /// Remove every document
    pub fn delete_all(&self) -> SearchResult<()> {
        let session = self.begin_write()?;
        session.writer.delete_all_documents()?;
        session.commit(&self.reader)?;
        tracing::debug!("All documents deleted");
        Ok(())
    }

    /// Get index statistics
    pub fn stats(&self) -> SearchResult<IndexStats> {
        let searcher = self.reader.searcher();

        let index_size_bytes = std::fs::read_dir(&self.config.index_path)
            .map(|entries| {
                entries
                    .filter_map(|e| e.ok())
                    .filter_map(|e| e.metadata().ok())
                    .map(|m| m.len())
                    .sum()
            })
            .unwrap_or(0);

        Ok(IndexStats {
            total_documents: searcher.num_docs(),
            index_size_bytes,
            num_segments: searcher.segment_readers().len(),
        })
    }
}
