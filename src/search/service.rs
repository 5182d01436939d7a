//! Index service: the four operations the application uses

use crate::search::config::SearchConfig;
use crate::search::document::{FieldSchema, Indexable};
use crate::search::error::SearchResult;
use crate::search::index::{IndexStats, IndexStore};
use crate::search::mapper;
use crate::search::query::{QueryEngine, SearchRequest};
use serde::{Deserialize, Serialize};
use std::marker::PhantomData;

/// A partial record with its relevance score
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredRecord<T> {
    pub record: T,
    pub score: f32,
}

/// Search results and metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse<T> {
    /// Ranked hits, best first
    pub hits: Vec<ScoredRecord<T>>,

    /// Number of matching documents before the limit was applied
    pub total_hits: usize,

    /// Search execution time in milliseconds
    pub search_time_ms: u64,
}

/// Indexes and searches records of type `T`
pub struct IndexService<T: Indexable> {
    store: IndexStore,
    schema: FieldSchema,
    config: SearchConfig,
    _record: PhantomData<fn() -> T>,
}

impl<T: Indexable> IndexService<T> {
    /// Open the index at `config.index_path` for records of type `T`
    pub fn open(config: SearchConfig) -> SearchResult<Self> {
        let schema = FieldSchema::new(T::fields())?;
        let store = IndexStore::open(config.clone(), &schema)?;

        Ok(Self {
            store,
            schema,
            config,
            _record: PhantomData,
        })
    }

    pub fn schema(&self) -> &FieldSchema {
        &self.schema
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Index a record, replacing any document with the same identifier
    pub fn add_or_replace(&self, record: &T) -> SearchResult<()> {
        let document = mapper::to_document(record, &self.schema)?;
        self.store.upsert(&document)?;
        tracing::debug!(id = document.identifier(), "Record indexed");
        Ok(())
    }

    /// Index several records in one commit
    pub fn add_or_replace_all(&self, records: &[T]) -> SearchResult<usize> {
        let documents = records
            .iter()
            .map(|record| mapper::to_document(record, &self.schema))
            .collect::<SearchResult<Vec<_>>>()?;
        let indexed = self.store.upsert_batch(&documents)?;
        tracing::info!(indexed, "Records indexed");
        Ok(indexed)
    }

    /// Remove a record by identifier. Returns whether it was indexed.
    pub fn remove(&self, id: &str) -> SearchResult<bool> {
        self.store.delete_by_identifier(id)
    }

    /// Remove every record
    pub fn remove_all(&self) -> SearchResult<()> {
        self.store.delete_all()?;
        tracing::info!("Index cleared");
        Ok(())
    }

    /// Whether a record with this identifier is indexed
    pub fn contains(&self, id: &str) -> SearchResult<bool> {
        self.store.contains(id)
    }

    /// Search one field and map the hits back into partial records
    pub fn search(&self, request: &SearchRequest) -> SearchResult<SearchResponse<T>> {
        let start_time = std::time::Instant::now();

        let mut request = request.clone();
        request.limit = request.limit.min(self.config.max_results);

        let view = self.store.open_read_view();
        let result = QueryEngine::new(&self.store)
            .search(&view, &request)
            .and_then(|found| {
                let hits = found
                    .hits
                    .iter()
                    .map(|hit| {
                        tracing::debug!(score = hit.score, "Search hit");
                        mapper::from_hit::<T>(hit, &self.schema, &self.store, &view)
                            .map(|record| ScoredRecord {
                                record,
                                score: hit.score,
                            })
                    })
                    .collect::<SearchResult<Vec<_>>>()?;
                Ok((hits, found.total_hits))
            });
        view.close();
        let (hits, total_hits) = result?;

        let search_time_ms = start_time.elapsed().as_millis() as u64;
        tracing::info!(
            field = %request.field,
            expression = %request.expression,
            total_hits,
            returned = hits.len(),
            search_time_ms,
            "Search executed"
        );

        Ok(SearchResponse {
            hits,
            total_hits,
            search_time_ms,
        })
    }

    /// Search with the configured default limit
    pub fn search_field(&self, field: &str, expression: &str) -> SearchResult<SearchResponse<T>> {
        self.search(&SearchRequest::new(field, expression).with_limit(self.config.default_limit))
    }

    /// Get index statistics
    pub fn stats(&self) -> SearchResult<IndexStats> {
        self.store.stats()
    }
}
