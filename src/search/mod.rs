//! Full-text indexing and retrieval of structured records, powered by Tantivy
//!
//! Records declare a static field schema; the service turns them into index
//! documents, keeps a durable on-disk index, and maps ranked hits back into
//! (partial) records:
//!
//! ```text
//! record ──► mapper::to_document ──► IndexStore::upsert
//!
//! expression ──► QueryEngine::search ──► hits ──► mapper::from_hit ──► records
//! ```
//!
//! Fields are one of four kinds:
//!
//! - **identifier**: exact-match update/delete key
//! - **exact text**: compared as a whole string
//! - **tokenized text**: split on Unicode word boundaries and lower-cased
//! - **integer**: exact-match decimal text, read back as a number
//!
//! Each field is either stored (returned by searches) or index-only
//! (searchable, but left at its default value in search results).
//!
//! # Example
//!
//! ```no_run
//! use story_search::search::{FieldDef, IndexService, Indexable, SearchConfig, SearchRequest};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Default, Serialize, Deserialize)]
//! struct Note {
//!     id: String,
//!     body: String,
//! }
//!
//! const NOTE_FIELDS: &[FieldDef] = &[FieldDef::identifier("id"), FieldDef::text("body", true)];
//!
//! impl Indexable for Note {
//!     fn fields() -> &'static [FieldDef] {
//!         NOTE_FIELDS
//!     }
//! }
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let service = IndexService::<Note>::open(SearchConfig::default())?;
//!     service.add_or_replace(&Note { id: "n1".into(), body: "hello world".into() })?;
//!
//!     let results = service.search(&SearchRequest::new("body", "hello").with_limit(10))?;
//!     println!("Found {} notes", results.total_hits);
//!     Ok(())
//! }
//! ```

mod codec;
mod config;
mod document;
mod error;
mod index;
mod mapper;
mod query;
mod service;
mod tokenizer;

pub use codec::{decode, encode};
pub use config::{SearchConfig, SearchConfigBuilder};
pub use document::{FieldDef, FieldEntry, FieldKind, FieldSchema, IndexDocument, Indexable};
pub use error::{SearchError, SearchResult};
pub use index::{IndexStats, IndexStore, ReadView};
pub use mapper::{from_hit, materialize, to_document};
pub use query::{Hit, HitList, QueryEngine, SearchRequest, DEFAULT_LIMIT};
pub use service::{IndexService, ScoredRecord, SearchResponse};
pub use tokenizer::{terms, WORD_TOKENIZER};
