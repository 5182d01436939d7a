//! Search configuration

use crate::search::error::{SearchError, SearchResult};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Tantivy refuses writer budgets below this per indexing thread.
const MIN_WRITER_HEAP_SIZE: usize = 15_000_000;

/// Search service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Path to the search index directory
    pub index_path: PathBuf,

    /// Index writer heap size in bytes (default: 50MB)
    pub writer_heap_size: usize,

    /// Hard cap on the number of hits a single search may return
    pub max_results: usize,

    /// Limit used when a search does not name one
    pub default_limit: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            index_path: PathBuf::from("./data/index"),
            writer_heap_size: 50_000_000, // 50MB
            max_results: 1000,
            default_limit: 100,
        }
    }
}

impl SearchConfig {
    /// Reject settings the index cannot run with
    pub fn validate(&self) -> SearchResult<()> {
        if self.index_path.as_os_str().is_empty() {
            return Err(SearchError::InvalidConfiguration(
                "index_path must not be empty".to_string(),
            ));
        }
        if self.writer_heap_size < MIN_WRITER_HEAP_SIZE {
            return Err(SearchError::InvalidConfiguration(format!(
                "writer_heap_size must be at least {} bytes, got {}",
                MIN_WRITER_HEAP_SIZE, self.writer_heap_size
            )));
        }
        Ok(())
    }
}

/// Builder for SearchConfig
pub struct SearchConfigBuilder {
    config: SearchConfig,
}

impl SearchConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: SearchConfig::default(),
        }
    }

    pub fn index_path(mut self, path: PathBuf) -> Self {
        self.config.index_path = path;
        self
    }

    pub fn writer_heap_size(mut self, size: usize) -> Self {
        self.config.writer_heap_size = size;
        self
    }

    pub fn max_results(mut self, max: usize) -> Self {
        self.config.max_results = max;
        self
    }

    pub fn default_limit(mut self, limit: usize) -> Self {
        self.config.default_limit = limit;
        self
    }

    pub fn build(self) -> SearchConfig {
        self.config
    }
}

impl Default for SearchConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_overrides_defaults() {
        let config = SearchConfigBuilder::new()
            .index_path(PathBuf::from("/tmp/stories"))
            .max_results(10)
            .build();

        assert_eq!(config.index_path, PathBuf::from("/tmp/stories"));
        assert_eq!(config.max_results, 10);
        assert_eq!(config.default_limit, 100);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_small_heap_is_rejected() {
        let config = SearchConfigBuilder::new().writer_heap_size(1_000).build();
        assert!(matches!(
            config.validate(),
            Err(SearchError::InvalidConfiguration(_))
        ));
    }
}
