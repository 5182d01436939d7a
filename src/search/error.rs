//! Error types for search operations

use crate::error::AppError;

/// Result type for search operations
pub type SearchResult<T> = std::result::Result<T, SearchError>;

/// Errors that can occur during indexing and retrieval
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// Durable storage failed or is corrupt
    #[error("Storage error: {0}")]
    Storage(String),

    /// A field value cannot be represented in the index
    #[error("Cannot encode field '{field}': {message}")]
    Encoding { field: String, message: String },

    /// A stored field value cannot be parsed as its declared kind
    #[error("Cannot decode field '{field}': {message}")]
    Decoding { field: String, message: String },

    /// Malformed query expression
    #[error("Query syntax error: {0}")]
    QuerySyntax(String),

    /// Record shape does not match the mapped document
    #[error("Mapping error: {0}")]
    Mapping(String),

    /// Invalid field schema declaration
    #[error("Schema error: {0}")]
    Schema(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl SearchError {
    pub(crate) fn encoding(field: &str, message: impl Into<String>) -> Self {
        SearchError::Encoding {
            field: field.to_string(),
            message: message.into(),
        }
    }

    pub(crate) fn decoding(field: &str, message: impl Into<String>) -> Self {
        SearchError::Decoding {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl From<tantivy::TantivyError> for SearchError {
    fn from(err: tantivy::TantivyError) -> Self {
        SearchError::Storage(err.to_string())
    }
}

impl From<tantivy::query::QueryParserError> for SearchError {
    fn from(err: tantivy::query::QueryParserError) -> Self {
        SearchError::QuerySyntax(err.to_string())
    }
}

impl From<SearchError> for AppError {
    fn from(err: SearchError) -> Self {
        match err {
            SearchError::QuerySyntax(msg) => AppError::Validation(msg),
            SearchError::Encoding { .. } => AppError::Validation(err.to_string()),
            SearchError::InvalidConfiguration(msg) => AppError::Configuration(msg),
            SearchError::Io(err) => AppError::Io(err),
            _ => AppError::Search(err.to_string()),
        }
    }
}
