//! Error types for bookstore

use thiserror::Error;

/// Result type alias for bookstore operations
pub type Result<T> = std::result::Result<T, BookstoreError>;

/// Unified error type for all bookstore operations
#[derive(Error, Debug, Clone)]
pub enum BookstoreError {
    #[error("MongoDB error: {0}")]
    MongoDB(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    #[error("Query error: {0}")]
    Query(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<serde_json::Error> for BookstoreError {
    fn from(err: serde_json::Error) -> Self {
        BookstoreError::Serialization(err.to_string())
    }
}

// MongoDB-specific error conversions (when mongodb-errors feature is enabled)
#[cfg(feature = "mongodb-errors")]
impl From<mongodb::error::Error> for BookstoreError {
    fn from(err: mongodb::error::Error) -> Self {
        use mongodb::error::ErrorKind;
        match *err.kind {
            ErrorKind::ServerSelection { .. }
            | ErrorKind::Io(_)
            | ErrorKind::DnsResolve { .. }
            | ErrorKind::Authentication { .. } => BookstoreError::Connection(err.to_string()),
            ErrorKind::InvalidArgument { .. } => BookstoreError::Query(err.to_string()),
            ErrorKind::BsonDeserialization(_) => BookstoreError::Deserialization(err.to_string()),
            ErrorKind::BsonSerialization(_) => BookstoreError::Serialization(err.to_string()),
            _ => BookstoreError::MongoDB(err.to_string()),
        }
    }
}

#[cfg(feature = "mongodb-errors")]
impl From<bson::ser::Error> for BookstoreError {
    fn from(err: bson::ser::Error) -> Self {
        BookstoreError::Serialization(format!("BSON serialization error: {}", err))
    }
}

#[cfg(feature = "mongodb-errors")]
impl From<bson::de::Error> for BookstoreError {
    fn from(err: bson::de::Error) -> Self {
        BookstoreError::Deserialization(format!("BSON deserialization error: {}", err))
    }
}

#[cfg(feature = "mongodb-errors")]
impl From<bson::document::ValueAccessError> for BookstoreError {
    fn from(err: bson::document::ValueAccessError) -> Self {
        BookstoreError::Deserialization(format!("Unexpected document shape: {}", err))
    }
}
