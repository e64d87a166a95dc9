//! Connection settings with environment overrides

use crate::book::Book;
use crate::connection::PoolConfig;
use crate::document::Document;
use crate::validation::{validate_collection_name, validate_database_name};
use bookstore_common::{BookstoreError, Result};

/// Local server used when nothing else is configured
pub const DEFAULT_URI: &str = "mongodb://localhost:27017";

/// Database holding the `books` collection
pub const DEFAULT_DATABASE: &str = "bookstore";

/// Collection every catalog operation targets
pub const DEFAULT_COLLECTION: &str = <Book as Document>::DEFAULT_COLLECTION;

/// Environment variable holding the connection string
pub const ENV_URI: &str = "MONGODB_URI";
/// Environment variable overriding the database name
pub const ENV_DATABASE: &str = "BOOKSTORE_DB";
/// Environment variable overriding the collection name
pub const ENV_COLLECTION: &str = "BOOKSTORE_COLLECTION";

/// Where to connect and which namespace to use
#[derive(Debug, Clone)]
pub struct BookstoreConfig {
    pub uri: String,
    pub database: String,
    pub collection: String,
    pub pool: PoolConfig,
}

impl Default for BookstoreConfig {
    fn default() -> Self {
        Self {
            uri: DEFAULT_URI.to_string(),
            database: DEFAULT_DATABASE.to_string(),
            collection: DEFAULT_COLLECTION.to_string(),
            pool: PoolConfig::default(),
        }
    }
}

impl BookstoreConfig {
    /// Defaults overridden by `MONGODB_URI`, `BOOKSTORE_DB` and `BOOKSTORE_COLLECTION`.
    pub fn from_env() -> Self {
        Self::default().with_env()
    }

    /// Create with an explicit connection string and default namespace.
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            ..Self::default()
        }
    }

    /// Apply process environment overrides on top of `self`.
    pub fn with_env(self) -> Self {
        self.with_vars(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary variable lookup. Empty values are ignored.
    pub fn with_vars(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(uri) = get(ENV_URI) {
            self.uri = uri;
        }
        if let Some(database) = get(ENV_DATABASE) {
            self.database = database;
        }
        if let Some(collection) = get(ENV_COLLECTION) {
            self.collection = collection;
        }
        self
    }

    /// Check the connection string scheme and namespace names.
    pub fn validate(&self) -> Result<()> {
        if !(self.uri.starts_with("mongodb://") || self.uri.starts_with("mongodb+srv://")) {
            return Err(BookstoreError::Config(format!(
                "Connection string must start with mongodb:// or mongodb+srv://, got '{}'",
                redact_uri(&self.uri)
            )));
        }
        validate_database_name(&self.database)?;
        validate_collection_name(&self.collection)?;
        Ok(())
    }
}

/// Hide the password part of a connection string for logging.
///
/// Only the authority (before the first `/` or `?`) is searched for
/// credentials, and a user without a password is left as is.
pub fn redact_uri(uri: &str) -> String {
    let Some(scheme_end) = uri.find("://") else {
        return uri.to_string();
    };
    let (prefix, rest) = uri.split_at(scheme_end + 3);
    let authority_end = rest.find(['/', '?']).unwrap_or(rest.len());
    let Some(at) = rest[..authority_end].rfind('@') else {
        return uri.to_string();
    };
    match rest[..at].split_once(':') {
        Some((user, _password)) => format!("{}{}:****{}", prefix, user, &rest[at..]),
        None => uri.to_string(),
    }
}
