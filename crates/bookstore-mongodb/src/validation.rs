//! Name validation for MongoDB namespaces
//!
//! Database and collection names come from flags, environment variables and
//! config files, so they are checked once before any client is built.

use bookstore_common::{BookstoreError, Result};
use tracing::warn;

/// Maximum allowed length for collection names (MongoDB limit is 255, we're more conservative)
const MAX_COLLECTION_NAME_LENGTH: usize = 120;

/// MongoDB limit for database names
const MAX_DATABASE_NAME_LENGTH: usize = 64;

/// Characters MongoDB rejects in database names
const INVALID_DATABASE_CHARS: &[char] = &[
    '/', '\\', '.', ' ', '"', '$', '*', '<', '>', ':', '|', '?',
];

/// Checks a collection name
///
/// # Rules
/// - Not empty
/// - Maximum 120 characters
/// - No null bytes
/// - No "system." prefix (system collections)
/// - No $ characters (special operators)
///
/// # Errors
/// Returns `BookstoreError::Validation` if any of the rules above is violated.
pub fn validate_collection_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(BookstoreError::Validation(
            "Collection name cannot be empty".to_string(),
        ));
    }

    if name.len() > MAX_COLLECTION_NAME_LENGTH {
        return Err(BookstoreError::Validation(format!(
            "Collection name exceeds maximum length of {} characters: '{}'",
            MAX_COLLECTION_NAME_LENGTH, name
        )));
    }

    if name.contains('\0') {
        return Err(BookstoreError::Validation(
            "Collection name cannot contain null bytes".to_string(),
        ));
    }

    if name.starts_with("system.") {
        return Err(BookstoreError::Validation(format!(
            "Collection name cannot start with 'system.' (reserved): '{}'",
            name
        )));
    }

    if name.contains('$') {
        return Err(BookstoreError::Validation(format!(
            "Collection name cannot contain '$' character: '{}'",
            name
        )));
    }

    if name.contains("..") || name.contains("//") {
        warn!(collection = name, "collection name contains suspicious pattern");
    }

    Ok(())
}

/// Checks a database name against the server's naming restrictions
pub fn validate_database_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(BookstoreError::Validation(
            "Database name cannot be empty".to_string(),
        ));
    }

    if name.len() >= MAX_DATABASE_NAME_LENGTH {
        return Err(BookstoreError::Validation(format!(
            "Database name must be shorter than {} characters: '{}'",
            MAX_DATABASE_NAME_LENGTH, name
        )));
    }

    if let Some(c) = name
        .chars()
        .find(|c| *c == '\0' || INVALID_DATABASE_CHARS.contains(c))
    {
        return Err(BookstoreError::Validation(format!(
            "Database name contains invalid character {:?}: '{}'",
            c, name
        )));
    }

    Ok(())
}
