//! Common utilities for bookstore
//!
//! Shared error type used by the driver layer and the CLI.

pub mod error;

pub use error::{BookstoreError, Result};
