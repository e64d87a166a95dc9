//! MongoDB operations for the bookstore `books` collection
//!
//! This crate wraps the official driver with a fixed catalog of operations:
//!
//! # Features
//! - Connection setup with pool configuration (`connect_db`, `Connection`)
//! - Basic CRUD by genre, year, author and title
//! - Compound filters, projection, sorting and pagination
//! - Aggregation pipelines (average price per genre, top author, decade buckets)
//! - Index creation and `explain("executionStats")` summaries
//! - A bundled sample data set for seeding

pub mod advanced;
pub mod aggregation;
pub mod book;
pub mod config;
pub mod connection;
pub mod crud;
pub mod document;
pub mod indexes;
pub mod script;
pub mod seed;
pub mod validation;

pub use bson;
pub use mongodb;

pub use advanced::{Page, SortOrder, DEFAULT_PAGE_SIZE};
pub use aggregation::{AuthorBookCount, DecadeBucket, DecadeLabel, GenreAveragePrice};
pub use book::{Book, BookSummary};
pub use bookstore_common::{BookstoreError, Result};
pub use config::BookstoreConfig;
pub use connection::{connect_db, Connection, PoolConfig};
pub use document::{DeleteOutcome, Document, UpdateOutcome};
pub use indexes::ExplainSummary;
pub use script::{run_all, ScriptReport, StepOutcome};
