//! Index creation and query plan inspection

use crate::aggregation::number_as_i64;
use crate::book::Book;
use crate::crud::title_filter;
use bookstore_common::Result;
use bson::{doc, Bson, Document as BsonDocument};
use mongodb::{Collection, IndexModel};
use serde::Serialize;
use tracing::{debug, info};

pub const DEFAULT_EXPLAIN_TITLE: &str = "The Great Gatsby";
pub const DEFAULT_EXPLAIN_AUTHOR: &str = "George Orwell";
pub const DEFAULT_EXPLAIN_AFTER: i32 = 1940;

/// Verbosity passed to every explain
pub const EXPLAIN_VERBOSITY: &str = "executionStats";

/// `{ title: 1 }`
pub fn title_index_keys() -> BsonDocument {
    doc! { "title": 1 }
}

/// `{ author: 1, published_year: 1 }`
pub fn author_year_index_keys() -> BsonDocument {
    doc! { "author": 1, "published_year": 1 }
}

/// `{ author: <author>, published_year: { $gt: <year> } }`
pub fn author_published_after_filter(author: &str, year: i32) -> BsonDocument {
    doc! { "author": author, "published_year": { "$gt": year } }
}

/// The `explain` command wrapping a `find` on `collection`
pub fn explain_find_command(collection: &str, filter: BsonDocument) -> BsonDocument {
    doc! {
        "explain": { "find": collection, "filter": filter },
        "verbosity": EXPLAIN_VERBOSITY,
    }
}

async fn create_index(books: &Collection<Book>, keys: BsonDocument) -> Result<String> {
    debug!(%keys, "createIndex");
    let model = IndexModel::builder().keys(keys).build();
    let result = books.create_index(model).await?;
    info!(index = %result.index_name, "index ready");
    Ok(result.index_name)
}

/// Ascending index on `title`; returns the index name
pub async fn create_title_index(books: &Collection<Book>) -> Result<String> {
    create_index(books, title_index_keys()).await
}

/// Compound ascending index on `author`, `published_year`; returns the index name
pub async fn create_author_year_index(books: &Collection<Book>) -> Result<String> {
    create_index(books, author_year_index_keys()).await
}

/// Names of all indexes on the collection
pub async fn list_indexes(books: &Collection<Book>) -> Result<Vec<String>> {
    Ok(books.list_index_names().await?)
}

async fn explain_find(books: &Collection<Book>, filter: BsonDocument) -> Result<ExplainSummary> {
    let namespace = books.namespace();
    let command = explain_find_command(&namespace.coll, filter);
    debug!(%command, "explain");
    let raw = books
        .client()
        .database(&namespace.db)
        .run_command(command)
        .await?;
    Ok(ExplainSummary::from_explain(raw))
}

/// `find({ title }).explain("executionStats")`
pub async fn explain_find_by_title(
    books: &Collection<Book>,
    title: &str,
) -> Result<ExplainSummary> {
    explain_find(books, title_filter(title)).await
}

/// `find({ author, published_year: { $gt } }).explain("executionStats")`
pub async fn explain_find_by_author_after(
    books: &Collection<Book>,
    author: &str,
    year: i32,
) -> Result<ExplainSummary> {
    explain_find(books, author_published_after_filter(author, year)).await
}

/// The interesting parts of an `executionStats` explain
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExplainSummary {
    /// Stages of the winning plan, outermost first (e.g. `FETCH`, `IXSCAN`)
    pub winning_stages: Vec<String>,
    /// Index used by the winning plan, if any
    pub index_name: Option<String>,
    pub n_returned: Option<i64>,
    pub total_keys_examined: Option<i64>,
    pub total_docs_examined: Option<i64>,
    pub execution_time_millis: Option<i64>,
    #[serde(skip)]
    pub raw: BsonDocument,
}

impl ExplainSummary {
    /// Summarize an explain response. Missing sections leave fields empty.
    pub fn from_explain(raw: BsonDocument) -> Self {
        let mut winning_stages = Vec::new();
        let mut index_name = None;

        let winning_plan = raw
            .get_document("queryPlanner")
            .ok()
            .and_then(|planner| planner.get_document("winningPlan").ok());
        // Slot-based engine plans nest the classic tree under `queryPlan`
        let mut stage = winning_plan.map(|plan| plan.get_document("queryPlan").unwrap_or(plan));

        while let Some(node) = stage {
            if let Ok(name) = node.get_str("stage") {
                winning_stages.push(name.to_string());
            }
            if index_name.is_none() {
                index_name = node.get_str("indexName").ok().map(str::to_string);
            }
            stage = node.get_document("inputStage").ok();
        }

        let stats = raw.get_document("executionStats").ok();
        let stat = |key: &str| stats.and_then(|s| s.get(key)).and_then(number_as_i64);

        Self {
            n_returned: stat("nReturned"),
            total_keys_examined: stat("totalKeysExamined"),
            total_docs_examined: stat("totalDocsExamined"),
            execution_time_millis: stat("executionTimeMillis"),
            winning_stages,
            index_name,
            raw,
        }
    }

    /// True when the winning plan scanned the whole collection
    pub fn is_collection_scan(&self) -> bool {
        self.winning_stages.iter().any(|s| s == "COLLSCAN")
    }

    /// The full explain response as relaxed extended JSON
    pub fn raw_json(&self) -> serde_json::Value {
        Bson::Document(self.raw.clone()).into_relaxed_extjson()
    }
}
