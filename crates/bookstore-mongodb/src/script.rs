//! The full catalog run in order, one step per operation

use crate::advanced::{self, Page, SortOrder, DEFAULT_IN_STOCK_AFTER, DEFAULT_PAGE_SIZE};
use crate::aggregation;
use crate::book::Book;
use crate::crud::{
    self, DEFAULT_AUTHOR, DEFAULT_DELETE_TITLE, DEFAULT_GENRE, DEFAULT_PRICE_UPDATE,
    DEFAULT_PRICE_UPDATE_TITLE, DEFAULT_PUBLISHED_AFTER,
};
use crate::indexes::{self, DEFAULT_EXPLAIN_AFTER, DEFAULT_EXPLAIN_AUTHOR, DEFAULT_EXPLAIN_TITLE};
use bookstore_common::Result;
use mongodb::Collection;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::info;

/// Result of one catalog step
#[derive(Debug, Clone, Serialize)]
pub struct StepOutcome {
    pub task: u8,
    pub name: &'static str,
    /// Number of documents returned, or the count reported by a write
    pub count: u64,
    pub result: Value,
}

/// Every step of a catalog run
#[derive(Debug, Clone, Default, Serialize)]
pub struct ScriptReport {
    pub steps: Vec<StepOutcome>,
}

impl ScriptReport {
    fn record<T: Serialize>(
        &mut self,
        task: u8,
        name: &'static str,
        count: u64,
        value: &T,
    ) -> Result<()> {
        info!(task, step = name, count, "step complete");
        self.steps.push(StepOutcome {
            task,
            name,
            count,
            result: serde_json::to_value(value)?,
        });
        Ok(())
    }

    fn record_list<T: Serialize>(
        &mut self,
        task: u8,
        name: &'static str,
        rows: &[T],
    ) -> Result<()> {
        self.record(task, name, rows.len() as u64, &rows)
    }
}

/// Run every catalog operation with its default arguments, in script order.
///
/// Stops at the first failing step.
pub async fn run_all(books: &Collection<Book>) -> Result<ScriptReport> {
    let mut report = ScriptReport::default();

    // Task 2: basic CRUD
    let rows = crud::find_by_genre(books, DEFAULT_GENRE).await?;
    report.record_list(2, "find_by_genre", &rows)?;

    let rows = crud::find_published_after(books, DEFAULT_PUBLISHED_AFTER).await?;
    report.record_list(2, "find_published_after", &rows)?;

    let rows = crud::find_by_author(books, DEFAULT_AUTHOR).await?;
    report.record_list(2, "find_by_author", &rows)?;

    let updated =
        crud::update_price(books, DEFAULT_PRICE_UPDATE_TITLE, DEFAULT_PRICE_UPDATE).await?;
    report.record(
        2,
        "update_price",
        updated.modified,
        &json!({ "matched": updated.matched, "modified": updated.modified }),
    )?;

    let deleted = crud::delete_by_title(books, DEFAULT_DELETE_TITLE).await?;
    report.record(
        2,
        "delete_by_title",
        deleted.deleted,
        &json!({ "deleted": deleted.deleted }),
    )?;

    // Task 3: advanced queries
    let rows = advanced::find_in_stock_published_after(books, DEFAULT_IN_STOCK_AFTER).await?;
    report.record_list(3, "find_in_stock_published_after", &rows)?;

    let rows = advanced::list_summaries(books).await?;
    report.record_list(3, "list_summaries", &rows)?;

    let rows = advanced::sorted_by_price(books, SortOrder::Ascending).await?;
    report.record_list(3, "sorted_by_price_asc", &rows)?;

    let rows = advanced::sorted_by_price(books, SortOrder::Descending).await?;
    report.record_list(3, "sorted_by_price_desc", &rows)?;

    for (number, name) in [(0, "page_1"), (1, "page_2")] {
        let rows = advanced::page(books, Page::new(number, DEFAULT_PAGE_SIZE)?).await?;
        report.record_list(3, name, &rows)?;
    }

    // Task 4: aggregation
    let rows = aggregation::average_price_by_genre(books).await?;
    report.record_list(4, "average_price_by_genre", &rows)?;

    let top = aggregation::top_author(books).await?;
    report.record(4, "top_author", u64::from(top.is_some()), &top)?;

    let rows = aggregation::count_by_decade(books).await?;
    report.record_list(4, "count_by_decade", &rows)?;

    // Task 5: indexing
    let name = indexes::create_title_index(books).await?;
    report.record(5, "create_title_index", 1, &name)?;

    let name = indexes::create_author_year_index(books).await?;
    report.record(5, "create_author_year_index", 1, &name)?;

    let explain = indexes::explain_find_by_title(books, DEFAULT_EXPLAIN_TITLE).await?;
    report.record(
        5,
        "explain_find_by_title",
        explain.n_returned.unwrap_or(0) as u64,
        &explain,
    )?;

    let explain = indexes::explain_find_by_author_after(
        books,
        DEFAULT_EXPLAIN_AUTHOR,
        DEFAULT_EXPLAIN_AFTER,
    )
    .await?;
    report.record(
        5,
        "explain_find_by_author_after",
        explain.n_returned.unwrap_or(0) as u64,
        &explain,
    )?;

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::book::BookSummary;

    #[test]
    fn test_record_list_counts_rows() {
        let mut report = ScriptReport::default();
        let rows = vec![
            BookSummary {
                title: "Dune".into(),
                author: "Frank Herbert".into(),
                price: 9.99,
            },
            BookSummary {
                title: "Emma".into(),
                author: "Jane Austen".into(),
                price: 6.5,
            },
        ];
        report.record_list(3, "list_summaries", &rows).unwrap();

        let step = &report.steps[0];
        assert_eq!(step.task, 3);
        assert_eq!(step.name, "list_summaries");
        assert_eq!(step.count, 2);
        assert_eq!(step.result[1]["author"], "Jane Austen");
    }

    #[test]
    fn test_record_optional_value() {
        let mut report = ScriptReport::default();
        let top: Option<aggregation::AuthorBookCount> = None;
        report.record(4, "top_author", u64::from(top.is_some()), &top).unwrap();
        assert_eq!(report.steps[0].count, 0);
        assert!(report.steps[0].result.is_null());
    }
}
