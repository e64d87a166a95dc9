//! Compound filters, projection, sorting and pagination

use crate::book::{Book, BookSummary};
use bookstore_common::{BookstoreError, Result};
use bson::{doc, Document as BsonDocument};
use futures::TryStreamExt;
use mongodb::Collection;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

pub const DEFAULT_IN_STOCK_AFTER: i32 = 2010;

/// Books per page when none is given
pub const DEFAULT_PAGE_SIZE: u32 = 5;

/// Direction for the price sort
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

impl SortOrder {
    /// Sort direction as the server expects it
    pub fn direction(self) -> i32 {
        match self {
            SortOrder::Ascending => 1,
            SortOrder::Descending => -1,
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortOrder::Ascending => write!(f, "asc"),
            SortOrder::Descending => write!(f, "desc"),
        }
    }
}

impl FromStr for SortOrder {
    type Err = BookstoreError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "asc" | "ascending" | "1" => Ok(SortOrder::Ascending),
            "desc" | "descending" | "-1" => Ok(SortOrder::Descending),
            _ => Err(BookstoreError::Validation(format!(
                "Unknown sort order '{}'. Use 'asc' or 'desc'.",
                s
            ))),
        }
    }
}

/// A zero-based page of results
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    number: u32,
    size: u32,
}

impl Page {
    /// Page `number` (zero-based) holding `size` books.
    ///
    /// A size of zero is rejected: the server treats `limit(0)` as "no limit".
    /// The skip (`number * size`) must also fit the server's signed 64-bit skip.
    pub fn new(number: u32, size: u32) -> Result<Self> {
        if size == 0 {
            return Err(BookstoreError::Validation(
                "Page size must be greater than zero".to_string(),
            ));
        }
        if u64::from(number) * u64::from(size) > i64::MAX as u64 {
            return Err(BookstoreError::Validation(format!(
                "Page {} of size {} skips more documents than the server accepts",
                number, size
            )));
        }
        Ok(Self { number, size })
    }

    /// Documents to skip before this page
    pub fn skip(&self) -> u64 {
        u64::from(self.number) * u64::from(self.size)
    }

    /// Documents on this page
    pub fn limit(&self) -> i64 {
        i64::from(self.size)
    }
}

impl Default for Page {
    fn default() -> Self {
        Self {
            number: 0,
            size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// `{ $and: [ { in_stock: true }, { published_year: { $gt: <year> } } ] }`
pub fn in_stock_published_after_filter(year: i32) -> BsonDocument {
    doc! {
        "$and": [
            { "in_stock": true },
            { "published_year": { "$gt": year } }
        ]
    }
}

/// `{ title: 1, author: 1, price: 1, _id: 0 }`
pub fn summary_projection() -> BsonDocument {
    doc! { "title": 1, "author": 1, "price": 1, "_id": 0 }
}

/// `{ price: 1 }` or `{ price: -1 }`
pub fn price_sort(order: SortOrder) -> BsonDocument {
    doc! { "price": order.direction() }
}

/// In-stock books published strictly after `year`
pub async fn find_in_stock_published_after(
    books: &Collection<Book>,
    year: i32,
) -> Result<Vec<Book>> {
    let filter = in_stock_published_after_filter(year);
    debug!(%filter, "find");
    let cursor = books.find(filter).await?;
    Ok(cursor.try_collect().await?)
}

/// Every book projected to title, author and price
pub async fn list_summaries(books: &Collection<Book>) -> Result<Vec<BookSummary>> {
    let projection = summary_projection();
    debug!(%projection, "find with projection");
    let cursor = books
        .clone_with_type::<BookSummary>()
        .find(doc! {})
        .projection(projection)
        .await?;
    Ok(cursor.try_collect().await?)
}

/// Every book ordered by price
pub async fn sorted_by_price(books: &Collection<Book>, order: SortOrder) -> Result<Vec<Book>> {
    let sort = price_sort(order);
    debug!(%sort, "find sorted");
    let cursor = books.find(doc! {}).sort(sort).await?;
    Ok(cursor.try_collect().await?)
}

/// One page of books in natural order
pub async fn page(books: &Collection<Book>, page: Page) -> Result<Vec<Book>> {
    debug!(skip = page.skip(), limit = page.limit(), "find page");
    let cursor = books
        .find(doc! {})
        .skip(page.skip())
        .limit(page.limit())
        .await?;
    Ok(cursor.try_collect().await?)
}
