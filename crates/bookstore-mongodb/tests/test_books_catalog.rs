//! Integration tests for the books catalog.
//!
//! These tests require a MongoDB server to be running.
//! Set MONGODB_URI (defaults to mongodb://localhost:27017) and run with --ignored.

use bookstore_mongodb::{
    advanced, aggregation, crud, indexes, seed, Book, BookstoreConfig, Connection, DecadeLabel,
    Page, SortOrder,
};
use mongodb::Collection;

/// Seeded collection with a unique name, dropped by the caller.
async fn seeded_books(
    prefix: &str,
) -> Result<(Connection, Collection<Book>), Box<dyn std::error::Error>> {
    let mut config = BookstoreConfig::from_env();
    config.database = "bookstore_test".to_string();
    config.collection = format!("{}_{}", prefix, bson::oid::ObjectId::new().to_hex());

    let conn = Connection::with_config(config).await?;
    conn.ping().await?;
    let books = conn.books();
    seed::seed(&books, true).await?;
    Ok((conn, books))
}

#[tokio::test]
#[ignore] // Only run with --ignored flag when a server is available
async fn test_basic_crud() -> Result<(), Box<dyn std::error::Error>> {
    let (_conn, books) = seeded_books("crud").await?;

    let fiction = crud::find_by_genre(&books, crud::DEFAULT_GENRE).await?;
    assert_eq!(fiction.len(), 4);
    assert!(fiction.iter().all(|b| b.genre == "Fiction"));

    let recent = crud::find_published_after(&books, crud::DEFAULT_PUBLISHED_AFTER).await?;
    assert!(recent.iter().all(|b| b.published_year > 1950));

    let orwell = crud::find_by_author(&books, crud::DEFAULT_AUTHOR).await?;
    assert_eq!(orwell.len(), 2);

    let updated = crud::update_price(
        &books,
        crud::DEFAULT_PRICE_UPDATE_TITLE,
        crud::DEFAULT_PRICE_UPDATE,
    )
    .await?;
    assert_eq!((updated.matched, updated.modified), (1, 1));
    let gatsby = crud::find_by_author(&books, "F. Scott Fitzgerald").await?;
    assert_eq!(gatsby[0].price, 10.49);

    // Setting the same price again matches but modifies nothing.
    let again = crud::update_price(
        &books,
        crud::DEFAULT_PRICE_UPDATE_TITLE,
        crud::DEFAULT_PRICE_UPDATE,
    )
    .await?;
    assert_eq!((again.matched, again.modified), (1, 0));

    let deleted = crud::delete_by_title(&books, crud::DEFAULT_DELETE_TITLE).await?;
    assert_eq!(deleted.deleted, 1);
    let deleted = crud::delete_by_title(&books, crud::DEFAULT_DELETE_TITLE).await?;
    assert_eq!(deleted.deleted, 0);

    books.drop().await?;
    Ok(())
}

#[tokio::test]
#[ignore]
async fn test_advanced_queries() -> Result<(), Box<dyn std::error::Error>> {
    let (_conn, books) = seeded_books("advanced").await?;
    let total = seed::sample_books().len();

    let in_stock =
        advanced::find_in_stock_published_after(&books, advanced::DEFAULT_IN_STOCK_AFTER).await?;
    assert_eq!(in_stock.len(), 2);
    assert!(in_stock.iter().all(|b| b.in_stock && b.published_year > 2010));

    let summaries = advanced::list_summaries(&books).await?;
    assert_eq!(summaries.len(), total);

    let ascending = advanced::sorted_by_price(&books, SortOrder::Ascending).await?;
    assert!(ascending.windows(2).all(|w| w[0].price <= w[1].price));
    let descending = advanced::sorted_by_price(&books, SortOrder::Descending).await?;
    assert!(descending.windows(2).all(|w| w[0].price >= w[1].price));

    let first = advanced::page(&books, Page::new(0, 5)?).await?;
    let second = advanced::page(&books, Page::new(1, 5)?).await?;
    let third = advanced::page(&books, Page::new(2, 5)?).await?;
    assert_eq!((first.len(), second.len(), third.len()), (5, 5, total - 10));
    assert!(first.iter().all(|a| second.iter().all(|b| a.id != b.id)));

    books.drop().await?;
    Ok(())
}

#[tokio::test]
#[ignore]
async fn test_aggregations() -> Result<(), Box<dyn std::error::Error>> {
    let (_conn, books) = seeded_books("aggregation").await?;

    let averages = aggregation::average_price_by_genre(&books).await?;
    assert!(averages
        .windows(2)
        .all(|w| w[0].average_price >= w[1].average_price));
    let dystopian = averages
        .iter()
        .find(|row| row.genre.as_deref() == Some("Dystopian"))
        .and_then(|row| row.average_price)
        .expect("dystopian average");
    assert!((dystopian - 11.245).abs() < 1e-9);

    let top = aggregation::top_author(&books).await?.expect("non-empty collection");
    assert_eq!(top.book_count, 2);

    let decades = aggregation::count_by_decade(&books).await?;
    let total: i64 = decades.iter().map(|d| d.count).sum();
    assert_eq!(total as usize, seed::sample_books().len());
    let recent = decades
        .iter()
        .find(|d| d.label == DecadeLabel::Other("1990+".to_string()))
        .map(|d| d.count);
    assert_eq!(recent, Some(2));

    books.drop().await?;
    Ok(())
}

#[tokio::test]
#[ignore]
async fn test_indexes_and_explain() -> Result<(), Box<dyn std::error::Error>> {
    let (_conn, books) = seeded_books("indexes").await?;

    let title = indexes::create_title_index(&books).await?;
    assert_eq!(title, "title_1");
    let compound = indexes::create_author_year_index(&books).await?;
    assert_eq!(compound, "author_1_published_year_1");

    let names = indexes::list_indexes(&books).await?;
    assert!(names.contains(&"title_1".to_string()));
    assert!(names.contains(&"author_1_published_year_1".to_string()));

    let by_title = indexes::explain_find_by_title(&books, indexes::DEFAULT_EXPLAIN_TITLE).await?;
    assert_eq!(by_title.n_returned, Some(1));
    assert_eq!(by_title.index_name.as_deref(), Some("title_1"));
    assert!(!by_title.is_collection_scan());

    let by_author = indexes::explain_find_by_author_after(
        &books,
        indexes::DEFAULT_EXPLAIN_AUTHOR,
        indexes::DEFAULT_EXPLAIN_AFTER,
    )
    .await?;
    assert_eq!(by_author.n_returned, Some(2));
    assert_eq!(by_author.index_name.as_deref(), Some("author_1_published_year_1"));

    books.drop().await?;
    Ok(())
}

#[tokio::test]
#[ignore]
async fn test_run_all() -> Result<(), Box<dyn std::error::Error>> {
    let (_conn, books) = seeded_books("script").await?;

    let report = bookstore_mongodb::run_all(&books).await?;
    let names: Vec<&str> = report.steps.iter().map(|s| s.name).collect();
    assert_eq!(names.first(), Some(&"find_by_genre"));
    assert_eq!(names.last(), Some(&"explain_find_by_author_after"));
    assert!(report.steps.windows(2).all(|w| w[0].task <= w[1].task));

    let deleted = report
        .steps
        .iter()
        .find(|s| s.name == "delete_by_title")
        .map(|s| s.count);
    assert_eq!(deleted, Some(1));

    books.drop().await?;
    Ok(())
}

#[tokio::test]
#[ignore]
async fn test_connect_db_returns_books_collection() -> Result<(), Box<dyn std::error::Error>> {
    let uri = std::env::var("MONGODB_URI")
        .unwrap_or_else(|_| "mongodb://localhost:27017".to_string());
    let books = bookstore_mongodb::connect_db(&uri).await?;
    assert_eq!(books.namespace().db, "bookstore");
    assert_eq!(books.name(), "books");
    Ok(())
}
