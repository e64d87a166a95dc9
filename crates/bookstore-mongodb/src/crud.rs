//! Basic CRUD against the books collection
//!
//! Each operation is a single driver call. The filter and update documents
//! are built by plain functions so they can be checked without a server.

use crate::book::Book;
use crate::document::{DeleteOutcome, Document, UpdateOutcome};
use bookstore_common::Result;
use bson::{doc, Document as BsonDocument};
use mongodb::Collection;

pub const DEFAULT_GENRE: &str = "Fiction";
pub const DEFAULT_PUBLISHED_AFTER: i32 = 1950;
pub const DEFAULT_AUTHOR: &str = "George Orwell";
pub const DEFAULT_PRICE_UPDATE_TITLE: &str = "The Great Gatsby";
pub const DEFAULT_PRICE_UPDATE: f64 = 10.49;
pub const DEFAULT_DELETE_TITLE: &str = "Animal Farm";

/// `{ genre: <genre> }`
pub fn genre_filter(genre: &str) -> BsonDocument {
    doc! { "genre": genre }
}

/// `{ published_year: { $gt: <year> } }`
pub fn published_after_filter(year: i32) -> BsonDocument {
    doc! { "published_year": { "$gt": year } }
}

/// `{ author: <author> }`
pub fn author_filter(author: &str) -> BsonDocument {
    doc! { "author": author }
}

/// `{ title: <title> }`
pub fn title_filter(title: &str) -> BsonDocument {
    doc! { "title": title }
}

/// `{ $set: { price: <price> } }`
pub fn set_price_update(price: f64) -> BsonDocument {
    doc! { "$set": { "price": price } }
}

/// Books in a given genre
pub async fn find_by_genre(books: &Collection<Book>, genre: &str) -> Result<Vec<Book>> {
    Book::find(books, genre_filter(genre)).await
}

/// Books published strictly after `year`
pub async fn find_published_after(books: &Collection<Book>, year: i32) -> Result<Vec<Book>> {
    Book::find(books, published_after_filter(year)).await
}

/// Books written by `author`
pub async fn find_by_author(books: &Collection<Book>, author: &str) -> Result<Vec<Book>> {
    Book::find(books, author_filter(author)).await
}

/// Set the price of the first book titled `title`
pub async fn update_price(
    books: &Collection<Book>,
    title: &str,
    price: f64,
) -> Result<UpdateOutcome> {
    Book::update_one(books, title_filter(title), set_price_update(price)).await
}

/// Delete the first book titled `title`
pub async fn delete_by_title(books: &Collection<Book>, title: &str) -> Result<DeleteOutcome> {
    Book::delete_one(books, title_filter(title)).await
}
