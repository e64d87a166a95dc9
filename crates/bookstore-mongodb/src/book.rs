//! Book document shape
//!
//! The server does not enforce this shape; it is only how results are decoded.

use crate::document::Document;
use bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A book in the `books` collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub title: String,
    pub author: String,
    pub genre: String,
    pub published_year: i32,
    pub price: f64,
    pub in_stock: bool,
}

impl Book {
    pub fn new(
        title: impl Into<String>,
        author: impl Into<String>,
        genre: impl Into<String>,
        published_year: i32,
        price: f64,
        in_stock: bool,
    ) -> Self {
        Self {
            id: None,
            title: title.into(),
            author: author.into(),
            genre: genre.into(),
            published_year,
            price,
            in_stock,
        }
    }
}

impl Document for Book {
    const DEFAULT_COLLECTION: &'static str = "books";

    fn id(&self) -> Option<ObjectId> {
        self.id
    }

    fn set_id(&mut self, id: ObjectId) {
        self.id = Some(id);
    }
}

impl fmt::Display for Book {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} by {} ({}, {}) ${:.2}{}",
            self.title,
            self.author,
            self.genre,
            self.published_year,
            self.price,
            if self.in_stock { "" } else { " [out of stock]" }
        )
    }
}

/// Projection of a book onto `title`, `author` and `price`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookSummary {
    pub title: String,
    pub author: String,
    pub price: f64,
}

impl fmt::Display for BookSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} by {} ${:.2}", self.title, self.author, self.price)
    }
}
