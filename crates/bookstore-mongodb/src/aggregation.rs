//! Aggregation pipelines over the books collection
//!
//! Pipelines run entirely on the server; this module builds the stages and
//! decodes the grouped output rows.

use crate::book::Book;
use bookstore_common::{BookstoreError, Result};
use bson::{doc, Bson, Document as BsonDocument};
use futures::TryStreamExt;
use mongodb::Collection;
use serde::Serialize;
use std::fmt;
use tracing::debug;

/// First decade boundary of the publication histogram
pub const DECADE_START: i32 = 1800;

/// Last decade boundary; later years land in the default bucket
pub const DECADE_END: i32 = 1990;

/// Bucket id for years outside `[DECADE_START, DECADE_END)`
pub const DECADE_DEFAULT_BUCKET: &str = "1990+";

/// Average price of the books in one genre
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenreAveragePrice {
    /// `None` for books stored without a genre
    pub genre: Option<String>,
    /// `None` when no book in the group has a numeric price
    pub average_price: Option<f64>,
}

/// Author with their number of books
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthorBookCount {
    pub author: Option<String>,
    pub book_count: i64,
}

/// Label of a `$bucket` output row
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum DecadeLabel {
    /// Inclusive lower bound of the decade
    Decade(i32),
    /// The default bucket
    Other(String),
}

impl fmt::Display for DecadeLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecadeLabel::Decade(year) => write!(f, "{}s", year),
            DecadeLabel::Other(label) => write!(f, "{}", label),
        }
    }
}

/// Number of books published in one decade
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DecadeBucket {
    pub label: DecadeLabel,
    pub count: i64,
}

/// `[1800, 1810, ..., 1990]`
pub fn decade_boundaries() -> Vec<i32> {
    (DECADE_START..=DECADE_END).step_by(10).collect()
}

/// Group by genre, average the price, highest average first
pub fn average_price_by_genre_pipeline() -> Vec<BsonDocument> {
    vec![
        doc! {
            "$group": {
                "_id": "$genre",
                "averagePrice": { "$avg": "$price" }
            }
        },
        doc! { "$sort": { "averagePrice": -1 } },
    ]
}

/// Group by author, count, keep the largest group
pub fn top_author_pipeline() -> Vec<BsonDocument> {
    vec![
        doc! {
            "$group": {
                "_id": "$author",
                "bookCount": { "$sum": 1 }
            }
        },
        doc! { "$sort": { "bookCount": -1 } },
        doc! { "$limit": 1 },
    ]
}

/// Bucket publication years by decade
pub fn count_by_decade_pipeline() -> Vec<BsonDocument> {
    vec![doc! {
        "$bucket": {
            "groupBy": "$published_year",
            "boundaries": decade_boundaries(),
            "default": DECADE_DEFAULT_BUCKET,
            "output": {
                "count": { "$sum": 1 }
            }
        }
    }]
}

fn optional_string(doc: &BsonDocument, key: &str) -> Result<Option<String>> {
    match doc.get(key) {
        None | Some(Bson::Null) => Ok(None),
        Some(Bson::String(s)) => Ok(Some(s.clone())),
        Some(other) => Err(BookstoreError::Deserialization(format!(
            "Expected string or null for '{}', got {:?}",
            key,
            other.element_type()
        ))),
    }
}

/// Read an integer the server may have produced as int32, int64 or double
pub(crate) fn number_as_i64(value: &Bson) -> Option<i64> {
    match value {
        Bson::Int32(n) => Some(i64::from(*n)),
        Bson::Int64(n) => Some(*n),
        Bson::Double(n) if n.fract() == 0.0 => Some(*n as i64),
        _ => None,
    }
}

fn required_count(doc: &BsonDocument, key: &str) -> Result<i64> {
    doc.get(key).and_then(number_as_i64).ok_or_else(|| {
        BookstoreError::Deserialization(format!("Missing or non-integer '{}' in {}", key, doc))
    })
}

impl TryFrom<BsonDocument> for GenreAveragePrice {
    type Error = BookstoreError;

    fn try_from(doc: BsonDocument) -> Result<Self> {
        let average_price = match doc.get("averagePrice") {
            None | Some(Bson::Null) => None,
            Some(Bson::Double(v)) => Some(*v),
            Some(Bson::Int32(v)) => Some(f64::from(*v)),
            Some(Bson::Int64(v)) => Some(*v as f64),
            Some(other) => {
                return Err(BookstoreError::Deserialization(format!(
                    "Expected number for 'averagePrice', got {:?}",
                    other.element_type()
                )))
            }
        };
        Ok(Self {
            genre: optional_string(&doc, "_id")?,
            average_price,
        })
    }
}

impl TryFrom<BsonDocument> for AuthorBookCount {
    type Error = BookstoreError;

    fn try_from(doc: BsonDocument) -> Result<Self> {
        Ok(Self {
            author: optional_string(&doc, "_id")?,
            book_count: required_count(&doc, "bookCount")?,
        })
    }
}

impl TryFrom<BsonDocument> for DecadeBucket {
    type Error = BookstoreError;

    fn try_from(doc: BsonDocument) -> Result<Self> {
        let label = match doc.get("_id") {
            Some(Bson::String(s)) => DecadeLabel::Other(s.clone()),
            Some(value) => number_as_i64(value)
                .and_then(|n| i32::try_from(n).ok())
                .map(DecadeLabel::Decade)
                .ok_or_else(|| {
                    BookstoreError::Deserialization(format!("Unexpected bucket id {}", value))
                })?,
            None => {
                return Err(BookstoreError::Deserialization(
                    "Bucket row without _id".to_string(),
                ))
            }
        };
        Ok(Self {
            label,
            count: required_count(&doc, "count")?,
        })
    }
}

async fn aggregate<T>(books: &Collection<Book>, pipeline: Vec<BsonDocument>) -> Result<Vec<T>>
where
    T: TryFrom<BsonDocument, Error = BookstoreError>,
{
    debug!(stages = pipeline.len(), pipeline = ?pipeline, "aggregate");
    let cursor = books.aggregate(pipeline).await?;
    let rows: Vec<BsonDocument> = cursor.try_collect().await?;
    rows.into_iter().map(T::try_from).collect()
}

/// Average price per genre, most expensive genre first
pub async fn average_price_by_genre(books: &Collection<Book>) -> Result<Vec<GenreAveragePrice>> {
    aggregate(books, average_price_by_genre_pipeline()).await
}

/// The author with the most books, `None` for an empty collection
pub async fn top_author(books: &Collection<Book>) -> Result<Option<AuthorBookCount>> {
    let rows: Vec<AuthorBookCount> = aggregate(books, top_author_pipeline()).await?;
    Ok(rows.into_iter().next())
}

/// Book counts per publication decade
pub async fn count_by_decade(books: &Collection<Book>) -> Result<Vec<DecadeBucket>> {
    aggregate(books, count_by_decade_pipeline()).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_average_price_pipeline() {
        assert_eq!(
            average_price_by_genre_pipeline(),
            vec![
                doc! { "$group": { "_id": "$genre", "averagePrice": { "$avg": "$price" } } },
                doc! { "$sort": { "averagePrice": -1 } },
            ]
        );
    }

    #[test]
    fn test_top_author_pipeline() {
        assert_eq!(
            top_author_pipeline(),
            vec![
                doc! { "$group": { "_id": "$author", "bookCount": { "$sum": 1 } } },
                doc! { "$sort": { "bookCount": -1 } },
                doc! { "$limit": 1 },
            ]
        );
    }

    #[test]
    fn test_decade_boundaries() {
        let boundaries = decade_boundaries();
        assert_eq!(boundaries.len(), 20);
        assert_eq!(boundaries.first(), Some(&1800));
        assert_eq!(boundaries.last(), Some(&1990));
        assert!(boundaries.windows(2).all(|w| w[1] - w[0] == 10));
    }

    #[test]
    fn test_decade_pipeline() {
        let pipeline = count_by_decade_pipeline();
        let bucket = pipeline[0].get_document("$bucket").unwrap();
        assert_eq!(bucket.get_str("groupBy").unwrap(), "$published_year");
        assert_eq!(bucket.get_str("default").unwrap(), "1990+");
        assert_eq!(bucket.get_array("boundaries").unwrap().len(), 20);
        assert_eq!(
            bucket.get_document("output").unwrap(),
            &doc! { "count": { "$sum": 1 } }
        );
    }

    #[test]
    fn test_decode_genre_average() {
        let row =
            GenreAveragePrice::try_from(doc! { "_id": "Fiction", "averagePrice": 11.25 }).unwrap();
        assert_eq!(row.genre.as_deref(), Some("Fiction"));
        assert_eq!(row.average_price, Some(11.25));

        let missing =
            GenreAveragePrice::try_from(doc! { "_id": Bson::Null, "averagePrice": Bson::Null })
                .unwrap();
        assert_eq!(missing.genre, None);
        assert_eq!(missing.average_price, None);
    }

    #[test]
    fn test_decode_genre_average_rejects_string_price() {
        let result =
            GenreAveragePrice::try_from(doc! { "_id": "Fiction", "averagePrice": "cheap" });
        assert!(matches!(result, Err(BookstoreError::Deserialization(_))));
    }

    #[test]
    fn test_decode_author_count() {
        let row =
            AuthorBookCount::try_from(doc! { "_id": "George Orwell", "bookCount": 2 }).unwrap();
        assert_eq!(row.author.as_deref(), Some("George Orwell"));
        assert_eq!(row.book_count, 2);

        let wide = AuthorBookCount::try_from(doc! { "_id": "A", "bookCount": 3_i64 }).unwrap();
        assert_eq!(wide.book_count, 3);

        assert!(AuthorBookCount::try_from(doc! { "_id": "A" }).is_err());
    }

    #[test]
    fn test_decode_decade_bucket() {
        let decade = DecadeBucket::try_from(doc! { "_id": 1920, "count": 3 }).unwrap();
        assert_eq!(decade.label, DecadeLabel::Decade(1920));
        assert_eq!(decade.label.to_string(), "1920s");
        assert_eq!(decade.count, 3);

        let default = DecadeBucket::try_from(doc! { "_id": "1990+", "count": 4 }).unwrap();
        assert_eq!(default.label, DecadeLabel::Other("1990+".to_string()));
        assert_eq!(default.label.to_string(), "1990+");

        assert!(DecadeBucket::try_from(doc! { "count": 1 }).is_err());
        assert!(DecadeBucket::try_from(doc! { "_id": 1.5, "count": 1 }).is_err());
    }

    #[test]
    fn test_number_as_i64() {
        assert_eq!(number_as_i64(&Bson::Int32(7)), Some(7));
        assert_eq!(number_as_i64(&Bson::Int64(7)), Some(7));
        assert_eq!(number_as_i64(&Bson::Double(7.0)), Some(7));
        assert_eq!(number_as_i64(&Bson::Double(7.5)), None);
        assert_eq!(number_as_i64(&Bson::String("7".into())), None);
    }
}
