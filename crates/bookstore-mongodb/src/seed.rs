//! Sample data for the books collection

use crate::book::Book;
use crate::document::Document;
use bookstore_common::Result;
use mongodb::Collection;
use tracing::info;

/// Classic titles covering every genre, author and decade the catalog queries touch
pub fn sample_books() -> Vec<Book> {
    vec![
        Book::new("To Kill a Mockingbird", "Harper Lee", "Fiction", 1960, 12.99, true),
        Book::new("1984", "George Orwell", "Dystopian", 1949, 10.99, true),
        Book::new("The Great Gatsby", "F. Scott Fitzgerald", "Fiction", 1925, 9.99, true),
        Book::new("Brave New World", "Aldous Huxley", "Dystopian", 1932, 11.50, false),
        Book::new("The Hobbit", "J.R.R. Tolkien", "Fantasy", 1937, 14.99, true),
        Book::new("The Catcher in the Rye", "J.D. Salinger", "Fiction", 1951, 8.99, true),
        Book::new("Pride and Prejudice", "Jane Austen", "Romance", 1813, 7.99, true),
        Book::new("The Lord of the Rings", "J.R.R. Tolkien", "Fantasy", 1954, 19.99, true),
        Book::new("Animal Farm", "George Orwell", "Political Satire", 1945, 8.50, false),
        Book::new("The Alchemist", "Paulo Coelho", "Fiction", 1988, 10.99, true),
        Book::new("Moby Dick", "Herman Melville", "Adventure", 1851, 12.50, false),
        Book::new("Wuthering Heights", "Emily Brontë", "Gothic Fiction", 1847, 9.99, true),
        Book::new("The Night Circus", "Erin Morgenstern", "Fantasy", 2011, 13.99, true),
        Book::new("Project Hail Mary", "Andy Weir", "Science Fiction", 2021, 16.99, true),
    ]
}

/// Insert the sample books, optionally dropping the collection first.
///
/// Returns the number of inserted documents.
pub async fn seed(books: &Collection<Book>, drop_existing: bool) -> Result<usize> {
    if drop_existing {
        info!(collection = books.name(), "dropping collection");
        books.drop().await?;
    }

    let mut sample = sample_books();
    let ids = Book::insert_many(books, &mut sample).await?;
    info!(collection = books.name(), inserted = ids.len(), "seeded sample books");
    Ok(ids.len())
}
