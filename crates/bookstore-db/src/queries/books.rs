//! Book database queries.
//!
//! Inserts, full-row updates of detached books, and the publisher-scoped
//! reads: the lazy one-to-many load and the join filtering by publisher name.

use bookstore_common::{BookId, Error, PublisherId, Result};
use rusqlite::Connection;

use crate::entity::Entity;
use crate::error::from_rusqlite;
use crate::models::{format_date, Book, NewBook};

/// Insert a new book.
///
/// # Returns
///
/// * `Ok(Book)` - The persisted book with its generated identity
/// * `Err(Error::Validation)` - If a field exceeds its column bound
/// * `Err(Error::Constraint)` - If the publisher reference is dangling
pub fn insert_book(conn: &Connection, book: &NewBook) -> Result<Book> {
    book.validate()?;

    conn.execute(
        "INSERT INTO books (title, author, publication_date, price, publisher_id)
         VALUES (:title, :author, :publication_date, :price, :publisher_id)",
        rusqlite::named_params! {
            ":title": book.title,
            ":author": book.author,
            ":publication_date": format_date(book.publication_date),
            ":price": book.price,
            ":publisher_id": book.publisher_id.map(PublisherId::get),
        },
    )
    .map_err(from_rusqlite)?;

    let id = BookId::from(conn.last_insert_rowid());
    Ok(book.clone().into_persistent(id))
}

/// Write every mapped column of a detached book back by identity.
///
/// # Returns
///
/// * `Ok(())` - If the update succeeded
/// * `Err(Error::NotFound)` - If the book no longer exists
/// * `Err(Error)` - If validation or the database rejects the new values
pub fn update_book(conn: &Connection, book: &Book) -> Result<()> {
    book.validate()?;

    let rows_affected = conn
        .execute(
            "UPDATE books
             SET title = :title,
                 author = :author,
                 publication_date = :publication_date,
                 price = :price,
                 publisher_id = :publisher_id
             WHERE id = :id",
            rusqlite::named_params! {
                ":id": book.id.get(),
                ":title": book.title,
                ":author": book.author,
                ":publication_date": format_date(book.publication_date),
                ":price": book.price,
                ":publisher_id": book.publisher_id.map(PublisherId::get),
            },
        )
        .map_err(from_rusqlite)?;

    if rows_affected == 0 {
        return Err(Error::not_found(Book::NAME, book.id));
    }

    Ok(())
}

/// Load the books that reference a publisher, ordered by identity.
pub fn books_for_publisher(conn: &Connection, publisher_id: PublisherId) -> Result<Vec<Book>> {
    let mut stmt = conn
        .prepare(
            "SELECT id, title, author, publication_date, price, publisher_id
             FROM books WHERE publisher_id = :publisher_id ORDER BY id",
        )
        .map_err(from_rusqlite)?;

    let books = stmt
        .query_map(
            rusqlite::named_params! { ":publisher_id": publisher_id.get() },
            Book::from_row,
        )
        .map_err(from_rusqlite)?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(from_rusqlite)?;

    Ok(books)
}

/// Find books whose publisher has the given name, ordered by identity.
pub fn books_by_publisher_name(conn: &Connection, publisher_name: &str) -> Result<Vec<Book>> {
    let mut stmt = conn
        .prepare(
            "SELECT b.id, b.title, b.author, b.publication_date, b.price, b.publisher_id
             FROM books b
             JOIN publishers p ON p.id = b.publisher_id
             WHERE p.name = :publisher_name
             ORDER BY b.id",
        )
        .map_err(from_rusqlite)?;

    let books = stmt
        .query_map(
            rusqlite::named_params! { ":publisher_name": publisher_name },
            Book::from_row,
        )
        .map_err(from_rusqlite)?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(from_rusqlite)?;

    Ok(books)
}
