//! Rust models matching the database schema.
//!
//! Transient records (`NewPublisher`, `NewBook`) carry no identity. Saving
//! one through a unit of work returns the persistent record (`Publisher`,
//! `Book`) with the identity the database generated. Persistent records are
//! plain data and stay usable after their session closes.

use bookstore_common::{BookId, Error, PublisherId, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Maximum length of `books.title`.
pub const TITLE_MAX_LEN: usize = 255;

/// Maximum length of `books.author`.
pub const AUTHOR_MAX_LEN: usize = 100;

/// Maximum length of `publishers.name`.
pub const PUBLISHER_NAME_MAX_LEN: usize = 255;

/// Storage format of `books.publication_date`.
pub(crate) const DATE_FORMAT: &str = "%Y-%m-%d";

/// Publisher row.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Publisher {
    pub id: PublisherId,
    pub name: String,
}

impl Publisher {
    pub fn validate(&self) -> Result<()> {
        check_len("Publisher.name", &self.name, PUBLISHER_NAME_MAX_LEN)
    }
}

/// A publisher that has not been saved yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewPublisher {
    pub name: String,
}

impl NewPublisher {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn validate(&self) -> Result<()> {
        check_len("Publisher.name", &self.name, PUBLISHER_NAME_MAX_LEN)
    }
}

/// Book row.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Book {
    pub id: BookId,
    pub title: String,
    pub author: String,
    pub publication_date: Option<NaiveDate>,
    pub price: Option<f64>,
    /// Many-to-one reference; `None` when the book has no publisher.
    pub publisher_id: Option<PublisherId>,
}

impl Book {
    /// Point this book at a persisted publisher, or clear the reference.
    pub fn set_publisher(&mut self, publisher: Option<&Publisher>) {
        self.publisher_id = publisher.map(|p| p.id);
    }

    pub fn validate(&self) -> Result<()> {
        validate_book_fields(&self.title, &self.author, self.price)
    }
}

/// A book that has not been saved yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewBook {
    pub title: String,
    pub author: String,
    pub publication_date: Option<NaiveDate>,
    pub price: Option<f64>,
    pub publisher_id: Option<PublisherId>,
}

impl NewBook {
    pub fn new(title: impl Into<String>, author: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            author: author.into(),
            publication_date: None,
            price: None,
            publisher_id: None,
        }
    }

    #[must_use]
    pub fn published_on(mut self, date: NaiveDate) -> Self {
        self.publication_date = Some(date);
        self
    }

    #[must_use]
    pub fn priced_at(mut self, price: f64) -> Self {
        self.price = Some(price);
        self
    }

    #[must_use]
    pub fn published_by(mut self, publisher: &Publisher) -> Self {
        self.publisher_id = Some(publisher.id);
        self
    }

    pub fn validate(&self) -> Result<()> {
        validate_book_fields(&self.title, &self.author, self.price)
    }

    /// Attach the identity generated at insert time.
    pub(crate) fn into_persistent(self, id: BookId) -> Book {
        Book {
            id,
            title: self.title,
            author: self.author,
            publication_date: self.publication_date,
            price: self.price,
            publisher_id: self.publisher_id,
        }
    }
}

fn validate_book_fields(title: &str, author: &str, price: Option<f64>) -> Result<()> {
    check_len("Book.title", title, TITLE_MAX_LEN)?;
    check_len("Book.author", author, AUTHOR_MAX_LEN)?;
    if let Some(price) = price {
        if !price.is_finite() {
            return Err(Error::validation(format!(
                "Book.price must be a finite number, got {price}"
            )));
        }
    }
    Ok(())
}

fn check_len(field: &str, value: &str, max: usize) -> Result<()> {
    let len = value.chars().count();
    if len > max {
        return Err(Error::validation(format!(
            "{field} is {len} characters long, at most {max} allowed"
        )));
    }
    Ok(())
}

/// Decode a stored publication date.
pub(crate) fn parse_date(column: usize, raw: &str) -> rusqlite::Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, DATE_FORMAT).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(column, rusqlite::types::Type::Text, Box::new(e))
    })
}

/// Encode a publication date for storage.
pub(crate) fn format_date(date: Option<NaiveDate>) -> Option<String> {
    date.map(|d| d.format(DATE_FORMAT).to_string())
}
