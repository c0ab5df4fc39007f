//! The bookstore walkthrough.
//!
//! Five steps run in sequence against one session factory: create a
//! publisher with two books, read a book by identity, update its price,
//! delete the other book, and query books by publisher name. Every step
//! opens its own session, and the writing steps their own transaction.
//!
//! A failing step is logged and skipped; the walkthrough always carries on
//! with the next step.

use std::fmt;
use std::io::Write;

use bookstore_common::{BookId, Result};
use bookstore_db::models::{Book, NewBook, NewPublisher, Publisher};
use bookstore_db::session::{SessionFactory, UnitOfWork};
use chrono::NaiveDate;
use serde::Serialize;

/// Publisher created by the first step and queried by the last.
pub const PUBLISHER_NAME: &str = "Tech Books Inc.";

/// Price written by the update step.
pub const UPDATED_PRICE: f64 = 44.99;

/// One step of the walkthrough.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    Create,
    Read,
    Update,
    Delete,
    Query,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Step::Create => "create",
            Step::Read => "read",
            Step::Update => "update",
            Step::Delete => "delete",
            Step::Query => "query",
        };
        f.write_str(name)
    }
}

/// What the create step persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Catalog {
    pub publisher: Publisher,
    pub books: Vec<Book>,
}

/// Outcome of a full walkthrough.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DemoReport {
    /// Steps that failed, in the order they ran.
    pub failed_steps: Vec<Step>,
    /// Result of the final publisher-name query.
    pub books: Vec<Book>,
}

impl DemoReport {
    fn record<T>(&mut self, step: Step, result: Result<T>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::error!(step = %step, "Step failed: {}", e);
                self.failed_steps.push(step);
                None
            }
        }
    }
}

/// Insert the publisher and its two books in one transaction.
pub fn create_publisher_and_books(factory: &SessionFactory) -> Result<Catalog> {
    let mut session = factory.open_session()?;

    session.in_transaction(|tx| {
        let publisher = tx.save_publisher(&NewPublisher::new(PUBLISHER_NAME))?;

        let first = NewBook::new("Java for Beginners", "John Smith")
            .published_on(date(2022, 1, 15))
            .priced_at(39.99)
            .published_by(&publisher);
        let second = NewBook::new("Advanced Hibernate", "Emily Johnson")
            .published_on(date(2021, 6, 20))
            .priced_at(49.99)
            .published_by(&publisher);

        let books = vec![tx.save_book(&first)?, tx.save_book(&second)?];
        Ok(Catalog { publisher, books })
    })
}

/// Fetch a book by identity.
pub fn find_book_by_id(factory: &SessionFactory, id: BookId) -> Result<Option<Book>> {
    let session = factory.open_session()?;
    session.get::<Book>(id)
}

/// Fetch a book, change its price, and write it back.
///
/// Returns the updated book, or `None` if no book has this identity.
pub fn update_book_price(
    factory: &SessionFactory,
    id: BookId,
    price: f64,
) -> Result<Option<Book>> {
    let mut session = factory.open_session()?;

    session.in_transaction(|tx| {
        let Some(mut book) = tx.get::<Book>(id)? else {
            return Ok(None);
        };
        book.price = Some(price);
        tx.update_book(&book)?;
        Ok(Some(book))
    })
}

/// Fetch a book and delete it. Returns whether a book was removed.
pub fn delete_book(factory: &SessionFactory, id: BookId) -> Result<bool> {
    let mut session = factory.open_session()?;

    session.in_transaction(|tx| match tx.get::<Book>(id)? {
        Some(book) => tx.delete::<Book>(book.id),
        None => Ok(false),
    })
}

/// Books whose publisher has the given name.
pub fn query_books(factory: &SessionFactory, publisher_name: &str) -> Result<Vec<Book>> {
    let session = factory.open_session()?;
    session.books_by_publisher_name(publisher_name)
}

/// Run all five steps, writing progress lines to `out`.
///
/// The read and update steps target the first book the create step
/// persisted, the delete step the second. If the create step failed they
/// fall back to identities 1 and 2.
pub fn run(factory: &SessionFactory, out: &mut dyn Write) -> Result<DemoReport> {
    let mut report = DemoReport::default();

    let catalog = report.record(Step::Create, create_publisher_and_books(factory));
    if catalog.is_some() {
        writeln!(out, "Books and Publisher created successfully.")?;
    }

    let book_id = |index: usize, fallback: i64| {
        catalog
            .as_ref()
            .and_then(|c| c.books.get(index))
            .map(|b| b.id)
            .unwrap_or_else(|| BookId::from(fallback))
    };
    let first = book_id(0, 1);
    let second = book_id(1, 2);

    if let Some(Some(book)) = report.record(Step::Read, find_book_by_id(factory, first)) {
        writeln!(out, "Found Book: {} by {}", book.title, book.author)?;
    }

    if report
        .record(Step::Update, update_book_price(factory, first, UPDATED_PRICE))
        .is_some()
    {
        writeln!(out, "Book updated successfully.")?;
    }

    if report
        .record(Step::Delete, delete_book(factory, second))
        .is_some()
    {
        writeln!(out, "Book deleted successfully.")?;
    }

    if let Some(books) = report.record(Step::Query, query_books(factory, PUBLISHER_NAME)) {
        writeln!(out, "Books from {}:", PUBLISHER_NAME)?;
        for book in &books {
            writeln!(out, "{} - ${}", book.title, format_price(book.price))?;
        }
        report.books = books;
    }

    Ok(report)
}

fn format_price(price: Option<f64>) -> String {
    match price {
        Some(price) => format!("{price:?}"),
        None => "null".to_string(),
    }
}

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or_default()
}
