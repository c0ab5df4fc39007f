//! Integration tests for the walkthrough steps.

use bookstore::demo::{self, Step, PUBLISHER_NAME, UPDATED_PRICE};
use bookstore_common::{BookId, Config};
use bookstore_db::models::{Book, Publisher};
use bookstore_db::session::{SessionFactory, UnitOfWork};

fn factory() -> SessionFactory {
    let mut config = Config::default();
    config.database.show_sql = false;
    SessionFactory::build(&config).expect("failed to build session factory")
}

// ---------------------------------------------------------------------------
// Individual steps
// ---------------------------------------------------------------------------

#[test]
fn create_persists_one_publisher_and_two_books() {
    let factory = factory();
    let catalog = demo::create_publisher_and_books(&factory).unwrap();

    let session = factory.open_session().unwrap();
    let publishers = session.list::<Publisher>().unwrap();
    assert_eq!(publishers.len(), 1);
    assert_eq!(publishers[0].name, PUBLISHER_NAME);

    let books = session.list::<Book>().unwrap();
    assert_eq!(books.len(), 2);
    assert!(books
        .iter()
        .all(|b| b.publisher_id == Some(catalog.publisher.id)));
    assert_eq!(books, catalog.books);
}

#[test]
fn read_returns_first_book() {
    let factory = factory();
    let catalog = demo::create_publisher_and_books(&factory).unwrap();

    let book = demo::find_book_by_id(&factory, catalog.books[0].id)
        .unwrap()
        .unwrap();
    assert_eq!(book.title, "Java for Beginners");
    assert_eq!(book.author, "John Smith");
}

#[test]
fn update_sets_price() {
    let factory = factory();
    let catalog = demo::create_publisher_and_books(&factory).unwrap();
    let id = catalog.books[0].id;

    let updated = demo::update_book_price(&factory, id, UPDATED_PRICE)
        .unwrap()
        .unwrap();
    assert_eq!(updated.price, Some(44.99));

    let stored = demo::find_book_by_id(&factory, id).unwrap().unwrap();
    assert_eq!(stored.price, Some(44.99));
}

#[test]
fn update_of_missing_book_commits_nothing() {
    let factory = factory();
    let result = demo::update_book_price(&factory, BookId::from(1), UPDATED_PRICE).unwrap();
    assert!(result.is_none());
}

#[test]
fn delete_removes_only_second_book() {
    let factory = factory();
    let catalog = demo::create_publisher_and_books(&factory).unwrap();
    let first = catalog.books[0].id;
    let second = catalog.books[1].id;

    assert!(demo::delete_book(&factory, second).unwrap());
    assert!(demo::find_book_by_id(&factory, second).unwrap().is_none());
    assert!(demo::find_book_by_id(&factory, first).unwrap().is_some());

    assert!(!demo::delete_book(&factory, second).unwrap());
}

#[test]
fn query_returns_books_still_with_publisher() {
    let factory = factory();
    let catalog = demo::create_publisher_and_books(&factory).unwrap();
    demo::delete_book(&factory, catalog.books[1].id).unwrap();

    let books = demo::query_books(&factory, PUBLISHER_NAME).unwrap();
    assert_eq!(books.len(), 1);
    assert_eq!(books[0].id, catalog.books[0].id);

    assert!(demo::query_books(&factory, "Other Press").unwrap().is_empty());
}

#[test]
fn second_create_rolls_back_on_duplicate_publisher() {
    let factory = factory();
    demo::create_publisher_and_books(&factory).unwrap();

    let err = demo::create_publisher_and_books(&factory).unwrap_err();
    assert!(err.is_constraint_violation());

    let session = factory.open_session().unwrap();
    assert_eq!(session.count::<Publisher>().unwrap(), 1);
    assert_eq!(session.count::<Book>().unwrap(), 2);
}

// ---------------------------------------------------------------------------
// Full walkthrough
// ---------------------------------------------------------------------------

#[test]
fn run_prints_each_step() {
    let factory = factory();
    let mut out = Vec::new();

    let report = demo::run(&factory, &mut out).unwrap();
    let output = String::from_utf8(out).unwrap();

    assert!(report.failed_steps.is_empty());
    assert_eq!(
        output,
        "Books and Publisher created successfully.\n\
         Found Book: Java for Beginners by John Smith\n\
         Book updated successfully.\n\
         Book deleted successfully.\n\
         Books from Tech Books Inc.:\n\
         Java for Beginners - $44.99\n"
    );
}

#[test]
fn run_reports_final_query() {
    let factory = factory();
    let report = demo::run(&factory, &mut std::io::sink()).unwrap();

    assert_eq!(report.books.len(), 1);
    assert_eq!(report.books[0].title, "Java for Beginners");
    assert_eq!(report.books[0].price, Some(UPDATED_PRICE));
}

#[test]
fn run_continues_after_failed_create() {
    let factory = factory();
    demo::create_publisher_and_books(&factory).unwrap();

    let mut out = Vec::new();
    let report = demo::run(&factory, &mut out).unwrap();
    let output = String::from_utf8(out).unwrap();

    // The walkthrough falls back to identities 1 and 2, which the earlier
    // create already persisted.
    assert_eq!(report.failed_steps, vec![Step::Create]);
    assert!(!output.contains("created successfully"));
    assert!(output.contains("Found Book: Java for Beginners by John Smith"));
    assert!(output.contains("Book deleted successfully."));
    assert_eq!(report.books.len(), 1);
}

#[test]
fn run_against_closed_factory_fails_every_step() {
    let factory = factory();
    factory.close().unwrap();

    let mut out = Vec::new();
    let report = demo::run(&factory, &mut out).unwrap();

    assert_eq!(
        report.failed_steps,
        vec![
            Step::Create,
            Step::Read,
            Step::Update,
            Step::Delete,
            Step::Query
        ]
    );
    assert!(out.is_empty());
    assert!(report.books.is_empty());
}
