//! Bookstore-DB: Entity mappings, schema generation, sessions, and queries
//!
//! This crate provides the persistence layer for bookstore using SQLite
//! with rusqlite and r2d2 connection pooling.
//!
//! # Modules
//!
//! - `entity` - The `Entity` mapping trait and the mapped entity registry
//! - `models` - Transient and persistent Book / Publisher records
//! - `schema` - Table DDL and the schema-generation policy
//! - `pool` - Connection pool management
//! - `session` - Session factory, sessions, and transactions
//! - `global` - The process-wide session factory
//! - `queries` - SQL behind each unit-of-work operation
//!
//! # Example
//!
//! ```
//! use bookstore_common::Config;
//! use bookstore_db::models::{NewBook, NewPublisher};
//! use bookstore_db::session::{SessionFactory, UnitOfWork};
//!
//! let factory = SessionFactory::build(&Config::default()).unwrap();
//! let mut session = factory.open_session().unwrap();
//!
//! let book = session
//!     .in_transaction(|tx| {
//!         let publisher = tx.save_publisher(&NewPublisher::new("Tech Books Inc."))?;
//!         tx.save_book(&NewBook::new("Java for Beginners", "John Smith").published_by(&publisher))
//!     })
//!     .unwrap();
//!
//! assert_eq!(book.title, "Java for Beginners");
//! factory.close().unwrap();
//! ```

pub mod entity;
pub mod error;
pub mod global;
pub mod models;
pub mod pool;
pub mod queries;
pub mod schema;
pub mod session;
