//! Entity-to-table mappings.
//!
//! Each persistent record implements [`Entity`], declaring the table it maps
//! to, the columns it is read from, and the DDL that creates that table.
//! Generic operations (`get`, `list`, `delete`) are written once against the
//! trait.

use std::fmt;

use bookstore_common::{BookId, Error, PublisherId, Result};
use rusqlite::Row;

use crate::models::{parse_date, Book, Publisher};

/// A record type mapped to a database table with a stable identity.
pub trait Entity: Sized {
    /// Typed surrogate key.
    type Id: Copy + fmt::Display + From<i64> + Into<i64>;

    /// Entity name as written in the mapping configuration.
    const NAME: &'static str;

    const TABLE: &'static str;

    /// Select list, identity first, in the order `from_row` reads it.
    const COLUMNS: &'static str;

    /// Statement creating the table (and its indexes) if it does not exist.
    const CREATE_TABLE: &'static str;

    /// Entities whose tables this table references.
    const DEPENDS_ON: &'static [&'static str] = &[];

    fn id(&self) -> Self::Id;

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self>;
}

impl Entity for Publisher {
    type Id = PublisherId;

    const NAME: &'static str = "Publisher";
    const TABLE: &'static str = "publishers";
    const COLUMNS: &'static str = "id, name";
    const CREATE_TABLE: &'static str = r#"
CREATE TABLE IF NOT EXISTS publishers (
    id   INTEGER PRIMARY KEY AUTOINCREMENT,
    name VARCHAR(255) NOT NULL UNIQUE CHECK (length(name) <= 255)
);
"#;

    fn id(&self) -> PublisherId {
        self.id
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Publisher {
            id: PublisherId::from(row.get::<_, i64>(0)?),
            name: row.get(1)?,
        })
    }
}

impl Entity for Book {
    type Id = BookId;

    const NAME: &'static str = "Book";
    const TABLE: &'static str = "books";
    const COLUMNS: &'static str = "id, title, author, publication_date, price, publisher_id";
    const CREATE_TABLE: &'static str = r#"
CREATE TABLE IF NOT EXISTS books (
    id               INTEGER PRIMARY KEY AUTOINCREMENT,
    title            VARCHAR(255) NOT NULL CHECK (length(title) <= 255),
    author           VARCHAR(100) NOT NULL CHECK (length(author) <= 100),
    publication_date DATE,
    price            REAL,
    publisher_id     INTEGER REFERENCES publishers(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_books_publisher_id ON books(publisher_id);
"#;
    const DEPENDS_ON: &'static [&'static str] = &["Publisher"];

    fn id(&self) -> BookId {
        self.id
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        let publication_date = row
            .get::<_, Option<String>>(3)?
            .map(|raw| parse_date(3, &raw))
            .transpose()?;

        Ok(Book {
            id: BookId::from(row.get::<_, i64>(0)?),
            title: row.get(1)?,
            author: row.get(2)?,
            publication_date,
            price: row.get(4)?,
            publisher_id: row.get::<_, Option<i64>>(5)?.map(PublisherId::from),
        })
    }
}

/// Schema-level description of one mapped entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntityMapping {
    pub name: &'static str,
    pub table: &'static str,
    pub create_table: &'static str,
    pub depends_on: &'static [&'static str],
}

impl EntityMapping {
    pub fn of<E: Entity>() -> Self {
        Self {
            name: E::NAME,
            table: E::TABLE,
            create_table: E::CREATE_TABLE,
            depends_on: E::DEPENDS_ON,
        }
    }
}

/// Every entity this crate can map, referenced tables first.
pub fn known_mappings() -> [EntityMapping; 2] {
    [EntityMapping::of::<Publisher>(), EntityMapping::of::<Book>()]
}

/// Resolve configured entity names into mappings.
///
/// The result is in dependency order regardless of the configured order.
/// Unknown names and references to unmapped entities are schema errors.
pub fn resolve_mappings(names: &[String]) -> Result<Vec<EntityMapping>> {
    let known = known_mappings();

    for name in names {
        if !known.iter().any(|m| m.name == name) {
            return Err(Error::schema(format!("unknown entity '{name}'")));
        }
    }

    let mapped: Vec<EntityMapping> = known
        .into_iter()
        .filter(|m| names.iter().any(|n| n == m.name))
        .collect();

    for mapping in &mapped {
        for dependency in mapping.depends_on {
            if !mapped.iter().any(|m| m.name == *dependency) {
                return Err(Error::schema(format!(
                    "{} references unmapped entity {}",
                    mapping.name, dependency
                )));
            }
        }
    }

    Ok(mapped)
}
