//! Publisher database queries.

use bookstore_common::{Error, PublisherId, Result};
use rusqlite::{Connection, OptionalExtension};

use crate::entity::Entity;
use crate::error::from_rusqlite;
use crate::models::{NewPublisher, Publisher};

/// Insert a new publisher.
///
/// # Returns
///
/// * `Ok(Publisher)` - The persisted publisher with its generated identity
/// * `Err(Error::Conflict)` - If a publisher with the same name exists
/// * `Err(Error)` - If validation or another database operation fails
pub fn insert_publisher(conn: &Connection, publisher: &NewPublisher) -> Result<Publisher> {
    publisher.validate()?;

    conn.execute(
        "INSERT INTO publishers (name) VALUES (:name)",
        rusqlite::named_params! { ":name": publisher.name },
    )
    .map_err(from_rusqlite)?;

    Ok(Publisher {
        id: PublisherId::from(conn.last_insert_rowid()),
        name: publisher.name.clone(),
    })
}

/// Write a detached publisher back by identity.
///
/// # Returns
///
/// * `Ok(())` - If the update succeeded
/// * `Err(Error::NotFound)` - If the publisher no longer exists
pub fn update_publisher(conn: &Connection, publisher: &Publisher) -> Result<()> {
    publisher.validate()?;

    let rows_affected = conn
        .execute(
            "UPDATE publishers SET name = :name WHERE id = :id",
            rusqlite::named_params! {
                ":id": publisher.id.get(),
                ":name": publisher.name,
            },
        )
        .map_err(from_rusqlite)?;

    if rows_affected == 0 {
        return Err(Error::not_found(Publisher::NAME, publisher.id));
    }

    Ok(())
}

/// Find a publisher by its unique name.
pub fn find_publisher_by_name(conn: &Connection, name: &str) -> Result<Option<Publisher>> {
    conn.query_row(
        "SELECT id, name FROM publishers WHERE name = :name",
        rusqlite::named_params! { ":name": name },
        Publisher::from_row,
    )
    .optional()
    .map_err(from_rusqlite)
}
