//! Schema generation.
//!
//! Table DDL lives on each [`Entity`](crate::entity::Entity) mapping. This
//! module applies the configured [`SchemaGeneration`] policy: it creates
//! tables in dependency order, drops them in reverse, and checks that mapped
//! tables exist.

use bookstore_common::{Error, Result, SchemaGeneration};
use rusqlite::Connection;

use crate::entity::EntityMapping;
use crate::error::from_rusqlite;

/// Apply the build-time half of a schema-generation policy.
///
/// # Arguments
///
/// * `conn` - Database connection
/// * `policy` - The configured policy
/// * `mappings` - Mapped entities in dependency order
pub fn apply_on_build(
    conn: &mut Connection,
    policy: SchemaGeneration,
    mappings: &[EntityMapping],
) -> Result<()> {
    match policy {
        SchemaGeneration::None => Ok(()),
        SchemaGeneration::Validate => validate_tables(conn, mappings),
        SchemaGeneration::Update => create_tables(conn, mappings).map(|_| ()),
        SchemaGeneration::Create | SchemaGeneration::CreateDrop => {
            drop_tables(conn, mappings)?;
            create_tables(conn, mappings).map(|_| ())
        }
    }
}

/// Create every mapped table that does not exist yet.
///
/// Runs in a single transaction. Returns the number of tables created.
pub fn create_tables(conn: &mut Connection, mappings: &[EntityMapping]) -> Result<usize> {
    let tx = conn.transaction().map_err(from_rusqlite)?;

    let mut created = 0;
    for mapping in mappings {
        if table_exists(&tx, mapping.table)? {
            continue;
        }
        tx.execute_batch(mapping.create_table).map_err(|e| {
            Error::schema(format!("failed to create table {}: {e}", mapping.table))
        })?;
        tracing::debug!("Created table {} for entity {}", mapping.table, mapping.name);
        created += 1;
    }

    tx.commit().map_err(from_rusqlite)?;
    Ok(created)
}

/// Drop every mapped table, dependents first.
pub fn drop_tables(conn: &mut Connection, mappings: &[EntityMapping]) -> Result<()> {
    let tx = conn.transaction().map_err(from_rusqlite)?;

    for mapping in mappings.iter().rev() {
        tx.execute_batch(&format!("DROP TABLE IF EXISTS {};", mapping.table))
            .map_err(|e| Error::schema(format!("failed to drop table {}: {e}", mapping.table)))?;
        tracing::debug!("Dropped table {}", mapping.table);
    }

    tx.commit().map_err(from_rusqlite)
}

/// Fail with [`Error::Schema`] unless every mapped table exists.
pub fn validate_tables(conn: &Connection, mappings: &[EntityMapping]) -> Result<()> {
    for mapping in mappings {
        if !table_exists(conn, mapping.table)? {
            return Err(Error::schema(format!(
                "missing table {} for entity {}",
                mapping.table, mapping.name
            )));
        }
    }
    Ok(())
}

/// Check whether a table is present in the schema.
pub fn table_exists(conn: &Connection, table: &str) -> Result<bool> {
    let count: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
            [table],
            |row| row.get(0),
        )
        .map_err(from_rusqlite)?;
    Ok(count > 0)
}

/// The DDL for the given mappings, in creation order.
pub fn ddl(mappings: &[EntityMapping]) -> String {
    mappings
        .iter()
        .map(|m| m.create_table.trim())
        .collect::<Vec<_>>()
        .join("\n\n")
}
