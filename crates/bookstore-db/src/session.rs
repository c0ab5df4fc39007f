//! Session factory, sessions, and transactions.
//!
//! A [`SessionFactory`] owns the connection pool and applies the schema
//! policy. Each [`Session`] borrows one pooled connection for its scope and
//! returns it when dropped. A [`Transaction`] rolls back unless committed.
//! Both sessions and transactions are [`UnitOfWork`]s, so the same
//! operations run in autocommit mode or inside a transaction.

use bookstore_common::{Config, Error, PublisherId, Result, SchemaGeneration};
use parking_lot::RwLock;
use rusqlite::Connection;

use crate::entity::{resolve_mappings, Entity, EntityMapping};
use crate::error::from_rusqlite;
use crate::models::{Book, NewBook, NewPublisher, Publisher};
use crate::pool::{get_conn, init_pool, DbPool, PooledConnection};
use crate::queries::{self, books, publishers};
use crate::schema;

/// Process-wide source of sessions for one configured database.
pub struct SessionFactory {
    pool: RwLock<Option<DbPool>>,
    mappings: Vec<EntityMapping>,
    schema_generation: SchemaGeneration,
}

impl SessionFactory {
    /// Build a factory: resolve mappings, open the pool, apply the schema policy.
    pub fn build(config: &Config) -> Result<Self> {
        config.validate()?;
        let mappings = resolve_mappings(&config.mapping.entities)?;
        let schema_generation = config.database.schema_generation;

        let pool = init_pool(&config.database)?;
        {
            let mut conn = get_conn(&pool)?;
            schema::apply_on_build(&mut conn, schema_generation, &mappings)?;
        }

        tracing::info!(
            entities = ?mappings.iter().map(|m| m.name).collect::<Vec<_>>(),
            schema_generation = ?schema_generation,
            "Session factory built"
        );

        Ok(Self {
            pool: RwLock::new(Some(pool)),
            mappings,
            schema_generation,
        })
    }

    /// Open a new session holding one pooled connection.
    pub fn open_session(&self) -> Result<Session> {
        let guard = self.pool.read();
        let pool = guard.as_ref().ok_or(Error::Closed)?;
        let conn = get_conn(pool)?;
        Ok(Session { conn })
    }

    /// The mapped entities, referenced tables first.
    pub fn mappings(&self) -> &[EntityMapping] {
        &self.mappings
    }

    pub fn is_closed(&self) -> bool {
        self.pool.read().is_none()
    }

    /// Close the factory and release the pool.
    ///
    /// Under `create-drop` the mapped tables are dropped first. If that
    /// fails the factory stays open so `close` can be retried. Closing an
    /// already closed factory is a no-op.
    pub fn close(&self) -> Result<()> {
        let mut guard = self.pool.write();
        let Some(pool) = guard.as_ref() else {
            return Ok(());
        };

        if self.schema_generation == SchemaGeneration::CreateDrop {
            let mut conn = get_conn(pool)?;
            schema::drop_tables(&mut conn, &self.mappings)?;
        }

        *guard = None;
        tracing::info!("Session factory closed");
        Ok(())
    }
}

/// A scoped unit of work bound to one pooled connection.
///
/// Operations run in autocommit mode unless issued through a
/// [`Transaction`]. The connection goes back to the pool on drop.
pub struct Session {
    conn: PooledConnection,
}

impl Session {
    /// Begin a transaction. Dropping it without `commit` rolls back.
    pub fn begin_transaction(&mut self) -> Result<Transaction<'_>> {
        let tx = self.conn.transaction().map_err(from_rusqlite)?;
        Ok(Transaction { tx })
    }

    /// Run `f` inside a transaction.
    ///
    /// Commits when `f` succeeds. When it fails the transaction is rolled
    /// back and the original error is returned.
    pub fn in_transaction<T, F>(&mut self, f: F) -> Result<T>
    where
        F: FnOnce(&Transaction<'_>) -> Result<T>,
    {
        let tx = self.begin_transaction()?;
        match f(&tx) {
            Ok(value) => {
                tx.commit()?;
                Ok(value)
            }
            Err(e) => {
                if let Err(rollback_err) = tx.rollback() {
                    tracing::warn!("Rollback failed after error '{}': {}", e, rollback_err);
                }
                Err(e)
            }
        }
    }
}

/// An open transaction within a [`Session`].
pub struct Transaction<'s> {
    tx: rusqlite::Transaction<'s>,
}

impl Transaction<'_> {
    pub fn commit(self) -> Result<()> {
        self.tx.commit().map_err(from_rusqlite)
    }

    pub fn rollback(self) -> Result<()> {
        tracing::debug!("Rolling back transaction");
        self.tx.rollback().map_err(from_rusqlite)
    }
}

/// Persistence operations shared by sessions and transactions.
pub trait UnitOfWork {
    fn connection(&self) -> &Connection;

    /// Persist a transient publisher, returning it with its identity.
    fn save_publisher(&self, publisher: &NewPublisher) -> Result<Publisher> {
        publishers::insert_publisher(self.connection(), publisher)
    }

    /// Persist a transient book, returning it with its identity.
    fn save_book(&self, book: &NewBook) -> Result<Book> {
        books::insert_book(self.connection(), book)
    }

    fn get<E: Entity>(&self, id: E::Id) -> Result<Option<E>> {
        queries::get_by_id(self.connection(), id)
    }

    fn list<E: Entity>(&self) -> Result<Vec<E>> {
        queries::list_all(self.connection())
    }

    fn count<E: Entity>(&self) -> Result<i64> {
        queries::count::<E>(self.connection())
    }

    /// Write a detached book back.
    fn update_book(&self, book: &Book) -> Result<()> {
        books::update_book(self.connection(), book)
    }

    /// Write a detached publisher back.
    fn update_publisher(&self, publisher: &Publisher) -> Result<()> {
        publishers::update_publisher(self.connection(), publisher)
    }

    /// Remove an entity; deleting a publisher removes its books too.
    fn delete<E: Entity>(&self, id: E::Id) -> Result<bool> {
        queries::delete_by_id::<E>(self.connection(), id)
    }

    /// Lazily load the books of a publisher.
    fn books_of(&self, publisher_id: PublisherId) -> Result<Vec<Book>> {
        books::books_for_publisher(self.connection(), publisher_id)
    }

    /// Resolve a book's many-to-one publisher reference.
    fn publisher_of(&self, book: &Book) -> Result<Option<Publisher>> {
        match book.publisher_id {
            Some(id) => self.get::<Publisher>(id),
            None => Ok(None),
        }
    }

    fn find_publisher_by_name(&self, name: &str) -> Result<Option<Publisher>> {
        publishers::find_publisher_by_name(self.connection(), name)
    }

    fn books_by_publisher_name(&self, publisher_name: &str) -> Result<Vec<Book>> {
        books::books_by_publisher_name(self.connection(), publisher_name)
    }
}

impl UnitOfWork for Session {
    fn connection(&self) -> &Connection {
        &self.conn
    }
}

impl UnitOfWork for Transaction<'_> {
    fn connection(&self) -> &Connection {
        &self.tx
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bookstore_common::BookId;

    fn config() -> Config {
        let mut config = Config::default();
        config.database.show_sql = false;
        config
    }

    fn factory() -> SessionFactory {
        SessionFactory::build(&config()).unwrap()
    }

    #[test]
    fn committed_writes_are_visible_to_later_sessions() {
        let factory = factory();

        let mut session = factory.open_session().unwrap();
        let book = session
            .in_transaction(|tx| {
                let publisher = tx.save_publisher(&NewPublisher::new("Tech Books Inc."))?;
                tx.save_book(&NewBook::new("Java for Beginners", "John Smith").published_by(&publisher))
            })
            .unwrap();
        drop(session);

        let session = factory.open_session().unwrap();
        let found = session.get::<Book>(book.id).unwrap().unwrap();
        assert_eq!(found.title, "Java for Beginners");
        assert_eq!(
            session.publisher_of(&found).unwrap().unwrap().name,
            "Tech Books Inc."
        );
    }

    #[test]
    fn failed_transaction_rolls_back_everything() {
        let factory = factory();

        let mut session = factory.open_session().unwrap();
        let result = session.in_transaction(|tx| {
            tx.save_publisher(&NewPublisher::new("Tech Books Inc."))?;
            tx.save_publisher(&NewPublisher::new("Tech Books Inc."))
        });
        assert!(matches!(result, Err(Error::Conflict(_))));

        assert_eq!(session.count::<Publisher>().unwrap(), 0);
    }

    #[test]
    fn dropped_transaction_rolls_back() {
        let factory = factory();
        let mut session = factory.open_session().unwrap();

        {
            let tx = session.begin_transaction().unwrap();
            tx.save_publisher(&NewPublisher::new("Uncommitted")).unwrap();
        }

        assert!(session.find_publisher_by_name("Uncommitted").unwrap().is_none());
    }

    #[test]
    fn explicit_rollback() {
        let factory = factory();
        let mut session = factory.open_session().unwrap();

        let tx = session.begin_transaction().unwrap();
        tx.save_book(&NewBook::new("t", "a")).unwrap();
        tx.rollback().unwrap();

        assert!(session.list::<Book>().unwrap().is_empty());
    }

    #[test]
    fn autocommit_session_operations() {
        let factory = factory();
        let session = factory.open_session().unwrap();

        let publisher = session.save_publisher(&NewPublisher::new("Tech Books Inc.")).unwrap();
        let book = session
            .save_book(&NewBook::new("t", "a").published_by(&publisher))
            .unwrap();

        assert_eq!(session.books_of(publisher.id).unwrap(), vec![book.clone()]);
        assert!(session.delete::<Book>(book.id).unwrap());
        assert!(session.books_of(publisher.id).unwrap().is_empty());
    }

    #[test]
    fn detached_book_can_be_updated_in_new_session() {
        let factory = factory();

        let mut book = {
            let session = factory.open_session().unwrap();
            session.save_book(&NewBook::new("t", "a").priced_at(39.99)).unwrap()
        };

        book.price = Some(44.99);
        let mut session = factory.open_session().unwrap();
        session.in_transaction(|tx| tx.update_book(&book)).unwrap();

        let stored = session.get::<Book>(book.id).unwrap().unwrap();
        assert_eq!(stored.price, Some(44.99));
    }

    #[test]
    fn detached_publisher_can_be_renamed() {
        let factory = factory();

        let mut publisher = {
            let session = factory.open_session().unwrap();
            session.save_publisher(&NewPublisher::new("Tech Books")).unwrap()
        };

        publisher.name = "Tech Books Inc.".to_string();
        let mut session = factory.open_session().unwrap();
        session
            .in_transaction(|tx| tx.update_publisher(&publisher))
            .unwrap();

        assert_eq!(session.count::<Publisher>().unwrap(), 1);
        assert!(session.find_publisher_by_name("Tech Books").unwrap().is_none());
        assert_eq!(
            session.find_publisher_by_name("Tech Books Inc.").unwrap(),
            Some(publisher)
        );
    }

    #[test]
    fn deleting_publisher_cascades() {
        let factory = factory();
        let mut session = factory.open_session().unwrap();

        let publisher = session
            .in_transaction(|tx| {
                let publisher = tx.save_publisher(&NewPublisher::new("Tech Books Inc."))?;
                tx.save_book(&NewBook::new("one", "a").published_by(&publisher))?;
                tx.save_book(&NewBook::new("two", "a").published_by(&publisher))?;
                Ok(publisher)
            })
            .unwrap();

        session
            .in_transaction(|tx| tx.delete::<Publisher>(publisher.id))
            .unwrap();

        assert_eq!(session.count::<Book>().unwrap(), 0);
    }

    #[test]
    fn missing_book_is_none() {
        let factory = factory();
        let session = factory.open_session().unwrap();
        assert!(session.get::<Book>(BookId::from(1)).unwrap().is_none());
    }

    #[test]
    fn closed_factory_refuses_sessions() {
        let factory = factory();
        assert!(!factory.is_closed());

        factory.close().unwrap();
        assert!(factory.is_closed());
        assert!(matches!(factory.open_session(), Err(Error::Closed)));

        factory.close().unwrap();
    }

    #[test]
    fn create_drop_drops_tables_on_close() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("books.db");
        let mut config = config();
        config.database.url = format!("sqlite:{}", path.display());

        let factory = SessionFactory::build(&config).unwrap();
        factory
            .open_session()
            .unwrap()
            .save_publisher(&NewPublisher::new("Tech Books Inc."))
            .unwrap();
        factory.close().unwrap();

        let conn = Connection::open(&path).unwrap();
        assert!(!schema::table_exists(&conn, "publishers").unwrap());
        assert!(!schema::table_exists(&conn, "books").unwrap());
    }

    #[test]
    fn close_stays_open_until_tables_are_dropped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("books.db");
        let mut config = config();
        config.database.url = format!("sqlite:{}", path.display());
        config.database.pool_size = 1;
        config.database.connection_timeout_secs = 1;

        let factory = SessionFactory::build(&config).unwrap();
        let held = factory.open_session().unwrap();

        assert!(factory.close().is_err());
        assert!(!factory.is_closed());

        drop(held);
        factory.close().unwrap();
        assert!(factory.is_closed());

        let conn = Connection::open(&path).unwrap();
        assert!(!schema::table_exists(&conn, "publishers").unwrap());
        assert!(!schema::table_exists(&conn, "books").unwrap());
    }

    #[test]
    fn update_policy_keeps_data_between_factories() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config();
        config.database.url = format!("sqlite:{}", dir.path().join("books.db").display());
        config.database.schema_generation = SchemaGeneration::Update;

        let first = SessionFactory::build(&config).unwrap();
        first
            .open_session()
            .unwrap()
            .save_publisher(&NewPublisher::new("Tech Books Inc."))
            .unwrap();
        first.close().unwrap();

        let second = SessionFactory::build(&config).unwrap();
        let session = second.open_session().unwrap();
        assert!(session
            .find_publisher_by_name("Tech Books Inc.")
            .unwrap()
            .is_some());
    }

    #[test]
    fn validate_policy_fails_on_empty_database() {
        let mut config = config();
        config.database.schema_generation = SchemaGeneration::Validate;

        let err = SessionFactory::build(&config).err().unwrap();
        assert!(matches!(err, Error::Schema(_)));
    }

    #[test]
    fn unmapped_dependency_fails_build() {
        let mut config = config();
        config.mapping.entities = vec!["Book".into()];

        let err = SessionFactory::build(&config).err().unwrap();
        assert!(err.to_string().contains("unmapped entity Publisher"));
    }

    #[test]
    fn publisher_only_mapping_creates_one_table() {
        let mut config = config();
        config.mapping.entities = vec!["Publisher".into()];

        let factory = SessionFactory::build(&config).unwrap();
        assert_eq!(factory.mappings().len(), 1);

        let session = factory.open_session().unwrap();
        assert!(schema::table_exists(session.connection(), "publishers").unwrap());
        assert!(!schema::table_exists(session.connection(), "books").unwrap());
    }
}
