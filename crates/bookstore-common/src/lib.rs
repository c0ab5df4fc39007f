//! Bookstore-Common: Shared identities, errors, and configuration.
//!
//! This crate provides the vocabulary used across the bookstore workspace:
//!
//! - **Typed IDs**: Integer surrogate keys that cannot be mixed up
//!   (a `BookId` is never accepted where a `PublisherId` is expected)
//! - **Error Handling**: A unified error type and result alias
//! - **Configuration**: The declarative database and mapping settings
//!
//! # Examples
//!
//! ```
//! use bookstore_common::{BookId, Config, Error, Result};
//!
//! let id = BookId::from(1);
//! assert_eq!(id.get(), 1);
//!
//! let config = Config::from_toml("").unwrap();
//! assert_eq!(config.mapping.entities, vec!["Book", "Publisher"]);
//!
//! fn find(id: BookId) -> Result<()> {
//!     Err(Error::not_found("Book", id))
//! }
//! let err = find(id).unwrap_err();
//! assert_eq!(err.to_string(), "Book not found: 1");
//! ```

pub mod config;
pub mod error;
pub mod ids;

pub use config::*;
pub use error::{Error, Result};
pub use ids::*;
