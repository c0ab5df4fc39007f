//! Typed ID wrappers providing compile-time safety for entity identifiers.
//!
//! Identities are surrogate keys generated by the database at insert time,
//! so each ID type is a newtype over `i64` rather than a random UUID.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

/// Generate a newtype ID wrapper over an `i64` row identity.
///
/// The macro produces a struct with:
/// - `get()` returning the raw row id
/// - `Debug`, `Clone`, `Copy`, `PartialEq`, `Eq`, `Hash`, `Ord`, `Serialize`, `Deserialize`
/// - `Display` and `FromStr` delegating to the inner integer
/// - `From<i64>` and `Into<i64>` conversions
macro_rules! typed_id {
    ($($(#[doc = $doc:expr])* $name:ident),+ $(,)?) => {
        $(
            $(#[doc = $doc])*
            #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
            #[serde(transparent)]
            pub struct $name(i64);

            impl $name {
                /// Return the raw row identity.
                #[must_use]
                pub const fn get(self) -> i64 {
                    self.0
                }
            }

            impl fmt::Display for $name {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    write!(f, "{}", self.0)
                }
            }

            impl FromStr for $name {
                type Err = ParseIntError;

                fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
                    s.parse::<i64>().map(Self)
                }
            }

            impl From<i64> for $name {
                fn from(raw: i64) -> Self {
                    Self(raw)
                }
            }

            impl From<$name> for i64 {
                fn from(id: $name) -> Self {
                    id.0
                }
            }
        )+
    };
}

typed_id! {
    /// Identity of a persisted book.
    BookId,
    /// Identity of a persisted publisher.
    PublisherId,
}
