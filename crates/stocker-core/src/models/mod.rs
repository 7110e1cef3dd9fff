//! Data models for Stocker

/// Implements the shared surface of an integer row identifier.
macro_rules! row_id {
    ($name:ident, $field:literal) => {
        impl $name {
            /// Wrap a raw row id.
            pub const fn new(value: i64) -> Self {
                Self(value)
            }

            /// The raw row id.
            pub const fn get(self) -> i64 {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                std::fmt::Display::fmt(&self.0, f)
            }
        }

        impl std::str::FromStr for $name {
            type Err = $crate::error::Error;

            fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
                $crate::models::parse_positive_id(s, $field).map(Self)
            }
        }
    };
}

pub(crate) use row_id;

mod account;
mod category;
mod stock;

pub use account::{Account, AccountId, RemoteCredential};
pub use category::{Category, CategoryId, CategoryName, CategoryRelation, RelationId};
pub use stock::{validate_article_id, StockContent, StockId, StockRecord};

use crate::error::{Error, Result};

/// Parse a positive integer identifier from raw request input.
///
/// Only ASCII digits are accepted; signs, decimals, whitespace, full-width
/// digits, zero, and values above `i64::MAX` are rejected.
pub(crate) fn parse_positive_id(raw: &str, field: &str) -> Result<i64> {
    if raw.is_empty() || !raw.bytes().all(|byte| byte.is_ascii_digit()) {
        return Err(Error::validation(format!(
            "{field} must be a positive integer"
        )));
    }
    match raw.parse::<i64>() {
        Ok(value) if value >= 1 => Ok(value),
        _ => Err(Error::validation(format!(
            "{field} must be between 1 and {}",
            i64::MAX
        ))),
    }
}
