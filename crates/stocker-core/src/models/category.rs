//! Category and category relation models

use serde::{Deserialize, Serialize};

use super::{row_id, AccountId};
use crate::error::{Error, Result};

const MAX_CATEGORY_NAME_CHARS: usize = 50;

/// Category identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CategoryId(i64);

row_id!(CategoryId, "category id");

/// Category relation identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RelationId(i64);

row_id!(RelationId, "relation id");

/// A validated category display name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryName(String);

impl CategoryName {
    /// Trim and validate a display name.
    pub fn parse(raw: &str) -> Result<Self> {
        let name = raw.trim();
        let chars = name.chars().count();
        if chars == 0 || chars > MAX_CATEGORY_NAME_CHARS {
            return Err(Error::validation(format!(
                "category name must be 1-{MAX_CATEGORY_NAME_CHARS} characters"
            )));
        }
        Ok(Self(name.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A user-defined label an account attaches stocks to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    /// Unique identifier
    pub id: CategoryId,
    /// Owning account
    pub account_id: AccountId,
    /// Display name, unique per account
    pub name: String,
    /// Creation timestamp (Unix ms)
    pub created_at: i64,
}

/// Join between a category and a stocked article of the same account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRelation {
    pub id: RelationId,
    pub category_id: CategoryId,
    pub article_id: String,
    /// Creation timestamp (Unix ms)
    pub created_at: i64,
}
