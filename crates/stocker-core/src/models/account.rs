//! Account model

use std::fmt;

use serde::{Deserialize, Serialize};

use super::row_id;

/// Local account identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AccountId(i64);

row_id!(AccountId, "account id");

/// An account that mirrors stocks from one Qiita user
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Unique identifier
    pub id: AccountId,
    /// Qiita user name the stocks belong to
    pub user_name: String,
    /// Qiita access token
    pub access_token: String,
    /// Creation timestamp (Unix ms)
    pub created_at: i64,
}

impl fmt::Debug for Account {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Account")
            .field("id", &self.id)
            .field("user_name", &self.user_name)
            .field("access_token", &"[REDACTED]")
            .field("created_at", &self.created_at)
            .finish()
    }
}

impl Account {
    /// Credential used to talk to the remote stock source on this account's behalf.
    pub fn credential(&self) -> RemoteCredential {
        RemoteCredential {
            user_name: self.user_name.clone(),
            access_token: self.access_token.clone(),
        }
    }
}

/// Resolved user name plus access token for remote calls
#[derive(Clone, PartialEq, Eq)]
pub struct RemoteCredential {
    pub user_name: String,
    pub access_token: String,
}

impl fmt::Debug for RemoteCredential {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("RemoteCredential")
            .field("user_name", &self.user_name)
            .field("access_token", &"[REDACTED]")
            .finish()
    }
}
