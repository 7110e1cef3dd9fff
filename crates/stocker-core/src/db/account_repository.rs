//! Account repository implementation

use crate::error::{Entity, Error, Result};
use crate::models::{Account, AccountId};
use libsql::{params, Connection};

/// Trait for account storage operations (async)
#[allow(async_fn_in_trait)]
pub trait AccountRepository {
    /// Register an account for a Qiita user
    async fn create(&self, user_name: &str, access_token: &str) -> Result<Account>;

    /// Get an account by ID
    async fn find(&self, id: AccountId) -> Result<Option<Account>>;

    /// Replace the stored access token
    async fn update_access_token(&self, id: AccountId, access_token: &str) -> Result<()>;
}

/// libSQL implementation of `AccountRepository`
pub struct LibSqlAccountRepository<'a> {
    conn: &'a Connection,
}

impl<'a> LibSqlAccountRepository<'a> {
    /// Create a new repository with the given connection
    pub const fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }
}

impl AccountRepository for LibSqlAccountRepository<'_> {
    async fn create(&self, user_name: &str, access_token: &str) -> Result<Account> {
        let user_name = user_name.trim();
        let access_token = access_token.trim();
        if user_name.is_empty() || access_token.is_empty() {
            return Err(Error::Validation(
                "user name and access token must not be empty".to_string(),
            ));
        }

        let now = chrono::Utc::now().timestamp_millis();
        self.conn
            .execute(
                "INSERT INTO accounts (user_name, access_token, created_at) VALUES (?, ?, ?)",
                params![user_name, access_token, now],
            )
            .await?;

        Ok(Account {
            id: AccountId::new(self.conn.last_insert_rowid()),
            user_name: user_name.to_string(),
            access_token: access_token.to_string(),
            created_at: now,
        })
    }

    async fn find(&self, id: AccountId) -> Result<Option<Account>> {
        let mut rows = self
            .conn
            .query(
                "SELECT id, user_name, access_token, created_at FROM accounts WHERE id = ?",
                params![id.get()],
            )
            .await?;

        let Some(row) = rows.next().await? else {
            return Ok(None);
        };

        Ok(Some(Account {
            id: AccountId::new(row.get(0)?),
            user_name: row.get(1)?,
            access_token: row.get(2)?,
            created_at: row.get(3)?,
        }))
    }

    async fn update_access_token(&self, id: AccountId, access_token: &str) -> Result<()> {
        let access_token = access_token.trim();
        if access_token.is_empty() {
            return Err(Error::Validation(
                "access token must not be empty".to_string(),
            ));
        }

        let rows = self
            .conn
            .execute(
                "UPDATE accounts SET access_token = ? WHERE id = ?",
                params![access_token, id.get()],
            )
            .await?;

        if rows == 0 {
            return Err(Error::not_found(Entity::Account, id));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;

    async fn setup() -> Database {
        Database::open_in_memory().await.unwrap()
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_create_and_find() {
        let db = setup().await;
        let repo = LibSqlAccountRepository::new(db.connection());

        let account = repo.create(" kobayashi ", "token-1").await.unwrap();
        assert_eq!(account.user_name, "kobayashi");

        let found = repo.find(account.id).await.unwrap().unwrap();
        assert_eq!(found, account);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_find_unknown_account() {
        let db = setup().await;
        let repo = LibSqlAccountRepository::new(db.connection());

        assert!(repo.find(AccountId::new(99)).await.unwrap().is_none());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_create_rejects_blank_credentials() {
        let db = setup().await;
        let repo = LibSqlAccountRepository::new(db.connection());

        assert!(matches!(
            repo.create("kobayashi", "  ").await,
            Err(Error::Validation(_))
        ));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_update_access_token() {
        let db = setup().await;
        let repo = LibSqlAccountRepository::new(db.connection());

        let account = repo.create("kobayashi", "token-1").await.unwrap();
        repo.update_access_token(account.id, "token-2").await.unwrap();

        let found = repo.find(account.id).await.unwrap().unwrap();
        assert_eq!(found.access_token, "token-2");

        assert!(matches!(
            repo.update_access_token(AccountId::new(99), "token").await,
            Err(Error::NotFound(..))
        ));
    }
}
