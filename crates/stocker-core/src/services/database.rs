//! Shared database service wrapper used across clients.

use std::path::PathBuf;
use std::sync::Arc;

use libsql::Connection;
use tokio::sync::{Mutex, MutexGuard};

use crate::db::{
    AccountRepository, CategoryRepository, Database, LibSqlAccountRepository,
    LibSqlCategoryRepository,
};
use crate::error::{Entity, Error, Result};
use crate::models::{Account, AccountId, Category, CategoryId, CategoryName, RelationId};

/// Thread-safe service for DB and repository operations.
///
/// Every store interaction holds the lock for its whole duration, so a
/// transaction never interleaves with another caller's writes.
#[derive(Clone)]
pub struct DatabaseService {
    db: Arc<Mutex<Database>>,
}

impl DatabaseService {
    /// Open a database service at the given filesystem path.
    pub async fn open_path(db_path: impl Into<PathBuf>) -> Result<Self> {
        let db_path = db_path.into();
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        tracing::debug!("Opening stock database at {}", db_path.display());
        let db = Database::open(&db_path).await?;
        Ok(Self::from_database(db))
    }

    /// Open an in-memory database service (primarily for tests).
    pub async fn open_in_memory() -> Result<Self> {
        let db = Database::open_in_memory().await?;
        Ok(Self::from_database(db))
    }

    fn from_database(db: Database) -> Self {
        Self {
            db: Arc::new(Mutex::new(db)),
        }
    }

    pub(crate) async fn lock(&self) -> MutexGuard<'_, Database> {
        self.db.lock().await
    }

    /// Register an account.
    pub async fn create_account(&self, user_name: &str, access_token: &str) -> Result<Account> {
        let db = self.db.lock().await;
        let repo = LibSqlAccountRepository::new(db.connection());
        repo.create(user_name, access_token).await
    }

    /// Resolve an account, failing with `Unauthorized` if it does not exist.
    pub async fn resolve_account(&self, account_id: AccountId) -> Result<Account> {
        let db = self.db.lock().await;
        require_account(db.connection(), account_id).await
    }

    /// Replace an account's access token.
    pub async fn update_access_token(
        &self,
        account_id: AccountId,
        access_token: &str,
    ) -> Result<()> {
        let db = self.db.lock().await;
        let repo = LibSqlAccountRepository::new(db.connection());
        repo.update_access_token(account_id, access_token).await
    }

    /// Create a category for an account.
    pub async fn create_category(&self, account_id: AccountId, name: &str) -> Result<Category> {
        let name = CategoryName::parse(name)?;
        let db = self.db.lock().await;
        require_account(db.connection(), account_id).await?;
        let repo = LibSqlCategoryRepository::new(db.connection());
        repo.create(account_id, &name).await
    }

    /// List an account's categories, oldest first.
    pub async fn list_categories(&self, account_id: AccountId) -> Result<Vec<Category>> {
        let db = self.db.lock().await;
        require_account(db.connection(), account_id).await?;
        let repo = LibSqlCategoryRepository::new(db.connection());
        repo.list(account_id).await
    }

    /// Rename one of an account's categories.
    pub async fn rename_category(
        &self,
        account_id: AccountId,
        category_id: CategoryId,
        name: &str,
    ) -> Result<Category> {
        let name = CategoryName::parse(name)?;
        let db = self.db.lock().await;
        require_account(db.connection(), account_id).await?;
        let repo = LibSqlCategoryRepository::new(db.connection());
        repo.rename(account_id, category_id, &name).await
    }

    /// Delete one of an account's categories and its relations.
    pub async fn delete_category(&self, account_id: AccountId, category_id: CategoryId) -> Result<()> {
        let db = self.db.lock().await;
        require_account(db.connection(), account_id).await?;
        let repo = LibSqlCategoryRepository::new(db.connection());
        repo.delete(account_id, category_id).await
    }

    /// Delete a relation whose category belongs to the account.
    pub async fn destroy_relation(&self, account_id: AccountId, relation_id: RelationId) -> Result<()> {
        let db = self.db.lock().await;
        require_account(db.connection(), account_id).await?;

        let repo = LibSqlCategoryRepository::new(db.connection());
        if repo
            .find_relation_owned(account_id, relation_id)
            .await?
            .is_none()
        {
            return Err(Error::not_found(Entity::Relation, relation_id));
        }
        repo.delete_relation(relation_id).await
    }
}

/// Look up an account on an already locked connection.
pub(crate) async fn require_account(conn: &Connection, account_id: AccountId) -> Result<Account> {
    LibSqlAccountRepository::new(conn)
        .find(account_id)
        .await?
        .ok_or_else(|| Error::Unauthorized(format!("unknown account {account_id}")))
}
