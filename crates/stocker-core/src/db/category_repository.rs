//! Category and category relation repository implementation

use crate::error::{classify_constraint, Entity, Error, Result};
use crate::models::{AccountId, Category, CategoryId, CategoryName, CategoryRelation, RelationId};
use libsql::{params, Connection};

/// Trait for category storage operations (async)
#[allow(async_fn_in_trait)]
pub trait CategoryRepository {
    /// Create a category; names are unique per account
    async fn create(&self, account_id: AccountId, name: &CategoryName) -> Result<Category>;

    /// Get a category only if it belongs to `account_id`
    async fn find_owned(
        &self,
        account_id: AccountId,
        id: CategoryId,
    ) -> Result<Option<Category>>;

    /// All categories of an account, oldest first
    async fn list(&self, account_id: AccountId) -> Result<Vec<Category>>;

    /// Rename a category of `account_id`
    async fn rename(
        &self,
        account_id: AccountId,
        id: CategoryId,
        name: &CategoryName,
    ) -> Result<Category>;

    /// Delete a category of `account_id` together with its relations
    async fn delete(&self, account_id: AccountId, id: CategoryId) -> Result<()>;

    /// Get the relation between a category and an article, if any
    async fn find_relation(
        &self,
        category_id: CategoryId,
        article_id: &str,
    ) -> Result<Option<CategoryRelation>>;

    /// Relate an article to a category; a duplicate pair is a conflict
    async fn create_relation(
        &self,
        category_id: CategoryId,
        article_id: &str,
    ) -> Result<CategoryRelation>;

    /// Get a relation only if its category belongs to `account_id`
    async fn find_relation_owned(
        &self,
        account_id: AccountId,
        id: RelationId,
    ) -> Result<Option<CategoryRelation>>;

    /// Delete a relation by ID
    async fn delete_relation(&self, id: RelationId) -> Result<()>;
}

/// libSQL implementation of `CategoryRepository`
pub struct LibSqlCategoryRepository<'a> {
    conn: &'a Connection,
}

impl<'a> LibSqlCategoryRepository<'a> {
    /// Create a new repository with the given connection
    pub const fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    fn parse_category(row: &libsql::Row) -> Result<Category> {
        Ok(Category {
            id: CategoryId::new(row.get(0)?),
            account_id: AccountId::new(row.get(1)?),
            name: row.get(2)?,
            created_at: row.get(3)?,
        })
    }

    fn parse_relation(row: &libsql::Row) -> Result<CategoryRelation> {
        Ok(CategoryRelation {
            id: RelationId::new(row.get(0)?),
            category_id: CategoryId::new(row.get(1)?),
            article_id: row.get(2)?,
            created_at: row.get(3)?,
        })
    }
}

impl CategoryRepository for LibSqlCategoryRepository<'_> {
    async fn create(&self, account_id: AccountId, name: &CategoryName) -> Result<Category> {
        let now = chrono::Utc::now().timestamp_millis();
        self.conn
            .execute(
                "INSERT INTO categories (account_id, name, created_at) VALUES (?, ?, ?)",
                params![account_id.get(), name.as_str(), now],
            )
            .await
            .map_err(|error| classify_constraint(error, "Category name"))?;

        Ok(Category {
            id: CategoryId::new(self.conn.last_insert_rowid()),
            account_id,
            name: name.as_str().to_string(),
            created_at: now,
        })
    }

    async fn find_owned(
        &self,
        account_id: AccountId,
        id: CategoryId,
    ) -> Result<Option<Category>> {
        let mut rows = self
            .conn
            .query(
                "SELECT id, account_id, name, created_at FROM categories WHERE id = ? AND account_id = ?",
                params![id.get(), account_id.get()],
            )
            .await?;

        match rows.next().await? {
            Some(row) => Self::parse_category(&row).map(Some),
            None => Ok(None),
        }
    }

    async fn list(&self, account_id: AccountId) -> Result<Vec<Category>> {
        let mut rows = self
            .conn
            .query(
                "SELECT id, account_id, name, created_at FROM categories
                 WHERE account_id = ?
                 ORDER BY id ASC",
                params![account_id.get()],
            )
            .await?;

        let mut categories = Vec::new();
        while let Some(row) = rows.next().await? {
            categories.push(Self::parse_category(&row)?);
        }
        Ok(categories)
    }

    async fn rename(
        &self,
        account_id: AccountId,
        id: CategoryId,
        name: &CategoryName,
    ) -> Result<Category> {
        let rows = self
            .conn
            .execute(
                "UPDATE categories SET name = ? WHERE id = ? AND account_id = ?",
                params![name.as_str(), id.get(), account_id.get()],
            )
            .await
            .map_err(|error| classify_constraint(error, "Category name"))?;

        if rows == 0 {
            return Err(Error::not_found(Entity::Category, id));
        }

        self.find_owned(account_id, id)
            .await?
            .ok_or_else(|| Error::not_found(Entity::Category, id))
    }

    async fn delete(&self, account_id: AccountId, id: CategoryId) -> Result<()> {
        let rows = self
            .conn
            .execute(
                "DELETE FROM categories WHERE id = ? AND account_id = ?",
                params![id.get(), account_id.get()],
            )
            .await?;

        if rows == 0 {
            return Err(Error::not_found(Entity::Category, id));
        }
        Ok(())
    }

    async fn find_relation(
        &self,
        category_id: CategoryId,
        article_id: &str,
    ) -> Result<Option<CategoryRelation>> {
        let mut rows = self
            .conn
            .query(
                "SELECT id, category_id, article_id, created_at FROM category_stocks
                 WHERE category_id = ? AND article_id = ?",
                params![category_id.get(), article_id],
            )
            .await?;

        match rows.next().await? {
            Some(row) => Self::parse_relation(&row).map(Some),
            None => Ok(None),
        }
    }

    async fn create_relation(
        &self,
        category_id: CategoryId,
        article_id: &str,
    ) -> Result<CategoryRelation> {
        let now = chrono::Utc::now().timestamp_millis();
        self.conn
            .execute(
                "INSERT INTO category_stocks (category_id, article_id, created_at) VALUES (?, ?, ?)",
                params![category_id.get(), article_id, now],
            )
            .await
            .map_err(|error| classify_constraint(error, "Category relation"))?;

        Ok(CategoryRelation {
            id: RelationId::new(self.conn.last_insert_rowid()),
            category_id,
            article_id: article_id.to_string(),
            created_at: now,
        })
    }

    async fn find_relation_owned(
        &self,
        account_id: AccountId,
        id: RelationId,
    ) -> Result<Option<CategoryRelation>> {
        let mut rows = self
            .conn
            .query(
                "SELECT cs.id, cs.category_id, cs.article_id, cs.created_at
                 FROM category_stocks cs
                 JOIN categories c ON c.id = cs.category_id
                 WHERE cs.id = ? AND c.account_id = ?",
                params![id.get(), account_id.get()],
            )
            .await?;

        match rows.next().await? {
            Some(row) => Self::parse_relation(&row).map(Some),
            None => Ok(None),
        }
    }

    async fn delete_relation(&self, id: RelationId) -> Result<()> {
        let rows = self
            .conn
            .execute("DELETE FROM category_stocks WHERE id = ?", params![id.get()])
            .await?;

        if rows == 0 {
            return Err(Error::not_found(Entity::Relation, id));
        }
        Ok(())
    }
}
