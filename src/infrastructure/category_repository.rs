//! Repository for category rows.
//!
//! The central operation is `get_or_create`: an idempotent resolve-or-create
//! that stays correct when many concurrent ingestions target the same
//! category name. The UNIQUE constraint on `name` plus insert-or-ignore and
//! re-select is the only synchronization mechanism.

use std::sync::Arc;

use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection, SqlitePool};
use tracing::debug;

use crate::domain::{Category, PaginationFilters};

#[derive(Clone)]
pub struct CategoryRepository {
    pool: Arc<SqlitePool>,
}

impl CategoryRepository {
    pub fn new(pool: Arc<SqlitePool>) -> Self {
        Self { pool }
    }

    /// Resolves the category row for `name`, creating it if absent.
    ///
    /// Runs on the caller's transaction-scoped connection. Concurrent calls
    /// with the same name converge on one row: the insert is a no-op when the
    /// name already exists, and the follow-up select observes whichever
    /// insert won.
    pub async fn get_or_create(
        &self,
        conn: &mut SqliteConnection,
        name: &str,
    ) -> Result<Category, sqlx::Error> {
        let now = Utc::now();
        sqlx::query(
            r#"
            INSERT INTO categories (name, created_at, updated_at)
            VALUES (?, ?, ?)
            ON CONFLICT (name) DO NOTHING
            "#,
        )
        .bind(name)
        .bind(now)
        .bind(now)
        .execute(&mut *conn)
        .await?;

        let row = sqlx::query(
            r#"
            SELECT id, name, created_at, updated_at
            FROM categories
            WHERE name = ?
            "#,
        )
        .bind(name)
        .fetch_one(conn)
        .await?;

        let category = map_category(&row)?;
        debug!(category = name, id = category.id, "category resolved");
        Ok(category)
    }

    /// Looks a category up by its unique name.
    pub async fn find_by_name(&self, name: &str) -> Result<Option<Category>, sqlx::Error> {
        let row = sqlx::query(
            r#"
            SELECT id, name, created_at, updated_at
            FROM categories
            WHERE name = ?
            "#,
        )
        .bind(name)
        .fetch_optional(&*self.pool)
        .await?;

        row.as_ref().map(map_category).transpose()
    }

    /// Lists categories ordered by name.
    pub async fn list(&self, filters: PaginationFilters) -> Result<Vec<Category>, sqlx::Error> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, created_at, updated_at
            FROM categories
            ORDER BY name
            LIMIT ? OFFSET ?
            "#,
        )
        .bind(filters.limit)
        .bind(filters.offset)
        .fetch_all(&*self.pool)
        .await?;

        rows.iter().map(map_category).collect()
    }
}

fn map_category(row: &SqliteRow) -> Result<Category, sqlx::Error> {
    Ok(Category {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}
