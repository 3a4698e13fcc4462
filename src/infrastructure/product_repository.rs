//! Repository for product rows.
//!
//! `create` reports a violated (product_name, category_id, sale_date)
//! uniqueness key as its own error variant so the ingestion use case can fall
//! back to the `increment_quantity` merge path instead of failing.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection, SqlitePool};
use thiserror::Error;
use tracing::debug;

use crate::domain::{PaginationFilters, Product, ProductWithCategory, SaleRecord};

#[derive(Error, Debug)]
pub enum CreateProductError {
    /// A row already exists for this (product_name, category_id, sale_date)
    /// key. Expected under concurrent writers; recoverable via the merge path.
    #[error("product row already exists for this (name, category, date) key")]
    UniquenessViolation,

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

#[derive(Clone)]
pub struct ProductRepository {
    pool: Arc<SqlitePool>,
}

impl ProductRepository {
    pub fn new(pool: Arc<SqlitePool>) -> Self {
        Self { pool }
    }

    /// Inserts a new product row for the record under `category_id`.
    ///
    /// # Errors
    /// [`CreateProductError::UniquenessViolation`] when the key already
    /// exists; any other database failure is passed through.
    pub async fn create(
        &self,
        conn: &mut SqliteConnection,
        record: &SaleRecord,
        category_id: i64,
    ) -> Result<Product, CreateProductError> {
        let now = Utc::now();
        let result = sqlx::query(
            r#"
            INSERT INTO products
                (sale_date, product_name, quantity, price, category_id, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            RETURNING id, sale_date, product_name, quantity, price, category_id,
                      created_at, updated_at
            "#,
        )
        .bind(record.sale_date)
        .bind(record.product.as_str())
        .bind(record.quantity.get())
        .bind(record.price.get())
        .bind(category_id)
        .bind(now)
        .bind(now)
        .fetch_one(conn)
        .await;

        match result {
            Ok(row) => {
                let product = map_product(&row)?;
                debug!(
                    product = %record.product,
                    id = product.id,
                    "product row created"
                );
                Ok(product)
            }
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                Err(CreateProductError::UniquenessViolation)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Accumulates `delta` into the quantity of the existing row for the
    /// uniqueness key. Price and category are left untouched.
    pub async fn increment_quantity(
        &self,
        conn: &mut SqliteConnection,
        product_name: &str,
        category_id: i64,
        sale_date: NaiveDate,
        delta: i64,
    ) -> Result<Product, sqlx::Error> {
        let row = sqlx::query(
            r#"
            UPDATE products
            SET quantity = quantity + ?, updated_at = ?
            WHERE product_name = ? AND category_id = ? AND sale_date = ?
            RETURNING id, sale_date, product_name, quantity, price, category_id,
                      created_at, updated_at
            "#,
        )
        .bind(delta)
        .bind(Utc::now())
        .bind(product_name)
        .bind(category_id)
        .bind(sale_date)
        .fetch_one(conn)
        .await?;

        let product = map_product(&row)?;
        debug!(
            product = product_name,
            quantity = product.quantity,
            "product quantity merged"
        );
        Ok(product)
    }

    /// Fetches a product row by its uniqueness key.
    pub async fn find_by_key(
        &self,
        product_name: &str,
        category_id: i64,
        sale_date: NaiveDate,
    ) -> Result<Option<Product>, sqlx::Error> {
        let row = sqlx::query(
            r#"
            SELECT id, sale_date, product_name, quantity, price, category_id,
                   created_at, updated_at
            FROM products
            WHERE product_name = ? AND category_id = ? AND sale_date = ?
            "#,
        )
        .bind(product_name)
        .bind(category_id)
        .bind(sale_date)
        .fetch_optional(&*self.pool)
        .await?;

        row.as_ref().map(map_product).transpose()
    }

    /// Lists product rows joined with their category name, newest first.
    pub async fn list_with_category(
        &self,
        filters: PaginationFilters,
    ) -> Result<Vec<ProductWithCategory>, sqlx::Error> {
        let rows = sqlx::query(
            r#"
            SELECT p.id, p.sale_date, p.product_name, p.quantity, p.price,
                   p.category_id, p.created_at, p.updated_at,
                   c.name AS category_name
            FROM products p
            JOIN categories c ON c.id = p.category_id
            ORDER BY p.sale_date DESC, p.product_name
            LIMIT ? OFFSET ?
            "#,
        )
        .bind(filters.limit)
        .bind(filters.offset)
        .fetch_all(&*self.pool)
        .await?;

        rows.iter()
            .map(|row| {
                Ok(ProductWithCategory {
                    product: map_product(row)?,
                    category_name: row.try_get("category_name")?,
                })
            })
            .collect()
    }
}

fn map_product(row: &SqliteRow) -> Result<Product, sqlx::Error> {
    Ok(Product {
        id: row.try_get("id")?,
        sale_date: row.try_get("sale_date")?,
        product_name: row.try_get("product_name")?,
        quantity: row.try_get("quantity")?,
        price: row.try_get("price")?,
        category_id: row.try_get("category_id")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}
