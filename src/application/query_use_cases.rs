//! Read-side use cases: paginated listings over the persisted rows.

use std::sync::Arc;

use anyhow::{Context, Result};
use sqlx::SqlitePool;
use tracing::debug;

use crate::domain::{Category, PaginationFilters, ProductWithCategory};
use crate::infrastructure::category_repository::CategoryRepository;
use crate::infrastructure::product_repository::ProductRepository;

#[derive(Clone)]
pub struct QueryUseCases {
    categories: CategoryRepository,
    products: ProductRepository,
}

impl QueryUseCases {
    pub fn new(pool: Arc<SqlitePool>) -> Self {
        Self {
            categories: CategoryRepository::new(Arc::clone(&pool)),
            products: ProductRepository::new(pool),
        }
    }

    /// Products joined with their category name, newest sale date first.
    pub async fn list_products(
        &self,
        filters: PaginationFilters,
    ) -> Result<Vec<ProductWithCategory>> {
        debug!(?filters, "listing products with categories");
        self.products
            .list_with_category(filters)
            .await
            .context("listing products with categories")
    }

    /// Categories ordered by name.
    pub async fn list_categories(&self, filters: PaginationFilters) -> Result<Vec<Category>> {
        debug!(?filters, "listing categories");
        self.categories
            .list(filters)
            .await
            .context("listing categories")
    }
}
