//! Domain entities: the ephemeral parsed sale record and the persisted
//! category/product row types.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::value_objects::{CategoryName, Price, ProductName, Quantity};

/// One normalized sales record for a single feed date.
///
/// Ephemeral: produced by the feed parser, consumed by the ingestion use
/// case, never persisted in this shape.
#[derive(Debug, Clone, PartialEq)]
pub struct SaleRecord {
    pub product: ProductName,
    pub quantity: Quantity,
    pub price: Price,
    pub category_name: CategoryName,
    pub sale_date: NaiveDate,
}

impl SaleRecord {
    /// Folds a repeated in-feed occurrence of the same product into this
    /// record. Only the quantity accumulates; the first occurrence's price
    /// and category win.
    pub fn absorb(&mut self, quantity: Quantity) {
        self.quantity.add(quantity);
    }
}

/// Persisted category row. `name` is unique; the id is immutable after
/// creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Persisted product row, unique per (product_name, category_id, sale_date).
///
/// Quantity is incremented when a later ingestion targets the same key;
/// price and category are never altered on that path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub sale_date: NaiveDate,
    pub product_name: String,
    pub quantity: i64,
    pub price: i64,
    pub category_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Product row joined with its category name, for read-side listings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductWithCategory {
    pub product: Product,
    pub category_name: String,
}

/// Offset pagination for the read-side queries.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PaginationFilters {
    pub limit: i64,
    pub offset: i64,
}

impl Default for PaginationFilters {
    fn default() -> Self {
        Self {
            limit: 10,
            offset: 0,
        }
    }
}
