//! Domain module - core business types of the sales feed pipeline
//!
//! Value objects validate at construction; entities model the ephemeral
//! parsed record and the persisted rows. No I/O lives here.

pub mod entities;
pub mod value_objects;

pub use entities::{Category, PaginationFilters, Product, ProductWithCategory, SaleRecord};
pub use value_objects::{
    CategoryName, Price, ProductName, Quantity, ValidationError, DEFAULT_CATEGORY,
    MAX_PRODUCT_NAME_LEN,
};
