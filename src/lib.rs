//! Salesfeed - XML sales feed ingestion pipeline
//!
//! Parses untrusted XML sales feeds into validated, deduplicated records and
//! persists them as category/product rows under strict uniqueness
//! guarantees, with bounded concurrent fan-out.

// Module declarations
pub mod application;
pub mod domain;
pub mod infrastructure;

// Re-export the external surface for convenience
pub use application::{FeedSummary, IngestError, IngestUseCases, QueryUseCases};
pub use domain::{SaleRecord, ValidationError};
pub use infrastructure::{
    AppConfig, DatabaseConnection, FeedError, FeedParser, DEFAULT_PRODUCT_SELECTOR,
};
