//! Infrastructure layer: feed parsing, database connections, repositories,
//! configuration, and logging.

pub mod category_repository;
pub mod config;
pub mod database_connection;
pub mod logging;
pub mod parsing;
pub mod product_repository;

pub use category_repository::CategoryRepository;
pub use config::AppConfig;
pub use database_connection::DatabaseConnection;
pub use parsing::{FeedError, FeedParser, ParsedFeed, DEFAULT_PRODUCT_SELECTOR};
pub use product_repository::{CreateProductError, ProductRepository};
