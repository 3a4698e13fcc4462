//! Application layer: the ingestion and query use cases that orchestrate
//! parsing, validation, and persistence.

pub mod ingest_use_cases;
pub mod query_use_cases;

pub use ingest_use_cases::{
    FeedSummary, IngestError, IngestStage, IngestUseCases, DEFAULT_BATCH_SIZE,
};
pub use query_use_cases::QueryUseCases;
