//! Ingestion use cases: persist one parsed record transactionally, and drive
//! concurrent persistence of a whole feed in bounded batches.

use std::sync::Arc;

use chrono::NaiveDate;
use futures::future::join_all;
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::domain::{Product, SaleRecord, ValidationError};
use crate::infrastructure::category_repository::CategoryRepository;
use crate::infrastructure::parsing::{FeedError, FeedParser};
use crate::infrastructure::product_repository::{CreateProductError, ProductRepository};

/// Default number of records persisted concurrently per batch. Caps in-flight
/// transactions against the store; not required for correctness.
pub const DEFAULT_BATCH_SIZE: usize = 100;

/// Where in its lifecycle a failing record ingestion was.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestStage {
    CategoryResolve,
    ProductCreate,
    ProductMerge,
    Commit,
}

impl std::fmt::Display for IngestStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::CategoryResolve => "category resolve",
            Self::ProductCreate => "product create",
            Self::ProductMerge => "product merge",
            Self::Commit => "commit",
        };
        f.write_str(label)
    }
}

#[derive(Error, Debug)]
pub enum IngestError {
    /// Feed-level parse failure; nothing was persisted.
    #[error("feed rejected: {0}")]
    Feed(#[from] FeedError),

    /// A record failed validation. The parser skips invalid nodes instead of
    /// raising this, so it only occurs for callers assembling [`SaleRecord`]s
    /// by hand, where value-object errors propagate into the ingest error
    /// type with `?`.
    #[error("record rejected: {0}")]
    Validation(#[from] ValidationError),

    /// Storage failure for one record. Does not cancel sibling records; it
    /// surfaces at feed level once the record's batch has completed.
    #[error("persistence failed during {stage}: {source}")]
    Persistence {
        stage: IngestStage,
        #[source]
        source: sqlx::Error,
    },
}

impl IngestError {
    fn persistence(stage: IngestStage, source: sqlx::Error) -> Self {
        Self::Persistence { stage, source }
    }
}

/// Outcome of a successfully ingested feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedSummary {
    /// Number of deduplicated records persisted.
    pub records: usize,
    /// The feed's sale date, used downstream to key cache entries.
    pub sale_date: NaiveDate,
}

impl FeedSummary {
    #[must_use]
    pub fn message(&self) -> String {
        if self.records == 0 {
            format!("no products found in feed for {}", self.sale_date)
        } else {
            format!(
                "{} products successfully created for {}",
                self.records, self.sale_date
            )
        }
    }
}

impl std::fmt::Display for FeedSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message())
    }
}

/// Drives record persistence: one transaction per record, batched concurrent
/// fan-out per feed.
#[derive(Clone)]
pub struct IngestUseCases {
    pool: Arc<SqlitePool>,
    categories: CategoryRepository,
    products: ProductRepository,
    batch_size: usize,
}

impl IngestUseCases {
    pub fn new(pool: Arc<SqlitePool>) -> Self {
        Self {
            categories: CategoryRepository::new(Arc::clone(&pool)),
            products: ProductRepository::new(Arc::clone(&pool)),
            pool,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    #[must_use]
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Persists one record: category resolve-or-create, then product create
    /// with merge fallback, all inside one transaction that commits on
    /// success and rolls back on any error.
    ///
    /// A uniqueness conflict on the product key is not a failure: the losing
    /// side of the race accumulates its quantity into the existing row, so no
    /// contribution is dropped and nothing is double counted.
    pub async fn ingest(&self, record: &SaleRecord) -> Result<Product, IngestError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| IngestError::persistence(IngestStage::CategoryResolve, e))?;

        let category = self
            .categories
            .get_or_create(&mut tx, record.category_name.as_str())
            .await
            .map_err(|e| IngestError::persistence(IngestStage::CategoryResolve, e))?;

        let product = match self.products.create(&mut tx, record, category.id).await {
            Ok(product) => product,
            Err(CreateProductError::UniquenessViolation) => {
                debug!(
                    product = %record.product,
                    category = %record.category_name,
                    "product key exists, merging quantity"
                );
                self.products
                    .increment_quantity(
                        &mut tx,
                        record.product.as_str(),
                        category.id,
                        record.sale_date,
                        record.quantity.get(),
                    )
                    .await
                    .map_err(|e| IngestError::persistence(IngestStage::ProductMerge, e))?
            }
            Err(CreateProductError::Database(e)) => {
                return Err(IngestError::persistence(IngestStage::ProductCreate, e));
            }
        };

        tx.commit()
            .await
            .map_err(|e| IngestError::persistence(IngestStage::Commit, e))?;
        Ok(product)
    }

    /// Parses a feed and persists every resulting record concurrently in
    /// fixed-size batches.
    ///
    /// A parse failure aborts before any persistence. A per-record
    /// persistence failure surfaces after its batch completes; sibling
    /// records in that batch still run to completion.
    pub async fn parse_and_create(
        &self,
        feed_text: &str,
        selector: &str,
    ) -> Result<FeedSummary, IngestError> {
        let feed = FeedParser::parse(feed_text, selector)?;
        let total = feed.records.len();

        if total == 0 {
            info!(sale_date = %feed.sale_date, "feed contained no usable records");
            return Ok(FeedSummary {
                records: 0,
                sale_date: feed.sale_date,
            });
        }

        for (batch_index, batch) in feed.records.chunks(self.batch_size).enumerate() {
            debug!(
                batch = batch_index,
                size = batch.len(),
                "ingesting record batch"
            );
            let results = join_all(batch.iter().map(|record| self.ingest(record))).await;

            // The whole batch is awaited before the first failure is raised,
            // so no sibling outcome is silently swallowed.
            let mut first_error = None;
            for result in results {
                if let Err(e) = result {
                    warn!(batch = batch_index, error = %e, "record ingestion failed");
                    first_error.get_or_insert(e);
                }
            }
            if let Some(e) = first_error {
                return Err(e);
            }
        }

        let summary = FeedSummary {
            records: total,
            sale_date: feed.sale_date,
        };
        info!(records = total, sale_date = %feed.sale_date, "feed ingested");
        Ok(summary)
    }
}
