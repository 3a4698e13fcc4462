//! Process entry point: read one XML feed file and run it through the
//! ingestion pipeline.

use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use tracing::{error, info};

use salesfeed::infrastructure::logging::init_logging;
use salesfeed::{AppConfig, DatabaseConnection, IngestUseCases};

const CONFIG_PATH: &str = "salesfeed.json";

#[tokio::main]
async fn main() -> Result<()> {
    let config_path = Path::new(CONFIG_PATH);
    let config_created = !config_path.exists();
    let config = AppConfig::load_or_default(config_path).await?;
    init_logging(&config.logging)?;
    if config_created {
        info!(path = %config_path.display(), "created default configuration file");
    }

    let mut args = std::env::args().skip(1);
    let Some(feed_path) = args.next() else {
        bail!("usage: salesfeed <feed.xml>");
    };
    let feed_text = tokio::fs::read_to_string(&feed_path)
        .await
        .with_context(|| format!("reading feed from {feed_path}"))?;

    let db = DatabaseConnection::connect(&config.database).await?;
    db.migrate().await?;

    let use_cases = IngestUseCases::new(Arc::new(db.pool().clone()))
        .with_batch_size(config.ingest.batch_size);

    match use_cases
        .parse_and_create(&feed_text, &config.ingest.product_selector)
        .await
    {
        Ok(summary) => {
            info!(sale_date = %summary.sale_date, "{}", summary.message());
            println!("{summary}");
            Ok(())
        }
        Err(e) => {
            error!(error = %e, "feed ingestion failed");
            Err(e.into())
        }
    }
}
