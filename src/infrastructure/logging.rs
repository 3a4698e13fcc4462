//! Logging initialization.
//!
//! Console output with an env-filter (`RUST_LOG` wins over the configured
//! level), plus optional daily-rolling file output whose writer guard is kept
//! alive for the life of the process.

use anyhow::Result;
use once_cell::sync::OnceCell;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use super::config::LoggingConfig;

static LOG_GUARD: OnceCell<WorkerGuard> = OnceCell::new();

pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.level.clone()));

    let registry = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer());

    if config.file_output {
        let appender = rolling::daily(&config.directory, "salesfeed.log");
        let (writer, guard) = non_blocking(appender);
        let _ = LOG_GUARD.set(guard);
        registry
            .with(fmt::layer().with_writer(writer).with_ansi(false))
            .try_init()?;
    } else {
        registry.try_init()?;
    }

    Ok(())
}
