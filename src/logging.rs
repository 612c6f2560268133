//! Tracing setup for programs built on this crate.
use anyhow::Context;
use anyhow::Result;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::Layer;

const DEFAULT_LOG_FILTER: &str = "guest_sheet=info";
const VERBOSE_LOG_FILTER: &str = "guest_sheet=debug";

/// Logging configuration.
pub struct LogConfig<'a> {
    /// Filter used when `RUST_LOG` is unset
    pub filter: &'a str,
    /// Log every store call the repository makes
    pub verbose: bool,
}

impl Default for LogConfig<'_> {
    fn default() -> Self {
        LogConfig {
            filter: DEFAULT_LOG_FILTER,
            verbose: false,
        }
    }
}

/// Builds the event filter: `RUST_LOG` wins, then `verbose`, then the configured filter.
fn build_filter(config: &LogConfig<'_>) -> Result<EnvFilter> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    let directives = if config.verbose {
        VERBOSE_LOG_FILTER
    } else {
        config.filter
    };
    EnvFilter::try_new(directives).with_context(|| format!("Invalid log filter '{directives}'"))
}

/// Installs a stderr subscriber. Fails if one is already installed.
pub fn init_logging(config: LogConfig<'_>) -> Result<()> {
    let filter = build_filter(&config)?;
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_filter(filter),
        )
        .try_init()
        .context("Failed to install tracing subscriber")?;
    Ok(())
}
