//! Console logging for enrichment runs.
//!
//! ```no_run
//! sheet_enricher::logging::init().expect("Failed to initialize logging");
//! tracing::info!("enrichment started");
//! ```
//!
//! The filter is taken from `RUST_LOG` and defaults to `info`;
//! `RUST_LOG=sheet_enricher=debug` shows every API request and timing.
use anyhow::Context as _;
use anyhow::Result;
use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt as _;
use tracing_subscriber::util::SubscriberInitExt as _;
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "info";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Installs a global fmt subscriber writing to stderr.
///
/// # Errors
///
/// Returns error if another global subscriber is already installed.
pub fn init() -> Result<()> {
    tracing_subscriber::registry()
        .with(env_filter())
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .try_init()
        .context("Failed to install tracing subscriber")
}

/// Like [`init`], but ignores an already installed subscriber.
pub fn try_init() {
    if let Err(error) = init() {
        tracing::debug!(%error, "logging already initialized");
    }
}
