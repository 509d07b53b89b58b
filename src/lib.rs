//! # Spreadsheet Description Enrichment
//!
//! Augments database table and column metadata with human-written documentation
//! kept in a spreadsheet, while the metadata flows through an ingestion pass.
//!
//! ## Features
//!
//! - **Spreadsheet backends**: Google Sheets over the v4/Drive v3 REST APIs,
//!   exported `.xlsx` workbooks (local or downloaded) and in-memory sheets
//! - **Ragged input**: sheets are normalized into rectangular tables, naming
//!   unlabelled columns `Column_N`
//! - **Table catalog**: tracked tables are listed on one index sheet, each
//!   described on a sheet of its own
//! - **Freshness gate**: descriptions are only loaded when the spreadsheet
//!   changed within a configured number of days
//! - **Lazy enrichment**: column descriptions are rewritten item by item as the
//!   ingestion source yields them, failures pass through untouched
//! - **Token handling**: OAuth2 authorized-user tokens are loaded, refreshed and
//!   persisted
//!
//! ## Usage
//!
//! ```no_run
//! use sheet_enricher::{EnrichmentConfig, MetadataEnricher};
//! use std::path::Path;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! sheet_enricher::logging::try_init();
//! let config = EnrichmentConfig::from_file(Path::new("enrichment.json"))?;
//! let enricher = MetadataEnricher::from_config(&config, chrono::Utc::now())?;
//! # let columns = Vec::new();
//! for column in enricher.enrich("orders", columns) {
//!     println!("{}: {:?}", column.name, column.description);
//! }
//! # Ok(())
//! # }
//! ```
pub mod auth;
pub mod catalog;
pub mod config;
pub mod descriptions;
pub mod enrich;
pub mod error;
pub mod freshness;
mod helpers;
pub mod logging;
pub mod spreadsheet;

pub use auth::CredentialProvider;
pub use auth::StaticCredentials;
pub use auth::TokenFileCredentials;
pub use catalog::list_tracked_tables;
pub use config::EnrichmentConfig;
pub use descriptions::DescriptionIndex;
pub use enrich::DescriptionTemplate;
pub use enrich::EnrichedSource;
pub use enrich::MetadataEnricher;
pub use error::EnricherError;
pub use freshness::is_cache_valid;
pub use freshness::FreshnessGate;
pub use spreadsheet::GoogleSheetsClient;
pub use spreadsheet::MemorySpreadsheet;
pub use spreadsheet::RectangularTable;
pub use spreadsheet::SpreadsheetClient;
pub use spreadsheet::WorkbookFile;
