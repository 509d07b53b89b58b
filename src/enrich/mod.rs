//! # Metadata Enrichment
//!
//! Rewrites column descriptions flowing out of an ingestion source, combining
//! the description harvested from the database with the one maintained in the
//! spreadsheet:
//!
//! ```text
//! Description from source:
//! Order identifier
//!
//! Description from spreadsheet:
//! Primary key
//! ```
use crate::catalog::list_tracked_tables;
use crate::config::EnrichmentConfig;
use crate::descriptions::DescriptionIndex;
use crate::error::EnricherError;
use crate::error::ResultMessage;
use crate::freshness::FreshnessGate;
use crate::spreadsheet::GoogleSheetsClient;
use crate::spreadsheet::SpreadsheetClient;
use chrono::DateTime;
use chrono::Utc;
use either::Either;
use serde::Deserialize;
use serde::Serialize;

pub mod source;
pub mod timing;

pub use source::Column;
pub use source::CreateTableRequest;
pub use source::IngestionItem;
pub use source::StackTraceError;
pub use source::TableSource;
pub use source::TableType;
pub use timing::ExecutionTimeTracker;

/// Labels of the composed description and the text used where a value is absent
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DescriptionTemplate {
    pub source_label: String,
    pub spreadsheet_label: String,
    pub placeholder: String,
}

impl Default for DescriptionTemplate {
    fn default() -> Self {
        DescriptionTemplate {
            source_label: "Description from source".to_owned(),
            spreadsheet_label: "Description from spreadsheet".to_owned(),
            placeholder: "No comment available".to_owned(),
        }
    }
}

impl DescriptionTemplate {
    /// Composes both descriptions, substituting the placeholder for absent ones.
    pub fn compose(&self, source: Option<&str>, spreadsheet: Option<&str>) -> String {
        format!(
            "{}:\n{}\n\n{}:\n{}",
            self.source_label,
            source.unwrap_or(&self.placeholder),
            self.spreadsheet_label,
            spreadsheet.unwrap_or(&self.placeholder),
        )
    }
}

/// Merges spreadsheet descriptions into column records.
///
/// Built once per ingestion run; all spreadsheet reads happen on construction
/// and enrichment itself performs no I/O.
#[derive(Clone, Debug, Default)]
pub struct MetadataEnricher {
    tracked_tables: Vec<String>,
    index: DescriptionIndex,
    template: DescriptionTemplate,
}

impl MetadataEnricher {
    /// Reads the tracked tables and, when the spreadsheet is fresh enough, the
    /// description index.
    ///
    /// # Arguments
    /// * `client` - Spreadsheet holding the index sheet and description sheets
    /// * `config` - Sheet and column labels, threshold and template
    /// * `now` - Reference time for the freshness check
    ///
    /// # Returns
    /// The enricher, or the transport failure that aborted construction.
    /// When the last change is older than `max_last_update_days` no description
    /// sheet is read and every lookup falls back to the placeholder.
    pub fn from_spreadsheet<C: SpreadsheetClient + ?Sized>(
        client: &mut C,
        config: &EnrichmentConfig,
        now: DateTime<Utc>,
    ) -> Result<Self, EnricherError> {
        let tracked_tables = list_tracked_tables(client, &config.index_sheet, &config.table_column)?;
        let gate = FreshnessGate::new(config.max_last_update_days, now);
        let index = if gate.is_cache_valid(client.last_modified()) {
            DescriptionIndex::build(client, &tracked_tables, &config.description_column)?
        } else {
            tracing::info!(
                spreadsheet = client.id(),
                threshold_days = config.max_last_update_days,
                "spreadsheet last changed beyond threshold, descriptions not loaded"
            );
            DescriptionIndex::default()
        };
        Ok(MetadataEnricher {
            tracked_tables,
            index,
            template: config.template.clone(),
        })
    }

    /// Connects to the Google spreadsheet named by `config` and builds the enricher.
    pub fn from_config(config: &EnrichmentConfig, now: DateTime<Utc>) -> Result<Self, EnricherError> {
        config.validate()?;
        let mut client = GoogleSheetsClient::from_config(config).with_prefix("Create spreadsheet client")?;
        Self::from_spreadsheet(&mut client, config, now)
    }

    pub fn tracked_tables(&self) -> &[String] {
        &self.tracked_tables
    }

    pub fn index(&self) -> &DescriptionIndex {
        &self.index
    }

    pub fn template(&self) -> &DescriptionTemplate {
        &self.template
    }

    /// Rewrites the description of one column of `table_name` in place.
    pub fn enrich_column(&self, table_name: &str, column: &mut Column) {
        let composed = self.template.compose(
            column.description.as_deref(),
            self.index.get(table_name, &column.name),
        );
        column.description = Some(composed);
    }

    /// Lazily enriches `columns`, keeping their number and order.
    pub fn enrich<'a, I>(&'a self, table_name: &str, columns: I) -> impl Iterator<Item = Column> + 'a
    where
        I: IntoIterator<Item = Column>,
        I::IntoIter: 'a,
    {
        let table_name = table_name.to_owned();
        columns.into_iter().map(move |mut column| {
            self.enrich_column(&table_name, &mut column);
            column
        })
    }

    /// Lazily enriches the columns of every table record in an ingestion stream.
    ///
    /// Failures pass through unchanged.
    pub fn enrich_tables<'a, I>(&'a self, table_name: &str, items: I) -> impl Iterator<Item = IngestionItem> + 'a
    where
        I: IntoIterator<Item = IngestionItem>,
        I::IntoIter: 'a,
    {
        let table_name = table_name.to_owned();
        items.into_iter().map(move |item| match item {
            Either::Left(failure) => {
                tracing::debug!(table = %table_name, error = %failure.error, "passing through source failure");
                Either::Left(failure)
            }
            Either::Right(mut request) => {
                for column in &mut request.columns {
                    self.enrich_column(&table_name, column);
                }
                Either::Right(request)
            }
        })
    }
}

/// A [`TableSource`] whose records come out enriched and timed.
pub struct EnrichedSource<S: TableSource> {
    source: S,
    enricher: MetadataEnricher,
    tracker: ExecutionTimeTracker,
}

impl<S: TableSource> EnrichedSource<S> {
    pub fn new(source: S, enricher: MetadataEnricher) -> Self {
        EnrichedSource {
            source,
            enricher,
            tracker: ExecutionTimeTracker::new(),
        }
    }

    pub fn enricher(&self) -> &MetadataEnricher {
        &self.enricher
    }

    pub fn tracker(&self) -> &ExecutionTimeTracker {
        &self.tracker
    }

    pub fn into_inner(self) -> S {
        self.source
    }
}

impl<S: TableSource> TableSource for EnrichedSource<S> {
    fn yield_table<'a>(
        &'a mut self,
        table_name: &str,
        table_type: TableType,
    ) -> Box<dyn Iterator<Item = IngestionItem> + 'a> {
        let items = self.source.yield_table(table_name, table_type);
        let enriched = self.enricher.enrich_tables(table_name, items);
        Box::new(self.tracker.track("yield_table", enriched))
    }
}
