//! # Spreadsheet Access Module
//!
//! This module provides authenticated, read-only access to one spreadsheet
//! resource: listing its sheets, reading a sheet as a [`RectangularTable`] and
//! reporting when the resource was last modified. Three backends implement the
//! [`SpreadsheetClient`] trait:
//!
//! - [`GoogleSheetsClient`]: Google Sheets v4 and Drive v3 over HTTP
//! - [`WorkbookFile`]: an exported `.xlsx` workbook, local or downloaded
//! - [`MemorySpreadsheet`]: sheets held in memory
use crate::error::EnricherError;
use chrono::DateTime;
use chrono::Utc;
use thiserror::Error;

pub(crate) mod cell;
pub(crate) mod excel;
pub mod google;
pub mod memory;
pub(crate) mod reference;
pub(crate) mod sheet;
pub mod table;
pub mod xlsx;

pub use google::GoogleSheetsClient;
pub use memory::MemorySpreadsheet;
pub use table::RectangularTable;
pub use xlsx::WorkbookFile;

/// Errors raised while talking to a spreadsheet backend.
///
/// `Unavailable` is fatal for the caller. `SheetNotFound` and `MissingColumn`
/// are recovered locally by the catalog and index builders.
#[derive(Error, Debug)]
pub enum SpreadsheetError {
    /// Transport or authentication failure reaching the backend
    #[error("Spreadsheet '{spreadsheet}' is unavailable: {message}")]
    Unavailable { spreadsheet: String, message: String },

    /// Referenced sheet is absent from the spreadsheet
    #[error("Sheet '{sheet}' not found in spreadsheet '{spreadsheet}'")]
    SheetNotFound { spreadsheet: String, sheet: String },

    /// Expected header label is absent from a sheet
    #[error("Sheet '{sheet}' has no column '{column}'")]
    MissingColumn { sheet: String, column: String },

    /// Backend answered with a payload that could not be decoded
    #[error("Invalid response for spreadsheet '{0}': {1}")]
    InvalidResponse(String, String),

    /// Required workbook part is missing from the archive
    #[error("Workbook part '{0}' is missing")]
    FileError(String),
}

impl SpreadsheetError {
    /// Returns true for errors the enrichment pipeline recovers from locally.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::SheetNotFound { .. } | Self::MissingColumn { .. })
    }
}

/// Read-only access to one spreadsheet resource.
pub trait SpreadsheetClient {
    /// Stable identifier of the spreadsheet (resource ID, path or URL)
    fn id(&self) -> &str;

    /// Returns the names of all sheets, in workbook order.
    ///
    /// The listing is computed once and reused for the lifetime of the client.
    ///
    /// # Errors
    ///
    /// Returns [`SpreadsheetError::Unavailable`] when the backend cannot be reached.
    fn sheet_names(&mut self) -> Result<Vec<String>, EnricherError>;

    /// Returns the last modification time, or `None` when the backend cannot supply it.
    fn last_modified(&mut self) -> Option<DateTime<Utc>>;

    /// Reads a sheet and normalizes it into a rectangular table.
    ///
    /// Every call fetches the sheet content again.
    ///
    /// # Errors
    ///
    /// Returns [`SpreadsheetError::SheetNotFound`] when `name` is not one of
    /// [`SpreadsheetClient::sheet_names`], and [`SpreadsheetError::Unavailable`]
    /// on transport failure.
    fn read_sheet(&mut self, name: &str) -> Result<RectangularTable, EnricherError>;

    /// Fails with [`SpreadsheetError::SheetNotFound`] unless `name` is a known sheet.
    fn ensure_sheet(&mut self, name: &str) -> Result<(), EnricherError> {
        if self.sheet_names()?.iter().any(|sheet| sheet == name) {
            Ok(())
        } else {
            Err(SpreadsheetError::SheetNotFound {
                spreadsheet: self.id().to_owned(),
                sheet: name.to_owned(),
            })?
        }
    }
}

impl<C: SpreadsheetClient + ?Sized> SpreadsheetClient for Box<C> {
    fn id(&self) -> &str {
        (**self).id()
    }

    fn sheet_names(&mut self) -> Result<Vec<String>, EnricherError> {
        (**self).sheet_names()
    }

    fn last_modified(&mut self) -> Option<DateTime<Utc>> {
        (**self).last_modified()
    }

    fn read_sheet(&mut self, name: &str) -> Result<RectangularTable, EnricherError> {
        (**self).read_sheet(name)
    }
}

/// Extracts the spreadsheet error carried by a crate error, if any.
pub fn as_spreadsheet_error(error: &EnricherError) -> Option<&SpreadsheetError> {
    match error {
        EnricherError::SpreadsheetError(error) => Some(error),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_absences_are_recoverable() {
        let not_found = SpreadsheetError::SheetNotFound {
            spreadsheet: "id".to_owned(),
            sheet: "users".to_owned(),
        };
        let missing = SpreadsheetError::MissingColumn {
            sheet: "orders".to_owned(),
            column: "Description".to_owned(),
        };
        let unavailable = SpreadsheetError::Unavailable {
            spreadsheet: "id".to_owned(),
            message: "HTTP 503".to_owned(),
        };
        assert!(not_found.is_recoverable());
        assert!(missing.is_recoverable());
        assert!(!unavailable.is_recoverable());

        let error = EnricherError::from(unavailable);
        assert!(!as_spreadsheet_error(&error).is_some_and(SpreadsheetError::is_recoverable));
        assert!(as_spreadsheet_error(&EnricherError::WithContextError("x".to_owned())).is_none());
    }
}
