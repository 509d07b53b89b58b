use crate::error::EnricherError;
use crate::spreadsheet::RectangularTable;
use crate::spreadsheet::SpreadsheetClient;
use crate::spreadsheet::SpreadsheetError;
use chrono::DateTime;
use chrono::Utc;

/// Sheets held in memory, for embedding and tests.
///
/// Every [`read_sheet`](SpreadsheetClient::read_sheet) call is recorded and can
/// be inspected with [`MemorySpreadsheet::reads`].
#[derive(Clone, Debug, Default)]
pub struct MemorySpreadsheet {
    id: String,
    sheets: Vec<(String, Vec<Vec<String>>)>,
    last_modified: Option<DateTime<Utc>>,
    reads: Vec<String>,
}

impl MemorySpreadsheet {
    pub fn new(id: &str) -> Self {
        MemorySpreadsheet {
            id: id.to_owned(),
            ..Default::default()
        }
    }

    /// Adds a sheet with raw, possibly ragged rows; the first row is the header.
    pub fn with_sheet<R, C>(mut self, name: &str, rows: R) -> Self
    where
        R: IntoIterator<Item = C>,
        C: IntoIterator,
        C::Item: Into<String>,
    {
        let rows = rows
            .into_iter()
            .map(|row| row.into_iter().map(Into::into).collect())
            .collect();
        self.sheets.push((name.to_owned(), rows));
        self
    }

    pub fn with_last_modified(mut self, last_modified: DateTime<Utc>) -> Self {
        self.last_modified = Some(last_modified);
        self
    }

    /// Names passed to `read_sheet`, in call order
    pub fn reads(&self) -> &[String] {
        &self.reads
    }
}

impl SpreadsheetClient for MemorySpreadsheet {
    fn id(&self) -> &str {
        &self.id
    }

    fn sheet_names(&mut self) -> Result<Vec<String>, EnricherError> {
        Ok(self.sheets.iter().map(|(name, _)| name.to_owned()).collect())
    }

    fn last_modified(&mut self) -> Option<DateTime<Utc>> {
        self.last_modified
    }

    fn read_sheet(&mut self, name: &str) -> Result<RectangularTable, EnricherError> {
        self.reads.push(name.to_owned());
        match self.sheets.iter().find(|(sheet, _)| sheet == name) {
            Some((_, rows)) => Ok(RectangularTable::from_rows(rows.clone())),
            None => Err(SpreadsheetError::SheetNotFound {
                spreadsheet: self.id.to_owned(),
                sheet: name.to_owned(),
            })?,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_are_recorded() {
        let mut spreadsheet = MemorySpreadsheet::new("memory")
            .with_sheet("orders", [vec!["orders", "Description"], vec!["id"]]);
        assert_eq!(spreadsheet.sheet_names().unwrap(), vec!["orders"]);

        let table = spreadsheet.read_sheet("orders").unwrap();
        assert_eq!(table.rows()[0], vec!["id", ""]);
        assert!(spreadsheet.read_sheet("users").is_err());
        assert_eq!(spreadsheet.reads(), &["orders", "users"]);
        assert_eq!(spreadsheet.last_modified(), None);
    }
}
