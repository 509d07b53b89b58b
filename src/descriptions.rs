//! Column descriptions gathered from one sheet per tracked table.
use crate::error::EnricherError;
use crate::spreadsheet::as_spreadsheet_error;
use crate::spreadsheet::SpreadsheetClient;
use crate::spreadsheet::SpreadsheetError;
use std::collections::HashMap;
use std::collections::HashSet;

/// Table name to (column name to description).
///
/// A table is present only when at least one of its descriptions is non-empty;
/// within a present table empty descriptions are kept.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DescriptionIndex {
    tables: HashMap<String, HashMap<String, String>>,
}

impl DescriptionIndex {
    /// Reads the sheet named after each tracked table and indexes its descriptions.
    ///
    /// The sheet's subject column carries the table's own name as header label
    /// and holds column names; `description_column` holds their descriptions.
    /// When a column name repeats, the later row wins.
    ///
    /// # Arguments
    /// * `client` - Spreadsheet to read from
    /// * `tracked_tables` - Names from the index sheet
    /// * `description_column` - Header label of the description column
    ///
    /// # Returns
    /// The index, or the first transport failure. Missing sheets and columns are
    /// logged and skipped.
    pub fn build<C: SpreadsheetClient + ?Sized>(
        client: &mut C,
        tracked_tables: &[String],
        description_column: &str,
    ) -> Result<DescriptionIndex, EnricherError> {
        let mut index = DescriptionIndex::default();
        let mut visited = HashSet::<&str>::new();
        for table_name in tracked_tables {
            if !visited.insert(table_name.as_str()) {
                continue;
            }

            let table = match client.read_sheet(table_name) {
                Ok(table) => table,
                Err(error) if as_spreadsheet_error(&error).is_some_and(SpreadsheetError::is_recoverable) => {
                    tracing::warn!(spreadsheet = client.id(), sheet = %table_name, "no description sheet for table");
                    continue;
                }
                Err(error) => return Err(error),
            };
            if table.is_empty() {
                tracing::debug!(sheet = %table_name, "description sheet is empty");
                continue;
            }

            let columns = [table_name.as_str(), description_column]
                .map(|label| table.column_index(label).ok_or(label));
            let (subject, description) = match columns {
                [Ok(subject), Ok(description)] => (subject, description),
                [Err(column), _] | [_, Err(column)] => {
                    let error = SpreadsheetError::MissingColumn {
                        sheet: table_name.to_owned(),
                        column: column.to_owned(),
                    };
                    tracing::warn!(spreadsheet = client.id(), %error, "skipping description sheet");
                    continue;
                }
            };

            let descriptions: HashMap<String, String> = table
                .rows()
                .iter()
                .map(|row| (row[subject].to_owned(), row[description].to_owned()))
                .collect();
            index.tables.insert(table_name.to_owned(), descriptions);
        }

        index.tables.retain(|table_name, descriptions| {
            let keep = descriptions.values().any(|description| !description.is_empty());
            if !keep {
                tracing::debug!(table = %table_name, "dropping table without descriptions");
            }
            keep
        });
        tracing::info!(spreadsheet = client.id(), tables = index.len(), "built description index");
        Ok(index)
    }

    /// Description of `column` in `table`, possibly empty
    pub fn get(&self, table: &str, column: &str) -> Option<&str> {
        self.tables.get(table)?.get(column).map(String::as_str)
    }

    /// All descriptions of one table
    pub fn table(&self, table: &str) -> Option<&HashMap<String, String>> {
        self.tables.get(table)
    }

    /// Indexed table names, in no particular order
    pub fn tables(&self) -> impl Iterator<Item = &str> + '_ {
        self.tables.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}
