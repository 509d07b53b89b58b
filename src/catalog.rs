//! Tracked tables listed on the index sheet.
use crate::error::EnricherError;
use crate::spreadsheet::as_spreadsheet_error;
use crate::spreadsheet::SpreadsheetClient;
use crate::spreadsheet::SpreadsheetError;

/// Returns the values of `column` on `index_sheet`, in row order.
///
/// Duplicates and empty strings are returned unchanged. A missing sheet, an
/// empty sheet or a missing column is logged and yields an empty list.
///
/// # Errors
///
/// Transport failures ([`SpreadsheetError::Unavailable`]) are propagated.
pub fn list_tracked_tables<C: SpreadsheetClient + ?Sized>(
    client: &mut C,
    index_sheet: &str,
    column: &str,
) -> Result<Vec<String>, EnricherError> {
    let table = match client.read_sheet(index_sheet) {
        Ok(table) => table,
        Err(error) if as_spreadsheet_error(&error).is_some_and(SpreadsheetError::is_recoverable) => {
            tracing::warn!(spreadsheet = client.id(), sheet = index_sheet, "index sheet not found");
            return Ok(Vec::new());
        }
        Err(error) => return Err(error),
    };

    if table.is_empty() {
        tracing::warn!(spreadsheet = client.id(), sheet = index_sheet, "index sheet is empty");
        return Ok(Vec::new());
    }

    let tables = match table.column(column) {
        Some(values) => {
            let tables: Vec<String> = values.map(str::to_owned).collect();
            tracing::info!(spreadsheet = client.id(), tables = tables.len(), "listed tracked tables");
            Ok(tables)
        }
        None => {
            let error = SpreadsheetError::MissingColumn {
                sheet: index_sheet.to_owned(),
                column: column.to_owned(),
            };
            tracing::warn!(spreadsheet = client.id(), %error, "index sheet has no table column");
            Ok(Vec::new())
        }
    };
    tables
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spreadsheet::MemorySpreadsheet;

    #[test]
    fn lists_values_in_row_order() {
        let mut client = MemorySpreadsheet::new("memory").with_sheet(
            "Tables",
            [vec!["Table", "Owner"], vec!["orders", "ann"], vec!["", "bob"], vec!["orders"], vec!["users"]],
        );
        let tables = list_tracked_tables(&mut client, "Tables", "Table").unwrap();
        assert_eq!(tables, vec!["orders", "", "orders", "users"]);
        assert_eq!(list_tracked_tables(&mut client, "Tables", "Table").unwrap(), tables);
    }

    #[test]
    fn missing_sheet_column_or_rows_yield_nothing() {
        let mut client = MemorySpreadsheet::new("memory")
            .with_sheet("Tables", [vec!["Table"]])
            .with_sheet("Other", [vec!["Name"], vec!["orders"]]);
        assert!(list_tracked_tables(&mut client, "Missing", "Table").unwrap().is_empty());
        assert!(list_tracked_tables(&mut client, "Tables", "Table").unwrap().is_empty());
        assert!(list_tracked_tables(&mut client, "Other", "Table").unwrap().is_empty());
    }
}
