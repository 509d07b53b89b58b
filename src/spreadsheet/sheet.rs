use crate::spreadsheet::cell::Cell;

/// Cells collected from one worksheet, in document order.
pub(crate) struct Sheet {
    /// Sheet name
    pub(crate) name: String,
    /// Non-empty cells
    pub(crate) cells: Vec<Cell>,
}

impl Sheet {
    pub(crate) fn new(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            cells: Vec::new(),
        }
    }

    pub(crate) fn push(&mut self, cell: Cell) {
        self.cells.push(cell);
    }

    /// Lays the cells out as rows anchored at `A1`.
    ///
    /// Gaps before a cell are filled with empty strings; each row ends at its last
    /// non-empty cell, so rows come out ragged the way the Sheets API returns them.
    pub(crate) fn into_rows(self) -> Vec<Vec<String>> {
        let height = self.cells.iter().map(|cell| cell.row + 1).max().unwrap_or(0);
        let mut rows: Vec<Vec<String>> = vec![Vec::new(); height];
        for cell in self.cells {
            let text = cell.to_string();
            let row = &mut rows[cell.row];
            if row.len() <= cell.col {
                row.resize(cell.col + 1, String::new());
            }
            row[cell.col] = text;
        }
        rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spreadsheet::cell::CellType;

    fn push(sheet: &mut Sheet, row: usize, col: usize, value: &str) {
        sheet.push(Cell {
            row,
            col,
            kind: CellType::InlineString,
            value: value.to_owned(),
        });
    }

    #[test]
    fn sheet_initial() {
        let sheet = Sheet::new("orders");
        assert!(sheet.cells.is_empty());
        assert_eq!(sheet.name, "orders");
        assert!(sheet.into_rows().is_empty());
    }

    #[test]
    fn sparse_cells_become_ragged_rows() {
        let mut sheet = Sheet::new("orders");
        push(&mut sheet, 0, 0, "orders");
        push(&mut sheet, 0, 1, "Description");
        push(&mut sheet, 2, 1, "Primary key");
        push(&mut sheet, 3, 0, "amount");

        let rows = sheet.into_rows();
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[0], vec!["orders", "Description"]);
        assert!(rows[1].is_empty());
        assert_eq!(rows[2], vec!["", "Primary key"]);
        assert_eq!(rows[3], vec!["amount"]);
    }
}
