use crate::spreadsheet::reference::index_to_reference;
use std::fmt::Display;

/// Types of cell data found in `.xlsx` worksheets.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub(crate) enum CellType {
    #[default]
    Empty,
    /// Boolean values stored as `0`/`1`
    Boolean,
    /// Numeric values, kept in their stored textual form
    Number,
    /// ISO 8601 date/time strings
    IsoDateTime,
    /// Inline or formula string values
    InlineString,
    /// Shared string table references, resolved while reading
    SharedString,
    /// Error values such as `#N/A`
    Error,
}

impl CellType {
    /// Maps the `t` attribute of a `<c>` element to a cell type.
    pub(crate) fn from_attribute(value: Option<&str>) -> Self {
        match value {
            Some("inlineStr") | Some("str") => CellType::InlineString,
            Some("s") => CellType::SharedString,
            Some("d") => CellType::IsoDateTime,
            Some("b") => CellType::Boolean,
            Some("e") => CellType::Error,
            _ => CellType::Number,
        }
    }
}

/// A single non-empty worksheet cell with its position.
#[derive(Clone, Debug)]
pub(crate) struct Cell {
    /// Row index (0-based)
    pub(crate) row: usize,
    /// Column index (0-based)
    pub(crate) col: usize,
    /// Cell data type
    pub(crate) kind: CellType,
    /// Cell value as string, shared strings already resolved
    pub(crate) value: String,
}

impl Cell {
    /// Returns the A1-style reference of this cell.
    pub(crate) fn reference(&self) -> String {
        index_to_reference(self.row, self.col)
    }
}

impl Display for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.kind {
            CellType::Boolean => write!(f, "{}", if self.value == "1" { "TRUE" } else { "FALSE" }),
            CellType::IsoDateTime => write!(f, "{}", self.value.replace('T', " ")),
            _ => write!(f, "{}", self.value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cell(kind: CellType, value: &str) -> Cell {
        Cell { row: 1, col: 2, kind, value: value.to_owned() }
    }

    #[test]
    fn type_from_attribute() {
        assert_eq!(CellType::from_attribute(Some("s")), CellType::SharedString);
        assert_eq!(CellType::from_attribute(Some("str")), CellType::InlineString);
        assert_eq!(CellType::from_attribute(Some("b")), CellType::Boolean);
        assert_eq!(CellType::from_attribute(None), CellType::Number);
    }

    #[test]
    fn display_renders_text() {
        assert_eq!(cell(CellType::Boolean, "1").to_string(), "TRUE");
        assert_eq!(cell(CellType::Boolean, "0").to_string(), "FALSE");
        assert_eq!(cell(CellType::IsoDateTime, "2024-05-01T10:00:00").to_string(), "2024-05-01 10:00:00");
        assert_eq!(cell(CellType::Number, "42.5").to_string(), "42.5");
        assert_eq!(cell(CellType::SharedString, "Primary key").reference(), "C2");
    }
}
