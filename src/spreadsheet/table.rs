use std::collections::HashSet;

/// A sheet normalized so that every row has exactly as many cells as the header.
///
/// The first source row becomes the header. Rows wider than the header extend it
/// with synthesized `Column_N` labels (N is the zero-based column position); rows
/// narrower than the header are padded with empty strings. Row order is kept and
/// no row is dropped.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RectangularTable {
    header: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl RectangularTable {
    /// Prefix of header labels synthesized for columns the header does not name
    pub const SYNTHESIZED_PREFIX: &'static str = "Column_";

    /// Builds a table from raw, possibly ragged rows. The first row is the header.
    pub fn from_rows(values: Vec<Vec<String>>) -> Self {
        let mut values = values.into_iter();
        let Some(mut header) = values.next() else {
            return Self::default();
        };
        let mut rows: Vec<Vec<String>> = values.collect();

        let width = rows.iter().map(Vec::len).fold(header.len(), usize::max);
        if header.len() < width {
            let mut taken: HashSet<String> = header.iter().cloned().collect();
            for index in header.len()..width {
                let label = synthesize_label(index, &taken);
                taken.insert(label.clone());
                header.push(label);
            }
        }
        for row in &mut rows {
            row.resize(width, String::new());
        }

        RectangularTable { header, rows }
    }

    /// Header labels, including synthesized ones
    pub fn header(&self) -> &[String] {
        &self.header
    }

    /// Data rows (header excluded), each exactly `header().len()` cells wide
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Number of data rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// True when the table holds no data cell: header-only or fully empty sheets.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty() || self.header.is_empty()
    }

    /// Position of the first header cell labelled `name`
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.header.iter().position(|label| label == name)
    }

    /// Values of the column labelled `name`, in row order
    pub fn column(&self, name: &str) -> Option<impl Iterator<Item = &str> + '_> {
        let index = self.column_index(name)?;
        Some(self.rows.iter().map(move |row| row[index].as_str()))
    }
}

/// Picks `Column_{index}`, suffixed with `_1`, `_2`... while it collides with a taken label.
fn synthesize_label(index: usize, taken: &HashSet<String>) -> String {
    let base = format!("{}{}", RectangularTable::SYNTHESIZED_PREFIX, index);
    if !taken.contains(&base) {
        return base;
    }
    (1..)
        .map(|suffix| format!("{base}_{suffix}"))
        .find(|label| !taken.contains(label))
        .unwrap_or(base)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(values: &[&[&str]]) -> Vec<Vec<String>> {
        values
            .iter()
            .map(|row| row.iter().map(|cell| cell.to_string()).collect())
            .collect()
    }

    #[test]
    fn empty_input_is_empty_table() {
        let table = RectangularTable::from_rows(Vec::new());
        assert!(table.is_empty());
        assert!(table.header().is_empty());
        assert_eq!(table.len(), 0);
    }

    #[test]
    fn header_only_has_zero_records() {
        let table = RectangularTable::from_rows(rows(&[&["Table", "Owner"]]));
        assert!(table.is_empty());
        assert_eq!(table.header(), &["Table", "Owner"]);
    }

    #[test]
    fn short_rows_are_padded() {
        let table = RectangularTable::from_rows(rows(&[&["a", "b", "c"], &["1"], &["1", "2", "3"], &[]]));
        assert_eq!(table.len(), 3);
        assert_eq!(table.rows()[0], vec!["1", "", ""]);
        assert_eq!(table.rows()[1], vec!["1", "2", "3"]);
        assert_eq!(table.rows()[2], vec!["", "", ""]);
    }

    #[test]
    fn wide_rows_extend_header() {
        let table = RectangularTable::from_rows(rows(&[&["a"], &["1", "2", "3"], &["4"]]));
        assert_eq!(table.header(), &["a", "Column_1", "Column_2"]);
        for row in table.rows() {
            assert_eq!(row.len(), table.header().len());
        }
        assert_eq!(table.rows()[1], vec!["4", "", ""]);
    }

    #[test]
    fn synthesized_labels_avoid_existing_headers() {
        let table = RectangularTable::from_rows(rows(&[&["Column_2", "b"], &["1", "2", "3", "4"]]));
        assert_eq!(table.header(), &["Column_2", "b", "Column_2_1", "Column_3"]);

        let unique: HashSet<&String> = table.header().iter().collect();
        assert_eq!(unique.len(), table.header().len());
    }

    #[test]
    fn row_order_is_preserved() {
        let table = RectangularTable::from_rows(rows(&[&["n"], &["3"], &["1", "x"], &["2"]]));
        let values: Vec<&str> = table.column("n").unwrap().collect();
        assert_eq!(values, vec!["3", "1", "2"]);
    }

    #[test]
    fn column_lookup_uses_first_match() {
        let table = RectangularTable::from_rows(rows(&[&["k", "k"], &["first", "second"]]));
        assert_eq!(table.column_index("k"), Some(0));
        assert!(table.column("missing").is_none());
    }
}
