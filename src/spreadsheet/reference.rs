//! Conversions between A1-style cell references and zero-based indexes.

use regex::Regex;
use std::sync::OnceLock;

fn reference_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^\$?([A-Za-z]+)\$?(\d+)$").expect("Hardcode regex pattern"))
}

/// Converts column letters to a zero-based index: A = 0, Z = 25, AA = 26.
pub(crate) fn col_to_index(letters: &str) -> Option<usize> {
    if letters.is_empty() || !letters.chars().all(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    letters
        .to_ascii_uppercase()
        .chars()
        .map(|letter| letter as usize - 'A' as usize + 1)
        .try_fold(0usize, |index, digit| index.checked_mul(26)?.checked_add(digit))
        .map(|column| column - 1)
}

/// Converts a one-based row number to a zero-based index.
pub(crate) fn row_to_index(number: &str) -> Option<usize> {
    number
        .parse::<usize>()
        .ok()
        .filter(|row| *row > 0)
        .map(|row| row - 1)
}

/// Parses a reference such as `B3` into `(row, col)` indexes.
pub(crate) fn reference_to_index(reference: &str) -> Option<(usize, usize)> {
    let captures = reference_pattern().captures(reference)?;
    let col = col_to_index(captures.get(1)?.as_str())?;
    let row = row_to_index(captures.get(2)?.as_str())?;
    Some((row, col))
}

/// Formats zero-based `(row, col)` indexes as an A1 reference.
pub(crate) fn index_to_reference(row: usize, col: usize) -> String {
    let mut column = col + 1;
    let mut letters = Vec::new();
    while column > 0 {
        column -= 1;
        letters.push((b'A' + (column % 26) as u8) as char);
        column /= 26;
    }
    letters.iter().rev().collect::<String>() + &(row + 1).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_references() {
        assert_eq!(reference_to_index("A1"), Some((0, 0)));
        assert_eq!(reference_to_index("B3"), Some((2, 1)));
        assert_eq!(reference_to_index("AA10"), Some((9, 26)));
        assert_eq!(reference_to_index("$C$4"), Some((3, 2)));
        assert_eq!(reference_to_index("A0"), None);
        assert_eq!(reference_to_index("1A"), None);
        assert_eq!(col_to_index("XFD"), Some(16383));
        assert_eq!(col_to_index(&"Z".repeat(40)), None);
        assert_eq!(reference_to_index(&format!("{}1", "A".repeat(40))), None);
    }

    #[test]
    fn format_references() {
        assert_eq!(index_to_reference(0, 0), "A1");
        assert_eq!(index_to_reference(2, 1), "B3");
        assert_eq!(index_to_reference(9, 26), "AA10");
        assert_eq!(index_to_reference(0, 701), "ZZ1");
    }
}
