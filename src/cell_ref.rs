//! Default label strings and "A1"-style cell references.

use crate::block::Block;
use crate::coords::Coords;

/// Column label for a 0-indexed column: `0 -> "A"`, `25 -> "Z"`, `26 -> "AA"`.
pub fn col_letters(col: i32) -> String {
    if col < 0 {
        return String::new();
    }
    let mut n = i64::from(col) + 1;
    let mut letters = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        // rem is in 0..26
        letters.push(char::from(b'A' + u8::try_from(rem).unwrap_or(0)));
        n = (n - 1) / 26;
    }
    letters.iter().rev().collect()
}

/// Row label for a 0-indexed row: `0 -> "1"`.
pub fn row_number(row: i32) -> String {
    if row < 0 {
        return String::new();
    }
    (i64::from(row) + 1).to_string()
}

/// Parse a cell reference like "B3" into 0-indexed coords `(2, 1)`.
pub fn parse_cell_ref(cell_ref: &str) -> Option<Coords> {
    let mut col: i64 = 0;
    let mut row: i64 = 0;
    let mut saw_col = false;
    let mut saw_row = false;

    for ch in cell_ref.trim().chars() {
        if ch == '$' {
            continue;
        }
        if ch.is_ascii_alphabetic() {
            if saw_row {
                return None;
            }
            let upper = ch.to_ascii_uppercase();
            col = col * 26 + i64::from(u32::from(upper) - u32::from('A') + 1);
            saw_col = true;
        } else if let Some(digit) = ch.to_digit(10) {
            row = row * 10 + i64::from(digit);
            saw_row = true;
        } else {
            return None;
        }
        if col > i64::from(i32::MAX) || row > i64::from(i32::MAX) {
            return None;
        }
    }

    if !saw_col || !saw_row || row == 0 {
        return None;
    }

    let row = i32::try_from(row - 1).ok()?;
    let col = i32::try_from(col - 1).ok()?;
    Some(Coords::new(row, col))
}

/// Parse a range like "A1:B10" or a single "A1" into a [`Block`].
pub fn parse_cell_range(range: &str) -> Option<Block> {
    if let Some((start, end)) = range.split_once(':') {
        let a = parse_cell_ref(start)?;
        let b = parse_cell_ref(end)?;
        Some(Block::from_corners(a, b))
    } else {
        let a = parse_cell_ref(range)?;
        Some(Block::from_corners(a, a))
    }
}

/// Format grid coords as an "A1"-style reference. Label cells yield `None`.
pub fn to_cell_ref(coords: Coords) -> Option<String> {
    if !coords.is_grid_cell() {
        return None;
    }
    Some(format!("{}{}", col_letters(coords.col), row_number(coords.row)))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(0, "A")]
    #[test_case(25, "Z")]
    #[test_case(26, "AA")]
    #[test_case(51, "AZ")]
    #[test_case(52, "BA")]
    #[test_case(701, "ZZ")]
    #[test_case(702, "AAA")]
    fn test_col_letters(col: i32, expected: &str) {
        assert_eq!(col_letters(col), expected);
    }

    #[test]
    fn test_row_number() {
        assert_eq!(row_number(0), "1");
        assert_eq!(row_number(99), "100");
        assert_eq!(row_number(-1), "");
    }

    #[test]
    fn test_parse_cell_ref() {
        assert_eq!(parse_cell_ref("A1"), Some(Coords::new(0, 0)));
        assert_eq!(parse_cell_ref("b3"), Some(Coords::new(2, 1)));
        assert_eq!(parse_cell_ref("$AA$10"), Some(Coords::new(9, 26)));
        assert_eq!(parse_cell_ref("A0"), None);
        assert_eq!(parse_cell_ref("1A"), None);
        assert_eq!(parse_cell_ref(""), None);
    }

    #[test]
    fn test_parse_cell_range() {
        assert_eq!(parse_cell_range("B2:A1"), Some(Block::new(0, 0, 2, 2)));
        assert_eq!(parse_cell_range("C4"), Some(Block::new(3, 2, 1, 1)));
        assert_eq!(parse_cell_range("C4:"), None);
    }

    #[test]
    fn test_round_trip_reference() {
        let coords = Coords::new(41, 27);
        let text = to_cell_ref(coords).unwrap();
        assert_eq!(text, "AB42");
        assert_eq!(parse_cell_ref(&text), Some(coords));
        assert_eq!(to_cell_ref(Coords::row_label(3)), None);
    }
}
