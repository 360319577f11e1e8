//! Header lookup and column lettering.

use crate::cell::CellValue;
use crate::error::AverageMovingError;

/// Index of the first header cell equal to `name`, if any.
pub fn find_column(header: &[CellValue], name: &str) -> Option<usize> {
    header.iter().position(|cell| cell.as_text() == Some(name))
}

/// Like [`find_column`], but a missing column is an error naming it.
pub fn require_column(header: &[CellValue], name: &str) -> Result<usize, AverageMovingError> {
    find_column(header, name).ok_or_else(|| AverageMovingError::MissingColumn {
        column: name.to_string(),
    })
}

/// Convert a 0-based column index to sheet letters (0 -> A, 25 -> Z, 26 -> AA).
///
/// Bijective base-26: there is no zero digit, so Z rolls over to AA.
pub fn col_to_letters(col: usize) -> String {
    let mut n = col + 1;
    let mut letters = Vec::new();
    while n > 0 {
        let remainder = (n - 1) % 26;
        letters.push(b'A' + remainder as u8);
        n = (n - remainder) / 26;
    }
    letters.reverse();
    String::from_utf8(letters).unwrap_or_default()
}

/// Inverse of [`col_to_letters`]. Case-insensitive; `None` for empty input,
/// non-letters, or values that overflow `usize`.
pub fn letters_to_col(letters: &str) -> Option<usize> {
    if letters.is_empty() {
        return None;
    }
    let mut n: usize = 0;
    for b in letters.bytes() {
        if !b.is_ascii_alphabetic() {
            return None;
        }
        let digit = (b.to_ascii_uppercase() - b'A') as usize + 1;
        n = n.checked_mul(26)?.checked_add(digit)?;
    }
    Some(n - 1)
}
