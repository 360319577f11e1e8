//! A1-notation range references (`Sheet1!C2:C4`).

use std::borrow::Cow;
use std::fmt;

use crate::columns::{col_to_letters, letters_to_col};

/// A single-column range on one sheet. Rows are 1-based, as in A1 notation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeRef {
    pub sheet: String,
    /// 0-based column index
    pub col: usize,
    pub start_row: usize,
    /// `None` for a single cell
    pub end_row: Option<usize>,
}

impl RangeRef {
    pub fn cell(sheet: impl Into<String>, col: usize, row: usize) -> Self {
        Self { sheet: sheet.into(), col, start_row: row, end_row: None }
    }

    pub fn column(sheet: impl Into<String>, col: usize, start_row: usize, end_row: usize) -> Self {
        Self { sheet: sheet.into(), col, start_row, end_row: Some(end_row) }
    }

    pub fn col_letters(&self) -> String {
        col_to_letters(self.col)
    }

    /// Parse `Sheet!C2`, `Sheet!C2:C4` or `'My Sheet'!C2:C4`.
    ///
    /// Only single-column ranges are understood; anything else is `None`.
    pub fn parse(s: &str) -> Option<Self> {
        let (sheet, cells) = match s.strip_prefix('\'') {
            Some(rest) => {
                let end = rest.rfind("'!")?;
                (rest[..end].replace("''", "'"), &rest[end + 2..])
            }
            None => {
                let (sheet, cells) = s.split_once('!')?;
                (sheet.to_string(), cells)
            }
        };

        match cells.split_once(':') {
            None => {
                let (col, row) = parse_cell(cells)?;
                Some(Self::cell(sheet, col, row))
            }
            Some((start, end)) => {
                let (col, start_row) = parse_cell(start)?;
                let (end_col, end_row) = parse_cell(end)?;
                (col == end_col).then(|| Self::column(sheet, col, start_row, end_row))
            }
        }
    }

    /// Number of rows covered (1 for a single cell).
    pub fn row_count(&self) -> usize {
        match self.end_row {
            Some(end) if end >= self.start_row => end - self.start_row + 1,
            Some(_) => 0,
            None => 1,
        }
    }
}

impl fmt::Display for RangeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let letters = self.col_letters();
        write!(f, "{}!{}{}", quote_sheet_name(&self.sheet), letters, self.start_row)?;
        if let Some(end) = self.end_row {
            write!(f, ":{}{}", letters, end)?;
        }
        Ok(())
    }
}

// `C2` -> (2, 2). Rows are 1-based.
fn parse_cell(cell: &str) -> Option<(usize, usize)> {
    let split = cell.find(|c: char| !c.is_ascii_alphabetic())?;
    let (letters, digits) = cell.split_at(split);
    let row: usize = digits.parse().ok()?;
    if row == 0 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some((letters_to_col(letters)?, row))
}

/// Sheet name as it must appear in A1 notation.
///
/// Plain identifiers pass through untouched. Anything else is wrapped in
/// single quotes with embedded quotes doubled: `My Sheet` -> `'My Sheet'`,
/// `Bob's` -> `'Bob''s'`. Names the API would read as a cell reference
/// (`Q3`, `AB12`, `R1C1`) or that start with a digit are quoted too, so
/// `Q3` -> `'Q3'` selects the sheet and not cell Q3 of the first sheet.
pub fn quote_sheet_name(name: &str) -> Cow<'_, str> {
    let plain = !name.is_empty()
        && name.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_')
        && !name.starts_with(|c: char| c.is_ascii_digit())
        && !looks_like_a1(name)
        && !looks_like_r1c1(name);
    if plain {
        Cow::Borrowed(name)
    } else {
        Cow::Owned(format!("'{}'", name.replace('\'', "''")))
    }
}

// `Q3`, `ab12`, `XFD1048576`: one to three letters then digits.
fn looks_like_a1(name: &str) -> bool {
    let letters = name.bytes().take_while(u8::is_ascii_alphabetic).count();
    (1..=3).contains(&letters)
        && name.len() > letters
        && name.bytes().skip(letters).all(|b| b.is_ascii_digit())
}

// `R1C1`, `R2`, `C3`, `RC`, `R`, `C`, in either case.
fn looks_like_r1c1(name: &str) -> bool {
    let rest = name.trim_start_matches(['R', 'r']);
    if rest.len() + 1 < name.len() {
        return false;
    }
    let rest = rest.trim_start_matches(|c: char| c.is_ascii_digit());
    let rest = match rest.strip_prefix(['C', 'c']) {
        Some(after) => after.trim_start_matches(|c: char| c.is_ascii_digit()),
        None => rest,
    };
    rest.is_empty()
}
