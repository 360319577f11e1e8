use serde::{Deserialize, Serialize};

use crate::cell::CellValue;

/// Rows fetched from a sheet: row 0 is the header, the rest are data rows.
///
/// Rows may be ragged. The values API drops trailing empty cells, so a data
/// row is often shorter than the header; [`Grid::cell`] reads past the end
/// as [`CellValue::Empty`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Grid {
    rows: Vec<Vec<CellValue>>,
}

static EMPTY: CellValue = CellValue::Empty;

impl Grid {
    pub fn new(rows: Vec<Vec<CellValue>>) -> Self {
        Self { rows }
    }

    /// Build a grid from raw JSON rows (the `values` array of a ValueRange).
    pub fn from_json_rows(rows: &[serde_json::Value]) -> Self {
        let rows = rows
            .iter()
            .map(|row| match row {
                serde_json::Value::Array(cells) => cells.iter().map(CellValue::from).collect(),
                other => vec![CellValue::from(other)],
            })
            .collect();
        Self { rows }
    }

    /// Total row count, header included.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn header(&self) -> &[CellValue] {
        self.rows.first().map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn data_rows(&self) -> &[Vec<CellValue>] {
        self.rows.get(1..).unwrap_or(&[])
    }

    pub fn cell(&self, row: usize, col: usize) -> &CellValue {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .unwrap_or(&EMPTY)
    }
}
