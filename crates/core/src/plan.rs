//! Turn a fetched grid into the writes a run performs.

use crate::columns::{find_column, require_column};
use crate::delta::{compute_deltas, DeltaRow};
use crate::error::AverageMovingError;
use crate::grid::Grid;
use crate::range::RangeRef;

pub const DATE_COLUMN: &str = "Date";
pub const VISITORS_COLUMN: &str = "Visitors";
pub const AVERAGE_MOVING_COLUMN: &str = "Average Moving";

/// Header plus at least two data rows.
pub const MIN_GRID_ROWS: usize = 3;

/// Writes derived from one grid.
#[derive(Debug, Clone, PartialEq)]
pub struct WritePlan {
    /// Where to write the "Average Moving" header when the column is new.
    pub header_write: Option<RangeRef>,
    /// Rows 2..=N of the output column.
    pub data_range: RangeRef,
    pub rows: Vec<DeltaRow>,
}

impl WritePlan {
    pub fn creates_column(&self) -> bool {
        self.header_write.is_some()
    }
}

/// Validate `grid` and compute everything that will be written.
///
/// All validation happens here, so a plan only exists once the grid is
/// known to be usable; a failed precondition never leads to a write.
pub fn plan_average_moving(grid: &Grid, sheet_name: &str) -> Result<WritePlan, AverageMovingError> {
    if grid.len() < MIN_GRID_ROWS {
        return Err(AverageMovingError::InsufficientData { rows: grid.len() });
    }

    let header = grid.header();
    require_column(header, DATE_COLUMN)?;
    let visitors_col = require_column(header, VISITORS_COLUMN)?;

    let (output_col, header_write) = match find_column(header, AVERAGE_MOVING_COLUMN) {
        Some(col) => (col, None),
        None => {
            let col = header.len();
            (col, Some(RangeRef::cell(sheet_name, col, 1)))
        }
    };

    let rows = compute_deltas(grid.data_rows(), visitors_col);
    let data_range = RangeRef::column(sheet_name, output_col, 2, grid.len());

    Ok(WritePlan { header_write, data_range, rows })
}
