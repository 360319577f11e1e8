use crate::cell::{coerce_to_int, CellValue};

/// One output row: a single delta cell.
pub type DeltaRow = [i64; 1];

/// Day-over-day deltas of the `col` column, one row per data row.
///
/// The first data row has no predecessor and is measured against zero, so
/// the first output equals its own (coerced) value. For `k >= 1`, output `k`
/// is `value[k] - value[k - 1]`. Missing cells coerce to zero; subtraction
/// saturates.
pub fn compute_deltas(data_rows: &[Vec<CellValue>], col: usize) -> Vec<DeltaRow> {
    let mut previous = 0i64;
    data_rows
        .iter()
        .map(|row| {
            let current = row.get(col).map(coerce_to_int).unwrap_or(0);
            let delta = current.saturating_sub(previous);
            previous = current;
            [delta]
        })
        .collect()
}
