//! The `set-average-moving` use case: validate, fetch, plan, write.

use crate::cell::CellValue;
use crate::error::{AverageMovingError, WriteStage};
use crate::gateway::SpreadsheetGateway;
use crate::plan::{plan_average_moving, AVERAGE_MOVING_COLUMN};
use crate::range::RangeRef;

/// What a successful run wrote.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub data_range: RangeRef,
    pub rows_written: usize,
    pub header_created: bool,
}

/// Recompute the "Average Moving" column of `sheet_name` and write it back.
///
/// At most four gateway calls, strictly in order: reachability check, grid
/// fetch, header write (only when the column is new), data write. Grid
/// validation runs before the first write.
pub fn run<G>(
    gateway: &mut G,
    spreadsheet_id: &str,
    sheet_name: &str,
) -> Result<RunSummary, AverageMovingError>
where
    G: SpreadsheetGateway + ?Sized,
{
    log::debug!("checking spreadsheet {}", spreadsheet_id);
    gateway
        .validate_reachable(spreadsheet_id)
        .map_err(|e| AverageMovingError::SpreadsheetUnavailable { source: Box::new(e) })?;

    log::debug!("fetching values of sheet {:?}", sheet_name);
    let grid = gateway
        .fetch_grid(spreadsheet_id, sheet_name)
        .map_err(|e| AverageMovingError::Fetch { source: Box::new(e) })?;
    log::debug!("fetched {} rows", grid.len());

    let plan = plan_average_moving(&grid, sheet_name)?;

    if let Some(header_range) = &plan.header_write {
        log::info!("creating {:?} column at {}", AVERAGE_MOVING_COLUMN, header_range);
        gateway
            .write_cell(spreadsheet_id, header_range, CellValue::from(AVERAGE_MOVING_COLUMN))
            .map_err(|e| AverageMovingError::Write {
                stage: WriteStage::Header,
                range: header_range.to_string(),
                source: Box::new(e),
            })?;
    }

    let values: Vec<CellValue> = plan.rows.iter().map(|[delta]| CellValue::from(*delta)).collect();
    log::debug!("writing {} values to {}", values.len(), plan.data_range);
    gateway
        .write_column(spreadsheet_id, &plan.data_range, &values)
        .map_err(|e| AverageMovingError::Write {
            stage: WriteStage::Values,
            range: plan.data_range.to_string(),
            source: Box::new(e),
        })?;

    log::info!("wrote {} values to {}", values.len(), plan.data_range);

    Ok(RunSummary {
        header_created: plan.creates_column(),
        rows_written: values.len(),
        data_range: plan.data_range,
    })
}
