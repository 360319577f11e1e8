use avgmove_core::{quote_sheet_name, CellValue, Grid, RangeRef, SpreadsheetGateway};

use crate::client::{SheetsClient, SheetsError};

impl SpreadsheetGateway for SheetsClient {
    type Error = SheetsError;

    fn validate_reachable(&mut self, spreadsheet_id: &str) -> Result<(), SheetsError> {
        self.get_spreadsheet(spreadsheet_id).map(|_| ())
    }

    fn fetch_grid(&mut self, spreadsheet_id: &str, sheet_name: &str) -> Result<Grid, SheetsError> {
        // A bare sheet name selects every populated cell of that sheet.
        self.get_values(spreadsheet_id, &quote_sheet_name(sheet_name))
    }

    fn write_column(
        &mut self,
        spreadsheet_id: &str,
        range: &RangeRef,
        rows: &[CellValue],
    ) -> Result<(), SheetsError> {
        let rows: Vec<Vec<CellValue>> = rows.iter().map(|v| vec![v.clone()]).collect();
        let resp = self.update_values(spreadsheet_id, &range.to_string(), &rows)?;
        if resp.updated_range.is_empty() {
            log::debug!("updated {} cells in {}", resp.updated_cells, range);
            return Ok(());
        }

        log::debug!("updated {} cells in {}", resp.updated_cells, resp.updated_range);
        if !written_within(range, &resp.updated_range) {
            log::warn!("requested write to {} but the API updated {}", range, resp.updated_range);
        }
        Ok(())
    }
}

/// True when `updated` (as echoed by the API) lies inside `requested`.
///
/// Trailing empty cells are not counted by the API, so the echoed range may
/// end earlier than the one requested.
fn written_within(requested: &RangeRef, updated: &str) -> bool {
    let Some(actual) = RangeRef::parse(updated) else {
        return false;
    };
    let requested_end = requested.end_row.unwrap_or(requested.start_row);
    let actual_end = actual.end_row.unwrap_or(actual.start_row);
    actual.sheet == requested.sheet
        && actual.col == requested.col
        && actual.start_row == requested.start_row
        && actual_end <= requested_end
}
