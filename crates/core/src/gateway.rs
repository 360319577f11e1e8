use crate::cell::CellValue;
use crate::grid::Grid;
use crate::range::RangeRef;

/// Authenticated access to a remote spreadsheet.
///
/// The core never touches transport: it asks the gateway for a grid and
/// hands it ranges to write. Errors are opaque to the core; it only wraps
/// them with context.
pub trait SpreadsheetGateway {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Fail if the spreadsheet cannot be opened.
    fn validate_reachable(&mut self, spreadsheet_id: &str) -> Result<(), Self::Error>;

    /// Every populated row of `sheet_name`, header first.
    fn fetch_grid(&mut self, spreadsheet_id: &str, sheet_name: &str) -> Result<Grid, Self::Error>;

    /// Overwrite `range` with one value per row.
    fn write_column(
        &mut self,
        spreadsheet_id: &str,
        range: &RangeRef,
        rows: &[CellValue],
    ) -> Result<(), Self::Error>;

    fn write_cell(
        &mut self,
        spreadsheet_id: &str,
        range: &RangeRef,
        value: CellValue,
    ) -> Result<(), Self::Error> {
        self.write_column(spreadsheet_id, range, std::slice::from_ref(&value))
    }
}
