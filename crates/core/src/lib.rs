//! Average Moving core.
//!
//! Everything here is transport-free: the grid model, numeric coercion,
//! column resolution, A1 range references, delta computation and the
//! orchestration that drives a [`gateway::SpreadsheetGateway`].

pub mod cell;
pub mod columns;
pub mod delta;
pub mod error;
pub mod gateway;
pub mod grid;
pub mod plan;
pub mod range;
pub mod run;

pub use cell::{coerce_to_int, CellValue};
pub use columns::{col_to_letters, find_column, letters_to_col, require_column};
pub use delta::{compute_deltas, DeltaRow};
pub use error::{AverageMovingError, GatewayError, WriteStage};
pub use gateway::SpreadsheetGateway;
pub use grid::Grid;
pub use plan::{
    plan_average_moving, WritePlan, AVERAGE_MOVING_COLUMN, DATE_COLUMN, MIN_GRID_ROWS,
    VISITORS_COLUMN,
};
pub use range::{quote_sheet_name, RangeRef};
pub use run::{run, RunSummary};
