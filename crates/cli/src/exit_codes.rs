//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Cron wrappers branch on these codes, so treat them as a stable contract.
//!
//! # Exit Code Ranges
//!
//! | Range   | Domain           | Description                              |
//! |---------|------------------|------------------------------------------|
//! | 0       | Universal        | Success                                  |
//! | 1       | Universal        | General error (unspecified)              |
//! | 2       | Universal        | CLI usage error (bad args, bad settings) |
//! | 50-59   | sheets           | Google Sheets access                     |
//! | 60-69   | data             | Sheet contents unusable                  |
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant in the appropriate range
//! 2. Document what triggers it
//! 3. Update the table above
//! 4. Wire it into the relevant command's error handling

// =============================================================================
// Universal (0-2)
// =============================================================================

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, missing spreadsheet id, unreadable settings.
pub const EXIT_USAGE: u8 = 2;

// =============================================================================
// Sheets (50-59)
// =============================================================================

/// No credentials (no access token, credentials file missing or invalid).
pub const EXIT_SHEETS_NOT_AUTH: u8 = 50;

/// Auth rejected (token refresh failed, 401/403).
pub const EXIT_SHEETS_AUTH: u8 = 51;

/// Request rejected by the API (400, other 4xx).
pub const EXIT_SHEETS_VALIDATION: u8 = 52;

/// Spreadsheet, sheet or range not found (404).
pub const EXIT_SHEETS_NOT_FOUND: u8 = 53;

/// Upstream error (5xx, 429), network failure, or unreadable response.
pub const EXIT_SHEETS_UPSTREAM: u8 = 54;

// =============================================================================
// Data (60-69)
// =============================================================================

/// Fewer than a header and two data rows.
pub const EXIT_DATA_INSUFFICIENT: u8 = 60;

/// "Date" or "Visitors" header missing.
pub const EXIT_DATA_MISSING_COLUMN: u8 = 61;

// =============================================================================
// Error mapping
// =============================================================================

use avgmove_core::AverageMovingError;
use avgmove_sheets_client::SheetsError;

/// Map a Sheets client error to its exit code.
pub fn sheets_exit_code(err: &SheetsError) -> u8 {
    match err {
        SheetsError::NotAuthenticated(_) => EXIT_SHEETS_NOT_AUTH,
        SheetsError::TokenRefresh(_) | SheetsError::Auth(..) => EXIT_SHEETS_AUTH,
        SheetsError::Validation(..) => EXIT_SHEETS_VALIDATION,
        SheetsError::NotFound(_) => EXIT_SHEETS_NOT_FOUND,
        SheetsError::Http(..) | SheetsError::Network(_) | SheetsError::Parse(_) => {
            EXIT_SHEETS_UPSTREAM
        }
        SheetsError::InvalidUrl(_) => EXIT_USAGE,
    }
}

/// Map a run failure to its exit code. Gateway failures take the code of
/// the underlying Sheets error.
pub fn run_exit_code(err: &AverageMovingError) -> u8 {
    match err {
        AverageMovingError::InsufficientData { .. } => EXIT_DATA_INSUFFICIENT,
        AverageMovingError::MissingColumn { .. } => EXIT_DATA_MISSING_COLUMN,
        AverageMovingError::SpreadsheetUnavailable { source }
        | AverageMovingError::Fetch { source }
        | AverageMovingError::Write { source, .. } => source
            .downcast_ref::<SheetsError>()
            .map(sheets_exit_code)
            .unwrap_or(EXIT_ERROR),
    }
}
