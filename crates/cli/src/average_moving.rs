// set-average-moving: resolve inputs, open the Sheets client, run the job.

use std::path::PathBuf;

use avgmove_config::Settings;
use avgmove_core::{AverageMovingError, RunSummary};
use avgmove_sheets_client::{load_credentials, SheetsClient, SheetsError};

use crate::exit_codes::{self, run_exit_code, sheets_exit_code};
use crate::CliError;

/// Flag values for `set-average-moving`. `None` means "not given".
#[derive(Debug, Default)]
pub struct SetAverageMovingArgs {
    pub spreadsheet_id: Option<String>,
    pub sheet_name: Option<String>,
    pub credentials: Option<PathBuf>,
    pub access_token: Option<String>,
    pub quiet: bool,
}

/// Inputs after flag > env > settings > default resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolved {
    pub spreadsheet_id: String,
    pub sheet_name: String,
    pub auth: Auth,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Auth {
    AccessToken(String),
    Credentials(PathBuf),
}

/// Resolve flags against settings (which already carry env overrides).
pub fn resolve(args: &SetAverageMovingArgs, settings: &Settings) -> Result<Resolved, CliError> {
    let spreadsheet_id = non_empty(args.spreadsheet_id.as_deref())
        .or_else(|| non_empty(settings.spreadsheet_id.as_deref()))
        .ok_or_else(|| {
            CliError::args("missing spreadsheet id").with_hint(
                "use --spreadsheet-id, AVGMOVE_SPREADSHEET_ID or \"sheets.spreadsheetId\" in settings.json",
            )
        })?;

    let sheet_name = non_empty(args.sheet_name.as_deref())
        .or_else(|| non_empty(Some(&settings.sheet_name)))
        .unwrap_or_else(|| avgmove_config::settings::DEFAULT_SHEET_NAME.to_string());

    let auth = if let Some(token) = &args.access_token {
        let token = token.trim();
        if token.is_empty() {
            return Err(CliError {
                code: exit_codes::EXIT_SHEETS_NOT_AUTH,
                message: "missing Google access token (--access-token is empty)".into(),
                hint: None,
            });
        }
        Auth::AccessToken(token.to_string())
    } else {
        let path = match &args.credentials {
            Some(p) => p.clone(),
            None => settings.credentials_path(),
        };
        let expanded = shellexpand::tilde(&path.to_string_lossy()).to_string();
        Auth::Credentials(PathBuf::from(expanded))
    };

    Ok(Resolved { spreadsheet_id, sheet_name, auth })
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value.map(str::trim).filter(|v| !v.is_empty()).map(str::to_string)
}

/// Build the Sheets client for the resolved auth mode.
pub fn open_client(auth: &Auth, settings: &Settings) -> Result<SheetsClient, CliError> {
    let client = match auth {
        Auth::AccessToken(token) => SheetsClient::with_access_token(settings.api_base.clone(), token.clone()),
        Auth::Credentials(path) => {
            log::debug!("loading credentials from {}", path.display());
            let creds = load_credentials(path).map_err(CliError::sheets)?;
            SheetsClient::from_credentials(settings.api_base.clone(), creds, settings.token_uri.clone())
        }
    };
    client.map_err(CliError::sheets)
}

pub fn cmd_set_average_moving(args: SetAverageMovingArgs, settings: &Settings) -> Result<(), CliError> {
    let resolved = resolve(&args, settings)?;
    let mut client = open_client(&resolved.auth, settings)?;

    log::info!(
        "set-average-moving: spreadsheet {} sheet {:?}",
        resolved.spreadsheet_id,
        resolved.sheet_name,
    );

    let summary = avgmove_core::run(&mut client, &resolved.spreadsheet_id, &resolved.sheet_name)
        .map_err(CliError::run)?;

    if !args.quiet {
        eprintln!("{}", describe(&summary));
    }
    println!("Done!");
    Ok(())
}

fn describe(summary: &RunSummary) -> String {
    let mut line = format!("wrote {} values to {}", summary.rows_written, summary.data_range);
    if summary.header_created {
        line.push_str(&format!(" (created column {})", summary.data_range.col_letters()));
    }
    line
}

impl CliError {
    /// Error from the Sheets client, with its exit code and a hint where useful.
    pub fn sheets(err: SheetsError) -> Self {
        let hint = sheets_hint(&err);
        Self { code: sheets_exit_code(&err), message: err.to_string(), hint }
    }

    /// Error from a run; the message carries the whole cause chain.
    pub fn run(err: AverageMovingError) -> Self {
        let hint = match &err {
            AverageMovingError::InsufficientData { .. } => {
                Some("the sheet needs a header row and at least two data rows".to_string())
            }
            AverageMovingError::MissingColumn { .. } => {
                Some("the first row must contain \"Date\" and \"Visitors\" headers".to_string())
            }
            AverageMovingError::SpreadsheetUnavailable { source }
            | AverageMovingError::Fetch { source }
            | AverageMovingError::Write { source, .. } => {
                source.downcast_ref::<SheetsError>().and_then(sheets_hint)
            }
        };
        Self { code: run_exit_code(&err), message: err.chain_message(), hint }
    }
}

fn sheets_hint(err: &SheetsError) -> Option<String> {
    match err {
        SheetsError::NotAuthenticated(_) => {
            Some("use --access-token or --credentials <key.json>".to_string())
        }
        SheetsError::TokenRefresh(_) => {
            Some("token request rejected; re-run `gcloud auth application-default login` or check the service account key".to_string())
        }
        SheetsError::Auth(..) => Some("check that the account can edit this spreadsheet".to_string()),
        SheetsError::NotFound(_) => Some("check --spreadsheet-id and --sheet-name".to_string()),
        _ => None,
    }
}
