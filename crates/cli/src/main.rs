// avgmove - recompute the "Average Moving" column of a Google Sheets visitors log

mod average_moving;
mod exit_codes;
mod logging;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use avgmove_config::Settings;

use average_moving::{cmd_set_average_moving, SetAverageMovingArgs};
use exit_codes::{EXIT_SUCCESS, EXIT_USAGE};

#[derive(Parser)]
#[command(name = "avgmove")]
#[command(about = "Write day-over-day visitor deltas into a Google Sheet")]
#[command(version)]
#[command(subcommand_required = false)]
struct Cli {
    /// Settings file (default: <config dir>/avgmove/settings.json)
    #[arg(long, global = true, env = "AVGMOVE_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Calculate the Average Moving column for a spreadsheet
    #[command(alias = "app:set-average-moving")]
    #[command(after_help = "\
The sheet's first row must contain \"Date\" and \"Visitors\". The \"Average
Moving\" column is created after the last header if it does not exist.

Examples:
  avgmove set-average-moving --spreadsheet-id 1AbC... --sheet-name Traffic
  avgmove set-average-moving --spreadsheetId 1AbC... --access-token \"$(gcloud auth print-access-token)\"
  AVGMOVE_SPREADSHEET_ID=1AbC... avgmove set-average-moving")]
    SetAverageMoving {
        /// Spreadsheet id (the long token in the sheet's URL)
        #[arg(long = "spreadsheet-id", alias = "spreadsheetId")]
        spreadsheet_id: Option<String>,

        /// Sheet (tab) name [default: Sheet1]
        #[arg(long = "sheet-name", alias = "sheetName")]
        sheet_name: Option<String>,

        /// Credentials file (authorized_user or service_account JSON)
        #[arg(long)]
        credentials: Option<PathBuf>,

        /// Bearer token to use instead of a credentials file
        #[arg(long, env = "AVGMOVE_ACCESS_TOKEN", hide_env_values = true)]
        access_token: Option<String>,

        /// Suppress the summary line
        #[arg(long, short = 'q')]
        quiet: bool,
    },

    /// Write a commented default settings file
    InitConfig,
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn args(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

/// Explicit settings files must load; the default one may be absent or broken.
fn load_settings(explicit: Option<&Path>) -> Result<Settings, CliError> {
    let mut settings = match explicit {
        Some(path) => Settings::load_from(path).map_err(|e| CliError::args(e.to_string()))?,
        None => Settings::load(),
    };
    settings.apply_env(|key| std::env::var(key).ok());
    Ok(settings)
}

fn cmd_init_config(explicit: Option<&Path>) -> Result<(), CliError> {
    let path = explicit.map(Path::to_path_buf).unwrap_or_else(Settings::config_path);
    let created = Settings::create_default_file(&path).map_err(|e| CliError {
        code: exit_codes::EXIT_ERROR,
        message: e.to_string(),
        hint: None,
    })?;
    if !created {
        eprintln!("{} already exists, leaving it unchanged", path.display());
    }
    println!("{}", path.display());
    Ok(())
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        None => {
            // No subcommand = show help
            eprintln!("Usage: avgmove <command> [options]");
            eprintln!("       avgmove --help for more information");
            Ok(())
        }
        Some(Commands::InitConfig) => cmd_init_config(cli.config.as_deref()),
        Some(Commands::SetAverageMoving {
            spreadsheet_id,
            sheet_name,
            credentials,
            access_token,
            quiet,
        }) => {
            let settings = load_settings(cli.config.as_deref())?;
            logging::init(&settings);
            cmd_set_average_moving(
                SetAverageMovingArgs { spreadsheet_id, sheet_name, credentials, access_token, quiet },
                &settings,
            )
        }
    }
}

fn main() -> ExitCode {
    logging::init_stderr();
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                log::error!("{}", message);
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}
