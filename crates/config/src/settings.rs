// Application settings
// Loaded from ~/.config/avgmove/settings.json, overridable from the environment

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const ENV_CONFIG: &str = "AVGMOVE_CONFIG";
pub const ENV_SPREADSHEET_ID: &str = "AVGMOVE_SPREADSHEET_ID";
pub const ENV_SHEET_NAME: &str = "AVGMOVE_SHEET_NAME";
pub const ENV_CREDENTIALS: &str = "AVGMOVE_CREDENTIALS";
pub const ENV_SHEETS_API_BASE: &str = "AVGMOVE_SHEETS_API_BASE";
pub const ENV_LOG: &str = "AVGMOVE_LOG";

pub const DEFAULT_SHEET_NAME: &str = "Sheet1";
pub const DEFAULT_API_BASE: &str = "https://sheets.googleapis.com";
pub const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("cannot read settings file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid settings file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("cannot write settings file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // Google Sheets
    #[serde(rename = "sheets.credentialsPath")]
    pub credentials_path: Option<String>,  // None = <config dir>/credentials.json

    #[serde(rename = "sheets.spreadsheetId")]
    pub spreadsheet_id: Option<String>,

    #[serde(rename = "sheets.sheetName")]
    pub sheet_name: String,

    #[serde(rename = "sheets.apiBase")]
    pub api_base: String,

    #[serde(rename = "sheets.tokenUri")]
    pub token_uri: String,

    // Logging
    #[serde(rename = "log.level")]
    pub log_level: String,

    #[serde(rename = "log.file")]
    pub log_file: Option<String>,  // None = <data dir>/avgmove.log
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            credentials_path: None,
            spreadsheet_id: None,
            sheet_name: DEFAULT_SHEET_NAME.to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
            token_uri: DEFAULT_TOKEN_URI.to_string(),
            log_level: "info".to_string(),
            log_file: None,
        }
    }
}

const DEFAULT_CONFIG: &str = r#"{
    // Google Sheets
    // Credentials: an OAuth "authorized_user" JSON file
    // (client_id, client_secret, refresh_token) or a "service_account" key
    "sheets.credentialsPath": null,
    "sheets.spreadsheetId": null,
    "sheets.sheetName": "Sheet1",
    "sheets.apiBase": "https://sheets.googleapis.com",
    "sheets.tokenUri": "https://oauth2.googleapis.com/token",

    // Logging
    // Levels: "error", "warn", "info", "debug", "trace", "off"
    "log.level": "info",
    "log.file": null
}
"#;

impl Settings {
    /// Get the default settings file path
    pub fn config_path() -> PathBuf {
        crate::config_dir().join("settings.json")
    }

    /// Load settings from the default path, falling back to defaults.
    ///
    /// A missing file is silent; an unreadable or malformed one is reported
    /// on stderr and ignored.
    pub fn load() -> Self {
        let path = Self::config_path();
        if !path.exists() {
            return Self::default();
        }

        match Self::load_from(&path) {
            Ok(settings) => settings,
            Err(e) => {
                eprintln!("warning: {}", e);
                eprintln!("warning: using default settings");
                Self::default()
            }
        }
    }

    /// Load settings from an explicit path. Errors are returned, not masked.
    pub fn load_from(path: &Path) -> Result<Self, SettingsError> {
        let contents = fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        Self::parse(&contents).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Parse settings JSON. Lines starting with `//` are comments.
    pub fn parse(contents: &str) -> Result<Self, serde_json::Error> {
        let cleaned: String = contents
            .lines()
            .filter(|line| !line.trim().starts_with("//"))
            .collect::<Vec<_>>()
            .join("\n");

        serde_json::from_str(&cleaned)
    }

    /// Apply `AVGMOVE_*` overrides. `lookup` is `std::env::var(..).ok()` in
    /// production; tests pass a map.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = non_empty(ENV_SPREADSHEET_ID) {
            self.spreadsheet_id = Some(v);
        }
        if let Some(v) = non_empty(ENV_SHEET_NAME) {
            self.sheet_name = v;
        }
        if let Some(v) = non_empty(ENV_CREDENTIALS) {
            self.credentials_path = Some(v);
        }
        if let Some(v) = non_empty(ENV_SHEETS_API_BASE) {
            self.api_base = v;
        }
        if let Some(v) = non_empty(ENV_LOG) {
            self.log_level = v;
        }
    }

    /// Credentials file location, defaulting into the config directory.
    pub fn credentials_path(&self) -> PathBuf {
        match &self.credentials_path {
            Some(p) if !p.trim().is_empty() => PathBuf::from(p),
            _ => crate::config_dir().join("credentials.json"),
        }
    }

    /// Log file location, defaulting into the data directory.
    pub fn log_file(&self) -> PathBuf {
        match &self.log_file {
            Some(p) if !p.trim().is_empty() => PathBuf::from(p),
            _ => crate::data_dir().join("avgmove.log"),
        }
    }

    /// Write the commented default settings file to `path`.
    ///
    /// Returns `Ok(false)` without touching anything if the file exists.
    pub fn create_default_file(path: &Path) -> Result<bool, SettingsError> {
        if path.exists() {
            return Ok(false);
        }

        let write_err = |source| SettingsError::Write { path: path.to_path_buf(), source };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(write_err)?;
        }
        fs::write(path, DEFAULT_CONFIG).map_err(write_err)?;
        Ok(true)
    }
}
