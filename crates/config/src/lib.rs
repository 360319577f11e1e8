// Configuration loading

pub mod settings;

pub use settings::{Settings, SettingsError};

/// Directory holding settings and default credentials (`~/.config/avgmove`).
pub fn config_dir() -> std::path::PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| std::path::PathBuf::from("."))
        .join("avgmove")
}

/// Directory holding the log file (`~/.local/share/avgmove`).
pub fn data_dir() -> std::path::PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| std::path::PathBuf::from("."))
        .join("avgmove")
}
