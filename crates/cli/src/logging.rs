// File logger behind the `log` facade.
// One line per record: `[2024-05-01 09:30:00] INFO avgmove_core::run: message`
//
// A stderr logger at `warn` is installed before anything else runs, so errors
// raised while loading settings are still logged. Once settings are known it
// is redirected to the configured file and level.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::sync::Mutex;

use log::{LevelFilter, Log, Metadata, Record};

use avgmove_config::Settings;

enum Sink {
    File(File),
    Stderr,
}

struct State {
    level: LevelFilter,
    sink: Sink,
}

pub struct FileLogger {
    state: Mutex<State>,
}

static LOGGER: FileLogger = FileLogger::stderr(LevelFilter::Warn);

impl FileLogger {
    /// Append to `path`, creating parent directories as needed.
    pub fn open(path: &Path, level: LevelFilter) -> io::Result<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self { state: Mutex::new(State { level, sink: Sink::File(file) }) })
    }

    pub const fn stderr(level: LevelFilter) -> Self {
        Self { state: Mutex::new(State { level, sink: Sink::Stderr }) }
    }

    pub fn level(&self) -> LevelFilter {
        self.state.lock().map(|s| s.level).unwrap_or(LevelFilter::Off)
    }

    #[cfg(test)]
    fn writes_to_stderr(&self) -> bool {
        self.state.lock().map(|s| matches!(s.sink, Sink::Stderr)).unwrap_or(false)
    }

    // Take over `other`'s level and sink.
    fn replace_with(&self, other: FileLogger) {
        let incoming = match other.state.into_inner() {
            Ok(state) => state,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Ok(mut state) = self.state.lock() {
            *state = incoming;
        }
    }
}

fn format_line(record: &Record) -> String {
    format!(
        "[{}] {} {}: {}\n",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        record.level(),
        record.target(),
        record.args(),
    )
}

impl Log for FileLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level()
    }

    fn log(&self, record: &Record) {
        let Ok(mut state) = self.state.lock() else {
            return;
        };
        if record.level() > state.level {
            return;
        }
        let line = format_line(record);
        // Write failures are dropped.
        let _ = match &mut state.sink {
            Sink::File(file) => file.write_all(line.as_bytes()),
            Sink::Stderr => io::stderr().write_all(line.as_bytes()),
        };
    }

    fn flush(&self) {
        if let Ok(mut state) = self.state.lock() {
            let _ = match &mut state.sink {
                Sink::File(file) => file.flush(),
                Sink::Stderr => io::stderr().flush(),
            };
        }
    }
}

/// Parse a level name ("error" .. "trace", "off"); unknown names give `None`.
pub fn parse_level(name: &str) -> Option<LevelFilter> {
    name.trim().parse().ok()
}

/// Build the logger for these settings without installing it.
pub fn build(settings: &Settings) -> FileLogger {
    let level = parse_level(&settings.log_level).unwrap_or_else(|| {
        eprintln!("warning: unknown log level {:?}, using info", settings.log_level);
        LevelFilter::Info
    });

    let path = settings.log_file();
    match FileLogger::open(&path, level) {
        Ok(logger) => logger,
        Err(e) => {
            eprintln!("warning: cannot open log file {}: {}", path.display(), e);
            FileLogger::stderr(level.min(LevelFilter::Warn))
        }
    }
}

/// Install the global logger, writing warnings and errors to stderr.
pub fn init_stderr() {
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(LevelFilter::Warn);
    }
}

/// Point the global logger at the file and level from `settings`.
pub fn init(settings: &Settings) {
    init_stderr();
    let logger = build(settings);
    let level = logger.level();
    LOGGER.replace_with(logger);
    log::set_max_level(level);
}
