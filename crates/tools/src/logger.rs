//! Minimal stderr logger for the command-line tools.

use log::{LevelFilter, Log, Metadata, Record, SetLoggerError, max_level, set_logger, set_max_level};

struct StderrLogger;

static LOGGER: StderrLogger = StderrLogger;

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= max_level()
    }

    fn log(&self, record: &Record<'_>) {
        if self.enabled(record.metadata()) {
            eprintln!("[{:<5} {}] {}", record.level(), record.target(), record.args());
        }
    }

    fn flush(&self) {}
}

/// Warnings only by default; each `-v` opens one more level.
pub fn level_for(verbosity: u8) -> LevelFilter {
    match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

pub fn init(verbosity: u8) -> Result<(), SetLoggerError> {
    set_logger(&LOGGER)?;
    set_max_level(level_for(verbosity));
    Ok(())
}
