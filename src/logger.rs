use colored::Colorize;
use log::{Level, LevelFilter, Log, Metadata, Record};

/// Writes `log` records to stderr in the same layout as the CLI status lines.
struct Logger;

static LOGGER: Logger = Logger;

/// Install the logger. Only records from this crate are shown.
pub fn init(level: LevelFilter) {
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(level);
    }
}

impl Log for Logger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.target().starts_with(env!("CARGO_CRATE_NAME"))
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let left = match record.level() {
            Level::Error => "Error".red(),
            Level::Warn => "Warning".yellow(),
            Level::Info => "Info".green(),
            Level::Debug => "Debug".cyan(),
            Level::Trace => "Trace".dimmed(),
        };
        eprintln!("{left:>12} {}", record.args());
    }

    fn flush(&self) {}
}
