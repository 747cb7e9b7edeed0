// crates/systems/mdpad_genesis/src/logger.rs
// Logger mínimo a stderr para la fachada `log`.

use log::{Level, LevelFilter, Log, Metadata, Record};

use crate::BenchError;

struct StderrLogger;

static LOGGER: StderrLogger = StderrLogger;

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let tag = match record.level() {
            Level::Error => "ERROR",
            Level::Warn => "WARN ",
            Level::Info => "INFO ",
            Level::Debug => "DEBUG",
            Level::Trace => "TRACE",
        };
        eprintln!("[{tag}] {}: {}", record.target(), record.args());
    }

    fn flush(&self) {}
}

/// `-v` sube el nivel a debug.
pub fn init(verbose: bool) -> Result<(), BenchError> {
    log::set_logger(&LOGGER)?;
    log::set_max_level(if verbose { LevelFilter::Debug } else { LevelFilter::Info });
    Ok(())
}
