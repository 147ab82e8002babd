// src/utils/logger.rs

use log::{Level, LevelFilter, Metadata, Record, SetLoggerError};
use std::io::Write;
use std::str::FromStr;

static LOGGER: StderrLogger = StderrLogger;

struct StderrLogger;

/// Install the stderr logger. `level` is a `log` level name ("info", "debug", ...);
/// anything unrecognised means Info.
pub fn init(level: &str) -> Result<(), SetLoggerError> {
  let filter = LevelFilter::from_str(level).unwrap_or(LevelFilter::Info);
  log::set_logger(&LOGGER).map(|()| log::set_max_level(filter))
}

fn icon(level: Level) -> &'static str {
  match level {
    Level::Error => "🔴",
    Level::Warn => "🟠",
    Level::Info => "🔵",
    Level::Debug => "⚪",
    Level::Trace => "▫️",
  }
}

impl log::Log for StderrLogger {
  fn enabled(&self, metadata: &Metadata) -> bool {
    metadata.level() <= log::max_level()
  }

  fn log(&self, record: &Record) {
    if self.enabled(record.metadata()) {
      // Format: "🔴  File not found"
      let mut err = std::io::stderr().lock();
      let _ = writeln!(err, "{}  {}", icon(record.level()), record.args());
    }
  }

  fn flush(&self) {
    let _ = std::io::stderr().flush();
  }
}
