pub mod ansi;
mod fanout;
mod formatters;
mod logger;
mod record;
mod sinks;

use std::sync::Arc;

use crate::error::WriteError;

pub use fanout::FanoutHandler;
pub use formatters::{Config, DefaultFormatter, DEFAULT_DATETIME_FORMAT};
pub use logger::{Builder, DailyLogging, Logger};
pub use record::LogRecord;
pub use sinks::{FileSink, LogFile, StdoutSink};

pub trait LogFormatter: Sync + Send {
    /// Renders one record as a single newline-terminated line. `context` attributes go first.
    fn format(&self, record: &LogRecord, context: &[(String, String)]) -> String;
}

pub trait LogSink: Sync + Send {
    fn name(&self) -> &str;

    fn enabled(&self, _level: log::Level) -> bool {
        true
    }

    fn write_log(&self, record: &LogRecord) -> Result<(), WriteError>;

    fn flush(&self);

    /// Returns a copy of this sink sharing the same destination with `attrs` appended to its
    /// context. The receiver is left untouched.
    fn with_attrs(&self, attrs: &[(String, String)]) -> Arc<dyn LogSink>;
}
