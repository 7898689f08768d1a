use std::sync::Arc;

use log::{LevelFilter, Log};

use crate::{
    config::LogConfig,
    error::{DispatchError, InitError},
    rotation::{ActiveDestination, Clock, RotationScheduler, SystemClock},
};

use super::LogRecord;

/// `log` facade backend dispatching to whatever handler the destination has installed.
#[derive(Clone)]
pub struct Logger {
    filter: LevelFilter,
    destination: Arc<ActiveDestination>,
}

impl Logger {
    pub fn new(filter: LevelFilter, destination: Arc<ActiveDestination>) -> Self {
        Self {
            filter,
            destination,
        }
    }

    pub fn level_enabled(&self, level: log::Level) -> bool {
        self.filter >= level && self.destination.current().enabled(level)
    }

    /// Dispatches an explicit record. Records filtered out by level are dropped silently.
    pub fn submit(&self, record: &LogRecord) -> Result<(), DispatchError> {
        if self.filter < record.level {
            return Ok(());
        }

        self.destination.current().dispatch(record)
    }

    pub fn init(self) -> Result<(), log::SetLoggerError> {
        log::set_max_level(self.filter);
        log::set_boxed_logger(Box::new(self))
    }
}

impl Log for Logger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        self.level_enabled(metadata.level())
    }

    fn log(&self, record: &log::Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        // Log calls are fire-and-forget; stderr is the only place left to report a broken sink.
        if let Err(err) = self.submit(&LogRecord::from_log(record)) {
            eprintln!("daylog: {}", err);
        }
    }

    fn flush(&self) {
        self.destination.current().flush()
    }
}

/// A logger and the scheduler rotating its files, built from one configuration.
pub struct DailyLogging {
    pub logger: Logger,
    pub scheduler: RotationScheduler,
}

impl DailyLogging {
    pub fn destination(&self) -> &Arc<ActiveDestination> {
        self.scheduler.destination()
    }

    /// Opens today's file and installs the logger as the global `log` backend.
    ///
    /// The returned scheduler must be run (see [`RotationScheduler::spawn`]) for files to
    /// rotate at midnight.
    pub fn init(self) -> Result<RotationScheduler, InitError> {
        self.logger.init()?;
        self.scheduler.rotate_now()?;

        Ok(self.scheduler)
    }
}

pub struct Builder {
    config: LogConfig,
    clock: Arc<dyn Clock>,
}

impl Builder {
    pub fn new() -> Self {
        Self::from_config(LogConfig::new())
    }

    pub fn from_config(config: LogConfig) -> Self {
        Self {
            config,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_root(self, root: impl Into<std::path::PathBuf>) -> Self {
        Self {
            config: self.config.with_root(root),
            ..self
        }
    }

    pub fn with_console(self, console: bool) -> Self {
        Self {
            config: self.config.with_console(console),
            ..self
        }
    }

    pub fn with_level(self, filter: LevelFilter) -> Self {
        Self {
            config: self.config.with_level(filter),
            ..self
        }
    }

    pub fn with_datetime_format(self, format: impl Into<String>) -> Self {
        Self {
            config: self.config.with_datetime_format(format),
            ..self
        }
    }

    pub fn with_clock(self, clock: Arc<dyn Clock>) -> Self {
        Self { clock, ..self }
    }

    pub fn build(&self) -> DailyLogging {
        let destination = Arc::new(ActiveDestination::new(&self.config));

        DailyLogging {
            logger: Logger::new(self.config.level, Arc::clone(&destination)),
            scheduler: RotationScheduler::new(destination, Arc::clone(&self.clock)),
        }
    }
}

impl Default for Builder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    fn build(root: &std::path::Path, level: LevelFilter) -> DailyLogging {
        Builder::new()
            .with_root(root)
            .with_console(false)
            .with_level(level)
            .build()
    }

    #[test]
    fn test_disabled_before_first_rotation() {
        let temp_dir = TempDir::new().unwrap();
        let logging = build(temp_dir.path(), LevelFilter::Trace);

        assert!(!logging.logger.level_enabled(log::Level::Error));
        assert!(logging
            .logger
            .submit(&LogRecord::new(log::Level::Error, "dropped"))
            .is_ok());
    }

    #[test]
    fn test_facade_record_reaches_file() {
        let temp_dir = TempDir::new().unwrap();
        let logging = build(temp_dir.path(), LevelFilter::Trace);
        logging.scheduler.rotate_now().unwrap();

        let kvs: &[(&str, &str)] = &[("version", "1.0.0")];
        logging.logger.log(
            &log::Record::builder()
                .level(log::Level::Info)
                .args(format_args!("Application started"))
                .key_values(&kvs)
                .build(),
        );
        logging.logger.flush();

        let path = logging.destination().current_path().unwrap();
        let contents = fs::read_to_string(path).unwrap();
        assert!(contents.ends_with("] INFO Application started version=1.0.0\n"));
    }

    #[test]
    fn test_level_filter() {
        let temp_dir = TempDir::new().unwrap();
        let logging = build(temp_dir.path(), LevelFilter::Warn);
        logging.scheduler.rotate_now().unwrap();

        assert!(logging.logger.level_enabled(log::Level::Error));
        assert!(!logging.logger.level_enabled(log::Level::Info));

        logging
            .logger
            .submit(&LogRecord::new(log::Level::Info, "chatty"))
            .unwrap();
        logging
            .logger
            .submit(&LogRecord::new(log::Level::Warn, "important"))
            .unwrap();

        let path = logging.destination().current_path().unwrap();
        let contents = fs::read_to_string(path).unwrap();
        assert!(!contents.contains("chatty"));
        assert!(contents.contains("WARN important"));
    }

    #[test]
    fn test_custom_datetime_format() {
        let temp_dir = TempDir::new().unwrap();
        let logging = Builder::new()
            .with_root(temp_dir.path())
            .with_console(false)
            .with_datetime_format("%H:%M")
            .build();
        logging.scheduler.rotate_now().unwrap();

        logging
            .logger
            .submit(&LogRecord::new(log::Level::Debug, "short"))
            .unwrap();

        let path = logging.destination().current_path().unwrap();
        let contents = fs::read_to_string(path).unwrap();
        let line = contents.lines().last().unwrap();
        // "[HH:MM] DEBUG short"
        assert_eq!(line.len(), "[00:00] DEBUG short".len());
        assert!(line.ends_with("] DEBUG short"));
    }
}
