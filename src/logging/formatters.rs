use std::{borrow::Cow, fmt::Write};

use yansi::Paint;

use super::{ansi, LogFormatter, LogRecord};

pub const DEFAULT_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

#[derive(Debug, Clone)]
pub struct Config {
    pub datetime_format: String,
    pub use_ansi: bool,
}

impl Config {
    pub fn new() -> Self {
        Self {
            datetime_format: DEFAULT_DATETIME_FORMAT.to_string(),
            use_ansi: true,
        }
    }

    pub fn plain() -> Self {
        Self {
            use_ansi: false,
            ..Self::new()
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

/// Renders `[timestamp] LEVEL message key=value...\n`.
///
/// With `use_ansi` the level label is colored and the caller's text is passed through untouched.
/// Without it, escape sequences are stripped from the message and every attribute, and line
/// breaks are escaped as `\n` / `\r` so each record stays on one line.
pub struct DefaultFormatter {
    config: Config,
}

impl DefaultFormatter {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    fn format_level(&self, level: log::Level) -> String {
        let name = level.as_str();

        if !self.config.use_ansi {
            return name.to_string();
        }

        match level {
            log::Level::Error => name.red().to_string(),
            log::Level::Warn => name.yellow().to_string(),
            log::Level::Info => name.cyan().to_string(),
            log::Level::Debug | log::Level::Trace => name.white().to_string(),
        }
    }

    fn clean<'a>(&self, text: &'a str) -> Cow<'a, str> {
        if self.config.use_ansi {
            return text.into();
        }

        match ansi::strip(text) {
            Cow::Borrowed(text) if !text.contains(&['\n', '\r'][..]) => Cow::Borrowed(text),
            stripped => Cow::Owned(stripped.replace('\n', "\\n").replace('\r', "\\r")),
        }
    }
}

impl LogFormatter for DefaultFormatter {
    fn format(&self, record: &LogRecord, context: &[(String, String)]) -> String {
        let mut line = format!(
            "[{}] {} {}",
            record.timestamp.format(&self.config.datetime_format),
            self.format_level(record.level),
            self.clean(&record.message),
        );

        for (key, value) in context.iter().chain(record.attributes.iter()) {
            // Writing into a String can't fail.
            let _ = write!(line, " {}={}", self.clean(key), self.clean(value));
        }

        line.push('\n');
        line
    }
}
