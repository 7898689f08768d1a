use std::path::PathBuf;

use log::LevelFilter;

use crate::logging::DEFAULT_DATETIME_FORMAT;

pub const DEFAULT_ROOT: &str = "logs";

pub const ROOT_ENV: &str = "DAYLOG_ROOT";
pub const CONSOLE_ENV: &str = "DAYLOG_CONSOLE";

#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Directory under which `YYYY/MM/DD.txt` files are created.
    pub root: PathBuf,
    /// Mirror every record to stdout with colored levels.
    pub console: bool,
    pub level: LevelFilter,
    pub datetime_format: String,
}

impl LogConfig {
    pub fn new() -> Self {
        Self {
            root: PathBuf::from(DEFAULT_ROOT),
            console: true,
            level: LevelFilter::Trace,
            datetime_format: DEFAULT_DATETIME_FORMAT.to_string(),
        }
    }

    /// Defaults overridden by `DAYLOG_ROOT` and `DAYLOG_CONSOLE`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::new();

        if let Some(root) = lookup(ROOT_ENV).filter(|root| !root.is_empty()) {
            config.root = PathBuf::from(root);
        }

        if let Some(console) = lookup(CONSOLE_ENV) {
            config.console = !matches!(
                console.trim().to_ascii_lowercase().as_str(),
                "0" | "false" | "no" | "off"
            );
        }

        config
    }

    pub fn with_root(self, root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..self
        }
    }

    pub fn with_console(self, console: bool) -> Self {
        Self { console, ..self }
    }

    pub fn with_level(self, level: LevelFilter) -> Self {
        Self { level, ..self }
    }

    pub fn with_datetime_format(self, datetime_format: impl Into<String>) -> Self {
        Self {
            datetime_format: datetime_format.into(),
            ..self
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self::new()
    }
}
