use chrono::{DateTime, Local};
use log::kv::{self, Key, Value, VisitSource};

/// Owned snapshot of a single log call.
#[derive(Debug, Clone)]
pub struct LogRecord {
    pub timestamp: DateTime<Local>,
    pub level: log::Level,
    pub message: String,
    /// Key/value pairs in emission order. Duplicate keys are kept.
    pub attributes: Vec<(String, String)>,
}

impl LogRecord {
    pub fn new(level: log::Level, message: impl Into<String>) -> Self {
        Self {
            timestamp: Local::now(),
            level,
            message: message.into(),
            attributes: Vec::new(),
        }
    }

    pub fn at(self, timestamp: DateTime<Local>) -> Self {
        Self { timestamp, ..self }
    }

    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((key.into(), value.into()));
        self
    }

    /// Captures a `log` facade record, stamping it with the current local time.
    pub fn from_log(record: &log::Record) -> Self {
        let mut collector = AttributeCollector::default();
        // Collecting into a Vec never fails.
        let _ = record.key_values().visit(&mut collector);

        Self {
            timestamp: Local::now(),
            level: record.level(),
            message: record.args().to_string(),
            attributes: collector.pairs,
        }
    }
}

#[derive(Default)]
struct AttributeCollector {
    pairs: Vec<(String, String)>,
}

impl<'kvs> VisitSource<'kvs> for AttributeCollector {
    fn visit_pair(&mut self, key: Key<'kvs>, value: Value<'kvs>) -> Result<(), kv::Error> {
        self.pairs.push((key.as_str().to_string(), value.to_string()));
        Ok(())
    }
}
