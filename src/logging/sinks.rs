use std::{
    fs::File,
    io::{self, LineWriter, Write},
    path::{Path, PathBuf},
    sync::{Arc, Mutex, PoisonError},
};

use crate::error::WriteError;

use super::{LogFormatter, LogRecord, LogSink};

/// Shared handle to an append-only log file.
///
/// Sinks hold clones of it but never close it; the descriptor is released when the last clone
/// is dropped, so a sink still writing during a rotation keeps a valid file.
#[derive(Clone)]
pub struct LogFile {
    file: Arc<Mutex<LineWriter<File>>>,
    path: Arc<PathBuf>,
}

impl LogFile {
    /// Opens `path` for appending, creating it if missing. Existing content is never truncated.
    pub fn open(path: impl Into<PathBuf>) -> io::Result<Self> {
        let path = path.into();
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)?;

        Ok(Self {
            file: Arc::new(Mutex::new(LineWriter::new(file))),
            path: Arc::new(path),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_line(&self, line: &str) -> io::Result<()> {
        let mut file = self.file.lock().unwrap_or_else(PoisonError::into_inner);
        file.write_all(line.as_bytes())?;
        file.flush()
    }

    pub fn flush(&self) -> io::Result<()> {
        self.file
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .flush()
    }
}

pub struct FileSink {
    file: LogFile,
    formatter: Arc<dyn LogFormatter>,
    context: Vec<(String, String)>,
    name: String,
}

impl FileSink {
    pub fn new(file: LogFile, formatter: Arc<dyn LogFormatter>) -> Self {
        let name = format!("file {}", file.path().display());
        Self {
            file,
            formatter,
            context: Vec::new(),
            name,
        }
    }
}

impl LogSink for FileSink {
    fn name(&self) -> &str {
        &self.name
    }

    fn write_log(&self, record: &LogRecord) -> Result<(), WriteError> {
        let line = self.formatter.format(record, &self.context);
        self.file
            .write_line(&line)
            .map_err(|e| WriteError::new(&self.name, e))
    }

    fn flush(&self) {
        let _ = self.file.flush();
    }

    fn with_attrs(&self, attrs: &[(String, String)]) -> Arc<dyn LogSink> {
        let mut context = self.context.clone();
        context.extend_from_slice(attrs);

        Arc::new(Self {
            file: self.file.clone(),
            formatter: Arc::clone(&self.formatter),
            context,
            name: self.name.clone(),
        })
    }
}

pub struct StdoutSink {
    handle: io::Stdout,
    formatter: Arc<dyn LogFormatter>,
    context: Vec<(String, String)>,
}

impl StdoutSink {
    pub fn new(formatter: Arc<dyn LogFormatter>) -> Self {
        Self {
            handle: io::stdout(),
            formatter,
            context: Vec::new(),
        }
    }
}

impl LogSink for StdoutSink {
    fn name(&self) -> &str {
        "stdout"
    }

    fn write_log(&self, record: &LogRecord) -> Result<(), WriteError> {
        let line = self.formatter.format(record, &self.context);
        let mut writer = self.handle.lock();

        writer
            .write_all(line.as_bytes())
            .and_then(|_| writer.flush())
            .map_err(|e| WriteError::new(self.name(), e))
    }

    fn flush(&self) {
        let _ = self.handle.lock().flush();
    }

    fn with_attrs(&self, attrs: &[(String, String)]) -> Arc<dyn LogSink> {
        let mut context = self.context.clone();
        context.extend_from_slice(attrs);

        Arc::new(Self {
            handle: io::stdout(),
            formatter: Arc::clone(&self.formatter),
            context,
        })
    }
}
