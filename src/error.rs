use std::{fmt, io, path::PathBuf};

use thiserror::Error;

/// A single sink failed to write a record.
#[derive(Debug, Error)]
#[error("failed writing log record to {sink}")]
pub struct WriteError {
    pub sink: String,
    #[source]
    pub source: io::Error,
}

impl WriteError {
    pub fn new(sink: impl Into<String>, source: io::Error) -> Self {
        Self {
            sink: sink.into(),
            source,
        }
    }
}

#[derive(Debug)]
pub struct SinkFailure {
    /// Position of the failing sink inside the fanout.
    pub index: usize,
    pub error: WriteError,
}

/// One or more sinks of a fanout failed while the others may have succeeded.
#[derive(Debug, Error)]
pub struct DispatchError {
    pub failures: Vec<SinkFailure>,
    pub total: usize,
}

impl DispatchError {
    pub fn failed_indices(&self) -> Vec<usize> {
        self.failures.iter().map(|f| f.index).collect()
    }
}

impl fmt::Display for DispatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} of {} sinks failed", self.failures.len(), self.total)?;

        for failure in &self.failures {
            write!(
                f,
                "; [{}] {}: {}",
                failure.index, failure.error.sink, failure.error.source
            )?;
        }

        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum RotationError {
    #[error("failed to create log directory {}", path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to open log file {}", path.display())]
    OpenFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[derive(Debug, Error)]
pub enum InitError {
    #[error(transparent)]
    Rotation(#[from] RotationError),

    #[error("a global logger is already installed")]
    SetLogger(#[from] log::SetLoggerError),
}
