use std::{
    fs, io,
    path::{Path, PathBuf},
    sync::{Arc, PoisonError, RwLock},
};

use crate::{
    config::LogConfig,
    error::RotationError,
    logging::{
        Config, DefaultFormatter, FanoutHandler, FileSink, LogFile, LogFormatter, LogSink,
        StdoutSink,
    },
};

use super::PartitionKey;

struct Active {
    partition: Option<PartitionKey>,
    file: Option<LogFile>,
    handler: Arc<FanoutHandler>,
}

/// The file currently written to and the handler installed on top of it.
///
/// Readers take the lock just long enough to clone the handler. A rotation opens the new file
/// outside the lock and only holds the write lock for the swap; the old file is released after
/// the new handler is visible.
pub struct ActiveDestination {
    root: PathBuf,
    console: bool,
    console_formatter: Arc<dyn LogFormatter>,
    file_formatter: Arc<dyn LogFormatter>,
    state: RwLock<Active>,
}

impl ActiveDestination {
    pub fn new(config: &LogConfig) -> Self {
        let console_config = Config {
            datetime_format: config.datetime_format.clone(),
            use_ansi: true,
        };
        let file_config = Config {
            use_ansi: false,
            ..console_config.clone()
        };

        Self {
            root: config.root.clone(),
            console: config.console,
            console_formatter: Arc::new(DefaultFormatter::new(console_config)),
            file_formatter: Arc::new(DefaultFormatter::new(file_config)),
            state: RwLock::new(Active {
                partition: None,
                file: None,
                handler: Arc::new(FanoutHandler::empty()),
            }),
        }
    }

    /// Handler records should be dispatched to right now.
    pub fn current(&self) -> Arc<FanoutHandler> {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&state.handler)
    }

    pub fn partition(&self) -> Option<PartitionKey> {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .partition
    }

    pub fn current_path(&self) -> Option<PathBuf> {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        state.file.as_ref().map(|file| file.path().to_path_buf())
    }

    /// Switches output to the file of `key`. Returns `false` if that partition is already active.
    ///
    /// On error nothing changes: the previous file and handler stay installed.
    pub fn rotate_to(&self, key: PartitionKey) -> Result<bool, RotationError> {
        if self.partition() == Some(key) {
            return Ok(false);
        }

        let dir = key.dir_path(&self.root);
        fs::create_dir_all(&dir).map_err(|source| RotationError::CreateDir {
            path: dir.clone(),
            source,
        })?;

        let path = key.file_path(&self.root);
        let file = LogFile::open(&path).map_err(|source| RotationError::OpenFile {
            path: path.clone(),
            source,
        })?;
        let handler = Arc::new(self.build_handler(&file));

        let previous = {
            let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
            state.partition = Some(key);
            state.handler = handler;
            state.file.replace(file)
        };

        if let Some(previous) = previous {
            close(previous);
        }

        Ok(true)
    }

    /// Uninstalls the handler and releases the open file.
    pub fn shutdown(&self) {
        let previous = {
            let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
            state.partition = None;
            state.handler = Arc::new(FanoutHandler::empty());
            state.file.take()
        };

        if let Some(previous) = previous {
            close(previous);
        }
    }

    fn build_handler(&self, file: &LogFile) -> FanoutHandler {
        let mut sinks: Vec<Arc<dyn LogSink>> = Vec::with_capacity(2);

        if self.console {
            sinks.push(Arc::new(StdoutSink::new(Arc::clone(&self.console_formatter))));
        }
        sinks.push(Arc::new(FileSink::new(
            file.clone(),
            Arc::clone(&self.file_formatter),
        )));

        FanoutHandler::new(sinks)
    }
}

// Dropping the handle closes the descriptor once in-flight writers holding a clone are done.
fn close(file: LogFile) {
    if let Err(err) = file.flush() {
        report_close_failure(file.path(), &err);
    }
}

// Runs after the swap, so the warning goes to the newly installed handler.
fn report_close_failure(path: &Path, err: &io::Error) {
    log::warn!("Error closing log file {}: {}", path.display(), err);
}
