use std::{sync::Arc, time::Duration};

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::error::RotationError;

use super::{next_midnight, ActiveDestination, Clock, PartitionKey};

/// Keeps the active destination on today's file, switching at every local midnight.
pub struct RotationScheduler {
    destination: Arc<ActiveDestination>,
    clock: Arc<dyn Clock>,
}

impl RotationScheduler {
    pub fn new(destination: Arc<ActiveDestination>, clock: Arc<dyn Clock>) -> Self {
        Self { destination, clock }
    }

    pub fn destination(&self) -> &Arc<ActiveDestination> {
        &self.destination
    }

    /// Rotates to the partition of the clock's current time.
    pub fn rotate_now(&self) -> Result<bool, RotationError> {
        let key = PartitionKey::from_datetime(&self.clock.now());
        let rotated = self.destination.rotate_to(key)?;

        if rotated {
            announce(&self.destination);
        }

        Ok(rotated)
    }

    /// Opens today's file, then rotates at every local midnight until `shutdown` fires.
    ///
    /// Failing to open the first file is returned as an error. Later failures are logged and
    /// the previous day's file keeps receiving records until the next midnight.
    pub async fn run(self, shutdown: CancellationToken) -> Result<(), RotationError> {
        self.rotate_now()?;

        loop {
            let now = self.clock.now();
            let deadline = next_midnight(&now);
            let wait = (deadline - now).to_std().unwrap_or(Duration::ZERO);

            log::debug!(wait_secs = wait.as_secs(); "Next log rotation scheduled");

            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = tokio::time::sleep(wait) => {}
            }

            // Never rotate to the day that is ending, even if the timer fired a bit early.
            let now = self.clock.now().max(deadline);
            match self.destination.rotate_to(PartitionKey::from_datetime(&now)) {
                Ok(true) => announce(&self.destination),
                Ok(false) => {}
                Err(err) => {
                    let error = err.to_string();
                    log::error!(error = error.as_str(); "Error creating log path, keeping previous file");
                }
            }
        }

        log::debug!("Log rotation stopped");
        self.destination.shutdown();

        Ok(())
    }

    pub fn spawn(self, shutdown: CancellationToken) -> JoinHandle<Result<(), RotationError>> {
        tokio::spawn(self.run(shutdown))
    }
}

fn announce(destination: &ActiveDestination) {
    if let Some(path) = destination.current_path() {
        let path = path.display().to_string();
        log::info!(path = path.as_str(); "Daily logging started");
    }
}
