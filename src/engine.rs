//! EngineClient - the engine calls a race makes, with the client-side rules
//! the backend does not enforce.
//!
//! - `drive` is bounded by a fixed deadline; running past it counts the same
//!   as a breakdown for the race.
//! - `stop_engine` never fails; problems are logged and dropped.

use std::time::Duration;

use log::{debug, warn};

use crate::backend::{DriveStatus, EngineApi};
use crate::error::ApiError;
use crate::model::{CarId, EngineStats};

/// How one `drive` call ended, seen from the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DriveOutcome {
    Completed,
    Breakdown,
    TimedOut,
    Failed(ApiError),
}

impl DriveOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, DriveOutcome::Completed)
    }
}

#[derive(Clone)]
pub struct EngineClient<E> {
    api: E,
    drive_timeout: Duration,
}

impl<E: EngineApi> EngineClient<E> {
    pub fn new(api: E, drive_timeout: Duration) -> Self {
        Self { api, drive_timeout }
    }

    pub fn drive_timeout(&self) -> Duration {
        self.drive_timeout
    }

    pub fn api(&self) -> &E {
        &self.api
    }

    pub async fn start_engine(&self, id: CarId) -> Result<EngineStats, ApiError> {
        let stats = self.api.start_engine(id).await?;
        debug!(
            "car {} started: velocity {}, distance {}",
            id, stats.velocity, stats.distance
        );
        Ok(stats)
    }

    /// Stop an engine. Stopping a stopped or unknown engine is not an error.
    pub async fn stop_engine(&self, id: CarId) {
        match self.api.stop_engine(id).await {
            Ok(()) => debug!("car {} stopped", id),
            Err(err) if err.is_not_found() => debug!("car {} already gone: {}", id, err),
            Err(err) => warn!("failed to stop engine of car {}: {}", id, err),
        }
    }

    pub async fn drive(&self, id: CarId) -> DriveOutcome {
        match tokio::time::timeout(self.drive_timeout, self.api.drive(id)).await {
            Ok(Ok(DriveStatus::Completed)) => DriveOutcome::Completed,
            Ok(Ok(DriveStatus::Breakdown)) => {
                debug!("car {} broke down", id);
                DriveOutcome::Breakdown
            }
            Ok(Err(err)) => {
                warn!("drive request for car {} failed: {}", id, err);
                DriveOutcome::Failed(err)
            }
            Err(_) => {
                warn!(
                    "drive request for car {} exceeded {} ms",
                    id,
                    self.drive_timeout.as_millis()
                );
                DriveOutcome::TimedOut
            }
        }
    }
}
