//! WinnerLedger - win count and best time per car.
//!
//! `record_win` is a read-modify-write against the backend: look the record
//! up, then either create it with one win or bump the wins and keep the
//! lower time. It is not idempotent; two calls count two wins. The race
//! guarantees a single caller at a time.

use std::time::Duration;

use log::{debug, info, warn};

use crate::backend::WinnersApi;
use crate::error::ApiError;
use crate::model::{CarId, WinnerRecord};

pub struct WinnerLedger<W> {
    api: W,
}

impl<W: WinnersApi> WinnerLedger<W> {
    pub fn new(api: W) -> Self {
        Self { api }
    }

    pub fn api(&self) -> &W {
        &self.api
    }

    /// Count one win for `car_id` in `time` and return the stored record.
    ///
    /// Lookup failures other than "no record yet" and failed writes are
    /// returned: losing this write silently would corrupt the statistics.
    pub async fn record_win(&self, car_id: CarId, time: Duration) -> Result<WinnerRecord, ApiError> {
        let record = match self.api.get_winner(car_id).await? {
            Some(existing) => {
                let update = existing.with_win(time);
                self.api.update_winner(car_id, &update).await?
            }
            None => {
                self.api
                    .create_winner(&WinnerRecord::first_win(car_id, time))
                    .await?
            }
        };
        info!(
            "car {} now has {} win(s), best {:.0} ms",
            record.id, record.wins, record.time
        );
        Ok(record)
    }

    /// Drop the record of a deleted car. Best effort: a missing record is
    /// expected, other failures are logged.
    pub async fn forget(&self, car_id: CarId) {
        match self.api.delete_winner(car_id).await {
            Ok(()) => debug!("winner record of car {} deleted", car_id),
            Err(err) if err.is_not_found() => debug!("car {} had no winner record", car_id),
            Err(err) => warn!("failed to delete winner record of car {}: {}", car_id, err),
        }
    }
}
