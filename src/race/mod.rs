//! Race - run every car at once, wait for all of them, pick the fastest.
//!
//! ## States
//!
//! ```text
//! Idle -> Running -> Finished -> Idle
//!            |
//!            +-----> Aborted  -> Idle   (reset_race)
//! ```
//!
//! A race joins on every car's attempt before choosing a winner. The first
//! attempt to settle is not necessarily the fastest car: the simulated travel
//! time and the network round trip are unrelated.
//!
//! ```ignore
//! let orchestrator = RaceOrchestrator::new(engine, ledger, FrameAnimator::default());
//! match orchestrator.start_race(&cars).await? {
//!     RaceResult::Finished(report) => println!("winner: {:?}", report.winner),
//!     RaceResult::Aborted | RaceResult::Empty => {}
//! }
//! ```

mod orchestrator;
mod outcome;

use std::error::Error;
use std::fmt;

use crate::error::ApiError;
use crate::model::{CarId, WinnerRecord};

pub use orchestrator::RaceOrchestrator;
pub use outcome::{pick_winner, CarOutcome, FailReason, Outcome, Winner};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RaceState {
    #[default]
    Idle,
    Running,
    Finished,
    Aborted,
}

/// What a completed race produced.
#[derive(Debug, Clone, PartialEq)]
pub struct RaceReport {
    /// One entry per entrant, in entrant order.
    pub outcomes: Vec<CarOutcome>,
    pub winner: Option<Winner>,
    /// The winner's record after this win was counted.
    pub record: Option<WinnerRecord>,
}

impl RaceReport {
    pub fn outcome_of(&self, car_id: CarId) -> Option<&CarOutcome> {
        self.outcomes.iter().find(|o| o.car_id == car_id)
    }

    pub fn finishers(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_finished()).count()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RaceResult {
    /// No cars were entered; nothing happened.
    Empty,
    Finished(RaceReport),
    /// `reset_race` stopped the race before it finished.
    Aborted,
}

#[derive(Debug)]
pub enum RaceError {
    /// Another race (or a single-car run) is in progress.
    AlreadyRunning,
    /// The race finished but its winner could not be stored.
    Record { winner: Winner, source: ApiError },
}

impl fmt::Display for RaceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RaceError::AlreadyRunning => write!(f, "a race is already running"),
            RaceError::Record { winner, source } => write!(
                f,
                "failed to record win of car {}: {}",
                winner.car_id, source
            ),
        }
    }
}

impl Error for RaceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            RaceError::Record { source, .. } => Some(source),
            RaceError::AlreadyRunning => None,
        }
    }
}

/// Receives what happens to each car while a race runs.
///
/// Both methods default to doing nothing. Progress `0.0` after a failure or
/// a reset means "back to the start line".
pub trait RaceObserver: Send + Sync {
    fn on_progress(&self, _car_id: CarId, _progress: f64) {}

    fn on_outcome(&self, _outcome: &CarOutcome) {}
}

/// Observer that ignores everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentObserver;

impl RaceObserver for SilentObserver {}
