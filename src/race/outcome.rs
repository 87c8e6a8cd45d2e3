use std::fmt;
use std::time::Duration;

use crate::model::CarId;

/// Why a car did not finish.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailReason {
    /// `start_engine` failed; the car never left.
    StartFailed(String),
    /// The backend reported an engine breakdown.
    Breakdown,
    /// The drive call ran past the client deadline.
    TimedOut,
    /// The drive call failed in transport.
    Network(String),
}

impl fmt::Display for FailReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailReason::StartFailed(msg) => write!(f, "engine did not start: {}", msg),
            FailReason::Breakdown => write!(f, "engine broke down"),
            FailReason::TimedOut => write!(f, "drive timed out"),
            FailReason::Network(msg) => write!(f, "drive failed: {}", msg),
        }
    }
}

/// How one car's attempt ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Finished(Duration),
    Failed(FailReason),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CarOutcome {
    pub car_id: CarId,
    pub outcome: Outcome,
}

impl CarOutcome {
    pub fn finished(car_id: CarId, time: Duration) -> Self {
        Self {
            car_id,
            outcome: Outcome::Finished(time),
        }
    }

    pub fn failed(car_id: CarId, reason: FailReason) -> Self {
        Self {
            car_id,
            outcome: Outcome::Failed(reason),
        }
    }

    pub fn time(&self) -> Option<Duration> {
        match self.outcome {
            Outcome::Finished(time) => Some(time),
            Outcome::Failed(_) => None,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.time().is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Winner {
    pub car_id: CarId,
    pub time: Duration,
}

/// The fastest finisher. On equal times the earlier entrant wins.
pub fn pick_winner(outcomes: &[CarOutcome]) -> Option<Winner> {
    let mut best: Option<Winner> = None;
    for outcome in outcomes {
        let Some(time) = outcome.time() else {
            continue;
        };
        if best.map_or(true, |b| time < b.time) {
            best = Some(Winner {
                car_id: outcome.car_id,
                time,
            });
        }
    }
    best
}
