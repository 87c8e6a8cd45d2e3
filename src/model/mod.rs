//! Wire and domain types shared by the backend, the race and the views.
//!
//! Field names follow the REST backend (`id`, `name`, `color`, `velocity`,
//! `distance`, `wins`, `time`), so every type here serializes directly into
//! request bodies and deserializes from responses.

pub(crate) mod page;

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

pub use page::Page;

/// Backend-assigned car identifier. Winner records share it.
pub type CarId = u32;

/// A garage entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Car {
    pub id: CarId,
    pub name: String,
    pub color: String,
}

/// Body of `POST /garage` and `PUT /garage/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCar {
    pub name: String,
    pub color: String,
}

impl NewCar {
    pub fn new(name: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            color: color.into(),
        }
    }
}

/// Answer of `PATCH /engine?status=started`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EngineStats {
    pub velocity: f64,
    pub distance: f64,
}

impl EngineStats {
    pub fn new(velocity: f64, distance: f64) -> Self {
        Self { velocity, distance }
    }

    /// Simulated travel time: `distance / velocity` milliseconds.
    /// Saturates at `Duration::MAX` when the quotient does not fit.
    pub fn travel_time(&self) -> Duration {
        if self.velocity <= 0.0 || self.distance <= 0.0 {
            return Duration::ZERO;
        }
        from_millis_saturating(self.distance / self.velocity)
    }
}

/// A persisted win statistic. `time` is the best time in milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WinnerRecord {
    pub id: CarId,
    pub wins: u32,
    pub time: f64,
}

impl WinnerRecord {
    pub fn first_win(id: CarId, time: Duration) -> Self {
        Self {
            id,
            wins: 1,
            time: millis(time),
        }
    }

    /// The record after one more win in `time`: wins + 1, best time lowered.
    pub fn with_win(&self, time: Duration) -> WinnerUpdate {
        WinnerUpdate {
            wins: self.wins + 1,
            time: self.time.min(millis(time)),
        }
    }

    pub fn best_time(&self) -> Duration {
        from_millis_saturating(self.time.max(0.0))
    }
}

/// Body of `PUT /winners/{id}`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WinnerUpdate {
    pub wins: u32,
    pub time: f64,
}

/// A winner record joined with its car. The car may have been deleted.
#[derive(Debug, Clone, PartialEq)]
pub struct WinnerWithCar {
    pub record: WinnerRecord,
    pub car: Option<Car>,
}

/// Column the winners table is sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortField {
    Id,
    #[default]
    Wins,
    Time,
}

impl SortField {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortField::Id => "id",
            SortField::Wins => "wins",
            SortField::Time => "time",
        }
    }
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SortField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "id" => Ok(SortField::Id),
            "wins" => Ok(SortField::Wins),
            "time" => Ok(SortField::Time),
            _ => Err(format!("unknown sort field '{}', use id, wins or time", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SortOrder {
    #[serde(rename = "ASC")]
    Asc,
    #[default]
    #[serde(rename = "DESC")]
    Desc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }

    pub fn toggle(self) -> Self {
        match self {
            SortOrder::Asc => SortOrder::Desc,
            SortOrder::Desc => SortOrder::Asc,
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "ASC" => Ok(SortOrder::Asc),
            "DESC" => Ok(SortOrder::Desc),
            _ => Err(format!("unknown sort order '{}', use ASC or DESC", s)),
        }
    }
}

/// Render a duration as seconds with two decimals (`5000 ms` -> `"5.00"`).
pub fn format_seconds(time: Duration) -> String {
    format!("{:.2}", time.as_secs_f64())
}

fn from_millis_saturating(millis: f64) -> Duration {
    Duration::try_from_secs_f64(millis / 1000.0).unwrap_or(Duration::MAX)
}

pub(crate) fn millis(time: Duration) -> f64 {
    time.as_secs_f64() * 1000.0
}
