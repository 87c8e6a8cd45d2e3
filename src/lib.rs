//! Headless core of the async-race front end.
//!
//! Manages a garage of cars against a REST backend, races them through the
//! engine endpoints and keeps the winners table up to date.
//!
//! - [`backend`]: one trait per REST resource, an HTTP client and an
//!   in-memory double.
//! - [`EngineClient`]: engine start/stop/drive with a drive timeout.
//! - [`RaceOrchestrator`]: concurrent races, abort via reset, winner pick.
//! - [`WinnerLedger`]: create-or-increment of winner records.
//! - [`GaragePresenter`] and [`WinnersPresenter`]: paginated view state.
//! - [`App`]: wires everything and dispatches [`Intent`]s.
//!
//! With the `mock` feature, [`mock`] serves the REST API itself.

mod app;
mod config;
mod engine;
mod error;
mod ledger;
mod presenter;

pub mod animation;
pub mod backend;
pub mod model;
pub mod race;

#[cfg(feature = "mock")]
pub mod mock;

pub use animation::{AnimationDriver, AnimationHandle, FrameAnimator, NoopAnimator, OnProgress};
pub use app::{announce, App, AppError, AppEvent, Intent, PageStep, RaceSummary};
pub use backend::{
    Backend, DriveScript, DriveStatus, EngineApi, EngineCall, GarageApi, InMemoryBackend,
    WinnersApi, WinnersQuery,
};
#[cfg(feature = "client")]
pub use backend::HttpBackend;
pub use config::Config;
pub use engine::{DriveOutcome, EngineClient};
pub use error::ApiError;
pub use ledger::WinnerLedger;
pub use model::{
    format_seconds, Car, CarId, EngineStats, NewCar, Page, SortField, SortOrder, WinnerRecord,
    WinnerUpdate, WinnerWithCar,
};
pub use presenter::{
    is_hex_color, random_car, random_cars, random_color, random_name, GaragePresenter,
    WinnersPresenter, GENERATED_CARS,
};
pub use race::{
    pick_winner, CarOutcome, FailReason, Outcome, RaceError, RaceObserver, RaceOrchestrator,
    RaceReport, RaceResult, RaceState, SilentObserver, Winner,
};
