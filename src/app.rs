//! App - wires the backend, the race and both presenters together.
//!
//! A front end turns clicks into [`Intent`]s, hands them to
//! [`App::dispatch`] and redraws from the presenters according to the
//! returned [`AppEvent`].
//!
//! ## Example
//!
//! ```ignore
//! use async_race::{App, Config, Intent};
//!
//! let mut app = App::connect(Config::from_env())?;
//! app.load().await?;
//! if let AppEvent::RaceCompleted(summary) = app.dispatch(Intent::StartRace).await? {
//!     if let Some(text) = summary.announcement {
//!         println!("{}", text);
//!     }
//! }
//! ```

use std::error::Error;
use std::fmt;
use std::sync::Arc;

use log::warn;

use crate::animation::AnimationDriver;
use crate::backend::{Backend, GarageApi};
use crate::config::Config;
use crate::engine::EngineClient;
use crate::error::ApiError;
use crate::ledger::WinnerLedger;
use crate::model::{format_seconds, Car, CarId, SortField};
use crate::presenter::{GaragePresenter, WinnersPresenter, GENERATED_CARS};
use crate::race::{CarOutcome, RaceError, RaceObserver, RaceOrchestrator, RaceResult, SilentObserver};

#[cfg(feature = "client")]
use crate::animation::FrameAnimator;
#[cfg(feature = "client")]
use crate::backend::HttpBackend;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageStep {
    Next,
    Prev,
}

/// Everything a user can ask for.
#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
    CreateCar { name: String, color: String },
    UpdateCar { id: CarId, name: String, color: String },
    DeleteCar(CarId),
    SelectCar(CarId),
    GenerateCars,
    StartRace,
    ResetRace,
    DriveCar(CarId),
    StopCar(CarId),
    SortWinners(SortField),
    GaragePage(PageStep),
    WinnersPage(PageStep),
}

/// What changed after an intent was handled.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    GarageChanged,
    Selected(Option<Car>),
    Generated(usize),
    RaceCompleted(RaceSummary),
    RaceReset,
    CarDriven(CarOutcome),
    CarStopped(CarId),
    WinnersChanged,
    /// A page step past the first or last page.
    Unchanged,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RaceSummary {
    pub result: RaceResult,
    /// `"<name> won in <seconds>s!"` when somebody won.
    pub announcement: Option<String>,
}

#[derive(Debug)]
pub enum AppError {
    Api(ApiError),
    Race(RaceError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Api(e) => write!(f, "{}", e),
            AppError::Race(e) => write!(f, "{}", e),
        }
    }
}

impl Error for AppError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            AppError::Api(e) => Some(e),
            AppError::Race(e) => Some(e),
        }
    }
}

impl From<ApiError> for AppError {
    fn from(e: ApiError) -> Self {
        AppError::Api(e)
    }
}

impl From<RaceError> for AppError {
    fn from(e: RaceError) -> Self {
        AppError::Race(e)
    }
}

pub struct App<B, A> {
    config: Config,
    backend: B,
    race: Arc<RaceOrchestrator<B, B, A>>,
    garage: GaragePresenter<B, B>,
    winners: WinnersPresenter<B, B>,
}

#[cfg(feature = "client")]
impl App<HttpBackend, FrameAnimator> {
    /// Talk to the server at `config.base_url`, animating on a tokio interval.
    pub fn connect(config: Config) -> Result<Self, ApiError> {
        let backend = HttpBackend::new(&config)?;
        let animator = FrameAnimator::new(config.frame_interval);
        Ok(Self::new(config, backend, animator))
    }
}

impl<B: Backend, A: AnimationDriver> App<B, A> {
    pub fn new(config: Config, backend: B, animator: A) -> Self {
        Self::with_observer(config, backend, animator, Arc::new(SilentObserver))
    }

    pub fn with_observer(
        config: Config,
        backend: B,
        animator: A,
        observer: Arc<dyn RaceObserver>,
    ) -> Self {
        let ledger = Arc::new(WinnerLedger::new(backend.clone()));
        let engine = EngineClient::new(backend.clone(), config.drive_timeout);
        let race = RaceOrchestrator::new(engine, ledger.clone(), animator).with_observer(observer);
        let garage = GaragePresenter::new(backend.clone(), ledger, config.garage_page_size);
        let winners = WinnersPresenter::new(backend.clone(), backend.clone(), config.winners_page_size);
        Self {
            config,
            backend,
            race: Arc::new(race),
            garage,
            winners,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn garage(&self) -> &GaragePresenter<B, B> {
        &self.garage
    }

    pub fn winners(&self) -> &WinnersPresenter<B, B> {
        &self.winners
    }

    /// Shared handle on the race, e.g. to reset it from another task while
    /// `race()` is waiting.
    pub fn orchestrator(&self) -> Arc<RaceOrchestrator<B, B, A>> {
        self.race.clone()
    }

    /// Fetch the first garage page and the winners table.
    pub async fn load(&mut self) -> Result<(), ApiError> {
        self.garage.load().await?;
        self.winners.load().await?;
        Ok(())
    }

    /// Race the cars of the garage page on screen.
    pub async fn race(&mut self) -> Result<RaceSummary, AppError> {
        let cars = self.garage.cars().to_vec();
        let result = self.race.start_race(&cars).await?;
        let announcement = match &result {
            RaceResult::Finished(report) => report.winner.map(|winner| {
                let name = cars
                    .iter()
                    .find(|car| car.id == winner.car_id)
                    .map(|car| car.name.clone())
                    .unwrap_or_else(|| format!("Car #{}", winner.car_id));
                announce(&name, winner.time)
            }),
            RaceResult::Aborted | RaceResult::Empty => None,
        };
        if announcement.is_some() {
            if let Err(err) = self.winners.load().await {
                warn!("winners table not refreshed after race: {}", err);
            }
        }
        Ok(RaceSummary { result, announcement })
    }

    pub async fn reset(&self) {
        self.race.reset_race().await;
    }

    pub async fn dispatch(&mut self, intent: Intent) -> Result<AppEvent, AppError> {
        let event = match intent {
            Intent::CreateCar { name, color } => {
                self.garage.create(&name, &color).await?;
                AppEvent::GarageChanged
            }
            Intent::UpdateCar { id, name, color } => {
                self.garage.update(id, &name, &color).await?;
                self.winners.load().await?;
                AppEvent::GarageChanged
            }
            Intent::DeleteCar(id) => {
                self.garage.delete(id).await?;
                self.winners.load().await?;
                AppEvent::GarageChanged
            }
            Intent::SelectCar(id) => AppEvent::Selected(self.garage.select(id).cloned()),
            Intent::GenerateCars => {
                let created = self.garage.generate(GENERATED_CARS).await?;
                AppEvent::Generated(created.len())
            }
            Intent::StartRace => AppEvent::RaceCompleted(self.race().await?),
            Intent::ResetRace => {
                self.reset().await;
                AppEvent::RaceReset
            }
            Intent::DriveCar(id) => {
                let car = self.car(id).await?;
                AppEvent::CarDriven(self.race.drive_car(&car).await?)
            }
            Intent::StopCar(id) => {
                self.race.stop_car(id).await?;
                AppEvent::CarStopped(id)
            }
            Intent::SortWinners(field) => {
                self.winners.change_sort(field).await?;
                AppEvent::WinnersChanged
            }
            Intent::GaragePage(step) => {
                let moved = match step {
                    PageStep::Next => self.garage.next_page().await?,
                    PageStep::Prev => self.garage.prev_page().await?,
                };
                if moved { AppEvent::GarageChanged } else { AppEvent::Unchanged }
            }
            Intent::WinnersPage(step) => {
                let moved = match step {
                    PageStep::Next => self.winners.next_page().await?,
                    PageStep::Prev => self.winners.prev_page().await?,
                };
                if moved { AppEvent::WinnersChanged } else { AppEvent::Unchanged }
            }
        };
        Ok(event)
    }

    async fn car(&self, id: CarId) -> Result<Car, ApiError> {
        match self.garage.cars().iter().find(|car| car.id == id) {
            Some(car) => Ok(car.clone()),
            None => self.backend.get_car(id).await,
        }
    }
}

/// `"Tesla won in 4.50s!"`
pub fn announce(name: &str, time: std::time::Duration) -> String {
    format!("{} won in {}s!", name, format_seconds(time))
}
