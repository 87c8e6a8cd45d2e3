//! InMemoryBackend - process-local garage, engines and winners.
//!
//! Behaves like the json-server mock: ids are assigned from 1, listings are
//! paginated with 1-based pages and winners sort by `id|wins|time`. Engines
//! can be scripted per car so races are deterministic in tests; cars without
//! a script get random stats and always finish.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;

use super::{DriveStatus, EngineApi, GarageApi, WinnersApi, WinnersQuery};
use crate::error::ApiError;
use crate::model::page::paginate;
use crate::model::{
    Car, CarId, EngineStats, NewCar, Page, SortField, SortOrder, WinnerRecord, WinnerUpdate,
};

/// Distance every unscripted engine reports, as the real backend does.
pub const TRACK_DISTANCE: f64 = 500_000.0;

/// How a scripted `drive` call ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DriveScript {
    #[default]
    Complete,
    /// Backend answers with a breakdown (500).
    Breakdown,
    /// Backend never answers.
    Hang,
    /// Transport failure.
    Fail,
}

/// Engine calls in the order the backend received them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EngineCall {
    Start(CarId),
    Stop(CarId),
    Drive(CarId),
}

#[derive(Debug, Clone, Default)]
struct EngineSetup {
    stats: Option<EngineStats>,
    drive: DriveScript,
    latency: Duration,
    start_fails: bool,
}

#[derive(Default)]
struct State {
    cars: BTreeMap<CarId, Car>,
    winners: BTreeMap<CarId, WinnerRecord>,
    last_id: CarId,
    engines: HashMap<CarId, EngineSetup>,
    calls: Vec<EngineCall>,
    failing_winner_writes: bool,
    failing_winner_deletes: bool,
    failing_stops: bool,
}

/// In-memory backend. Clone-friendly via Arc; clones share state.
#[derive(Clone, Default)]
pub struct InMemoryBackend {
    state: Arc<RwLock<State>>,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, State>, ApiError> {
        self.state
            .read()
            .map_err(|_| ApiError::Network("in-memory backend lock poisoned".into()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, State>, ApiError> {
        self.state
            .write()
            .map_err(|_| ApiError::Network("in-memory backend lock poisoned".into()))
    }

    // Test setup helpers never fail: a poisoned lock still holds usable data.
    fn setup(&self) -> RwLockWriteGuard<'_, State> {
        self.state.write().unwrap_or_else(|e| e.into_inner())
    }

    fn snapshot(&self) -> RwLockReadGuard<'_, State> {
        self.state.read().unwrap_or_else(|e| e.into_inner())
    }

    /// Add a car directly, bypassing the API.
    pub fn seed_car(&self, name: &str, color: &str) -> Car {
        let mut state = self.setup();
        insert_car(&mut state, NewCar::new(name, color))
    }

    /// Add a winner record directly, bypassing the API.
    pub fn seed_winner(&self, record: WinnerRecord) {
        self.setup().winners.insert(record.id, record);
    }

    /// Fix the stats `start_engine` returns and how `drive` ends for a car.
    pub fn script_engine(&self, id: CarId, stats: EngineStats, drive: DriveScript) {
        let mut state = self.setup();
        let setup = state.engines.entry(id).or_default();
        setup.stats = Some(stats);
        setup.drive = drive;
    }

    /// Delay the `drive` answer for a car.
    pub fn set_drive_latency(&self, id: CarId, latency: Duration) {
        self.setup().engines.entry(id).or_default().latency = latency;
    }

    /// Make `start_engine` fail with a transport error for a car.
    pub fn fail_start(&self, id: CarId) {
        self.setup().engines.entry(id).or_default().start_fails = true;
    }

    pub fn fail_winner_writes(&self, failing: bool) {
        self.setup().failing_winner_writes = failing;
    }

    pub fn fail_winner_deletes(&self, failing: bool) {
        self.setup().failing_winner_deletes = failing;
    }

    pub fn fail_stops(&self, failing: bool) {
        self.setup().failing_stops = failing;
    }

    pub fn engine_calls(&self) -> Vec<EngineCall> {
        self.snapshot().calls.clone()
    }

    pub fn clear_engine_calls(&self) {
        self.setup().calls.clear();
    }

    pub fn cars(&self) -> Vec<Car> {
        self.snapshot().cars.values().cloned().collect()
    }

    pub fn winner(&self, id: CarId) -> Option<WinnerRecord> {
        self.snapshot().winners.get(&id).cloned()
    }

    pub fn winners(&self) -> Vec<WinnerRecord> {
        self.snapshot().winners.values().cloned().collect()
    }
}

fn insert_car(state: &mut State, car: NewCar) -> Car {
    state.last_id += 1;
    let car = Car {
        id: state.last_id,
        name: car.name,
        color: car.color,
    };
    state.cars.insert(car.id, car.clone());
    car
}

fn random_stats() -> EngineStats {
    let velocity = rand::thread_rng().gen_range(50..=200);
    EngineStats::new(velocity as f64, TRACK_DISTANCE)
}

fn sort_winners(winners: &mut [WinnerRecord], sort: SortField, order: SortOrder) {
    winners.sort_by(|a, b| {
        let ordering = match sort {
            SortField::Id => a.id.cmp(&b.id),
            SortField::Wins => a.wins.cmp(&b.wins),
            SortField::Time => a.time.total_cmp(&b.time),
        };
        match order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    });
}

#[async_trait]
impl GarageApi for InMemoryBackend {
    async fn list_cars(&self, page: usize, limit: usize) -> Result<Page<Car>, ApiError> {
        let state = self.read()?;
        let cars: Vec<Car> = state.cars.values().cloned().collect();
        Ok(Page::new(paginate(&cars, page, limit), cars.len(), page, limit))
    }

    async fn get_car(&self, id: CarId) -> Result<Car, ApiError> {
        self.read()?
            .cars
            .get(&id)
            .cloned()
            .ok_or_else(|| ApiError::not_found("car", id))
    }

    async fn create_car(&self, car: &NewCar) -> Result<Car, ApiError> {
        let mut state = self.write()?;
        Ok(insert_car(&mut state, car.clone()))
    }

    async fn update_car(&self, id: CarId, car: &NewCar) -> Result<Car, ApiError> {
        let mut state = self.write()?;
        let stored = state
            .cars
            .get_mut(&id)
            .ok_or_else(|| ApiError::not_found("car", id))?;
        stored.name = car.name.clone();
        stored.color = car.color.clone();
        Ok(stored.clone())
    }

    async fn delete_car(&self, id: CarId) -> Result<(), ApiError> {
        let mut state = self.write()?;
        state
            .cars
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| ApiError::not_found("car", id))
    }
}

#[async_trait]
impl EngineApi for InMemoryBackend {
    async fn start_engine(&self, id: CarId) -> Result<EngineStats, ApiError> {
        let mut state = self.write()?;
        state.calls.push(EngineCall::Start(id));
        if !state.cars.contains_key(&id) {
            return Err(ApiError::not_found("car", id));
        }
        let setup = state.engines.get(&id).cloned().unwrap_or_default();
        if setup.start_fails {
            return Err(ApiError::Network(format!("connection reset starting car {}", id)));
        }
        Ok(setup.stats.unwrap_or_else(random_stats))
    }

    async fn stop_engine(&self, id: CarId) -> Result<(), ApiError> {
        let mut state = self.write()?;
        state.calls.push(EngineCall::Stop(id));
        if state.failing_stops {
            return Err(ApiError::Network(format!("connection reset stopping car {}", id)));
        }
        if !state.cars.contains_key(&id) {
            return Err(ApiError::not_found("car", id));
        }
        Ok(())
    }

    async fn drive(&self, id: CarId) -> Result<DriveStatus, ApiError> {
        let setup = {
            let mut state = self.write()?;
            state.calls.push(EngineCall::Drive(id));
            if !state.cars.contains_key(&id) {
                return Err(ApiError::not_found("car", id));
            }
            state.engines.get(&id).cloned().unwrap_or_default()
        };

        if !setup.latency.is_zero() {
            tokio::time::sleep(setup.latency).await;
        }

        match setup.drive {
            DriveScript::Complete => Ok(DriveStatus::Completed),
            DriveScript::Breakdown => Ok(DriveStatus::Breakdown),
            DriveScript::Fail => Err(ApiError::Network(format!("connection reset driving car {}", id))),
            DriveScript::Hang => std::future::pending().await,
        }
    }
}

#[async_trait]
impl WinnersApi for InMemoryBackend {
    async fn list_winners(&self, query: WinnersQuery) -> Result<Page<WinnerRecord>, ApiError> {
        let state = self.read()?;
        let mut winners: Vec<WinnerRecord> = state.winners.values().cloned().collect();
        sort_winners(&mut winners, query.sort, query.order);
        Ok(Page::new(
            paginate(&winners, query.page, query.limit),
            winners.len(),
            query.page,
            query.limit,
        ))
    }

    async fn get_winner(&self, id: CarId) -> Result<Option<WinnerRecord>, ApiError> {
        Ok(self.read()?.winners.get(&id).cloned())
    }

    async fn create_winner(&self, record: &WinnerRecord) -> Result<WinnerRecord, ApiError> {
        let mut state = self.write()?;
        if state.failing_winner_writes {
            return Err(ApiError::Network("winner store unavailable".into()));
        }
        if state.winners.contains_key(&record.id) {
            return Err(ApiError::Status {
                status: 500,
                message: format!("Insert failed, duplicate id {}", record.id),
            });
        }
        state.winners.insert(record.id, record.clone());
        Ok(record.clone())
    }

    async fn update_winner(&self, id: CarId, update: &WinnerUpdate) -> Result<WinnerRecord, ApiError> {
        let mut state = self.write()?;
        if state.failing_winner_writes {
            return Err(ApiError::Network("winner store unavailable".into()));
        }
        let stored = state
            .winners
            .get_mut(&id)
            .ok_or_else(|| ApiError::not_found("winner", id))?;
        stored.wins = update.wins;
        stored.time = update.time;
        Ok(stored.clone())
    }

    async fn delete_winner(&self, id: CarId) -> Result<(), ApiError> {
        let mut state = self.write()?;
        if state.failing_winner_deletes {
            return Err(ApiError::Network("winner store unavailable".into()));
        }
        state
            .winners
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| ApiError::not_found("winner", id))
    }
}
