//! Backend - the REST collaborator behind the garage, engines and winners.
//!
//! Each resource of the backend gets its own trait so that components only
//! ask for what they use: the race needs `EngineApi`, the ledger needs
//! `WinnersApi`, the garage view needs `GarageApi` plus `WinnersApi` for the
//! delete cascade.
//!
//! ## Implementations
//!
//! - [`HttpBackend`] (feature `client`) talks to the real mock server over
//!   reqwest.
//! - [`InMemoryBackend`] keeps everything in process and lets tests script
//!   engine behaviour per car.
//!
//! ```ignore
//! use async_race::{Config, HttpBackend, GarageApi};
//!
//! let backend = HttpBackend::new(&Config::from_env())?;
//! let page = backend.list_cars(1, 7).await?;
//! println!("{} cars in the garage", page.total);
//! ```

#[cfg(feature = "client")]
mod http;
mod in_memory;

use async_trait::async_trait;

use crate::error::ApiError;
use crate::model::{Car, CarId, EngineStats, NewCar, Page, SortField, SortOrder, WinnerRecord, WinnerUpdate};

#[cfg(feature = "client")]
pub use http::HttpBackend;
pub use in_memory::{DriveScript, EngineCall, InMemoryBackend, TRACK_DISTANCE};

/// Result of `PATCH /engine?status=drive` when the backend answered at all.
///
/// A breakdown is a business outcome carried by a non-success response, not
/// a transport failure; transport failures are `ApiError`s.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriveStatus {
    Completed,
    Breakdown,
}

/// Query of `GET /winners`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WinnersQuery {
    pub page: usize,
    pub limit: usize,
    pub sort: SortField,
    pub order: SortOrder,
}

impl WinnersQuery {
    pub fn new(page: usize, limit: usize) -> Self {
        Self {
            page,
            limit,
            sort: SortField::default(),
            order: SortOrder::default(),
        }
    }

    pub fn sorted(mut self, sort: SortField, order: SortOrder) -> Self {
        self.sort = sort;
        self.order = order;
        self
    }
}

/// `/garage` resource.
#[async_trait]
pub trait GarageApi: Send + Sync {
    async fn list_cars(&self, page: usize, limit: usize) -> Result<Page<Car>, ApiError>;

    async fn get_car(&self, id: CarId) -> Result<Car, ApiError>;

    async fn create_car(&self, car: &NewCar) -> Result<Car, ApiError>;

    async fn update_car(&self, id: CarId, car: &NewCar) -> Result<Car, ApiError>;

    async fn delete_car(&self, id: CarId) -> Result<(), ApiError>;
}

/// `/engine` resource.
#[async_trait]
pub trait EngineApi: Send + Sync {
    async fn start_engine(&self, id: CarId) -> Result<EngineStats, ApiError>;

    async fn stop_engine(&self, id: CarId) -> Result<(), ApiError>;

    async fn drive(&self, id: CarId) -> Result<DriveStatus, ApiError>;
}

/// `/winners` resource.
#[async_trait]
pub trait WinnersApi: Send + Sync {
    async fn list_winners(&self, query: WinnersQuery) -> Result<Page<WinnerRecord>, ApiError>;

    /// Look up one record. A 404 is `Ok(None)`.
    async fn get_winner(&self, id: CarId) -> Result<Option<WinnerRecord>, ApiError>;

    async fn create_winner(&self, record: &WinnerRecord) -> Result<WinnerRecord, ApiError>;

    async fn update_winner(&self, id: CarId, update: &WinnerUpdate) -> Result<WinnerRecord, ApiError>;

    async fn delete_winner(&self, id: CarId) -> Result<(), ApiError>;
}

/// Everything the application needs from one backend handle.
pub trait Backend: GarageApi + EngineApi + WinnersApi + Clone + 'static {}

impl<T> Backend for T where T: GarageApi + EngineApi + WinnersApi + Clone + 'static {}
