//! GaragePresenter - the paginated list of cars and the edits made on it.

use std::sync::Arc;

use futures::future::try_join_all;
use log::info;

use super::random::{is_hex_color, random_cars};
use crate::backend::{GarageApi, WinnersApi};
use crate::error::ApiError;
use crate::ledger::WinnerLedger;
use crate::model::{Car, CarId, NewCar, Page};

pub struct GaragePresenter<G, W> {
    api: G,
    ledger: Arc<WinnerLedger<W>>,
    page_size: usize,
    current: usize,
    listing: Page<Car>,
    selected: Option<Car>,
}

impl<G: GarageApi, W: WinnersApi> GaragePresenter<G, W> {
    pub fn new(api: G, ledger: Arc<WinnerLedger<W>>, page_size: usize) -> Self {
        Self {
            api,
            ledger,
            page_size,
            current: 1,
            listing: Page::empty(1, page_size),
            selected: None,
        }
    }

    /// Cars of the page on screen.
    pub fn cars(&self) -> &[Car] {
        &self.listing.items
    }

    pub fn listing(&self) -> &Page<Car> {
        &self.listing
    }

    pub fn total(&self) -> usize {
        self.listing.total
    }

    pub fn page(&self) -> usize {
        self.current
    }

    pub fn selected(&self) -> Option<&Car> {
        self.selected.as_ref()
    }

    /// Reload the current page. A page left empty by deletions falls back
    /// to the last page that still has cars.
    pub async fn load(&mut self) -> Result<&Page<Car>, ApiError> {
        let mut listing = self.api.list_cars(self.current, self.page_size).await?;
        if listing.items.is_empty() && self.current > 1 && listing.total > 0 {
            self.current = listing.page_count();
            listing = self.api.list_cars(self.current, self.page_size).await?;
        }
        self.listing = listing;
        Ok(&self.listing)
    }

    pub async fn next_page(&mut self) -> Result<bool, ApiError> {
        if !self.listing.has_next() {
            return Ok(false);
        }
        self.current += 1;
        self.load().await?;
        Ok(true)
    }

    pub async fn prev_page(&mut self) -> Result<bool, ApiError> {
        if self.current <= 1 {
            return Ok(false);
        }
        self.current -= 1;
        self.load().await?;
        Ok(true)
    }

    pub async fn create(&mut self, name: &str, color: &str) -> Result<Car, ApiError> {
        let car = self.api.create_car(&validated(name, color)?).await?;
        info!("created car {} ({})", car.id, car.name);
        self.load().await?;
        Ok(car)
    }

    pub async fn update(&mut self, id: CarId, name: &str, color: &str) -> Result<Car, ApiError> {
        let car = self.api.update_car(id, &validated(name, color)?).await?;
        if self.selected.as_ref().is_some_and(|s| s.id == id) {
            self.selected = None;
        }
        self.load().await?;
        Ok(car)
    }

    /// Pick a car of the current page for editing.
    pub fn select(&mut self, id: CarId) -> Option<&Car> {
        self.selected = self.listing.items.iter().find(|car| car.id == id).cloned();
        self.selected.as_ref()
    }

    /// Delete a car and, best effort, its winner record.
    pub async fn delete(&mut self, id: CarId) -> Result<(), ApiError> {
        self.api.delete_car(id).await?;
        info!("deleted car {}", id);
        self.ledger.forget(id).await;
        if self.selected.as_ref().is_some_and(|s| s.id == id) {
            self.selected = None;
        }
        self.load().await?;
        Ok(())
    }

    /// Create `count` random cars at once.
    pub async fn generate(&mut self, count: usize) -> Result<Vec<Car>, ApiError> {
        let cars = random_cars(count);
        let created = try_join_all(cars.iter().map(|car| self.api.create_car(car))).await?;
        info!("generated {} car(s)", created.len());
        self.load().await?;
        Ok(created)
    }
}

fn validated(name: &str, color: &str) -> Result<NewCar, ApiError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ApiError::Invalid("car name must not be empty".into()));
    }
    if !is_hex_color(color) {
        return Err(ApiError::Invalid(format!("'{}' is not a #RRGGBB color", color)));
    }
    Ok(NewCar::new(name, color))
}
