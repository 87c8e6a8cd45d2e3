//! WinnersPresenter - the sortable, paginated winners table.

use futures::future::try_join_all;

use crate::backend::{GarageApi, WinnersApi, WinnersQuery};
use crate::error::ApiError;
use crate::model::{Page, SortField, SortOrder, WinnerRecord, WinnerWithCar};

pub struct WinnersPresenter<W, G> {
    winners: W,
    garage: G,
    page_size: usize,
    current: usize,
    sort: SortField,
    order: SortOrder,
    listing: Page<WinnerWithCar>,
}

impl<W: WinnersApi, G: GarageApi> WinnersPresenter<W, G> {
    /// Starts on page 1 sorted by wins, most first.
    pub fn new(winners: W, garage: G, page_size: usize) -> Self {
        Self {
            winners,
            garage,
            page_size,
            current: 1,
            sort: SortField::Wins,
            order: SortOrder::Desc,
            listing: Page::empty(1, page_size),
        }
    }

    pub fn rows(&self) -> &[WinnerWithCar] {
        &self.listing.items
    }

    pub fn listing(&self) -> &Page<WinnerWithCar> {
        &self.listing
    }

    pub fn total(&self) -> usize {
        self.listing.total
    }

    pub fn page(&self) -> usize {
        self.current
    }

    pub fn sort(&self) -> (SortField, SortOrder) {
        (self.sort, self.order)
    }

    /// Fetch the current page and join each record with its car.
    pub async fn load(&mut self) -> Result<&Page<WinnerWithCar>, ApiError> {
        let query = WinnersQuery::new(self.current, self.page_size).sorted(self.sort, self.order);
        let page = self.winners.list_winners(query).await?;
        let rows = try_join_all(page.items.iter().cloned().map(|record| self.join(record))).await?;
        self.listing = Page::new(rows, page.total, page.page, page.limit);
        Ok(&self.listing)
    }

    async fn join(&self, record: WinnerRecord) -> Result<WinnerWithCar, ApiError> {
        let car = match self.garage.get_car(record.id).await {
            Ok(car) => Some(car),
            Err(err) if err.is_not_found() => None,
            Err(err) => return Err(err),
        };
        Ok(WinnerWithCar { record, car })
    }

    /// Sort by `field`. Choosing the same column again flips the order;
    /// a new column starts with most wins first, or lowest id/time first.
    pub async fn change_sort(&mut self, field: SortField) -> Result<&Page<WinnerWithCar>, ApiError> {
        if field == self.sort {
            self.order = self.order.toggle();
        } else {
            self.sort = field;
            self.order = match field {
                SortField::Wins => SortOrder::Desc,
                SortField::Id | SortField::Time => SortOrder::Asc,
            };
        }
        self.current = 1;
        self.load().await
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
}
