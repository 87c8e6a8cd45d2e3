//! HTTP backend over reqwest.
//!
//! Routes, query strings and bodies follow the async-race mock server:
//!
//! - `GET /garage?_page=P&_limit=L` (total in `X-Total-Count`)
//! - `GET|PUT|DELETE /garage/{id}`, `POST /garage`
//! - `PATCH /engine?id={id}&status=started|stopped|drive`
//! - `GET /winners?_page=P&_limit=L&_sort=F&_order=O`
//! - `GET|PUT|DELETE /winners/{id}`, `POST /winners`

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;

use super::{DriveStatus, EngineApi, GarageApi, WinnersApi, WinnersQuery};
use crate::config::Config;
use crate::error::ApiError;
use crate::model::{Car, CarId, EngineStats, NewCar, Page, WinnerRecord, WinnerUpdate};

const TOTAL_COUNT_HEADER: &str = "X-Total-Count";

/// Backend reached over HTTP. Clone-friendly: reqwest's client is shared.
#[derive(Clone, Debug)]
pub struct HttpBackend {
    client: Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(config: &Config) -> Result<Self, ApiError> {
        let client = Client::builder()
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;
        Ok(Self::with_client(client, &config.base_url))
    }

    pub fn with_client(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client
            .request(method, format!("{}{}", self.base_url, path))
    }

    fn engine(&self, id: CarId, status: &str) -> RequestBuilder {
        self.request(Method::PATCH, "/engine")
            .query(&[("id", id.to_string()), ("status", status.to_string())])
    }
}

async fn send(request: RequestBuilder) -> Result<Response, ApiError> {
    request.send().await.map_err(transport_error)
}

fn transport_error(err: reqwest::Error) -> ApiError {
    if err.is_decode() {
        ApiError::Decode(err.to_string())
    } else {
        ApiError::Network(err.to_string())
    }
}

/// Turn non-success statuses into errors; 404 names the resource asked for.
async fn check(
    response: Response,
    resource: &'static str,
    id: Option<CarId>,
) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    if status == StatusCode::NOT_FOUND {
        if let Some(id) = id {
            return Err(ApiError::not_found(resource, id));
        }
    }
    let message = response.text().await.unwrap_or_default();
    Err(ApiError::Status {
        status: status.as_u16(),
        message,
    })
}

async fn json<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    response
        .json::<T>()
        .await
        .map_err(|e| ApiError::Decode(e.to_string()))
}

async fn page<T: DeserializeOwned>(
    response: Response,
    page: usize,
    limit: usize,
) -> Result<Page<T>, ApiError> {
    let total = response
        .headers()
        .get(TOTAL_COUNT_HEADER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse::<usize>().ok());
    let items: Vec<T> = json(response).await?;
    let total = total.unwrap_or(items.len());
    Ok(Page::new(items, total, page, limit))
}

#[async_trait]
impl GarageApi for HttpBackend {
    async fn list_cars(&self, page_no: usize, limit: usize) -> Result<Page<Car>, ApiError> {
        let request = self
            .request(Method::GET, "/garage")
            .query(&[("_page", page_no), ("_limit", limit)]);
        let response = check(send(request).await?, "car", None).await?;
        page(response, page_no, limit).await
    }

    async fn get_car(&self, id: CarId) -> Result<Car, ApiError> {
        let request = self.request(Method::GET, &format!("/garage/{}", id));
        let response = check(send(request).await?, "car", Some(id)).await?;
        json(response).await
    }

    async fn create_car(&self, car: &NewCar) -> Result<Car, ApiError> {
        let request = self.request(Method::POST, "/garage").json(car);
        let response = check(send(request).await?, "car", None).await?;
        json(response).await
    }

    async fn update_car(&self, id: CarId, car: &NewCar) -> Result<Car, ApiError> {
        let request = self.request(Method::PUT, &format!("/garage/{}", id)).json(car);
        let response = check(send(request).await?, "car", Some(id)).await?;
        json(response).await
    }

    async fn delete_car(&self, id: CarId) -> Result<(), ApiError> {
        let request = self.request(Method::DELETE, &format!("/garage/{}", id));
        check(send(request).await?, "car", Some(id)).await?;
        Ok(())
    }
}

#[async_trait]
impl EngineApi for HttpBackend {
    async fn start_engine(&self, id: CarId) -> Result<EngineStats, ApiError> {
        let response = check(send(self.engine(id, "started")).await?, "car", Some(id)).await?;
        json(response).await
    }

    async fn stop_engine(&self, id: CarId) -> Result<(), ApiError> {
        check(send(self.engine(id, "stopped")).await?, "car", Some(id)).await?;
        Ok(())
    }

    async fn drive(&self, id: CarId) -> Result<DriveStatus, ApiError> {
        let response = send(self.engine(id, "drive")).await?;
        // The backend reports a broken engine with a 5xx.
        match check(response, "car", Some(id)).await {
            Ok(_) => Ok(DriveStatus::Completed),
            Err(ApiError::Status { status, .. }) if status >= 500 => Ok(DriveStatus::Breakdown),
            Err(err) => Err(err),
        }
    }
}

#[async_trait]
impl WinnersApi for HttpBackend {
    async fn list_winners(&self, query: WinnersQuery) -> Result<Page<WinnerRecord>, ApiError> {
        let request = self.request(Method::GET, "/winners").query(&[
            ("_page", query.page.to_string()),
            ("_limit", query.limit.to_string()),
            ("_sort", query.sort.to_string()),
            ("_order", query.order.to_string()),
        ]);
        let response = check(send(request).await?, "winner", None).await?;
        page(response, query.page, query.limit).await
    }

    async fn get_winner(&self, id: CarId) -> Result<Option<WinnerRecord>, ApiError> {
        let request = self.request(Method::GET, &format!("/winners/{}", id));
        match check(send(request).await?, "winner", Some(id)).await {
            Ok(response) => json(response).await.map(Some),
            Err(err) if err.is_not_found() => Ok(None),
            Err(err) => Err(err),
        }
    }

    async fn create_winner(&self, record: &WinnerRecord) -> Result<WinnerRecord, ApiError> {
        let request = self.request(Method::POST, "/winners").json(record);
        let response = check(send(request).await?, "winner", None).await?;
        json(response).await
    }

    async fn update_winner(&self, id: CarId, update: &WinnerUpdate) -> Result<WinnerRecord, ApiError> {
        let request = self
            .request(Method::PUT, &format!("/winners/{}", id))
            .json(update);
        let response = check(send(request).await?, "winner", Some(id)).await?;
        json(response).await
    }

    async fn delete_winner(&self, id: CarId) -> Result<(), ApiError> {
        let request = self.request(Method::DELETE, &format!("/winners/{}", id));
        check(send(request).await?, "winner", Some(id)).await?;
        Ok(())
    }
}
