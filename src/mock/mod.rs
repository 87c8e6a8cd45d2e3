//! Mock server - the async-race REST API served over an [`InMemoryBackend`].
//!
//! Requires the `mock` feature. Uses axum for routing and answers the way the
//! json-server based reference backend does.
//!
//! ## Routes
//!
//! - `GET /garage?_page&_limit` - cars, total in `X-Total-Count`.
//! - `GET|PUT|DELETE /garage/:id`, `POST /garage`.
//! - `PATCH /engine?id&status=started|stopped|drive` - engine control. A
//!   breakdown answers `500`.
//! - `GET /winners?_page&_limit&_sort&_order` - winners, total in
//!   `X-Total-Count`.
//! - `GET|PUT|DELETE /winners/:id`, `POST /winners`.
//!
//! ## Example
//!
//! ```ignore
//! use async_race::{mock, InMemoryBackend};
//!
//! let backend = InMemoryBackend::new();
//! backend.seed_car("Tesla Model S", "#e6e6fa");
//! mock::serve(backend, "127.0.0.1:3000").await?;
//! ```

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, patch};
use axum::{Json, Router};
use log::{debug, info};
use serde::Deserialize;
use serde_json::json;

use crate::backend::{
    DriveStatus, EngineApi, GarageApi, InMemoryBackend, WinnersApi, WinnersQuery, TRACK_DISTANCE,
};
use crate::error::ApiError;
use crate::model::{CarId, NewCar, Page, SortField, SortOrder, WinnerRecord, WinnerUpdate};

/// Header carrying the unpaginated collection size.
pub const TOTAL_COUNT_HEADER: &str = "X-Total-Count";

const BREAKDOWN_MESSAGE: &str =
    "Car has been stopped suddenly. It's engine was broken down.";

/// Build an axum `Router` serving the API from `backend`.
pub fn router(backend: InMemoryBackend) -> Router {
    Router::new()
        .route("/garage", get(list_cars).post(create_car))
        .route("/garage/:id", get(get_car).put(update_car).delete(delete_car))
        .route("/engine", patch(engine))
        .route("/winners", get(list_winners).post(create_winner))
        .route(
            "/winners/:id",
            get(get_winner).put(update_winner).delete(delete_winner),
        )
        .with_state(backend)
}

/// Serve the API at the given address (e.g. `"127.0.0.1:3000"`).
pub async fn serve(backend: InMemoryBackend, addr: &str) -> Result<(), std::io::Error> {
    let app = router(backend);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("mock server listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await
}

/// An [`ApiError`] rendered as a JSON error response.
struct Failure(ApiError);

impl From<ApiError> for Failure {
    fn from(e: ApiError) -> Self {
        Failure(e)
    }
}

impl IntoResponse for Failure {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.0.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        debug!("answering {}: {}", status, self.0);
        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}

type Reply<T> = Result<T, Failure>;

#[derive(Debug, Default, Deserialize)]
struct ListParams {
    #[serde(rename = "_page")]
    page: Option<usize>,
    /// Absent means everything on one page.
    #[serde(rename = "_limit")]
    limit: Option<usize>,
    #[serde(rename = "_sort")]
    sort: Option<String>,
    #[serde(rename = "_order")]
    order: Option<String>,
}

impl ListParams {
    fn page(&self) -> usize {
        self.page.unwrap_or(1).max(1)
    }

    fn limit(&self) -> usize {
        self.limit.unwrap_or(0)
    }

    fn winners_query(&self) -> Result<WinnersQuery, ApiError> {
        let sort = match &self.sort {
            Some(sort) => sort.parse::<SortField>().map_err(ApiError::Invalid)?,
            None => SortField::Id,
        };
        let order = match &self.order {
            Some(order) => order.parse::<SortOrder>().map_err(ApiError::Invalid)?,
            None => SortOrder::Asc,
        };
        Ok(WinnersQuery::new(self.page(), self.limit()).sorted(sort, order))
    }
}

fn listing<T: serde::Serialize>(page: Page<T>) -> Response {
    let total = page.total.to_string();
    ([(TOTAL_COUNT_HEADER, total)], Json(page.items)).into_response()
}

async fn list_cars(
    State(backend): State<InMemoryBackend>,
    Query(params): Query<ListParams>,
) -> Reply<Response> {
    let page = backend.list_cars(params.page(), params.limit()).await?;
    Ok(listing(page))
}

async fn get_car(State(backend): State<InMemoryBackend>, Path(id): Path<CarId>) -> Reply<Response> {
    Ok(Json(backend.get_car(id).await?).into_response())
}

async fn create_car(
    State(backend): State<InMemoryBackend>,
    Json(car): Json<NewCar>,
) -> Reply<Response> {
    let car = backend.create_car(&car).await?;
    Ok((StatusCode::CREATED, Json(car)).into_response())
}

async fn update_car(
    State(backend): State<InMemoryBackend>,
    Path(id): Path<CarId>,
    Json(car): Json<NewCar>,
) -> Reply<Response> {
    Ok(Json(backend.update_car(id, &car).await?).into_response())
}

async fn delete_car(State(backend): State<InMemoryBackend>, Path(id): Path<CarId>) -> Reply<Response> {
    backend.delete_car(id).await?;
    Ok(Json(json!({})).into_response())
}

#[derive(Debug, Deserialize)]
struct EngineParams {
    id: CarId,
    status: String,
}

async fn engine(
    State(backend): State<InMemoryBackend>,
    Query(params): Query<EngineParams>,
) -> Reply<Response> {
    let id = params.id;
    match params.status.as_str() {
        "started" => Ok(Json(backend.start_engine(id).await?).into_response()),
        "stopped" => {
            backend.stop_engine(id).await?;
            Ok(Json(json!({ "velocity": 0, "distance": TRACK_DISTANCE })).into_response())
        }
        "drive" => match backend.drive(id).await? {
            DriveStatus::Completed => Ok(Json(json!({ "success": true })).into_response()),
            DriveStatus::Breakdown => {
                Ok((StatusCode::INTERNAL_SERVER_ERROR, BREAKDOWN_MESSAGE).into_response())
            }
        },
        other => Err(ApiError::Invalid(format!(
            "wrong status '{}', use started, stopped or drive",
            other
        ))
        .into()),
    }
}

async fn list_winners(
    State(backend): State<InMemoryBackend>,
    Query(params): Query<ListParams>,
) -> Reply<Response> {
    let page = backend.list_winners(params.winners_query()?).await?;
    Ok(listing(page))
}

async fn get_winner(
    State(backend): State<InMemoryBackend>,
    Path(id): Path<CarId>,
) -> Reply<Response> {
    match backend.get_winner(id).await? {
        Some(record) => Ok(Json(record).into_response()),
        None => Err(ApiError::not_found("winner", id).into()),
    }
}

async fn create_winner(
    State(backend): State<InMemoryBackend>,
    Json(record): Json<WinnerRecord>,
) -> Reply<Response> {
    let record = backend.create_winner(&record).await?;
    Ok((StatusCode::CREATED, Json(record)).into_response())
}

async fn update_winner(
    State(backend): State<InMemoryBackend>,
    Path(id): Path<CarId>,
    Json(update): Json<WinnerUpdate>,
) -> Reply<Response> {
    Ok(Json(backend.update_winner(id, &update).await?).into_response())
}

async fn delete_winner(
    State(backend): State<InMemoryBackend>,
    Path(id): Path<CarId>,
) -> Reply<Response> {
    backend.delete_winner(id).await?;
    Ok(Json(json!({})).into_response())
}
