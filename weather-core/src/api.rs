//! JSON HTTP surface consumed by the frontend.
//!
//! - `GET /geocode?city=<name>` -> `{ lat, lon, city }`
//! - `GET /weather?lat=<f64>&lon=<f64>&units=<metric|imperial>` -> `{ current, forecast }`
//! - `GET /health` -> `{ status: "ok" }`
//!
//! Failures are reported as `{ "error": "<message>" }` with 400, 404 or 500.

use axum::{
    Json, Router,
    extract::{Query, State, rejection::QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;

use crate::{
    WeatherError, WeatherService,
    error::Stage,
    model::{Coordinate, Place, Units, WeatherSnapshot},
};

#[derive(Debug, Deserialize)]
pub struct GeocodeQuery {
    city: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct WeatherQuery {
    lat: Option<String>,
    lon: Option<String>,
    units: Option<String>,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

#[derive(Debug, Serialize)]
struct HealthBody {
    status: &'static str,
}

/// Error returned by handlers, rendered as a JSON `{ "error": ... }` body.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<WeatherError> for ApiError {
    fn from(err: WeatherError) -> Self {
        let (status, message) = match &err {
            WeatherError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            WeatherError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            WeatherError::Aggregation {
                stage: Stage::Current,
                ..
            } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Unable to fetch current weather".to_string(),
            ),
            WeatherError::Aggregation {
                stage: Stage::Forecast,
                ..
            } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Unable to fetch forecast".to_string(),
            ),
            WeatherError::Provider(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Weather provider unavailable".to_string(),
            ),
        };

        if status.is_server_error() {
            tracing::error!("request failed: {err:#}");
        }

        Self { status, message }
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ErrorBody { error: self.message })).into_response()
    }
}

pub fn router(service: WeatherService) -> Router {
    Router::new()
        .route("/geocode", get(geocode))
        .route("/weather", get(weather))
        .route("/health", get(health))
        .with_state(service)
}

/// Serve the API on an already bound listener until the process stops.
pub async fn serve(listener: TcpListener, service: WeatherService) -> anyhow::Result<()> {
    if let Ok(addr) = listener.local_addr() {
        tracing::info!("Weather API listening on http://{addr}");
    }
    axum::serve(listener, router(service)).await?;
    Ok(())
}

async fn geocode(
    State(service): State<WeatherService>,
    query: Result<Query<GeocodeQuery>, QueryRejection>,
) -> Result<Json<Place>, ApiError> {
    let Query(query) = query?;
    let city = query.city.unwrap_or_default();
    let place = service.geocode(&city).await?;
    Ok(Json(place))
}

async fn weather(
    State(service): State<WeatherService>,
    query: Result<Query<WeatherQuery>, QueryRejection>,
) -> Result<Json<WeatherSnapshot>, ApiError> {
    let Query(query) = query?;
    let coord = parse_coordinate(query.lat.as_deref(), query.lon.as_deref())?;
    let units = match query.units.as_deref().map(str::trim) {
        None | Some("") => Units::default(),
        Some(raw) => Units::try_from(raw)?,
    };

    let snapshot = service.get_weather(coord, units).await?;
    Ok(Json(snapshot))
}

async fn health() -> Json<HealthBody> {
    Json(HealthBody { status: "ok" })
}

fn parse_coordinate(lat: Option<&str>, lon: Option<&str>) -> Result<Coordinate, ApiError> {
    let required = || ApiError::bad_request("Latitude and longitude are required");

    let lat = lat.map(str::trim).filter(|s| !s.is_empty()).ok_or_else(required)?;
    let lon = lon.map(str::trim).filter(|s| !s.is_empty()).ok_or_else(required)?;

    let latitude = lat
        .parse::<f64>()
        .map_err(|_| ApiError::bad_request(format!("Invalid latitude '{lat}'")))?;
    let longitude = lon
        .parse::<f64>()
        .map_err(|_| ApiError::bad_request(format!("Invalid longitude '{lon}'")))?;

    Ok(Coordinate::new(latitude, longitude))
}
