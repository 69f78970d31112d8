use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Json, Query, State,
    },
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use weatherdash_weather::{CacheStatus, TemperatureUnit, WeatherReading};

use crate::error::ApiError;
use crate::response::ApiResponse;
use crate::AppState;

/// Response header telling the dashboard whether data came live or from the cache.
pub const SOURCE_HEADER: &str = "x-weather-source";

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/api/weather", get(get_weather))
        .route("/api/weather/refresh", post(refresh_weather))
        .route("/api/weather/cache", get(get_cache_status).delete(clear_cache))
        .route("/health", get(health))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
pub struct WeatherQuery {
    location: Option<String>,
    unit: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    location: Option<String>,
}

fn required_location(location: Option<String>) -> Result<String, ApiError> {
    location
        .map(|l| l.trim().to_string())
        .filter(|l| !l.is_empty())
        .ok_or(ApiError::InvalidLocation)
}

fn parse_unit(unit: Option<&str>, default: TemperatureUnit) -> Result<TemperatureUnit, ApiError> {
    match unit.map(str::trim).filter(|u| !u.is_empty()) {
        Some(u) => u.parse().map_err(|_| ApiError::InvalidUnit(u.to_string())),
        None => Ok(default),
    }
}

fn reading_response(reading: WeatherReading) -> Response {
    let source = if reading.connection_status.is_live() {
        "live"
    } else {
        "cache"
    };
    let mut response = Json(ApiResponse::ok(reading)).into_response();
    response
        .headers_mut()
        .insert(SOURCE_HEADER, HeaderValue::from_static(source));
    response
}

async fn get_weather(
    State(state): State<AppState>,
    query: Result<Query<WeatherQuery>, QueryRejection>,
) -> Result<Response, ApiError> {
    let Query(query) = query?;
    let location = required_location(query.location)?;
    let unit = parse_unit(query.unit.as_deref(), state.default_unit)?;

    let reading = state.policy.get_weather(&location, Some(unit)).await?;
    Ok(reading_response(reading))
}

async fn refresh_weather(
    State(state): State<AppState>,
    request: Result<Json<RefreshRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(request) = request?;
    let location = required_location(request.location)?;

    let reading = state.policy.refresh_weather(&location).await?;
    Ok(reading_response(reading.in_unit(state.default_unit)))
}

async fn get_cache_status(State(state): State<AppState>) -> Json<ApiResponse<CacheStatus>> {
    Json(ApiResponse::ok(state.policy.cache_status()))
}

async fn clear_cache(State(state): State<AppState>) -> StatusCode {
    state.policy.clear_cache();
    StatusCode::NO_CONTENT
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_required_location() {
        assert_eq!(required_location(Some(" London ".into())).unwrap(), "London");
        assert!(matches!(required_location(Some("   ".into())), Err(ApiError::InvalidLocation)));
        assert!(matches!(required_location(None), Err(ApiError::InvalidLocation)));
    }

    #[test]
    fn test_parse_unit() {
        assert_eq!(
            parse_unit(None, TemperatureUnit::Fahrenheit).unwrap(),
            TemperatureUnit::Fahrenheit
        );
        assert_eq!(
            parse_unit(Some("celsius"), TemperatureUnit::Fahrenheit).unwrap(),
            TemperatureUnit::Celsius
        );
        assert!(matches!(
            parse_unit(Some("kelvin"), TemperatureUnit::Celsius),
            Err(ApiError::InvalidUnit(u)) if u == "kelvin"
        ));
    }
}
