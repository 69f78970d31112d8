use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;
use weatherdash_weather::WeatherError;

use crate::response::ApiResponse;

/// Errors a weather endpoint can answer with.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("location is required")]
    InvalidLocation,

    #[error("invalid unit: {0}")]
    InvalidUnit(String),

    /// Query string or body that could not be extracted at all.
    #[error("malformed request: {0}")]
    InvalidRequest(String),

    #[error(transparent)]
    Weather(#[from] WeatherError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidLocation | Self::InvalidUnit(_) | Self::InvalidRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::Weather(WeatherError::UpstreamRequestFailed(_))
            | Self::Weather(WeatherError::TemperatureOutOfRange { .. }) => StatusCode::BAD_GATEWAY,
            Self::Weather(WeatherError::NoCachedDataAvailable) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidLocation => "INVALID_LOCATION",
            Self::InvalidUnit(_) => "INVALID_UNIT",
            Self::InvalidRequest(_) => "INVALID_REQUEST",
            Self::Weather(WeatherError::UpstreamRequestFailed(_)) => "UPSTREAM_REQUEST_FAILED",
            Self::Weather(WeatherError::TemperatureOutOfRange { .. }) => {
                "TEMPERATURE_OUT_OF_RANGE"
            }
            Self::Weather(WeatherError::NoCachedDataAvailable) => "NO_CACHED_DATA",
        }
    }

    fn message(&self) -> String {
        match self {
            Self::InvalidLocation => "A non-empty location is required.".to_string(),
            Self::InvalidUnit(unit) => {
                format!("Unknown unit '{}'. Use celsius or fahrenheit.", unit)
            }
            Self::InvalidRequest(detail) => format!("Malformed request: {}", detail),
            Self::Weather(e) => e.user_message().to_string(),
        }
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::InvalidRequest(rejection.body_text())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::InvalidRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("Error encountered while processing request: {}", self);
        } else {
            tracing::debug!("Rejected request: {}", self);
        }

        let body = ApiResponse::err(self.code(), self.message());
        (status, Json(body)).into_response()
    }
}
