//! HTTP layer for weatherdash.
//!
//! Thin axum wrapper over [`WeatherPolicy`]: request validation, the JSON
//! envelope and error-to-status mapping live here, the policy does the rest.

pub mod error;
pub mod response;
pub mod routes;

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use weatherdash_core::{AppError, ConfigError, ServerConfig, TemperatureUnit};
use weatherdash_weather::WeatherPolicy;

pub use error::ApiError;

// Cloned per request; every clone must share the same policy and cache slot.
#[derive(Clone)]
pub struct AppState {
    pub policy: Arc<WeatherPolicy>,
    pub default_unit: TemperatureUnit,
}

impl AppState {
    pub fn new(policy: Arc<WeatherPolicy>, default_unit: TemperatureUnit) -> Self {
        Self {
            policy,
            default_unit,
        }
    }
}

pub fn create_app(state: AppState) -> Router {
    routes::routes(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Bind according to `config` and serve until `shutdown` is cancelled.
pub async fn serve(
    config: &ServerConfig,
    state: AppState,
    shutdown: CancellationToken,
) -> Result<(), AppError> {
    let ip: IpAddr = config.bind_address.parse().map_err(|_| {
        ConfigError::Invalid(format!("server.bind_address: {}", config.bind_address))
    })?;
    let listener = TcpListener::bind(SocketAddr::new(ip, config.port)).await?;
    serve_listener(listener, state, shutdown).await
}

/// Serve on an already-bound listener until `shutdown` is cancelled.
pub async fn serve_listener(
    listener: TcpListener,
    state: AppState,
    shutdown: CancellationToken,
) -> Result<(), AppError> {
    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, create_app(state))
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await?;

    tracing::info!("server stopped");
    Ok(())
}
