//! Upstream weather provider client (WeatherAPI.com-style `current.json`).

use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::instrument;
use weatherdash_core::{NetworkError, ReqwestErrorExt, WeatherConfig};

use crate::error::WeatherError;
use crate::types::ApiCurrentResponse;

const USER_AGENT: &str = concat!("weatherdash/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

#[derive(Debug, Clone)]
pub struct WeatherProvider {
    client: Arc<Client>,
    base_url: String,
    api_key: Option<String>,
}

impl WeatherProvider {
    pub fn new(config: &WeatherConfig) -> Result<Self, WeatherError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .user_agent(USER_AGENT)
            .build()
            .map_err(ReqwestErrorExt::into_network_error)?;

        Ok(Self {
            client: Arc::new(client),
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        })
    }

    /// Fetch current conditions for `location`.
    ///
    /// Any transport failure, non-success status or undecodable body is
    /// reported as `UpstreamRequestFailed`.
    #[instrument(skip(self), level = "info")]
    pub(crate) async fn fetch_current(&self, location: &str) -> Result<ApiCurrentResponse, WeatherError> {
        let url = format!("{}/current.json", self.base_url);

        let mut request = self.client.get(&url).query(&[("q", location)]);
        if let Some(key) = &self.api_key {
            request = request.query(&[("key", key.as_str())]);
        }

        let response = request
            .send()
            .await
            .map_err(ReqwestErrorExt::into_network_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorBody>(&body)
                .map(|b| b.error.message)
                .unwrap_or(body);
            tracing::debug!("Upstream returned {}: {}", status, message);
            return Err(NetworkError::ServerError {
                status: status.as_u16(),
                message,
            }
            .into());
        }

        let body = response
            .text()
            .await
            .map_err(ReqwestErrorExt::into_network_error)?;

        serde_json::from_str(&body)
            .map_err(|e| NetworkError::InvalidResponse(e.to_string()).into())
    }
}
