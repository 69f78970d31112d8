//! Weather policy error types.

use thiserror::Error;
use weatherdash_core::NetworkError;

#[derive(Error, Debug)]
pub enum WeatherError {
    #[error("Upstream request failed: {0}")]
    UpstreamRequestFailed(#[from] NetworkError),

    #[error("Temperature {celsius}°C outside plausible range")]
    TemperatureOutOfRange { celsius: f64 },

    #[error("No cached weather data available")]
    NoCachedDataAvailable,
}

impl WeatherError {
    /// User-friendly error message for API responses.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::UpstreamRequestFailed(e) => e.user_message(),
            Self::TemperatureOutOfRange { .. } => {
                "The weather service returned an implausible reading."
            }
            Self::NoCachedDataAvailable => "No weather data is available yet.",
        }
    }

    /// Whether a cached reading may be served in place of this error.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::UpstreamRequestFailed(_) | Self::TemperatureOutOfRange { .. }
        )
    }
}
