//! Fetch-or-fallback policy over the upstream provider and the cache slot.

use chrono::Utc;
use tracing::instrument;
use weatherdash_core::WeatherConfig;

use crate::cache::WeatherCache;
use crate::convert::round1;
use crate::error::WeatherError;
use crate::provider::WeatherProvider;
use crate::types::{
    ApiCurrentResponse, CacheStatus, ConnectionStatus, TemperatureUnit, WeatherReading,
};

/// Lowest Celsius reading accepted from the provider.
pub const MIN_PLAUSIBLE_CELSIUS: f64 = -90.0;
/// Highest Celsius reading accepted from the provider.
pub const MAX_PLAUSIBLE_CELSIUS: f64 = 60.0;

/// Owns the cache slot and decides when to trust a live fetch versus stale data.
///
/// Meant to be shared behind an `Arc`; all methods take `&self`.
#[derive(Debug)]
pub struct WeatherPolicy {
    provider: WeatherProvider,
    cache: WeatherCache,
}

impl WeatherPolicy {
    pub fn new(provider: WeatherProvider) -> Self {
        Self {
            provider,
            cache: WeatherCache::new(),
        }
    }

    pub fn from_config(config: &WeatherConfig) -> Result<Self, WeatherError> {
        Ok(Self::new(WeatherProvider::new(config)?))
    }

    pub fn cache(&self) -> &WeatherCache {
        &self.cache
    }

    /// Fetch live conditions for `location`, caching them on success.
    ///
    /// On failure the cached reading is served instead (labeled by age);
    /// the original error only escapes when the slot is empty.
    #[instrument(skip(self), level = "info")]
    pub async fn fetch_weather_data(&self, location: &str) -> Result<WeatherReading, WeatherError> {
        let err = match self.fetch_live(location).await {
            Ok(reading) => return Ok(reading),
            Err(err) => err,
        };

        if !err.is_recoverable() {
            return Err(err);
        }

        match self.cache.reading_at(Utc::now()) {
            Ok(fallback) => {
                tracing::warn!(
                    "Serving cached weather for {} ({:?}) after fetch failure: {}",
                    fallback.location,
                    fallback.connection_status,
                    err
                );
                Ok(fallback)
            }
            Err(_) => {
                tracing::error!("Weather fetch failed with no cached data: {}", err);
                Err(err)
            }
        }
    }

    /// The cached reading with its status derived from cache age.
    pub fn get_cached_weather_data(&self) -> Result<WeatherReading, WeatherError> {
        self.cache.reading_at(Utc::now())
    }

    pub fn has_cached_data(&self) -> bool {
        self.cache.is_populated()
    }

    pub fn clear_cache(&self) {
        tracing::info!("Clearing weather cache");
        self.cache.clear();
    }

    /// `fetch_weather_data` followed by conversion into `unit` when requested.
    ///
    /// The slot always stays in Celsius; only the returned copy is converted.
    pub async fn get_weather(
        &self,
        location: &str,
        unit: Option<TemperatureUnit>,
    ) -> Result<WeatherReading, WeatherError> {
        let reading = self.fetch_weather_data(location).await?;

        Ok(match unit {
            Some(unit) => reading.in_unit(unit),
            None => reading,
        })
    }

    /// Forced refresh: one upstream call, same fallback rules as a read.
    pub async fn refresh_weather(&self, location: &str) -> Result<WeatherReading, WeatherError> {
        tracing::info!("Forced weather refresh for {}", location);
        self.fetch_weather_data(location).await
    }

    pub fn cache_status(&self) -> CacheStatus {
        self.cache.status_at(Utc::now())
    }

    async fn fetch_live(&self, location: &str) -> Result<WeatherReading, WeatherError> {
        let payload = self.provider.fetch_current(location).await?;
        let reading = build_reading(payload)?;

        self.cache.store(reading.clone());
        Ok(reading)
    }
}

/// Validate an upstream payload and normalize it into a live reading.
fn build_reading(payload: ApiCurrentResponse) -> Result<WeatherReading, WeatherError> {
    let celsius = payload.current.temp_c;
    if !(MIN_PLAUSIBLE_CELSIUS..=MAX_PLAUSIBLE_CELSIUS).contains(&celsius) {
        return Err(WeatherError::TemperatureOutOfRange { celsius });
    }

    Ok(WeatherReading {
        temperature: round1(celsius),
        temperature_unit: TemperatureUnit::Celsius,
        location: payload.location.display_name(),
        last_update: payload.current.last_updated,
        connection_status: ConnectionStatus::Online,
    })
}
