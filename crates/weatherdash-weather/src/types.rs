use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::convert::convert_temperature;

pub use weatherdash_core::TemperatureUnit;

/// Freshness label attached to a reading.
///
/// Never supplied by the provider; `Online` for a live fetch,
/// `Offline`/`Outdated` when served from the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionStatus {
    Online,
    Offline,
    Outdated,
}

impl ConnectionStatus {
    pub fn is_live(&self) -> bool {
        matches!(self, Self::Online)
    }
}

/// Normalized current conditions handed back to request handlers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherReading {
    pub temperature: f64,
    pub temperature_unit: TemperatureUnit,
    pub location: String,
    pub last_update: String,
    pub connection_status: ConnectionStatus,
}

impl WeatherReading {
    /// This reading expressed in `unit`; a no-op when already there.
    pub fn in_unit(self, unit: TemperatureUnit) -> Self {
        if unit == self.temperature_unit {
            return self;
        }
        Self {
            temperature: convert_temperature(self.temperature, self.temperature_unit, unit),
            temperature_unit: unit,
            ..self
        }
    }
}

/// A reading as held in the cache slot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CachedReading {
    #[serde(flatten)]
    pub reading: WeatherReading,
    pub cached_at: DateTime<Utc>,
}

/// Read-only snapshot of the cache slot
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStatus {
    pub has_data: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cached_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connection_status: Option<ConnectionStatus>,
}

impl CacheStatus {
    pub fn empty() -> Self {
        Self {
            has_data: false,
            location: None,
            cached_at: None,
            connection_status: None,
        }
    }
}

/// Upstream `current.json` payload. Only the consumed fields are modeled.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ApiCurrentResponse {
    pub current: ApiCurrent,
    pub location: ApiLocation,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ApiCurrent {
    pub temp_c: f64,
    pub last_updated: String,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ApiLocation {
    pub name: String,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
}

impl ApiLocation {
    /// `"<name>, <region>"`, falling back to the country when the region is blank.
    pub fn display_name(&self) -> String {
        let suffix = [self.region.as_deref(), self.country.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .find(|s| !s.is_empty());

        match suffix {
            Some(s) => format!("{}, {}", self.name, s),
            None => self.name.clone(),
        }
    }
}
