//! Single-slot in-memory cache for the most recent successful reading.

use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;

use crate::error::WeatherError;
use crate::types::{CacheStatus, CachedReading, ConnectionStatus, WeatherReading};

/// Cached data up to this age is reported `offline`.
pub const OFFLINE_MAX_AGE_MINUTES: i64 = 60;
/// Upper bound of the `outdated` band.
pub const OUTDATED_MAX_AGE_MINUTES: i64 = 24 * 60;

/// Classify a cache entry by its age.
#[allow(clippy::if_same_then_else)]
pub fn status_for_age(age: Duration) -> ConnectionStatus {
    if age <= Duration::minutes(OFFLINE_MAX_AGE_MINUTES) {
        ConnectionStatus::Offline
    } else if age <= Duration::minutes(OUTDATED_MAX_AGE_MINUTES) {
        ConnectionStatus::Outdated
    } else {
        // Same label as the band above; the 24h boundary is currently unobservable.
        ConnectionStatus::Outdated
    }
}

/// Holds zero or one reading. Every access is a single short critical section.
#[derive(Debug, Default)]
pub struct WeatherCache {
    slot: Mutex<Option<CachedReading>>,
}

impl WeatherCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite the slot, stamped with the current time.
    pub fn store(&self, reading: WeatherReading) {
        self.store_at(reading, Utc::now());
    }

    /// Overwrite the slot with an explicit `cached_at`.
    pub fn store_at(&self, reading: WeatherReading, cached_at: DateTime<Utc>) {
        tracing::debug!("Caching weather for {} at {}", reading.location, cached_at);
        *self.slot.lock() = Some(CachedReading { reading, cached_at });
    }

    /// Snapshot of the slot.
    pub fn get(&self) -> Option<CachedReading> {
        self.slot.lock().clone()
    }

    /// The cached reading relabeled for its age as of `now`.
    pub fn reading_at(&self, now: DateTime<Utc>) -> Result<WeatherReading, WeatherError> {
        let cached = self.get().ok_or(WeatherError::NoCachedDataAvailable)?;
        let status = status_for_age(now - cached.cached_at);

        Ok(WeatherReading {
            connection_status: status,
            ..cached.reading
        })
    }

    pub fn is_populated(&self) -> bool {
        self.slot.lock().is_some()
    }

    pub fn status_at(&self, now: DateTime<Utc>) -> CacheStatus {
        match self.get() {
            Some(cached) => CacheStatus {
                has_data: true,
                location: Some(cached.reading.location),
                cached_at: Some(cached.cached_at),
                connection_status: Some(status_for_age(now - cached.cached_at)),
            },
            None => CacheStatus::empty(),
        }
    }

    pub fn clear(&self) {
        *self.slot.lock() = None;
    }
}
