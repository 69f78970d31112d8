//! Weather policy for weatherdash
//!
//! Proxies current conditions from an upstream provider, keeps the last
//! successful reading in a single in-memory slot, and falls back to it
//! (labeled by age) when the provider can't be trusted.

pub mod cache;
pub mod convert;
pub mod error;
pub mod policy;
pub mod provider;
pub mod types;

pub use cache::WeatherCache;
pub use convert::{convert_temperature, round1};
pub use error::WeatherError;
pub use policy::WeatherPolicy;
pub use provider::WeatherProvider;
pub use types::*;
