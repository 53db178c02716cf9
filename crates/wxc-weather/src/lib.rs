//! Forecast acquisition for weather-charts
//!
//! Fetches hourly forecasts from Open-Meteo for a fixed set of locations,
//! with a read-through/write-through expiring cache in front of the network.

pub mod cache;
pub mod location;
pub mod provider;
pub mod types;

pub use cache::{KeyValueStore, MemoryStore, SqliteStore, WeatherCache};
pub use location::default_locations;
pub use provider::WeatherProvider;
pub use types::*;
