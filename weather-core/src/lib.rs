//! Core library for the `weather` CLI.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - The weather provider abstraction and its OpenWeather client
//! - The query state machine and the controller that drives it
//! - The persisted most-recently-used list of searched cities
//!
//! It is used by `weather-cli`, but can also be reused by other front ends.

pub mod config;
pub mod controller;
pub mod error;
pub mod model;
pub mod provider;
pub mod query;
pub mod recent;
pub mod store;
pub mod units;

pub use config::Config;
pub use controller::{Dispatcher, QueryController};
pub use error::{CITY_NOT_FOUND, PersistenceError, ProviderError};
pub use model::{UnitSystem, WeatherPayload, WeatherRequest, WeatherSnapshot};
pub use provider::{WeatherProvider, openweather::OpenWeatherProvider};
pub use query::{QueryState, QueryView, Resolution, Ticket};
pub use recent::{RECENT_CAPACITY, RecentCities};
pub use store::{FileStore, MemoryStore, PersistenceStore};
pub use units::to_provider_units;
