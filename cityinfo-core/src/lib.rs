//! Core library for the `cityinfo` bot.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - Weather (OpenWeatherMap) and geography (GeoDB) sources
//! - The city resolver that merges both into a report
//! - The last-city store persisted as a small JSON file
//!
//! It is used by `cityinfo-bot`, but can also be reused by other front ends.

pub mod config;
pub mod model;
pub mod provider;
pub mod resolver;
pub mod service;
pub mod store;

pub use config::Config;
pub use model::{
    CityReport, Failure, FailureKind, POPULATION_UNAVAILABLE, Population, Resolution,
    WeatherObservation,
};
pub use provider::{GeoSource, WeatherSource};
pub use resolver::CityInfoResolver;
pub use service::CityService;
pub use store::LastCityStore;
