use crate::{
    Config, WeatherObservation,
    provider::{geodb::GeoDbSource, openweather::OpenWeatherSource},
};
use async_trait::async_trait;
use std::fmt::Debug;

pub mod geodb;
pub mod openweather;

/// Current weather lookup by city name.
#[async_trait]
pub trait WeatherSource: Send + Sync + Debug {
    /// `Ok(None)` means the source answered with a non-success status, i.e. the city is unknown.
    async fn current_weather(&self, city: &str) -> anyhow::Result<Option<WeatherObservation>>;
}

/// City population lookup.
#[async_trait]
pub trait GeoSource: Send + Sync + Debug {
    /// `Ok(None)` means no matching city, or a match without a population figure.
    async fn population(&self, city: &str, country_code: &str) -> anyhow::Result<Option<u64>>;
}

pub fn weather_source_from_config(config: &Config) -> Box<dyn WeatherSource> {
    Box::new(OpenWeatherSource::new(
        config.weather.endpoint.clone(),
        config.weather.api_key.clone(),
        config.weather.language.clone(),
    ))
}

pub fn geo_source_from_config(config: &Config) -> Box<dyn GeoSource> {
    Box::new(GeoDbSource::new(
        config.geography.endpoint.clone(),
        config.geography.api_key.clone(),
        config.geography.host.clone(),
    ))
}

/// Shortens a response body for inclusion in an error message.
pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() <= MAX {
        return body.to_string();
    }
    let mut end = MAX;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &body[..end])
}
