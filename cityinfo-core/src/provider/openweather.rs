use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::{model::WeatherObservation, provider::truncate_body};

use super::WeatherSource;

/// OpenWeatherMap "current weather" client.
#[derive(Debug, Clone)]
pub struct OpenWeatherSource {
    endpoint: String,
    api_key: String,
    language: String,
    http: Client,
}

impl OpenWeatherSource {
    pub fn new(endpoint: String, api_key: String, language: String) -> Self {
        Self { endpoint, api_key, language, http: Client::new() }
    }
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    feels_like: f64,
    humidity: u8,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    description: String,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct OwSys {
    country: String,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    name: String,
    sys: OwSys,
    main: OwMain,
    weather: Vec<OwWeather>,
    wind: OwWind,
}

#[async_trait]
impl WeatherSource for OpenWeatherSource {
    async fn current_weather(&self, city: &str) -> Result<Option<WeatherObservation>> {
        let res = self
            .http
            .get(&self.endpoint)
            .query(&[
                ("q", city),
                ("appid", self.api_key.as_str()),
                ("units", "metric"),
                ("lang", self.language.as_str()),
            ])
            .send()
            .await
            .map_err(reqwest::Error::without_url)
            .context("Failed to send request to OpenWeather (current weather)")?;

        let status = res.status();
        if !status.is_success() {
            debug!(city, %status, "OpenWeather rejected city");
            return Ok(None);
        }

        let body = res
            .text()
            .await
            .map_err(reqwest::Error::without_url)
            .context("Failed to read OpenWeather current response body")?;

        let parsed: OwCurrentResponse = serde_json::from_str(&body).with_context(|| {
            format!("Failed to parse OpenWeather current JSON: {}", truncate_body(&body))
        })?;

        let description = parsed
            .weather
            .into_iter()
            .next()
            .map(|w| w.description)
            .ok_or_else(|| anyhow!("OpenWeather response contained no weather description"))?;

        Ok(Some(WeatherObservation {
            city_name: parsed.name,
            country_code: parsed.sys.country,
            temperature_c: parsed.main.temp,
            feels_like_c: parsed.main.feels_like,
            description,
            humidity_pct: parsed.main.humidity,
            wind_speed_mps: parsed.wind.speed,
        }))
    }
}
