use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::provider::truncate_body;

use super::GeoSource;

/// GeoDB Cities client (served through RapidAPI).
#[derive(Debug, Clone)]
pub struct GeoDbSource {
    endpoint: String,
    api_key: String,
    host: String,
    http: Client,
}

impl GeoDbSource {
    pub fn new(endpoint: String, api_key: String, host: String) -> Self {
        Self { endpoint, api_key, host, http: Client::new() }
    }
}

#[derive(Debug, Deserialize)]
struct GeoCity {
    population: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct GeoCitiesResponse {
    #[serde(default)]
    data: Vec<GeoCity>,
}

#[async_trait]
impl GeoSource for GeoDbSource {
    async fn population(&self, city: &str, country_code: &str) -> Result<Option<u64>> {
        let res = self
            .http
            .get(&self.endpoint)
            .header("X-RapidAPI-Key", self.api_key.as_str())
            .header("X-RapidAPI-Host", self.host.as_str())
            .query(&[("namePrefix", city), ("countryIds", country_code), ("limit", "1")])
            .send()
            .await
            .map_err(reqwest::Error::without_url)
            .context("Failed to send request to GeoDB (cities)")?;

        let status = res.status();
        let body = res
            .text()
            .await
            .map_err(reqwest::Error::without_url)
            .context("Failed to read GeoDB response body")?;

        if !status.is_success() {
            return Err(anyhow!(
                "GeoDB request failed with status {}: {}",
                status,
                truncate_body(&body),
            ));
        }

        let parsed: GeoCitiesResponse =
            serde_json::from_str(&body).context("Failed to parse GeoDB cities JSON")?;

        Ok(parsed.data.into_iter().next().and_then(|c| c.population))
    }
}
