//! What the chat handlers call: resolve a city and keep the last-city record in step.

use anyhow::Result;
use tracing::info;

use crate::{Config, Resolution, resolver::CityInfoResolver, store::LastCityStore};

#[derive(Debug)]
pub struct CityService {
    resolver: CityInfoResolver,
    store: LastCityStore,
}

impl CityService {
    pub fn new(resolver: CityInfoResolver, store: LastCityStore) -> Self {
        Self { resolver, store }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            CityInfoResolver::from_config(config),
            LastCityStore::new(&config.storage.last_city_file),
        )
    }

    pub fn store(&self) -> &LastCityStore {
        &self.store
    }

    /// Records `city` as the last city (whatever the lookup outcome), then resolves it.
    ///
    /// Only a failed write to the last-city file is returned as an error.
    pub async fn query_city(&self, city: &str) -> Result<Resolution> {
        self.store.save(city)?;
        Ok(self.resolver.resolve(city).await)
    }

    /// Resolves the stored last city without rewriting it. `None` when nothing is stored.
    pub async fn last_city_report(&self) -> Option<Resolution> {
        let city = self.store.load().filter(|c| !c.is_empty())?;
        info!(city = %city, "Resolving last city");
        Some(self.resolver.resolve(&city).await)
    }

    /// Handles free text. It is a city name only when the sender was asked for one.
    pub async fn answer_text(&self, awaiting_city: bool, text: &str) -> Result<Option<Resolution>> {
        if !awaiting_city {
            return Ok(None);
        }
        self.query_city(text).await.map(Some)
    }
}
