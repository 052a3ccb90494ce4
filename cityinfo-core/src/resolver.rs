use anyhow::Result;
use tracing::{info, warn};

use crate::{
    Config,
    model::{CityReport, Failure, Population, Resolution},
    provider::{GeoSource, WeatherSource, geo_source_from_config, weather_source_from_config},
};

/// Combines a weather lookup and a population lookup into one report.
///
/// A weather miss or fault ends the resolution; a geography problem only
/// downgrades the population to [`Population::Unavailable`].
#[derive(Debug)]
pub struct CityInfoResolver {
    weather: Box<dyn WeatherSource>,
    geo: Box<dyn GeoSource>,
}

impl CityInfoResolver {
    pub fn new(weather: Box<dyn WeatherSource>, geo: Box<dyn GeoSource>) -> Self {
        Self { weather, geo }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(weather_source_from_config(config), geo_source_from_config(config))
    }

    /// Never fails: faults come back as [`Resolution::Failure`].
    pub async fn resolve(&self, city: &str) -> Resolution {
        match self.try_resolve(city).await {
            Ok(resolution) => resolution,
            Err(e) => {
                warn!(city, error = %format!("{e:#}"), "City lookup failed");
                Resolution::Failure(Failure::fault(&e))
            }
        }
    }

    async fn try_resolve(&self, city: &str) -> Result<Resolution> {
        let Some(observation) = self.weather.current_weather(city).await? else {
            info!(city, "City not found by weather source");
            return Ok(Resolution::Failure(Failure::not_found(city)));
        };

        let population = match self.geo.population(city, &observation.country_code).await {
            Ok(p) => Population::from(p),
            Err(e) => {
                warn!(
                    city,
                    country = %observation.country_code,
                    error = %format!("{e:#}"),
                    "Population lookup failed, reporting it as unavailable"
                );
                Population::Unavailable
            }
        };

        info!(
            city,
            resolved = %observation.city_name,
            country = %observation.country_code,
            "City resolved"
        );
        Ok(Resolution::Report(CityReport::new(observation, population)))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::model::{FailureKind, WeatherObservation};
    use async_trait::async_trait;
    use std::sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    };

    #[derive(Debug, Clone)]
    pub(crate) enum WeatherReply {
        Found(WeatherObservation),
        NotFound,
        Fault(&'static str),
    }

    #[derive(Debug, Clone)]
    pub(crate) struct FakeWeather {
        pub reply: WeatherReply,
        pub queries: Arc<Mutex<Vec<String>>>,
    }

    impl FakeWeather {
        pub fn new(reply: WeatherReply) -> Self {
            Self { reply, queries: Arc::default() }
        }
    }

    #[async_trait]
    impl WeatherSource for FakeWeather {
        async fn current_weather(&self, city: &str) -> Result<Option<WeatherObservation>> {
            self.queries.lock().unwrap().push(city.to_string());
            match &self.reply {
                WeatherReply::Found(obs) => Ok(Some(obs.clone())),
                WeatherReply::NotFound => Ok(None),
                WeatherReply::Fault(msg) => Err(anyhow::anyhow!(*msg)),
            }
        }
    }

    #[derive(Debug, Clone)]
    pub(crate) struct FakeGeo {
        pub reply: std::result::Result<Option<u64>, &'static str>,
        pub calls: Arc<AtomicUsize>,
        pub last_country: Arc<Mutex<Option<String>>>,
    }

    impl FakeGeo {
        pub fn new(reply: std::result::Result<Option<u64>, &'static str>) -> Self {
            Self { reply, calls: Arc::default(), last_country: Arc::default() }
        }
    }

    #[async_trait]
    impl GeoSource for FakeGeo {
        async fn population(&self, _city: &str, country_code: &str) -> Result<Option<u64>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_country.lock().unwrap() = Some(country_code.to_string());
            self.reply.map_err(|msg| anyhow::anyhow!(msg))
        }
    }

    pub(crate) fn moscow() -> WeatherObservation {
        WeatherObservation {
            city_name: "Moscow".into(),
            country_code: "RU".into(),
            temperature_c: 5.0,
            feels_like_c: 3.0,
            description: "clear sky".into(),
            humidity_pct: 60,
            wind_speed_mps: 4.1,
        }
    }

    fn resolver(weather: &FakeWeather, geo: &FakeGeo) -> CityInfoResolver {
        CityInfoResolver::new(Box::new(weather.clone()), Box::new(geo.clone()))
    }

    #[tokio::test]
    async fn not_found_skips_geography() {
        let weather = FakeWeather::new(WeatherReply::NotFound);
        let geo = FakeGeo::new(Ok(Some(1)));

        let resolution = resolver(&weather, &geo).resolve("Атлантида").await;

        assert_eq!(resolution, Resolution::Failure(Failure::not_found("Атлантида")));
        assert_eq!(resolution.to_string(), "Не удалось найти информацию о городе: Атлантида.");
        assert_eq!(geo.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn geography_failure_degrades_population() {
        let weather = FakeWeather::new(WeatherReply::Found(moscow()));
        let geo = FakeGeo::new(Err("GeoDB request failed with status 429"));

        let resolution = resolver(&weather, &geo).resolve("Москва").await;

        let Resolution::Report(report) = &resolution else {
            panic!("expected a report, got {resolution:?}");
        };
        assert_eq!(report.population, Population::Unavailable);
        assert_eq!(report.city_name, "Moscow");
        assert_eq!(report.country_code, "RU");
        assert_eq!(report.temperature_c, 5.0);
        assert_eq!(report.humidity_pct, 60);
    }

    #[tokio::test]
    async fn empty_geography_match_degrades_population() {
        let weather = FakeWeather::new(WeatherReply::Found(moscow()));
        let geo = FakeGeo::new(Ok(None));

        let resolution = resolver(&weather, &geo).resolve("Москва").await;

        assert!(resolution.is_report());
        assert!(resolution.to_string().ends_with("Население: Информация недоступна"));
    }

    #[tokio::test]
    async fn population_is_reported_verbatim() {
        let weather = FakeWeather::new(WeatherReply::Found(moscow()));
        let geo = FakeGeo::new(Ok(Some(12_600_000)));

        let resolution = resolver(&weather, &geo).resolve("Москва").await;

        let Resolution::Report(report) = &resolution else {
            panic!("expected a report, got {resolution:?}");
        };
        assert_eq!(report.population, Population::Known(12_600_000));
        assert_eq!(geo.last_country.lock().unwrap().as_deref(), Some("RU"));
        assert_eq!(weather.queries.lock().unwrap().as_slice(), ["Москва"]);
        assert_eq!(
            resolution.to_string(),
            "Город: Moscow\n\
             Страна: RU\n\
             Температура: 5.0°C\n\
             Ощущается как: 3.0°C\n\
             Описание: Clear sky\n\
             Влажность: 60%\n\
             Скорость ветра: 4.1 м/с\n\
             Население: 12600000"
        );
    }

    #[tokio::test]
    async fn weather_fault_becomes_diagnostic() {
        let weather = FakeWeather::new(WeatherReply::Fault("connection reset"));
        let geo = FakeGeo::new(Ok(Some(1)));

        let resolution = resolver(&weather, &geo).resolve("Москва").await;

        assert_eq!(resolution.failure_kind(), Some(FailureKind::Fault));
        let text = resolution.to_string();
        assert!(text.contains("Ошибка"));
        assert!(text.contains("connection reset"));
        assert_eq!(geo.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn malformed_weather_body_becomes_diagnostic() {
        use crate::provider::openweather::OpenWeatherSource;

        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/weather")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_body(
                r#"{"name":"Moscow","main":{"temp":5.0,"feels_like":3.0,"humidity":60},
                    "weather":[{"description":"clear sky"}],"wind":{"speed":4.1}}"#,
            )
            .create_async()
            .await;

        let weather = OpenWeatherSource::new(
            format!("{}/weather", server.url()),
            "KEY".into(),
            "ru".into(),
        );
        let geo = FakeGeo::new(Ok(Some(1)));
        let resolver = CityInfoResolver::new(Box::new(weather), Box::new(geo.clone()));

        let resolution = resolver.resolve("Москва").await;

        assert_eq!(resolution.failure_kind(), Some(FailureKind::Fault));
        assert!(resolution.to_string().starts_with("Ошибка при получении данных о городе:"));
        assert!(resolution.to_string().contains("sys"));
        assert_eq!(geo.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn connection_fault_does_not_expose_api_keys() {
        use crate::provider::{geodb::GeoDbSource, openweather::OpenWeatherSource};

        let port = std::net::TcpListener::bind("127.0.0.1:0")
            .and_then(|l| l.local_addr())
            .expect("free port")
            .port();
        let weather = OpenWeatherSource::new(
            format!("http://127.0.0.1:{port}/weather"),
            "SUPERSECRETKEY".into(),
            "ru".into(),
        );
        let geo = GeoDbSource::new(
            format!("http://127.0.0.1:{port}/cities"),
            "GEOSECRETKEY".into(),
            "wft-geo-db.p.rapidapi.com".into(),
        );
        let resolver = CityInfoResolver::new(Box::new(weather), Box::new(geo));

        let resolution = resolver.resolve("Москва").await;

        assert_eq!(resolution.failure_kind(), Some(FailureKind::Fault));
        let text = resolution.to_string();
        assert!(text.contains("Failed to send request to OpenWeather"));
        assert!(!text.contains("SUPERSECRETKEY"), "reply leaked the key: {text}");
        assert!(!text.contains("appid"), "reply leaked the request URL: {text}");
    }
}
