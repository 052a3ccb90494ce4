use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Placeholder shown when the population of a city cannot be obtained.
pub const POPULATION_UNAVAILABLE: &str = "Информация недоступна";

/// Current conditions for a city, as reported by a weather source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherObservation {
    /// City name as normalized by the weather source.
    pub city_name: String,
    pub country_code: String,
    pub temperature_c: f64,
    pub feels_like_c: f64,
    pub description: String,
    pub humidity_pct: u8,
    pub wind_speed_mps: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Population {
    Known(u64),
    Unavailable,
}

impl From<Option<u64>> for Population {
    fn from(value: Option<u64>) -> Self {
        value.map_or(Population::Unavailable, Population::Known)
    }
}

impl fmt::Display for Population {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Population::Known(n) => write!(f, "{n}"),
            Population::Unavailable => f.write_str(POPULATION_UNAVAILABLE),
        }
    }
}

/// Weather plus population for one city, ready to be shown to a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityReport {
    pub city_name: String,
    pub country_code: String,
    pub temperature_c: f64,
    pub feels_like_c: f64,
    pub description: String,
    pub humidity_pct: u8,
    pub wind_speed_mps: f64,
    pub population: Population,
}

impl CityReport {
    pub fn new(observation: WeatherObservation, population: Population) -> Self {
        Self {
            description: capitalize(&observation.description),
            city_name: observation.city_name,
            country_code: observation.country_code,
            temperature_c: observation.temperature_c,
            feels_like_c: observation.feels_like_c,
            humidity_pct: observation.humidity_pct,
            wind_speed_mps: observation.wind_speed_mps,
            population,
        }
    }
}

impl fmt::Display for CityReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Город: {}", self.city_name)?;
        writeln!(f, "Страна: {}", self.country_code)?;
        writeln!(f, "Температура: {}°C", decimal(self.temperature_c))?;
        writeln!(f, "Ощущается как: {}°C", decimal(self.feels_like_c))?;
        writeln!(f, "Описание: {}", self.description)?;
        writeln!(f, "Влажность: {}%", self.humidity_pct)?;
        writeln!(f, "Скорость ветра: {} м/с", decimal(self.wind_speed_mps))?;
        write!(f, "Население: {}", self.population)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The weather source rejected the city name.
    NotFound,
    /// Transport error, malformed response, or any other unexpected fault.
    Fault,
}

/// A resolution that produced no report. `message` is already user-facing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct Failure {
    pub kind: FailureKind,
    pub message: String,
}

impl Failure {
    pub fn not_found(city: &str) -> Self {
        Self {
            kind: FailureKind::NotFound,
            message: format!("Не удалось найти информацию о городе: {city}."),
        }
    }

    pub fn fault(err: &anyhow::Error) -> Self {
        Self {
            kind: FailureKind::Fault,
            message: format!("Ошибка при получении данных о городе: {err:#}"),
        }
    }
}

/// Outcome of resolving a city name. Both variants render as reply text.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    Report(CityReport),
    Failure(Failure),
}

impl Resolution {
    pub fn is_report(&self) -> bool {
        matches!(self, Resolution::Report(_))
    }

    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            Resolution::Report(_) => None,
            Resolution::Failure(failure) => Some(failure.kind),
        }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resolution::Report(report) => report.fmt(f),
            Resolution::Failure(failure) => failure.fmt(f),
        }
    }
}

/// Uppercases the first character and lowercases the rest.
fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

/// Whole numbers keep one decimal place so `5` reads as `5.0`.
fn decimal(value: f64) -> String {
    if value.fract() == 0.0 && value.is_finite() {
        format!("{value:.1}")
    } else {
        format!("{value}")
    }
}
