//! Weather lookup behind the authentication boundary.
//!
//! [`JsonWeatherRepository`] serves forecasts from a JSON file,
//! [`BaseWeatherService`] wraps lookups in envelopes, and
//! [`CachedWeatherService`] memoizes successful results for a fixed TTL.

mod cache;
mod repository;
mod service;

pub use cache::CachedWeatherService;
pub use repository::{JsonWeatherRepository, WeatherRepository};
pub use service::{BaseWeatherService, WeatherService};

#[cfg(test)]
pub use repository::MockWeatherRepository;
#[cfg(test)]
pub use service::MockWeatherService;

use serde::{Deserialize, Serialize};

/// Current conditions for one city.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherForecast {
    pub city: String,
    pub temperature: f64,
    pub condition: String,
}

impl WeatherForecast {
    pub fn new(city: impl Into<String>, temperature: f64, condition: impl Into<String>) -> Self {
        Self {
            city: city.into(),
            temperature,
            condition: condition.into(),
        }
    }
}
