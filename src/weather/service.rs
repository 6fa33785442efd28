//! Weather lookup service.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, error};

use super::repository::WeatherRepository;
use super::WeatherForecast;
use crate::envelope::{Envelope, MessageKey};

/// Weather lookup returning classified outcomes.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WeatherService: Send + Sync {
    /// Look up the current conditions for `city`.
    async fn get_weather_by_city(&self, city: &str) -> Envelope<WeatherForecast>;
}

/// Uncached lookup over a [`WeatherRepository`].
#[derive(Clone)]
pub struct BaseWeatherService {
    repository: Arc<dyn WeatherRepository>,
}

impl BaseWeatherService {
    pub fn new(repository: Arc<dyn WeatherRepository>) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl WeatherService for BaseWeatherService {
    async fn get_weather_by_city(&self, city: &str) -> Envelope<WeatherForecast> {
        if city.trim().is_empty() {
            return Envelope::bad_request(MessageKey::CityRequired);
        }

        match self.repository.get_by_city(city).await {
            Ok(Some(forecast)) => {
                Envelope::ok(forecast, MessageKey::WeatherRetrievedSuccessfully)
            }
            Ok(None) => {
                debug!(city, "No weather data for city");
                Envelope::not_found(MessageKey::WeatherNotFound)
            }
            Err(e) => {
                error!(city, "Weather lookup failed: {}", e);
                Envelope::internal_error()
            }
        }
    }
}
