//! Weather data sources.

use std::collections::HashMap;
use std::path::Path;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{error, info};

use super::WeatherForecast;
use crate::{NimbusError, Result};

/// Lookup of current conditions by city name.
///
/// Lookups are case-insensitive.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WeatherRepository: Send + Sync {
    /// Get the forecast for `city`, if known.
    async fn get_by_city(&self, city: &str) -> Result<Option<WeatherForecast>>;
}

/// Record layout of the JSON data file.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct WeatherRecord {
    city: String,
    temperature: f64,
    condition: String,
}

/// In-memory repository loaded from a JSON array of
/// `{"City", "Temperature", "Condition"}` records.
#[derive(Debug, Clone, Default)]
pub struct JsonWeatherRepository {
    forecasts: HashMap<String, WeatherForecast>,
}

impl JsonWeatherRepository {
    /// Load forecasts from a JSON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_json(&content)
    }

    /// Load forecasts, logging and falling back to an empty set on failure.
    pub fn load_or_empty<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        match Self::load(path) {
            Ok(repo) => {
                if repo.is_empty() {
                    error!("Weather data file {:?} contains no records", path);
                } else {
                    info!("Loaded {} weather records from {:?}", repo.len(), path);
                }
                repo
            }
            Err(e) => {
                error!("Failed to load weather data from {:?}: {}", path, e);
                Self::default()
            }
        }
    }

    /// Parse forecasts from a JSON string.
    pub fn from_json(content: &str) -> Result<Self> {
        let records: Vec<WeatherRecord> = serde_json::from_str(content)
            .map_err(|e| NimbusError::Weather(format!("invalid weather data: {e}")))?;

        Ok(Self::from_forecasts(records.into_iter().map(|r| {
            WeatherForecast::new(r.city, r.temperature, r.condition)
        })))
    }

    /// Build a repository from forecasts. Later duplicates win.
    pub fn from_forecasts(forecasts: impl IntoIterator<Item = WeatherForecast>) -> Self {
        let forecasts = forecasts
            .into_iter()
            .map(|f| (f.city.to_lowercase(), f))
            .collect();
        Self { forecasts }
    }

    pub fn len(&self) -> usize {
        self.forecasts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forecasts.is_empty()
    }
}

#[async_trait]
impl WeatherRepository for JsonWeatherRepository {
    async fn get_by_city(&self, city: &str) -> Result<Option<WeatherForecast>> {
        Ok(self.forecasts.get(&city.to_lowercase()).cloned())
    }
}
