//! Time-bounded memoization of weather lookups.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use mockable::Clock;
use tracing::debug;

use super::service::WeatherService;
use super::WeatherForecast;
use crate::envelope::Envelope;

#[derive(Debug, Clone)]
struct CacheEntry {
    envelope: Envelope<WeatherForecast>,
    expires_at: DateTime<Utc>,
}

/// Caching decorator around another [`WeatherService`].
///
/// Keys are lower-cased city names. Only successful results with a payload
/// are stored; an entry is served until its expiry instant and treated as
/// absent afterwards. Concurrent misses for one key may each reach the
/// inner service, and the last write wins.
pub struct CachedWeatherService<S> {
    inner: S,
    entries: RwLock<HashMap<String, CacheEntry>>,
    ttl: TimeDelta,
    clock: Arc<dyn Clock>,
}

impl<S: WeatherService> CachedWeatherService<S> {
    pub fn new(inner: S, ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        let ttl = TimeDelta::from_std(ttl).unwrap_or_else(|_| TimeDelta::days(36_500));
        Self {
            inner,
            entries: RwLock::new(HashMap::new()),
            ttl,
            clock,
        }
    }

    /// Number of stored entries, live or expired.
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lookup(&self, key: &str, now: DateTime<Utc>) -> Option<Envelope<WeatherForecast>> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries
            .get(key)
            .filter(|entry| now <= entry.expires_at)
            .map(|entry| entry.envelope.clone())
    }

    fn store(&self, key: String, envelope: Envelope<WeatherForecast>, now: DateTime<Utc>) {
        let expires_at = now
            .checked_add_signed(self.ttl)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);

        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.retain(|_, entry| now <= entry.expires_at);
        entries.insert(
            key,
            CacheEntry {
                envelope,
                expires_at,
            },
        );
    }
}

#[async_trait]
impl<S: WeatherService> WeatherService for CachedWeatherService<S> {
    async fn get_weather_by_city(&self, city: &str) -> Envelope<WeatherForecast> {
        let key = city.to_lowercase();

        if let Some(hit) = self.lookup(&key, self.clock.utc()) {
            debug!(city = %key, "Weather cache hit");
            return hit;
        }

        debug!(city = %key, "Weather cache miss");
        let result = self.inner.get_weather_by_city(city).await;

        if result.is_success() && result.data().is_some() {
            self.store(key, result.clone(), self.clock.utc());
        }
        result
    }
}
