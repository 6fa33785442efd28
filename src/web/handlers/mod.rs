//! API handlers.

pub mod auth;
pub mod weather;

pub use auth::*;
pub use weather::*;

use std::sync::Arc;

use mockable::Clock;

use crate::auth::{Argon2Hasher, AuthService, CredentialValidator, JwtTokenIssuer};
use crate::db::UserRepository;
use crate::i18n::{I18n, Localizer};
use crate::weather::{BaseWeatherService, CachedWeatherService, JsonWeatherRepository, WeatherService};
use crate::{Config, Database, Result};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Registration, login and password change.
    pub auth: AuthService,
    /// Weather lookup, normally cached.
    pub weather: Arc<dyn WeatherService>,
    /// Message catalogue for response text.
    pub localizer: Arc<dyn Localizer>,
}

impl AppState {
    /// Create a new application state.
    pub fn new(
        auth: AuthService,
        weather: Arc<dyn WeatherService>,
        localizer: Arc<dyn Localizer>,
    ) -> Self {
        Self {
            auth,
            weather,
            localizer,
        }
    }

    /// Wire the production services from configuration.
    ///
    /// # Errors
    ///
    /// Fails if the hashing parameters or token settings are invalid.
    pub fn from_config(config: &Config, db: &Database, clock: Arc<dyn Clock>) -> Result<Self> {
        let users = Arc::new(UserRepository::new(db.pool().clone()));
        let hasher = Arc::new(Argon2Hasher::from_config(&config.hashing)?);
        let tokens = Arc::new(JwtTokenIssuer::new(&config.jwt)?);
        let validator = CredentialValidator::with_rules(config.validation.clone());
        let auth = AuthService::new(users, hasher, tokens, validator);

        let repository = JsonWeatherRepository::load_or_empty(&config.weather.data_path);
        let weather = CachedWeatherService::new(
            BaseWeatherService::new(Arc::new(repository)),
            config.cache.weather_ttl(),
            clock,
        );

        let localizer = I18n::load_or_embedded(&config.locale.language, &config.locale.path);

        Ok(Self::new(auth, Arc::new(weather), Arc::new(localizer)))
    }
}
