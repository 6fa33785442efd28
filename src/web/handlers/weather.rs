//! Weather handlers.

use axum::{
    extract::{Query, State},
    response::Response,
};
use std::sync::Arc;

use super::AppState;
use crate::web::dto::{envelope_response, WeatherQuery};
use crate::web::middleware::AuthUser;

/// GET /api/weather?city= - Current conditions for a city.
pub async fn get_weather(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
    Query(query): Query<WeatherQuery>,
) -> Response {
    let city = query.city.unwrap_or_default();
    tracing::debug!(user = %claims.name, city = %city, "Weather lookup");

    let result = state.weather.get_weather_by_city(&city).await;
    envelope_response(result, state.localizer.as_ref())
}
