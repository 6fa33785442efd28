//! Router configuration for Web API.

use axum::{
    middleware,
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use super::dto::HealthResponse;
use super::handlers::{change_password, get_weather, login, register, AppState};
use super::middleware::{
    inject_localizer, jwt_auth, login_rate_limit, weather_rate_limit, JwtState, RateLimitState,
};

/// Create the main API router.
pub fn create_router(
    app_state: Arc<AppState>,
    jwt_state: Arc<JwtState>,
    rate_limits: Arc<RateLimitState>,
) -> Router {
    // Register and login are throttled per client IP.
    let login_limits = rate_limits.clone();
    let auth_public_routes = Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route_layer(middleware::from_fn(move |req, next| {
            login_rate_limit(login_limits.clone(), req, next)
        }));

    let auth_protected_routes = Router::new().route("/change-password", post(change_password));

    let auth_routes = Router::new()
        .merge(auth_public_routes)
        .merge(auth_protected_routes);

    // The window is checked before the bearer token is.
    let weather_limits = rate_limits;
    let weather_routes = Router::new()
        .route("/weather", get(get_weather))
        .route_layer(middleware::from_fn(move |req, next| {
            weather_rate_limit(weather_limits.clone(), req, next)
        }));

    let api_routes = Router::new()
        .nest("/auth", auth_routes)
        .merge(weather_routes);

    let localizer = app_state.localizer.clone();

    Router::new()
        .nest("/api", api_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(middleware::from_fn(move |req, next| {
                    inject_localizer(localizer.clone(), req, next)
                }))
                .layer(middleware::from_fn(move |req, next| {
                    jwt_auth(jwt_state.clone(), req, next)
                })),
        )
        .with_state(app_state)
}

/// Create a health check router.
pub fn create_health_router() -> Router {
    Router::new().route("/health", get(health_check))
}

/// Health check handler.
async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
