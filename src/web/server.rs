//! Web server for Nimbus.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use mockable::Clock;
use tokio::net::TcpListener;

use crate::config::Config;
use crate::{Database, NimbusError, Result};

use super::handlers::AppState;
use super::middleware::{JwtState, RateLimitState};
use super::router::{create_health_router, create_router};

/// Build the complete application router from configuration.
///
/// # Errors
///
/// Fails if the hashing parameters or token settings are invalid.
pub fn build_app(config: &Config, db: &Database, clock: Arc<dyn Clock>) -> Result<Router> {
    let (router, _) = build_parts(config, db, clock)?;
    Ok(router)
}

fn build_parts(
    config: &Config,
    db: &Database,
    clock: Arc<dyn Clock>,
) -> Result<(Router, Arc<RateLimitState>)> {
    let app_state = Arc::new(AppState::from_config(config, db, clock.clone())?);
    let jwt_state = Arc::new(JwtState::new(&config.jwt));
    let rate_limits = Arc::new(RateLimitState::new(&config.rate_limit, clock));

    let router = create_router(app_state, jwt_state, rate_limits.clone())
        .merge(create_health_router());
    Ok((router, rate_limits))
}

/// Web server for the API.
pub struct WebServer {
    /// Server address.
    addr: SocketAddr,
    /// Application router.
    router: Router,
    /// Limiters needing periodic cleanup.
    rate_limits: Arc<RateLimitState>,
}

impl WebServer {
    /// Create a new web server.
    pub fn new(config: &Config, db: &Database, clock: Arc<dyn Clock>) -> Result<Self> {
        let addr = format!("{}:{}", config.server.host, config.server.port)
            .parse()
            .map_err(|e| NimbusError::Config(format!("invalid server address: {e}")))?;
        let (router, rate_limits) = build_parts(config, db, clock)?;

        Ok(Self {
            addr,
            router,
            rate_limits,
        })
    }

    /// Get the server address.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Run the web server.
    pub async fn run(self) -> std::result::Result<(), std::io::Error> {
        let listener = TcpListener::bind(self.addr).await?;
        let local_addr = listener.local_addr()?;

        self.rate_limits.start_cleanup_task();

        tracing::info!("Web server listening on http://{}", local_addr);

        axum::serve(
            listener,
            self.router
                .into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown_signal())
        .await
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
