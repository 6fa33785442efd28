//! HTTP API for Nimbus.
//!
//! Routes:
//!
//! - `POST /api/auth/register`
//! - `POST /api/auth/login`
//! - `POST /api/auth/change-password` (bearer token)
//! - `GET /api/weather?city=` (rate limited, bearer token)
//! - `GET /health`

pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod server;

pub use error::ApiError;
pub use handlers::AppState;
pub use router::{create_health_router, create_router};
pub use server::{build_app, WebServer};
