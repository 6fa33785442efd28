//! Nimbus - authentication and cached weather lookup service.
//!
//! Users register and log in with a username and password and receive a
//! signed bearer token. The token grants access to a weather lookup that
//! is memoized for a configurable lifetime and guarded by a fixed-window
//! request limit.

pub mod auth;
pub mod config;
pub mod db;
pub mod envelope;
pub mod error;
pub mod i18n;
pub mod logging;
pub mod rate_limit;
pub mod weather;
pub mod web;

#[cfg(test)]
mod test_support;

pub use config::Config;
pub use db::Database;
pub use envelope::{Envelope, MessageKey, Status};
pub use error::{NimbusError, Result};
