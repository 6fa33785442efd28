use std::process::ExitCode;
use std::sync::Arc;

use mockable::DefaultClock;
use tracing::{error, info};

use nimbus::web::WebServer;
use nimbus::{Config, Database};

#[tokio::main]
async fn main() -> ExitCode {
    // Load configuration
    let mut config = match Config::load("config.toml") {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load config.toml: {e}");
            eprintln!("Using default configuration.");
            Config::default()
        }
    };
    config.apply_env_overrides();

    // Initialize logging
    if let Err(e) = nimbus::logging::init(&config.logging) {
        eprintln!("Failed to initialize logging: {e}");
        nimbus::logging::init_console_only(&config.logging.level);
    }

    if let Err(e) = config.validate() {
        error!("Invalid configuration: {}", e);
        return ExitCode::FAILURE;
    }

    info!("Nimbus {}", env!("CARGO_PKG_VERSION"));

    let db = match Database::open(&config.database.path).await {
        Ok(db) => db,
        Err(e) => {
            error!("Failed to open database {}: {}", config.database.path, e);
            return ExitCode::FAILURE;
        }
    };

    let server = match WebServer::new(&config, &db, Arc::new(DefaultClock)) {
        Ok(server) => server,
        Err(e) => {
            error!("Failed to start: {}", e);
            return ExitCode::FAILURE;
        }
    };

    info!("Server configured on {}", server.addr());

    if let Err(e) = server.run().await {
        error!("Server error: {}", e);
        return ExitCode::FAILURE;
    }

    db.pool().close().await;
    ExitCode::SUCCESS
}
