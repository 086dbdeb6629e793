use tracing::info;

use carlot::db::Database;
use carlot::web::WebServer;
use carlot::Config;

#[tokio::main]
async fn main() {
    // Load configuration
    let config = match Config::load("config.toml") {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load config.toml: {e}");
            eprintln!("Using default configuration.");
            Config::default()
        }
    };

    // Initialize logging; debug mode overrides the configured level
    let mut logging = config.logging.clone();
    if config.debug {
        logging.level = "debug".to_string();
    }
    if let Err(e) = carlot::logging::init(&logging) {
        eprintln!("Failed to initialize logging: {e}");
        // Fall back to console-only logging
        carlot::logging::init_console_only(&logging.level);
    }

    info!("CARLOT - garage listing");

    let db = match Database::open(&config.database.path).await {
        Ok(db) => db,
        Err(e) => {
            tracing::error!("Failed to open database: {e}");
            std::process::exit(1);
        }
    };

    let server = match WebServer::new(&config, db) {
        Ok(server) => server,
        Err(e) => {
            tracing::error!("Failed to create web server: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = server.run().await {
        tracing::error!("Web server error: {e}");
        std::process::exit(1);
    }
}
