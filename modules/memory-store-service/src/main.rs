//! Memory Store Service — standalone binary storing tagged per-user memories.
//!
//! Default: http://127.0.0.1:9104/

mod config;
mod db;
mod error;
mod routes;

use config::Config;
use routes::AppState;
use std::sync::Arc;

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    env_logger::init();

    let config = Config::from_env();

    log::info!("Opening database at: {}", config.db_path);
    let database = match db::Db::open(&config.db_path) {
        Ok(db) => Arc::new(db),
        Err(e) => {
            log::error!("Failed to open database {}: {}", config.db_path, e);
            std::process::exit(1);
        }
    };

    let state = Arc::new(AppState::new(database, config.default_limit));
    let app = routes::router(state);

    let addr = config.bind_addr();
    log::info!("Memory Store Service listening on http://{}", addr);

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(l) => l,
        Err(e) => {
            log::error!("Failed to bind {}: {}", addr, e);
            std::process::exit(1);
        }
    };

    if let Err(e) = axum::serve(listener, app).await {
        log::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
