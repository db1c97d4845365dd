use std::sync::Arc;

use axum::http::HeaderValue;
use tokio::signal;

use crate::{
    config::{ServerConfig, CONFIG_PATH},
    database::Database,
    routes::app,
};

/// # Panics
///
/// Panics if the config file is missing or invalid, the database can't be
/// opened, or the listen address can't be bound.
pub async fn entry() {
    let config = ServerConfig::load(CONFIG_PATH).expect("Could not load the server config!");

    let database = Arc::new(
        Database::new(&config.db_path)
            .await
            .expect("Failed to open the database!"),
    );

    let allowed_origin = config.allowed_origin.as_deref().map(|origin| {
        origin
            .parse::<HeaderValue>()
            .expect("Origin was validated at load")
    });

    let router = app(database, allowed_origin);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .expect("Could not bind the listen address!");

    log::info!("Listening on {}...", config.bind_addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown())
        .await
        .expect("Server crashed!");

    log::info!("Server exited.");
}

async fn shutdown() {
    signal::ctrl_c()
        .await
        .expect("Failed to register the ctrl-c handler!");
    log::info!("Shutting down gracefully...");
}
