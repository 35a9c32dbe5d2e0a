//! Stacks Server - HTTP front end for the stacks library engine.
//!
//! Exposes members, books, loans and reservations as JSON endpoints. All
//! state lives in memory behind a single lock and is lost on restart.

mod config;
mod error;
mod handlers;
mod routes;

use crate::config::Config;
use crate::handlers::SharedLibrary;
use stacks_engine::Library;
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub library: SharedLibrary,
}

impl AppState {
    pub fn new(library: Library) -> Self {
        Self {
            library: Arc::new(RwLock::new(library)),
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "stacks_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;

    tracing::info!("Starting Stacks Server on {}:{}", config.host, config.port);

    let policy = config.policy();
    let library = if config.seed_sample_data {
        tracing::info!("Seeding sample catalog");
        Library::with_sample_catalog(policy)
    } else {
        Library::new(policy)
    };
    tracing::info!(
        loan_period_days = library.policy().loan_period_days,
        reservation_limit = library.policy().reservation_limit,
        "Library ready"
    );

    // Build router
    let app = routes::app(AppState::new(library))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );

    // Start server
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
