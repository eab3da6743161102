//! BPIMS stock ledger backend
//!
//! Stock receipts, supplier returns and quantity corrections for a chain of
//! branch stores and one central warehouse, plus the listings and histories
//! built on top of them.

use std::sync::Arc;

use axum::{routing::get, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;
pub mod store;

pub use config::Config;
use services::{PlainTextReceipt, ReceiptRenderer};
use store::SharedStore;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub store: SharedStore,
    pub config: Arc<Config>,
    pub receipts: Arc<dyn ReceiptRenderer>,
}

impl AppState {
    /// State with the plain text order slip configured in `config.receipt`
    pub fn new(store: SharedStore, config: Config) -> Self {
        let receipts = Arc::new(PlainTextReceipt::new(&config.receipt));
        Self {
            store,
            config: Arc::new(config),
            receipts,
        }
    }
}

/// Create the application router with all routes and middleware
pub fn create_app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .route("/health", get(handlers::health_check))
        .nest("/api/v1", routes::api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Root endpoint
async fn root() -> &'static str {
    "BPIMS Stock Ledger API v1"
}
