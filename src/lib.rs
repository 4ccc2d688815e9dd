pub mod config;
pub mod controllers;
pub mod error;
pub mod hub;
pub mod middleware;
pub mod models;
pub mod services;
pub mod store;

use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub use error::Error;

// Shared state for the whole application.
#[derive(Clone)]
pub struct AppState {
    pub store: store::InventoryStore,
    pub hub: hub::NotificationHub,
    pub purchases: services::PurchaseService,
    pub config: config::Config,
}

impl AppState {
    /// Wire up the store, the notification hub and the purchase service.
    /// The hub is built here and injected everywhere it is needed; nothing
    /// reaches for a global instance.
    pub fn new(config: config::Config) -> Arc<Self> {
        let store = store::InventoryStore::new();
        let hub = hub::NotificationHub::new();
        let purchases =
            services::PurchaseService::new(store.clone(), hub.clone(), &config.inventory);

        Arc::new(Self {
            store,
            hub,
            purchases,
            config,
        })
    }
}

/// Full application router: REST surface, websocket channel and
/// liveness routes.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(|| async { "Boxoffice API v1.0" }))
        .route("/health", get(|| async { "OK" }))
        .merge(controllers::routes())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
