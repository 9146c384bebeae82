//! Contract pricing, payment scheduling and staffing engine for the wedding
//! back office.
//!
//! The Django front office calls this service over HTTP/JSON for everything
//! that touches money or staff bookings; it keeps contract totals, payment
//! schedules and staff availability consistent with each other.

use std::sync::Arc;
use std::time::Duration;

use axum::{routing::get, Json, Router};
use serde::Serialize;

pub mod actor;
pub mod cache;
pub mod config;
pub mod contracts;
pub mod error;
pub mod extract;
pub mod locks;
pub mod models;
pub mod notify;
pub mod payments;
pub mod pricing;
pub mod staffing;
pub mod store;

use cache::AppCache;
use config::EnginePolicy;
use locks::ContractLocks;
use notify::{Notifier, TracingNotifier};
use store::Store;

/// Shared state handed to every handler and service function
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub cache: AppCache,
    pub locks: ContractLocks,
    pub notifier: Arc<dyn Notifier>,
    pub policy: Arc<EnginePolicy>,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, policy: EnginePolicy, catalog_ttl: Duration) -> Self {
        Self {
            store,
            cache: AppCache::new(catalog_ttl),
            locks: ContractLocks::new(),
            notifier: Arc::new(TracingNotifier),
            policy: Arc::new(policy),
        }
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Full API router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .merge(contracts::routes::router())
        .merge(pricing::routes::router())
        .merge(payments::routes::router())
        .merge(staffing::routes::router())
        .with_state(state)
}
