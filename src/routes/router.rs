use axum::{Router, routing::{get, post}};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;

use crate::collector::SnmpCollector;
use crate::handlers::{collect, health};

#[derive(Clone)]
pub struct AppState {
    pub collector: Arc<SnmpCollector>,
    /// Cancelled on server shutdown; passes in flight stop at their next checkpoint.
    pub shutdown: CancellationToken,
}

pub fn create_router(collector: SnmpCollector, shutdown: CancellationToken) -> Router {
    let state = AppState {
        collector: Arc::new(collector),
        shutdown,
    };

    Router::new()
        .route("/health", get(health))
        .route("/collect", post(collect))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
