//! Plain HTTP/JSON front end.

mod error;
mod handlers;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router, middleware,
    routing::{get, post},
};
use tower_http::{
    LatencyUnit,
    cors::CorsLayer,
    timeout::TimeoutLayer,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

pub use error::AppError;
pub use handlers::LookupParams;

use crate::deposit_service::DepositService;

/// Deadline to produce a response
pub const API_WRITE_TIMEOUT: Duration = Duration::from_secs(20);

/// State shared by the handlers
pub struct AppState {
    deposit_service: Arc<dyn DepositService>,
}

impl AppState {
    /// AppState factory
    pub fn new(deposit_service: Arc<dyn DepositService>) -> Self {
        Self { deposit_service }
    }
}

/// Handlers state handle
pub type SharedState = Arc<AppState>;

/// Routes of the HTTP API.
pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/api/nextdeposit", post(handlers::next_deposit))
        .route("/api/get_blocks", get(handlers::get_blocks))
        .route("/api/get_blocks_by_seq", get(handlers::get_blocks_by_seq))
        .route("/api/get_last_blocks", get(handlers::get_last_blocks))
        .route("/api/get_block_count", get(handlers::get_block_count))
        .route("/api/get_transaction", get(handlers::get_transaction))
        .with_state(state)
        .layer(middleware::from_fn(handlers::set_json_app_header))
        .layer(TimeoutLayer::new(API_WRITE_TIMEOUT))
        .layer(CorsLayer::permissive())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(
                    DefaultMakeSpan::new()
                        .include_headers(false)
                        .level(Level::DEBUG),
                )
                .on_request(DefaultOnRequest::new().level(Level::DEBUG))
                .on_response(
                    DefaultOnResponse::new()
                        .level(Level::INFO)
                        .include_headers(true)
                        .latency_unit(LatencyUnit::Micros),
                ),
        )
}
