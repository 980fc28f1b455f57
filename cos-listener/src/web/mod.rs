//! Web server module for receiving COS event notifications.
//!
//! Routes:
//! - `POST /cos/events`: webhook receiver
//! - `GET /cos/events`: webhook status probe
//! - `GET /pdf/stats`: PDF upload statistics
//! - `GET /health`: health check

pub mod error;
pub mod handlers;
pub mod signature;

use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;

pub use error::WebhookError;
pub use handlers::{
    cos_events_status, health, pdf_stats, receive_cos_events, AppState, EventsResponse,
    HealthResponse, PdfStatsResponse, StatsQuery,
};
pub use signature::{sign, verify_cos_signature, VerifyResult, SIGNATURE_HEADER};

/// Build the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/cos/events", get(cos_events_status).post(receive_cos_events))
        .route("/pdf/stats", get(pdf_stats))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
