//! HTTP endpoint handlers.
//!
//! The webhook handler does all of its work inline:
//! 1. Verify the `X-Cos-Signature` header (if a secret is configured)
//! 2. Decode and normalize the payload
//! 3. Fold PDF uploads into the shared stats tracker
//! 4. Echo the normalized events back
//!
//! The remaining endpoints only report configuration and tracker state.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Query, State},
    http::HeaderMap,
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use crate::events::{format_timestamp, normalize, DetectionConfig, NormalizedEvent, PdfUploadRecord};
use crate::stats::PdfStatsTracker;
use crate::web::error::WebhookError;
use crate::web::signature::{verify_cos_signature, VerifyResult, SIGNATURE_HEADER};
use crate::Config;

/// Default page size for `/pdf/stats`.
const DEFAULT_STATS_LIMIT: i64 = 10;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub pdf_stats: PdfStatsTracker,
}

impl AppState {
    pub fn new(config: Config, pdf_stats: PdfStatsTracker) -> Self {
        Self {
            config: Arc::new(config),
            pdf_stats,
        }
    }
}

fn now_timestamp() -> String {
    format_timestamp(Utc::now())
}

// =============================================================================
// Health Check
// =============================================================================

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub message: &'static str,
    pub cos_configured: bool,
    pub signature_verification: SignatureStatus,
    pub pdf_detection: PdfDetectionStatus,
    pub timestamp: String,
}

#[derive(Serialize)]
pub struct SignatureStatus {
    pub enabled: bool,
    pub secret_configured: bool,
    pub disabled_for_testing: bool,
}

#[derive(Serialize)]
pub struct PdfDetectionStatus {
    pub enabled: bool,
    pub total_pdf_uploads: u64,
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let config = &state.config;

    Json(HealthResponse {
        status: "healthy",
        message: "Server is running",
        cos_configured: config.cos_configured(),
        signature_verification: SignatureStatus {
            enabled: config.signature_verification_enabled(),
            secret_configured: config.has_secret(),
            disabled_for_testing: config.disable_signature_verification,
        },
        pdf_detection: PdfDetectionStatus {
            enabled: true,
            total_pdf_uploads: state.pdf_stats.total_count(),
        },
        timestamp: now_timestamp(),
    })
}

// =============================================================================
// COS Webhook
// =============================================================================

/// Webhook response.
#[derive(Serialize)]
pub struct EventsResponse {
    pub status: &'static str,
    pub message: String,
    pub events: Vec<NormalizedEvent>,
    pub timestamp: String,
}

/// COS event webhook endpoint.
///
/// Unrecognized payload shapes are accepted and reported as a single
/// `Unknown` event; only a bad signature or undecodable JSON is rejected.
pub async fn receive_cos_events(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<EventsResponse>, WebhookError> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok());

    info!(
        body_length = body.len(),
        has_signature = signature.is_some(),
        "cos_event_received"
    );

    let verdict = verify_cos_signature(
        &body,
        signature,
        state.config.cos_secret_key.as_deref(),
        state.config.disable_signature_verification,
    );
    if verdict == VerifyResult::Invalid {
        warn!(body_length = body.len(), "cos_signature_invalid");
        return Err(WebhookError::InvalidSignature);
    }

    let payload: Value = serde_json::from_slice(&body).map_err(|e| {
        warn!(error = %e, "cos_payload_invalid_json");
        WebhookError::from(e)
    })?;

    let normalized = normalize(&payload);

    // One record() per event keeps history in completion order.
    let pdf_uploads = normalized
        .events
        .iter()
        .filter(|event| state.pdf_stats.observe(event))
        .count();

    info!(
        format = normalized.format.as_str(),
        verification = ?verdict,
        event_count = normalized.events.len(),
        pdf_uploads = pdf_uploads,
        "cos_events_processed"
    );

    Ok(Json(EventsResponse {
        status: "success",
        message: format!("Processed {} events", normalized.events.len()),
        events: normalized.events,
        timestamp: now_timestamp(),
    }))
}

#[derive(Serialize)]
pub struct CosConfigEcho {
    pub endpoint: String,
    pub bucket: String,
    pub has_secret: bool,
}

#[derive(Serialize)]
pub struct EndpointStatusResponse {
    pub status: &'static str,
    pub endpoint: &'static str,
    pub method: &'static str,
    pub description: &'static str,
    pub config: CosConfigEcho,
}

/// Status probe for the webhook endpoint.
pub async fn cos_events_status(State(state): State<AppState>) -> Json<EndpointStatusResponse> {
    let config = &state.config;

    Json(EndpointStatusResponse {
        status: "active",
        endpoint: "/cos/events",
        method: "POST",
        description: "COS event webhook endpoint",
        config: CosConfigEcho {
            endpoint: config.cos_endpoint.clone().unwrap_or_default(),
            bucket: config.cos_bucket_name.clone().unwrap_or_default(),
            has_secret: config.has_secret(),
        },
    })
}

// =============================================================================
// PDF Statistics
// =============================================================================

/// Pagination parameters. Values that don't parse as integers fall back to
/// the defaults instead of rejecting the request.
#[derive(Debug, Default, Deserialize)]
pub struct StatsQuery {
    pub limit: Option<String>,
    pub offset: Option<String>,
}

impl StatsQuery {
    fn limit(&self) -> i64 {
        parse_or(self.limit.as_deref(), DEFAULT_STATS_LIMIT).max(0)
    }

    fn offset(&self) -> i64 {
        parse_or(self.offset.as_deref(), 0).max(0)
    }
}

fn parse_or(raw: Option<&str>, default: i64) -> i64 {
    raw.and_then(|v| v.trim().parse().ok()).unwrap_or(default)
}

#[derive(Serialize)]
pub struct PdfUploadStatistics {
    pub total_pdf_uploads: u64,
    pub recent_uploads_count: usize,
    pub uploads_tracked: usize,
}

#[derive(Serialize)]
pub struct Pagination {
    pub limit: i64,
    pub offset: i64,
    pub total: usize,
}

#[derive(Serialize)]
pub struct PdfStatsResponse {
    pub pdf_upload_statistics: PdfUploadStatistics,
    pub recent_pdf_uploads: Vec<PdfUploadRecord>,
    pub pagination: Pagination,
    pub detection_config: DetectionConfig,
    pub timestamp: String,
}

/// PDF upload statistics, newest uploads first.
pub async fn pdf_stats(
    State(state): State<AppState>,
    Query(query): Query<StatsQuery>,
) -> Json<PdfStatsResponse> {
    let (limit, offset) = (query.limit(), query.offset());
    let snapshot = state.pdf_stats.snapshot(limit, offset);

    Json(PdfStatsResponse {
        pdf_upload_statistics: PdfUploadStatistics {
            total_pdf_uploads: snapshot.total_count,
            recent_uploads_count: snapshot.recent_uploads_count(),
            uploads_tracked: snapshot.uploads_tracked,
        },
        pagination: Pagination {
            limit,
            offset,
            total: snapshot.uploads_tracked,
        },
        recent_pdf_uploads: snapshot.recent,
        detection_config: DetectionConfig::current(),
        timestamp: now_timestamp(),
    })
}
