//! Canonical event types produced by the normalizer.
//!
//! Every inbound payload shape is reduced to a sequence of
//! [`NormalizedEvent`]s; PDF uploads are additionally captured as
//! [`PdfUploadRecord`]s by the stats tracker.

use serde::Serialize;

/// Provenance tag stamped on every normalized event.
pub const EVENT_SOURCE: &str = "ibm_cos";

/// Placeholder for an event type or object key that could not be resolved.
pub const UNKNOWN: &str = "Unknown";

/// Inbound payload shape, in detection priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadFormat {
    /// `{"events": [...]}`
    IbmCos,
    /// `{"Records": [...]}`
    S3Compatible,
    /// Flat COS notification, optionally with a nested `notification` object
    DirectCos,
    /// Nothing matched; a single sentinel event is emitted
    Unrecognized,
}

impl PayloadFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            PayloadFormat::IbmCos => "ibm_cos",
            PayloadFormat::S3Compatible => "s3_compatible",
            PayloadFormat::DirectCos => "direct_cos",
            PayloadFormat::Unrecognized => "unrecognized",
        }
    }
}

/// Format-agnostic view of a single storage event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NormalizedEvent {
    /// Canonical event name, e.g. `Object:Put`
    pub event_type: String,
    /// Bucket name, empty when the payload omits it
    pub bucket: String,
    /// Object path within the bucket
    pub object_key: String,
    /// ISO-8601 timestamp from the payload, or normalization time
    pub timestamp: String,
    /// Always [`EVENT_SOURCE`]
    pub source: String,
}

impl NormalizedEvent {
    pub fn new(
        event_type: impl Into<String>,
        bucket: impl Into<String>,
        object_key: impl Into<String>,
        timestamp: impl Into<String>,
    ) -> Self {
        Self {
            event_type: event_type.into(),
            bucket: bucket.into(),
            object_key: object_key.into(),
            timestamp: timestamp.into(),
            source: EVENT_SOURCE.to_string(),
        }
    }

    /// The sentinel record emitted for payloads with no recognizable shape.
    pub fn unknown(timestamp: impl Into<String>) -> Self {
        Self::new(UNKNOWN, "", UNKNOWN, timestamp)
    }
}

/// Retained summary of a detected PDF upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PdfUploadRecord {
    pub file_name: String,
    pub bucket: String,
    pub event_type: String,
    pub timestamp: String,
    pub source: String,
}

impl From<&NormalizedEvent> for PdfUploadRecord {
    fn from(event: &NormalizedEvent) -> Self {
        Self {
            file_name: event.object_key.clone(),
            bucket: event.bucket.clone(),
            event_type: event.event_type.clone(),
            timestamp: event.timestamp.clone(),
            source: event.source.clone(),
        }
    }
}
