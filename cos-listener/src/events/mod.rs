//! COS event handling module.
//!
//! This module provides:
//! - Canonical event types shared by the web layer and the stats tracker
//! - Normalization of every supported inbound payload shape
//! - PDF upload classification
//!
//! ## Flow
//!
//! ```text
//! JSON payload → normalize() → [NormalizedEvent] → is_pdf_upload() → PdfStatsTracker
//! ```

pub mod normalizer;
pub mod pdf;
pub mod types;

pub use normalizer::{format_timestamp, normalize, normalize_at, Normalized};
pub use pdf::{is_pdf_key, is_pdf_upload, is_upload_event, DetectionConfig, UPLOAD_EVENTS};
pub use types::{NormalizedEvent, PayloadFormat, PdfUploadRecord, EVENT_SOURCE, UNKNOWN};
