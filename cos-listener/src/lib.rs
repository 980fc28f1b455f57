//! COS Listener - webhook receiver for Cloud Object Storage events.
//!
//! Accepts COS event notifications over HTTP, verifies the optional HMAC
//! signature, normalizes the several payload shapes COS and S3-compatible
//! senders produce, and keeps in-memory statistics on PDF uploads.
//!
//! ## Architecture
//!
//! ```text
//! POST /cos/events → verify signature → normalize → PDF check → PdfStatsTracker
//! ```

pub mod config;
pub mod events;
pub mod stats;
pub mod web;

// Re-export commonly used types
pub use config::Config;
pub use events::{normalize, NormalizedEvent, PayloadFormat, PdfUploadRecord};
pub use stats::{PdfStatsTracker, StatsSnapshot};
pub use web::{router, AppState, VerifyResult};
