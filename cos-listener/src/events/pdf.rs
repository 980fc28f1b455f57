//! PDF upload detection.
//!
//! An event counts as a PDF upload when its type is one of the upload-class
//! event names (exact, case-sensitive match) and its object key looks like a
//! PDF. Deletes and copies are never PDF uploads, whatever the key.

use serde::Serialize;

use super::types::NormalizedEvent;

/// Event types that represent object creation.
pub const UPLOAD_EVENTS: [&str; 6] = [
    "Object:Put",
    "Object:Post",
    "s3:ObjectCreated:Put",
    "s3:ObjectCreated:Post",
    "s3:ObjectCreated:CompleteMultipartUpload",
    "Object:Write",
];

/// Extensions matched case-insensitively at the end of the key.
pub const PDF_EXTENSIONS: [&str; 1] = [".pdf"];

/// Substrings matched case-insensitively in the file name (after the last `/`).
pub const FILENAME_PATTERNS: [&str; 1] = ["pdf"];

/// Static detection rules, echoed by the stats endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct DetectionConfig {
    pub upload_events: &'static [&'static str],
    pub pdf_extensions: &'static [&'static str],
    pub filename_patterns: &'static [&'static str],
}

impl DetectionConfig {
    pub fn current() -> Self {
        Self {
            upload_events: &UPLOAD_EVENTS,
            pdf_extensions: &PDF_EXTENSIONS,
            filename_patterns: &FILENAME_PATTERNS,
        }
    }
}

pub fn is_upload_event(event_type: &str) -> bool {
    UPLOAD_EVENTS.contains(&event_type)
}

/// Whether an object key names a PDF, by extension or by name pattern.
pub fn is_pdf_key(object_key: &str) -> bool {
    let key = object_key.to_lowercase();
    let file_name = key.rsplit('/').next().unwrap_or_default();

    PDF_EXTENSIONS.iter().any(|ext| key.ends_with(ext))
        || FILENAME_PATTERNS.iter().any(|pattern| file_name.contains(pattern))
}

pub fn is_pdf_upload(event: &NormalizedEvent) -> bool {
    is_upload_event(&event.event_type) && is_pdf_key(&event.object_key)
}
