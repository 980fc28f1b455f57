//! Inbound payload normalization.
//!
//! COS delivers notifications in several incompatible JSON shapes. Each shape
//! has an extractor that either claims the payload or declines it; extractors
//! are tried in priority order and the first claim wins.
//!
//! ```text
//! {"events": [...]}   → IbmCos
//! {"Records": [...]}  → S3Compatible
//! {"bucket", "key"..} → DirectCos
//! anything else       → Unrecognized (one sentinel event)
//! ```
//!
//! Normalization never fails. Missing fields degrade to defaults so callers
//! always get one record per detected input event.

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use super::types::{NormalizedEvent, PayloadFormat, UNKNOWN};

type Object = Map<String, Value>;

/// Claims a payload and extracts its events, or returns `None` to pass.
type Extractor = fn(&Object, &str) -> Option<Vec<NormalizedEvent>>;

const EXTRACTORS: [(PayloadFormat, Extractor); 3] = [
    (PayloadFormat::IbmCos, extract_ibm_cos),
    (PayloadFormat::S3Compatible, extract_s3_records),
    (PayloadFormat::DirectCos, extract_direct_cos),
];

/// Top-level keys that mark a flat COS notification.
const DIRECT_KEYS: [&str; 7] = [
    "bucket",
    "bucket_name",
    "key",
    "object_name",
    "notification",
    "operation",
    "event_type",
];

/// Result of normalizing one payload.
#[derive(Debug, Clone)]
pub struct Normalized {
    /// Which shape matched
    pub format: PayloadFormat,
    /// Events in payload order
    pub events: Vec<NormalizedEvent>,
}

/// Format a timestamp the way COS does: RFC 3339, UTC, millisecond precision.
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Normalize a decoded payload, using the current time for missing timestamps.
pub fn normalize(payload: &Value) -> Normalized {
    normalize_at(payload, Utc::now())
}

/// Normalize a decoded payload with an explicit "now".
pub fn normalize_at(payload: &Value, now: DateTime<Utc>) -> Normalized {
    let now = format_timestamp(now);

    let matched = payload.as_object().and_then(|object| {
        EXTRACTORS
            .iter()
            .find_map(|(format, extract)| extract(object, &now).map(|events| (*format, events)))
    });

    match matched {
        Some((format, events)) => {
            debug!(
                format = format.as_str(),
                event_count = events.len(),
                "cos_payload_normalized"
            );
            Normalized { format, events }
        }
        None => {
            warn!(
                is_object = payload.is_object(),
                "cos_payload_unrecognized"
            );
            Normalized {
                format: PayloadFormat::Unrecognized,
                events: vec![NormalizedEvent::unknown(now)],
            }
        }
    }
}

// =============================================================================
// Extractors
// =============================================================================

fn extract_ibm_cos(payload: &Object, now: &str) -> Option<Vec<NormalizedEvent>> {
    let events = payload.get("events")?.as_array()?;

    Some(
        events
            .iter()
            .map(|event| {
                let event = event.as_object();
                NormalizedEvent::new(
                    field(event, &["eventType"]).unwrap_or(UNKNOWN),
                    field(event, &["bucket"]).unwrap_or_default(),
                    field(event, &["key", "object_name"]).unwrap_or(UNKNOWN),
                    field(event, &["time"]).unwrap_or(now),
                )
            })
            .collect(),
    )
}

fn extract_s3_records(payload: &Object, now: &str) -> Option<Vec<NormalizedEvent>> {
    let records = payload.get("Records")?.as_array()?;

    Some(
        records
            .iter()
            .map(|record| {
                let record = record.as_object();
                NormalizedEvent::new(
                    field(record, &["eventName"]).unwrap_or(UNKNOWN),
                    path(record, &["s3", "bucket", "name"]).unwrap_or_default(),
                    path(record, &["s3", "object", "key"]).unwrap_or(UNKNOWN),
                    field(record, &["eventTime"]).unwrap_or(now),
                )
            })
            .collect(),
    )
}

/// Flat notifications, including the variant where `notification` is an
/// object carrying its own `event_type`/`object_name`/`bucket_name`.
/// Nested values take precedence over top-level ones; with a nested object
/// the event type comes from it or from `operation` only.
fn extract_direct_cos(payload: &Object, now: &str) -> Option<Vec<NormalizedEvent>> {
    if !DIRECT_KEYS.iter().any(|key| payload.contains_key(*key)) {
        return None;
    }

    let top = Some(payload);
    let nested = payload.get("notification").and_then(Value::as_object);

    let event_type = match nested {
        Some(_) => field(nested, &["event_type"]).or_else(|| field(top, &["operation"])),
        None => field(top, &["event_type", "notification", "operation"]),
    }
    .unwrap_or(UNKNOWN);
    let object_key = field(nested, &["object_name"])
        .or_else(|| field(top, &["key", "object_name"]))
        .unwrap_or(UNKNOWN);
    let bucket = field(nested, &["bucket_name"])
        .or_else(|| field(top, &["bucket", "bucket_name"]))
        .unwrap_or_default();
    let timestamp = field(nested, &["request_time"])
        .or_else(|| field(top, &["request_time"]))
        .unwrap_or(now);

    Some(vec![NormalizedEvent::new(
        event_type, bucket, object_key, timestamp,
    )])
}

// =============================================================================
// Field lookup
// =============================================================================

/// First of `keys` holding a string value. Non-string values count as absent.
fn field<'a>(object: Option<&'a Object>, keys: &[&str]) -> Option<&'a str> {
    let object = object?;
    keys.iter()
        .find_map(|key| object.get(*key).and_then(Value::as_str))
}

/// String value at a nested path of objects.
fn path<'a>(object: Option<&'a Object>, keys: &[&str]) -> Option<&'a str> {
    let (last, parents) = keys.split_last()?;
    let mut current = object?;
    for key in parents {
        current = current.get(*key)?.as_object()?;
    }
    current.get(*last)?.as_str()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::types::EVENT_SOURCE;
    use chrono::TimeZone;
    use serde_json::json;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 26, 9, 0, 0).unwrap()
    }

    const NOW: &str = "2025-06-26T09:00:00.000Z";

    #[test]
    fn test_format_timestamp() {
        assert_eq!(format_timestamp(fixed_now()), NOW);
    }

    #[test]
    fn test_ibm_cos_single_event() {
        let payload = json!({
            "events": [{
                "eventType": "Object:Put",
                "bucket": "b1",
                "key": "x/report.pdf",
                "time": "2024-01-15T10:30:00.000Z"
            }]
        });

        let result = normalize_at(&payload, fixed_now());

        assert_eq!(result.format, PayloadFormat::IbmCos);
        assert_eq!(
            result.events,
            vec![NormalizedEvent::new(
                "Object:Put",
                "b1",
                "x/report.pdf",
                "2024-01-15T10:30:00.000Z"
            )]
        );
    }

    #[test]
    fn test_ibm_cos_preserves_count_and_order() {
        let payload = json!({
            "events": [
                {"eventType": "Object:Put", "bucket": "b", "key": "one.txt"},
                {"eventType": "Object:Delete", "bucket": "b", "object_name": "two.txt"},
                {"bucket": "b"},
                "not-an-object"
            ]
        });

        let events = normalize_at(&payload, fixed_now()).events;

        assert_eq!(events.len(), 4);
        assert!(events.iter().all(|e| e.source == EVENT_SOURCE));
        assert_eq!(events[0].object_key, "one.txt");
        assert_eq!(events[1].object_key, "two.txt");
        assert_eq!(events[1].event_type, "Object:Delete");
        assert_eq!(events[2].event_type, UNKNOWN);
        assert_eq!(events[2].object_key, UNKNOWN);
        assert_eq!(events[2].timestamp, NOW);
        assert_eq!(events[3], NormalizedEvent::unknown(NOW));
    }

    #[test]
    fn test_ibm_cos_empty_events() {
        let result = normalize_at(&json!({"events": []}), fixed_now());

        assert_eq!(result.format, PayloadFormat::IbmCos);
        assert!(result.events.is_empty());
    }

    #[test]
    fn test_ibm_cos_missing_bucket_is_empty() {
        let payload = json!({"events": [{"eventType": "Object:Put", "key": "a.pdf"}]});

        let events = normalize_at(&payload, fixed_now()).events;

        assert_eq!(events[0].bucket, "");
        assert_eq!(events[0].timestamp, NOW);
    }

    #[test]
    fn test_s3_records() {
        let payload = json!({
            "Records": [{
                "eventName": "s3:ObjectCreated:Put",
                "eventTime": "2024-02-01T12:00:00.000Z",
                "s3": {
                    "bucket": {"name": "docs"},
                    "object": {"key": "reports/q1.pdf", "size": 1024}
                }
            }]
        });

        let result = normalize_at(&payload, fixed_now());

        assert_eq!(result.format, PayloadFormat::S3Compatible);
        assert_eq!(
            result.events,
            vec![NormalizedEvent::new(
                "s3:ObjectCreated:Put",
                "docs",
                "reports/q1.pdf",
                "2024-02-01T12:00:00.000Z"
            )]
        );
    }

    #[test]
    fn test_s3_records_missing_nested_fields() {
        let payload = json!({"Records": [{"eventName": "s3:ObjectRemoved:Delete", "s3": {}}]});

        let events = normalize_at(&payload, fixed_now()).events;

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].bucket, "");
        assert_eq!(events[0].object_key, UNKNOWN);
        assert_eq!(events[0].timestamp, NOW);
    }

    #[test]
    fn test_events_take_priority_over_records() {
        let payload = json!({
            "events": [{"eventType": "Object:Put", "key": "from-events"}],
            "Records": [{"eventName": "s3:ObjectCreated:Put"}]
        });

        let result = normalize_at(&payload, fixed_now());

        assert_eq!(result.format, PayloadFormat::IbmCos);
        assert_eq!(result.events[0].object_key, "from-events");
    }

    #[test]
    fn test_records_take_priority_over_direct_fields() {
        let payload = json!({
            "Records": [{
                "eventName": "s3:ObjectCreated:Put",
                "s3": {
                    "bucket": {"name": "records-bucket"},
                    "object": {"key": "nested/from-records.pdf"}
                }
            }],
            "bucket": "x",
            "key": "y"
        });

        let result = normalize_at(&payload, fixed_now());

        assert_eq!(result.format, PayloadFormat::S3Compatible);
        assert_eq!(result.events.len(), 1);
        assert_eq!(result.events[0].object_key, "nested/from-records.pdf");
        assert_eq!(result.events[0].bucket, "records-bucket");
    }

    #[test]
    fn test_nested_notification_ignores_top_level_event_type() {
        let payload = json!({
            "event_type": "Object:Delete",
            "operation": "Object:Write",
            "key": "a.pdf",
            "notification": {"format": "2.0"}
        });

        let events = normalize_at(&payload, fixed_now()).events;

        assert_eq!(events[0].event_type, "Object:Write");
    }

    #[test]
    fn test_non_array_events_falls_through() {
        let payload = json!({"events": "oops", "bucket": "b", "key": "k"});

        let result = normalize_at(&payload, fixed_now());

        assert_eq!(result.format, PayloadFormat::DirectCos);
        assert_eq!(result.events[0].object_key, "k");
    }

    #[test]
    fn test_direct_cos_notification_string() {
        let payload = json!({
            "bucket": "bucket-redact-test",
            "key": "MyTheron - Architecture.pdf",
            "notification": "Object:Write"
        });

        let result = normalize_at(&payload, fixed_now());

        assert_eq!(result.format, PayloadFormat::DirectCos);
        assert_eq!(
            result.events,
            vec![NormalizedEvent::new(
                "Object:Write",
                "bucket-redact-test",
                "MyTheron - Architecture.pdf",
                NOW
            )]
        );
    }

    #[test]
    fn test_direct_cos_field_precedence() {
        let payload = json!({
            "event_type": "Object:Put",
            "notification": "Object:Post",
            "operation": "Put",
            "object_name": "b.pdf",
            "request_time": "2024-03-03T03:03:03.000Z"
        });

        let events = normalize_at(&payload, fixed_now()).events;

        assert_eq!(events[0].event_type, "Object:Put");
        assert_eq!(events[0].object_key, "b.pdf");
        assert_eq!(events[0].bucket, "");
        assert_eq!(events[0].timestamp, "2024-03-03T03:03:03.000Z");
    }

    #[test]
    fn test_direct_cos_operation_only() {
        let payload = json!({"bucket": "b", "operation": "Object:Delete"});

        let events = normalize_at(&payload, fixed_now()).events;

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event_type, "Object:Delete");
        assert_eq!(events[0].object_key, UNKNOWN);
    }

    #[test]
    fn test_direct_cos_nested_notification() {
        let payload = json!({
            "bucket": "bucket-redact-test",
            "endpoint": "",
            "key": "Application Services Layer (Backend Services).pdf",
            "notification": {
                "bucket_name": "bucket-redact-test",
                "content_type": "application/pdf",
                "event_type": "Object:Write",
                "format": "2.0",
                "object_name": "Application Services Layer (Backend Services).pdf",
                "request_time": "2025-06-26T08:59:47.576Z"
            },
            "operation": "Object:Write"
        });

        let result = normalize_at(&payload, fixed_now());

        assert_eq!(result.format, PayloadFormat::DirectCos);
        assert_eq!(
            result.events,
            vec![NormalizedEvent::new(
                "Object:Write",
                "bucket-redact-test",
                "Application Services Layer (Backend Services).pdf",
                "2025-06-26T08:59:47.576Z"
            )]
        );
    }

    #[test]
    fn test_nested_notification_falls_back_to_top_level() {
        let payload = json!({
            "bucket_name": "outer",
            "key": "outer.pdf",
            "operation": "Object:Put",
            "notification": {"format": "2.0"}
        });

        let events = normalize_at(&payload, fixed_now()).events;

        assert_eq!(events[0].event_type, "Object:Put");
        assert_eq!(events[0].object_key, "outer.pdf");
        assert_eq!(events[0].bucket, "outer");
        assert_eq!(events[0].timestamp, NOW);
    }

    #[test]
    fn test_non_string_fields_count_as_absent() {
        let payload = json!({"bucket": 42, "key": ["a"], "operation": "Object:Put"});

        let events = normalize_at(&payload, fixed_now()).events;

        assert_eq!(events[0].bucket, "");
        assert_eq!(events[0].object_key, UNKNOWN);
        assert_eq!(events[0].event_type, "Object:Put");
    }

    #[test]
    fn test_unrecognized_payloads() {
        for payload in [
            json!({}),
            json!({"hello": "world"}),
            json!([1, 2, 3]),
            json!("just a string"),
            json!(null),
            json!({"Records": {"not": "an array"}}),
        ] {
            let result = normalize_at(&payload, fixed_now());

            assert_eq!(result.format, PayloadFormat::Unrecognized);
            assert_eq!(result.events, vec![NormalizedEvent::unknown(NOW)]);
        }
    }
}
