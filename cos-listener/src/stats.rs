//! In-memory PDF upload statistics.
//!
//! The tracker is a cheap-to-clone handle around shared state. The total
//! count and the recent-history buffer live behind a single mutex, so a
//! reader never sees one updated without the other.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::Serialize;
use tracing::info;

use crate::events::{is_pdf_upload, NormalizedEvent, PdfUploadRecord};

/// Number of recent PDF uploads retained.
pub const RECENT_CAPACITY: usize = 100;

/// Shared PDF upload counters and bounded history.
#[derive(Clone)]
pub struct PdfStatsTracker {
    inner: Arc<Mutex<TrackerState>>,
}

struct TrackerState {
    capacity: usize,
    total_count: u64,
    recent: VecDeque<PdfUploadRecord>,
}

/// Read-only view of the tracker, one page of history newest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
    /// Uploads seen since process start
    pub total_count: u64,
    /// Entries currently held in the history buffer
    pub uploads_tracked: usize,
    /// The requested page
    pub recent: Vec<PdfUploadRecord>,
}

impl StatsSnapshot {
    pub fn recent_uploads_count(&self) -> usize {
        self.recent.len()
    }
}

impl Default for PdfStatsTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfStatsTracker {
    pub fn new() -> Self {
        Self::with_capacity(RECENT_CAPACITY)
    }

    /// Create a tracker retaining at most `capacity` recent uploads.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(TrackerState {
                capacity,
                total_count: 0,
                recent: VecDeque::with_capacity(capacity),
            })),
        }
    }

    // Both fields are written under one guard, so a poisoned lock still
    // holds consistent state.
    fn state(&self) -> MutexGuard<'_, TrackerState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Count an upload and append it to the history, evicting the oldest
    /// entry once the buffer is full.
    pub fn record(&self, event: &NormalizedEvent) {
        let mut state = self.state();

        state.total_count += 1;
        if state.recent.len() >= state.capacity {
            state.recent.pop_front();
        }
        if state.capacity > 0 {
            state.recent.push_back(PdfUploadRecord::from(event));
        }
    }

    /// Record the event if it is a PDF upload. Returns whether it was.
    pub fn observe(&self, event: &NormalizedEvent) -> bool {
        if !is_pdf_upload(event) {
            return false;
        }

        info!(
            file_name = %event.object_key,
            bucket = %event.bucket,
            event_type = %event.event_type,
            timestamp = %event.timestamp,
            "pdf_upload_detected"
        );
        self.record(event);
        true
    }

    pub fn total_count(&self) -> u64 {
        self.state().total_count
    }

    /// Page through history newest first. Negative `limit`/`offset` clamp
    /// to zero; an offset past the end yields an empty page.
    pub fn snapshot(&self, limit: i64, offset: i64) -> StatsSnapshot {
        let limit = usize::try_from(limit).unwrap_or(0);
        let offset = usize::try_from(offset).unwrap_or(0);

        let state = self.state();
        StatsSnapshot {
            total_count: state.total_count,
            uploads_tracked: state.recent.len(),
            recent: state
                .recent
                .iter()
                .rev()
                .skip(offset)
                .take(limit)
                .cloned()
                .collect(),
        }
    }
}
