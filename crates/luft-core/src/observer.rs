//! Ingest diagnostics hook
//!
//! Malformed rows are dropped silently at the API surface. Callers that
//! want visibility inject an observer; the core never writes to a logger
//! on its own.

use crate::row::RawRow;

/// Why a row contributed nothing to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    MissingSensorId,
    InvalidCoordinates,
}

pub trait IngestObserver {
    fn row_dropped(&mut self, reason: DropReason, row: &RawRow) {
        let _ = (reason, row);
    }

    fn row_ingested(&mut self, sensor_id: &str, created: bool) {
        let _ = (sensor_id, created);
    }
}

/// Discards every event.
pub struct NullObserver;

impl IngestObserver for NullObserver {}

/// Forwards events to `tracing`.
pub struct LogObserver;

impl IngestObserver for LogObserver {
    fn row_dropped(&mut self, reason: DropReason, row: &RawRow) {
        tracing::warn!(?reason, columns = row.len(), "dropping row");
    }

    fn row_ingested(&mut self, sensor_id: &str, created: bool) {
        tracing::trace!(sensor_id, created, "row ingested");
    }
}
