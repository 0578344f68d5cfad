//! Sensor record consolidation from raw rows

use std::collections::HashMap;

use serde::Serialize;

use crate::alias;
use crate::days::DayIndex;
use crate::observer::{DropReason, IngestObserver};
use crate::row::RawRow;

/// Consolidated per-sensor state built from every ingested row.
///
/// Coordinates and location labels are first-valid-wins across rows;
/// `latest_value` is last-write-wins; `rows` keeps the full history in
/// insertion order for the detail table and day-based lookup.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SensorRecord {
    pub sensor_id: String,
    pub lat: f64,
    pub lon: f64,
    pub street: String,
    pub city: String,
    pub latest_value: Option<f64>,
    pub rows: Vec<RawRow>,
}

/// Mapping of sensor id -> record.
///
/// Invariant: a record exists iff at least one row with a usable id and
/// finite coordinates was ingested for that id.
#[derive(Debug, Clone, Default)]
pub struct SensorStore {
    records: HashMap<String, SensorRecord>,
}

impl SensorStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one raw row into the store. Rows without a usable id or with
    /// non-finite coordinates are dropped whole; the observer hears about
    /// every outcome. Returns the sensor id when the row was ingested.
    pub fn ingest(&mut self, row: RawRow, observer: &mut dyn IngestObserver) -> Option<String> {
        let Some(id) = alias::sensor_id(&row) else {
            observer.row_dropped(DropReason::MissingSensorId, &row);
            return None;
        };
        let lat = alias::latitude(&row).filter(|v| v.is_finite());
        let lon = alias::longitude(&row).filter(|v| v.is_finite());
        let (Some(lat), Some(lon)) = (lat, lon) else {
            observer.row_dropped(DropReason::InvalidCoordinates, &row);
            return None;
        };

        let created = !self.records.contains_key(&id);
        let record = self
            .records
            .entry(id.clone())
            .or_insert_with(|| SensorRecord {
                sensor_id: id.clone(),
                lat,
                lon,
                street: String::new(),
                city: String::new(),
                latest_value: None,
                rows: Vec::new(),
            });

        // Repair coordinates on a record created before they were known.
        if !record.lat.is_finite() || !record.lon.is_finite() {
            record.lat = lat;
            record.lon = lon;
        }
        if record.street.is_empty() {
            if let Some(street) = alias::street(&row) {
                record.street = street.to_string();
            }
        }
        if record.city.is_empty() {
            if let Some(city) = alias::city(&row) {
                record.city = city.to_string();
            }
        }

        // Forecast rows carry the prediction; observation rows fall back
        // to the measured value. Neither parseable leaves the last value.
        if let Some(predicted) = alias::predicted(&row).filter(|v| v.is_finite()) {
            record.latest_value = Some(predicted);
        } else if let Some(actual) = alias::observed(&row).filter(|v| v.is_finite()) {
            record.latest_value = Some(actual);
        }

        record.rows.push(row);
        observer.row_ingested(&id, created);
        Some(id)
    }

    /// Full-reload path: clears existing records, then ingests in order.
    pub fn ingest_batch(&mut self, rows: Vec<RawRow>, observer: &mut dyn IngestObserver) {
        self.records.clear();
        for row in rows {
            self.ingest(row, observer);
        }
    }

    pub fn get(&self, sensor_id: &str) -> Option<&SensorRecord> {
        self.records.get(sensor_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &SensorRecord> {
        self.records.values()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Everything one full data load produces: consolidated records, the
/// forecast day index, and the column order of the source table.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub store: SensorStore,
    pub day_index: DayIndex,
    pub headers: Vec<String>,
}

impl Snapshot {
    /// Rebuild from scratch out of a full row set. The header set is the
    /// key set of the first row, taken before any drop filtering so the
    /// table columns always mirror the source.
    pub fn load(rows: Vec<RawRow>, observer: &mut dyn IngestObserver) -> Self {
        let day_index = DayIndex::derive(&rows);
        let headers = rows
            .first()
            .map(|row| row.keys().map(str::to_string).collect())
            .unwrap_or_default();
        let mut store = SensorStore::new();
        store.ingest_batch(rows, observer);
        Self {
            store,
            day_index,
            headers,
        }
    }

    /// Incremental path for rows streamed in after the initial load. The
    /// day index stays as derived at load time.
    pub fn ingest(&mut self, row: RawRow, observer: &mut dyn IngestObserver) -> Option<String> {
        self.store.ingest(row, observer)
    }
}
