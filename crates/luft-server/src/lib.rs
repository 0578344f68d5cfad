//! HTTP service for the PM2.5 forecast map
//!
//! Serves consolidated sensor records, the forecast day index, and
//! per-day resolved values to the map frontend. All state lives in one
//! explicit [`Snapshot`] behind a mutex; a full reload swaps it
//! wholesale, incremental row posts mutate it in place.

pub mod config;

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use opentelemetry::metrics::{Counter, MeterProvider};
use opentelemetry_prometheus::exporter;
use opentelemetry_sdk::metrics::SdkMeterProvider;
use prometheus::{Encoder, Registry, TextEncoder};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use luft_core::{display, resolve_value, LogObserver, RawRow, SensorRecord, Snapshot};

pub struct AppState {
    ready: AtomicBool,
    registry: Registry,
    #[allow(dead_code)]
    provider: SdkMeterProvider,
    requests_total: Counter<u64>,
    data_path: Option<String>,
    snapshot: Mutex<Snapshot>,
}

pub fn build_app(data_path: Option<String>) -> (Router, Arc<AppState>) {
    // Prometheus exporter via OpenTelemetry
    let registry = Registry::new();
    let reader = exporter()
        .with_registry(registry.clone())
        .build()
        .expect("prom exporter");
    let provider = SdkMeterProvider::builder().with_reader(reader).build();
    let meter = provider.meter("luft-server");

    let requests_total = meter
        .u64_counter("luft_requests_total")
        .with_description("Total HTTP requests served")
        .init();

    let state = Arc::new(AppState {
        ready: AtomicBool::new(false),
        registry,
        provider,
        requests_total,
        data_path,
        snapshot: Mutex::new(Snapshot::default()),
    });

    let router = Router::new()
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .route("/metrics", get(metrics))
        .route("/api/v1/sensors", get(list_sensors))
        .route("/api/v1/sensors/:id", get(get_sensor))
        .route("/api/v1/sensors/:id/value", get(get_value))
        .route("/api/v1/days", get(list_days))
        .route("/api/v1/rows", post(ingest_row))
        .route("/api/v1/reload", post(reload))
        .with_state(Arc::clone(&state));

    (router, state)
}

pub fn set_ready(state: &Arc<AppState>, is_ready: bool) {
    state.ready.store(is_ready, Ordering::Relaxed);
}

/// Replace the snapshot with a fresh load of the configured row file.
/// Returns the number of consolidated sensors.
pub async fn load_snapshot(state: &Arc<AppState>) -> anyhow::Result<usize> {
    let Some(path) = state.data_path.as_deref() else {
        anyhow::bail!("no data path configured");
    };
    let set = luft_source::load_rows(path)?;
    let snapshot = Snapshot::load(set.rows, &mut LogObserver);
    let sensors = snapshot.store.len();
    *state.snapshot.lock().await = snapshot;
    Ok(sensors)
}

/// Install a snapshot directly (startup with preloaded rows, tests,
/// embedded use).
pub async fn install_snapshot(state: &Arc<AppState>, snapshot: Snapshot) {
    *state.snapshot.lock().await = snapshot;
}

async fn healthz(State(state): State<Arc<AppState>>) -> StatusCode {
    state.requests_total.add(1, &[]);
    StatusCode::OK
}

async fn readyz(State(state): State<Arc<AppState>>) -> StatusCode {
    if state.ready.load(Ordering::Relaxed) {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}

async fn metrics(State(state): State<Arc<AppState>>) -> Response {
    let encoder = TextEncoder::new();
    let mut buf = Vec::new();
    if let Err(e) = encoder.encode(&state.registry.gather(), &mut buf) {
        tracing::warn!(error = ?e, "failed to encode metrics");
    }
    let body = String::from_utf8(buf).unwrap_or_default();
    (
        [(
            header::CONTENT_TYPE,
            "text/plain; version=0.0.4; charset=utf-8",
        )],
        body,
    )
        .into_response()
}

/// Marker-level view of a sensor record.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SensorSummary {
    sensor_id: String,
    lat: f64,
    lon: f64,
    street: String,
    city: String,
    latest_value: Option<f64>,
    color: &'static str,
}

impl From<&SensorRecord> for SensorSummary {
    fn from(record: &SensorRecord) -> Self {
        Self {
            sensor_id: record.sensor_id.clone(),
            lat: record.lat,
            lon: record.lon,
            street: record.street.clone(),
            city: record.city.clone(),
            latest_value: record.latest_value,
            color: display::marker_color(record.latest_value),
        }
    }
}

async fn list_sensors(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    state.requests_total.add(1, &[]);
    let snapshot = state.snapshot.lock().await;
    let mut sensors: Vec<SensorSummary> = snapshot.store.iter().map(SensorSummary::from).collect();
    // Stable output regardless of map iteration order.
    sensors.sort_by(|a, b| a.sensor_id.cmp(&b.sensor_id));
    Json(sensors)
}

/// Full record plus the detail-table column order.
#[derive(Serialize)]
struct SensorDetail {
    #[serde(flatten)]
    record: SensorRecord,
    columns: Vec<String>,
}

async fn get_sensor(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> Response {
    let snapshot = state.snapshot.lock().await;
    match snapshot.store.get(&id) {
        Some(record) => (
            StatusCode::OK,
            Json(SensorDetail {
                record: record.clone(),
                columns: display::table_columns(&snapshot.headers),
            }),
        )
            .into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

#[derive(Deserialize)]
struct ValueQuery {
    day: Option<u32>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DayValue {
    sensor_id: String,
    day: u32,
    date: Option<String>,
    label: String,
    value: Option<f64>,
}

async fn get_value(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(q): Query<ValueQuery>,
) -> Response {
    let day = q.day.unwrap_or(0);
    let snapshot = state.snapshot.lock().await;
    let Some(record) = snapshot.store.get(&id) else {
        return StatusCode::NOT_FOUND.into_response();
    };
    let value = resolve_value(record, day, &snapshot.day_index);
    Json(DayValue {
        sensor_id: id,
        day,
        date: snapshot.day_index.iso(day),
        label: display::format_day_label(day, &snapshot.day_index),
        value,
    })
    .into_response()
}

#[derive(Serialize)]
struct DayEntry {
    day: u32,
    date: String,
    label: String,
}

async fn list_days(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let snapshot = state.snapshot.lock().await;
    let days: Vec<DayEntry> = snapshot
        .day_index
        .iter()
        .map(|(day, date)| DayEntry {
            day,
            date: date.format("%Y-%m-%d").to_string(),
            label: display::format_day_label(day, &snapshot.day_index),
        })
        .collect();
    Json(days)
}

async fn ingest_row(State(state): State<Arc<AppState>>, Json(row): Json<RawRow>) -> Response {
    state.requests_total.add(1, &[]);
    let mut snapshot = state.snapshot.lock().await;
    match snapshot.ingest(row, &mut LogObserver) {
        Some(id) => (
            StatusCode::OK,
            Json(serde_json::json!({"status": "ok", "sensorId": id})),
        )
            .into_response(),
        None => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(serde_json::json!({"status": "dropped"})),
        )
            .into_response(),
    }
}

async fn reload(State(state): State<Arc<AppState>>) -> Response {
    state.requests_total.add(1, &[]);
    match load_snapshot(&state).await {
        Ok(sensors) => (
            StatusCode::OK,
            Json(serde_json::json!({"status": "ok", "sensors": sensors})),
        )
            .into_response(),
        Err(e) => {
            tracing::error!(error = ?e, "reload failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({"status": "error"})),
            )
                .into_response()
        }
    }
}
