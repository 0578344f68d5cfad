//! Field-alias resolution for inconsistent source schemas
//!
//! Upstream CSV exports and JSON feeds disagree on column naming
//! (`sensor_id` vs `sensorId`, `latitude` vs `lat`). Every logical field
//! has an ordered candidate-key list here; resolution is first-match-wins
//! against the row. Keeping the tables in one place makes the naming
//! contract testable independent of ingestion.

use crate::row::{FieldValue, RawRow};

pub const SENSOR_ID: &[&str] = &["sensor_id", "sensorId"];
pub const LATITUDE: &[&str] = &["latitude", "lat"];
pub const LONGITUDE: &[&str] = &["longitude", "lon", "lng"];
pub const STREET: &[&str] = &["street", "location"];
pub const CITY: &[&str] = &["city_y", "city_x", "city"];
pub const PREDICTED: &[&str] = &["predicted_pm25", "predicted"];
pub const OBSERVED: &[&str] = &["pm25"];
pub const DATE: &[&str] = &["date"];
pub const FORECAST_OFFSET: &[&str] = &["days_before_forecast_day", "daysBeforeForecastDay"];

/// First candidate key present on the row with a non-null value. A key
/// that is present but blank still wins: blankness is decided by the
/// typed readers, not the lookup.
pub fn first_present<'a>(row: &'a RawRow, keys: &[&str]) -> Option<&'a FieldValue> {
    keys.iter()
        .filter_map(|k| row.get(k))
        .find(|v| !v.is_null())
}

/// First candidate key carrying non-blank text.
fn first_text<'a>(row: &'a RawRow, keys: &[&str]) -> Option<&'a str> {
    keys.iter()
        .filter_map(|k| row.get(k))
        .find_map(FieldValue::as_text)
}

fn number(row: &RawRow, keys: &[&str]) -> Option<f64> {
    first_present(row, keys)?.as_number()
}

/// Resolved sensor id, rendered to a string key. Null, blank text, and
/// numeric zero are all rejected; a falsy candidate falls through to the
/// next alias.
pub fn sensor_id(row: &RawRow) -> Option<String> {
    for key in SENSOR_ID {
        match row.get(key) {
            Some(FieldValue::Text(s)) => {
                let t = s.trim();
                if !t.is_empty() {
                    return Some(t.to_string());
                }
            }
            Some(FieldValue::Int(v)) if *v != 0 => return Some(v.to_string()),
            Some(FieldValue::Float(v)) if *v != 0.0 && v.is_finite() => {
                return Some(v.to_string())
            }
            _ => {}
        }
    }
    None
}

pub fn latitude(row: &RawRow) -> Option<f64> {
    number(row, LATITUDE)
}

pub fn longitude(row: &RawRow) -> Option<f64> {
    number(row, LONGITUDE)
}

pub fn predicted(row: &RawRow) -> Option<f64> {
    number(row, PREDICTED)
}

pub fn observed(row: &RawRow) -> Option<f64> {
    number(row, OBSERVED)
}

pub fn forecast_offset(row: &RawRow) -> Option<f64> {
    number(row, FORECAST_OFFSET)
}

pub fn street(row: &RawRow) -> Option<&str> {
    first_text(row, STREET)
}

pub fn city(row: &RawRow) -> Option<&str> {
    first_text(row, CITY)
}

pub fn date(row: &RawRow) -> Option<&str> {
    first_text(row, DATE)
}
