//! Presentation-free display helpers for map markers and detail views

use chrono::NaiveDate;

use crate::days::DayIndex;

/// PM2.5 bands used for marker coloring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AirQuality {
    Good,
    Moderate,
    UnhealthyForSensitive,
    Unhealthy,
    VeryUnhealthy,
}

impl AirQuality {
    pub fn from_value(value: f64) -> Self {
        if value <= 50.0 {
            AirQuality::Good
        } else if value <= 100.0 {
            AirQuality::Moderate
        } else if value <= 150.0 {
            AirQuality::UnhealthyForSensitive
        } else if value <= 200.0 {
            AirQuality::Unhealthy
        } else {
            AirQuality::VeryUnhealthy
        }
    }

    /// Marker fill color.
    pub fn color(self) -> &'static str {
        match self {
            AirQuality::Good => "#00e400",
            AirQuality::Moderate => "#ffff00",
            AirQuality::UnhealthyForSensitive => "#ff7e00",
            AirQuality::Unhealthy => "#ff0000",
            AirQuality::VeryUnhealthy => "#8f3f97",
        }
    }
}

/// Color for a marker whose value may be missing. Absent readings paint
/// as the lowest band so every sensor still gets a dot.
pub fn marker_color(value: Option<f64>) -> &'static str {
    AirQuality::from_value(value.unwrap_or(0.0)).color()
}

/// Fields already shown in the focus panel or meaningless in a table.
const HIDDEN_COLUMNS: &[&str] = &[
    "longitude",
    "latitude",
    "sensor_id",
    "city_y",
    "street",
    "country",
    "feed_url",
];

/// Columns for the per-sensor detail table: source order minus the
/// identification and position fields.
pub fn table_columns(headers: &[String]) -> Vec<String> {
    headers
        .iter()
        .filter(|h| !HIDDEN_COLUMNS.contains(&h.as_str()))
        .cloned()
        .collect()
}

/// Short human date, e.g. `Tue, Jan 2`.
pub fn format_date_label(date: NaiveDate) -> String {
    date.format("%a, %b %-d").to_string()
}

/// Label for a forecast-day selector entry. Days with a known calendar
/// date are labelled by it; undated days fall back to relative wording.
pub fn format_day_label(day: u32, index: &DayIndex) -> String {
    match index.date(day) {
        Some(date) if day == 0 => format!("Observed {}", format_date_label(date)),
        Some(date) => format!("Forecast {}", format_date_label(date)),
        None => match day {
            0 => "Today".to_string(),
            1 => "Tomorrow".to_string(),
            n => format!("Day {}", n),
        },
    }
}
