//! Forecast day index and per-day value resolution

use std::collections::BTreeMap;

use chrono::{Days, NaiveDate, Utc};

use crate::alias;
use crate::row::RawRow;
use crate::store::SensorRecord;

const ISO_DATE: &str = "%Y-%m-%d";

/// Day-offset -> calendar date.
///
/// Day 0 is the observed day; days >= 1 are forecast horizons actually
/// present in the row set, so the mapping may be sparse.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DayIndex {
    days: BTreeMap<u32, NaiveDate>,
}

impl DayIndex {
    /// Derive from a row set, falling back to the current UTC date when
    /// no row carries both a date and a finite observed value.
    pub fn derive(rows: &[RawRow]) -> Self {
        Self::derive_from(rows, Utc::now().date_naive())
    }

    /// Deterministic derivation against an explicit "today".
    ///
    /// Day 0 is the latest date among rows with a finite observed value;
    /// each forecast offset maps to base date + offset days, first
    /// occurrence wins.
    pub fn derive_from(rows: &[RawRow], today: NaiveDate) -> Self {
        let mut observed: Vec<&str> = rows
            .iter()
            .filter(|row| alias::observed(row).is_some_and(f64::is_finite))
            .filter_map(alias::date)
            .filter(|d| NaiveDate::parse_from_str(d, ISO_DATE).is_ok())
            .collect();
        observed.sort_unstable();

        let base = observed
            .last()
            .and_then(|d| NaiveDate::parse_from_str(d, ISO_DATE).ok())
            .unwrap_or(today);

        let mut days = BTreeMap::new();
        days.insert(0, base);

        for row in rows {
            if alias::date(row).is_none() {
                continue;
            }
            let Some(offset) = alias::forecast_offset(row) else {
                continue;
            };
            if !offset.is_finite() || offset < 1.0 || offset.fract() != 0.0 {
                continue;
            }
            let offset = offset as u32;
            if days.contains_key(&offset) {
                continue;
            }
            if let Some(date) = base.checked_add_days(Days::new(u64::from(offset))) {
                days.insert(offset, date);
            }
        }

        Self { days }
    }

    pub fn date(&self, day: u32) -> Option<NaiveDate> {
        self.days.get(&day).copied()
    }

    /// ISO `YYYY-MM-DD` rendering for a day offset.
    pub fn iso(&self, day: u32) -> Option<String> {
        self.date(day).map(|d| d.format(ISO_DATE).to_string())
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, NaiveDate)> + '_ {
        self.days.iter().map(|(day, date)| (*day, *date))
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }
}

/// Resolve the single display value for a sensor and day offset.
///
/// Day 0 reads the measured `pm25` on the first row dated to day 0;
/// later days read the predicted value on the first row carrying that
/// offset. Absence of a match or an unparseable number is `None`.
pub fn resolve_value(record: &SensorRecord, day: u32, index: &DayIndex) -> Option<f64> {
    if record.rows.is_empty() {
        return None;
    }

    let row = if day == 0 {
        let target = index.iso(0)?;
        record
            .rows
            .iter()
            .find(|row| alias::date(row) == Some(target.as_str()))
    } else {
        record
            .rows
            .iter()
            .find(|row| alias::forecast_offset(row) == Some(f64::from(day)))
    }?;

    let value = if day == 0 {
        alias::observed(row)
    } else {
        alias::predicted(row)
    }?;
    value.is_finite().then_some(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observer::NullObserver;
    use crate::store::SensorStore;

    fn row(pairs: &[(&str, &str)]) -> RawRow {
        pairs.iter().copied().collect()
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, ISO_DATE).unwrap()
    }

    #[test]
    fn test_day_zero_is_latest_observed_date() {
        let rows = vec![
            row(&[("date", "2024-01-01"), ("pm25", "5")]),
            row(&[("date", "2024-01-02"), ("pm25", "6")]),
        ];
        let index = DayIndex::derive_from(&rows, date("2020-06-15"));
        assert_eq!(index.iso(0).as_deref(), Some("2024-01-02"));
    }

    #[test]
    fn test_day_zero_falls_back_to_today() {
        // Forecast-only rows have no finite observed value.
        let rows = vec![row(&[
            ("date", "2024-01-05"),
            ("predicted_pm25", "9"),
            ("days_before_forecast_day", "1"),
        ])];
        let index = DayIndex::derive_from(&rows, date("2024-01-04"));
        assert_eq!(index.iso(0).as_deref(), Some("2024-01-04"));
        assert_eq!(index.iso(1).as_deref(), Some("2024-01-05"));
    }

    #[test]
    fn test_offsets_add_to_base_date() {
        let rows = vec![row(&[
            ("date", "2024-01-02"),
            ("pm25", "6"),
            ("days_before_forecast_day", "2"),
        ])];
        let index = DayIndex::derive_from(&rows, date("2020-06-15"));
        assert_eq!(index.iso(0).as_deref(), Some("2024-01-02"));
        assert_eq!(index.iso(2).as_deref(), Some("2024-01-04"));
    }

    #[test]
    fn test_offset_first_occurrence_wins_and_index_is_sparse() {
        let rows = vec![
            row(&[("date", "2024-01-02"), ("pm25", "6")]),
            row(&[("date", "2024-01-05"), ("days_before_forecast_day", "3")]),
            row(&[("date", "2024-01-09"), ("days_before_forecast_day", "3")]),
        ];
        let index = DayIndex::derive_from(&rows, date("2020-06-15"));
        assert_eq!(index.iso(3).as_deref(), Some("2024-01-05"));
        assert_eq!(index.date(1), None);
        assert_eq!(index.date(2), None);
        assert_eq!(index.len(), 2);
    }

    #[test]
    fn test_bad_offsets_are_ignored() {
        let rows = vec![
            row(&[("date", "2024-01-02"), ("pm25", "6")]),
            // Month boundary roll-over.
            row(&[("date", "x"), ("days_before_forecast_day", "30")]),
            row(&[("date", "x"), ("days_before_forecast_day", "2.5")]),
            row(&[("date", "x"), ("days_before_forecast_day", "0")]),
            row(&[("date", "x"), ("days_before_forecast_day", "-1")]),
            row(&[("date", ""), ("days_before_forecast_day", "4")]),
            row(&[("days_before_forecast_day", "5")]),
        ];
        let index = DayIndex::derive_from(&rows, date("2020-06-15"));
        assert_eq!(index.iso(30).as_deref(), Some("2024-02-01"));
        assert_eq!(index.len(), 2);
    }

    fn loaded_record(rows: Vec<RawRow>) -> SensorStore {
        let mut store = SensorStore::new();
        for mut r in rows {
            r.insert("sensor_id", "s1");
            r.insert("latitude", "57.7");
            r.insert("longitude", "11.97");
            store.ingest(r, &mut NullObserver);
        }
        store
    }

    #[test]
    fn test_resolve_day_zero_reads_observed_field() {
        let store = loaded_record(vec![row(&[
            ("date", "2024-01-02"),
            ("pm25", "12.3"),
            ("predicted_pm25", "99"),
        ])]);
        let rows = vec![row(&[("date", "2024-01-02"), ("pm25", "12.3")])];
        let index = DayIndex::derive_from(&rows, date("2020-06-15"));

        let record = store.get("s1").unwrap();
        assert_eq!(resolve_value(record, 0, &index), Some(12.3));
    }

    #[test]
    fn test_resolve_day_zero_unparseable_value_is_none() {
        let store = loaded_record(vec![row(&[("date", "2024-01-02"), ("pm25", "n/a")])]);
        let rows = vec![row(&[("date", "2024-01-02"), ("pm25", "1")])];
        let index = DayIndex::derive_from(&rows, date("2020-06-15"));

        let record = store.get("s1").unwrap();
        assert_eq!(resolve_value(record, 0, &index), None);
    }

    #[test]
    fn test_resolve_forecast_day_reads_predicted_field() {
        let store = loaded_record(vec![
            row(&[("date", "2024-01-02"), ("pm25", "12.3")]),
            row(&[
                ("date", "2024-01-04"),
                ("days_before_forecast_day", "2"),
                ("predicted_pm25", "17.5"),
                ("pm25", "99"),
            ]),
        ]);
        let rows = vec![row(&[("date", "2024-01-02"), ("pm25", "12.3")])];
        let index = DayIndex::derive_from(&rows, date("2020-06-15"));

        let record = store.get("s1").unwrap();
        assert_eq!(resolve_value(record, 2, &index), Some(17.5));
    }

    #[test]
    fn test_resolve_missing_day_is_none() {
        let store = loaded_record(vec![row(&[("date", "2024-01-02"), ("pm25", "12.3")])]);
        let rows = vec![row(&[("date", "2024-01-02"), ("pm25", "12.3")])];
        let index = DayIndex::derive_from(&rows, date("2020-06-15"));

        let record = store.get("s1").unwrap();
        assert_eq!(resolve_value(record, 3, &index), None);
    }

    #[test]
    fn test_resolve_empty_record_is_none() {
        let record = SensorRecord {
            sensor_id: "s1".into(),
            lat: 57.7,
            lon: 11.97,
            street: String::new(),
            city: String::new(),
            latest_value: None,
            rows: Vec::new(),
        };
        assert_eq!(resolve_value(&record, 0, &DayIndex::default()), None);
    }

    #[test]
    fn test_resolve_first_matching_row_wins() {
        let store = loaded_record(vec![
            row(&[("days_before_forecast_day", "1"), ("predicted_pm25", "10")]),
            row(&[("days_before_forecast_day", "1"), ("predicted_pm25", "20")]),
        ]);
        let index = DayIndex::derive_from(&[], date("2024-01-01"));

        let record = store.get("s1").unwrap();
        assert_eq!(resolve_value(record, 1, &index), Some(10.0));
    }
}
