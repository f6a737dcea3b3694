//! Rolling window of recent measurements for the chart.
//!
//! The service returns records newest first. Each poll rebuilds the window
//! from scratch: the first [`WINDOW_CAPACITY`] records, reversed so the chart
//! reads oldest to newest. Nothing carries over between polls.

use serde::Serialize;

use super::measurement::Measurement;

/// Maximum number of measurements shown on the chart.
pub const WINDOW_CAPACITY: usize = 15;

/// Chart-ready view of the window.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SeriesFrame {
    /// Local time-of-day label per point.
    pub labels: Vec<String>,
    /// Temperature per point; `None` where the record had no usable value.
    pub values: Vec<Option<f64>>,
}

impl SeriesFrame {
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// `(index, value)` pairs for plotting, skipping missing values.
    pub fn points(&self) -> Vec<(f64, f64)> {
        self.values
            .iter()
            .enumerate()
            .filter_map(|(i, v)| v.map(|v| (i as f64, v)))
            .collect()
    }

    /// Min and max of the present values, if any.
    pub fn value_range(&self) -> Option<(f64, f64)> {
        self.values.iter().flatten().fold(None, |acc, &v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
    }

    /// Most recent value in the frame.
    pub fn latest(&self) -> Option<f64> {
        self.values.last().copied().flatten()
    }
}

/// The measurements currently on the chart, oldest first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeriesWindow {
    entries: Vec<Measurement>,
}

impl SeriesWindow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a window directly from a newest-first batch.
    pub fn from_batch(batch: &[Measurement]) -> Self {
        let mut window = Self::new();
        window.replace(batch);
        window
    }

    /// Replace the window with the head of a newest-first batch.
    pub fn replace(&mut self, batch: &[Measurement]) {
        self.entries = batch.iter().take(WINDOW_CAPACITY).rev().cloned().collect();
    }

    /// Labels and values for the chart, oldest first.
    pub fn current(&self) -> SeriesFrame {
        SeriesFrame {
            labels: self.entries.iter().map(Measurement::time_label).collect(),
            values: self.entries.iter().map(Measurement::value).collect(),
        }
    }

    /// The `n` most recent measurements, newest first.
    pub fn latest(&self, n: usize) -> Vec<Measurement> {
        let start = self.entries.len().saturating_sub(n);
        self.entries[start..].iter().rev().cloned().collect()
    }

    /// Entries in chart order (oldest first).
    pub fn entries(&self) -> &[Measurement] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::SensorId;
    use crate::source::RawRecord;
    use chrono::{Local, TimeZone, Utc};
    use serde_json::json;

    fn reading(id: usize) -> Measurement {
        Measurement::new(Some(SensorId::new(format!("s{}", id))), Some(id as f64), None)
    }

    /// Newest-first batch: s0 is the most recent.
    fn batch(n: usize) -> Vec<Measurement> {
        (0..n).map(reading).collect()
    }

    #[test]
    fn test_replace_keeps_first_fifteen_oldest_first() {
        let window = SeriesWindow::from_batch(&batch(40));
        assert_eq!(window.len(), WINDOW_CAPACITY);

        let frame = window.current();
        let expected: Vec<Option<f64>> = (0..15).rev().map(|i| Some(i as f64)).collect();
        assert_eq!(frame.values, expected);
    }

    #[test]
    fn test_replace_short_batch() {
        let window = SeriesWindow::from_batch(&batch(3));
        assert_eq!(window.current().values, vec![Some(2.0), Some(1.0), Some(0.0)]);
    }

    #[test]
    fn test_replace_discards_previous_window() {
        let mut window = SeriesWindow::from_batch(&batch(10));
        window.replace(&[reading(99)]);
        assert_eq!(window.current().values, vec![Some(99.0)]);
    }

    #[test]
    fn test_round_trip_single_record() {
        let t1 = Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap();
        let raw = RawRecord::new(json!({
            "sensor_id": "A",
            "value": 21.5,
            "created_at": "2024-05-01T10:00:00Z"
        }));

        let window = SeriesWindow::from_batch(&[Measurement::normalize(&raw)]);
        let frame = window.current();

        assert_eq!(frame.values, vec![Some(21.5)]);
        assert_eq!(frame.labels, vec![t1.with_timezone(&Local).format("%H:%M:%S").to_string()]);
    }

    #[test]
    fn test_latest_is_newest_first() {
        let window = SeriesWindow::from_batch(&batch(20));
        let ids: Vec<String> = window.latest(5).iter().map(Measurement::sensor_label).collect();
        assert_eq!(ids, vec!["s0", "s1", "s2", "s3", "s4"]);
    }

    #[test]
    fn test_latest_more_than_available() {
        let window = SeriesWindow::from_batch(&batch(2));
        assert_eq!(window.latest(5).len(), 2);
        assert!(SeriesWindow::new().latest(5).is_empty());
    }

    #[test]
    fn test_frame_points_skip_missing_values() {
        let frame = SeriesFrame {
            labels: vec!["a".into(), "b".into(), "c".into()],
            values: vec![Some(1.0), None, Some(3.0)],
        };
        assert_eq!(frame.points(), vec![(0.0, 1.0), (2.0, 3.0)]);
        assert_eq!(frame.value_range(), Some((1.0, 3.0)));
        assert_eq!(frame.latest(), Some(3.0));
    }
}
