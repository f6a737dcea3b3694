//! Canonical measurements and record normalization.
//!
//! The service names fields either `sensor_id`/`value`/`created_at` or
//! `SensorID`/`Value`/`CreatedAt`. Each logical field has an ordered list of
//! candidate keys; the first present key wins. A field with no usable key is
//! absent (`None`), never an error.

use std::fmt;

use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::source::RawRecord;

/// Candidate keys for the sensor identifier, in priority order.
pub const SENSOR_ID_KEYS: &[&str] = &["sensor_id", "SensorID"];
/// Candidate keys for the temperature value, in priority order.
pub const VALUE_KEYS: &[&str] = &["value", "Value"];
/// Candidate keys for the creation timestamp, in priority order.
pub const CREATED_AT_KEYS: &[&str] = &["created_at", "CreatedAt"];

/// Label shown when a timestamp is absent or unparseable.
pub const MISSING_TIME_LABEL: &str = "--:--:--";
/// Label shown when a temperature is absent or non-numeric.
pub const MISSING_VALUE_LABEL: &str = "N/A";

/// Opaque sensor identifier.
///
/// The service may send a string or a number; both are kept as text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SensorId(String);

impl SensorId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(Self(s.clone())),
            // `17.0` is sensor "17"
            Value::Number(n) if n.is_f64() => n.as_f64().map(|f| Self(f.to_string())),
            Value::Number(n) => Some(Self(n.to_string())),
            other => {
                debug!("Ignoring non-scalar sensor id: {}", other);
                None
            }
        }
    }
}

impl fmt::Display for SensorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SensorId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// One normalized reading.
///
/// Fields are private: a measurement is an immutable snapshot of the record
/// it was built from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Measurement {
    sensor_id: Option<SensorId>,
    value: Option<f64>,
    created_at: Option<DateTime<Utc>>,
}

impl Measurement {
    pub fn new(
        sensor_id: Option<SensorId>,
        value: Option<f64>,
        created_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            sensor_id,
            value,
            created_at,
        }
    }

    /// Build a measurement from a raw record, tolerating either naming
    /// convention and missing fields.
    pub fn normalize(record: &RawRecord) -> Self {
        let sensor_id = record.first_present(SENSOR_ID_KEYS).and_then(SensorId::from_json);
        let value = record.first_present(VALUE_KEYS).and_then(Value::as_f64);
        let created_at = record.first_present(CREATED_AT_KEYS).and_then(parse_timestamp);

        Self {
            sensor_id,
            value,
            created_at,
        }
    }

    /// Normalize a whole batch, preserving order.
    pub fn normalize_all(records: &[RawRecord]) -> Vec<Self> {
        records.iter().map(Self::normalize).collect()
    }

    pub fn sensor_id(&self) -> Option<&SensorId> {
        self.sensor_id.as_ref()
    }

    pub fn value(&self) -> Option<f64> {
        self.value
    }

    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }

    /// Local time-of-day label used on the chart's x-axis.
    pub fn time_label(&self) -> String {
        self.created_at
            .map(|t| t.with_timezone(&Local).format("%H:%M:%S").to_string())
            .unwrap_or_else(|| MISSING_TIME_LABEL.to_string())
    }

    /// Temperature formatted to two decimals, e.g. "21.50°C".
    pub fn temperature_label(&self) -> String {
        self.value
            .map(|v| format!("{:.2}°C", v))
            .unwrap_or_else(|| MISSING_VALUE_LABEL.to_string())
    }

    /// Sensor identifier for display.
    pub fn sensor_label(&self) -> String {
        self.sensor_id
            .as_ref()
            .map(|id| id.to_string())
            .unwrap_or_else(|| MISSING_VALUE_LABEL.to_string())
    }
}

/// Parse an RFC 3339 string or an epoch-milliseconds number.
fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => DateTime::parse_from_rfc3339(s).ok().map(|t| t.with_timezone(&Utc)),
        Value::Number(n) => n.as_i64().and_then(DateTime::from_timestamp_millis),
        _ => None,
    }
}
