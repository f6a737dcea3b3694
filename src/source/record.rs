//! Wire types returned by the measurement service.
//!
//! The listing endpoint is not consistent about field naming, so records are
//! kept as untyped JSON until [`crate::data::Measurement::normalize`] resolves
//! them. The verification payload has a stable shape and is typed directly.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One untyped record from `GET /measurements`.
///
/// Any JSON value is accepted; a non-object simply has no fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawRecord(Value);

impl RawRecord {
    /// Wrap a JSON value as a raw record.
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    /// Look up the first candidate key holding a non-null value.
    ///
    /// A missing key and an explicit `null` are both treated as absent.
    pub fn first_present(&self, keys: &[&str]) -> Option<&Value> {
        keys.iter().filter_map(|key| self.0.get(*key)).find(|value| !value.is_null())
    }

    /// Returns the underlying JSON value.
    pub fn as_value(&self) -> &Value {
        &self.0
    }
}

impl From<Value> for RawRecord {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

/// Response from `GET /measurements/{sensor_id}/verify`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VerifyResponse {
    /// Whether the sensor's latest stored reading matches its anchored hash.
    #[serde(default)]
    pub is_trusted: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sensor_id: Option<Value>,

    /// The value the service holds for the sensor.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub db_value: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,

    /// Human-readable verdict text supplied by the service.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verdict: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_first_present_prefers_earlier_key() {
        let record = RawRecord::new(json!({ "value": 1.0, "Value": 2.0 }));
        assert_eq!(record.first_present(&["value", "Value"]), Some(&json!(1.0)));
    }

    #[test]
    fn test_first_present_skips_null() {
        let record = RawRecord::new(json!({ "value": null, "Value": 2.0 }));
        assert_eq!(record.first_present(&["value", "Value"]), Some(&json!(2.0)));
    }

    #[test]
    fn test_first_present_non_object() {
        let record = RawRecord::new(json!(42));
        assert!(record.first_present(&["value", "Value"]).is_none());
    }

    #[test]
    fn test_deserialize_verify_response() {
        let json = r#"{
            "sensor_id": "sensor_kiev",
            "db_value": 21.5,
            "timestamp": "2024-05-01T10:00:00Z",
            "is_trusted": true,
            "verdict": "VALID"
        }"#;

        let response: VerifyResponse = serde_json::from_str(json).unwrap();
        assert!(response.is_trusted);
        assert_eq!(response.db_value, Some(21.5));
        assert_eq!(response.verdict.as_deref(), Some("VALID"));
    }

    #[test]
    fn test_verify_response_missing_flag_is_untrusted() {
        let response: VerifyResponse = serde_json::from_str("{}").unwrap();
        assert!(!response.is_trusted);
    }
}
