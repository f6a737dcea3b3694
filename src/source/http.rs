//! HTTP client for the measurement service.
//!
//! ## Endpoints
//!
//! - `GET /measurements?t=<millis>`: newest-first array of raw records. The
//!   `t` parameter defeats intermediate caches.
//! - `GET /measurements/{sensor_id}/verify`: trust verdict for one sensor.
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use eco_dashboard::{HttpSource, MeasurementSource};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let source = HttpSource::builder()
//!         .endpoint("http://localhost:8080")
//!         .timeout(Duration::from_secs(5))
//!         .build()?;
//!
//!     let verdict = source.fetch_verdict("sensor_kiev").await?;
//!     println!("trusted: {}", verdict.is_trusted);
//!     Ok(())
//! }
//! ```

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};

use super::{MeasurementSource, RawRecord, SourceError, VerifyResponse};

/// Default service origin.
pub const DEFAULT_ENDPOINT: &str = "http://localhost:8080";

/// Measurement source backed by the service's JSON HTTP API.
#[derive(Debug, Clone)]
pub struct HttpSource {
    client: Client,
    endpoint: Url,
    description: String,
}

impl HttpSource {
    /// Create a new builder for configuring the source.
    pub fn builder() -> HttpSourceBuilder {
        HttpSourceBuilder::default()
    }

    /// Returns the base URL requests are made against.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    fn endpoint_url(&self, segments: &[&str]) -> Result<Url, SourceError> {
        let mut url = self.endpoint.clone();
        url.path_segments_mut()
            .map_err(|_| SourceError::InvalidEndpoint(self.endpoint.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn measurements_url(&self) -> Result<Url, SourceError> {
        self.endpoint_url(&["measurements"])
    }

    fn verify_url(&self, sensor_id: &str) -> Result<Url, SourceError> {
        self.endpoint_url(&["measurements", sensor_id, "verify"])
    }
}

#[async_trait]
impl MeasurementSource for HttpSource {
    async fn fetch_measurements(&self) -> Result<Vec<RawRecord>, SourceError> {
        let url = self.measurements_url()?;

        let response = self
            .client
            .get(url)
            .query(&[("t", cache_buster())])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(SourceError::Http(format!(
                "API returned status {}",
                response.status()
            )));
        }

        let body = response.bytes().await?;
        parse_measurements(&body)
    }

    async fn fetch_verdict(&self, sensor_id: &str) -> Result<VerifyResponse, SourceError> {
        let url = self.verify_url(sensor_id)?;

        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            return Err(SourceError::Http(format!(
                "Verification for '{}' returned status {}",
                sensor_id,
                response.status()
            )));
        }

        let verdict: VerifyResponse = response.json().await?;
        Ok(verdict)
    }

    fn description(&self) -> &str {
        &self.description
    }
}

/// Builder for [`HttpSource`].
#[derive(Debug, Default)]
pub struct HttpSourceBuilder {
    endpoint: Option<String>,
    timeout: Option<Duration>,
}

impl HttpSourceBuilder {
    /// Set the service origin (e.g., "http://localhost:8080").
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Set the per-request timeout (default: 10 seconds).
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Build the source.
    pub fn build(self) -> Result<HttpSource, SourceError> {
        let timeout = self.timeout.unwrap_or(Duration::from_secs(10));
        let raw = self.endpoint.unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());

        let endpoint =
            Url::parse(&raw).map_err(|e| SourceError::InvalidEndpoint(format!("{}: {}", raw, e)))?;
        if endpoint.cannot_be_a_base() {
            return Err(SourceError::InvalidEndpoint(raw));
        }

        let client = Client::builder().timeout(timeout).build()?;

        Ok(HttpSource {
            client,
            description: format!("http: {}", endpoint),
            endpoint,
        })
    }
}

/// Millisecond timestamp used as the cache-busting query parameter.
fn cache_buster() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Decode a measurement listing body.
///
/// Whitespace-only bodies and a JSON `null` both mean "no records".
fn parse_measurements(body: &[u8]) -> Result<Vec<RawRecord>, SourceError> {
    let body = body.trim_ascii();
    if body.is_empty() {
        return Ok(Vec::new());
    }

    let records: Option<Vec<RawRecord>> = serde_json::from_slice(body)?;
    Ok(records.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let source = HttpSource::builder().build().unwrap();
        assert_eq!(source.endpoint().as_str(), "http://localhost:8080/");
        assert_eq!(source.description(), "http: http://localhost:8080/");
    }

    #[test]
    fn test_builder_rejects_invalid_endpoint() {
        let err = HttpSource::builder().endpoint("not a url").build().unwrap_err();
        assert!(matches!(err, SourceError::InvalidEndpoint(_)));

        let err = HttpSource::builder().endpoint("mailto:ops@example.com").build().unwrap_err();
        assert!(matches!(err, SourceError::InvalidEndpoint(_)));
    }

    #[test]
    fn test_measurements_url() {
        let source = HttpSource::builder().endpoint("http://api:8080").build().unwrap();
        assert_eq!(source.measurements_url().unwrap().as_str(), "http://api:8080/measurements");
    }

    #[test]
    fn test_urls_keep_base_path() {
        let source = HttpSource::builder().endpoint("http://host/eco/").build().unwrap();
        assert_eq!(source.measurements_url().unwrap().as_str(), "http://host/eco/measurements");
    }

    #[test]
    fn test_verify_url_escapes_sensor_id() {
        let source = HttpSource::builder().build().unwrap();
        assert_eq!(
            source.verify_url("sensor_kiev").unwrap().as_str(),
            "http://localhost:8080/measurements/sensor_kiev/verify"
        );
        assert_eq!(
            source.verify_url("a/b c").unwrap().as_str(),
            "http://localhost:8080/measurements/a%2Fb%20c/verify"
        );
    }

    #[test]
    fn test_parse_empty_body() {
        assert!(parse_measurements(b"").unwrap().is_empty());
        assert!(parse_measurements(b"  \n").unwrap().is_empty());
        assert!(parse_measurements(b"null").unwrap().is_empty());
        assert!(parse_measurements(b"[]").unwrap().is_empty());
    }

    #[test]
    fn test_parse_records() {
        let body = br#"[{"sensor_id":"A","value":21.5},{"SensorID":"B","Value":19.0}]"#;
        let records = parse_measurements(body).unwrap();
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn test_parse_invalid_json() {
        let err = parse_measurements(b"<html>502</html>").unwrap_err();
        assert!(matches!(err, SourceError::Parse(_)));
    }
}
