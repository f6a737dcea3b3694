//! Remote measurement service abstraction.
//!
//! The dashboard reads from two endpoints: the measurement listing and the
//! per-sensor verification check. [`MeasurementSource`] hides the transport
//! so the poller and verifier can be driven by an in-memory source in tests.

mod error;
mod http;
mod record;

pub use error::SourceError;
pub use http::{HttpSource, HttpSourceBuilder, DEFAULT_ENDPOINT};
pub use record::{RawRecord, VerifyResponse};

use std::fmt::Debug;

use async_trait::async_trait;

/// Trait for reading measurements and trust verdicts from a remote service.
///
/// # Example
///
/// ```no_run
/// use eco_dashboard::{HttpSource, MeasurementSource};
///
/// # tokio_test::block_on(async {
/// let source = HttpSource::builder().endpoint("http://localhost:8080").build()?;
/// let records = source.fetch_measurements().await?;
/// println!("Got {} records", records.len());
/// # Ok::<(), eco_dashboard::SourceError>(())
/// # });
/// ```
#[async_trait]
pub trait MeasurementSource: Send + Sync + Debug {
    /// Fetch the latest measurement records, newest first.
    ///
    /// An empty or absent body yields an empty vector, not an error.
    async fn fetch_measurements(&self) -> Result<Vec<RawRecord>, SourceError>;

    /// Fetch the trust verdict for one sensor.
    async fn fetch_verdict(&self, sensor_id: &str) -> Result<VerifyResponse, SourceError>;

    /// Returns a human-readable description of the source.
    ///
    /// Used for display in the TUI header.
    fn description(&self) -> &str;
}
