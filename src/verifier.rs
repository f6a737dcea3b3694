//! Trust verification of the most recent readings.
//!
//! A pass draws one row per recent measurement in the checking state, then
//! walks the rows in order, awaiting each sensor's verdict before requesting
//! the next. A failed request is logged and leaves its row checking; the
//! chain continues with the next row.
//!
//! Every pass gets a fresh [`PassId`]. Once a newer pass has redrawn the
//! table, verdicts still arriving for an older pass are dropped.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tracing::{debug, error, warn};

use crate::data::{Measurement, PassId, SeriesWindow, TrustRow, TrustVerdict};
use crate::source::MeasurementSource;
use crate::surface::TableSurface;

/// Number of rows drawn per verification pass.
pub const VERIFY_ROWS: usize = 5;

/// Outcome counts for one verification pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VerifySummary {
    pub drawn: usize,
    pub trusted: usize,
    pub unverified: usize,
    /// Requests that failed; those rows stay checking.
    pub failed: usize,
    /// Rows without a sensor id, never requested.
    pub skipped: usize,
}

/// Runs verification passes against a table surface.
///
/// Clones share the pass counter, so passes started from any clone are
/// ordered against each other.
#[derive(Clone)]
pub struct TrustVerifier {
    source: Arc<dyn MeasurementSource>,
    table: Arc<dyn TableSurface>,
    last_pass: Arc<AtomicU64>,
}

impl TrustVerifier {
    pub fn new(source: Arc<dyn MeasurementSource>, table: Arc<dyn TableSurface>) -> Self {
        Self {
            source,
            table,
            last_pass: Arc::new(AtomicU64::new(0)),
        }
    }

    fn next_pass(&self) -> PassId {
        self.last_pass.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Verify the newest readings of a newest-first batch.
    ///
    /// Rows from any previous pass are discarded. Passes started from
    /// different poll cycles are not serialized against each other, but only
    /// the newest pass can resolve the rows on screen. The summary counts
    /// the verdicts this pass received either way.
    pub async fn verify_batch(&self, batch: &[Measurement]) -> VerifySummary {
        let recent = SeriesWindow::from_batch(batch).latest(VERIFY_ROWS);
        let pass = self.next_pass();

        self.table.clear_rows();
        for measurement in &recent {
            self.table.insert_row(TrustRow::checking(measurement, pass));
        }

        let mut summary = VerifySummary {
            drawn: recent.len(),
            ..VerifySummary::default()
        };

        for measurement in &recent {
            let Some(sensor_id) = measurement.sensor_id() else {
                warn!("Skipping verification of a reading without a sensor id");
                summary.skipped += 1;
                continue;
            };

            match self.source.fetch_verdict(sensor_id.as_str()).await {
                Ok(response) => {
                    let verdict = TrustVerdict::from_flag(response.is_trusted);
                    debug!("Sensor {} verified: {}", sensor_id, verdict.label());
                    match verdict {
                        TrustVerdict::Trusted => summary.trusted += 1,
                        _ => summary.unverified += 1,
                    }
                    self.table.update_status(pass, sensor_id, verdict, response.verdict);
                }
                Err(e) => {
                    error!("Verification failed for sensor {}: {}", sensor_id, e);
                    summary.failed += 1;
                }
            }
        }

        summary
    }
}

impl std::fmt::Debug for TrustVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrustVerifier")
            .field("source", &self.source)
            .field("last_pass", &self.last_pass.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}
