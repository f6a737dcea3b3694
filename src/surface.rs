//! Render surfaces the pipeline writes to.
//!
//! The poller pushes chart frames into a [`ChartSurface`]; the trust
//! verifier draws and updates rows on a [`TableSurface`]. Two
//! implementations ship with the crate:
//!
//! - [`DashboardState`]: shared in-memory model the terminal UI draws from
//! - [`LogSurface`]: writes every update to the log (headless mode)

use std::sync::Arc;
use std::time::Instant;

use parking_lot::Mutex;
use serde::Serialize;
use tracing::{debug, info};

use crate::data::{PassId, SensorId, SeriesFrame, TrustRow, TrustTable, TrustVerdict};
use crate::source::SourceError;

/// Receives chart frames.
pub trait ChartSurface: Send + Sync {
    /// Replace the plotted series and redraw.
    fn set_series(&self, frame: SeriesFrame);

    /// A poll succeeded, whether or not it changed the chart.
    fn record_poll(&self) {}

    /// A poll failed; the current frame stays on screen.
    fn report_error(&self, _error: &SourceError) {}
}

/// Receives verification table updates.
pub trait TableSurface: Send + Sync {
    /// Remove all rows drawn by a previous pass.
    fn clear_rows(&self);

    /// Append a row (in checking state).
    fn insert_row(&self, row: TrustRow);

    /// Set the status cell of the row `pass` drew for `sensor_id`.
    ///
    /// Verdicts for rows a later pass has replaced are ignored.
    fn update_status(
        &self,
        pass: PassId,
        sensor_id: &SensorId,
        verdict: TrustVerdict,
        detail: Option<String>,
    );
}

/// Point-in-time copy of everything the dashboard displays.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DashboardView {
    pub frame: SeriesFrame,
    pub table: TrustTable,
    /// Number of frames rendered since startup.
    pub frames: u64,
    /// Number of successful polls, including those that returned nothing.
    pub polls: u64,
    #[serde(skip)]
    pub last_updated: Option<Instant>,
    #[serde(skip)]
    pub last_polled: Option<Instant>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
}

/// Shared dashboard model.
///
/// Cloning is cheap and every clone sees the same state, so one instance is
/// built at startup and handed to the poller, the verifier and the UI.
#[derive(Debug, Clone, Default)]
pub struct DashboardState {
    inner: Arc<Mutex<DashboardView>>,
}

impl DashboardState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of the current state for rendering or export.
    pub fn view(&self) -> DashboardView {
        self.inner.lock().clone()
    }
}

impl ChartSurface for DashboardState {
    fn set_series(&self, frame: SeriesFrame) {
        let mut view = self.inner.lock();
        view.frame = frame;
        view.frames += 1;
        view.last_updated = Some(Instant::now());
    }

    fn record_poll(&self) {
        let mut view = self.inner.lock();
        view.polls += 1;
        view.last_polled = Some(Instant::now());
        view.last_error = None;
    }

    fn report_error(&self, error: &SourceError) {
        self.inner.lock().last_error = Some(error.to_string());
    }
}

impl TableSurface for DashboardState {
    fn clear_rows(&self) {
        self.inner.lock().table.clear();
    }

    fn insert_row(&self, row: TrustRow) {
        self.inner.lock().table.push(row);
    }

    fn update_status(
        &self,
        pass: PassId,
        sensor_id: &SensorId,
        verdict: TrustVerdict,
        detail: Option<String>,
    ) {
        if !self.inner.lock().table.resolve(pass, sensor_id, verdict, detail) {
            debug!("Dropped verdict for sensor {} from pass {}", sensor_id, pass);
        }
    }
}

/// Surface that logs updates instead of drawing them.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSurface;

impl ChartSurface for LogSurface {
    fn set_series(&self, frame: SeriesFrame) {
        let span = match (frame.labels.first(), frame.labels.last()) {
            (Some(first), Some(last)) => format!("{} .. {}", first, last),
            _ => "-".to_string(),
        };
        let latest = frame
            .latest()
            .map(|v| format!("{:.2}°C", v))
            .unwrap_or_else(|| "N/A".to_string());
        info!(points = frame.len(), "Chart updated [{}], latest {}", span, latest);
    }
}

impl TableSurface for LogSurface {
    fn clear_rows(&self) {}

    fn insert_row(&self, row: TrustRow) {
        info!("{} {} {}", row.sensor, row.temperature, row.verdict.label());
    }

    fn update_status(
        &self,
        _pass: PassId,
        sensor_id: &SensorId,
        verdict: TrustVerdict,
        detail: Option<String>,
    ) {
        match detail {
            Some(detail) => info!("{} {} ({})", sensor_id, verdict.label(), detail.trim()),
            None => info!("{} {}", sensor_id, verdict.label()),
        }
    }
}
