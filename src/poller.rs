//! Periodic refresh of the measurement chart.
//!
//! [`Poller::run`] polls immediately and then on a fixed period. Each tick
//! is spawned as its own task, so a slow response never delays the timer and
//! two polls may be in flight at once; whichever applies last owns the
//! window. A failed poll is logged and leaves the chart as it was.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use clap::ValueEnum;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info};

use crate::data::{Measurement, SeriesWindow, WINDOW_CAPACITY};
use crate::source::{MeasurementSource, SourceError};
use crate::surface::ChartSurface;
use crate::verifier::{TrustVerifier, VerifySummary};

/// Default refresh period.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(5000);

/// When the trust verifier runs relative to polling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum VerifyMode {
    /// Verify every non-empty batch.
    #[default]
    EveryPoll,
    /// Verify only the first non-empty batch after startup.
    FirstBatch,
    /// Never verify automatically.
    Off,
}

/// Result of a single successful poll.
#[derive(Debug, Clone, PartialEq)]
pub enum PollOutcome {
    /// The chart was redrawn from this newest-first batch.
    Updated(Vec<Measurement>),
    /// The service returned nothing; the chart was left unchanged.
    Skipped,
}

/// Drives the refresh cycle.
pub struct Poller {
    source: Arc<dyn MeasurementSource>,
    chart: Arc<dyn ChartSurface>,
    window: Mutex<SeriesWindow>,
    interval: Duration,
    verifier: Option<TrustVerifier>,
    verify_mode: VerifyMode,
    first_batch_seen: AtomicBool,
}

impl Poller {
    pub fn new(
        source: Arc<dyn MeasurementSource>,
        chart: Arc<dyn ChartSurface>,
        interval: Duration,
    ) -> Self {
        Self {
            source,
            chart,
            window: Mutex::new(SeriesWindow::new()),
            interval,
            verifier: None,
            verify_mode: VerifyMode::Off,
            first_batch_seen: AtomicBool::new(false),
        }
    }

    /// Attach a trust verifier and choose when it runs.
    pub fn with_verifier(mut self, verifier: TrustVerifier, mode: VerifyMode) -> Self {
        self.verifier = Some(verifier);
        self.verify_mode = mode;
        self
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Fetch once, rebuild the window and redraw the chart.
    ///
    /// An empty response leaves the window and the plotted series untouched;
    /// the surface only learns that the poll succeeded.
    pub async fn poll_once(&self) -> Result<PollOutcome, SourceError> {
        let records = self.source.fetch_measurements().await?;
        self.chart.record_poll();
        if records.is_empty() {
            debug!("Empty measurement batch, keeping current chart");
            return Ok(PollOutcome::Skipped);
        }

        let batch = Measurement::normalize_all(&records);
        let frame = {
            let mut window = self.window.lock();
            window.replace(&batch);
            window.current()
        };
        debug!("Polled {} records, charting {}", batch.len(), frame.len());

        self.chart.set_series(frame);
        Ok(PollOutcome::Updated(batch))
    }

    /// One timer tick: poll, swallow failures, and start verification if
    /// the verify mode asks for it.
    ///
    /// Returns the handle of the verification pass this tick started.
    pub async fn tick(self: Arc<Self>) -> Option<JoinHandle<VerifySummary>> {
        match self.poll_once().await {
            Ok(PollOutcome::Updated(batch)) if self.should_verify() => {
                self.spawn_verification(batch)
            }
            Ok(_) => None,
            Err(e) => {
                error!("Poll of {} failed: {}", self.source.description(), e);
                self.chart.report_error(&e);
                None
            }
        }
    }

    /// Start a verification pass over `batch` in the background.
    ///
    /// Returns `None` when no verifier is attached.
    pub fn spawn_verification(&self, batch: Vec<Measurement>) -> Option<JoinHandle<VerifySummary>> {
        let verifier = self.verifier.clone()?;
        Some(tokio::spawn(async move { verifier.verify_batch(&batch).await }))
    }

    /// Verify whatever is currently charted.
    pub fn verify_latest(&self) -> Option<JoinHandle<VerifySummary>> {
        let batch = self.latest_batch();
        if batch.is_empty() {
            return None;
        }
        self.spawn_verification(batch)
    }

    /// The charted measurements, newest first.
    pub fn latest_batch(&self) -> Vec<Measurement> {
        self.window.lock().latest(WINDOW_CAPACITY)
    }

    fn should_verify(&self) -> bool {
        match self.verify_mode {
            VerifyMode::EveryPoll => true,
            VerifyMode::FirstBatch => !self.first_batch_seen.swap(true, Ordering::SeqCst),
            VerifyMode::Off => false,
        }
    }

    /// Poll now and then every `interval`, forever.
    pub async fn run(self: Arc<Self>) {
        info!(
            "Polling {} every {:?} (verify: {:?})",
            self.source.description(),
            self.interval,
            self.verify_mode
        );

        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            ticker.tick().await;
            tokio::spawn(self.clone().tick());
        }
    }

    /// Spawn [`Poller::run`] on the current runtime.
    pub fn spawn(self: Arc<Self>) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }
}

impl std::fmt::Debug for Poller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Poller")
            .field("source", &self.source)
            .field("interval", &self.interval)
            .field("verify_mode", &self.verify_mode)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::TrustVerdict;
    use crate::surface::DashboardState;
    use crate::testing::{MockSource, RecordingChart, RecordingTable, TableOp};
    use serde_json::{json, Value};

    fn records(n: usize) -> Vec<Value> {
        (0..n).map(|i| json!({ "sensor_id": format!("s{}", i), "value": i as f64 })).collect()
    }

    fn poller(source: &Arc<MockSource>, chart: &Arc<RecordingChart>) -> Poller {
        Poller::new(source.clone(), chart.clone(), DEFAULT_POLL_INTERVAL)
    }

    #[tokio::test]
    async fn test_poll_once_updates_chart() {
        let source = Arc::new(MockSource::new());
        let chart = Arc::new(RecordingChart::default());
        source.push_batch(records(3));

        let outcome = poller(&source, &chart).poll_once().await.unwrap();
        assert!(matches!(outcome, PollOutcome::Updated(ref b) if b.len() == 3));

        let frames = chart.frames.lock();
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].values, vec![Some(2.0), Some(1.0), Some(0.0)]);
    }

    #[tokio::test]
    async fn test_large_batch_is_windowed() {
        let source = Arc::new(MockSource::new());
        let chart = Arc::new(RecordingChart::default());
        source.push_batch(records(40));

        poller(&source, &chart).poll_once().await.unwrap();

        let frames = chart.frames.lock();
        assert_eq!(frames[0].len(), WINDOW_CAPACITY);
        assert_eq!(frames[0].values.last(), Some(&Some(0.0)));
        assert_eq!(frames[0].values.first(), Some(&Some(14.0)));
    }

    #[tokio::test]
    async fn test_empty_batch_leaves_state_unchanged() {
        let source = Arc::new(MockSource::new());
        let chart = Arc::new(RecordingChart::default());
        let poller = poller(&source, &chart);

        source.push_batch(records(4));
        poller.poll_once().await.unwrap();
        let before = poller.latest_batch();

        source.push_batch(Vec::new());
        let outcome = poller.poll_once().await.unwrap();

        assert_eq!(outcome, PollOutcome::Skipped);
        assert_eq!(poller.latest_batch(), before);
        assert_eq!(chart.frames.lock().len(), 1);
        assert_eq!(chart.polls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_empty_poll_after_failure_clears_error() {
        let source = Arc::new(MockSource::new());
        let state = DashboardState::new();
        let poller = Arc::new(Poller::new(source.clone(), Arc::new(state.clone()), DEFAULT_POLL_INTERVAL));

        source.push_batch(records(2));
        poller.clone().tick().await;
        source.push_error(SourceError::Timeout);
        poller.clone().tick().await;
        assert!(state.view().last_error.is_some());

        source.push_batch(Vec::new());
        poller.clone().tick().await;

        let view = state.view();
        assert!(view.last_error.is_none());
        assert_eq!(view.polls, 2);
        assert_eq!(view.frames, 1);
        assert_eq!(view.frame.len(), 2);
    }

    #[tokio::test]
    async fn test_failed_poll_is_swallowed() {
        let source = Arc::new(MockSource::new());
        let state = DashboardState::new();
        let poller = Arc::new(Poller::new(source.clone(), Arc::new(state.clone()), DEFAULT_POLL_INTERVAL));

        source.push_batch(records(2));
        poller.clone().tick().await;
        source.push_error(SourceError::Parse("expected value".to_string()));
        poller.clone().tick().await;

        let view = state.view();
        assert_eq!(view.frame.len(), 2);
        assert_eq!(view.frames, 1);
        assert!(view.last_error.unwrap().contains("expected value"));
    }

    #[tokio::test]
    async fn test_every_poll_verifies_each_batch() {
        let source = Arc::new(MockSource::new());
        let chart = Arc::new(RecordingChart::default());
        let table = Arc::new(RecordingTable::default());
        source.set_verdict("s0", true);
        let verifier = TrustVerifier::new(source.clone(), table.clone());
        let poller = Arc::new(poller(&source, &chart).with_verifier(verifier, VerifyMode::EveryPoll));

        source.push_batch(records(1));
        let summary = poller.clone().tick().await.unwrap().await.unwrap();
        assert_eq!(summary.trusted, 1);

        source.push_batch(records(1));
        assert!(poller.clone().tick().await.is_some());
        assert!(table.ops().contains(&TableOp::Update("s0".into(), TrustVerdict::Trusted)));
    }

    #[tokio::test]
    async fn test_first_batch_mode_verifies_once() {
        let source = Arc::new(MockSource::new());
        let chart = Arc::new(RecordingChart::default());
        let verifier = TrustVerifier::new(source.clone(), Arc::new(RecordingTable::default()));
        let poller = Arc::new(poller(&source, &chart).with_verifier(verifier, VerifyMode::FirstBatch));

        source.push_batch(Vec::new());
        assert!(poller.clone().tick().await.is_none());

        source.push_batch(records(2));
        assert!(poller.clone().tick().await.is_some());

        source.push_batch(records(2));
        assert!(poller.clone().tick().await.is_none());

        assert!(poller.verify_latest().is_some());
    }

    #[tokio::test]
    async fn test_off_mode_never_verifies() {
        let source = Arc::new(MockSource::new());
        let chart = Arc::new(RecordingChart::default());
        let verifier = TrustVerifier::new(source.clone(), Arc::new(RecordingTable::default()));
        let poller = Arc::new(poller(&source, &chart).with_verifier(verifier, VerifyMode::Off));

        source.push_batch(records(2));
        assert!(poller.clone().tick().await.is_none());
        assert!(source.verify_calls().is_empty());
    }

    #[tokio::test]
    async fn test_verify_latest_without_data() {
        let source = Arc::new(MockSource::new());
        let chart = Arc::new(RecordingChart::default());
        let verifier = TrustVerifier::new(source.clone(), Arc::new(RecordingTable::default()));
        let poller = poller(&source, &chart).with_verifier(verifier, VerifyMode::Off);

        assert!(poller.verify_latest().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_polls_immediately_then_on_interval() {
        let source = Arc::new(MockSource::new());
        let chart = Arc::new(RecordingChart::default());
        let handle = Arc::new(poller(&source, &chart)).spawn();

        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(source.fetch_count(), 1);

        tokio::time::sleep(DEFAULT_POLL_INTERVAL).await;
        assert_eq!(source.fetch_count(), 2);

        tokio::time::sleep(DEFAULT_POLL_INTERVAL).await;
        assert_eq!(source.fetch_count(), 3);

        handle.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_polls_overlap() {
        let source = Arc::new(MockSource::with_delay(Duration::from_millis(7000)));
        let chart = Arc::new(RecordingChart::default());
        let handle = Arc::new(poller(&source, &chart)).spawn();

        tokio::time::sleep(DEFAULT_POLL_INTERVAL + Duration::from_millis(10)).await;
        assert_eq!(source.fetch_count(), 2);
        assert!(chart.frames.lock().is_empty());

        handle.abort();
    }
}
