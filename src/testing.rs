//! In-memory doubles for exercising the pipeline without a network.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use tokio::time::Instant;

use crate::data::{PassId, SensorId, SeriesFrame, TrustRow, TrustVerdict};
use crate::source::{MeasurementSource, RawRecord, SourceError, VerifyResponse};
use crate::surface::{ChartSurface, TableSurface};

/// One recorded verification request.
#[derive(Debug, Clone)]
pub(crate) struct VerifyCall {
    pub sensor_id: String,
    pub started: Instant,
    pub finished: Instant,
}

/// Scripted measurement source.
///
/// Listing calls pop queued responses (an empty batch once exhausted).
/// Verification calls answer from the verdict map; unknown sensors fail.
#[derive(Debug, Default)]
pub(crate) struct MockSource {
    batches: Mutex<VecDeque<Result<Vec<RawRecord>, SourceError>>>,
    verdicts: Mutex<HashMap<String, bool>>,
    delay: Duration,
    fetches: AtomicUsize,
    calls: Mutex<Vec<VerifyCall>>,
}

impl MockSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call sleeps for `delay` before answering.
    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay,
            ..Self::default()
        }
    }

    pub fn push_batch(&self, records: Vec<Value>) {
        self.batches.lock().push_back(Ok(records.into_iter().map(RawRecord::new).collect()));
    }

    pub fn push_error(&self, error: SourceError) {
        self.batches.lock().push_back(Err(error));
    }

    pub fn set_verdict(&self, sensor_id: &str, is_trusted: bool) {
        self.verdicts.lock().insert(sensor_id.to_string(), is_trusted);
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    pub fn verify_calls(&self) -> Vec<VerifyCall> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl MeasurementSource for MockSource {
    async fn fetch_measurements(&self) -> Result<Vec<RawRecord>, SourceError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        self.batches.lock().pop_front().unwrap_or_else(|| Ok(Vec::new()))
    }

    async fn fetch_verdict(&self, sensor_id: &str) -> Result<VerifyResponse, SourceError> {
        let started = Instant::now();
        tokio::time::sleep(self.delay).await;
        self.calls.lock().push(VerifyCall {
            sensor_id: sensor_id.to_string(),
            started,
            finished: Instant::now(),
        });

        match self.verdicts.lock().get(sensor_id) {
            Some(&is_trusted) => Ok(VerifyResponse {
                is_trusted,
                ..VerifyResponse::default()
            }),
            None => Err(SourceError::Connection("connection refused".to_string())),
        }
    }

    fn description(&self) -> &str {
        "mock"
    }
}

/// Chart surface that keeps every frame it receives.
#[derive(Debug, Default)]
pub(crate) struct RecordingChart {
    pub frames: Mutex<Vec<SeriesFrame>>,
    pub polls: AtomicUsize,
    pub errors: AtomicUsize,
}

impl ChartSurface for RecordingChart {
    fn set_series(&self, frame: SeriesFrame) {
        self.frames.lock().push(frame);
    }

    fn record_poll(&self) {
        self.polls.fetch_add(1, Ordering::SeqCst);
    }

    fn report_error(&self, _error: &SourceError) {
        self.errors.fetch_add(1, Ordering::SeqCst);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum TableOp {
    Clear,
    Insert(String, TrustVerdict),
    Update(String, TrustVerdict),
}

/// Table surface that logs every operation in order.
#[derive(Debug, Default)]
pub(crate) struct RecordingTable {
    pub ops: Mutex<Vec<TableOp>>,
}

impl RecordingTable {
    pub fn ops(&self) -> Vec<TableOp> {
        self.ops.lock().clone()
    }
}

impl TableSurface for RecordingTable {
    fn clear_rows(&self) {
        self.ops.lock().push(TableOp::Clear);
    }

    fn insert_row(&self, row: TrustRow) {
        self.ops.lock().push(TableOp::Insert(row.sensor, row.verdict));
    }

    fn update_status(
        &self,
        _pass: PassId,
        sensor_id: &SensorId,
        verdict: TrustVerdict,
        _detail: Option<String>,
    ) {
        self.ops.lock().push(TableOp::Update(sensor_id.to_string(), verdict));
    }
}
