//! Trust verdicts and the verification table model.

use serde::Serialize;

use super::measurement::{Measurement, SensorId};

/// Verification state of one table row.
///
/// Rows start in [`TrustVerdict::Checking`] and move at most once to
/// `Trusted` or `Unverified`. A failed check leaves the row checking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TrustVerdict {
    #[default]
    Checking,
    Trusted,
    Unverified,
}

impl TrustVerdict {
    /// Verdict for a resolved check.
    pub fn from_flag(is_trusted: bool) -> Self {
        if is_trusted {
            TrustVerdict::Trusted
        } else {
            TrustVerdict::Unverified
        }
    }

    /// Returns the display label for this verdict.
    pub fn label(&self) -> &'static str {
        match self {
            TrustVerdict::Checking => "Checking...",
            TrustVerdict::Trusted => "Trusted",
            TrustVerdict::Unverified => "Unverified",
        }
    }

    pub fn is_resolved(&self) -> bool {
        !matches!(self, TrustVerdict::Checking)
    }
}

/// Identifies one verification pass; rows only accept verdicts from the
/// pass that drew them.
pub type PassId = u64;

/// One row of the verification table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrustRow {
    #[serde(skip)]
    pub pass: PassId,
    pub sensor_id: Option<SensorId>,
    pub sensor: String,
    pub temperature: String,
    pub verdict: TrustVerdict,
    /// Verdict text supplied by the service, once resolved.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl TrustRow {
    /// A row drawn by `pass`, awaiting its verdict.
    pub fn checking(measurement: &Measurement, pass: PassId) -> Self {
        Self {
            pass,
            sensor_id: measurement.sensor_id().cloned(),
            sensor: measurement.sensor_label(),
            temperature: measurement.temperature_label(),
            verdict: TrustVerdict::Checking,
            detail: None,
        }
    }
}

/// Rows drawn by the most recent verification pass, newest first.
///
/// Rows are addressed by pass and sensor id. When two rows of one pass share
/// an id, lookups hit the later row, so the earlier one can stay checking.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TrustTable {
    rows: Vec<TrustRow>,
}

impl TrustTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop every row from the previous pass.
    pub fn clear(&mut self) {
        self.rows.clear();
    }

    pub fn push(&mut self, row: TrustRow) {
        self.rows.push(row);
    }

    /// Resolve the row `pass` drew for `sensor_id`.
    ///
    /// Returns `false` if no row matches, which includes verdicts from a pass
    /// whose rows were already replaced, or if the matching row was already
    /// resolved; a resolved row never changes again.
    pub fn resolve(
        &mut self,
        pass: PassId,
        sensor_id: &SensorId,
        verdict: TrustVerdict,
        detail: Option<String>,
    ) -> bool {
        let Some(row) = self
            .rows
            .iter_mut()
            .rev()
            .find(|r| r.pass == pass && r.sensor_id.as_ref() == Some(sensor_id))
        else {
            return false;
        };

        if row.verdict.is_resolved() {
            return false;
        }

        row.verdict = verdict;
        row.detail = detail;
        true
    }

    pub fn rows(&self) -> &[TrustRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
