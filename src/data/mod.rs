//! Data models for the measurement pipeline.
//!
//! ## Submodules
//!
//! - [`measurement`]: Canonical [`Measurement`] and the record normalizer
//! - [`window`]: The poll-replaced [`SeriesWindow`] feeding the chart
//! - [`verdict`]: [`TrustVerdict`] and the verification [`TrustTable`]
//!
//! ## Data Flow
//!
//! ```text
//! Vec<RawRecord> (newest first)
//!        │
//!        ▼
//! Measurement::normalize_all()
//!        │
//!        ├──▶ SeriesWindow::replace() ──▶ SeriesFrame (chart)
//!        │
//!        └──▶ SeriesWindow::latest(5) ──▶ TrustRow (table)
//! ```

pub mod measurement;
pub mod verdict;
pub mod window;

pub use measurement::{Measurement, SensorId};
pub use verdict::{PassId, TrustRow, TrustTable, TrustVerdict};
pub use window::{SeriesFrame, SeriesWindow, WINDOW_CAPACITY};
