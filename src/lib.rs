//! # eco-dashboard
//!
//! A live terminal dashboard for a remote temperature measurement service.
//!
//! The dashboard polls the service on a fixed period, charts the most recent
//! readings and, independently of the chart refresh, asks the service whether
//! each of the newest readings can be trusted.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │  ┌─────────┐   ┌────────────┐   ┌──────────────┐   ┌───────────┐ │
//! │  │ source  │──▶│   poller   │──▶│ SeriesWindow │──▶│ChartSurface│ │
//! │  │ (HTTP)  │   │ (interval) │   └──────────────┘   └───────────┘ │
//! │  └────┬────┘   └─────┬──────┘                                    │
//! │       │              │ newest-first batch                        │
//! │       │              ▼                                           │
//! │       │        ┌────────────┐                     ┌───────────┐  │
//! │       └───────▶│  verifier  │────────────────────▶│TableSurface│ │
//! │   per-sensor   │(sequential)│                     └───────────┘  │
//! │    verdict     └────────────┘                                    │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! - **[`source`]**: [`MeasurementSource`] trait and the reqwest-backed
//!   [`HttpSource`]
//! - **[`data`]**: [`Measurement`] normalization, the [`SeriesWindow`], and
//!   trust verdicts
//! - **[`poller`]**: the refresh cycle
//! - **[`verifier`]**: sequential per-sensor trust checks
//! - **[`surface`]**: render targets, including the shared [`DashboardState`]
//! - **[`ui`]**: terminal rendering using ratatui
//!
//! ## Usage
//!
//! ```bash
//! # Terminal UI against a local service
//! eco-dashboard --endpoint http://localhost:8080
//!
//! # Log-only mode, verifying only the first batch
//! eco-dashboard --headless --verify first-batch
//! ```
//!
//! ### As a library
//!
//! ```no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use eco_dashboard::{DashboardState, HttpSource, Poller, TrustVerifier, VerifyMode};
//!
//! # tokio_test::block_on(async {
//! let source = Arc::new(HttpSource::builder().endpoint("http://localhost:8080").build()?);
//! let state = DashboardState::new();
//!
//! let verifier = TrustVerifier::new(source.clone(), Arc::new(state.clone()));
//! let poller = Arc::new(
//!     Poller::new(source, Arc::new(state.clone()), Duration::from_secs(5))
//!         .with_verifier(verifier, VerifyMode::EveryPoll),
//! );
//!
//! poller.poll_once().await?;
//! println!("{:?}", state.view().frame);
//! # Ok::<(), eco_dashboard::SourceError>(())
//! # });
//! ```

pub mod app;
pub mod config;
pub mod data;
pub mod events;
pub mod poller;
pub mod source;
pub mod surface;
pub mod ui;
pub mod verifier;

#[cfg(test)]
pub(crate) mod testing;

// Re-export main types for convenience
pub use config::DashboardConfig;
pub use data::{
    Measurement, PassId, SensorId, SeriesFrame, SeriesWindow, TrustRow, TrustTable,
    TrustVerdict,
};
pub use poller::{PollOutcome, Poller, VerifyMode};
pub use source::{HttpSource, MeasurementSource, RawRecord, SourceError, VerifyResponse};
pub use surface::{ChartSurface, DashboardState, DashboardView, LogSurface, TableSurface};
pub use verifier::{TrustVerifier, VerifySummary};
