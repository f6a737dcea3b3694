//! Application state for the terminal front end.

use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use tokio::runtime::Handle;

use crate::poller::Poller;
use crate::surface::{DashboardState, DashboardView};
use crate::ui::Theme;

/// How long a transient status message stays visible.
const STATUS_MESSAGE_TTL: Duration = Duration::from_secs(3);

/// Main application state.
pub struct App {
    pub running: bool,
    pub show_help: bool,

    // Pipeline
    state: DashboardState,
    poller: Arc<Poller>,
    runtime: Handle,
    description: String,

    /// Copy of the shared state taken at the start of each frame.
    pub view: DashboardView,

    // UI
    pub theme: Theme,

    // Status message (temporary feedback)
    pub status_message: Option<(String, Instant)>,
}

impl App {
    /// Create a new App reading from `state` and driving `poller` on `runtime`.
    pub fn new(
        state: DashboardState,
        poller: Arc<Poller>,
        runtime: Handle,
        description: impl Into<String>,
        theme: Theme,
    ) -> Self {
        Self {
            running: true,
            show_help: false,
            view: state.view(),
            state,
            poller,
            runtime,
            description: description.into(),
            theme,
            status_message: None,
        }
    }

    /// Returns a description of the measurement source.
    pub fn source_description(&self) -> &str {
        &self.description
    }

    /// Refresh the local copy of the dashboard state.
    pub fn refresh_view(&mut self) {
        self.view = self.state.view();
    }

    /// Set a temporary status message that will be shown for a few seconds.
    pub fn set_status_message(&mut self, message: String) {
        self.status_message = Some((message, Instant::now()));
    }

    /// Get the current status message if it hasn't expired.
    pub fn get_status_message(&self) -> Option<&str> {
        if let Some((msg, time)) = &self.status_message {
            if time.elapsed() < STATUS_MESSAGE_TTL {
                return Some(msg);
            }
        }
        None
    }

    /// Run one poll outside the timer.
    pub fn poll_now(&mut self) {
        self.runtime.spawn(self.poller.clone().tick());
        self.set_status_message("Polling...".to_string());
    }

    /// Start a verification pass over the charted readings.
    pub fn verify_now(&mut self) {
        let _guard = self.runtime.enter();
        let message = match self.poller.verify_latest() {
            Some(_) => "Verifying latest readings...",
            None => "Nothing to verify yet",
        };
        self.set_status_message(message.to_string());
    }

    /// Toggle the help overlay.
    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    /// Signal the application to quit.
    pub fn quit(&mut self) {
        self.running = false;
    }

    /// Export the current state to a file.
    pub fn export_state(&self, path: &Path) -> Result<()> {
        export_view(&self.state.view(), path)
    }
}

/// Write a dashboard view as pretty-printed JSON.
pub fn export_view(view: &DashboardView, path: &Path) -> Result<()> {
    if view.frames == 0 {
        anyhow::bail!("No data to export");
    }

    let export = serde_json::json!({
        "exported_at": chrono::Utc::now().to_rfc3339(),
        "frames": view.frames,
        "polls": view.polls,
        "chart": view.frame,
        "verification": view.table.rows(),
        "last_error": view.last_error,
    });

    let json = serde_json::to_string_pretty(&export)?;
    let mut file = std::fs::File::create(path)?;
    file.write_all(json.as_bytes())?;

    Ok(())
}
