use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::Event,
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Layout},
    Terminal,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

use eco_dashboard::app::{export_view, App};
use eco_dashboard::ui::{self, Theme};
use eco_dashboard::{
    events, DashboardConfig, DashboardState, HttpSource, LogSurface, MeasurementSource,
    PollOutcome, Poller, TrustVerifier, VerifyMode,
};

#[derive(Parser, Debug)]
#[command(name = "eco-dashboard")]
#[command(about = "Live terminal dashboard for polled temperature measurements")]
struct Args {
    /// Path to a TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Measurement service origin (e.g., "http://localhost:8080")
    #[arg(long)]
    endpoint: Option<String>,

    /// Refresh interval in milliseconds
    #[arg(short, long)]
    interval: Option<u64>,

    /// When to run trust verification
    #[arg(long, value_enum)]
    verify: Option<VerifyMode>,

    /// Run without the terminal UI, logging every update to stderr
    #[arg(long)]
    headless: bool,

    /// Poll and verify once, write the result to this JSON file and exit
    #[arg(short, long, conflicts_with = "headless")]
    export: Option<PathBuf>,

    /// Log file used while the terminal UI is active
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Log level filter (overridden by RUST_LOG)
    #[arg(long)]
    log_level: Option<String>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let config = load_config(&args)?;

    let headless = args.headless || args.export.is_some();
    init_logging(&config, headless)?;

    let runtime = tokio::runtime::Runtime::new()?;

    let source = HttpSource::builder()
        .endpoint(config.endpoint.clone())
        .timeout(config.request_timeout())
        .build()
        .context("Failed to create measurement client")?;
    let source: Arc<dyn MeasurementSource> = Arc::new(source);

    if let Some(ref export_path) = args.export {
        return runtime.block_on(export_once(source, export_path));
    }

    if headless {
        return runtime.block_on(run_headless(source, &config));
    }

    run_tui(&runtime, source, &config)
}

/// Merge the config file and environment with command-line overrides.
fn load_config(args: &Args) -> Result<DashboardConfig> {
    let mut config = DashboardConfig::load(args.config.as_deref())?;

    if let Some(ref endpoint) = args.endpoint {
        config.endpoint = endpoint.clone();
    }
    if let Some(interval) = args.interval {
        config.poll_interval_ms = interval;
    }
    if let Some(verify) = args.verify {
        config.verify = verify;
    }
    if let Some(ref log_file) = args.log_file {
        config.log_file = log_file.clone();
    }
    if let Some(ref log_level) = args.log_level {
        config.log_level = log_level.clone();
    }

    config.validate()?;
    Ok(config)
}

/// Route tracing output to stderr (headless) or the log file (TUI).
fn init_logging(config: &DashboardConfig, headless: bool) -> Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let result = if headless {
        tracing_subscriber::fmt().with_env_filter(filter).with_writer(io::stderr).try_init()
    } else {
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&config.log_file)
            .with_context(|| format!("Failed to open log file {}", config.log_file.display()))?;
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(false)
            .with_writer(std::sync::Mutex::new(file))
            .try_init()
    };

    result.map_err(|e| anyhow::anyhow!("Failed to initialise logging: {}", e))
}

/// Run the pipeline with log output only, until Ctrl-C.
async fn run_headless(source: Arc<dyn MeasurementSource>, config: &DashboardConfig) -> Result<()> {
    let verifier = TrustVerifier::new(source.clone(), Arc::new(LogSurface));
    let poller = Arc::new(
        Poller::new(source, Arc::new(LogSurface), config.poll_interval())
            .with_verifier(verifier, config.verify),
    );

    let handle = poller.spawn();
    tokio::signal::ctrl_c().await?;
    info!("Shutting down");
    handle.abort();

    Ok(())
}

/// Poll once, verify the batch to completion and export the result.
async fn export_once(source: Arc<dyn MeasurementSource>, path: &Path) -> Result<()> {
    let state = DashboardState::new();
    let verifier = TrustVerifier::new(source.clone(), Arc::new(state.clone()));
    let poller = Poller::new(source, Arc::new(state.clone()), Duration::ZERO);

    match poller.poll_once().await? {
        PollOutcome::Updated(batch) => {
            let summary = verifier.verify_batch(&batch).await;
            info!("Verified {} readings: {:?}", summary.drawn, summary);
        }
        PollOutcome::Skipped => anyhow::bail!("The service returned no measurements"),
    }

    export_view(&state.view(), path)?;
    println!("Exported dashboard state to: {}", path.display());
    Ok(())
}

/// Run the terminal UI while the pipeline runs on the runtime's workers.
fn run_tui(
    runtime: &tokio::runtime::Runtime,
    source: Arc<dyn MeasurementSource>,
    config: &DashboardConfig,
) -> Result<()> {
    let state = DashboardState::new();
    let description = source.description().to_string();
    let verifier = TrustVerifier::new(source.clone(), Arc::new(state.clone()));
    let poller = Arc::new(
        Poller::new(source, Arc::new(state.clone()), config.poll_interval())
            .with_verifier(verifier, config.verify),
    );
    let poll_handle = runtime.spawn(poller.clone().run());

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Setup panic hook to restore terminal
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic);
    }));

    let mut app = App::new(state, poller, runtime.handle().clone(), description, Theme::auto_detect());

    let result = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    poll_handle.abort();
    result
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
    // Minimum terminal size for usable display
    const MIN_WIDTH: u16 = 60;
    const MIN_HEIGHT: u16 = 18;

    while app.running {
        app.refresh_view();

        terminal.draw(|frame| {
            let area = frame.area();

            if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
                let msg = format!(
                    "Terminal too small: {}x{}\nMinimum: {}x{}\n\nResize to continue",
                    area.width, area.height, MIN_WIDTH, MIN_HEIGHT
                );
                let paragraph = ratatui::widgets::Paragraph::new(msg)
                    .alignment(ratatui::layout::Alignment::Center)
                    .style(ratatui::style::Style::default().fg(ratatui::style::Color::Yellow));
                let centered = ratatui::layout::Rect::new(0, (area.height / 2).saturating_sub(2), area.width, 5.min(area.height));
                frame.render_widget(paragraph, centered);
                return;
            }

            let chunks = Layout::vertical([
                Constraint::Length(1), // Header bar
                Constraint::Min(8),    // Chart
                Constraint::Length(9), // Verification table (5 rows + header + borders)
                Constraint::Length(1), // Status bar
            ])
            .split(area);

            ui::common::render_header(frame, app, chunks[0]);
            ui::chart::render(frame, app, chunks[1]);
            ui::table::render(frame, app, chunks[2]);
            ui::common::render_status_bar(frame, app, chunks[3]);

            if app.show_help {
                ui::common::render_help(frame, app, area);
            }
        })?;

        if let Some(Event::Key(key)) = events::poll_event(Duration::from_millis(100))? {
            events::handle_key_event(app, key);
        }
    }

    Ok(())
}
