//! Common UI components shared across the screen.
//!
//! This module contains the header bar, status bar, and help overlay.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::App;
use crate::data::TrustVerdict;

/// Render the header bar.
///
/// Displays: source, latest reading, verification tallies, poll count and
/// time since the chart last changed.
pub fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let title = Span::styled(" ECO DASHBOARD ", Style::default().add_modifier(Modifier::BOLD));

    if app.view.frames == 0 {
        let line = Line::from(vec![
            title,
            Span::raw(format!("│ {} │ Loading...", app.source_description())),
        ]);
        frame.render_widget(Paragraph::new(line), area);
        return;
    }

    let latest = app
        .view
        .frame
        .latest()
        .map(|v| format!("{:.2}°C", v))
        .unwrap_or_else(|| "N/A".to_string());

    let rows = app.view.table.rows();
    let trusted = rows.iter().filter(|r| r.verdict == TrustVerdict::Trusted).count();
    let unverified = rows.iter().filter(|r| r.verdict == TrustVerdict::Unverified).count();

    let line = Line::from(vec![
        title,
        Span::raw(format!("│ {} │ latest ", app.source_description())),
        Span::styled(latest, Style::default().fg(app.theme.highlight).add_modifier(Modifier::BOLD)),
        Span::raw(" │ "),
        Span::styled(format!("{}", trusted), Style::default().fg(app.theme.trusted)),
        Span::raw(" trusted "),
        if unverified > 0 {
            Span::styled(
                format!("{}", unverified),
                Style::default().fg(app.theme.unverified).add_modifier(Modifier::BOLD),
            )
        } else {
            Span::styled("0", Style::default().add_modifier(Modifier::DIM))
        },
        Span::raw(" unverified │ "),
        Span::raw(format!("{} polls │ updated {}", app.view.polls, updated_ago(app))),
    ]);

    frame.render_widget(Paragraph::new(line), area);
}

fn updated_ago(app: &App) -> String {
    match app.view.last_updated {
        Some(updated) => format!("{}s ago", updated.elapsed().as_secs()),
        None => "never".to_string(),
    }
}

/// Render the status bar at the bottom.
///
/// Shows the last poll error or the time since the last update, followed
/// by the available controls. Temporary status messages take precedence.
pub fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    if let Some(msg) = app.get_status_message() {
        let paragraph =
            Paragraph::new(format!(" {} ", msg)).style(Style::default().fg(app.theme.highlight));
        frame.render_widget(paragraph, area);
        return;
    }

    let controls = "r:poll v:verify e:export ?:help q:quit";

    let (status, style) = match (&app.view.last_error, app.view.last_updated) {
        (Some(err), _) => (
            format!(" Last poll failed: {} | {}", err, controls),
            Style::default().fg(app.theme.unverified),
        ),
        (None, Some(updated)) => (
            format!(" Updated {:.1}s ago | {}", updated.elapsed().as_secs_f64(), controls),
            Style::default().add_modifier(Modifier::DIM),
        ),
        (None, None) => (
            format!(" Loading... | {}", controls),
            Style::default().add_modifier(Modifier::DIM),
        ),
    };

    frame.render_widget(Paragraph::new(status).style(style), area);
}

/// Render the help overlay with keyboard shortcuts.
///
/// Displayed as a centered modal on top of the dashboard.
pub fn render_help(frame: &mut Frame, app: &App, area: Rect) {
    let help_text = vec![
        Line::from(vec![Span::styled("Keyboard Shortcuts", app.theme.header)]),
        Line::from(""),
        Line::from("  r         Poll now"),
        Line::from("  v         Verify latest readings"),
        Line::from("  e         Export to JSON"),
        Line::from("  ?         Toggle help"),
        Line::from("  q / Esc   Quit"),
        Line::from(""),
        Line::from(vec![Span::styled(
            "Press any key to close",
            Style::default().add_modifier(Modifier::DIM),
        )]),
    ];

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.highlight));

    let paragraph = Paragraph::new(help_text).block(block);

    let help_width = 40u16.min(area.width.saturating_sub(4));
    let help_height = 11u16.min(area.height.saturating_sub(2));
    let x = area.x + (area.width.saturating_sub(help_width)) / 2;
    let y = area.y + (area.height.saturating_sub(help_height)) / 2;
    let help_area = Rect::new(x, y, help_width, help_height);

    frame.render_widget(ratatui::widgets::Clear, help_area);
    frame.render_widget(paragraph, help_area);
}
