//! Temperature chart rendering.

use ratatui::{
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    symbols::Marker,
    text::Span,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, Paragraph},
    Frame,
};

use crate::app::App;
use crate::data::SeriesFrame;

/// Vertical headroom added above and below the plotted range, in °C.
const Y_PADDING: f64 = 1.0;

/// Render the series window as a line chart.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .title(" Temperature (°C) ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border));

    let series = &app.view.frame;
    let points = series.points();
    let Some((lo, hi)) = series.value_range() else {
        let placeholder = Paragraph::new("Waiting for measurements...")
            .alignment(Alignment::Center)
            .style(Style::default().add_modifier(Modifier::DIM))
            .block(block);
        frame.render_widget(placeholder, area);
        return;
    };

    let dataset = Dataset::default()
        .name("Temperature")
        .marker(Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(app.theme.series))
        .data(&points);

    let x_max = series.len().saturating_sub(1).max(1) as f64;
    let (y_min, y_max) = (lo - Y_PADDING, hi + Y_PADDING);

    let chart = Chart::new(vec![dataset])
        .block(block)
        .x_axis(
            Axis::default()
                .style(Style::default().fg(app.theme.border))
                .bounds([0.0, x_max])
                .labels(x_labels(series)),
        )
        .y_axis(
            Axis::default()
                .style(Style::default().fg(app.theme.border))
                .bounds([y_min, y_max])
                .labels(vec![
                    Span::raw(format!("{:.1}", y_min)),
                    Span::raw(format!("{:.1}", (y_min + y_max) / 2.0)),
                    Span::raw(format!("{:.1}", y_max)),
                ]),
        );

    frame.render_widget(chart, area);
}

/// First, middle and last time labels; fewer when the window is short.
fn x_labels(series: &SeriesFrame) -> Vec<Span<'static>> {
    let labels = &series.labels;
    let picks: Vec<usize> = match labels.len() {
        0 => Vec::new(),
        1 => vec![0],
        2 => vec![0, 1],
        n => vec![0, n / 2, n - 1],
    };
    picks.into_iter().map(|i| Span::raw(labels[i].clone())).collect()
}
