//! Trust verification table rendering.
//!
//! One row per recently verified reading, newest first, with a status cell
//! that moves from "Checking..." to "Trusted" or "Unverified".

use ratatui::{
    layout::{Constraint, Rect},
    style::{Modifier, Style},
    widgets::{Block, Borders, Cell, Row, Table},
    Frame,
};

use crate::app::App;
use crate::data::TrustVerdict;

/// Render the verification table.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let table_model = &app.view.table;

    let header = Row::new(vec![
        Cell::from("Sensor"),
        Cell::from("Temperature"),
        Cell::from("Status"),
        Cell::from("Service verdict"),
    ])
    .height(1)
    .style(app.theme.header);

    let rows: Vec<Row> = table_model
        .rows()
        .iter()
        .map(|row| {
            let detail = row.detail.as_deref().map(str::trim).unwrap_or("-").to_string();
            Row::new(vec![
                Cell::from(row.sensor.clone()),
                Cell::from(row.temperature.clone()),
                Cell::from(row.verdict.label()).style(app.theme.verdict_style(row.verdict)),
                Cell::from(detail).style(Style::default().add_modifier(Modifier::DIM)),
            ])
        })
        .collect();

    let widths = [
        Constraint::Fill(2),
        Constraint::Fill(1),
        Constraint::Min(12),
        Constraint::Fill(3),
    ];

    let pending = table_model
        .rows()
        .iter()
        .filter(|r| r.verdict == TrustVerdict::Checking)
        .count();
    let title = if table_model.is_empty() {
        " Latest readings ".to_string()
    } else {
        format!(" Latest readings ({} checking) ", pending)
    };

    let table = Table::new(rows, widths).header(header).block(
        Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_type(app.theme.border_type)
            .border_style(Style::default().fg(app.theme.border)),
    );

    frame.render_widget(table, area);
}
