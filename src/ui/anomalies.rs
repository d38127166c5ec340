//! Anomaly log view rendering.
//!
//! Lists logged anomalies newest first, with a one-line tally above the
//! table.

use chrono::Local;
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};

use linewatch_types::Severity;

use crate::app::App;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let dashboard = app.dashboard().read();
    let log = dashboard.anomalies();

    let chunks = Layout::vertical([Constraint::Length(1), Constraint::Min(3)]).split(area);

    let mut tally = vec![Span::raw(format!(" {} logged (max {}) │ ", log.len(), log.capacity()))];
    for severity in [Severity::High, Severity::Medium, Severity::Low] {
        tally.push(Span::styled(
            format!("{} {} ", log.count_severity(severity), severity),
            app.theme.severity_style(severity),
        ));
    }
    if let Some(module) = log.most_affected_module() {
        tally.push(Span::raw(format!("│ most affected: {}", module)));
    }
    frame.render_widget(Paragraph::new(Line::from(tally)), chunks[0]);

    let header = Row::new(vec![
        Cell::from("Time"),
        Cell::from("Type"),
        Cell::from("Module"),
        Cell::from("Parameter"),
        Cell::from("Confidence"),
        Cell::from("Severity"),
    ])
    .height(1)
    .style(app.theme.header);

    let rows: Vec<Row> = log
        .recent()
        .map(|entry| {
            Row::new(vec![
                Cell::from(entry.timestamp.with_timezone(&Local).format("%H:%M:%S").to_string()),
                Cell::from(entry.anomaly_type.as_str()),
                Cell::from(entry.module().map(|m| m.as_str()).unwrap_or("-")),
                Cell::from(entry.parameter_name().to_string()),
                Cell::from(format!("{:.1}%", entry.confidence * 100.0)),
                Cell::from(entry.severity.as_str()).style(app.theme.severity_style(entry.severity)),
            ])
        })
        .collect();

    let widths = [
        Constraint::Length(10),
        Constraint::Length(8),
        Constraint::Fill(2),
        Constraint::Fill(2),
        Constraint::Length(11),
        Constraint::Length(9),
    ];

    let title = if log.is_empty() {
        " Anomalies (none detected) ".to_string()
    } else {
        let selected = app.selected_anomaly_index.min(log.len() - 1);
        format!(" Anomalies [{}/{}] ", selected + 1, log.len())
    };

    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_type(app.theme.border_type)
                .border_style(Style::default().fg(app.theme.border)),
        )
        .row_highlight_style(app.theme.selected)
        .highlight_symbol("▶ ");

    let mut state = TableState::default();
    if !log.is_empty() {
        state.select(Some(app.selected_anomaly_index.min(log.len() - 1)));
    }

    frame.render_stateful_widget(table, chunks[1], &mut state);
}
