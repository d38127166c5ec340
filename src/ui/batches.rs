//! Batches view rendering.
//!
//! Production batches in a table, with quality figures alongside.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};

use linewatch_types::ModuleStatus;

use crate::app::App;
use crate::data::{BatchGrade, BatchSummary};

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let dashboard = app.dashboard().read();
    let batches = dashboard.batches();
    let summary = dashboard.batch_summary();

    let chunks = Layout::horizontal([Constraint::Fill(3), Constraint::Fill(2)]).split(area);

    let header = Row::new(vec![
        Cell::from("Batch"),
        Cell::from("Quality"),
        Cell::from("Anomalies"),
        Cell::from("Grade"),
    ])
    .height(1)
    .style(app.theme.header);

    let rows: Vec<Row> = batches
        .iter()
        .map(|b| {
            let grade_style = match b.grade {
                BatchGrade::Good => app.theme.status_style(ModuleStatus::Normal),
                BatchGrade::Fair => app.theme.status_style(ModuleStatus::Warning),
            };
            Row::new(vec![
                Cell::from(b.id.clone()),
                Cell::from(format!("{:.1}%", b.quality)),
                Cell::from(b.anomalies.to_string()),
                Cell::from(b.grade.as_str()).style(grade_style),
            ])
        })
        .collect();

    let widths = [
        Constraint::Fill(1),
        Constraint::Fill(1),
        Constraint::Fill(1),
        Constraint::Fill(1),
    ];

    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .title(format!(" Batches ({}) ", batches.len()))
                .borders(Borders::ALL)
                .border_type(app.theme.border_type)
                .border_style(Style::default().fg(app.theme.border)),
        )
        .row_highlight_style(app.theme.selected)
        .highlight_symbol("▶ ");

    let mut state = TableState::default();
    if !batches.is_empty() {
        state.select(Some(app.selected_batch_index.min(batches.len() - 1)));
    }
    frame.render_stateful_widget(table, chunks[0], &mut state);

    let block = Block::default()
        .title(" Quality ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border));
    frame.render_widget(Paragraph::new(summary_lines(&summary)).block(block), chunks[1]);
}

fn summary_lines(summary: &BatchSummary) -> Vec<Line<'static>> {
    let bold = Style::default().add_modifier(Modifier::BOLD);
    let field = |label: &'static str, value: String| {
        Line::from(vec![Span::raw(format!(" {:<18}", label)), Span::styled(value, bold)])
    };

    vec![
        field("Average quality", format!("{:.2}%", summary.average_quality)),
        field("Pass rate", format!("{:.1}%", summary.pass_rate)),
        field("Batch anomalies", summary.total_anomalies.to_string()),
        field(
            "Most affected",
            summary
                .most_affected_module
                .map(|m| m.to_string())
                .unwrap_or_else(|| "-".to_string()),
        ),
        Line::from(""),
        Line::from(Span::styled(" Distribution", bold)),
        field("  Excellent >95%", summary.distribution.excellent.to_string()),
        field("  Good 85-95%", summary.distribution.good.to_string()),
        field("  Fair <85%", summary.distribution.fair.to_string()),
    ]
}
