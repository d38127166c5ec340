//! Detail overlay rendering.
//!
//! A modal showing one module: its status, latest readings for every
//! parameter it owns, and the trend of any tracked series.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table},
    Frame,
};

use crate::app::App;
use crate::data::SeriesKey;
use crate::ui::modules::render_sparkline;

/// Minimum width required for the detail overlay to render properly.
const MIN_OVERLAY_WIDTH: u16 = 50;
/// Minimum height required for the detail overlay to render properly.
const MIN_OVERLAY_HEIGHT: u16 = 16;

/// Render the selected module as a modal overlay.
pub fn render_overlay(frame: &mut Frame, app: &App, area: Rect) {
    if area.width < MIN_OVERLAY_WIDTH || area.height < MIN_OVERLAY_HEIGHT {
        return;
    }

    let dashboard = app.dashboard().read();
    let Some(module) = dashboard.modules().get(app.selected_module_index) else {
        return;
    };

    let overlay_width = (area.width * 90 / 100).clamp(MIN_OVERLAY_WIDTH, 90);
    let overlay_height = (area.height * 90 / 100).clamp(MIN_OVERLAY_HEIGHT, 40);
    let x = area.x + (area.width.saturating_sub(overlay_width)) / 2;
    let y = area.y + (area.height.saturating_sub(overlay_height)) / 2;
    let overlay_area = Rect::new(x, y, overlay_width, overlay_height);

    frame.render_widget(Clear, overlay_area);

    let chunks = Layout::vertical([
        Constraint::Length(4),
        Constraint::Min(8),
        Constraint::Length(1),
    ])
    .split(overlay_area);

    // Header
    let status_style = app.theme.status_style(module.status);
    let last_verdict = dashboard
        .last_verdict()
        .filter(|v| v.is_anomaly() && module.name.owns(&v.parameter_for_anomaly))
        .map(|v| {
            format!(
                "{} on {} ({:.0}%, {})",
                v.anomaly_type,
                v.parameter_name(),
                v.confidence * 100.0,
                v.severity
            )
        })
        .unwrap_or_else(|| "none".to_string());

    let header_lines = vec![
        Line::from(vec![
            Span::styled(
                format!(" {} ", module.name),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!("{} {}", module.status.symbol(), module.status.label()),
                status_style,
            ),
        ]),
        Line::from(format!(
            " Temperature: {:.1} K   Level: {:.0}%",
            module.temperature,
            module.level * 100.0
        )),
        Line::from(format!(" Latest anomaly: {}", last_verdict)),
    ];
    let header = Paragraph::new(header_lines).block(
        Block::default()
            .borders(Borders::TOP | Borders::LEFT | Borders::RIGHT)
            .border_type(app.theme.border_type)
            .border_style(Style::default().fg(app.theme.highlight)),
    );
    frame.render_widget(header, chunks[0]);

    // Parameters
    let rows: Vec<Row> = module
        .parameters()
        .iter()
        .map(|parameter| {
            let key = SeriesKey::new(module.name, *parameter);
            let buffer = dashboard.feed().buffer(&key);
            let latest = buffer.and_then(|b| b.latest());
            Row::new(vec![
                Cell::from(*parameter),
                Cell::from(latest.map(|v| format!("{:.3}", v)).unwrap_or_else(|| "-".to_string())),
                Cell::from(
                    buffer
                        .map(|b| render_sparkline(&b.sparkline()))
                        .unwrap_or_else(|| "untracked".to_string()),
                ),
            ])
        })
        .collect();

    let table = Table::new(
        rows,
        [Constraint::Fill(2), Constraint::Fill(1), Constraint::Min(10)],
    )
    .header(
        Row::new(vec!["Parameter", "Latest", "Trend"])
            .style(app.theme.header)
            .height(1),
    )
    .block(
        Block::default()
            .title(format!(" Parameters ({}) ", module.parameters().len()))
            .borders(Borders::LEFT | Borders::RIGHT | Borders::BOTTOM)
            .border_type(app.theme.border_type)
            .border_style(Style::default().fg(app.theme.highlight)),
    );
    frame.render_widget(table, chunks[1]);

    let footer = Paragraph::new(" ↑↓:module Esc:close")
        .style(Style::default().add_modifier(Modifier::DIM));
    frame.render_widget(footer, chunks[2]);
}
