//! Common UI components shared across views.
//!
//! This module contains the header bar, tab bar, status bar, and help overlay.

use chrono::Utc;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Tabs},
    Frame,
};

use linewatch_types::ModuleStatus;

use crate::app::{App, View};
use crate::monitor::LoopState;

/// Tab titles, in [`View::ALL`] order.
pub const TAB_TITLES: [&str; 4] = ["1:Modules", "2:Charts", "3:Anomalies", "4:Batches"];

/// Render the header bar with the line's overall status.
///
/// Displays: overall status, module counts by status, loop state, source.
pub fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let dashboard = app.dashboard().read();

    let count = |status: ModuleStatus| {
        dashboard
            .modules()
            .iter()
            .filter(|m| m.status == status)
            .count()
    };
    let normal = count(ModuleStatus::Normal);
    let warning = count(ModuleStatus::Warning);
    let anomaly = count(ModuleStatus::Anomaly);

    let overall = dashboard.overall_status();
    let dim = Style::default().add_modifier(Modifier::DIM);

    let loop_style = match app.loop_state() {
        LoopState::Polling => Style::default().fg(app.theme.normal),
        LoopState::Idle | LoopState::Stopped => dim,
    };

    let line = Line::from(vec![
        Span::styled(format!(" {} ", overall.symbol()), app.theme.status_style(overall)),
        Span::styled("LINEWATCH ", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw("│ "),
        Span::styled(normal.to_string(), Style::default().fg(app.theme.normal)),
        Span::raw(" ok "),
        if warning > 0 {
            Span::styled(warning.to_string(), app.theme.status_style(ModuleStatus::Warning))
        } else {
            Span::styled("0", dim)
        },
        Span::raw(" warn "),
        if anomaly > 0 {
            Span::styled(anomaly.to_string(), app.theme.status_style(ModuleStatus::Anomaly))
        } else {
            Span::styled("0", dim)
        },
        Span::raw(" anom │ "),
        Span::styled(app.loop_state().label(), loop_style),
        Span::raw(format!(" │ {} cycles │ {}", dashboard.cycles(), app.source_description())),
    ]);

    frame.render_widget(Paragraph::new(line), area);
}

/// Render the tab bar, highlighting the active view.
pub fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let titles: Vec<Line> = TAB_TITLES.iter().map(|t| Line::from(*t)).collect();

    let tabs = Tabs::new(titles)
        .select(app.current_view.index())
        .style(app.theme.tab_inactive)
        .highlight_style(app.theme.tab_active)
        .divider("|");

    frame.render_widget(tabs, area);
}

/// Render the status bar at the bottom.
///
/// A temporary message wins, then a stalled-feed alert, then the usual
/// last-update line with context-sensitive controls.
pub fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    if let Some(msg) = app.get_status_message() {
        let paragraph =
            Paragraph::new(format!(" {} ", msg)).style(Style::default().fg(app.theme.highlight));
        frame.render_widget(paragraph, area);
        return;
    }

    let dashboard = app.dashboard().read();
    let failures = dashboard.failures();

    if failures.is_stalled() {
        let text = format!(
            " Feed stalled: {} consecutive failures | {} | r:retry q:quit",
            failures.consecutive(),
            failures.last_error().unwrap_or("unknown error"),
        );
        let paragraph = Paragraph::new(text).style(
            Style::default()
                .fg(app.theme.anomaly)
                .add_modifier(Modifier::BOLD),
        );
        frame.render_widget(paragraph, area);
        return;
    }

    let updated = match dashboard.last_update() {
        Some(at) => {
            let elapsed = (Utc::now() - at).num_milliseconds().max(0) as f64 / 1000.0;
            format!("Updated {:.1}s ago", elapsed)
        }
        None => "No data yet".to_string(),
    };
    let error = failures
        .last_error()
        .map(|e| format!(" | Last error: {}", e))
        .unwrap_or_default();

    let controls = match app.current_view {
        View::Modules => "p:start/stop r:cycle Enter:detail x:csv ?:help q:quit",
        View::Charts => "p:start/stop r:cycle ↑↓:chart ?:help q:quit",
        View::Anomalies | View::Batches => "p:start/stop r:cycle x:csv e:json ?:help q:quit",
    };

    let status = format!(
        " {} | {}{} | {}",
        app.current_view.label(),
        updated,
        error,
        controls
    );
    let paragraph = Paragraph::new(status).style(Style::default().add_modifier(Modifier::DIM));
    frame.render_widget(paragraph, area);
}

/// Render the help overlay with keyboard shortcuts.
///
/// Displayed as a centered modal on top of the current view.
pub fn render_help(frame: &mut Frame, app: &App, area: Rect) {
    let section = |title: &'static str| {
        Line::from(vec![Span::styled(
            title,
            Style::default().add_modifier(Modifier::BOLD),
        )])
    };

    let help_text = vec![
        Line::from(vec![Span::styled("Keyboard Shortcuts", app.theme.header)]),
        Line::from(""),
        section(" Navigation"),
        Line::from("  Tab/1-4     Switch views"),
        Line::from("  ↑/↓ j/k     Navigate list"),
        Line::from("  Home/End    Jump to first/last"),
        Line::from("  Enter       Module detail"),
        Line::from("  Esc         Go back"),
        Line::from(""),
        section(" Monitoring"),
        Line::from("  p, Space    Start/stop polling"),
        Line::from("  r           Run one cycle now"),
        Line::from(""),
        section(" Export"),
        Line::from("  e           Full state as JSON"),
        Line::from("  x           CSV report for this tab"),
        Line::from(""),
        Line::from("  ?           Toggle help"),
        Line::from("  q           Quit"),
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

    let help_width = 42u16.min(area.width.saturating_sub(4));
    let help_height = 24u16.min(area.height.saturating_sub(2));
    let x = area.x + (area.width.saturating_sub(help_width)) / 2;
    let y = area.y + (area.height.saturating_sub(help_height)) / 2;
    let help_area = Rect::new(x, y, help_width, help_height);

    frame.render_widget(Clear, help_area);
    frame.render_widget(paragraph, help_area);
}
