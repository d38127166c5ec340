//! Modules view rendering.
//!
//! One row per line module: status, latest temperature and level, and a
//! sparkline of whichever of its series the chart feed tracks.

use ratatui::{
    layout::{Constraint, Rect},
    style::Style,
    widgets::{Block, Borders, Cell, Row, Table, TableState},
    Frame,
};

use crate::app::App;
use crate::dashboard::Dashboard;
use crate::data::{LineModule, SeriesKey};

/// Sparkline characters (8 levels of height).
const SPARKLINE_CHARS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// Width of the trend column, in samples.
const SPARKLINE_WIDTH: usize = 10;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let dashboard = app.dashboard().read();
    let modules = dashboard.modules();

    let header = Row::new(vec![
        Cell::from("Module"),
        Cell::from("Temp (K)"),
        Cell::from("Level"),
        Cell::from("Trend"),
        Cell::from("Status"),
    ])
    .height(1)
    .style(app.theme.header);

    let rows: Vec<Row> = modules
        .iter()
        .map(|m| {
            let status_style = app.theme.status_style(m.status);
            Row::new(vec![
                Cell::from(m.name.as_str()),
                Cell::from(format_temperature(m)),
                Cell::from(format_level(m)),
                Cell::from(render_sparkline(&trend(&dashboard, m))),
                Cell::from(format!("{} {}", m.status.symbol(), m.status.label())).style(status_style),
            ])
        })
        .collect();

    let widths = [
        Constraint::Fill(3),
        Constraint::Fill(1),
        Constraint::Fill(1),
        Constraint::Min(SPARKLINE_WIDTH as u16),
        Constraint::Min(10),
    ];

    let selected = app.selected_module_index.min(modules.len().saturating_sub(1));
    let title = format!(
        " Modules [{}/{}] overall {} ",
        selected + 1,
        modules.len(),
        dashboard.overall_status().label()
    );

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
    state.select(Some(selected));

    frame.render_stateful_widget(table, area, &mut state);
}

/// Sparkline levels for the first tracked series of `module`, preferring
/// its temperature.
pub(crate) fn trend(dashboard: &Dashboard, module: &LineModule) -> Vec<u8> {
    ["Temperature", "Level"]
        .iter()
        .filter_map(|p| dashboard.feed().buffer(&SeriesKey::new(module.name, *p)))
        .chain(
            dashboard
                .feed()
                .buffers()
                .filter(|(k, _)| k.module() == module.name)
                .map(|(_, b)| b),
        )
        .next()
        .map(|b| b.sparkline())
        .unwrap_or_default()
}

pub(crate) fn render_sparkline(data: &[u8]) -> String {
    if data.is_empty() {
        return "-".to_string();
    }
    data.iter()
        .rev()
        .take(SPARKLINE_WIDTH)
        .rev()
        .map(|&v| SPARKLINE_CHARS[usize::from(v.min(7))])
        .collect()
}

fn format_temperature(module: &LineModule) -> String {
    if module.parameters().contains(&"Temperature") {
        format!("{:.1}", module.temperature)
    } else {
        "-".to_string()
    }
}

fn format_level(module: &LineModule) -> String {
    if module.parameters().contains(&"Level") {
        format!("{:.0}%", module.level * 100.0)
    } else {
        "-".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::initial_line;
    use linewatch_types::ModuleName;

    #[test]
    fn sparkline_keeps_latest_samples() {
        let data: Vec<u8> = (0..12).map(|i| (i % 8) as u8).collect();
        let line = render_sparkline(&data);
        assert_eq!(line.chars().count(), SPARKLINE_WIDTH);
        assert!(line.ends_with('▄'));
        assert_eq!(render_sparkline(&[]), "-");
    }

    #[test]
    fn homogenizer_has_no_temperature_or_level() {
        let line = initial_line();
        let homogenizer = line.iter().find(|m| m.name == ModuleName::Homogenizer).unwrap();
        assert_eq!(format_temperature(homogenizer), "-");
        assert_eq!(format_level(homogenizer), "-");

        let mixer = line.iter().find(|m| m.name == ModuleName::Mixer).unwrap();
        assert_eq!(format_temperature(mixer), "276.5");
        assert_eq!(format_level(mixer), "85%");
    }
}
