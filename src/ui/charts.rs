//! Charts view rendering.
//!
//! Each configured chart gets an equal share of the screen and plots its
//! cached datasets as lines. The selected chart has a highlighted border.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    symbols::Marker,
    widgets::{Axis, Block, Borders, Chart, Dataset as ChartDataset, GraphType, Paragraph},
    Frame,
};

use crate::app::App;
use crate::data::{ChartView, Dataset};

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let dashboard = app.dashboard().read();
    let views = dashboard.feed().views();

    if views.is_empty() {
        let block = Block::default()
            .title(" Charts ")
            .borders(Borders::ALL)
            .border_type(app.theme.border_type);
        frame.render_widget(
            Paragraph::new(" No charts configured").block(block),
            area,
        );
        return;
    }

    let areas = Layout::vertical(vec![Constraint::Fill(1); views.len()]).split(area);
    let selected = app.selected_chart_index.min(views.len() - 1);

    for (i, (view, chunk)) in views.iter().zip(areas.iter()).enumerate() {
        render_chart(frame, app, view.as_ref(), *chunk, i == selected);
    }
}

fn render_chart(frame: &mut Frame, app: &App, view: &dyn ChartView, area: Rect, selected: bool) {
    let datasets = view.datasets();

    let border_style = if selected {
        Style::default().fg(app.theme.highlight).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(app.theme.border)
    };
    let block = Block::default()
        .title(format!(" {} ", view.title()))
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(border_style);

    if datasets.is_empty() {
        frame.render_widget(Paragraph::new(" Waiting for data...").block(block), area);
        return;
    }

    let lines: Vec<ChartDataset> = datasets
        .iter()
        .enumerate()
        .map(|(i, ds)| {
            ChartDataset::default()
                .name(ds.key.to_string())
                .marker(Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(app.theme.series_color(i)))
                .data(&ds.points)
        })
        .collect();

    let (x_max, x_labels) = x_axis(&datasets);
    let (y_min, y_max) = y_bounds(&datasets);

    let chart = Chart::new(lines)
        .block(block)
        .x_axis(
            Axis::default()
                .style(Style::default().fg(app.theme.border))
                .bounds([0.0, x_max])
                .labels(x_labels),
        )
        .y_axis(
            Axis::default()
                .style(Style::default().fg(app.theme.border))
                .bounds([y_min, y_max])
                .labels(vec![format!("{:.1}", y_min), format!("{:.1}", y_max)]),
        );

    frame.render_widget(chart, area);
}

/// Upper x bound and the first/last time labels of the longest dataset.
fn x_axis(datasets: &[&Dataset]) -> (f64, Vec<String>) {
    let Some(longest) = datasets.iter().max_by_key(|d| d.labels.len()) else {
        return (1.0, Vec::new());
    };
    let x_max = longest.labels.len().saturating_sub(1).max(1) as f64;
    let labels = match (longest.labels.first(), longest.labels.last()) {
        (Some(first), Some(last)) => vec![first.clone(), last.clone()],
        _ => Vec::new(),
    };
    (x_max, labels)
}

/// Combined y range with a little headroom.
fn y_bounds(datasets: &[&Dataset]) -> (f64, f64) {
    let (lo, hi) = datasets
        .iter()
        .filter_map(|d| d.bounds)
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), (min, max)| {
            (lo.min(min), hi.max(max))
        });
    if !lo.is_finite() || !hi.is_finite() {
        return (0.0, 1.0);
    }
    let pad = ((hi - lo) * 0.05).max(0.5);
    (lo - pad, hi + pad)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::SeriesKey;

    fn dataset(values: &[f64]) -> Dataset {
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        Dataset {
            key: "Mixer/Temperature".parse::<SeriesKey>().unwrap(),
            labels: (0..values.len()).map(|i| format!("12:00:{:02}", i)).collect(),
            points: values.iter().enumerate().map(|(i, v)| (i as f64, *v)).collect(),
            bounds: (!values.is_empty()).then_some((min, max)),
        }
    }

    #[test]
    fn y_bounds_cover_all_series() {
        let a = dataset(&[276.0, 277.0]);
        let b = dataset(&[250.0, 251.0]);
        let (lo, hi) = y_bounds(&[&a, &b]);
        assert!(lo < 250.0);
        assert!(hi > 277.0);
    }

    #[test]
    fn flat_series_still_has_range() {
        let a = dataset(&[0.85, 0.85]);
        let (lo, hi) = y_bounds(&[&a]);
        assert!(hi - lo >= 1.0);
    }

    #[test]
    fn x_axis_labels_span_window() {
        let a = dataset(&[1.0, 2.0, 3.0]);
        let (x_max, labels) = x_axis(&[&a]);
        assert_eq!(x_max, 2.0);
        assert_eq!(labels, vec!["12:00:00".to_string(), "12:00:02".to_string()]);
    }
}
