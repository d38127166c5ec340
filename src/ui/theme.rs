//! Color theme for the TUI.
//!
//! Light and dark palettes, with automatic terminal detection.

use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::block::BorderType;

use linewatch_types::{ModuleStatus, Severity};

/// Color and style theme for the TUI.
///
/// Use [`Theme::auto_detect()`] to follow the terminal background, or
/// [`Theme::dark()`]/[`Theme::light()`] explicitly.
#[derive(Debug, Clone)]
pub struct Theme {
    /// Accent color for highlights and active elements.
    pub highlight: Color,
    /// Modules in warning, medium-severity anomalies.
    pub warning: Color,
    /// Modules in anomaly, high-severity anomalies.
    pub anomaly: Color,
    /// Modules running normally.
    pub normal: Color,
    pub border: Color,
    /// One color per plotted series, reused in order.
    pub series: [Color; 4],
    pub header: Style,
    pub selected: Style,
    pub tab_active: Style,
    pub tab_inactive: Style,
    pub border_type: BorderType,
}

impl Theme {
    pub fn dark() -> Self {
        Self {
            highlight: Color::Cyan,
            warning: Color::Yellow,
            anomaly: Color::Red,
            normal: Color::Green,
            border: Color::Gray,
            series: [Color::Cyan, Color::Magenta, Color::Yellow, Color::LightGreen],
            header: Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            selected: Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD),
            tab_active: Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            tab_inactive: Style::default().fg(Color::Gray),
            border_type: BorderType::Rounded,
        }
    }

    pub fn light() -> Self {
        Self {
            highlight: Color::Blue,
            warning: Color::Yellow,
            anomaly: Color::Red,
            normal: Color::Green,
            border: Color::DarkGray,
            series: [Color::Blue, Color::Magenta, Color::Red, Color::Green],
            header: Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
            selected: Style::default().bg(Color::LightBlue).add_modifier(Modifier::BOLD),
            tab_active: Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
            tab_inactive: Style::default().fg(Color::DarkGray),
            border_type: BorderType::Rounded,
        }
    }

    /// Pick a palette from the terminal's background luminance.
    pub fn auto_detect() -> Self {
        match terminal_light::luma() {
            Ok(luma) if luma > 0.5 => Self::light(),
            _ => Self::dark(),
        }
    }

    pub fn status_style(&self, status: ModuleStatus) -> Style {
        match status {
            ModuleStatus::Normal => Style::default().fg(self.normal),
            ModuleStatus::Warning => Style::default().fg(self.warning),
            ModuleStatus::Anomaly => Style::default().fg(self.anomaly).add_modifier(Modifier::BOLD),
        }
    }

    pub fn severity_style(&self, severity: Severity) -> Style {
        match severity {
            Severity::Low => Style::default().fg(self.highlight),
            Severity::Medium => Style::default().fg(self.warning),
            Severity::High => Style::default().fg(self.anomaly).add_modifier(Modifier::BOLD),
        }
    }

    /// Color for the `index`th series of a chart.
    pub fn series_color(&self, index: usize) -> Color {
        self.series[index % self.series.len()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anomaly_status_is_bold() {
        let theme = Theme::dark();
        let style = theme.status_style(ModuleStatus::Anomaly);
        assert_eq!(style.fg, Some(Color::Red));
        assert!(style.add_modifier.contains(Modifier::BOLD));
        assert_eq!(theme.status_style(ModuleStatus::Normal).fg, Some(Color::Green));
    }

    #[test]
    fn series_colors_wrap() {
        let theme = Theme::light();
        assert_eq!(theme.series_color(0), theme.series_color(4));
        assert_ne!(theme.series_color(0), theme.series_color(1));
    }
}
