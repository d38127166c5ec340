//! Keyboard and mouse handling.

use std::time::Duration;

use anyhow::Result;
use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};

use crate::app::{App, View};
use crate::ui::common::TAB_TITLES;

/// Row of the tab bar, just below the header.
const TAB_ROW: u16 = 1;

/// Poll for events with a timeout
pub fn poll_event(timeout: Duration) -> Result<Option<Event>> {
    if event::poll(timeout)? {
        Ok(Some(event::read()?))
    } else {
        Ok(None)
    }
}

/// Handle a key event
pub fn handle_key_event(app: &mut App, key: KeyEvent) {
    // Any key closes help.
    if app.show_help {
        app.show_help = false;
        return;
    }

    if app.show_detail_overlay {
        match key.code {
            KeyCode::Esc | KeyCode::Enter | KeyCode::Backspace | KeyCode::Char('q') => {
                app.close_overlay();
            }
            // Scroll through modules with the overlay open
            KeyCode::Up | KeyCode::Char('k') => app.select_prev(),
            KeyCode::Down | KeyCode::Char('j') => app.select_next(),
            KeyCode::Home => app.select_first(),
            KeyCode::End => app.select_last(),
            _ => {}
        }
        return;
    }

    match key.code {
        KeyCode::Char('q') => app.quit(),
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => app.quit(),

        KeyCode::Tab => {
            if key.modifiers.contains(KeyModifiers::SHIFT) {
                app.prev_view();
            } else {
                app.next_view();
            }
        }
        KeyCode::BackTab => app.prev_view(),

        KeyCode::Char('1') => app.set_view(View::Modules),
        KeyCode::Char('2') => app.set_view(View::Charts),
        KeyCode::Char('3') => app.set_view(View::Anomalies),
        KeyCode::Char('4') => app.set_view(View::Batches),

        KeyCode::Up | KeyCode::Char('k') => app.select_prev(),
        KeyCode::Down | KeyCode::Char('j') => app.select_next(),
        KeyCode::Left | KeyCode::Char('h') => app.prev_view(),
        KeyCode::Right | KeyCode::Char('l') => app.next_view(),
        KeyCode::PageUp => app.select_prev_n(10),
        KeyCode::PageDown => app.select_next_n(10),
        KeyCode::Home => app.select_first(),
        KeyCode::End => app.select_last(),

        KeyCode::Enter => app.enter_detail(),
        KeyCode::Esc | KeyCode::Backspace => app.go_back(),

        // Monitoring
        KeyCode::Char('p') | KeyCode::Char(' ') => app.toggle_monitoring(),
        KeyCode::Char('r') => app.run_cycle_now(),

        // Export
        KeyCode::Char('e') => app.export_with_message(App::export_json),
        KeyCode::Char('x') => app.export_with_message(App::export_report),

        KeyCode::Char('?') => app.toggle_help(),

        _ => {}
    }
}

/// Handle mouse events
pub fn handle_mouse_event(app: &mut App, mouse: MouseEvent, content_start_row: u16) {
    match mouse.kind {
        MouseEventKind::ScrollUp => app.select_prev(),
        MouseEventKind::ScrollDown => app.select_next(),

        MouseEventKind::Down(MouseButton::Left) => {
            if mouse.row == TAB_ROW {
                if let Some(view) = tab_at(mouse.column) {
                    app.set_view(view);
                }
                return;
            }

            // Skip the table's border and header rows, plus the tally line
            // above the anomaly table.
            let first_row = content_start_row + 2 + table_offset(app.current_view);
            if mouse.row >= first_row {
                let item_row = (mouse.row - first_row) as usize;
                match app.current_view {
                    View::Modules => {
                        if item_row < app.dashboard().read().modules().len() {
                            app.selected_module_index = item_row;
                        }
                    }
                    View::Anomalies => {
                        if item_row < app.dashboard().read().anomalies().len() {
                            app.selected_anomaly_index = item_row;
                        }
                    }
                    View::Batches => {
                        if item_row < app.dashboard().read().batches().len() {
                            app.selected_batch_index = item_row;
                        }
                    }
                    View::Charts => {}
                }
            }
        }

        MouseEventKind::Down(MouseButton::Right) => app.go_back(),

        _ => {}
    }
}

/// Rows a view draws above its table.
fn table_offset(view: View) -> u16 {
    match view {
        View::Anomalies => 1,
        _ => 0,
    }
}

/// The tab under column `col` of the tab bar.
///
/// Each title is padded by one space either side and followed by a
/// one-column divider.
fn tab_at(col: u16) -> Option<View> {
    let mut start = 0u16;
    for (title, view) in TAB_TITLES.iter().zip(View::ALL) {
        let end = start + title.chars().count() as u16 + 2;
        if col < end {
            return Some(view);
        }
        start = end + 1;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::Dashboard;
    use crate::monitor::{LoopState, MonitoringLoop};
    use crate::settings::Settings;
    use crate::source::{DemoSource, Reading};
    use chrono::Utc;
    use linewatch_types::{AnomalyType, PredictionVerdict, TelemetrySnapshot};

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn with_app(f: impl FnOnce(&mut App)) {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .build()
            .unwrap();
        let dashboard = Dashboard::from_settings(&Settings::default()).unwrap().shared();
        let monitor = MonitoringLoop::new(Box::new(DemoSource::seeded(2)), dashboard)
            .with_interval(Duration::from_secs(60));
        let mut app = App::new(monitor, runtime.handle().clone());
        f(&mut app);
    }

    #[test]
    fn number_keys_switch_tabs() {
        with_app(|app| {
            handle_key_event(app, key(KeyCode::Char('3')));
            assert_eq!(app.current_view, View::Anomalies);
            handle_key_event(app, key(KeyCode::Tab));
            assert_eq!(app.current_view, View::Batches);
            handle_key_event(app, key(KeyCode::BackTab));
            assert_eq!(app.current_view, View::Anomalies);
        });
    }

    #[test]
    fn help_swallows_next_key() {
        with_app(|app| {
            handle_key_event(app, key(KeyCode::Char('?')));
            assert!(app.show_help);
            handle_key_event(app, key(KeyCode::Char('q')));
            assert!(!app.show_help);
            assert!(app.running);
        });
    }

    #[test]
    fn overlay_keys_take_precedence() {
        with_app(|app| {
            handle_key_event(app, key(KeyCode::Enter));
            assert!(app.show_detail_overlay);
            handle_key_event(app, key(KeyCode::Down));
            assert_eq!(app.selected_module_index, 1);
            handle_key_event(app, key(KeyCode::Char('q')));
            assert!(!app.show_detail_overlay);
            assert!(app.running);
        });
    }

    #[test]
    fn p_toggles_monitoring() {
        with_app(|app| {
            handle_key_event(app, key(KeyCode::Char('p')));
            assert_eq!(app.loop_state(), LoopState::Polling);
            handle_key_event(app, key(KeyCode::Char('p')));
            assert_eq!(app.loop_state(), LoopState::Stopped);
        });
    }

    #[test]
    fn ctrl_c_quits() {
        with_app(|app| {
            handle_key_event(app, KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
            assert!(!app.running);
        });
    }

    #[test]
    fn tab_columns_follow_titles() {
        assert_eq!(tab_at(0), Some(View::Modules));
        assert_eq!(tab_at(10), Some(View::Modules));
        assert_eq!(tab_at(12), Some(View::Charts));
        assert_eq!(tab_at(23), Some(View::Anomalies));
        assert_eq!(tab_at(38), Some(View::Batches));
        assert_eq!(tab_at(200), None);
    }

    #[test]
    fn click_selects_row_and_tab() {
        with_app(|app| {
            let click = |row, column| MouseEvent {
                kind: MouseEventKind::Down(MouseButton::Left),
                column,
                row,
                modifiers: KeyModifiers::NONE,
            };
            handle_mouse_event(app, click(6, 5), 2);
            assert_eq!(app.selected_module_index, 2);

            handle_mouse_event(app, click(TAB_ROW, 40), 2);
            assert_eq!(app.current_view, View::Batches);
        });
    }

    #[test]
    fn click_on_anomaly_row_skips_tally() {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .build()
            .unwrap();
        let dashboard = Dashboard::from_settings(&Settings::default()).unwrap().shared();
        {
            let mut dash = dashboard.write();
            for (i, parameter) in ["Mixer/Level", "Pasteurizer/Temperature", "Mixer/Temperature"]
                .into_iter()
                .enumerate()
            {
                let verdict = PredictionVerdict::new(AnomalyType::Step, parameter, 0.93);
                let reading = Reading::new(TelemetrySnapshot::default(), Some(verdict));
                dash.apply(&reading, Utc::now() + chrono::Duration::seconds(i as i64));
            }
        }
        let monitor = MonitoringLoop::new(Box::new(DemoSource::seeded(2)), dashboard)
            .with_interval(Duration::from_secs(60));
        let mut app = App::new(monitor, runtime.handle().clone());
        app.set_view(View::Anomalies);

        let click = |row| MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column: 5,
            row,
            modifiers: KeyModifiers::NONE,
        };

        // Tally at row 2, border at 3, header at 4, first entry at 5.
        handle_mouse_event(&mut app, click(4), 2);
        assert_eq!(app.selected_anomaly_index, 0);
        handle_mouse_event(&mut app, click(6), 2);
        assert_eq!(app.selected_anomaly_index, 1);
        handle_mouse_event(&mut app, click(5), 2);
        assert_eq!(app.selected_anomaly_index, 0);
        handle_mouse_event(&mut app, click(8), 2);
        assert_eq!(app.selected_anomaly_index, 0);
    }
}
