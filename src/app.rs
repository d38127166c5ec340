//! Application state and navigation logic.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::Result;
use chrono::Utc;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use linewatch_types::ModuleName;

use crate::dashboard::SharedDashboard;
use crate::data::{ReportKind, StateExport};
use crate::monitor::{CycleOutcome, LoopState, MonitoringLoop};
use crate::ui::Theme;

/// File name used by the in-app JSON export.
pub const EXPORT_FILE: &str = "linewatch_export.json";

/// How long a status bar message stays visible.
const STATUS_MESSAGE_TTL: Duration = Duration::from_secs(3);

/// The current tab in the TUI.
///
/// Module detail is an overlay (see `App::show_detail_overlay`), not a tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    /// Every module with its status, readings and trend.
    Modules,
    /// Line charts of the tracked series.
    Charts,
    /// Recent anomaly log, newest first.
    Anomalies,
    /// Production batches and quality summary.
    Batches,
}

impl View {
    pub const ALL: [View; 4] = [View::Modules, View::Charts, View::Anomalies, View::Batches];

    pub fn next(self) -> Self {
        match self {
            View::Modules => View::Charts,
            View::Charts => View::Anomalies,
            View::Anomalies => View::Batches,
            View::Batches => View::Modules,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            View::Modules => View::Batches,
            View::Charts => View::Modules,
            View::Anomalies => View::Charts,
            View::Batches => View::Anomalies,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            View::Modules => "Modules",
            View::Charts => "Charts",
            View::Anomalies => "Anomalies",
            View::Batches => "Batches",
        }
    }

    pub fn index(&self) -> usize {
        match self {
            View::Modules => 0,
            View::Charts => 1,
            View::Anomalies => 2,
            View::Batches => 3,
        }
    }

    /// The CSV report exported from this tab.
    pub fn report_kind(&self) -> ReportKind {
        match self {
            View::Anomalies => ReportKind::Anomaly,
            View::Batches => ReportKind::Production,
            View::Modules | View::Charts => ReportKind::Quality,
        }
    }
}

/// TUI state: the monitoring loop it drives, plus navigation.
#[derive(Debug)]
pub struct App {
    pub running: bool,
    pub current_view: View,
    pub show_help: bool,
    pub show_detail_overlay: bool,
    pub selected_module_index: usize,
    pub selected_chart_index: usize,
    pub selected_anomaly_index: usize,
    pub selected_batch_index: usize,
    pub theme: Theme,
    /// Directory exports are written to.
    pub export_dir: PathBuf,
    monitor: MonitoringLoop,
    dashboard: SharedDashboard,
    runtime: Handle,
    pending_cycle: Option<JoinHandle<CycleOutcome>>,
    status_message: Option<(String, Instant)>,
}

impl App {
    /// `runtime` runs the monitoring loop's tasks; the TUI itself stays on
    /// the calling thread.
    pub fn new(monitor: MonitoringLoop, runtime: Handle) -> Self {
        let dashboard = monitor.dashboard().clone();
        Self {
            running: true,
            current_view: View::Modules,
            show_help: false,
            show_detail_overlay: false,
            selected_module_index: 0,
            selected_chart_index: 0,
            selected_anomaly_index: 0,
            selected_batch_index: 0,
            theme: Theme::dark(),
            export_dir: PathBuf::from("."),
            monitor,
            dashboard,
            runtime,
            pending_cycle: None,
            status_message: None,
        }
    }

    /// Replace the default dark theme, e.g. with [`Theme::auto_detect()`].
    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }

    pub fn with_export_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.export_dir = dir.into();
        self
    }

    pub fn dashboard(&self) -> &SharedDashboard {
        &self.dashboard
    }

    pub fn loop_state(&self) -> LoopState {
        self.monitor.state()
    }

    pub fn source_description(&self) -> &str {
        self.monitor.source_description()
    }

    pub fn poll_interval(&self) -> Duration {
        self.monitor.interval()
    }

    pub fn set_status_message(&mut self, message: String) {
        self.status_message = Some((message, Instant::now()));
    }

    /// The current status message, unless it has expired.
    pub fn get_status_message(&self) -> Option<&str> {
        match &self.status_message {
            Some((msg, at)) if at.elapsed() < STATUS_MESSAGE_TTL => Some(msg),
            _ => None,
        }
    }

    /// Start polling, or stop it if already running.
    pub fn toggle_monitoring(&mut self) {
        if self.monitor.state() == LoopState::Polling {
            self.monitor.stop();
            self.set_status_message("Monitoring stopped".to_string());
            return;
        }

        match self.runtime.block_on(self.monitor.start()) {
            Ok(()) => self.set_status_message(format!(
                "Monitoring every {}",
                crate::data::duration::format_duration(self.monitor.interval())
            )),
            Err(e) => self.set_status_message(format!("Start failed: {}", e)),
        }
    }

    /// Run one cycle in the background; its outcome shows up on a later tick.
    pub fn run_cycle_now(&mut self) {
        if self.pending_cycle.is_some() {
            self.set_status_message("Cycle already running".to_string());
            return;
        }
        let _guard = self.runtime.enter();
        self.pending_cycle = Some(self.monitor.spawn_cycle());
        self.set_status_message("Running cycle...".to_string());
    }

    /// Collect the outcome of a manual cycle once it has finished.
    pub fn poll_pending_cycle(&mut self) -> Option<CycleOutcome> {
        if !self.pending_cycle.as_ref().is_some_and(|h| h.is_finished()) {
            return None;
        }
        let handle = self.pending_cycle.take()?;
        match self.runtime.block_on(handle) {
            Ok(outcome) => {
                let message = match &outcome {
                    CycleOutcome::Applied(report) => format!(
                        "Cycle applied: {} points, {} status changes",
                        report.ingest.appended, report.status_changes
                    ),
                    CycleOutcome::Skipped(err) => format!("Cycle failed: {}", err),
                };
                self.set_status_message(message);
                Some(outcome)
            }
            Err(e) => {
                self.set_status_message(format!("Cycle aborted: {}", e));
                None
            }
        }
    }

    /// Write the full dashboard state as JSON into the export directory.
    pub fn export_json(&mut self) -> Result<PathBuf> {
        let path = self.export_dir.join(EXPORT_FILE);
        let export = StateExport::capture(&self.dashboard.read(), Utc::now());
        export.write(&path)?;
        Ok(path)
    }

    /// Write the current tab's CSV report into the export directory.
    pub fn export_report(&mut self) -> Result<PathBuf> {
        let kind = self.current_view.report_kind();
        let path = self.export_dir.join(kind.file_name());
        kind.write(&self.dashboard.read(), &path)?;
        Ok(path)
    }

    /// Run an export and report the result in the status bar.
    pub fn export_with_message(&mut self, export: fn(&mut App) -> Result<PathBuf>) {
        let message = match export(self) {
            Ok(path) => format!("Exported to {}", display_path(&path)),
            Err(e) => format!("Export failed: {}", e),
        };
        self.set_status_message(message);
    }

    pub fn next_view(&mut self) {
        self.set_view(self.current_view.next());
    }

    pub fn prev_view(&mut self) {
        self.set_view(self.current_view.prev());
    }

    pub fn set_view(&mut self, view: View) {
        self.current_view = view;
        self.show_detail_overlay = false;
    }

    fn item_count(&self) -> usize {
        let dashboard = self.dashboard.read();
        match self.current_view {
            View::Modules => dashboard.modules().len(),
            View::Charts => dashboard.feed().views().len(),
            View::Anomalies => dashboard.anomalies().len(),
            View::Batches => dashboard.batches().len(),
        }
    }

    fn selection_mut(&mut self) -> &mut usize {
        match self.current_view {
            View::Modules => &mut self.selected_module_index,
            View::Charts => &mut self.selected_chart_index,
            View::Anomalies => &mut self.selected_anomaly_index,
            View::Batches => &mut self.selected_batch_index,
        }
    }

    pub fn select_next(&mut self) {
        self.select_next_n(1);
    }

    pub fn select_prev(&mut self) {
        self.select_prev_n(1);
    }

    pub fn select_next_n(&mut self, n: usize) {
        let max = self.item_count().saturating_sub(1);
        let selected = self.selection_mut();
        *selected = (*selected + n).min(max);
    }

    pub fn select_prev_n(&mut self, n: usize) {
        let selected = self.selection_mut();
        *selected = selected.saturating_sub(n);
    }

    pub fn select_first(&mut self) {
        *self.selection_mut() = 0;
    }

    pub fn select_last(&mut self) {
        let last = self.item_count().saturating_sub(1);
        *self.selection_mut() = last;
    }

    /// The module highlighted on the Modules tab.
    pub fn selected_module(&self) -> Option<ModuleName> {
        self.dashboard
            .read()
            .modules()
            .get(self.selected_module_index)
            .map(|m| m.name)
    }

    /// Open the detail overlay for the selected module.
    pub fn enter_detail(&mut self) {
        if self.current_view == View::Modules {
            self.show_detail_overlay = true;
        }
    }

    /// Close the overlay if open, otherwise return to the Modules tab.
    pub fn go_back(&mut self) {
        if self.show_detail_overlay {
            self.show_detail_overlay = false;
        } else if self.current_view != View::Modules {
            self.current_view = View::Modules;
        }
    }

    pub fn close_overlay(&mut self) {
        self.show_detail_overlay = false;
    }

    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    pub fn quit(&mut self) {
        self.monitor.stop();
        self.running = false;
    }
}

fn display_path(path: &Path) -> String {
    path.strip_prefix(".").unwrap_or(path).display().to_string()
}
