//! The dashboard context: all mutable monitoring state in one place.
//!
//! The monitoring loop writes to it once per cycle; the UI and the report
//! layer only read. It is shared as [`SharedDashboard`].

use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use tracing::{info, warn};

use linewatch_types::{ModuleName, ModuleStatus, PredictionVerdict};

use crate::data::{
    demo_batches, initial_line, overall_status, AnomalyLog, BatchRecord, BatchSummary, ChartFeed,
    IngestReport, LineModule, StatusAggregator,
};
use crate::error::{ConfigurationError, RequestFailure};
use crate::settings::Settings;
use crate::source::Reading;

/// Dashboard shared between the monitoring task and its readers.
pub type SharedDashboard = Arc<RwLock<Dashboard>>;

/// Default number of consecutive failed cycles before the feed is flagged as stalled.
pub const DEFAULT_FAILURE_THRESHOLD: u32 = 3;

/// Counts consecutive failed cycles and raises a stall alert at a threshold.
#[derive(Debug, Clone, PartialEq)]
pub struct FailureTracker {
    threshold: u32,
    consecutive: u32,
    total: u64,
    stalled: bool,
    last_error: Option<String>,
}

impl Default for FailureTracker {
    fn default() -> Self {
        Self::new(DEFAULT_FAILURE_THRESHOLD)
    }
}

impl FailureTracker {
    pub fn new(threshold: u32) -> Self {
        Self {
            threshold: threshold.max(1),
            consecutive: 0,
            total: 0,
            stalled: false,
            last_error: None,
        }
    }

    /// Count a failure. Returns true when this failure raised the alert.
    pub fn record_failure(&mut self, err: &RequestFailure) -> bool {
        self.consecutive += 1;
        self.total += 1;
        self.last_error = Some(err.to_string());
        if !self.stalled && self.consecutive >= self.threshold {
            self.stalled = true;
            return true;
        }
        false
    }

    /// Count a success. Returns true when this success cleared the alert.
    pub fn record_success(&mut self) -> bool {
        let cleared = self.stalled;
        self.consecutive = 0;
        self.stalled = false;
        self.last_error = None;
        cleared
    }

    pub fn is_stalled(&self) -> bool {
        self.stalled
    }

    pub fn consecutive(&self) -> u32 {
        self.consecutive
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }
}

/// What applying one reading changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ApplyReport {
    pub ingest: IngestReport,
    pub status_changes: usize,
    /// Whether the verdict was added to the anomaly log.
    pub logged: bool,
}

/// Modules, charts, anomaly log and cycle bookkeeping.
#[derive(Debug)]
pub struct Dashboard {
    modules: Vec<LineModule>,
    feed: ChartFeed,
    anomalies: AnomalyLog,
    aggregator: StatusAggregator,
    batches: Vec<BatchRecord>,
    failures: FailureTracker,
    cycles: u64,
    last_update: Option<DateTime<Utc>>,
    last_verdict: Option<PredictionVerdict>,
}

impl Dashboard {
    pub fn new(feed: ChartFeed, anomalies: AnomalyLog, aggregator: StatusAggregator) -> Self {
        Self {
            modules: initial_line(),
            feed,
            anomalies,
            aggregator,
            batches: demo_batches(),
            failures: FailureTracker::default(),
            cycles: 0,
            last_update: None,
            last_verdict: None,
        }
    }

    /// Build the dashboard described by the settings.
    pub fn from_settings(settings: &Settings) -> Result<Self, ConfigurationError> {
        let feed = ChartFeed::from_definitions(settings.monitor.window, &settings.charts)?;
        let anomalies = AnomalyLog::new(settings.monitor.anomaly_log);
        Ok(Self::new(feed, anomalies, StatusAggregator::new())
            .with_failure_threshold(settings.monitor.failure_threshold))
    }

    pub fn with_failure_threshold(mut self, threshold: u32) -> Self {
        self.failures = FailureTracker::new(threshold);
        self
    }

    pub fn with_batches(mut self, batches: Vec<BatchRecord>) -> Self {
        self.batches = batches;
        self
    }

    /// Wrap for sharing with the monitoring loop.
    pub fn shared(self) -> SharedDashboard {
        Arc::new(RwLock::new(self))
    }

    /// Apply one successful cycle's reading.
    pub fn apply(&mut self, reading: &Reading, at: DateTime<Utc>) -> ApplyReport {
        let verdict = reading.verdict.as_ref();
        let mut report = ApplyReport::default();

        for module in self.modules.iter_mut() {
            module.apply_readings(&reading.snapshot);

            let next = self.aggregator.derive(module.name, module.status, verdict);
            if next != module.status {
                info!(module = %module.name, from = %module.status, to = %next, "Module status changed");
                module.status = next;
                report.status_changes += 1;
            }
        }

        report.ingest = self.feed.ingest(&reading.snapshot, at);

        if let Some(verdict) = verdict {
            report.logged = self.anomalies.record(verdict, at);
            if report.logged {
                info!(
                    anomaly = %verdict.anomaly_type,
                    parameter = %verdict.parameter_for_anomaly,
                    severity = %verdict.severity,
                    confidence = verdict.confidence,
                    "Anomaly detected"
                );
            }
        }

        if self.failures.record_success() {
            info!("Telemetry feed recovered");
        }
        self.cycles += 1;
        self.last_update = Some(at);
        self.last_verdict = reading.verdict.clone();
        report
    }

    /// Record a failed cycle; nothing else changes.
    pub fn record_failure(&mut self, err: &RequestFailure) {
        if self.failures.record_failure(err) {
            warn!(
                consecutive = self.failures.consecutive(),
                error = %err,
                "Telemetry feed stalled"
            );
        }
    }

    pub fn modules(&self) -> &[LineModule] {
        &self.modules
    }

    pub fn module(&self, name: ModuleName) -> Option<&LineModule> {
        self.modules.iter().find(|m| m.name == name)
    }

    /// Worst status across the line.
    pub fn overall_status(&self) -> ModuleStatus {
        overall_status(&self.modules)
    }

    pub fn feed(&self) -> &ChartFeed {
        &self.feed
    }

    pub fn anomalies(&self) -> &AnomalyLog {
        &self.anomalies
    }

    pub fn batches(&self) -> &[BatchRecord] {
        &self.batches
    }

    pub fn batch_summary(&self) -> BatchSummary {
        BatchSummary::compute(&self.batches, &self.anomalies)
    }

    pub fn failures(&self) -> &FailureTracker {
        &self.failures
    }

    /// Successful cycles applied so far.
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    pub fn last_update(&self) -> Option<DateTime<Utc>> {
        self.last_update
    }

    pub fn last_verdict(&self) -> Option<&PredictionVerdict> {
        self.last_verdict.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::status::tests::ScriptedRandom;
    use crate::data::ChartDefinition;
    use chrono::TimeZone;
    use linewatch_types::{AnomalyType, TelemetrySnapshot};

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_756_061_100 + secs, 0).unwrap()
    }

    fn dashboard() -> Dashboard {
        let feed = ChartFeed::from_definitions(20, &ChartDefinition::defaults()).unwrap();
        let aggregator = StatusAggregator::with_source(Box::new(ScriptedRandom::default()));
        Dashboard::new(feed, AnomalyLog::default(), aggregator)
    }

    fn reading(verdict: Option<PredictionVerdict>) -> Reading {
        Reading {
            snapshot: TelemetrySnapshot::builder()
                .reading("Mixer/Temperature", 277.0)
                .reading("Mixer/Level", 0.7)
                .reading("DynamicFreezer/Temperature", 291.4)
                .build(),
            verdict,
        }
    }

    #[test]
    fn apply_updates_modules_feed_and_log() {
        let mut dash = dashboard();
        let verdict = PredictionVerdict::new(AnomalyType::Step, "Mixer/Temperature", 0.93);

        let report = dash.apply(&reading(Some(verdict)), at(0));

        assert_eq!(report.status_changes, 1);
        assert!(report.logged);
        assert_eq!(report.ingest.appended, 2);

        let mixer = dash.module(ModuleName::Mixer).unwrap();
        assert_eq!(mixer.status, ModuleStatus::Anomaly);
        assert_eq!(mixer.temperature, 277.0);
        assert_eq!(mixer.level, 0.7);
        assert_eq!(dash.anomalies().len(), 1);
        assert_eq!(dash.cycles(), 1);
        assert_eq!(dash.last_update(), Some(at(0)));
    }

    #[test]
    fn normal_verdict_holds_statuses() {
        let mut dash = dashboard();
        let before: Vec<_> = dash.modules().iter().map(|m| m.status).collect();

        let report = dash.apply(&reading(Some(PredictionVerdict::normal(0.98))), at(0));

        let after: Vec<_> = dash.modules().iter().map(|m| m.status).collect();
        assert_eq!(before, after);
        assert_eq!(report.status_changes, 0);
        assert!(!report.logged);
    }

    #[test]
    fn stall_alert_raised_at_threshold_and_cleared_by_success() {
        let mut dash = dashboard().with_failure_threshold(3);

        dash.record_failure(&RequestFailure::Timeout);
        dash.record_failure(&RequestFailure::Timeout);
        assert!(!dash.failures().is_stalled());

        dash.record_failure(&RequestFailure::Connection("refused".to_string()));
        assert!(dash.failures().is_stalled());
        assert_eq!(dash.failures().last_error(), Some("connection failed: refused"));
        assert_eq!(dash.cycles(), 0);

        dash.apply(&reading(None), at(5));
        assert!(!dash.failures().is_stalled());
        assert_eq!(dash.failures().consecutive(), 0);
        assert_eq!(dash.failures().total(), 3);
    }

    #[test]
    fn failure_tracker_raises_once() {
        let mut tracker = FailureTracker::new(2);
        assert!(!tracker.record_failure(&RequestFailure::Timeout));
        assert!(tracker.record_failure(&RequestFailure::Timeout));
        assert!(!tracker.record_failure(&RequestFailure::Timeout));
        assert!(tracker.record_success());
        assert!(!tracker.record_success());
    }

    #[test]
    fn from_settings_rejects_unknown_chart_module() {
        let mut settings = Settings::default();
        settings.charts = vec![ChartDefinition::new("Broken", &["Churner/Level"])];
        let err = Dashboard::from_settings(&settings).unwrap_err();
        assert_eq!(err, ConfigurationError::UnknownModule("Churner".to_string()));
    }
}
