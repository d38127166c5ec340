//! JSON state export and CSV reports.

use std::borrow::Cow;
use std::fmt::{self, Write as _};
use std::path::Path;
use std::str::FromStr;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;

use linewatch_types::ModuleStatus;

use super::{AnomalyLogEntry, BatchSummary, LineModule};
use crate::dashboard::Dashboard;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// The CSV reports the dashboard can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportKind {
    /// Logged anomalies.
    Anomaly,
    /// Batch records.
    Production,
    /// Current module readings.
    Quality,
}

impl ReportKind {
    pub const ALL: [ReportKind; 3] = [ReportKind::Anomaly, ReportKind::Production, ReportKind::Quality];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReportKind::Anomaly => "anomaly",
            ReportKind::Production => "production",
            ReportKind::Quality => "quality",
        }
    }

    /// Suggested file name, e.g. `anomaly_report.csv`.
    pub fn file_name(&self) -> String {
        format!("{}_report.csv", self.as_str())
    }

    fn header(&self) -> &'static str {
        match self {
            ReportKind::Anomaly => "Timestamp,Type,Module,Parameter,Severity",
            ReportKind::Production => "BatchID,Quality,Anomalies,Status",
            ReportKind::Quality => "Module,Temperature,Level,Status",
        }
    }

    /// Render the report for the dashboard's current state.
    pub fn render(&self, dashboard: &Dashboard) -> String {
        let mut out = String::new();
        out.push_str(self.header());
        out.push('\n');

        // Writing to a String cannot fail.
        match self {
            ReportKind::Anomaly => {
                for entry in dashboard.anomalies().recent() {
                    let module = entry.module().map(|m| m.as_str()).unwrap_or("Unknown");
                    let _ = writeln!(
                        out,
                        "{},{},{},{},{}",
                        entry.timestamp.format(TIMESTAMP_FORMAT),
                        entry.anomaly_type,
                        module,
                        csv_field(entry.parameter_name()),
                        entry.severity
                    );
                }
            }
            ReportKind::Production => {
                for batch in dashboard.batches() {
                    let _ = writeln!(
                        out,
                        "{},{},{},{}",
                        csv_field(&batch.id),
                        batch.quality,
                        batch.anomalies,
                        batch.grade.as_str()
                    );
                }
            }
            ReportKind::Quality => {
                for module in dashboard.modules() {
                    let _ = writeln!(
                        out,
                        "{},{:.2},{:.2},{}",
                        module.name, module.temperature, module.level, module.status
                    );
                }
            }
        }
        out
    }

    /// Render and write the report to `path`.
    pub fn write(&self, dashboard: &Dashboard, path: &Path) -> Result<()> {
        std::fs::write(path, self.render(dashboard))
            .with_context(|| format!("Failed to write {} report to {}", self, path.display()))
    }
}

/// Quote a field holding a comma, quote or line break; inner quotes double.
fn csv_field(value: &str) -> Cow<'_, str> {
    if value.contains([',', '"', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", value.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(value)
    }
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        ReportKind::ALL
            .into_iter()
            .find(|k| k.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown report kind '{s}' (expected anomaly, production or quality)"))
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ExportSummary {
    pub total_modules: usize,
    pub normal: usize,
    pub warning: usize,
    pub anomaly: usize,
    pub overall: ModuleStatus,
    pub cycles: u64,
    pub failed_cycles: u64,
    pub stalled: bool,
    pub anomalies_logged: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExportPoint {
    pub timestamp: DateTime<Utc>,
    pub value: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExportSeries {
    pub key: String,
    pub points: Vec<ExportPoint>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExportChart {
    pub title: String,
    pub series: Vec<ExportSeries>,
}

/// Point-in-time copy of the dashboard, serialized as the JSON export.
#[derive(Debug, Clone, Serialize)]
pub struct StateExport {
    pub exported_at: DateTime<Utc>,
    pub summary: ExportSummary,
    pub modules: Vec<LineModule>,
    pub charts: Vec<ExportChart>,
    /// Newest first.
    pub anomalies: Vec<AnomalyLogEntry>,
    pub batches: BatchSummary,
}

impl StateExport {
    pub fn capture(dashboard: &Dashboard, at: DateTime<Utc>) -> Self {
        let modules = dashboard.modules().to_vec();
        let count = |status: ModuleStatus| modules.iter().filter(|m| m.status == status).count();

        let summary = ExportSummary {
            total_modules: modules.len(),
            normal: count(ModuleStatus::Normal),
            warning: count(ModuleStatus::Warning),
            anomaly: count(ModuleStatus::Anomaly),
            overall: dashboard.overall_status(),
            cycles: dashboard.cycles(),
            failed_cycles: dashboard.failures().total(),
            stalled: dashboard.failures().is_stalled(),
            anomalies_logged: dashboard.anomalies().len(),
        };

        let feed = dashboard.feed();
        let charts = feed
            .views()
            .iter()
            .map(|view| ExportChart {
                title: view.title().to_string(),
                series: view
                    .series()
                    .iter()
                    .map(|key| ExportSeries {
                        key: key.to_string(),
                        points: feed
                            .buffer(key)
                            .map(|b| {
                                b.points()
                                    .map(|(timestamp, value)| ExportPoint { timestamp, value })
                                    .collect()
                            })
                            .unwrap_or_default(),
                    })
                    .collect(),
            })
            .collect();

        Self {
            exported_at: at,
            summary,
            modules,
            charts,
            anomalies: dashboard.anomalies().recent().cloned().collect(),
            batches: dashboard.batch_summary(),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Failed to serialize dashboard state")
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.to_json()?)
            .with_context(|| format!("Failed to write export to {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::status::tests::ScriptedRandom;
    use crate::data::{AnomalyLog, ChartDefinition, ChartFeed, StatusAggregator};
    use crate::source::Reading;
    use chrono::TimeZone;
    use linewatch_types::{AnomalyType, PredictionVerdict, TelemetrySnapshot};

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 8, 24, 18, 45, 32).unwrap() + chrono::Duration::seconds(secs)
    }

    fn dashboard_with_anomaly() -> Dashboard {
        let feed = ChartFeed::from_definitions(20, &ChartDefinition::defaults()).unwrap();
        let aggregator = StatusAggregator::with_source(Box::new(ScriptedRandom::default()));
        let mut dashboard = Dashboard::new(feed, AnomalyLog::default(), aggregator);

        let reading = Reading {
            snapshot: TelemetrySnapshot::builder()
                .reading("DynamicFreezer/Temperature", 291.2)
                .reading("Mixer/Temperature", 276.4)
                .build(),
            verdict: Some(PredictionVerdict::new(AnomalyType::Step, "DynamicFreezer/Temperature", 0.95)),
        };
        dashboard.apply(&reading, at(0));
        dashboard
    }

    #[test]
    fn anomaly_csv_matches_report_layout() {
        let csv = ReportKind::Anomaly.render(&dashboard_with_anomaly());
        assert_eq!(
            csv,
            "Timestamp,Type,Module,Parameter,Severity\n\
             2025-08-24 18:45:32,Step,DynamicFreezer,Temperature,High\n"
        );
    }

    #[test]
    fn anomaly_csv_quotes_awkward_parameters() {
        let mut dashboard = dashboard_with_anomaly();
        let verdict = PredictionVerdict::new(AnomalyType::Ramp, "Mixer/Valve \"A\", inlet", 0.75);
        dashboard.apply(&Reading::new(TelemetrySnapshot::default(), Some(verdict)), at(5));

        let csv = ReportKind::Anomaly.render(&dashboard);
        let lines: Vec<_> = csv.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1], "2025-08-24 18:45:37,Ramp,Mixer,\"Valve \"\"A\"\", inlet\",Medium");
    }

    #[test]
    fn csv_field_leaves_plain_values() {
        assert_eq!(csv_field("Temperature"), "Temperature");
        assert_eq!(csv_field("a,b"), "\"a,b\"");
        assert_eq!(csv_field("two\nlines"), "\"two\nlines\"");
    }

    #[test]
    fn production_csv_lists_batches() {
        let csv = ReportKind::Production.render(&dashboard_with_anomaly());
        let lines: Vec<_> = csv.lines().collect();
        assert_eq!(lines[0], "BatchID,Quality,Anomalies,Status");
        assert_eq!(lines[2], "B002,87.3,2,Fair");
        assert_eq!(lines.len(), 4);
    }

    #[test]
    fn quality_csv_has_one_row_per_module() {
        let csv = ReportKind::Quality.render(&dashboard_with_anomaly());
        let lines: Vec<_> = csv.lines().collect();
        assert_eq!(lines.len(), 7);
        assert_eq!(lines[1], "Mixer,276.40,0.85,normal");
        assert!(lines[5].starts_with("DynamicFreezer,291.20,"));
        assert!(lines[5].ends_with(",anomaly"));
    }

    #[test]
    fn report_kind_parses_case_insensitively() {
        assert_eq!("Quality".parse::<ReportKind>(), Ok(ReportKind::Quality));
        assert!("weekly".parse::<ReportKind>().is_err());
        assert_eq!(ReportKind::Anomaly.file_name(), "anomaly_report.csv");
    }

    #[test]
    fn json_export_round_trips_through_file() {
        let dashboard = dashboard_with_anomaly();
        let export = StateExport::capture(&dashboard, at(10));

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        export.write(&path).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["summary"]["total_modules"], 6);
        assert_eq!(value["summary"]["overall"], "anomaly");
        assert_eq!(value["summary"]["cycles"], 1);
        assert_eq!(value["charts"][0]["title"], "Temperature");
        assert_eq!(value["charts"][0]["series"][0]["points"][0]["value"], 276.4);
        assert_eq!(value["anomalies"][0]["parameter"], "DynamicFreezer/Temperature");
        assert_eq!(value["batches"]["most_affected_module"], "DynamicFreezer");
    }

    #[test]
    fn csv_write_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(ReportKind::Production.file_name());
        ReportKind::Production.write(&dashboard_with_anomaly(), &path).unwrap();
        assert!(std::fs::read_to_string(path).unwrap().starts_with("BatchID"));
    }
}
