//! # linewatch
//!
//! A terminal dashboard and library for watching a process line's
//! telemetry and the anomaly predictor's verdicts on it.
//!
//! Every cycle, the monitoring loop fetches a sensor snapshot, asks the
//! predictor service for a verdict, and folds both into the dashboard:
//! module readings, per-module status, rolling chart series and the
//! anomaly log.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                         Application                          │
//! │  ┌─────────┐    ┌───────────┐    ┌─────────┐    ┌──────────┐ │
//! │  │   app   │───▶│ dashboard │───▶│   ui    │───▶│ Terminal │ │
//! │  │ (state) │    │  + data   │    │(render) │    │          │ │
//! │  └────┬────┘    └─────▲─────┘    └─────────┘    └──────────┘ │
//! │       │               │                                      │
//! │       ▼               │                                      │
//! │  ┌─────────┐    ┌─────┴─────┐                                │
//! │  │ monitor │───▶│  source   │◀── PredictorSource | DemoSource │
//! │  │ (loop)  │    │  (input)  │                                │
//! │  └─────────┘    └───────────┘                                │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! - **[`monitor`]**: [`MonitoringLoop`], the fixed-interval polling task
//! - **[`source`]**: where readings come from ([`TelemetrySource`] trait)
//! - **[`dashboard`]**: [`Dashboard`], the shared state every cycle updates
//! - **[`data`]**: series buffers, chart feed, status derivation, anomaly
//!   log, batches and exports
//! - **[`settings`]**: layered configuration
//! - **[`app`]**, **[`events`]**, **[`ui`]**: the terminal interface
//!
//! ## Usage
//!
//! ### As a CLI tool
//!
//! ```bash
//! # Watch the predictor service at its default address
//! linewatch
//!
//! # Offline, with the built-in simulator
//! linewatch --demo
//!
//! # Run three cycles and write the anomaly report
//! linewatch --demo --cycles 3 --export anomaly_report.csv --report anomaly
//! ```
//!
//! ### As a library
//!
//! ```
//! use linewatch::{Dashboard, DemoSource, MonitoringLoop, Settings};
//!
//! # tokio_test::block_on(async {
//! let dashboard = Dashboard::from_settings(&Settings::default()).unwrap().shared();
//! let monitor = MonitoringLoop::new(Box::new(DemoSource::seeded(1)), dashboard.clone());
//!
//! assert!(monitor.run_cycle().await.is_applied());
//! assert_eq!(dashboard.read().cycles(), 1);
//! # });
//! ```

pub mod app;
pub mod dashboard;
pub mod data;
pub mod error;
pub mod events;
pub mod monitor;
pub mod settings;
pub mod source;
pub mod ui;

pub use app::{App, View};
pub use dashboard::{ApplyReport, Dashboard, FailureTracker, SharedDashboard};
pub use data::{
    AnomalyLog, AnomalyLogEntry, BatchRecord, BatchSummary, ChartDefinition, ChartFeed, ChartView,
    LineChart, LineModule, ReportKind, SeriesBuffer, SeriesKey, StateExport, StatusAggregator,
};
pub use error::{ConfigurationError, RequestFailure, StartupFailure};
pub use monitor::{CycleOutcome, LoopState, MonitoringLoop};
pub use settings::Settings;
pub use source::{DemoSource, PredictorSource, Reading, TelemetrySource};

pub use linewatch_types::{
    AnomalyType, ModuleName, ModuleStatus, PredictionVerdict, Severity, TelemetrySnapshot,
};
