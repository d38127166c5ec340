//! The monitoring loop.
//!
//! A single background task fetches one reading per interval and applies it
//! to the shared dashboard. Cycles never overlap: the source sits behind an
//! async mutex that is held until the reading has been applied, so a manual
//! cycle or a restarted loop waits for a finishing one.
//!
//! ```text
//!          start()               stop()
//!   Idle ──────────▶ Polling ──────────▶ Stopped
//!                       ▲                   │
//!                       └───── start() ─────┘
//! ```

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::dashboard::{ApplyReport, SharedDashboard};
use crate::error::{RequestFailure, StartupFailure};
use crate::source::TelemetrySource;

/// Default time between cycle starts.
pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(5000);

/// Shortest accepted interval; smaller values are raised to it.
pub const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// Lifecycle of the monitoring loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoopState {
    #[default]
    Idle,
    Polling,
    Stopped,
}

impl LoopState {
    pub fn label(&self) -> &'static str {
        match self {
            LoopState::Idle => "idle",
            LoopState::Polling => "polling",
            LoopState::Stopped => "stopped",
        }
    }
}

impl fmt::Display for LoopState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Result of one cycle.
#[derive(Debug, Clone, PartialEq)]
pub enum CycleOutcome {
    Applied(ApplyReport),
    /// The fetch failed; the dashboard only recorded the failure.
    Skipped(RequestFailure),
}

impl CycleOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, CycleOutcome::Applied(_))
    }
}

/// Everything a cycle touches. Cheap to clone into the background task.
#[derive(Clone)]
struct Cycle {
    source: Arc<Mutex<Box<dyn TelemetrySource>>>,
    dashboard: SharedDashboard,
}

impl Cycle {
    async fn run(&self) -> CycleOutcome {
        let mut source = self.source.lock().await;
        let result = source.fetch().await;
        let at = Utc::now();

        // The source guard stays alive until the dashboard is updated.
        let outcome = match result {
            Ok(reading) => {
                let report = self.dashboard.write().apply(&reading, at);
                debug!(
                    appended = report.ingest.appended,
                    skipped = report.ingest.skipped,
                    status_changes = report.status_changes,
                    "Cycle applied"
                );
                CycleOutcome::Applied(report)
            }
            Err(err) => {
                warn!(error = %err, "Telemetry fetch failed, skipping cycle");
                self.dashboard.write().record_failure(&err);
                CycleOutcome::Skipped(err)
            }
        };
        drop(source);
        outcome
    }
}

/// Polls a [`TelemetrySource`] on a fixed interval.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use linewatch::{Dashboard, DemoSource, MonitoringLoop, Settings};
///
/// # tokio_test::block_on(async {
/// let dashboard = Dashboard::from_settings(&Settings::default()).unwrap().shared();
/// let mut monitor = MonitoringLoop::new(Box::new(DemoSource::seeded(1)), dashboard.clone())
///     .with_interval(Duration::from_secs(5));
///
/// monitor.run_cycle().await;
/// assert_eq!(dashboard.read().cycles(), 1);
/// # });
/// ```
pub struct MonitoringLoop {
    state: LoopState,
    cycle: Cycle,
    interval: Duration,
    description: String,
    stop_tx: Option<watch::Sender<bool>>,
}

impl fmt::Debug for MonitoringLoop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MonitoringLoop")
            .field("state", &self.state)
            .field("interval", &self.interval)
            .field("source", &self.description)
            .finish()
    }
}

impl MonitoringLoop {
    pub fn new(source: Box<dyn TelemetrySource>, dashboard: SharedDashboard) -> Self {
        let description = source.description().to_string();
        Self {
            state: LoopState::Idle,
            cycle: Cycle {
                source: Arc::new(Mutex::new(source)),
                dashboard,
            },
            interval: DEFAULT_INTERVAL,
            description,
            stop_tx: None,
        }
    }

    /// Set the time between cycle starts, at least [`MIN_INTERVAL`].
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval.max(MIN_INTERVAL);
        self
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn dashboard(&self) -> &SharedDashboard {
        &self.cycle.dashboard
    }

    pub fn source_description(&self) -> &str {
        &self.description
    }

    /// Begin polling.
    ///
    /// The first start from `Idle` checks the source's health and stays
    /// `Idle` if that fails. Starting while already polling does nothing.
    pub async fn start(&mut self) -> Result<(), StartupFailure> {
        match self.state {
            LoopState::Polling => return Ok(()),
            LoopState::Idle => self.check_health().await?,
            LoopState::Stopped => {}
        }

        let (stop_tx, mut stop_rx) = watch::channel(false);
        let cycle = self.cycle.clone();
        let period = self.interval;

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {}
                    changed = stop_rx.changed() => {
                        if changed.is_err() || *stop_rx.borrow() {
                            break;
                        }
                        continue;
                    }
                }

                if *stop_rx.borrow() {
                    break;
                }
                // Not raced against the stop signal: an in-flight cycle completes.
                cycle.run().await;
            }
            debug!("Monitoring task exited");
        });

        self.stop_tx = Some(stop_tx);
        self.state = LoopState::Polling;
        info!(source = %self.description, interval = ?self.interval, "Monitoring started");
        Ok(())
    }

    /// Ask the source whether it is reachable.
    pub async fn check_health(&self) -> Result<(), StartupFailure> {
        let mut source = self.cycle.source.lock().await;
        source.health().await.map_err(|err| {
            warn!(source = %self.description, error = %err, "Health check failed");
            StartupFailure::HealthCheck(err)
        })
    }

    /// Stop scheduling cycles. A cycle already running still completes.
    pub fn stop(&mut self) {
        if self.state != LoopState::Polling {
            return;
        }
        if let Some(stop_tx) = self.stop_tx.take() {
            let _ = stop_tx.send(true);
        }
        self.state = LoopState::Stopped;
        info!("Monitoring stopped");
    }

    /// Run one cycle now, independent of the schedule.
    pub async fn run_cycle(&self) -> CycleOutcome {
        self.cycle.run().await
    }

    /// Run one cycle in the background. Must be called within a tokio runtime.
    pub fn spawn_cycle(&self) -> JoinHandle<CycleOutcome> {
        let cycle = self.cycle.clone();
        tokio::spawn(async move { cycle.run().await })
    }
}

impl Drop for MonitoringLoop {
    fn drop(&mut self) {
        if let Some(stop_tx) = self.stop_tx.take() {
            let _ = stop_tx.send(true);
        }
    }
}
