//! Telemetry source abstraction.
//!
//! A source produces one [`Reading`] per monitoring cycle: the sensor
//! snapshot plus the predictor's verdict on it, if any.
//!
//! - [`PredictorSource`]: the predictor service (`/simulate_data` then `/predict`)
//! - [`DemoSource`]: an offline simulator for running without the service

mod demo;
mod predictor;

pub use demo::DemoSource;
pub use predictor::PredictorSource;

use std::fmt::Debug;

use async_trait::async_trait;

use linewatch_types::{PredictionVerdict, TelemetrySnapshot};

use crate::error::RequestFailure;

/// One cycle's worth of telemetry.
#[derive(Debug, Clone, PartialEq)]
pub struct Reading {
    pub snapshot: TelemetrySnapshot,
    pub verdict: Option<PredictionVerdict>,
}

impl Reading {
    pub fn new(snapshot: TelemetrySnapshot, verdict: Option<PredictionVerdict>) -> Self {
        Self { snapshot, verdict }
    }
}

/// Where the monitoring loop gets its readings.
///
/// # Example
///
/// ```
/// use linewatch::{DemoSource, TelemetrySource};
///
/// # tokio_test::block_on(async {
/// let mut source = DemoSource::seeded(7);
/// source.health().await.unwrap();
/// let reading = source.fetch().await.unwrap();
/// assert!(reading.snapshot.contains("Mixer/Temperature"));
/// # });
/// ```
#[async_trait]
pub trait TelemetrySource: Send + Debug {
    /// Check that the source is reachable.
    async fn health(&mut self) -> Result<(), RequestFailure>;

    /// Fetch the next reading.
    async fn fetch(&mut self) -> Result<Reading, RequestFailure>;

    /// Returns a human-readable description of the source.
    ///
    /// Used for display in the TUI status bar.
    fn description(&self) -> &str;
}
