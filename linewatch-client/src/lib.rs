//! # linewatch-client
//!
//! Async client for the anomaly predictor service that backs the process
//! line dashboard.
//!
//! The service exposes a small JSON API:
//!
//! | Endpoint              | Purpose                                   |
//! |-----------------------|-------------------------------------------|
//! | `GET /health`         | Liveness                                  |
//! | `GET /simulate_data`  | One simulated sensor snapshot             |
//! | `POST /predict`       | Verdict for one snapshot                  |
//! | `POST /batch_predict` | Verdicts for several snapshots            |
//! | `GET /model_info`     | Model metadata                            |
//!
//! Any transport error, non-2xx status or undecodable body is reported as a
//! [`RequestFailure`].
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use linewatch_client::PredictorClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = PredictorClient::builder()
//!         .endpoint("http://localhost:5000")
//!         .build()?;
//!
//!     client.health().await?;
//!     let snapshot = client.simulate_data().await?;
//!     let verdicts = client.predict(&snapshot).await?;
//!
//!     if let Some(verdict) = verdicts.first() {
//!         println!("{} ({:.0}%)", verdict.anomaly_type, verdict.confidence * 100.0);
//!     }
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod predictor;

pub use error::RequestFailure;
pub use predictor::{BatchVerdict, ModelInfo, PredictorClient, PredictorClientBuilder};

// Re-export types for convenience
pub use linewatch_types::{AnomalyType, PredictionVerdict, Severity, TelemetrySnapshot};
