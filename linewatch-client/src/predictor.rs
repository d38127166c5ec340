//! Predictor service client.
//!
//! ## Example
//!
//! ```rust,no_run
//! use linewatch_client::PredictorClient;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = PredictorClient::builder()
//!         .endpoint("http://predictor.local:5000")
//!         .timeout(Duration::from_secs(3))
//!         .build()?;
//!
//!     let info = client.model_info().await?;
//!     println!("model loaded: {}, {} features", info.model_loaded, info.feature_count);
//!     Ok(())
//! }
//! ```

use std::collections::BTreeMap;
use std::time::Duration;

use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use linewatch_types::{AnomalyType, PredictionVerdict, Severity, TelemetrySnapshot};

use crate::RequestFailure;

/// Default service endpoint.
pub const DEFAULT_ENDPOINT: &str = "http://localhost:5000";

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Client for the anomaly predictor HTTP API.
#[derive(Debug, Clone)]
pub struct PredictorClient {
    client: Client,
    endpoint: String,
}

impl PredictorClient {
    /// Create a new builder for configuring the client.
    pub fn builder() -> PredictorClientBuilder {
        PredictorClientBuilder::default()
    }

    /// The base URL requests are sent to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Check service liveness. Any 2xx answer counts as healthy.
    pub async fn health(&self) -> Result<(), RequestFailure> {
        let response = self.client.get(self.url("/health")).send().await?;
        check_status(response).await.map(|_| ())
    }

    /// Fetch one simulated sensor snapshot.
    ///
    /// Non-numeric readings are dropped; booleans become 0/1.
    pub async fn simulate_data(&self) -> Result<TelemetrySnapshot, RequestFailure> {
        let body: SimulateResponse = self.get_json("/simulate_data").await?;
        Ok(snapshot_from_values(body.simulated_data))
    }

    /// Ask for a verdict on one snapshot.
    ///
    /// The service answers with a list; callers normally use the first entry.
    pub async fn predict(
        &self,
        snapshot: &TelemetrySnapshot,
    ) -> Result<Vec<PredictionVerdict>, RequestFailure> {
        let body: PredictResponse = self.post_json("/predict", snapshot).await?;
        Ok(body.predictions.into_iter().map(PredictionVerdict::from).collect())
    }

    /// Ask for verdicts on several snapshots at once.
    pub async fn batch_predict(
        &self,
        batch: &[TelemetrySnapshot],
    ) -> Result<Vec<BatchVerdict>, RequestFailure> {
        let request = BatchRequest { batch_data: batch };
        let body: BatchResponse = self.post_json("/batch_predict", &request).await?;
        Ok(body
            .batch_predictions
            .into_iter()
            .map(|row| BatchVerdict {
                row_id: row.row_id,
                verdict: row.verdict.into(),
            })
            .collect())
    }

    /// Fetch descriptive model metadata.
    pub async fn model_info(&self) -> Result<ModelInfo, RequestFailure> {
        self.get_json("/model_info").await
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.endpoint, path)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, RequestFailure> {
        let response = self.client.get(self.url(path)).send().await?;
        read_json(response).await
    }

    async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, RequestFailure>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self.client.post(self.url(path)).json(body).send().await?;
        read_json(response).await
    }
}

/// Builder for PredictorClient.
#[derive(Debug, Default)]
pub struct PredictorClientBuilder {
    endpoint: Option<String>,
    timeout: Option<Duration>,
}

impl PredictorClientBuilder {
    /// Set the service endpoint (e.g., "http://localhost:5000").
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Set the request timeout (default: 10 seconds).
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Build the client.
    pub fn build(self) -> Result<PredictorClient, RequestFailure> {
        let client = Client::builder()
            .timeout(self.timeout.unwrap_or(DEFAULT_TIMEOUT))
            .build()?;

        let endpoint = self.endpoint.unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());

        Ok(PredictorClient {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
        })
    }
}

/// A verdict for one row of a batch request.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchVerdict {
    /// Index of the snapshot in the request.
    pub row_id: usize,
    pub verdict: PredictionVerdict,
}

/// Model metadata from `/model_info`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelInfo {
    #[serde(default)]
    pub model_loaded: bool,
    #[serde(default)]
    pub feature_count: usize,
    #[serde(default)]
    pub anomaly_types: Vec<String>,
    #[serde(default)]
    pub feature_columns: Vec<String>,
}

async fn check_status(response: Response) -> Result<Response, RequestFailure> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    // Error bodies look like {"error": "..."}; fall back to the raw text.
    let text = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&text)
        .map(|b| b.error)
        .unwrap_or(text);

    Err(RequestFailure::Status {
        status: status.as_u16(),
        message,
    })
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, RequestFailure> {
    let response = check_status(response).await?;
    let bytes = response.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
}

fn snapshot_from_values(values: BTreeMap<String, serde_json::Value>) -> TelemetrySnapshot {
    values
        .into_iter()
        .filter_map(|(key, value)| {
            let reading = match value {
                serde_json::Value::Number(n) => n.as_f64()?,
                serde_json::Value::Bool(b) => f64::from(u8::from(b)),
                _ => return None,
            };
            Some((key, reading))
        })
        .collect()
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

#[derive(Debug, Deserialize)]
struct SimulateResponse {
    simulated_data: BTreeMap<String, serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct PredictResponse {
    #[serde(default)]
    predictions: Vec<WireVerdict>,
}

#[derive(Debug, Serialize)]
struct BatchRequest<'a> {
    batch_data: &'a [TelemetrySnapshot],
}

#[derive(Debug, Deserialize)]
struct BatchResponse {
    #[serde(default)]
    batch_predictions: Vec<WireBatchRow>,
}

#[derive(Debug, Deserialize)]
struct WireBatchRow {
    #[serde(default)]
    row_id: usize,
    #[serde(flatten)]
    verdict: WireVerdict,
}

/// A verdict as the service sends it; severity is optional on the wire.
#[derive(Debug, Deserialize)]
struct WireVerdict {
    anomaly_type: AnomalyType,
    #[serde(default)]
    parameter_for_anomaly: Option<String>,
    #[serde(default)]
    confidence: f64,
    #[serde(default)]
    severity: Option<Severity>,
    #[serde(default)]
    anomaly_code: Option<u32>,
    #[serde(default)]
    all_probabilities: BTreeMap<String, f64>,
    #[serde(default)]
    timestamp: Option<String>,
}

impl From<WireVerdict> for PredictionVerdict {
    fn from(wire: WireVerdict) -> Self {
        let parameter = wire.parameter_for_anomaly.unwrap_or_else(|| "Unknown".to_string());
        let mut verdict = PredictionVerdict::new(wire.anomaly_type, parameter, wire.confidence);
        if let Some(severity) = wire.severity {
            verdict.severity = severity;
        }
        verdict.anomaly_code = wire.anomaly_code;
        verdict.all_probabilities = wire.all_probabilities;
        verdict.timestamp = wire.timestamp;
        verdict
    }
}
