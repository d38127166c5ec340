//! Readings from the predictor service.

use async_trait::async_trait;
use tracing::debug;

use linewatch_client::PredictorClient;

use super::{Reading, TelemetrySource};
use crate::error::RequestFailure;

/// Polls the predictor: one simulated snapshot, then a verdict on it.
#[derive(Debug, Clone)]
pub struct PredictorSource {
    client: PredictorClient,
    description: String,
}

impl PredictorSource {
    pub fn new(client: PredictorClient) -> Self {
        let description = format!("predictor: {}", client.endpoint());
        Self {
            client,
            description,
        }
    }

    pub fn client(&self) -> &PredictorClient {
        &self.client
    }
}

#[async_trait]
impl TelemetrySource for PredictorSource {
    async fn health(&mut self) -> Result<(), RequestFailure> {
        self.client.health().await
    }

    async fn fetch(&mut self) -> Result<Reading, RequestFailure> {
        let snapshot = self.client.simulate_data().await?;
        let verdicts = self.client.predict(&snapshot).await?;
        debug!(readings = snapshot.len(), verdicts = verdicts.len(), "Fetched predictor reading");

        // The service answers one verdict per submitted snapshot.
        let verdict = verdicts.into_iter().next();
        Ok(Reading::new(snapshot, verdict))
    }

    fn description(&self) -> &str {
        &self.description
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::Method::{GET, POST};
    use httpmock::MockServer;
    use linewatch_types::AnomalyType;
    use serde_json::{json, Value};

    fn source_for(server: &MockServer) -> PredictorSource {
        let client = PredictorClient::builder().endpoint(server.base_url()).build().unwrap();
        PredictorSource::new(client)
    }

    async fn mock_simulate(server: &MockServer) -> httpmock::Mock<'_> {
        server
            .mock_async(|when, then| {
                when.method(GET).path("/simulate_data");
                then.status(200).json_body(json!({
                    "simulated_data": {
                        "Mixer/Temperature": 276.9,
                        "Mixer/Level": 0.6,
                        "Timestamp": "2025-08-24T18:45:32"
                    }
                }));
            })
            .await
    }

    async fn mock_predict(server: &MockServer, status: u16, body: Value) -> httpmock::Mock<'_> {
        server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/predict")
                    .json_body(json!({"Mixer/Level": 0.6, "Mixer/Temperature": 276.9}));
                then.status(status).json_body(body);
            })
            .await
    }

    #[tokio::test]
    async fn fetch_predicts_on_the_simulated_snapshot() {
        let server = MockServer::start_async().await;
        let simulate = mock_simulate(&server).await;
        let predict = mock_predict(
            &server,
            200,
            json!({"predictions": [{"anomaly_type": "Normal", "confidence": 0.97,
                                    "parameter_for_anomaly": "No Anomaly"}]}),
        )
        .await;

        let mut source = source_for(&server);
        let reading = source.fetch().await.unwrap();

        simulate.assert_async().await;
        predict.assert_async().await;
        assert_eq!(reading.snapshot.len(), 2);
        assert_eq!(reading.snapshot.get("Mixer/Temperature"), Some(276.9));
        assert_eq!(reading.verdict.unwrap().anomaly_type, AnomalyType::Normal);
    }

    #[tokio::test]
    async fn fetch_takes_the_first_verdict() {
        let server = MockServer::start_async().await;
        mock_simulate(&server).await;
        mock_predict(
            &server,
            200,
            json!({"predictions": [
                {"anomaly_type": "Ramp", "confidence": 0.91, "parameter_for_anomaly": "Mixer/Level"},
                {"anomaly_type": "Freeze", "confidence": 0.8, "parameter_for_anomaly": "Mixer/Temperature"}
            ]}),
        )
        .await;

        let reading = source_for(&server).fetch().await.unwrap();

        let verdict = reading.verdict.unwrap();
        assert_eq!(verdict.anomaly_type, AnomalyType::Ramp);
        assert_eq!(verdict.parameter_for_anomaly, "Mixer/Level");
    }

    #[tokio::test]
    async fn empty_predictions_give_no_verdict() {
        let server = MockServer::start_async().await;
        mock_simulate(&server).await;
        mock_predict(&server, 200, json!({"predictions": [], "status": "success"})).await;

        let reading = source_for(&server).fetch().await.unwrap();

        assert_eq!(reading.snapshot.len(), 2);
        assert!(reading.verdict.is_none());
    }

    #[tokio::test]
    async fn predict_failure_fails_the_fetch() {
        let server = MockServer::start_async().await;
        mock_simulate(&server).await;
        mock_predict(&server, 500, json!({"error": "Model not loaded"})).await;

        let err = source_for(&server).fetch().await.unwrap_err();

        assert_eq!(
            err,
            RequestFailure::Status {
                status: 500,
                message: "Model not loaded".to_string()
            }
        );
    }

    #[tokio::test]
    async fn simulate_failure_skips_predict() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/simulate_data");
                then.status(503).body("unavailable");
            })
            .await;
        let predict = mock_predict(&server, 200, json!({"predictions": []})).await;

        let err = source_for(&server).fetch().await.unwrap_err();

        assert!(matches!(err, RequestFailure::Status { status: 503, .. }));
        assert_eq!(predict.hits_async().await, 0);
    }

    #[tokio::test]
    async fn health_and_description_use_the_endpoint() {
        let server = MockServer::start_async().await;
        let health = server
            .mock_async(|when, then| {
                when.method(GET).path("/health");
                then.status(200).json_body(json!({"status": "healthy"}));
            })
            .await;

        let mut source = source_for(&server);
        source.health().await.unwrap();

        health.assert_async().await;
        assert_eq!(source.description(), format!("predictor: {}", server.base_url()));
    }
}
