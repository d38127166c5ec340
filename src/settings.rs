//! Layered settings.
//!
//! Values come from, in increasing priority: built-in defaults, an optional
//! TOML file, and `LINEWATCH_*` environment variables. Nested keys use a
//! double underscore, e.g. `LINEWATCH_PREDICTOR__ENDPOINT` or
//! `LINEWATCH_MONITOR__INTERVAL=2s`.
//!
//! ```toml
//! [predictor]
//! endpoint = "http://predictor.local:5000"
//! timeout = "3s"
//!
//! [monitor]
//! interval = "5s"
//! failure_threshold = 3
//! window = 20
//! anomaly_log = 50
//!
//! [[charts]]
//! title = "Freezer"
//! series = ["DynamicFreezer/Temperature", "DynamicFreezer/Level"]
//! ```

use std::path::Path;
use std::time::Duration;

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::data::duration::parse_duration;
use crate::data::{ChartDefinition, DEFAULT_LOG_CAPACITY, DEFAULT_WINDOW};
use crate::dashboard::DEFAULT_FAILURE_THRESHOLD;
use crate::error::ConfigurationError;

const ENV_PREFIX: &str = "LINEWATCH";

/// Predictor service connection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PredictorSettings {
    pub endpoint: String,
    /// Request timeout, e.g. "10s".
    pub timeout: String,
}

impl Default for PredictorSettings {
    fn default() -> Self {
        Self {
            endpoint: linewatch_client::predictor::DEFAULT_ENDPOINT.to_string(),
            timeout: "10s".to_string(),
        }
    }
}

/// Polling behaviour and retention.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorSettings {
    /// Time between cycle starts, e.g. "5s".
    pub interval: String,
    /// Consecutive failed cycles before the feed is flagged as stalled.
    pub failure_threshold: u32,
    /// Points kept per chart series.
    pub window: usize,
    /// Entries kept in the anomaly log.
    pub anomaly_log: usize,
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self {
            interval: "5s".to_string(),
            failure_threshold: DEFAULT_FAILURE_THRESHOLD,
            window: DEFAULT_WINDOW,
            anomaly_log: DEFAULT_LOG_CAPACITY,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub predictor: PredictorSettings,
    pub monitor: MonitorSettings,
    pub charts: Vec<ChartDefinition>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            predictor: PredictorSettings::default(),
            monitor: MonitorSettings::default(),
            charts: ChartDefinition::defaults(),
        }
    }
}

impl Settings {
    /// Load defaults, then the file (if given), then the environment.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigurationError> {
        Self::load_from(path, environment())
    }

    fn load_from(path: Option<&Path>, env: Environment) -> Result<Self, ConfigurationError> {
        let mut builder = Config::builder().add_source(Config::try_from(&Settings::default())?);
        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(true));
        }

        let settings: Settings = builder.add_source(env).build()?.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Check values that deserialize fine but make no sense.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.interval()?.is_zero() {
            return Err(ConfigurationError::Settings("monitor.interval must be positive".into()));
        }
        if self.predictor_timeout()?.is_zero() {
            return Err(ConfigurationError::Settings("predictor.timeout must be positive".into()));
        }
        if self.monitor.window == 0 {
            return Err(ConfigurationError::Settings("monitor.window must be at least 1".into()));
        }
        if self.monitor.anomaly_log == 0 {
            return Err(ConfigurationError::Settings(
                "monitor.anomaly_log must be at least 1".into(),
            ));
        }
        if self.monitor.failure_threshold == 0 {
            return Err(ConfigurationError::Settings(
                "monitor.failure_threshold must be at least 1".into(),
            ));
        }
        for chart in &self.charts {
            for series in &chart.series {
                series.parse::<crate::data::SeriesKey>()?;
            }
        }
        Ok(())
    }

    pub fn interval(&self) -> Result<Duration, ConfigurationError> {
        parse_duration(&self.monitor.interval)
    }

    pub fn predictor_timeout(&self) -> Result<Duration, ConfigurationError> {
        parse_duration(&self.predictor.timeout)
    }
}

fn environment() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator("__")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn env(vars: &[(&str, &str)]) -> Environment {
        let map: HashMap<String, String> =
            vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        environment().source(Some(map))
    }

    fn toml_file(contents: &str) -> NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn defaults_without_sources() {
        let settings = Settings::load_from(None, env(&[])).unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.interval().unwrap(), Duration::from_secs(5));
        assert_eq!(settings.predictor_timeout().unwrap(), Duration::from_secs(10));
        assert_eq!(settings.charts.len(), 2);
    }

    #[test]
    fn file_overrides_defaults() {
        let file = toml_file(
            r#"
            [monitor]
            interval = "500ms"
            window = 5

            [[charts]]
            title = "Freezer"
            series = ["DynamicFreezer/Temperature"]
            "#,
        );

        let settings = Settings::load_from(Some(file.path()), env(&[])).unwrap();
        assert_eq!(settings.interval().unwrap(), Duration::from_millis(500));
        assert_eq!(settings.monitor.window, 5);
        assert_eq!(settings.monitor.anomaly_log, 50);
        assert_eq!(settings.charts, vec![ChartDefinition::new("Freezer", &["DynamicFreezer/Temperature"])]);
    }

    #[test]
    fn environment_overrides_file() {
        let file = toml_file("[predictor]\nendpoint = \"http://file:5000\"\n");
        let settings = Settings::load_from(
            Some(file.path()),
            env(&[("LINEWATCH_PREDICTOR__ENDPOINT", "http://env:5000")]),
        )
        .unwrap();
        assert_eq!(settings.predictor.endpoint, "http://env:5000");
    }

    #[test]
    fn missing_file_is_an_error() {
        let result = Settings::load_from(Some(Path::new("/nonexistent/linewatch.toml")), env(&[]));
        assert!(matches!(result, Err(ConfigurationError::Settings(_))));
    }

    #[test]
    fn invalid_values_are_rejected() {
        let file = toml_file("[monitor]\ninterval = \"0s\"\n");
        assert!(Settings::load_from(Some(file.path()), env(&[])).is_err());

        let mut settings = Settings::default();
        settings.charts = vec![ChartDefinition::new("Bad", &["Mixer"])];
        assert_eq!(
            settings.validate(),
            Err(ConfigurationError::InvalidSeriesKey("Mixer".to_string()))
        );
    }
}
