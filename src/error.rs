//! Error types for the monitoring core.
//!
//! Request failures come from the predictor client and are recovered by
//! skipping a cycle. The two kinds here are not recoverable at runtime:
//! a configuration error means the dashboard was set up wrong, a startup
//! failure means the predictor never answered the first health check.

use thiserror::Error;

use linewatch_types::UnknownModule;

pub use linewatch_client::RequestFailure;

/// A defect in how the dashboard was configured.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConfigurationError {
    /// A module name outside the fixed set.
    #[error("unknown module: {0}")]
    UnknownModule(String),

    /// A series key that is not `<Module>/<Parameter>`.
    #[error("invalid series key '{0}', expected <Module>/<Parameter>")]
    InvalidSeriesKey(String),

    /// Settings could not be loaded or failed validation.
    #[error("invalid settings: {0}")]
    Settings(String),
}

impl From<UnknownModule> for ConfigurationError {
    fn from(err: UnknownModule) -> Self {
        ConfigurationError::UnknownModule(err.0)
    }
}

impl From<config::ConfigError> for ConfigurationError {
    fn from(err: config::ConfigError) -> Self {
        ConfigurationError::Settings(err.to_string())
    }
}

/// The monitoring loop could not be brought up.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum StartupFailure {
    /// The telemetry source did not pass its initial health check.
    #[error("health check failed: {0}")]
    HealthCheck(#[source] RequestFailure),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_module_converts() {
        let err: ConfigurationError = "Blender".parse::<linewatch_types::ModuleName>().unwrap_err().into();
        assert_eq!(err, ConfigurationError::UnknownModule("Blender".to_string()));
    }

    #[test]
    fn startup_failure_keeps_cause() {
        let err = StartupFailure::HealthCheck(RequestFailure::Timeout);
        assert_eq!(err.to_string(), "health check failed: request timed out");
    }
}
