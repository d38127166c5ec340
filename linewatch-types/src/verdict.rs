//! Anomaly verdicts produced by the external predictor.

use core::fmt;
use std::collections::BTreeMap;

use crate::ModuleName;

/// Classification the predictor assigns to a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AnomalyType {
    #[default]
    Normal,
    /// A signal stuck at a constant value.
    Freeze,
    /// A sudden level shift.
    Step,
    /// A gradual drift.
    Ramp,
}

impl AnomalyType {
    /// All anomaly types, in model class order.
    pub const ALL: [AnomalyType; 4] = [
        AnomalyType::Normal,
        AnomalyType::Freeze,
        AnomalyType::Step,
        AnomalyType::Ramp,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AnomalyType::Normal => "Normal",
            AnomalyType::Freeze => "Freeze",
            AnomalyType::Step => "Step",
            AnomalyType::Ramp => "Ramp",
        }
    }

    pub fn is_anomaly(&self) -> bool {
        *self != AnomalyType::Normal
    }
}

impl fmt::Display for AnomalyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How serious a detected anomaly is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    /// Severity implied by a model confidence when the service reports none.
    pub fn from_confidence(confidence: f64) -> Self {
        if confidence >= 0.9 {
            Severity::High
        } else if confidence >= 0.7 {
            Severity::Medium
        } else {
            Severity::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "Low",
            Severity::Medium => "Medium",
            Severity::High => "High",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The predictor's structured verdict for one snapshot.
///
/// # Example
///
/// ```rust
/// use linewatch_types::{AnomalyType, ModuleName, PredictionVerdict, Severity};
///
/// let verdict = PredictionVerdict::new(AnomalyType::Step, "DynamicFreezer/Temperature", 0.93);
/// assert_eq!(verdict.severity, Severity::High);
/// assert_eq!(verdict.module(), Some(ModuleName::DynamicFreezer));
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PredictionVerdict {
    /// Predicted class.
    pub anomaly_type: AnomalyType,

    /// Snapshot key of the parameter most likely affected.
    ///
    /// The service reports `"No Anomaly"` for normal verdicts.
    pub parameter_for_anomaly: String,

    /// Probability of the predicted class, in [0, 1].
    pub confidence: f64,

    /// How serious the anomaly is.
    pub severity: Severity,

    /// Numeric model class, when the service reports it.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub anomaly_code: Option<u32>,

    /// Probability per class, when the service reports it.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "BTreeMap::is_empty"))]
    pub all_probabilities: BTreeMap<String, f64>,

    /// Service-side time of the verdict, as sent.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub timestamp: Option<String>,
}

impl PredictionVerdict {
    /// Create a verdict, deriving severity from confidence.
    pub fn new(anomaly_type: AnomalyType, parameter: impl Into<String>, confidence: f64) -> Self {
        let confidence = confidence.clamp(0.0, 1.0);
        Self {
            anomaly_type,
            parameter_for_anomaly: parameter.into(),
            confidence,
            severity: Severity::from_confidence(confidence),
            anomaly_code: None,
            all_probabilities: BTreeMap::new(),
            timestamp: None,
        }
    }

    /// A normal verdict with the given confidence.
    pub fn normal(confidence: f64) -> Self {
        Self::new(AnomalyType::Normal, "No Anomaly", confidence)
    }

    /// Override the severity.
    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    /// Whether the verdict reports an anomaly.
    pub fn is_anomaly(&self) -> bool {
        self.anomaly_type.is_anomaly()
    }

    /// The module named by the affected parameter, if any.
    pub fn module(&self) -> Option<ModuleName> {
        ModuleName::from_key(&self.parameter_for_anomaly)
    }

    /// The parameter name without its module prefix.
    pub fn parameter_name(&self) -> &str {
        self.parameter_for_anomaly
            .split_once('/')
            .map(|(_, p)| p)
            .unwrap_or(&self.parameter_for_anomaly)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_from_confidence_thresholds() {
        assert_eq!(Severity::from_confidence(0.95), Severity::High);
        assert_eq!(Severity::from_confidence(0.9), Severity::High);
        assert_eq!(Severity::from_confidence(0.75), Severity::Medium);
        assert_eq!(Severity::from_confidence(0.4), Severity::Low);
    }

    #[test]
    fn normal_verdict_has_no_module() {
        let verdict = PredictionVerdict::normal(0.98);
        assert!(!verdict.is_anomaly());
        assert_eq!(verdict.module(), None);
        assert_eq!(verdict.parameter_name(), "No Anomaly");
    }

    #[test]
    fn parameter_name_strips_module() {
        let verdict = PredictionVerdict::new(AnomalyType::Ramp, "Homogenizer/Valve1/InFlowMix", 0.6);
        assert_eq!(verdict.parameter_name(), "Valve1/InFlowMix");
        assert_eq!(verdict.severity, Severity::Low);
    }

    #[test]
    fn confidence_is_clamped() {
        let verdict = PredictionVerdict::new(AnomalyType::Freeze, "Mixer/Level", 1.4);
        assert_eq!(verdict.confidence, 1.0);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_serde_roundtrip() {
        let verdict = PredictionVerdict::new(AnomalyType::Step, "Pasteurizer/Temperature", 0.81)
            .with_severity(Severity::High);
        let json = serde_json::to_string(&verdict).unwrap();
        assert!(json.contains("\"anomaly_type\":\"Step\""));
        assert!(!json.contains("anomaly_code"));
        assert!(!json.contains("timestamp"));

        let parsed: PredictionVerdict = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, verdict);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn service_timestamp_is_kept() {
        let json = r#"{"anomaly_type": "Freeze", "parameter_for_anomaly": "Mixer/Level",
                       "confidence": 0.7, "severity": "Medium",
                       "timestamp": "2025-08-24T18:45:32"}"#;
        let verdict: PredictionVerdict = serde_json::from_str(json).unwrap();
        assert_eq!(verdict.timestamp.as_deref(), Some("2025-08-24T18:45:32"));
        assert!(serde_json::to_string(&verdict).unwrap().contains("\"timestamp\""));
    }
}
