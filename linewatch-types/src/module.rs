//! Module identities and statuses for the process line.

use core::fmt;
use core::str::FromStr;

/// One stage of the process line.
///
/// The set is fixed: a line is always made of these six stages, in flow
/// order from raw mix to hardened product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ModuleName {
    Mixer,
    Pasteurizer,
    Homogenizer,
    AgeingCooling,
    DynamicFreezer,
    Hardening,
}

impl ModuleName {
    /// All modules in flow order.
    pub const ALL: [ModuleName; 6] = [
        ModuleName::Mixer,
        ModuleName::Pasteurizer,
        ModuleName::Homogenizer,
        ModuleName::AgeingCooling,
        ModuleName::DynamicFreezer,
        ModuleName::Hardening,
    ];

    /// The name used as key prefix in snapshots.
    pub const fn as_str(&self) -> &'static str {
        match self {
            ModuleName::Mixer => "Mixer",
            ModuleName::Pasteurizer => "Pasteurizer",
            ModuleName::Homogenizer => "Homogenizer",
            ModuleName::AgeingCooling => "AgeingCooling",
            ModuleName::DynamicFreezer => "DynamicFreezer",
            ModuleName::Hardening => "Hardening",
        }
    }

    /// Monitored signal names for this module, in display order.
    pub const fn parameters(&self) -> &'static [&'static str] {
        match self {
            ModuleName::Mixer => &[
                "OpenDumpValve",
                "Level",
                "Temperature",
                "OpenOutlet",
                "Fill1On",
                "Fill2On",
                "Fill3On",
                "Fill4On",
                "Fill5On",
                "TurnMixerOn",
                "MixerIsOn",
                "InFlowMix",
                "OutFlowMix",
            ],
            ModuleName::Pasteurizer => &[
                "OpenDumpValve",
                "Level",
                "OpenOutlet",
                "HeaterOn",
                "Temperature",
                "CoolerOn",
                "InFlowMix",
                "OutFlowMix",
            ],
            ModuleName::Homogenizer => &[
                "ParticleSize",
                "HomogenizerOn",
                "Valve1/InFlowMix",
                "Valve2/OutFlowMix",
            ],
            ModuleName::AgeingCooling => &[
                "OpenDumpValve",
                "Level",
                "Temperature",
                "InFlowMix",
                "OpenOutlet",
                "AgeingCoolingOn",
                "OutFlowMix",
            ],
            ModuleName::DynamicFreezer => &[
                "OpenDumpValve",
                "Level",
                "OpenOutlet",
                "HeaterOn",
                "Temperature",
                "SolidFlavoringOn",
                "LiquidFlavoringOn",
                "FreezerOn",
                "DasherOn",
                "Overrun",
                "SendTestValues",
                "ParticleSize",
                "BarrelRotationSpeed",
                "PasteurizationUnits",
                "InFlowMix",
                "OutFlowMix",
            ],
            ModuleName::Hardening => &[
                "Packages",
                "OpenDumpValve",
                "Temperature",
                "HardeningOn",
                "FinishBatchOn",
                "InFlowMix",
            ],
        }
    }

    /// Build the snapshot key for one of this module's parameters.
    pub fn key(&self, parameter: &str) -> String {
        format!("{}/{}", self.as_str(), parameter)
    }

    /// Whether a parameter key refers to this module.
    ///
    /// Matches on prefix, the way the predictor names the affected
    /// parameter (`"DynamicFreezer/Temperature"` belongs to `DynamicFreezer`).
    pub fn owns(&self, parameter_key: &str) -> bool {
        parameter_key.starts_with(self.as_str())
    }

    /// Find the module a snapshot key belongs to.
    pub fn from_key(key: &str) -> Option<ModuleName> {
        let prefix = key.split('/').next()?;
        prefix.parse().ok()
    }
}

impl fmt::Display for ModuleName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string does not name a known module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownModule(pub String);

impl fmt::Display for UnknownModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown module: {}", self.0)
    }
}

impl std::error::Error for UnknownModule {}

impl FromStr for ModuleName {
    type Err = UnknownModule;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ModuleName::ALL
            .iter()
            .copied()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| UnknownModule(s.to_string()))
    }
}

/// Discrete operating status of a module.
///
/// Ordered by severity so the worst status of a set is its `max()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum ModuleStatus {
    #[default]
    Normal,
    Warning,
    Anomaly,
}

impl ModuleStatus {
    /// Returns a short symbol for display.
    pub fn symbol(&self) -> &'static str {
        match self {
            ModuleStatus::Normal => "OK",
            ModuleStatus::Warning => "WARN",
            ModuleStatus::Anomaly => "ANOM",
        }
    }

    /// Lowercase label, as used in reports.
    pub fn label(&self) -> &'static str {
        match self {
            ModuleStatus::Normal => "normal",
            ModuleStatus::Warning => "warning",
            ModuleStatus::Anomaly => "anomaly",
        }
    }

    /// One step toward normal (anomaly -> warning -> normal).
    pub fn relaxed(self) -> Self {
        match self {
            ModuleStatus::Anomaly => ModuleStatus::Warning,
            ModuleStatus::Warning | ModuleStatus::Normal => ModuleStatus::Normal,
        }
    }
}

impl fmt::Display for ModuleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_round_trips_every_module() {
        for module in ModuleName::ALL {
            assert_eq!(module.as_str().parse::<ModuleName>(), Ok(module));
        }
    }

    #[test]
    fn parse_rejects_unknown_names() {
        let err = "Churner".parse::<ModuleName>().unwrap_err();
        assert_eq!(err, UnknownModule("Churner".to_string()));
        assert_eq!(err.to_string(), "unknown module: Churner");
    }

    #[test]
    fn from_key_uses_first_segment() {
        assert_eq!(ModuleName::from_key("Homogenizer/Valve1/InFlowMix"), Some(ModuleName::Homogenizer));
        assert_eq!(ModuleName::from_key("No Anomaly"), None);
    }

    #[test]
    fn owns_matches_prefix() {
        assert!(ModuleName::DynamicFreezer.owns("DynamicFreezer/Temperature"));
        assert!(!ModuleName::Mixer.owns("Pasteurizer/Level"));
    }

    #[test]
    fn status_orders_by_severity() {
        assert!(ModuleStatus::Anomaly > ModuleStatus::Warning);
        assert!(ModuleStatus::Warning > ModuleStatus::Normal);
        assert_eq!(ModuleStatus::Anomaly.relaxed(), ModuleStatus::Warning);
        assert_eq!(ModuleStatus::Normal.relaxed(), ModuleStatus::Normal);
    }

    #[test]
    fn parameter_counts_match_feature_columns() {
        let total: usize = ModuleName::ALL.iter().map(|m| m.parameters().len()).sum();
        assert_eq!(total, crate::FEATURE_COLUMNS.len());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn status_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&ModuleStatus::Anomaly).unwrap(), "\"anomaly\"");
    }
}
