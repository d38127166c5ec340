//! Live state of the process line modules.

use serde::Serialize;

use linewatch_types::{ModuleName, ModuleStatus, TelemetrySnapshot};

/// Current state of one module.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineModule {
    pub name: ModuleName,
    pub status: ModuleStatus,
    /// Kelvin.
    pub temperature: f64,
    /// Fill level, clamped to [0, 1].
    pub level: f64,
}

impl LineModule {
    pub fn new(name: ModuleName, status: ModuleStatus, temperature: f64, level: f64) -> Self {
        Self {
            name,
            status,
            temperature,
            level: level.clamp(0.0, 1.0),
        }
    }

    /// Monitored signal names, in display order.
    pub fn parameters(&self) -> &'static [&'static str] {
        self.name.parameters()
    }

    /// Take temperature and level from the snapshot when it carries them.
    ///
    /// Returns true if anything changed.
    pub fn apply_readings(&mut self, snapshot: &TelemetrySnapshot) -> bool {
        let mut changed = false;
        if let Some(t) = snapshot.module_reading(self.name, "Temperature") {
            self.temperature = t;
            changed = true;
        }
        if let Some(l) = snapshot.module_reading(self.name, "Level") {
            self.level = l.clamp(0.0, 1.0);
            changed = true;
        }
        changed
    }
}

/// The line as it looks at startup.
pub fn initial_line() -> Vec<LineModule> {
    use ModuleStatus::*;
    vec![
        LineModule::new(ModuleName::Mixer, Normal, 276.5, 0.85),
        LineModule::new(ModuleName::Pasteurizer, Warning, 276.8, 0.0),
        LineModule::new(ModuleName::Homogenizer, Normal, 0.0, 0.0),
        LineModule::new(ModuleName::AgeingCooling, Normal, 276.7, 0.0),
        LineModule::new(ModuleName::DynamicFreezer, Anomaly, 277.2, 0.0),
        LineModule::new(ModuleName::Hardening, Normal, 251.1, 0.0),
    ]
}

/// Worst status across the line.
pub fn overall_status(modules: &[LineModule]) -> ModuleStatus {
    modules.iter().map(|m| m.status).max().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initial_line_covers_every_module_in_order() {
        let line = initial_line();
        let names: Vec<_> = line.iter().map(|m| m.name).collect();
        assert_eq!(names, ModuleName::ALL.to_vec());
        assert_eq!(overall_status(&line), ModuleStatus::Anomaly);
    }

    #[test]
    fn apply_readings_clamps_level() {
        let mut mixer = LineModule::new(ModuleName::Mixer, ModuleStatus::Normal, 276.5, 0.85);
        let snapshot = TelemetrySnapshot::builder()
            .reading("Mixer/Level", 1.6)
            .reading("Mixer/Temperature", 277.1)
            .build();

        assert!(mixer.apply_readings(&snapshot));
        assert_eq!(mixer.level, 1.0);
        assert_eq!(mixer.temperature, 277.1);
    }

    #[test]
    fn apply_readings_ignores_other_modules() {
        let mut hardening = LineModule::new(ModuleName::Hardening, ModuleStatus::Normal, 251.1, 0.0);
        let snapshot = TelemetrySnapshot::builder().reading("Mixer/Temperature", 280.0).build();
        assert!(!hardening.apply_readings(&snapshot));
        assert_eq!(hardening.temperature, 251.1);
    }

    #[test]
    fn overall_status_of_empty_line_is_normal() {
        assert_eq!(overall_status(&[]), ModuleStatus::Normal);
    }
}
