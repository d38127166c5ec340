//! TelemetrySnapshot - one poll cycle's sensor readings.

use std::collections::BTreeMap;

use crate::ModuleName;

/// One cycle's full set of sensor readings, keyed `"<Module>/<Parameter>"`.
///
/// A snapshot is built once per poll cycle and never mutated afterwards.
/// It serializes as a flat JSON object, the same shape the predictor's
/// `/simulate_data` returns and `/predict` accepts.
///
/// # Example
///
/// ```rust
/// use linewatch_types::TelemetrySnapshot;
///
/// let snapshot = TelemetrySnapshot::builder()
///     .reading("Pasteurizer/Temperature", 276.9)
///     .build();
///
/// assert!(snapshot.contains("Pasteurizer/Temperature"));
/// assert!(snapshot.get("Pasteurizer/Level").is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct TelemetrySnapshot {
    readings: BTreeMap<String, f64>,
}

impl TelemetrySnapshot {
    /// Create an empty snapshot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a builder for constructing snapshots.
    pub fn builder() -> SnapshotBuilder {
        SnapshotBuilder::new()
    }

    /// Get the reading for a key, if present.
    pub fn get(&self, key: &str) -> Option<f64> {
        self.readings.get(key).copied()
    }

    /// Get a module's reading for a parameter.
    pub fn module_reading(&self, module: ModuleName, parameter: &str) -> Option<f64> {
        self.get(&module.key(parameter))
    }

    /// Check whether a key is present.
    pub fn contains(&self, key: &str) -> bool {
        self.readings.contains_key(key)
    }

    /// Check if the snapshot carries no readings.
    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    /// Number of readings in the snapshot.
    pub fn len(&self) -> usize {
        self.readings.len()
    }

    /// Iterate over all readings in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.readings.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Iterate over the readings belonging to one module.
    pub fn module_readings(&self, module: ModuleName) -> impl Iterator<Item = (&str, f64)> {
        self.iter().filter(move |(k, _)| ModuleName::from_key(k) == Some(module))
    }
}

impl FromIterator<(String, f64)> for TelemetrySnapshot {
    fn from_iter<I: IntoIterator<Item = (String, f64)>>(iter: I) -> Self {
        Self {
            readings: iter.into_iter().collect(),
        }
    }
}

impl From<BTreeMap<String, f64>> for TelemetrySnapshot {
    fn from(readings: BTreeMap<String, f64>) -> Self {
        Self { readings }
    }
}

/// Builder for constructing `TelemetrySnapshot` instances.
#[derive(Debug, Default)]
pub struct SnapshotBuilder {
    readings: BTreeMap<String, f64>,
}

impl SnapshotBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a reading under a full `"<Module>/<Parameter>"` key.
    pub fn reading(mut self, key: impl Into<String>, value: f64) -> Self {
        self.readings.insert(key.into(), value);
        self
    }

    /// Add readings for one module using a closure.
    pub fn module<F>(mut self, module: ModuleName, f: F) -> Self
    where
        F: FnOnce(ModuleReadingsBuilder) -> ModuleReadingsBuilder,
    {
        let built = f(ModuleReadingsBuilder {
            module,
            readings: Vec::new(),
        });
        for (parameter, value) in built.readings {
            self.readings.insert(module.key(&parameter), value);
        }
        self
    }

    /// Build the snapshot.
    pub fn build(self) -> TelemetrySnapshot {
        TelemetrySnapshot {
            readings: self.readings,
        }
    }
}

/// Builder for a single module's readings, used by [`SnapshotBuilder::module`].
#[derive(Debug)]
pub struct ModuleReadingsBuilder {
    module: ModuleName,
    readings: Vec<(String, f64)>,
}

impl ModuleReadingsBuilder {
    /// Add a reading for one of the module's parameters.
    pub fn reading(mut self, parameter: impl Into<String>, value: f64) -> Self {
        self.readings.push((parameter.into(), value));
        self
    }

    /// The module being built.
    pub fn module(&self) -> ModuleName {
        self.module
    }
}
