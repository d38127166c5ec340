//! Offline line simulator.
//!
//! Temperatures and levels follow a random walk from the line's startup
//! values; every other feature is drawn from its normal operating range.
//! One cycle in ten carries an injected Freeze, Step or Ramp anomaly on a
//! known-sensitive parameter, and the reading's verdict reports it.

use std::collections::BTreeMap;

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use tracing::debug;

use linewatch_types::{AnomalyType, ModuleName, PredictionVerdict, TelemetrySnapshot, FEATURE_COLUMNS};

use super::{Reading, TelemetrySource};
use crate::data::initial_line;
use crate::error::RequestFailure;

/// Chance a cycle carries an injected anomaly.
const ANOMALY_PROBABILITY: f64 = 0.1;

/// Largest distance a temperature walk may drift from its start, in Kelvin.
const MAX_DRIFT: f64 = 5.0;

const FREEZE_TARGETS: &[&str] = &["Mixer/Level", "Pasteurizer/Temperature"];
const STEP_TARGETS: &[&str] = &["DynamicFreezer/Temperature", "Pasteurizer/Temperature"];
const RAMP_TARGETS: &[&str] = &["Mixer/Level", "DynamicFreezer/Level"];

/// How a feature behaves during normal operation.
#[derive(Debug, Clone, Copy)]
enum Operating {
    Constant(f64),
    Uniform(f64, f64),
    /// On with the given probability.
    Switch(f64),
}

fn operating_range(key: &str) -> Operating {
    use Operating::*;
    let parameter = key.split_once('/').map(|(_, p)| p).unwrap_or(key);
    match key {
        "Mixer/InFlowMix" | "Mixer/OutFlowMix" => Uniform(0.0, 5.0),
        "Pasteurizer/InFlowMix" | "Pasteurizer/OutFlowMix" | "Hardening/InFlowMix" => Uniform(0.0, 3.0),
        "DynamicFreezer/InFlowMix" | "DynamicFreezer/OutFlowMix" => Uniform(0.0, 4.0),
        "Homogenizer/Valve1/InFlowMix" | "Homogenizer/Valve2/OutFlowMix" => Uniform(0.0, 2.0),
        "AgeingCooling/InFlowMix" | "AgeingCooling/OutFlowMix" => Uniform(0.0, 2.0),
        "Homogenizer/ParticleSize" => Uniform(0.5, 2.0),
        "DynamicFreezer/ParticleSize" => Uniform(0.3, 1.0),
        "DynamicFreezer/Overrun" => Uniform(0.8, 1.2),
        "DynamicFreezer/BarrelRotationSpeed" => Uniform(50.0, 100.0),
        "DynamicFreezer/PasteurizationUnits" => Uniform(10.0, 30.0),
        "Hardening/Packages" => Uniform(0.0, 10.0),
        "Mixer/OpenOutlet" | "AgeingCooling/OpenOutlet" => Switch(0.2),
        "Pasteurizer/OpenOutlet" | "DynamicFreezer/OpenOutlet" | "Hardening/FinishBatchOn" => Switch(0.1),
        "DynamicFreezer/SolidFlavoringOn" => Switch(0.4),
        "DynamicFreezer/LiquidFlavoringOn" => Switch(0.3),
        "Pasteurizer/CoolerOn" | "DynamicFreezer/HeaterOn" | "DynamicFreezer/SendTestValues" => Constant(0.0),
        _ if parameter.starts_with("Fill") => Switch(0.3),
        _ if parameter == "OpenDumpValve" => Constant(0.0),
        // Heaters, motors and stage enables run continuously.
        _ => Constant(1.0),
    }
}

/// Random-walk state of one module's temperature and level.
#[derive(Debug, Clone, Copy)]
struct Walk {
    base_temperature: f64,
    temperature: Option<f64>,
    level: Option<f64>,
}

/// Simulated telemetry with injected anomalies.
#[derive(Debug)]
pub struct DemoSource {
    rng: StdRng,
    walks: BTreeMap<ModuleName, Walk>,
    previous: Option<TelemetrySnapshot>,
}

impl Default for DemoSource {
    fn default() -> Self {
        Self::new()
    }
}

impl DemoSource {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// A reproducible simulator.
    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        let walks = initial_line()
            .into_iter()
            .map(|m| {
                let params = m.name.parameters();
                let walk = Walk {
                    base_temperature: m.temperature,
                    temperature: params.contains(&"Temperature").then_some(m.temperature),
                    level: params
                        .contains(&"Level")
                        .then_some(if m.level > 0.0 { m.level } else { 0.5 }),
                };
                (m.name, walk)
            })
            .collect();

        Self {
            rng,
            walks,
            previous: None,
        }
    }

    fn step_walks(&mut self) {
        for walk in self.walks.values_mut() {
            if let Some(t) = walk.temperature.as_mut() {
                *t += (self.rng.gen::<f64>() - 0.5) * 2.0;
                *t = t.clamp(walk.base_temperature - MAX_DRIFT, walk.base_temperature + MAX_DRIFT);
            }
            if let Some(l) = walk.level.as_mut() {
                *l = (*l + (self.rng.gen::<f64>() - 0.5) * 0.1).clamp(0.0, 1.0);
            }
        }
    }

    fn sample(&mut self, key: &str) -> f64 {
        let walked = ModuleName::from_key(key)
            .and_then(|m| self.walks.get(&m))
            .and_then(|w| match key.split_once('/').map(|(_, p)| p) {
                Some("Temperature") => w.temperature,
                Some("Level") => w.level,
                _ => None,
            });
        if let Some(value) = walked {
            return value;
        }

        match operating_range(key) {
            Operating::Constant(v) => v,
            Operating::Uniform(lo, hi) => self.rng.gen_range(lo..hi),
            Operating::Switch(p) => f64::from(u8::from(self.rng.gen_bool(p))),
        }
    }

    /// Apply an anomaly to the readings and return the verdict describing it.
    fn inject(&mut self, readings: &mut BTreeMap<String, f64>) -> PredictionVerdict {
        let kind = [AnomalyType::Freeze, AnomalyType::Step, AnomalyType::Ramp]
            .choose(&mut self.rng)
            .copied()
            .unwrap_or(AnomalyType::Step);
        let targets = match kind {
            AnomalyType::Freeze => FREEZE_TARGETS,
            AnomalyType::Ramp => RAMP_TARGETS,
            _ => STEP_TARGETS,
        };
        let parameter = targets.choose(&mut self.rng).copied().unwrap_or(STEP_TARGETS[0]);

        let frozen = self.previous.as_ref().and_then(|s| s.get(parameter));
        let offset = match kind {
            AnomalyType::Step => self.rng.gen_range(10.0..20.0),
            AnomalyType::Ramp => self.rng.gen_range(0.5..1.0),
            _ => 0.0,
        };
        if let Some(value) = readings.get_mut(parameter) {
            match (kind, frozen) {
                (AnomalyType::Freeze, Some(held)) => *value = held,
                _ => *value += offset,
            }
        }

        let confidence = self.rng.gen_range(0.6..0.99);
        PredictionVerdict::new(kind, parameter, confidence)
    }
}

#[async_trait]
impl TelemetrySource for DemoSource {
    async fn health(&mut self) -> Result<(), RequestFailure> {
        Ok(())
    }

    async fn fetch(&mut self) -> Result<Reading, RequestFailure> {
        self.step_walks();

        let mut readings: BTreeMap<String, f64> = BTreeMap::new();
        for key in FEATURE_COLUMNS {
            let value = self.sample(key);
            readings.insert(key.to_string(), value);
        }

        let verdict = if self.rng.gen_bool(ANOMALY_PROBABILITY) {
            let verdict = self.inject(&mut readings);
            debug!(anomaly = %verdict.anomaly_type, parameter = %verdict.parameter_for_anomaly, "Injected demo anomaly");
            verdict
        } else {
            PredictionVerdict::normal(self.rng.gen_range(0.85..0.99))
        };

        let snapshot = TelemetrySnapshot::from(readings);
        self.previous = Some(snapshot.clone());
        Ok(Reading::new(snapshot, Some(verdict)))
    }

    fn description(&self) -> &str {
        "demo simulator"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn every_feature_column_is_present() {
        let mut source = DemoSource::seeded(1);
        let reading = source.fetch().await.unwrap();
        assert_eq!(reading.snapshot.len(), FEATURE_COLUMNS.len());
        assert_eq!(reading.snapshot.get("Mixer/MixerIsOn"), Some(1.0));
        assert_eq!(reading.snapshot.get("Mixer/OpenDumpValve"), Some(0.0));
        assert!(reading.verdict.is_some());
    }

    #[tokio::test]
    async fn seeded_sources_agree() {
        let mut a = DemoSource::seeded(99);
        let mut b = DemoSource::seeded(99);
        for _ in 0..10 {
            assert_eq!(a.fetch().await.unwrap(), b.fetch().await.unwrap());
        }
    }

    #[tokio::test]
    async fn injected_anomalies_target_known_parameters() {
        let mut source = DemoSource::seeded(5);
        let mut injected = 0;
        for _ in 0..300 {
            let reading = source.fetch().await.unwrap();
            let verdict = reading.verdict.unwrap();
            let targets = match verdict.anomaly_type {
                AnomalyType::Normal => continue,
                AnomalyType::Freeze => FREEZE_TARGETS,
                AnomalyType::Step => STEP_TARGETS,
                AnomalyType::Ramp => RAMP_TARGETS,
            };
            assert!(targets.contains(&verdict.parameter_for_anomaly.as_str()));
            assert!(verdict.confidence >= 0.6);
            injected += 1;
        }
        // Roughly one in ten.
        assert!((10..=60).contains(&injected), "injected {injected}");
    }

    #[tokio::test]
    async fn walks_stay_in_range() {
        let mut source = DemoSource::seeded(3);
        for _ in 0..500 {
            source.fetch().await.unwrap();
        }
        for walk in source.walks.values() {
            if let Some(level) = walk.level {
                assert!((0.0..=1.0).contains(&level));
            }
            if let Some(t) = walk.temperature {
                assert!((t - walk.base_temperature).abs() <= MAX_DRIFT);
            }
        }
    }

    #[test]
    fn homogenizer_has_no_temperature_walk() {
        let source = DemoSource::seeded(0);
        let walk = source.walks[&ModuleName::Homogenizer];
        assert!(walk.temperature.is_none());
        assert!(walk.level.is_none());
        assert!(source.walks[&ModuleName::Hardening].temperature.is_some());
    }
}
