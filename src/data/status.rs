//! Per-module status derivation with probabilistic hysteresis.
//!
//! A verdict that names a module's parameter escalates that module right
//! away. Everything else decays slowly: each cycle there is a small chance
//! the module relaxes one step toward normal, so a status survives a few
//! quiet cycles before it clears.

use std::fmt;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use linewatch_types::{ModuleName, ModuleStatus, PredictionVerdict, Severity};

use crate::error::ConfigurationError;

/// Per-cycle probability that a quiet module is considered for relaxation.
pub const RELAX_PROBABILITY: f64 = 0.05;

/// Probability a considered module actually relaxes.
pub const RELAX_CONFIRM: f64 = 0.7;

/// A source of uniform draws in `[0, 1)`.
pub trait RandomSource: Send + Sync + fmt::Debug {
    fn next(&mut self) -> f64;
}

/// Uniform draws from a `StdRng`.
#[derive(Debug)]
pub struct UniformRandom(StdRng);

impl UniformRandom {
    pub fn from_entropy() -> Self {
        Self(StdRng::from_entropy())
    }

    /// A reproducible source, for demos and tests.
    pub fn seeded(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }
}

impl RandomSource for UniformRandom {
    fn next(&mut self) -> f64 {
        self.0.gen::<f64>()
    }
}

/// Derives each module's status from the previous status and the latest
/// verdict.
#[derive(Debug)]
pub struct StatusAggregator {
    random: Box<dyn RandomSource>,
}

impl Default for StatusAggregator {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusAggregator {
    /// An aggregator drawing from OS entropy.
    pub fn new() -> Self {
        Self::with_source(Box::new(UniformRandom::from_entropy()))
    }

    pub fn with_source(random: Box<dyn RandomSource>) -> Self {
        Self { random }
    }

    /// Derive the next status for a module given by name.
    ///
    /// Fails only when `module` is not one of the line's modules.
    pub fn derive_status(
        &mut self,
        module: &str,
        previous: ModuleStatus,
        verdict: Option<&PredictionVerdict>,
    ) -> Result<ModuleStatus, ConfigurationError> {
        let module: ModuleName = module.parse()?;
        Ok(self.derive(module, previous, verdict))
    }

    /// Derive the next status for a known module.
    pub fn derive(
        &mut self,
        module: ModuleName,
        previous: ModuleStatus,
        verdict: Option<&PredictionVerdict>,
    ) -> ModuleStatus {
        let matching = verdict
            .filter(|v| v.is_anomaly() && module.owns(&v.parameter_for_anomaly));

        if let Some(verdict) = matching {
            return match verdict.severity {
                Severity::High | Severity::Medium => ModuleStatus::Anomaly,
                Severity::Low => ModuleStatus::Warning,
            };
        }

        // Second draw only happens when the first one passes.
        if self.random.next() < RELAX_PROBABILITY && self.random.next() < RELAX_CONFIRM {
            previous.relaxed()
        } else {
            previous
        }
    }
}
