//! Bounded log of detected anomalies.

use std::collections::{BTreeMap, VecDeque};

use chrono::{DateTime, Utc};
use serde::Serialize;

use linewatch_types::{AnomalyType, ModuleName, PredictionVerdict, Severity};

/// Default number of entries kept.
pub const DEFAULT_LOG_CAPACITY: usize = 50;

/// One detected anomaly.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnomalyLogEntry {
    pub timestamp: DateTime<Utc>,
    pub anomaly_type: AnomalyType,
    /// Full snapshot key of the affected parameter.
    pub parameter: String,
    pub confidence: f64,
    pub severity: Severity,
}

impl AnomalyLogEntry {
    pub fn from_verdict(verdict: &PredictionVerdict, timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp,
            anomaly_type: verdict.anomaly_type,
            parameter: verdict.parameter_for_anomaly.clone(),
            confidence: verdict.confidence,
            severity: verdict.severity,
        }
    }

    pub fn module(&self) -> Option<ModuleName> {
        ModuleName::from_key(&self.parameter)
    }

    /// Parameter name without the module prefix.
    pub fn parameter_name(&self) -> &str {
        self.parameter.split_once('/').map(|(_, p)| p).unwrap_or(&self.parameter)
    }
}

/// FIFO of the most recent anomalies; the oldest is evicted first.
#[derive(Debug, Clone)]
pub struct AnomalyLog {
    capacity: usize,
    entries: VecDeque<AnomalyLogEntry>,
}

impl Default for AnomalyLog {
    fn default() -> Self {
        Self::new(DEFAULT_LOG_CAPACITY)
    }
}

impl AnomalyLog {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            entries: VecDeque::with_capacity(capacity),
        }
    }

    /// Record a verdict. Normal verdicts are ignored.
    ///
    /// Returns true if an entry was added.
    pub fn record(&mut self, verdict: &PredictionVerdict, at: DateTime<Utc>) -> bool {
        if !verdict.is_anomaly() {
            return false;
        }
        self.push(AnomalyLogEntry::from_verdict(verdict, at));
        true
    }

    pub fn push(&mut self, entry: AnomalyLogEntry) {
        self.entries.push_back(entry);
        if self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
    }

    /// Entries oldest first.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &AnomalyLogEntry> {
        self.entries.iter()
    }

    /// Entries newest first.
    pub fn recent(&self) -> impl Iterator<Item = &AnomalyLogEntry> {
        self.entries.iter().rev()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn count_severity(&self, severity: Severity) -> usize {
        self.entries.iter().filter(|e| e.severity == severity).count()
    }

    /// Entry count per module, skipping entries with no recognizable module.
    pub fn counts_by_module(&self) -> BTreeMap<ModuleName, usize> {
        let mut counts = BTreeMap::new();
        for module in self.entries.iter().filter_map(|e| e.module()) {
            *counts.entry(module).or_insert(0) += 1;
        }
        counts
    }

    /// The module with the most logged anomalies. Ties go to the module
    /// earliest in line order.
    pub fn most_affected_module(&self) -> Option<ModuleName> {
        self.counts_by_module()
            .into_iter()
            .fold(None, |best: Option<(ModuleName, usize)>, (module, count)| match best {
                Some((_, best_count)) if best_count >= count => best,
                _ => Some((module, count)),
            })
            .map(|(module, _)| module)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_756_061_100 + secs, 0).unwrap()
    }

    #[test]
    fn keeps_most_recent_fifty() {
        let mut log = AnomalyLog::default();
        for i in 0..51 {
            let verdict = PredictionVerdict::new(AnomalyType::Freeze, "Mixer/Level", 0.8);
            assert!(log.record(&verdict, at(i)));
        }

        assert_eq!(log.len(), 50);
        assert_eq!(log.iter().next().unwrap().timestamp, at(1));
        assert_eq!(log.recent().next().unwrap().timestamp, at(50));
    }

    #[test]
    fn normal_verdicts_are_not_logged() {
        let mut log = AnomalyLog::new(5);
        assert!(!log.record(&PredictionVerdict::normal(0.97), at(0)));
        assert!(log.is_empty());
    }

    #[test]
    fn most_affected_module_counts_entries() {
        let mut log = AnomalyLog::new(10);
        log.record(&PredictionVerdict::new(AnomalyType::Step, "Pasteurizer/Temperature", 0.9), at(0));
        log.record(&PredictionVerdict::new(AnomalyType::Ramp, "DynamicFreezer/Level", 0.9), at(1));
        log.record(&PredictionVerdict::new(AnomalyType::Step, "DynamicFreezer/Temperature", 0.6), at(2));

        assert_eq!(log.most_affected_module(), Some(ModuleName::DynamicFreezer));
        assert_eq!(log.count_severity(Severity::High), 2);
        assert_eq!(log.recent().next().unwrap().parameter_name(), "Temperature");
    }

    #[test]
    fn most_affected_module_of_empty_log_is_none() {
        assert_eq!(AnomalyLog::new(3).most_affected_module(), None);
    }
}
