//! Production batch records and their summary figures.

use serde::Serialize;

use linewatch_types::ModuleName;

use super::anomaly_log::AnomalyLog;

/// Quality grade assigned to a finished batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BatchGrade {
    Good,
    Fair,
}

impl BatchGrade {
    pub fn as_str(&self) -> &'static str {
        match self {
            BatchGrade::Good => "Good",
            BatchGrade::Fair => "Fair",
        }
    }
}

/// One finished production batch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchRecord {
    pub id: String,
    /// Quality score in percent.
    pub quality: f64,
    pub anomalies: u32,
    pub grade: BatchGrade,
}

impl BatchRecord {
    pub fn new(id: impl Into<String>, quality: f64, anomalies: u32, grade: BatchGrade) -> Self {
        Self {
            id: id.into(),
            quality,
            anomalies,
            grade,
        }
    }
}

/// Batches shown before any production data is available.
pub fn demo_batches() -> Vec<BatchRecord> {
    vec![
        BatchRecord::new("B001", 95.2, 0, BatchGrade::Good),
        BatchRecord::new("B002", 87.3, 2, BatchGrade::Fair),
        BatchRecord::new("B003", 92.8, 1, BatchGrade::Good),
    ]
}

/// Batch counts per quality band.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct QualityDistribution {
    /// Above 95 %.
    pub excellent: usize,
    /// 85 to 95 % inclusive.
    pub good: usize,
    /// Below 85 %.
    pub fair: usize,
}

/// Summary figures over all batches and the anomaly log.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchSummary {
    pub batches: usize,
    pub average_quality: f64,
    pub total_anomalies: u32,
    /// Share of Good batches, in percent.
    pub pass_rate: f64,
    pub distribution: QualityDistribution,
    pub most_affected_module: Option<ModuleName>,
}

impl BatchSummary {
    pub fn compute(batches: &[BatchRecord], log: &AnomalyLog) -> Self {
        let count = batches.len();
        let (average_quality, pass_rate) = if count == 0 {
            (0.0, 0.0)
        } else {
            let total: f64 = batches.iter().map(|b| b.quality).sum();
            let good = batches.iter().filter(|b| b.grade == BatchGrade::Good).count();
            (total / count as f64, good as f64 / count as f64 * 100.0)
        };

        let mut distribution = QualityDistribution::default();
        for batch in batches {
            if batch.quality > 95.0 {
                distribution.excellent += 1;
            } else if batch.quality >= 85.0 {
                distribution.good += 1;
            } else {
                distribution.fair += 1;
            }
        }

        Self {
            batches: count,
            average_quality,
            total_anomalies: batches.iter().map(|b| b.anomalies).sum(),
            pass_rate,
            distribution,
            most_affected_module: log.most_affected_module(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_of_demo_batches() {
        let summary = BatchSummary::compute(&demo_batches(), &AnomalyLog::default());

        assert_eq!(summary.batches, 3);
        assert!((summary.average_quality - 91.766).abs() < 0.01);
        assert_eq!(summary.total_anomalies, 3);
        assert!((summary.pass_rate - 66.666).abs() < 0.01);
        assert_eq!(
            summary.distribution,
            QualityDistribution { excellent: 1, good: 2, fair: 0 }
        );
        assert_eq!(summary.most_affected_module, None);
    }

    #[test]
    fn summary_of_no_batches() {
        let summary = BatchSummary::compute(&[], &AnomalyLog::default());
        assert_eq!(summary.average_quality, 0.0);
        assert_eq!(summary.pass_rate, 0.0);
    }

    #[test]
    fn band_edges() {
        let batches = vec![
            BatchRecord::new("X1", 95.0, 0, BatchGrade::Good),
            BatchRecord::new("X2", 85.0, 0, BatchGrade::Fair),
            BatchRecord::new("X3", 84.9, 4, BatchGrade::Fair),
        ];
        let summary = BatchSummary::compute(&batches, &AnomalyLog::default());
        assert_eq!(summary.distribution, QualityDistribution { excellent: 0, good: 2, fair: 1 });
    }
}
