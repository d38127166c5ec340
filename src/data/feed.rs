//! Rolling-window chart feed.
//!
//! The feed owns one [`SeriesBuffer`] per tracked series and a set of chart
//! views bound to those series. Each cycle's snapshot is ingested once; every
//! series present in the snapshot gets one new point and every view bound to
//! it is told to redraw.
//!
//! ```text
//! TelemetrySnapshot ──ingest──▶ SeriesBuffer ("Mixer/Temperature") ──redraw──▶ "Temperature" chart
//!                           └─▶ SeriesBuffer ("Mixer/Level")       ──redraw──▶ "Level" chart
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use linewatch_types::{ModuleName, TelemetrySnapshot};

use super::series::{SeriesBuffer, DEFAULT_WINDOW};
use crate::error::ConfigurationError;

/// A tracked `(module, parameter)` pair.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SeriesKey {
    module: ModuleName,
    parameter: String,
}

impl SeriesKey {
    pub fn new(module: ModuleName, parameter: impl Into<String>) -> Self {
        Self {
            module,
            parameter: parameter.into(),
        }
    }

    pub fn module(&self) -> ModuleName {
        self.module
    }

    pub fn parameter(&self) -> &str {
        &self.parameter
    }

    /// The snapshot key this series reads from.
    pub fn snapshot_key(&self) -> String {
        self.module.key(&self.parameter)
    }
}

impl fmt::Display for SeriesKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.module, self.parameter)
    }
}

impl FromStr for SeriesKey {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (module, parameter) = s
            .split_once('/')
            .filter(|(_, p)| !p.is_empty())
            .ok_or_else(|| ConfigurationError::InvalidSeriesKey(s.to_string()))?;
        let module: ModuleName = module.parse()?;
        Ok(Self::new(module, parameter))
    }
}

/// A chart as configured: a title and the series it plots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartDefinition {
    pub title: String,
    pub series: Vec<String>,
}

impl ChartDefinition {
    pub fn new(title: impl Into<String>, series: &[&str]) -> Self {
        Self {
            title: title.into(),
            series: series.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Temperature and level charts.
    pub fn defaults() -> Vec<ChartDefinition> {
        vec![
            ChartDefinition::new("Temperature", &["Mixer/Temperature", "Pasteurizer/Temperature"]),
            ChartDefinition::new("Level", &["Mixer/Level"]),
        ]
    }
}

/// A cached, render-ready copy of one series.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    pub key: SeriesKey,
    /// Formatted timestamps, oldest first.
    pub labels: Vec<String>,
    /// `(index, value)` points, oldest first.
    pub points: Vec<(f64, f64)>,
    pub bounds: Option<(f64, f64)>,
}

impl Dataset {
    fn from_buffer(key: &SeriesKey, buffer: &SeriesBuffer) -> Self {
        Self {
            key: key.clone(),
            labels: buffer.labels().collect(),
            points: buffer.values().enumerate().map(|(i, v)| (i as f64, v)).collect(),
            bounds: buffer.bounds(),
        }
    }
}

/// Something that displays one or more series and wants to know when they
/// change.
pub trait ChartView: Send + Sync + fmt::Debug {
    fn title(&self) -> &str;

    /// The series this view plots.
    fn series(&self) -> &[SeriesKey];

    /// Called after `key`'s buffer gained a point.
    fn redraw(&mut self, key: &SeriesKey, buffer: &SeriesBuffer);

    /// Render-ready datasets, in series order.
    fn datasets(&self) -> Vec<&Dataset> {
        Vec::new()
    }
}

/// Line chart view that caches a dataset per series.
#[derive(Debug, Clone)]
pub struct LineChart {
    title: String,
    series: Vec<SeriesKey>,
    datasets: BTreeMap<SeriesKey, Dataset>,
    redraws: u64,
}

impl LineChart {
    pub fn new(title: impl Into<String>, series: Vec<SeriesKey>) -> Self {
        Self {
            title: title.into(),
            series,
            datasets: BTreeMap::new(),
            redraws: 0,
        }
    }

    /// Build a chart from its configured definition.
    pub fn from_definition(definition: &ChartDefinition) -> Result<Self, ConfigurationError> {
        let series = definition
            .series
            .iter()
            .map(|s| s.parse())
            .collect::<Result<Vec<SeriesKey>, _>>()?;
        Ok(Self::new(definition.title.clone(), series))
    }

    pub fn dataset(&self, key: &SeriesKey) -> Option<&Dataset> {
        self.datasets.get(key)
    }

    /// How many times any series of this chart was redrawn.
    pub fn redraws(&self) -> u64 {
        self.redraws
    }
}

impl ChartView for LineChart {
    fn title(&self) -> &str {
        &self.title
    }

    fn series(&self) -> &[SeriesKey] {
        &self.series
    }

    fn redraw(&mut self, key: &SeriesKey, buffer: &SeriesBuffer) {
        self.datasets.insert(key.clone(), Dataset::from_buffer(key, buffer));
        self.redraws += 1;
    }

    fn datasets(&self) -> Vec<&Dataset> {
        self.series.iter().filter_map(|k| self.datasets.get(k)).collect()
    }
}

/// What one `ingest` call did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestReport {
    /// Series that gained a point.
    pub appended: usize,
    /// Series whose reading was missing from the snapshot.
    pub skipped: usize,
}

/// Owns the rolling windows and the chart views bound to them.
#[derive(Debug)]
pub struct ChartFeed {
    capacity: usize,
    buffers: BTreeMap<SeriesKey, SeriesBuffer>,
    views: Vec<Box<dyn ChartView>>,
}

impl Default for ChartFeed {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW)
    }
}

impl ChartFeed {
    /// An empty feed whose windows hold `capacity` points.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            buffers: BTreeMap::new(),
            views: Vec::new(),
        }
    }

    /// A feed with one [`LineChart`] per definition.
    pub fn from_definitions(
        capacity: usize,
        definitions: &[ChartDefinition],
    ) -> Result<Self, ConfigurationError> {
        let mut feed = Self::new(capacity);
        for definition in definitions {
            feed.add_view(Box::new(LineChart::from_definition(definition)?));
        }
        Ok(feed)
    }

    /// Bind a view; its series start being tracked.
    ///
    /// Several views may plot the same series; they share one buffer.
    pub fn add_view(&mut self, view: Box<dyn ChartView>) {
        for key in view.series() {
            self.buffers
                .entry(key.clone())
                .or_insert_with(|| SeriesBuffer::new(self.capacity));
        }
        self.views.push(view);
    }

    /// Append this cycle's readings and redraw the affected views.
    ///
    /// Series with no reading in the snapshot are left untouched.
    pub fn ingest(&mut self, snapshot: &TelemetrySnapshot, at: DateTime<Utc>) -> IngestReport {
        let mut report = IngestReport::default();

        for (key, buffer) in self.buffers.iter_mut() {
            let Some(value) = snapshot.get(&key.snapshot_key()) else {
                report.skipped += 1;
                continue;
            };

            buffer.append(at, value);
            report.appended += 1;

            for view in self.views.iter_mut().filter(|v| v.series().contains(key)) {
                view.redraw(key, buffer);
            }
        }

        debug!(appended = report.appended, skipped = report.skipped, "Chart feed ingested snapshot");
        report
    }

    pub fn buffer(&self, key: &SeriesKey) -> Option<&SeriesBuffer> {
        self.buffers.get(key)
    }

    /// All tracked series and their windows.
    pub fn buffers(&self) -> impl Iterator<Item = (&SeriesKey, &SeriesBuffer)> {
        self.buffers.iter()
    }

    pub fn views(&self) -> &[Box<dyn ChartView>] {
        &self.views
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_756_061_100 + secs, 0).unwrap()
    }

    fn key(s: &str) -> SeriesKey {
        s.parse().unwrap()
    }

    #[test]
    fn series_key_parses_nested_parameters() {
        let k = key("Homogenizer/Valve1/InFlowMix");
        assert_eq!(k.module(), ModuleName::Homogenizer);
        assert_eq!(k.parameter(), "Valve1/InFlowMix");
        assert_eq!(k.snapshot_key(), "Homogenizer/Valve1/InFlowMix");
    }

    #[test]
    fn series_key_rejects_bad_input() {
        assert_eq!(
            "Mixer".parse::<SeriesKey>(),
            Err(ConfigurationError::InvalidSeriesKey("Mixer".to_string()))
        );
        assert_eq!(
            "Churner/Level".parse::<SeriesKey>(),
            Err(ConfigurationError::UnknownModule("Churner".to_string()))
        );
    }

    #[test]
    fn unknown_module_in_definition_fails_construction() {
        let defs = vec![ChartDefinition::new("Bad", &["Blender/Temperature"])];
        let err = ChartFeed::from_definitions(20, &defs).unwrap_err();
        assert_eq!(err, ConfigurationError::UnknownModule("Blender".to_string()));
    }

    #[test]
    fn ingest_appends_present_series_and_redraws() {
        let mut feed = ChartFeed::from_definitions(20, &ChartDefinition::defaults()).unwrap();
        let snapshot = TelemetrySnapshot::builder()
            .reading("Mixer/Temperature", 276.4)
            .reading("Pasteurizer/Temperature", 276.9)
            .reading("Mixer/Level", 0.8)
            .build();

        let report = feed.ingest(&snapshot, at(0));
        assert_eq!(report, IngestReport { appended: 3, skipped: 0 });

        let temperature = &feed.views()[0];
        assert_eq!(temperature.title(), "Temperature");
        let datasets = temperature.datasets();
        assert_eq!(datasets.len(), 2);
        assert_eq!(datasets[0].key, key("Mixer/Temperature"));
        assert_eq!(datasets[0].points, vec![(0.0, 276.4)]);
    }

    #[test]
    fn missing_reading_leaves_series_unchanged() {
        let mut feed = ChartFeed::from_definitions(20, &ChartDefinition::defaults()).unwrap();
        let full = TelemetrySnapshot::builder()
            .reading("Mixer/Temperature", 276.4)
            .reading("Pasteurizer/Temperature", 276.9)
            .reading("Mixer/Level", 0.8)
            .build();
        feed.ingest(&full, at(0));

        let before = feed.buffer(&key("Mixer/Level")).unwrap().clone();
        let partial = TelemetrySnapshot::builder().reading("Mixer/Temperature", 277.0).build();
        let report = feed.ingest(&partial, at(5));

        assert_eq!(report, IngestReport { appended: 1, skipped: 2 });
        assert_eq!(feed.buffer(&key("Mixer/Level")).unwrap(), &before);
        // Intermittent readings make series lengths diverge.
        assert_eq!(feed.buffer(&key("Mixer/Temperature")).unwrap().len(), 2);
        assert_eq!(feed.buffer(&key("Mixer/Level")).unwrap().len(), 1);
    }

    #[test]
    fn views_share_one_buffer() {
        let mut feed = ChartFeed::new(5);
        feed.add_view(Box::new(LineChart::new("A", vec![key("Mixer/Level")])));
        feed.add_view(Box::new(LineChart::new("B", vec![key("Mixer/Level"), key("Hardening/Temperature")])));
        assert_eq!(feed.buffers().count(), 2);

        let snapshot = TelemetrySnapshot::builder().reading("Mixer/Level", 0.5).build();
        feed.ingest(&snapshot, at(0));

        for view in feed.views() {
            assert_eq!(view.datasets().len(), 1);
        }
        assert_eq!(feed.buffer(&key("Mixer/Level")).unwrap().len(), 1);
    }

    #[test]
    fn windows_are_bounded_by_feed_capacity() {
        let mut feed = ChartFeed::new(3);
        feed.add_view(Box::new(LineChart::new("Level", vec![key("Mixer/Level")])));
        for i in 0..10 {
            let snapshot = TelemetrySnapshot::builder().reading("Mixer/Level", i as f64 / 10.0).build();
            feed.ingest(&snapshot, at(i));
        }

        let values: Vec<_> = feed.buffer(&key("Mixer/Level")).unwrap().values().collect();
        assert_eq!(values, vec![0.7, 0.8, 0.9]);
        let dataset = feed.views()[0].datasets()[0];
        assert_eq!(dataset.labels.len(), 3);
        assert_eq!(dataset.bounds, Some((0.7, 0.9)));
    }
}
