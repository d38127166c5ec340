//! Bounded rolling history for one sensor series.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};

/// Default number of points kept per series.
pub const DEFAULT_WINDOW: usize = 20;

/// Label format used on chart x-axes.
const LABEL_FORMAT: &str = "%H:%M:%S";

/// A fixed-capacity FIFO of timestamped readings.
///
/// Appending past capacity evicts the oldest point, so the buffer always
/// holds the most recent `capacity` readings in arrival order.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesBuffer {
    capacity: usize,
    points: VecDeque<(DateTime<Utc>, f64)>,
}

impl Default for SeriesBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW)
    }
}

impl SeriesBuffer {
    /// Create an empty buffer. A capacity of zero is raised to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            points: VecDeque::with_capacity(capacity),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.points.len() == self.capacity
    }

    /// Append a reading, evicting the oldest one when full.
    pub fn append(&mut self, timestamp: DateTime<Utc>, value: f64) {
        self.points.push_back((timestamp, value));
        if self.points.len() > self.capacity {
            self.points.pop_front();
        }
    }

    /// Values in arrival order.
    pub fn values(&self) -> impl Iterator<Item = f64> + Clone + '_ {
        self.points.iter().map(|(_, v)| *v)
    }

    /// Timestamps in arrival order.
    pub fn timestamps(&self) -> impl Iterator<Item = DateTime<Utc>> + Clone + '_ {
        self.points.iter().map(|(t, _)| *t)
    }

    /// Timestamps formatted as chart labels.
    pub fn labels(&self) -> impl Iterator<Item = String> + '_ {
        self.timestamps().map(|t| t.format(LABEL_FORMAT).to_string())
    }

    /// `(timestamp, value)` pairs in arrival order.
    pub fn points(&self) -> impl Iterator<Item = (DateTime<Utc>, f64)> + Clone + '_ {
        self.points.iter().copied()
    }

    /// The most recent reading.
    pub fn latest(&self) -> Option<f64> {
        self.points.back().map(|(_, v)| *v)
    }

    /// Smallest and largest value held, if any.
    pub fn bounds(&self) -> Option<(f64, f64)> {
        self.values().fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
    }

    /// Values normalized to 0-7 for sparkline display.
    ///
    /// Returns an empty Vec if there are fewer than two points.
    pub fn sparkline(&self) -> Vec<u8> {
        if self.points.len() < 2 {
            return Vec::new();
        }
        let Some((min, max)) = self.bounds() else {
            return Vec::new();
        };

        let range = max - min;
        if range <= f64::EPSILON {
            return vec![3; self.points.len()];
        }

        self.values()
            .map(|v| {
                let normalized = ((v - min) / range * 7.0) as u8;
                normalized.min(7)
            })
            .collect()
    }
}
