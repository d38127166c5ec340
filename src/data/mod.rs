//! Monitoring state: rolling windows, module statuses and the anomaly log.
//!
//! ## Submodules
//!
//! - [`series`]: [`SeriesBuffer`], a bounded FIFO of timestamped readings
//! - [`feed`]: [`ChartFeed`], which routes each snapshot into the series buffers and
//!   redraws the chart views bound to them
//! - [`status`]: [`StatusAggregator`], status derivation with probabilistic relaxation
//! - [`line`]: [`LineModule`], temperature/level/status of each line stage
//! - [`anomaly_log`]: [`AnomalyLog`], the most recent detected anomalies
//! - [`batch`]: production batch records and their summary
//! - [`report`]: JSON and CSV exports of the dashboard
//! - [`duration`]: parsing and formatting of interval strings (e.g., "5s", "500ms")
//!
//! ## Data Flow
//!
//! ```text
//! Reading (snapshot + verdict)
//!        │
//!        ├──▶ LineModule::apply_readings()   (temperature, level)
//!        ├──▶ StatusAggregator::derive()     (per module)
//!        ├──▶ ChartFeed::ingest()            (series buffers, chart views)
//!        └──▶ AnomalyLog::record()           (non-normal verdicts)
//! ```

pub mod anomaly_log;
pub mod batch;
pub mod duration;
pub mod feed;
pub mod line;
pub mod report;
pub mod series;
pub mod status;

pub use anomaly_log::{AnomalyLog, AnomalyLogEntry, DEFAULT_LOG_CAPACITY};
pub use batch::{demo_batches, BatchGrade, BatchRecord, BatchSummary, QualityDistribution};
pub use feed::{ChartDefinition, ChartFeed, ChartView, Dataset, IngestReport, LineChart, SeriesKey};
pub use line::{initial_line, overall_status, LineModule};
pub use report::{ReportKind, StateExport};
pub use series::{SeriesBuffer, DEFAULT_WINDOW};
pub use status::{RandomSource, StatusAggregator, UniformRandom};
