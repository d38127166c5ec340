//! # linewatch-types
//!
//! Core types for process line telemetry. This crate defines the vocabulary
//! shared by the predictor client, the monitoring core and the dashboard:
//! which modules make up the line, what a sensor snapshot looks like, and how
//! the anomaly predictor reports its verdicts.
//!
//! ## Features
//!
//! - `serde`: JSON serialization matching the predictor service wire format
//!
//! ## Example
//!
//! ```rust
//! use linewatch_types::{ModuleName, TelemetrySnapshot};
//!
//! let snapshot = TelemetrySnapshot::builder()
//!     .module(ModuleName::Mixer, |m| m.reading("Temperature", 276.4).reading("Level", 0.82))
//!     .reading("Hardening/Temperature", 251.0)
//!     .build();
//!
//! assert_eq!(snapshot.get("Mixer/Level"), Some(0.82));
//! assert_eq!(snapshot.len(), 3);
//! ```
//!
//! ## Keys
//!
//! Every reading is keyed `"<Module>/<Parameter>"`, e.g.
//! `"DynamicFreezer/Temperature"`. Some parameters carry their own path
//! segment (`"Homogenizer/Valve1/InFlowMix"`); only the first segment names
//! the module.

mod features;
mod module;
mod snapshot;
mod verdict;

pub use features::*;
pub use module::*;
pub use snapshot::*;
pub use verdict::*;
