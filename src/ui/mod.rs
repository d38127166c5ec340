//! Terminal UI rendering using ratatui.
//!
//! Each tab is implemented in its own submodule with a `render` function.
//!
//! ## Submodules
//!
//! - [`modules`]: Table of line modules with status, readings and trend
//! - [`charts`]: Line charts fed by the rolling series windows
//! - [`anomalies`]: Recent anomaly log, newest first
//! - [`batches`]: Production batches and quality summary
//! - [`detail`]: Modal overlay showing one module's parameters
//! - [`common`]: Shared components (header, tabs, status bar, help overlay)
//! - [`theme`]: Light/dark theme support with terminal auto-detection
//!
//! ## Rendering Architecture
//!
//! ```text
//! ┌──────────────────────────────────────┐
//! │ Header (common::render_header)       │
//! ├──────────────────────────────────────┤
//! │ Tabs (common::render_tabs)           │
//! ├──────────────────────────────────────┤
//! │                                      │
//! │ View Content                         │
//! │ (modules/charts/anomalies/batches)   │
//! │                                      │
//! ├──────────────────────────────────────┤
//! │ Status Bar (common::render_status)   │
//! └──────────────────────────────────────┘
//!         ↑
//!    Overlays rendered on top:
//!    - detail::render_overlay
//!    - common::render_help
//! ```

pub mod anomalies;
pub mod batches;
pub mod charts;
pub mod common;
pub mod detail;
pub mod modules;
pub mod theme;

pub use theme::Theme;
