//! Woodworks Core - Cost Estimator Engine
//!
//! Turns itemized costs and per-lumber cut lists into a priced estimate.
//!
//! # Ground Rules
//! 1. Derivations Are Pure
//! 2. Bad Input Reads As Zero
//! 3. Tax Applies Before Profit And Shipping
//! 4. Ids Are Never Reused
//! 5. Export Always Restores The View

pub mod coerce;
pub mod model;
pub mod config;
pub mod pricing;
pub mod charts;
pub mod session;
pub mod format;
pub mod report;
pub mod hashing;
pub mod print;
pub mod export;

pub use model::{CostLineItem, CostSection, CutList, CutListRow, FinancialParameters, LumberType, Project, ProjectDetails, RowId};
pub use config::{ConfigError, EstimatorConfig, LumberSpec};
pub use pricing::{estimate, CutListTotals, EstimateTotals, STANDARD_BOARD_LENGTH};
pub use charts::{chart_data, ChartData, CostBreakdown, MaterialUsage};
pub use session::{ProjectError, ProjectFile, Session};
pub use export::{export_filename, ExportError, ExportOutcome, Exporter};
pub use hashing::project_fingerprint;

pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");
pub const MIN_CONFIG_ENGINE_VERSION: &str = "1.0.0";
